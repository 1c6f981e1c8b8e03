//! Environment input and output
//!
//! The shim never mutates its own process environment. It reads an
//! immutable [`EnvSnapshot`] and describes the changes the next process
//! should see as an [`EnvOverlay`].

mod overlay;
mod snapshot;

pub use overlay::{EnvOp, EnvOverlay};
pub use snapshot::EnvSnapshot;

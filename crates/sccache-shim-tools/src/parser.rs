//! Invocation identity parser.
//!
//! Reduces an argv[0] value to the bare tool name it was invoked as.

/// Errors produced while parsing an invocation identity.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IdentityError {
    #[error("empty invocation name")]
    Empty,

    #[error("invocation name has no file component: {0}")]
    NoFileName(String),
}

/// Parsed invocation identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedIdentity {
    /// The identity exactly as received.
    pub raw: String,

    /// Final path component with any platform executable suffix removed.
    pub name: String,
}

fn is_separator(c: char) -> bool {
    c == '/' || (cfg!(windows) && c == '\\')
}

/// Parse an invocation identity into its bare tool name.
///
/// `cc`, `./cc` and `/usr/lib/ccache/cc` all yield `cc`. A name that ends
/// in a separator has no file component and is rejected.
pub fn parse_identity(identity: &str) -> Result<ParsedIdentity, IdentityError> {
    if identity.is_empty() {
        return Err(IdentityError::Empty);
    }

    let last = match identity.rfind(is_separator) {
        Some(idx) => &identity[idx + 1..],
        None => identity,
    };

    if last.is_empty() {
        return Err(IdentityError::NoFileName(identity.to_string()));
    }

    let suffix = std::env::consts::EXE_SUFFIX;
    let name = if !suffix.is_empty() && last.len() > suffix.len() && last.ends_with(suffix) {
        &last[..last.len() - suffix.len()]
    } else {
        last
    };

    Ok(ParsedIdentity {
        raw: identity.to_string(),
        name: name.to_string(),
    })
}

//! sccache-shim entry point
//!
//! Invoked under a tool name, the binary dispatches and replaces itself.
//! Invoked as `sccache-shim`, it offers management commands.

use clap::{Parser, Subcommand};
use sccache_shim::config::{EffectiveConfig, Strategy};
use sccache_shim::install::{install, InstallOptions, LinkOutcome};
use sccache_shim::{
    is_management_invocation, launch, plan_invocation, resolve, DispatchError, EnvSnapshot,
    ExplainOutput, Host, Invocation, SystemHost, EXIT_CODE_FAILURE,
};
use sccache_shim_tools::ToolTable;
use std::path::PathBuf;
use std::process;

#[derive(Parser)]
#[command(name = "sccache-shim")]
#[command(about = "Compiler dispatcher that routes builds through sccache", version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show what an invocation would run, without running it
    Explain {
        /// Output in JSON format
        #[arg(long)]
        json: bool,

        /// Override the recursion-avoidance strategy
        #[arg(long)]
        strategy: Option<Strategy>,

        /// Invocation name; otherwise the first word after -- is used
        #[arg(long = "as", value_name = "NAME")]
        as_name: Option<String>,

        /// Tool name (or path) followed by its arguments (after --)
        #[arg(last = true, required = true)]
        cmd: Vec<String>,
    },

    /// Link every recognized tool name to this executable
    Install {
        /// Directory to populate
        #[arg(long, short = 'd')]
        dir: PathBuf,

        /// Replace existing files that are not the shim
        #[arg(long)]
        force: bool,

        /// Only install these names
        #[arg(long = "tool", short = 't')]
        tools: Vec<String>,
    },

    /// Print the effective configuration and its sources
    Config {
        /// Output in JSON format
        #[arg(long)]
        json: bool,
    },

    /// List recognized tool names
    Tools,
}

fn init_logging() {
    let env = env_logger::Env::new().filter_or("SCCACHE_SHIM_LOG", "warn");
    let _ = env_logger::Builder::from_env(env)
        .format_timestamp(None)
        .try_init();
}

fn main() {
    init_logging();

    let invocation = Invocation::from_argv(std::env::args_os());
    if is_management_invocation(&invocation.identity_lossy()) {
        run_cli();
        return;
    }

    let env = EnvSnapshot::capture();
    let host = SystemHost::new();
    let err = match plan_invocation(&invocation, &env, &host) {
        Ok(plan) => match launch::launch(&plan) {
            Ok(never) => match never {},
            Err(e) => e,
        },
        Err(e) => e,
    };
    fail(&err);
}

fn fail(err: &DispatchError) -> ! {
    eprintln!("{}", err.diagnostic());
    process::exit(err.exit_code());
}

fn run_cli() {
    let cli = Cli::parse();
    let env = EnvSnapshot::capture();

    match cli.command {
        Commands::Explain {
            json,
            strategy,
            as_name,
            cmd,
        } => run_explain(&env, json, strategy, as_name, cmd),
        Commands::Install { dir, force, tools } => run_install(&env, dir, force, tools),
        Commands::Config { json } => run_config(&env, json),
        Commands::Tools => run_tools(&env),
    }
}

fn load_config(env: &EnvSnapshot, strategy: Option<Strategy>) -> EffectiveConfig {
    let overrides = strategy.map(|s| serde_json::json!({ "strategy": s.as_str() }));
    match EffectiveConfig::build(env, overrides) {
        Ok(config) => config,
        Err(e) => fail(&DispatchError::Config(e)),
    }
}

fn run_explain(
    env: &EnvSnapshot,
    json: bool,
    strategy: Option<Strategy>,
    as_name: Option<String>,
    cmd: Vec<String>,
) {
    let config = load_config(env, strategy);
    let invocation = match as_name {
        Some(name) => Invocation::from_argv(std::iter::once(name).chain(cmd)),
        None => Invocation::from_argv(cmd),
    };

    let result = resolve(&invocation, env, &config.shim, &SystemHost::new());
    let output = ExplainOutput::from_result(&invocation, &result);

    if json {
        match output.to_json() {
            Ok(text) => println!("{}", text),
            Err(e) => {
                eprintln!("Error serializing output: {}", e);
                process::exit(EXIT_CODE_FAILURE);
            }
        }
    } else {
        println!("{}", output.to_human());
    }

    if let Err(e) = result {
        process::exit(e.exit_code());
    }
}

fn run_install(env: &EnvSnapshot, dir: PathBuf, force: bool, tools: Vec<String>) {
    let config = load_config(env, None);
    let shim = match SystemHost::new().current_exe() {
        Ok(path) => path,
        Err(e) => fail(&DispatchError::SelfLocation(e.to_string())),
    };

    let options = InstallOptions {
        dir,
        shim,
        force,
        only: tools,
    };
    let links = match install(&options, &ToolTable::new(config.shim.tools.clone())) {
        Ok(links) => links,
        Err(e) => {
            eprintln!("sccache-shim: install failed: {}", e);
            process::exit(EXIT_CODE_FAILURE);
        }
    };

    for link in &links {
        let label = match link.outcome {
            LinkOutcome::Created => "created",
            LinkOutcome::Replaced => "replaced",
            LinkOutcome::Unchanged => "unchanged",
            LinkOutcome::Skipped => "skipped (exists, use --force)",
        };
        println!("  {:<16} {} -> {}", link.name, label, options.shim.display());
    }

    if links.iter().any(|l| l.outcome == LinkOutcome::Skipped) {
        eprintln!(
            "Some names were left alone. Put {} first on PATH once they are in place.",
            options.dir.display()
        );
    } else {
        println!();
        println!("Put {} first on PATH to enable the shim.", options.dir.display());
    }
}

fn run_config(env: &EnvSnapshot, json: bool) {
    let config = load_config(env, None);

    if json {
        match config.to_json() {
            Ok(text) => println!("{}", text),
            Err(e) => {
                eprintln!("Error serializing output: {}", e);
                process::exit(EXIT_CODE_FAILURE);
            }
        }
        return;
    }

    let shim = &config.shim;
    println!("Strategy: {}", shim.strategy);
    println!("Cache binary variable: {}", shim.cache_env_var);
    match env.get_os(&shim.cache_env_var) {
        Some(value) => println!("  currently: {}", value.to_string_lossy()),
        None => println!("  currently: (unset)"),
    }
    println!("Sentinel variable: {}", shim.sentinel_env_var);
    println!("Search-path variable: {}", shim.path_env_var);
    if !shim.tools.extra_compilers.is_empty() {
        let names: Vec<&str> = shim.tools.extra_compilers.iter().map(String::as_str).collect();
        println!("Extra compilers: {}", names.join(", "));
    }
    if !shim.tools.extra_cache_wrappers.is_empty() {
        let names: Vec<&str> = shim
            .tools
            .extra_cache_wrappers
            .iter()
            .map(String::as_str)
            .collect();
        println!("Extra cache wrappers: {}", names.join(", "));
    }
    println!();
    println!("Sources:");
    for source in &config.sources {
        let origin = serde_json::to_value(&source.origin)
            .ok()
            .and_then(|v| v.as_str().map(String::from))
            .unwrap_or_default();
        match (&source.path, &source.digest) {
            (Some(path), Some(digest)) => println!("  {} {} (sha256 {})", origin, path, digest),
            _ if !source.keys.is_empty() => println!("  {} {}", origin, source.keys.join(", ")),
            _ => println!("  {}", origin),
        }
    }
}

fn run_tools(env: &EnvSnapshot) {
    let config = load_config(env, None);
    let table = ToolTable::new(config.shim.tools.clone());
    for (name, kind) in table.entries() {
        println!("{:<16} {}", name, kind.as_str());
    }
}

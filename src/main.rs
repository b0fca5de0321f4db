use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use sac_debugger::bridge::{run_bridge, BridgeServer};
use sac_debugger::config::Config;
use sac_debugger::debugger::DebugSession;
use sac_debugger::parser::{translate_command, Query};
use sac_debugger::symbols::{demangle_function, demangle_variable};
use std::fs;
use std::io;
use std::path::PathBuf;

/// SaC symbol translation and session tracking for C debuggers
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// JSON configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    mode: Option<Mode>,
}

#[derive(Subcommand, Debug)]
enum Mode {
    /// Serve a host debugger shim over stdin/stdout (default)
    Bridge,
    /// Substitute `*sac(...)` blocks in a command
    Translate {
        command: String,
        /// File holding an `info locals` dump
        #[arg(long)]
        locals: Option<PathBuf>,
    },
    /// Print the C symbol of `[ns::]name(types)`
    Mangle { signature: String },
    /// Print the SaC name of a C function or variable symbol
    Demangle { name: String },
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(
        match args.verbose {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        },
    ))
    .init();

    let config = match &args.config {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };
    log::debug!("naming scheme: {:?}", config.naming);

    match args.mode.unwrap_or(Mode::Bridge) {
        Mode::Bridge => {
            let stdin = io::stdin();
            let stdout = io::stdout();
            let mut server = BridgeServer::new(stdin.lock(), stdout.lock());
            let mut session = DebugSession::new(&config);
            run_bridge(&mut server, &mut session)?;
        }
        Mode::Translate { command, locals } => {
            let dump = match locals {
                Some(path) => fs::read_to_string(&path)
                    .with_context(|| format!("reading locals dump {}", path.display()))?,
                None => String::new(),
            };
            let translated = translate_command(&config.naming, &command, &dump)
                .context("Error with contents of a *sac() block")?;
            println!("{}", translated);
        }
        Mode::Mangle { signature } => match Query::parse(&signature)? {
            Query::Function(function) => println!("{}", function.mangle(&config.naming)?),
            Query::Variable(name) => bail!("`{}` is not a function signature", name),
        },
        Mode::Demangle { name } => {
            if let Some(function) = demangle_function(&config.naming, &name) {
                println!("{}", function);
            } else if let Some(variable) = demangle_variable(&config.naming, &name) {
                println!("{}", variable);
            } else {
                bail!("`{}` is not a SaC symbol", name);
            }
        }
    }

    Ok(())
}

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod commands;
mod output;

use commands::config::{ConfigCmd, run_config};
use commands::history::run_history;
use commands::parse::{ParseCmd, run_parse};
use commands::render::{RenderArgs, run_render};

#[derive(Parser)]
#[command(name = "taskflow")]
#[command(about = "Replay agent execution snapshots as a task view", long_about = None)]
struct Cli {
    #[arg(long, global = true)]
    json: bool,

    /// Log engine decisions at debug level to stderr.
    #[arg(long, global = true)]
    verbose: bool,

    /// Workspace holding `.taskflow/` settings; defaults to the current directory.
    #[arg(long, global = true)]
    workspace: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Apply snapshot files in order and print the resulting view.
    Render(RenderArgs),
    /// Reconcile a raw call-event list into display history.
    History {
        events: PathBuf,
    },
    /// Parse search tool output into resource records.
    Parse {
        #[command(subcommand)]
        command: ParseCmd,
    },
    /// Show or initialise the effective configuration.
    Config {
        #[command(subcommand)]
        command: Option<ConfigCmd>,
    },
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    let cwd = match cli.workspace {
        Some(dir) => dir,
        None => std::env::current_dir()?,
    };

    match cli.command {
        Commands::Render(args) => run_render(&cwd, args, cli.json, cli.verbose),
        Commands::History { events } => run_history(&events, cli.json),
        Commands::Parse { command } => run_parse(&cwd, command, cli.json),
        Commands::Config { command } => {
            run_config(&cwd, command.unwrap_or(ConfigCmd::Show), cli.json)
        }
    }
}

mod commands;
mod config;

use anyhow::Context;
use clap::{Parser, Subcommand};
use colored::Colorize;
use commands::{apply, blocks, init, inspect, ApplyArgs, BlocksArgs, InitArgs, InspectArgs};
use tracing_subscriber::EnvFilter;

/// Pagecraft CLI - inspect and edit page-builder documents
#[derive(Parser, Debug)]
#[command(name = "pagecraft")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Log editing activity (same as RUST_LOG=debug)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Initialize a new Pagecraft project
    Init(InitArgs),

    /// List available block types
    Blocks(BlocksArgs),

    /// Show the blocks of a page, or of every page in a directory
    Inspect(InspectArgs),

    /// Apply a JSON mutation script to a page
    Apply(ApplyArgs),
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let cwd = std::env::current_dir()
        .context("Cannot get current directory")?
        .display()
        .to_string();

    match cli.command {
        Command::Init(args) => init(args, &cwd),
        Command::Blocks(args) => blocks(args, &cwd),
        Command::Inspect(args) => inspect(args, &cwd),
        Command::Apply(args) => apply(args, &cwd),
    }
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Err(err) = run(cli) {
        eprintln!();
        eprintln!("{} {:#}", "Error:".red().bold(), err);
        eprintln!();
        std::process::exit(1);
    }
}

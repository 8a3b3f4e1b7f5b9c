//! Reword CLI
//!
//! Command-line interface for rewording snapshot messages

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use reword_core::logging_facility::{self, Profile};

mod commands;
mod editor;

#[derive(Debug, Parser)]
#[command(name = "reword")]
#[command(about = "Reword - Rewrite snapshot messages and their descendants", long_about = None)]
struct Cli {
    /// Repository directory; discovered from the current directory if unset
    #[arg(long, global = true, env = "REWORD_DIR")]
    repo: Option<PathBuf>,

    /// Log output format
    #[arg(long, global = true, default_value = "pretty", value_parser = ["pretty", "json"])]
    log_format: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Create an empty repository
    Init(commands::init::InitArgs),
    /// Record a new snapshot on the current branch
    Commit(commands::commit::CommitArgs),
    /// Show history, newest first
    Log(commands::log::LogArgs),
    /// Show a reference's change log, newest first
    Reflog(commands::reflog::ReflogArgs),
    /// Change a snapshot's message and rewrite its descendants
    Reword(commands::reword::RewordArgs),
}

fn main() {
    let cli = Cli::parse();
    logging_facility::init(Profile::from_format(&cli.log_format).unwrap_or(Profile::Development));

    let repo = cli.repo.as_deref();
    let result = match cli.command {
        Commands::Init(args) => commands::init::execute(args, repo),
        Commands::Commit(args) => commands::commit::execute(args, repo),
        Commands::Log(args) => commands::log::execute(args, repo),
        Commands::Reflog(args) => commands::reflog::execute(args, repo),
        Commands::Reword(args) => commands::reword::execute(args, repo),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

//! History listing
//!
//! Usage: reword log [REV] [-n <N>] [--full]

use std::path::Path;

use clap::Args;
use reword_core_types::RequestContext;

use super::open_repository;

#[derive(Debug, Args)]
pub struct LogArgs {
    #[arg(default_value = "HEAD")]
    pub revision: String,

    /// Show at most this many snapshots
    #[arg(short = 'n', long)]
    pub limit: Option<usize>,

    /// Print full ids, identities and messages
    #[arg(long)]
    pub full: bool,
}

pub fn execute(args: LogArgs, repo: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    let repository = open_repository(repo)?;
    let snapshots = reword_engine::log(
        &repository,
        &args.revision,
        args.limit,
        &RequestContext::from_env(),
    )?;

    for snapshot in snapshots {
        if args.full {
            println!("snapshot {}", snapshot.id);
            println!("Author: {}", snapshot.author);
            println!("Date:   {}", snapshot.author.when.to_rfc3339());
            println!();
            for line in snapshot.message.lines() {
                println!("    {}", line);
            }
            println!();
        } else {
            println!("{} {}", snapshot.id.short(), snapshot.subject());
        }
    }
    Ok(())
}

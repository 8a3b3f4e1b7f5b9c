//! Message rewrite command
//!
//! Usage: reword reword <REV> [-m <MESSAGE>] [--branch <NAME>] [--expected-tip <ID>]

use std::path::Path;

use clap::Args;
use reword_core::{ObjectStore, SnapshotId};
use reword_core_types::RequestContext;
use reword_engine::{reword, RewordOptions};

use super::open_repository;
use crate::editor;

#[derive(Debug, Args)]
pub struct RewordArgs {
    /// Snapshot whose message changes
    pub revision: String,

    /// New message; opens the editor when omitted
    #[arg(short, long)]
    pub message: Option<String>,

    /// Branch to rewrite instead of the one `HEAD` points at
    #[arg(long)]
    pub branch: Option<String>,

    /// Refuse to publish unless the branch is still at this snapshot
    #[arg(long)]
    pub expected_tip: Option<String>,
}

pub fn execute(args: RewordArgs, repo: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    let mut repository = open_repository(repo)?;

    let message = match args.message {
        Some(message) => message,
        None => {
            let target = repository.resolve(&args.revision)?;
            let current = repository.get_snapshot(&target)?.message;
            editor::edit_message(&current)?
        }
    };

    let options = RewordOptions {
        reference: args.branch,
        expected_tip: args
            .expected_tip
            .as_deref()
            .map(SnapshotId::parse)
            .transpose()?,
    };

    let result = reword(
        &mut repository,
        &args.revision,
        &message,
        options,
        &RequestContext::from_env(),
    )?;

    if result.is_noop() {
        println!("Message unchanged; nothing rewritten");
        return Ok(());
    }

    println!("Rewrote {} snapshot(s):", result.rewritten.len());
    println!("  ref: {}", result.ref_name);
    println!("  old_tip: {}", result.old_tip);
    println!("  new_tip: {}", result.new_tip);
    Ok(())
}

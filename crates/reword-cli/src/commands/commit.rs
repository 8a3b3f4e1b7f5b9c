//! Snapshot commit command
//!
//! Usage: reword commit -m <MESSAGE> [--parent <REV>]... [--content <REF>]

use std::path::Path;

use clap::Args;
use reword_core_types::RequestContext;
use reword_engine::{commit, CommitRequest};

use super::{open_repository, IdentityArgs};

#[derive(Debug, Args)]
pub struct CommitArgs {
    #[arg(short, long)]
    pub message: String,

    /// Additional parent revision; any makes a merge
    #[arg(long = "parent")]
    pub parents: Vec<String>,

    /// Opaque content reference; defaults to the first parent's
    #[arg(long)]
    pub content: Option<String>,

    #[command(flatten)]
    pub identity: IdentityArgs,
}

pub fn execute(args: CommitArgs, repo: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    let mut repository = open_repository(repo)?;

    let mut request = CommitRequest::new(args.message, args.identity.signature());
    request.extra_parents = args.parents;
    request.content_ref = args.content;

    let result = commit(&mut repository, request, &RequestContext::from_env())?;

    println!("Snapshot committed:");
    println!("  snapshot_id: {}", result.snapshot_id);
    println!("  ref: {}", result.ref_name);
    Ok(())
}

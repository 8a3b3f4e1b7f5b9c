//! Reference change log
//!
//! Usage: reword reflog [REF]

use std::path::Path;

use clap::Args;
use reword_core::store::short_ref_name;
use reword_core_types::RequestContext;

use super::open_repository;

#[derive(Debug, Args)]
pub struct ReflogArgs {
    #[arg(default_value = "HEAD")]
    pub reference: String,
}

pub fn execute(args: ReflogArgs, repo: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    let repository = open_repository(repo)?;
    let entries = reword_engine::reflog(&repository, &args.reference, &RequestContext::from_env())?;

    for (i, entry) in entries.iter().enumerate() {
        println!(
            "{} {}@{{{}}}: {}",
            entry.new_target.short(),
            short_ref_name(&entry.ref_name),
            i,
            entry.message
        );
    }
    Ok(())
}

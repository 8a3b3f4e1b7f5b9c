//! Subcommand implementations
//!
//! Each module exposes `execute(args, repo)`; `repo` is the global `--repo`
//! directory when one was given.

pub mod commit;
pub mod init;
pub mod log;
pub mod reflog;
pub mod reword;

use std::path::Path;

use clap::Args;
use reword_core::Signature;
use reword_store::Repository;

/// Open the repository at `repo`, or discover one from the current directory
pub fn open_repository(repo: Option<&Path>) -> Result<Repository, Box<dyn std::error::Error>> {
    let repository = match repo {
        Some(dir) => Repository::open(dir)?,
        None => Repository::discover(std::env::current_dir()?)?,
    };
    Ok(repository)
}

/// Identity used for new snapshots
#[derive(Debug, Args)]
pub struct IdentityArgs {
    #[arg(long, env = "REWORD_AUTHOR_NAME", default_value = "Reword User")]
    pub author_name: String,

    #[arg(long, env = "REWORD_AUTHOR_EMAIL", default_value = "reword@localhost")]
    pub author_email: String,
}

impl IdentityArgs {
    pub fn signature(&self) -> Signature {
        Signature::now(self.author_name.as_str(), self.author_email.as_str())
    }
}

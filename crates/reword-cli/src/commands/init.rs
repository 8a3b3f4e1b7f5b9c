//! Repository creation
//!
//! Usage: reword init [PATH]

use std::path::{Path, PathBuf};

use clap::Args;
use reword_store::Repository;

#[derive(Debug, Args)]
pub struct InitArgs {
    /// Directory to initialize; defaults to `--repo` or the current directory
    pub path: Option<PathBuf>,
}

pub fn execute(args: InitArgs, repo: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    let dir = match (args.path, repo) {
        (Some(path), _) => path,
        (None, Some(repo)) => repo.to_path_buf(),
        (None, None) => std::env::current_dir()?,
    };

    let repository = Repository::init(&dir)?;
    println!(
        "Initialized empty repository in {}",
        repository.repo_dir().display()
    );
    Ok(())
}

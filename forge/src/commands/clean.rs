use std::path::PathBuf;

use clap::Args;
use eyre::Result;

use super::UnwrapOrExit;
use crate::{
    ops::{self, clean::CleanOptions},
    project::{Overrides, Project},
    reports::{Report, TerminalOutput},
};

#[derive(Args)]
pub struct CleanCommand {
    /// Path to forge.toml
    #[arg(short, long, default_value = "forge.toml")]
    pub config: PathBuf,

    /// Output directory (overrides forge.toml)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Preview what would be deleted without actually deleting
    #[arg(long)]
    pub dry_run: bool,
}

impl CleanCommand {
    pub fn run(&self) -> Result<()> {
        let project = Project::load(
            &self.config,
            Overrides {
                output: self.output.clone(),
                ..Overrides::default()
            },
        )
        .unwrap_or_exit();

        let report = ops::clean(
            &project,
            CleanOptions {
                dry_run: self.dry_run,
            },
        )?;

        report.render(&mut TerminalOutput::new());
        Ok(())
    }
}

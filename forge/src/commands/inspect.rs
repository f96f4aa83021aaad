use std::path::PathBuf;

use clap::Args;
use eyre::Result;

use super::UnwrapOrExit;
use crate::{
    ops,
    project::Project,
    reports::{Report, TerminalOutput},
};

#[derive(Args)]
pub struct InspectCommand {
    /// Path to forge.toml
    #[arg(short, long, default_value = "forge.toml")]
    pub config: PathBuf,

    /// Draw relations as a tree instead of listing fields
    #[arg(long)]
    pub tree: bool,
}

impl InspectCommand {
    pub fn run(&self) -> Result<()> {
        let project = Project::open(&self.config).unwrap_or_exit();

        let report = ops::inspect(&project, self.tree)?;
        report.render(&mut TerminalOutput::new());

        Ok(())
    }
}

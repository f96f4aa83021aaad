use std::path::PathBuf;

use clap::Args;
use crudforge_schema::Target;
use eyre::Result;

use super::UnwrapOrExit;
use crate::{
    ops::{self, generate::GenerateOptions},
    project::{Overrides, Project},
    reports::{Report, TerminalOutput},
};

#[derive(Args)]
pub struct GenerateCommand {
    /// Path to forge.toml
    #[arg(short, long, default_value = "forge.toml")]
    pub config: PathBuf,

    /// Schema file (overrides forge.toml)
    #[arg(short, long)]
    pub schema: Option<PathBuf>,

    /// Target framework (overrides forge.toml)
    #[arg(short, long)]
    pub target: Option<Target>,

    /// Output directory (overrides forge.toml)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Preview generated code without writing to disk
    #[arg(long)]
    pub dry_run: bool,

    /// Write a JSON snapshot of each pipeline phase to <output>/.forge/debug
    #[arg(long)]
    pub visualize: bool,
}

impl GenerateCommand {
    pub fn run(&self) -> Result<()> {
        let project = Project::load(
            &self.config,
            Overrides {
                schema: self.schema.clone(),
                target: self.target,
                output: self.output.clone(),
            },
        )
        .unwrap_or_exit();

        let mut out = TerminalOutput::new();
        let check = ops::check(&project);
        if !check.is_valid() {
            check.render(&mut out);
            std::process::exit(1);
        }

        let report = ops::generate(
            &project,
            GenerateOptions {
                dry_run: self.dry_run,
                visualize: self.visualize,
            },
        )?;
        report.render(&mut out);
        Ok(())
    }
}

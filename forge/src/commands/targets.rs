use clap::Args;
use crudforge_schema::Target;
use eyre::Result;

use crate::{
    language::TargetSupport,
    reports::{Report, TargetInfo, TargetsReport, TerminalOutput},
};

#[derive(Args)]
pub struct TargetsCommand {}

impl TargetsCommand {
    pub fn run(&self) -> Result<()> {
        let report = TargetsReport {
            targets: TargetSupport::all()
                .map(|support| TargetInfo {
                    id: support.target.as_str(),
                    label: support.target.label(),
                    manifest: support.manifest,
                    layers: support.layers,
                })
                .collect(),
            unsupported: Target::unsupported().collect(),
        };

        report.render(&mut TerminalOutput::new());
        Ok(())
    }
}

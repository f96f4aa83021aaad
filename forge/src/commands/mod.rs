mod check;
mod clean;
mod completions;
mod generate;
mod init;
mod inspect;
mod targets;

use check::CheckCommand;
use clap::{ArgAction, Parser, Subcommand};
use clean::CleanCommand;
use completions::CompletionsCommand;
use eyre::Result;
use generate::GenerateCommand;
use init::InitCommand;
use inspect::InspectCommand;
use targets::TargetsCommand;

/// Extension trait for exiting on config and schema errors with pretty formatting
pub(crate) trait UnwrapOrExit<T> {
    fn unwrap_or_exit(self) -> T;
}

impl<T> UnwrapOrExit<T> for crudforge_schema::Result<T> {
    fn unwrap_or_exit(self) -> T {
        match self {
            Ok(v) => v,
            Err(e) => {
                eprintln!("{:?}", miette::Report::new(*e));
                std::process::exit(1);
            }
        }
    }
}

#[derive(Parser)]
#[command(name = "forge")]
#[command(version)]
#[command(about = "Generate CRUD backends from SQL or OpenAPI schemas")]
pub(crate) struct Cli {
    /// Log more (-v info, -vv debug, -vvv trace); RUST_LOG takes precedence
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

impl Cli {
    pub fn run(&self) -> Result<()> {
        match &self.command {
            Commands::Init(cmd) => cmd.run(),
            Commands::Generate(cmd) => cmd.run(),
            Commands::Check(cmd) => cmd.run(),
            Commands::Inspect(cmd) => cmd.run(),
            Commands::Clean(cmd) => cmd.run(),
            Commands::Targets(cmd) => cmd.run(),
            Commands::Completions(cmd) => cmd.run(),
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Create forge.toml and a starter schema
    Init(InitCommand),

    /// Generate the backend from forge.toml
    Generate(GenerateCommand),

    /// Validate the schema without generating code
    Check(CheckCommand),

    /// Show the entity model derived from the schema
    Inspect(InspectCommand),

    /// Remove generated files whose entities no longer exist
    Clean(CleanCommand),

    /// List supported targets
    Targets(TargetsCommand),

    /// Generate shell completions
    Completions(CompletionsCommand),
}

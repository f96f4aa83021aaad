//! Report data structures for commands.
//!
//! Data collection is separated from rendering: operations build reports,
//! commands render them to an [`Output`].

mod check;
mod clean;
mod generate;
mod inspect;
mod output;
mod targets;

pub use check::CheckReport;
pub use clean::CleanReport;
pub use generate::{GenerateReport, GenerationResult, PreviewResult, WrittenResult};
pub use inspect::{InspectReport, Stats};
pub use output::{Report, TerminalOutput};
pub use targets::{TargetInfo, TargetsReport};

//! CLI domain: parse, route, output, and presentation only.
//! No domain orchestration; the route table dispatches to the library.

mod output;
mod parse;
mod presentation;
mod route;

pub use output::map_error;
pub use parse::{Cli, Commands, OutputFormat};
pub use presentation::{format_baseline, format_baseline_summary, format_report};
pub use route::{CommandOutcome, RunContext};

//! CLI domain: parse, route and output only.
//! Tree building, diffing and planning live in their own modules.

mod output;
mod parse;
mod route;

pub use output::map_error;
pub use parse::Cli;
pub use route::{DriverKind, RunContext};

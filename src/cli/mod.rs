//! Command-line interface: argument parsing, command handlers and
//! cargo-style reporting. The library API in `core` and `catalog` does not
//! depend on this module.

pub mod args;
mod commands;
mod context;
pub mod report;
mod run;

pub use args::{Arguments, Command, CommonArgs};
pub use commands::ExitStatus;
pub use run::run_cli;

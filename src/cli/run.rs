use std::process::ExitCode;

use anyhow::Result;

use super::{
    args::{Arguments, Command},
    commands::{
        CommandResult, annotate::annotate, collect::collect, init::init, stats::stats,
        transfer::transfer, wrap::wrap,
    },
    report,
};
use crate::issues::TransferOperation;

/// Main entry point for the harvest CLI.
///
/// Dispatches to the command handler, prints its report and maps the
/// outcome to an exit code. `Err` is left to the caller (exit status 2).
pub fn run_cli(args: Arguments) -> Result<ExitCode> {
    let verbose = args.verbose();

    let Some(Arguments {
        command: Some(command),
    }) = args.with_command_or_help()
    else {
        return Ok(ExitCode::SUCCESS);
    };

    let result = run(command)?;
    report::print(&result, verbose);

    Ok(result.exit_status().into())
}

fn run(command: Command) -> Result<CommandResult> {
    match command {
        Command::Init => init(),
        Command::Collect(cmd) => collect(cmd),
        Command::Wrap(cmd) => wrap(cmd),
        Command::Annotate(cmd) => annotate(cmd),
        Command::Transfer(cmd) => transfer(cmd, TransferOperation::Transfer),
        Command::Restore(cmd) => transfer(cmd, TransferOperation::Restore),
        Command::Stats(cmd) => stats(cmd),
    }
}

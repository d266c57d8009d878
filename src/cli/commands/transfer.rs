use anyhow::Result;

use super::super::args::TransferCommand;
use super::{CommandResult, CommandSummary, TransferSummary};
use crate::catalog::{Catalog, restore_transfer, transfer_translations};
use crate::issues::TransferOperation;

/// Run `transfer` or `restore` from `cmd.source` onto `cmd.dest`.
///
/// The result is written to `--output`, or over the destination.
pub fn transfer(cmd: TransferCommand, operation: TransferOperation) -> Result<CommandResult> {
    let source = Catalog::read(&cmd.source)?;
    let mut dest = Catalog::read(&cmd.dest)?;

    let result = match operation {
        TransferOperation::Transfer => transfer_translations(&source, &mut dest),
        TransferOperation::Restore => restore_transfer(&source, &mut dest),
    };

    let output = cmd.output.unwrap_or_else(|| cmd.dest.clone());
    dest.write(&output)?;

    let issues = result.issues(&cmd.dest.display().to_string(), operation);
    Ok(CommandResult::new(
        CommandSummary::Transfer(TransferSummary {
            operation,
            updated: result.updated,
            unmatched: result.unmatched.len(),
            output,
        }),
        issues,
    ))
}

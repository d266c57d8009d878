use anyhow::Result;

use super::super::args::AnnotateCommand;
use super::{AnnotateSummary, CommandResult, CommandSummary};
use crate::catalog::{Catalog, annotate_context};

/// Annotate each catalog in place; unchanged catalogs are not rewritten.
pub fn annotate(cmd: AnnotateCommand) -> Result<CommandResult> {
    let mut catalogs = Vec::new();

    for path in &cmd.catalogs {
        let mut catalog = Catalog::read(path)?;
        let annotated = annotate_context(&mut catalog);
        if annotated > 0 {
            catalog.write(path)?;
        }
        catalogs.push((path.clone(), annotated));
    }

    Ok(CommandResult::new(
        CommandSummary::Annotate(AnnotateSummary { catalogs }),
        Vec::new(),
    ))
}

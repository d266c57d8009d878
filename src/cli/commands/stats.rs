use anyhow::Result;

use super::super::args::StatsCommand;
use super::{CommandResult, CommandSummary, StatsSummary};
use crate::catalog::{Catalog, catalog_stats};

pub fn stats(cmd: StatsCommand) -> Result<CommandResult> {
    let catalogs = cmd
        .catalogs
        .iter()
        .map(|path| Ok((path.clone(), catalog_stats(&Catalog::read(path)?))))
        .collect::<Result<Vec<_>>>()?;

    Ok(CommandResult::new(
        CommandSummary::Stats(StatsSummary {
            catalogs,
            json: cmd.json,
        }),
        Vec::new(),
    ))
}

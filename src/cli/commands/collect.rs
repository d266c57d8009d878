use anyhow::Result;

use super::super::{args::CollectCommand, context::ProjectContext};
use super::{CollectSummary, CommandResult, CommandSummary};
use crate::catalog::{MergeTool, Msgmerge, build_catalogs};
use crate::core::collect::{CollectOptions, collect_files};

pub fn collect(cmd: CollectCommand) -> Result<CommandResult> {
    let ctx = ProjectContext::new(&cmd.common)?;
    let config = &ctx.config;

    let collected = collect_files(
        &ctx.source_dir,
        &ctx.files,
        &ctx.grammars,
        CollectOptions::default(),
    );

    let locales = if cmd.locales.is_empty() {
        config.locales.clone()
    } else {
        cmd.locales.clone()
    };
    let msgmerge = Msgmerge::new(&config.merge_program);
    let merge_tool: Option<&dyn MergeTool> = if cmd.no_merge { None } else { Some(&msgmerge) };

    let built = build_catalogs(
        &collected.key_items,
        &ctx.catalog_dir,
        &config.catalog_base_name,
        &locales,
        merge_tool,
    )?;

    let mut issues = collected.issues;
    issues.extend(built.merge.issues);

    Ok(CommandResult::new(
        CommandSummary::Collect(CollectSummary {
            files_parsed: collected.parsed_count,
            message_count: built.message_count,
            occurrences: collected.key_items.occurrences(),
            template_path: built.template_path,
            created_locales: built.merge.created,
            merged_locales: built.merge.merged,
        }),
        issues,
    ))
}

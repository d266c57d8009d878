use anyhow::Result;

use super::super::{args::WrapCommand, context::ProjectContext};
use super::{CommandResult, CommandSummary, WrapSummary};
use crate::core::wrap::{
    Prompt, ScriptedPrompt, TerminalPrompt, WrapOptions, load_control_messages, wrap_files,
    write_control_messages_report,
};

pub fn wrap(cmd: WrapCommand) -> Result<CommandResult> {
    let ctx = ProjectContext::new(&cmd.common)?;
    let config = &ctx.config;

    let options = WrapOptions::from_config(config, !cmd.yes)?;
    let control_messages = cmd
        .control_messages
        .as_deref()
        .map(load_control_messages)
        .transpose()?;

    // With --yes every candidate is wrapped and the prompt is never asked.
    let mut prompt: Box<dyn Prompt> = if cmd.yes {
        Box::new(ScriptedPrompt::default())
    } else {
        Box::new(TerminalPrompt::new(
            &config.translator,
            &config.translator_message,
        ))
    };

    let result = wrap_files(
        &ctx.source_dir,
        &ctx.files,
        &ctx.grammars,
        &options,
        prompt.as_mut(),
        control_messages.as_deref(),
        cmd.dry_run,
        ctx.verbose,
    )?;

    let report_path = match (&cmd.report, &result.control_messages) {
        (Some(path), Some(counts)) => {
            write_control_messages_report(path, counts)?;
            Some(path.clone())
        }
        _ => None,
    };

    Ok(CommandResult::new(
        CommandSummary::Wrap(WrapSummary {
            files: result.files,
            processed_count: result.processed_count,
            wrapped_texts: result.wrapped_texts,
            is_dry_run: cmd.dry_run,
            aborted: result.aborted,
            report_path,
        }),
        result.issues,
    ))
}

//! Two-phase wrapping of template sources.
//!
//! Phase one wraps markup text (text nodes and attribute values outside
//! mustaches) as `{{MSG '<text>'}}`. Phase two parses the result and wraps
//! string literals inside mustaches as `(MSG <literal>)`, skipping helper
//! paths and existing `MSG` calls.

use super::{Aborted, Decision, PromptRequest, Quotes, ScriptOutcome, Session};
use crate::core::key::DEFAULT_MESSAGE_CONTEXT;
use crate::core::parsers::markup::markup_text_runs;

pub(super) fn wrap_template(
    session: &mut Session<'_, '_>,
    code: &str,
) -> Result<ScriptOutcome, Aborted> {
    if let Err(e) = session.config.grammar.parse(code, session.file) {
        return Ok(ScriptOutcome {
            text: code.to_string(),
            count: 0,
            skip_rest: false,
            parse_error: Some(format!("{:#}", e)),
        });
    }

    let worklist = session.worklist.take();
    let result = wrap_markup(session, code).and_then(|(text, markup_count)| {
        let mut outcome = session.wrap_script(&text, None)?;
        if outcome.parse_error.is_some() {
            outcome.text = code.to_string();
            outcome.count = 0;
        } else {
            outcome.count += markup_count;
        }
        Ok(outcome)
    });
    session.worklist = worklist;
    result
}

/// Phase one: wrap markup text runs.
fn wrap_markup(session: &mut Session<'_, '_>, code: &str) -> Result<(String, usize), Aborted> {
    let helper = session.helper_name().to_string();
    let mut text = code.to_string();
    let mut offset = 0isize;
    let mut count = 0;

    for run in markup_text_runs(code) {
        // Inside a single-quoted attribute the helper argument takes the other quote.
        let quotes = match run.quote {
            Some('\'') => Quotes::of("\""),
            _ => Quotes::of("'"),
        };
        let run = run.range;
        let raw = &code[run.clone()];
        let candidate = raw.trim();
        if candidate.is_empty()
            || !session.config.wrap.target_pattern.is_match(candidate)
            || session.options.is_ignored_text(candidate)
        {
            continue;
        }

        let leading = raw.len() - raw.trim_start().len();
        let Some(start) = (run.start + leading).checked_add_signed(offset) else {
            continue;
        };
        let end = start + candidate.len();

        let decision = session.decide(&PromptRequest {
            candidate,
            left: "",
            right: "",
            before: &text[..start],
            after: &text[end..],
            control_messages: None,
        });
        let replacement = match decision {
            Decision::Wrap => format!("{{{{{} {}}}}}", helper, quotes.quote_helper_argument(candidate)),
            Decision::WrapWithContext => format!(
                "{{{{{} {} {}}}}}",
                helper,
                quotes.quote_helper_argument(candidate),
                quotes.quote_helper_argument(DEFAULT_MESSAGE_CONTEXT)
            ),
            Decision::Custom => match session.prompt.custom_message() {
                Some(message) => format!("{{{{{} {}}}}}", helper, quotes.quote_helper_argument(&message)),
                None => continue,
            },
            Decision::Reject | Decision::SkipRest => continue,
            Decision::Abort => return Err(Aborted),
        };

        text.replace_range(start..end, &replacement);
        offset += replacement.len() as isize - candidate.len() as isize;
        count += 1;
    }

    Ok((text, count))
}

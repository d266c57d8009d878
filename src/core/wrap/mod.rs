//! Wrapper: splices translator calls around candidate literals.
//!
//! The tree is walked once, in document order, over the original text's
//! spans. Every splice shifts later text, so a running offset is added to
//! each span before it indexes the rewritten text.
//!
//! Two decision policies exist:
//!
//! - **Interactive** (no worklist): each candidate literal is wrapped whole,
//!   after asking the [`Prompt`] unless prompting is off.
//! - **Control messages** (worklist given): only the listed phrases found
//!   inside a literal are wrapped, longest first, and the literal is split
//!   around them with the grammar's concatenation operator.
//!
//! Operator abort is carried out of the walk as `ControlFlow::Break` and
//! leaves the text of the current file untouched.

mod control;
mod files;
pub mod prompt;
mod template;

use std::ops::{ControlFlow, Range};

use anyhow::Result;
use regex::Regex;

use crate::config::Config;
use crate::core::grammar::{Grammar, GrammarConfig};
use crate::core::key::DEFAULT_MESSAGE_CONTEXT;
use crate::core::syntax::{LineIndex, SyntaxNode, Visitor, walk};
use crate::issues::{Issue, SourceContext, SubstitutionFailureIssue};
use crate::utils::format_template;

pub use control::{
    ControlMessageCounts, ControlMessageInfo, by_length_desc, insert_control_message,
    load_control_messages, merge_counts, prepare_control_messages,
    write_control_messages_report,
};
pub use files::{FileWrapResult, WrapFilesResult, wrap_files};
pub use prompt::{Decision, Prompt, PromptRequest, ScriptedPrompt, TerminalPrompt};

/// Stand-in assignment target that makes a bare literal a valid statement.
const DUMMY_LHS: &str = "x=";

const USE_STRICT: &str = "use strict";

/// Options of a wrap run.
pub struct WrapOptions<'a> {
    pub translator: String,
    pub message: String,
    /// Module the translator is imported from.
    pub translator_require: String,
    /// Ask the prompt for every candidate; `false` wraps them all.
    pub prompt: bool,
    /// Characters that may not border a control message.
    pub bound_exclude_chars: String,
    /// Literals whose value matches any of these are never wrapped.
    pub ignore_texts: Vec<Regex>,
    /// Blocks wrapping a node; its children are still visited.
    pub skip_node: Option<&'a dyn Fn(&SyntaxNode) -> bool>,
    /// Prunes a child slot of a node.
    pub skip_property: Option<&'a dyn Fn(&str, &SyntaxNode) -> bool>,
}

impl WrapOptions<'_> {
    pub fn from_config(config: &Config, prompt: bool) -> Result<Self> {
        Ok(Self {
            translator: config.translator.clone(),
            message: config.translator_message.clone(),
            translator_require: config.translator_require.clone(),
            prompt,
            bound_exclude_chars: config.bound_exclude_chars.clone(),
            ignore_texts: config.ignore_text_regexes()?,
            skip_node: None,
            skip_property: None,
        })
    }

    fn is_ignored_text(&self, text: &str) -> bool {
        self.ignore_texts.iter().any(|re| re.is_match(text))
    }

    fn is_skipped(&self, node: &SyntaxNode) -> bool {
        self.skip_node.is_some_and(|skip| skip(node))
            || node
                .value
                .as_deref()
                .is_some_and(|value| self.is_ignored_text(value))
    }

    fn is_pruned(&self, slot: &str, parent: &SyntaxNode) -> bool {
        self.skip_property.is_some_and(|skip| skip(slot, parent))
    }
}

impl Default for WrapOptions<'_> {
    fn default() -> Self {
        let config = Config::default();
        Self {
            translator: config.translator,
            message: config.translator_message,
            translator_require: config.translator_require,
            prompt: false,
            bound_exclude_chars: config.bound_exclude_chars,
            ignore_texts: Vec::new(),
            skip_node: None,
            skip_property: None,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WrapStat {
    pub wrapped_texts: usize,
}

/// Result of wrapping one source text.
#[derive(Debug, Clone)]
pub struct WrapOutcome {
    /// Rewritten text; the input unchanged on parse error or abort.
    pub wrapped: String,
    pub stat: WrapStat,
    pub parse_error: Option<String>,
    pub aborted: bool,
    /// Candidates whose substitution failed and were left as they were.
    pub issues: Vec<Issue>,
}

/// The operator asked to stop the run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Aborted;

/// Wrap the candidate literals of `code`.
///
/// With `control_messages` the run is in control-message mode and the
/// worklist's counts are updated in place; custom messages the operator
/// enters are added to it. Template sources always use the interactive
/// policy and ignore the worklist.
pub fn wrap(
    code: &str,
    file: &str,
    config: &GrammarConfig,
    options: &WrapOptions<'_>,
    prompt: &mut dyn Prompt,
    control_messages: Option<&mut Vec<ControlMessageInfo>>,
) -> WrapOutcome {
    let mut session = Session {
        file,
        config,
        options,
        prompt,
        worklist: control_messages,
        issues: Vec::new(),
    };

    let result = match config.grammar {
        Grammar::Template => template::wrap_template(&mut session, code),
        Grammar::Js | Grammar::Lua => session.wrap_script(code, None),
    };

    match result {
        Ok(script) => WrapOutcome {
            wrapped: script.text,
            stat: WrapStat {
                wrapped_texts: script.count,
            },
            parse_error: script.parse_error,
            aborted: false,
            issues: session.issues,
        },
        Err(Aborted) => WrapOutcome {
            wrapped: code.to_string(),
            stat: WrapStat::default(),
            parse_error: None,
            aborted: true,
            issues: session.issues,
        },
    }
}

// ============================================================
// Quotes
// ============================================================

/// Delimiters of a string literal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Quotes {
    pub left: String,
    pub right: String,
}

impl Quotes {
    /// Quotes of a raw literal: `"`, a long bracket `[==[`, or `'`.
    pub fn of(literal: &str) -> Self {
        if literal.starts_with('"') {
            return Self::symmetric("\"");
        }
        if let Some(rest) = literal.strip_prefix('[') {
            let equals = rest.len() - rest.trim_start_matches('=').len();
            if rest[equals..].starts_with('[') {
                let level = "=".repeat(equals);
                return Self {
                    left: format!("[{}[", level),
                    right: format!("]{}]", level),
                };
            }
        }
        Self::symmetric("'")
    }

    fn symmetric(quote: &str) -> Self {
        Self {
            left: quote.to_string(),
            right: quote.to_string(),
        }
    }

    /// Quote text as a template helper argument. Handlebars only unescapes
    /// the delimiting quote, so backslashes are kept as they are.
    pub fn quote_helper_argument(&self, text: &str) -> String {
        if self.left.len() > 1 {
            return self.quote(text);
        }
        let escaped = text.replace(self.left.as_str(), &format!("\\{}", self.left));
        format!("{}{}{}", self.left, escaped, self.right)
    }

    /// Quote arbitrary text, escaping it for single-character quotes.
    pub fn quote(&self, text: &str) -> String {
        if self.left.len() > 1 {
            return format!("{}{}{}", self.left, text, self.right);
        }
        let escaped = text
            .replace('\\', "\\\\")
            .replace(self.left.as_str(), &format!("\\{}", self.left));
        format!("{}{}{}", self.left, escaped, self.right)
    }
}

// ============================================================
// Session
// ============================================================

/// Remaining work of "wrap remaining control messages in a literal".
struct Inline {
    /// The one control message this pass looks for.
    only: String,
    /// Control messages still present in the literal, for display.
    remains: Vec<String>,
    /// Source around the original literal, for display.
    before: String,
    after: String,
}

struct ScriptOutcome {
    text: String,
    count: usize,
    skip_rest: bool,
    parse_error: Option<String>,
}

struct Substitution {
    text: String,
    count: usize,
    skip_rest: bool,
}

impl Substitution {
    fn unchanged(literal: &str) -> Self {
        Self {
            text: literal.to_string(),
            count: 0,
            skip_rest: false,
        }
    }
}

enum SpliceError {
    Aborted,
    Invalid(String),
}

impl From<Aborted> for SpliceError {
    fn from(_: Aborted) -> Self {
        SpliceError::Aborted
    }
}

/// How a wrapped literal is written: `before literal[sep ctx] after`.
struct CallShape {
    before: String,
    separator: &'static str,
    after: &'static str,
}

struct Session<'a, 'p> {
    file: &'a str,
    config: &'a GrammarConfig,
    options: &'a WrapOptions<'a>,
    prompt: &'p mut dyn Prompt,
    worklist: Option<&'p mut Vec<ControlMessageInfo>>,
    issues: Vec<Issue>,
}

impl Session<'_, '_> {
    fn call_shape(&self) -> CallShape {
        match self.config.grammar {
            Grammar::Template => CallShape {
                before: format!("({} ", self.helper_name()),
                separator: " ",
                after: ")",
            },
            Grammar::Js | Grammar::Lua => CallShape {
                before: format!("{}.{}(", self.options.translator, self.options.message),
                separator: ", ",
                after: ")",
            },
        }
    }

    fn helper_name(&self) -> &str {
        self.config
            .callee_property_names
            .first()
            .map_or("MSG", String::as_str)
    }

    fn decide(&mut self, request: &PromptRequest<'_>) -> Decision {
        if self.options.prompt {
            self.prompt.decide(request)
        } else {
            Decision::Wrap
        }
    }

    fn worklist(&self) -> &[ControlMessageInfo] {
        self.worklist.as_deref().map_or(&[][..], Vec::as_slice)
    }

    fn count(&mut self, message: &str, wrapped: bool) {
        let Some(worklist) = self.worklist.as_deref_mut() else {
            return;
        };
        if let Some(info) = worklist.iter_mut().find(|m| m.message == message) {
            if wrapped {
                info.counts.wrapped += 1;
            } else {
                info.counts.candidate += 1;
            }
        }
    }

    /// Parse and wrap a script (or template) text in one pass.
    fn wrap_script(&mut self, code: &str, inline: Option<&Inline>) -> Result<ScriptOutcome, Aborted> {
        let ast = match self.config.grammar.parse(code, self.file) {
            Ok(ast) => ast,
            Err(e) => {
                return Ok(ScriptOutcome {
                    text: code.to_string(),
                    count: 0,
                    skip_rest: false,
                    parse_error: Some(format!("{:#}", e)),
                });
            }
        };

        let mut splicer = Splicer {
            session: self,
            inline,
            code,
            index: LineIndex::new(code),
            text: code.to_string(),
            offset: 0,
            count: 0,
            declared: false,
            skip_rest: false,
        };
        if let ControlFlow::Break(aborted) = walk(&ast, &mut splicer) {
            return Err(aborted);
        }
        let Splicer {
            text,
            count,
            declared,
            skip_rest,
            ..
        } = splicer;

        let text = if inline.is_none() && count > 0 && !declared {
            self.inject_import(&text)
        } else {
            text
        };
        Ok(ScriptOutcome {
            text,
            count,
            skip_rest,
            parse_error: None,
        })
    }

    fn substitute(
        &mut self,
        literal: &str,
        before: &str,
        after: &str,
        inline: Option<&Inline>,
    ) -> Result<Substitution, SpliceError> {
        if self.worklist.is_some() {
            self.substitute_controls(literal, before, after, inline)
        } else {
            self.substitute_literal(literal, before, after)
        }
    }

    /// Interactive policy: wrap the literal as a whole.
    fn substitute_literal(
        &mut self,
        literal: &str,
        before: &str,
        after: &str,
    ) -> Result<Substitution, SpliceError> {
        let decision = self.decide(&PromptRequest {
            candidate: literal,
            left: "",
            right: "",
            before,
            after,
            control_messages: None,
        });
        let shape = self.call_shape();
        let text = match decision {
            Decision::Wrap => format!("{}{}{}", shape.before, literal, shape.after),
            Decision::WrapWithContext => format!(
                "{}{}{}'{}'{}",
                shape.before, literal, shape.separator, DEFAULT_MESSAGE_CONTEXT, shape.after
            ),
            Decision::Custom => match self.prompt.custom_message() {
                Some(message) => {
                    let quotes = Quotes::of(literal);
                    let quoted = match self.config.grammar {
                        Grammar::Template => quotes.quote_helper_argument(&message),
                        Grammar::Js | Grammar::Lua => quotes.quote(&message),
                    };
                    format!("{}{}{}", shape.before, quoted, shape.after)
                }
                None => return Ok(Substitution::unchanged(literal)),
            },
            Decision::Reject | Decision::SkipRest => return Ok(Substitution::unchanged(literal)),
            Decision::Abort => return Err(SpliceError::Aborted),
        };
        Ok(Substitution {
            text,
            count: 1,
            skip_rest: false,
        })
    }

    /// Control-message policy: wrap the listed phrases inside the literal.
    fn substitute_controls(
        &mut self,
        literal: &str,
        before: &str,
        after: &str,
        inline: Option<&Inline>,
    ) -> Result<Substitution, SpliceError> {
        let remains: Vec<String> = match inline {
            Some(inline) => inline.remains.clone(),
            None => self
                .worklist()
                .iter()
                .filter(|m| literal.contains(m.message.as_str()))
                .map(|m| m.message.clone())
                .collect(),
        };
        let controls: Vec<String> = match inline {
            Some(inline) => vec![inline.only.clone()],
            None => remains.clone(),
        };
        let Some(first) = controls.first().cloned() else {
            return Ok(Substitution::unchanged(literal));
        };
        let (before, after) = match inline {
            Some(inline) => (inline.before.as_str(), inline.after.as_str()),
            None => (before, after),
        };

        let quotes = Quotes::of(literal);
        let concat = self.config.wrap.concat_operator.clone();
        let shape = self.call_shape();
        let mut text = literal.to_string();
        let mut count = 0;
        let mut skip_rest = false;
        let mut message = first.clone();
        let mut trying_custom = false;

        loop {
            let boundary = boundary_regex(&message, &self.options.bound_exclude_chars)?;
            let mut pos = 0;
            let mut matched = false;
            let mut stop = None;

            while let Some((whole, pl, p, pr)) = next_match(&boundary, &text, pos) {
                let index = whole.start;

                if !matched
                    && trying_custom
                    && let Some(worklist) = self.worklist.as_deref_mut()
                {
                    insert_control_message(worklist, &message);
                }
                matched = true;
                self.count(&message, false);

                let decision = self.decide(&PromptRequest {
                    candidate: &p,
                    left: &text[..index + pl.len()],
                    right: &text[index + pl.len() + p.len()..],
                    before,
                    after,
                    control_messages: Some(&remains),
                });
                let context = match decision {
                    Decision::Wrap => None,
                    Decision::WrapWithContext => Some(DEFAULT_MESSAGE_CONTEXT),
                    Decision::Reject => {
                        pos = whole.end - pr.len();
                        continue;
                    }
                    Decision::SkipRest | Decision::Custom => {
                        stop = Some(decision);
                        break;
                    }
                    Decision::Abort => return Err(SpliceError::Aborted),
                };

                let concat_left = index >= quotes.left.len();
                let concat_right = whole.end - pr.len() < text.len() - quotes.right.len();

                let mut replaced = String::new();
                if concat_left {
                    replaced.push_str(&pl);
                    replaced.push_str(&quotes.right);
                    replaced.push_str(&concat);
                }
                replaced.push_str(&shape.before);
                replaced.push_str(&quotes.left);
                replaced.push_str(&p);
                if let Some(context) = context {
                    replaced.push_str(&quotes.right);
                    replaced.push_str(shape.separator);
                    replaced.push_str(&quotes.left);
                    replaced.push_str(context);
                }
                replaced.push_str(&quotes.right);
                replaced.push_str(shape.after);
                if concat_right {
                    replaced.push_str(&concat);
                    replaced.push_str(&quotes.left);
                    replaced.push_str(&pr);
                }

                let start_cut = if concat_left {
                    index
                } else {
                    index + pl.len() - quotes.left.len()
                };
                let end_cut = if concat_right {
                    whole.end
                } else {
                    whole.end - pr.len() + quotes.right.len()
                };
                let (Some(head), Some(tail)) = (text.get(..start_cut), text.get(end_cut..)) else {
                    return Err(SpliceError::Invalid(format!(
                        "cannot split literal around \"{}\"",
                        p
                    )));
                };
                text = format!("{}{}{}", head, replaced, tail);
                pos = start_cut + replaced.len() - if concat_right { pr.len() } else { 0 };

                count += 1;
                self.count(&message, true);
            }

            match stop {
                Some(Decision::SkipRest) => {
                    skip_rest = true;
                    break;
                }
                Some(Decision::Custom) => match self.prompt.custom_message() {
                    Some(custom) => {
                        message = custom;
                        trying_custom = true;
                    }
                    None => {
                        message = first.clone();
                        trying_custom = false;
                    }
                },
                _ if trying_custom && !matched => {
                    message = first.clone();
                    trying_custom = false;
                }
                _ => break,
            }
        }

        if !skip_rest {
            let (text_after, nested_count) =
                self.wrap_remaining_controls(text, &controls, &remains, before, after)?;
            text = text_after;
            count += nested_count;
        }

        Ok(Substitution {
            text,
            count,
            skip_rest,
        })
    }

    /// Wrap remaining control messages in a literal.
    ///
    /// After the first control message was handled inline, the literal may
    /// already be split into several pieces. Each further message is wrapped
    /// by re-running the wrapper on `x=<text>`, which keeps the pieces a
    /// valid statement, and stripping the stand-in again.
    fn wrap_remaining_controls(
        &mut self,
        mut text: String,
        controls: &[String],
        remains: &[String],
        before: &str,
        after: &str,
    ) -> Result<(String, usize), SpliceError> {
        let mut count = 0;
        for (i, only) in controls.iter().enumerate().skip(1) {
            let inline = Inline {
                only: only.clone(),
                remains: remains.get(i..).map(<[String]>::to_vec).unwrap_or_default(),
                before: before.to_string(),
                after: after.to_string(),
            };
            let nested = self.wrap_script(&format!("{}{}", DUMMY_LHS, text), Some(&inline))?;
            let Some(rest) = nested.text.strip_prefix(DUMMY_LHS) else {
                return Err(SpliceError::Invalid(
                    "rewritten literal lost its stand-in target".to_string(),
                ));
            };
            text = rest.to_string();
            count += nested.count;
            if nested.skip_rest {
                break;
            }
        }
        Ok((text, count))
    }

    /// Insert the translator import after a leading strict-mode pragma, or
    /// at the top.
    fn inject_import(&self, text: &str) -> String {
        let Some(template) = self.config.require_template else {
            return text.to_string();
        };
        let declaration = format_template(
            template,
            &[
                ("translator", &self.options.translator),
                ("translatorRequire", &self.options.translator_require),
            ],
        );

        if self.config.grammar == Grammar::Js
            && let Some(index) = text.find(USE_STRICT)
            && index > 0
            && matches!(text[..index].trim_start(), "'" | "\"")
        {
            let cut = index + USE_STRICT.len() + 2;
            if let (Some(head), Some(tail)) = (text.get(..cut), text.get(cut..)) {
                return format!("{}\n\n{}{}", head, declaration, tail);
            }
        }
        format!("{}\n\n{}", declaration, text)
    }
}

/// Next boundary match at or after `pos`: the whole match and its
/// left border, phrase and right border.
fn next_match(
    boundary: &Regex,
    text: &str,
    pos: usize,
) -> Option<(Range<usize>, String, String, String)> {
    let caps = boundary.captures_at(text, pos)?;
    Some((
        caps.get(0)?.range(),
        caps.get(1)?.as_str().to_string(),
        caps.get(2)?.as_str().to_string(),
        caps.get(3)?.as_str().to_string(),
    ))
}

/// `([^B])(message)([^B])` with `B` the excluded boundary characters.
fn boundary_regex(message: &str, bound_exclude_chars: &str) -> Result<Regex, SpliceError> {
    let pattern = format!(
        "([^{b}])({m})([^{b}])",
        b = bound_exclude_chars,
        m = regex::escape(message)
    );
    Regex::new(&pattern).map_err(|e| SpliceError::Invalid(e.to_string()))
}

// ============================================================
// Splicer
// ============================================================

struct Splicer<'s, 'a, 'p> {
    session: &'s mut Session<'a, 'p>,
    inline: Option<&'s Inline>,
    /// Text the tree was parsed from.
    code: &'s str,
    index: LineIndex<'s>,
    /// Rewritten text.
    text: String,
    offset: isize,
    count: usize,
    declared: bool,
    skip_rest: bool,
}

impl Splicer<'_, '_, '_> {
    fn splice(&mut self, start: usize, end: usize, bare: bool) -> Result<(), SpliceError> {
        let invalid =
            || SpliceError::Invalid(format!("span {}..{} is outside the rewritten text", start, end));
        let shifted_start = start.checked_add_signed(self.offset).ok_or_else(invalid)?;
        let shifted_end = end.checked_add_signed(self.offset).ok_or_else(invalid)?;
        let (Some(before), Some(literal), Some(after)) = (
            self.text.get(..shifted_start),
            self.text.get(shifted_start..shifted_end),
            self.text.get(shifted_end..),
        ) else {
            return Err(invalid());
        };

        let substitution = self.session.substitute(literal, before, after, self.inline)?;
        self.skip_rest |= substitution.skip_rest;
        if substitution.count == 0 {
            return Ok(());
        }

        let replaced = if bare {
            format!("({})", substitution.text)
        } else {
            substitution.text
        };
        let delta = replaced.len() as isize - literal.len() as isize;
        self.text = format!("{}{}{}", before, replaced, after);
        self.offset += delta;
        self.count += substitution.count;
        Ok(())
    }
}

impl Visitor for Splicer<'_, '_, '_> {
    type Break = Aborted;

    fn visit(&mut self, node: &SyntaxNode) -> ControlFlow<Aborted> {
        let config = self.session.config;
        if config.is_translator_import(node, &self.session.options.translator_require) {
            self.declared = true;
        }
        if !config.is_wrap_candidate(node) || self.session.options.is_skipped(node) {
            return ControlFlow::Continue(());
        }

        let (start, end) = node.span.resolve(&self.index);
        match self.splice(start, end, node.bare_argument) {
            Ok(()) => ControlFlow::Continue(()),
            Err(SpliceError::Aborted) => ControlFlow::Break(Aborted),
            Err(SpliceError::Invalid(error)) => {
                self.session
                    .issues
                    .push(Issue::SubstitutionFailure(SubstitutionFailureIssue {
                        context: SourceContext::at_offset(self.session.file, self.code, start),
                        literal: self.code.get(start..end).unwrap_or_default().to_string(),
                        error,
                    }));
                ControlFlow::Continue(())
            }
        }
    }

    fn prune(&mut self, slot: &str, parent: &SyntaxNode) -> bool {
        self.session.options.is_pruned(slot, parent)
            || self.session.config.is_wrap_pruned(slot, parent)
    }
}

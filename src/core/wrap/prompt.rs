//! Operator decisions for wrap candidates.
//!
//! The wrapper never talks to a terminal itself: every decision goes through
//! a [`Prompt`]. [`TerminalPrompt`] asks a human on stdin, [`ScriptedPrompt`]
//! replays queued answers.

use std::collections::VecDeque;
use std::io::{self, BufRead, Write};

use colored::Colorize;
use regex::Regex;

use crate::utils::text_line_count;

/// What the operator chose for one candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Wrap,
    WrapWithContext,
    Reject,
    /// Leave the rest of the current literal alone (control mode).
    SkipRest,
    /// Replace the candidate with a message read from [`Prompt::custom_message`].
    Custom,
    Abort,
}

/// A candidate presented to the operator.
#[derive(Debug, Clone, Copy)]
pub struct PromptRequest<'a> {
    /// Text about to be wrapped: the matched phrase or the whole literal.
    pub candidate: &'a str,
    /// Literal text before and after the candidate.
    pub left: &'a str,
    pub right: &'a str,
    /// Source text before and after the literal.
    pub before: &'a str,
    pub after: &'a str,
    /// Control messages present in the literal, in control mode.
    pub control_messages: Option<&'a [String]>,
}

impl PromptRequest<'_> {
    /// 1-based line the literal starts on.
    pub fn line(&self) -> usize {
        text_line_count(self.before)
    }
}

pub trait Prompt {
    fn decide(&mut self, request: &PromptRequest<'_>) -> Decision;

    /// Free-text replacement after a [`Decision::Custom`]; `None` cancels it.
    fn custom_message(&mut self) -> Option<String>;
}

// ============================================================
// Terminal
// ============================================================

/// Asks on stdin, echoing the candidate highlighted inside its line.
pub struct TerminalPrompt {
    wrapped: Option<Regex>,
}

impl TerminalPrompt {
    /// `translator` and `message` name the calls that are highlighted as
    /// already wrapped.
    pub fn new(translator: &str, message: &str) -> Self {
        let pattern = format!(
            r"{}\.{}\([\s\S]+?\)",
            regex::escape(translator),
            regex::escape(message)
        );
        Self {
            wrapped: Regex::new(&pattern).ok(),
        }
    }

    fn highlight_wrapped(&self, text: &str) -> String {
        match &self.wrapped {
            Some(wrapped) => wrapped
                .replace_all(text, |caps: &regex::Captures| caps[0].green().to_string())
                .into_owned(),
            None => text.to_string(),
        }
    }

    fn query(&self, request: &PromptRequest<'_>) -> String {
        let before = request
            .before
            .rfind('\n')
            .map_or(request.before, |i| &request.before[i + 1..]);
        let after = request
            .after
            .find('\n')
            .map_or(request.after, |i| &request.after[..i]);

        let mut query = format!("\n{} line {}\n\n", "-".repeat(80), request.line())
            .dimmed()
            .to_string();
        query.push_str(&self.highlight_wrapped(&format!("{}{}", before, request.left)));
        query.push_str(&request.candidate.bold().yellow().to_string());
        query.push_str(&self.highlight_wrapped(&format!("{}{}", request.right, after)));
        let tail = match request.control_messages {
            Some(_) => format!("\n\n...\n{}\n[y,n,c,q,l,>,x]? ", request.candidate),
            None => "\n\n...[y,n,c,q,x]? ".to_string(),
        };
        query.push_str(&tail.dimmed().to_string());
        query
    }

    fn read_line(&self) -> Option<String> {
        let mut line = String::new();
        match io::stdin().lock().read_line(&mut line) {
            Ok(0) | Err(_) => None,
            Ok(_) => Some(line.trim().to_string()),
        }
    }

    fn confirm_abort(&self) -> bool {
        print!("Do you want abort? [y/N] ");
        let _ = io::stdout().flush();
        self.read_line()
            .is_some_and(|answer| answer.eq_ignore_ascii_case("y"))
    }
}

impl Prompt for TerminalPrompt {
    fn decide(&mut self, request: &PromptRequest<'_>) -> Decision {
        let control_mode = request.control_messages.is_some();
        let query = self.query(request);
        loop {
            print!("{}", query);
            let _ = io::stdout().flush();
            let Some(answer) = self.read_line() else {
                return Decision::Abort;
            };
            match answer.as_str() {
                "y" => return Decision::Wrap,
                "c" => return Decision::WrapWithContext,
                "n" => return Decision::Reject,
                "q" => return Decision::Custom,
                ">" if control_mode => return Decision::SkipRest,
                "l" if control_mode => {
                    println!();
                    for message in request.control_messages.unwrap_or_default() {
                        println!("{}", message.dimmed());
                    }
                }
                "x" if self.confirm_abort() => return Decision::Abort,
                _ => {}
            }
        }
    }

    fn custom_message(&mut self) -> Option<String> {
        print!("Message: ");
        let _ = io::stdout().flush();
        self.read_line().filter(|message| !message.is_empty())
    }
}

// ============================================================
// Scripted
// ============================================================

/// Replays queued decisions; once the queue is empty every candidate is
/// rejected.
#[derive(Debug, Default)]
pub struct ScriptedPrompt {
    decisions: VecDeque<Decision>,
    custom_messages: VecDeque<String>,
    /// Candidates that were presented, in order.
    pub asked: Vec<String>,
}

impl ScriptedPrompt {
    pub fn new(decisions: impl IntoIterator<Item = Decision>) -> Self {
        Self {
            decisions: decisions.into_iter().collect(),
            ..Default::default()
        }
    }

    pub fn with_custom_messages(mut self, messages: impl IntoIterator<Item = String>) -> Self {
        self.custom_messages = messages.into_iter().collect();
        self
    }
}

impl Prompt for ScriptedPrompt {
    fn decide(&mut self, request: &PromptRequest<'_>) -> Decision {
        self.asked.push(request.candidate.to_string());
        self.decisions.pop_front().unwrap_or(Decision::Reject)
    }

    fn custom_message(&mut self) -> Option<String> {
        self.custom_messages.pop_front()
    }
}

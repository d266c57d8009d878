use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use colored::Colorize;

use super::{ControlMessageInfo, Prompt, WrapOptions, merge_counts, wrap};
use crate::core::collect::relative_path;
use crate::core::grammar::{Grammar, Grammars};
use crate::issues::{Issue, ParseErrorIssue};

/// Per-file result of a wrap run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileWrapResult {
    /// Path relative to the run's base directory.
    pub file: String,
    pub wrapped_texts: usize,
    /// Whether the rewritten text was written back.
    pub written: bool,
}

pub struct WrapFilesResult {
    /// Files that had at least one wrap, in processing order.
    pub files: Vec<FileWrapResult>,
    pub processed_count: usize,
    pub wrapped_texts: usize,
    pub aborted: bool,
    pub issues: Vec<Issue>,
    /// Control-message counts summed over all files, in control mode.
    pub control_messages: Option<Vec<ControlMessageInfo>>,
}

/// Wrap `files` one at a time.
///
/// Each file starts from a fresh copy of `control_messages`, so a custom
/// message entered in one file does not carry over to the next; the counts
/// of every file are summed into the result. A file is written only if its
/// text changed, the run was not aborted while on it and `dry_run` is off.
/// On abort no further file is started.
#[allow(clippy::too_many_arguments)]
pub fn wrap_files(
    base_dir: &str,
    files: &[String],
    grammars: &Grammars,
    options: &WrapOptions<'_>,
    prompt: &mut dyn Prompt,
    control_messages: Option<&[ControlMessageInfo]>,
    dry_run: bool,
    verbose: bool,
) -> Result<WrapFilesResult> {
    let mut result = WrapFilesResult {
        files: Vec::new(),
        processed_count: 0,
        wrapped_texts: 0,
        aborted: false,
        issues: Vec::new(),
        control_messages: control_messages.map(|_| Vec::new()),
    };

    for (i, file_path) in files.iter().enumerate() {
        let Some(grammar) = Grammar::from_path(Path::new(file_path)) else {
            continue;
        };
        let src = relative_path(base_dir, file_path);
        if verbose {
            eprintln!(
                "{} {} of {}: {}",
                "Processing file".cyan(),
                i + 1,
                files.len(),
                src
            );
        }

        let code = match fs::read_to_string(file_path) {
            Ok(code) => code,
            Err(e) => {
                result.issues.push(Issue::ParseError(ParseErrorIssue {
                    file_path: src,
                    error: format!("Failed to read file: {}", e),
                }));
                continue;
            }
        };

        let mut worklist = control_messages.map(<[ControlMessageInfo]>::to_vec);
        let outcome = wrap(
            &code,
            &src,
            grammars.get(grammar),
            options,
            prompt,
            worklist.as_mut(),
        );
        result.processed_count += 1;
        result.issues.extend(outcome.issues);
        if let (Some(totals), Some(worklist)) = (result.control_messages.as_mut(), &worklist) {
            merge_counts(totals, worklist);
        }

        if outcome.aborted {
            result.aborted = true;
            break;
        }
        if let Some(error) = outcome.parse_error {
            result.issues.push(Issue::ParseError(ParseErrorIssue {
                file_path: src,
                error,
            }));
            continue;
        }
        if outcome.stat.wrapped_texts == 0 || outcome.wrapped == code {
            continue;
        }

        if !dry_run {
            fs::write(file_path, &outcome.wrapped)
                .with_context(|| format!("Failed to write file: {}", file_path))?;
        }
        result.wrapped_texts += outcome.stat.wrapped_texts;
        result.files.push(FileWrapResult {
            file: src,
            wrapped_texts: outcome.stat.wrapped_texts,
            written: !dry_run,
        });
    }

    Ok(result)
}

use std::path::PathBuf;
use std::process::ExitCode;

use crate::catalog::CatalogStats;
use crate::core::wrap::FileWrapResult;
use crate::issues::{Issue, TransferOperation};

/// Exit status for CLI commands.
///
/// - `Success` (0): Command completed, nothing to report
/// - `Failure` (1): Command completed with per-file or per-item problems, or
///   the operator aborted a wrap run
/// - `Error` (2): Command failed due to internal error (config error, I/O error, etc.)
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ExitStatus {
    Success,
    Failure,
    Error,
}

impl From<ExitStatus> for ExitCode {
    fn from(status: ExitStatus) -> Self {
        match status {
            ExitStatus::Success => ExitCode::from(0),
            ExitStatus::Failure => ExitCode::from(1),
            ExitStatus::Error => ExitCode::from(2),
        }
    }
}

#[derive(Debug)]
pub enum CommandSummary {
    Init(InitSummary),
    Collect(CollectSummary),
    Wrap(WrapSummary),
    Annotate(AnnotateSummary),
    Transfer(TransferSummary),
    Stats(StatsSummary),
}

#[derive(Debug)]
pub struct InitSummary {
    /// Set when the config file could not be created.
    pub error: Option<String>,
}

#[derive(Debug)]
pub struct CollectSummary {
    pub files_parsed: usize,
    pub message_count: usize,
    pub occurrences: usize,
    pub template_path: PathBuf,
    pub created_locales: Vec<String>,
    pub merged_locales: Vec<String>,
}

#[derive(Debug)]
pub struct WrapSummary {
    pub files: Vec<FileWrapResult>,
    pub processed_count: usize,
    pub wrapped_texts: usize,
    pub is_dry_run: bool,
    pub aborted: bool,
    pub report_path: Option<PathBuf>,
}

#[derive(Debug)]
pub struct AnnotateSummary {
    /// Catalog path and number of items annotated in it.
    pub catalogs: Vec<(PathBuf, usize)>,
}

#[derive(Debug)]
pub struct TransferSummary {
    pub operation: TransferOperation,
    pub updated: usize,
    pub unmatched: usize,
    pub output: PathBuf,
}

#[derive(Debug)]
pub struct StatsSummary {
    pub catalogs: Vec<(PathBuf, CatalogStats)>,
    pub json: bool,
}

/// Result of running a harvest command.
pub struct CommandResult {
    pub summary: CommandSummary,
    /// Per-file and per-item problems, sorted.
    pub issues: Vec<Issue>,
    pub parse_error_count: usize,
}

impl CommandResult {
    pub fn new(summary: CommandSummary, mut issues: Vec<Issue>) -> Self {
        issues.sort();
        let parse_error_count = issues
            .iter()
            .filter(|i| matches!(i, Issue::ParseError(_)))
            .count();
        Self {
            summary,
            issues,
            parse_error_count,
        }
    }

    pub fn exit_status(&self) -> ExitStatus {
        let failed = match &self.summary {
            CommandSummary::Init(summary) => summary.error.is_some(),
            CommandSummary::Wrap(summary) => summary.aborted,
            _ => false,
        };
        if failed || !self.issues.is_empty() {
            ExitStatus::Failure
        } else {
            ExitStatus::Success
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::cli::commands::command_result::*;
    use crate::issues::ParseErrorIssue;
    use pretty_assertions::assert_eq;

    fn wrap_summary(aborted: bool) -> CommandSummary {
        CommandSummary::Wrap(WrapSummary {
            files: Vec::new(),
            processed_count: 0,
            wrapped_texts: 0,
            is_dry_run: false,
            aborted,
            report_path: None,
        })
    }

    #[test]
    fn exit_code_values() {
        assert_eq!(ExitCode::from(ExitStatus::Success), ExitCode::from(0));
        assert_eq!(ExitCode::from(ExitStatus::Failure), ExitCode::from(1));
        assert_eq!(ExitCode::from(ExitStatus::Error), ExitCode::from(2));
    }

    #[test]
    fn test_exit_status() {
        assert_eq!(
            CommandResult::new(wrap_summary(false), Vec::new()).exit_status(),
            ExitStatus::Success
        );
        assert_eq!(
            CommandResult::new(wrap_summary(true), Vec::new()).exit_status(),
            ExitStatus::Failure
        );

        let issue = Issue::ParseError(ParseErrorIssue {
            file_path: "a.js".to_string(),
            error: "x".to_string(),
        });
        let result = CommandResult::new(wrap_summary(false), vec![issue]);
        assert_eq!(result.parse_error_count, 1);
        assert_eq!(result.exit_status(), ExitStatus::Failure);
    }
}

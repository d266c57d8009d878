//! Diagnostic types produced by collection, wrapping and catalog runs.
//!
//! None of these stop a run: each is recorded against the file, the
//! candidate or the catalog item it concerns, and the run moves on. The CLI
//! prints them through the [`Report`] trait.

use enum_dispatch::enum_dispatch;

// ============================================================
// Severity and Rule
// ============================================================

/// Severity level of an issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Error,
    Warning,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Error => write!(f, "error"),
            Severity::Warning => write!(f, "warning"),
        }
    }
}

/// Rule identifier for each issue type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Rule {
    ParseError,
    SubstitutionFailure,
    UnmatchedTransferItem,
    MergeToolFailure,
}

impl std::fmt::Display for Rule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Rule::ParseError => write!(f, "parse-error"),
            Rule::SubstitutionFailure => write!(f, "substitution-failure"),
            Rule::UnmatchedTransferItem => write!(f, "unmatched-transfer-item"),
            Rule::MergeToolFailure => write!(f, "merge-tool-failure"),
        }
    }
}

// ============================================================
// Locations
// ============================================================

/// A position in a source file, with the text of its line for display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceContext {
    pub file_path: String,
    /// 1-based line.
    pub line: usize,
    /// 1-based column, in characters.
    pub col: usize,
    pub source_line: String,
}

impl SourceContext {
    /// Build the context of byte `offset` inside `text`.
    pub fn at_offset(file_path: &str, text: &str, offset: usize) -> Self {
        let offset = offset.min(text.len());
        let line_start = text[..offset].rfind('\n').map_or(0, |i| i + 1);
        let line_end = text[offset..].find('\n').map_or(text.len(), |i| offset + i);
        let line = text[..line_start].matches('\n').count() + 1;
        let col = text[line_start..offset].chars().count() + 1;
        Self {
            file_path: file_path.to_string(),
            line,
            col,
            source_line: text[line_start..line_end].to_string(),
        }
    }
}

/// Which catalog operation left an item unmatched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferOperation {
    Transfer,
    Restore,
}

impl std::fmt::Display for TransferOperation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TransferOperation::Transfer => write!(f, "transfer"),
            TransferOperation::Restore => write!(f, "restore"),
        }
    }
}

// ============================================================
// Issue Types
// ============================================================

/// File could not be read or parsed; it contributes nothing to the run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseErrorIssue {
    pub file_path: String,
    pub error: String,
}

impl ParseErrorIssue {
    pub fn severity() -> Severity {
        Severity::Error
    }

    pub fn rule() -> Rule {
        Rule::ParseError
    }
}

/// A wrap candidate whose replacement could not be computed; it was left
/// unwrapped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubstitutionFailureIssue {
    pub context: SourceContext,
    pub literal: String,
    pub error: String,
}

impl SubstitutionFailureIssue {
    pub fn severity() -> Severity {
        Severity::Warning
    }

    pub fn rule() -> Rule {
        Rule::SubstitutionFailure
    }
}

/// Source catalog item with no counterpart in the destination catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnmatchedTransferItemIssue {
    pub catalog_path: String,
    pub operation: TransferOperation,
    pub msgid: String,
    pub msgctxt: Option<String>,
}

impl UnmatchedTransferItemIssue {
    pub fn severity() -> Severity {
        Severity::Warning
    }

    pub fn rule() -> Rule {
        Rule::UnmatchedTransferItem
    }
}

/// The external merge tool failed for one locale.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergeToolFailureIssue {
    pub catalog_path: String,
    pub locale: String,
    pub error: String,
}

impl MergeToolFailureIssue {
    pub fn severity() -> Severity {
        Severity::Error
    }

    pub fn rule() -> Rule {
        Rule::MergeToolFailure
    }
}

// ============================================================
// Issue Enum
// ============================================================

#[enum_dispatch(Report)]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Issue {
    ParseError(ParseErrorIssue),
    SubstitutionFailure(SubstitutionFailureIssue),
    UnmatchedTransferItem(UnmatchedTransferItemIssue),
    MergeToolFailure(MergeToolFailureIssue),
}

impl Issue {
    pub fn severity(&self) -> Severity {
        match self {
            Issue::ParseError(_) => ParseErrorIssue::severity(),
            Issue::SubstitutionFailure(_) => SubstitutionFailureIssue::severity(),
            Issue::UnmatchedTransferItem(_) => UnmatchedTransferItemIssue::severity(),
            Issue::MergeToolFailure(_) => MergeToolFailureIssue::severity(),
        }
    }

    pub fn rule(&self) -> Rule {
        match self {
            Issue::ParseError(_) => ParseErrorIssue::rule(),
            Issue::SubstitutionFailure(_) => SubstitutionFailureIssue::rule(),
            Issue::UnmatchedTransferItem(_) => UnmatchedTransferItemIssue::rule(),
            Issue::MergeToolFailure(_) => MergeToolFailureIssue::rule(),
        }
    }
}

// ============================================================
// Report Trait (for CLI output)
// ============================================================

/// Location information for report output.
pub enum ReportLocation<'a> {
    /// Source code location (has source_line for context display).
    Source(&'a SourceContext),
    /// File-level only.
    File { path: &'a str },
}

/// Trait for types that can be reported to CLI.
#[enum_dispatch]
pub trait Report {
    fn location(&self) -> ReportLocation<'_>;

    /// Primary message to display.
    fn message(&self) -> String;

    fn report_severity(&self) -> Severity;

    fn report_rule(&self) -> Rule;

    /// Optional hint for fixing the issue.
    fn hint(&self) -> Option<&str> {
        None
    }

    /// Optional details for the "= note:" line.
    fn details(&self) -> Option<String> {
        None
    }
}

// ============================================================
// Report Implementations
// ============================================================

impl Report for ParseErrorIssue {
    fn location(&self) -> ReportLocation<'_> {
        ReportLocation::File {
            path: &self.file_path,
        }
    }

    fn message(&self) -> String {
        self.error.clone()
    }

    fn report_severity(&self) -> Severity {
        Self::severity()
    }

    fn report_rule(&self) -> Rule {
        Self::rule()
    }

    fn hint(&self) -> Option<&str> {
        Some("the file was left unchanged")
    }
}

impl Report for SubstitutionFailureIssue {
    fn location(&self) -> ReportLocation<'_> {
        ReportLocation::Source(&self.context)
    }

    fn message(&self) -> String {
        self.literal.clone()
    }

    fn report_severity(&self) -> Severity {
        Self::severity()
    }

    fn report_rule(&self) -> Rule {
        Self::rule()
    }

    fn details(&self) -> Option<String> {
        Some(self.error.clone())
    }
}

impl Report for UnmatchedTransferItemIssue {
    fn location(&self) -> ReportLocation<'_> {
        ReportLocation::File {
            path: &self.catalog_path,
        }
    }

    fn message(&self) -> String {
        self.msgid.clone()
    }

    fn report_severity(&self) -> Severity {
        Self::severity()
    }

    fn report_rule(&self) -> Rule {
        Self::rule()
    }

    fn details(&self) -> Option<String> {
        let context = self
            .msgctxt
            .as_deref()
            .map(|c| format!(" (msgctxt \"{}\")", c))
            .unwrap_or_default();
        Some(format!(
            "no destination item to {}{}",
            self.operation, context
        ))
    }
}

impl Report for MergeToolFailureIssue {
    fn location(&self) -> ReportLocation<'_> {
        ReportLocation::File {
            path: &self.catalog_path,
        }
    }

    fn message(&self) -> String {
        self.error.clone()
    }

    fn report_severity(&self) -> Severity {
        Self::severity()
    }

    fn report_rule(&self) -> Rule {
        Self::rule()
    }

    fn details(&self) -> Option<String> {
        Some(format!("locale {}", self.locale))
    }
}

// ============================================================
// Ordering for Issue (for sorting in reports)
// ============================================================

impl Issue {
    fn sort_file_path(&self) -> &str {
        match self.location() {
            ReportLocation::Source(ctx) => &ctx.file_path,
            ReportLocation::File { path } => path,
        }
    }

    fn sort_position(&self) -> (usize, usize) {
        match self.location() {
            ReportLocation::Source(ctx) => (ctx.line, ctx.col),
            ReportLocation::File { .. } => (0, 0),
        }
    }
}

impl Ord for Issue {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.sort_file_path()
            .cmp(other.sort_file_path())
            .then_with(|| self.sort_position().cmp(&other.sort_position()))
            .then_with(|| self.rule().cmp(&other.rule()))
            .then_with(|| self.message().cmp(&other.message()))
    }
}

impl PartialOrd for Issue {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

// ============================================================
// Tests
// ============================================================

//! Report formatting and printing utilities.
//!
//! Issues are displayed in cargo-style format; command summaries are
//! printed as short colored lines. Kept apart from the engine so harvest
//! can be used as a library.

use std::io::{self, Write};

use colored::Colorize;
use unicode_width::UnicodeWidthStr;

use super::commands::{
    AnnotateSummary, CollectSummary, CommandResult, CommandSummary, InitSummary, StatsSummary,
    TransferSummary, WrapSummary,
};
use crate::catalog::CatalogStats;
use crate::config::CONFIG_FILE_NAME;
use crate::issues::{Issue, Report, ReportLocation, Severity, TransferOperation};

/// Success mark for consistent output formatting.
pub const SUCCESS_MARK: &str = "\u{2713}"; // ✓

/// Failure mark for consistent output formatting.
pub const FAILURE_MARK: &str = "\u{2718}"; // ✘

/// Print issues in cargo-style format to stdout.
pub fn report(issues: &[Issue]) {
    report_to(issues, &mut io::stdout().lock());
}

/// Print issues to a custom writer.
pub fn report_to<W: Write>(issues: &[Issue], writer: &mut W) {
    if issues.is_empty() {
        return;
    }

    let mut sorted = issues.to_vec();
    sorted.sort();

    let max_line_width = calculate_max_line_width(&sorted);
    for issue in &sorted {
        print_issue(issue, writer, max_line_width);
    }

    print_summary(&sorted, writer);
}

/// Print a warning about files that could not be parsed.
pub fn print_parse_warning(count: usize, verbose: bool) {
    print_parse_warning_to(count, verbose, &mut io::stderr().lock());
}

/// Print a parse warning to a custom writer.
pub fn print_parse_warning_to<W: Write>(count: usize, verbose: bool, writer: &mut W) {
    if count > 0 && !verbose {
        let _ = writeln!(
            writer,
            "{} {} file(s) could not be parsed and were left unchanged (use {} for details)",
            "warning:".bold().yellow(),
            count,
            "-v".cyan()
        );
    }
}

// ============================================================
// Internal Functions
// ============================================================

fn print_issue<W: Write>(issue: &Issue, writer: &mut W, max_line_width: usize) {
    let severity = issue.report_severity();
    let severity_str = match severity {
        Severity::Error => "error".bold().red(),
        Severity::Warning => "warning".bold().yellow(),
    };

    let _ = writeln!(
        writer,
        "{}: \"{}\"  {}",
        severity_str,
        issue.message(),
        issue.report_rule().to_string().dimmed().cyan()
    );

    match issue.location() {
        ReportLocation::File { path } => {
            let _ = writeln!(writer, "  {} {}", "-->".blue(), path);
        }
        ReportLocation::Source(ctx) => {
            let _ = writeln!(
                writer,
                "  {} {}:{}:{}",
                "-->".blue(),
                ctx.file_path,
                ctx.line,
                ctx.col
            );
            let caret_char = match severity {
                Severity::Error => "^".red(),
                Severity::Warning => "^".yellow(),
            };

            let _ = writeln!(
                writer,
                "{:>width$} {}",
                "",
                "|".blue(),
                width = max_line_width
            );
            let _ = writeln!(
                writer,
                "{:>width$} {} {}",
                ctx.line.to_string().blue(),
                "|".blue(),
                ctx.source_line,
                width = max_line_width
            );

            // col is 1-based
            let prefix: String = ctx.source_line.chars().take(ctx.col.saturating_sub(1)).collect();
            let caret_padding = UnicodeWidthStr::width(prefix.as_str());
            let _ = writeln!(
                writer,
                "{:>width$} {} {:>padding$}{}",
                "",
                "|".blue(),
                "",
                caret_char,
                width = max_line_width,
                padding = caret_padding
            );
        }
    }

    if let Some(details) = issue.details() {
        let _ = writeln!(
            writer,
            "{:>width$} {} {} {}",
            "",
            "=".blue(),
            "note:".bold(),
            details,
            width = max_line_width
        );
    }

    if let Some(hint) = issue.hint() {
        let _ = writeln!(
            writer,
            "{:>width$} {} {} {}",
            "",
            "=".blue(),
            "hint:".bold().cyan(),
            hint,
            width = max_line_width
        );
    }

    let _ = writeln!(writer);
}

fn print_summary<W: Write>(issues: &[Issue], writer: &mut W) {
    let total_errors = issues
        .iter()
        .filter(|i| i.report_severity() == Severity::Error)
        .count();
    let total_warnings = issues.len() - total_errors;

    let _ = writeln!(
        writer,
        "{} {} problems ({} {}, {} {})",
        FAILURE_MARK.red(),
        issues.len(),
        total_errors,
        if total_errors == 1 { "error" } else { "errors" }.red(),
        total_warnings,
        if total_warnings == 1 {
            "warning"
        } else {
            "warnings"
        }
        .yellow()
    );
}

fn calculate_max_line_width(issues: &[Issue]) -> usize {
    issues
        .iter()
        .filter_map(|i| match i.location() {
            ReportLocation::Source(ctx) => Some(ctx.line),
            ReportLocation::File { .. } => None,
        })
        .max()
        .map(|n| n.to_string().len())
        .unwrap_or(1)
}

fn plural(count: usize, one: &'static str, many: &'static str) -> &'static str {
    if count == 1 { one } else { many }
}

// ============================================================
// Command Output
// ============================================================

/// Print the command summary and its issues. Parse errors are folded into
/// one warning line unless `verbose`.
pub fn print(result: &CommandResult, verbose: bool) {
    let mut stdout = io::stdout().lock();
    print_command_output(result, &mut stdout);
    if verbose {
        report_to(&result.issues, &mut stdout);
    } else {
        let shown: Vec<Issue> = result
            .issues
            .iter()
            .filter(|i| !matches!(i, Issue::ParseError(_)))
            .cloned()
            .collect();
        report_to(&shown, &mut stdout);
    }
    drop(stdout);

    print_parse_warning(result.parse_error_count, verbose);
}

fn print_command_output<W: Write>(result: &CommandResult, writer: &mut W) {
    match &result.summary {
        CommandSummary::Init(summary) => print_init(summary, writer),
        CommandSummary::Collect(summary) => print_collect(summary, writer),
        CommandSummary::Wrap(summary) => print_wrap(summary, writer),
        CommandSummary::Annotate(summary) => print_annotate(summary, writer),
        CommandSummary::Transfer(summary) => print_transfer(summary, writer),
        CommandSummary::Stats(summary) => print_stats(summary, writer),
    }
}

fn print_init<W: Write>(summary: &InitSummary, writer: &mut W) {
    match &summary.error {
        Some(error) => {
            let _ = writeln!(writer, "{} {}", FAILURE_MARK.red(), error.red());
        }
        None => {
            let _ = writeln!(
                writer,
                "{} {}",
                SUCCESS_MARK.green(),
                format!("Created {}", CONFIG_FILE_NAME).green()
            );
        }
    }
}

fn print_collect<W: Write>(summary: &CollectSummary, writer: &mut W) {
    let _ = writeln!(
        writer,
        "{} {}",
        SUCCESS_MARK.green(),
        format!(
            "Collected {} {} ({} {}) from {} {}",
            summary.message_count,
            plural(summary.message_count, "message", "messages"),
            summary.occurrences,
            plural(summary.occurrences, "occurrence", "occurrences"),
            summary.files_parsed,
            plural(summary.files_parsed, "file", "files"),
        )
        .green()
    );
    let _ = writeln!(
        writer,
        "  {} {}",
        "Wrote".bold(),
        summary.template_path.display()
    );
    for locale in &summary.created_locales {
        let _ = writeln!(writer, "  {} catalog for {}", "Created".bold(), locale);
    }
    for locale in &summary.merged_locales {
        let _ = writeln!(writer, "  {} {}", "Merged".bold(), locale);
    }
}

fn print_wrap<W: Write>(summary: &WrapSummary, writer: &mut W) {
    for file in &summary.files {
        let _ = writeln!(
            writer,
            "  {}: {} {}",
            file.file,
            file.wrapped_texts,
            plural(file.wrapped_texts, "text", "texts")
        );
    }

    if summary.aborted {
        let _ = writeln!(
            writer,
            "{} {}",
            FAILURE_MARK.red(),
            "Aborted by operator".red()
        );
    }

    let verb = if summary.is_dry_run {
        "Would wrap".yellow().bold()
    } else {
        "Wrapped".green().bold()
    };
    let _ = writeln!(
        writer,
        "{} {} {} in {} of {} processed {}",
        verb,
        summary.wrapped_texts,
        plural(summary.wrapped_texts, "text", "texts"),
        summary.files.len(),
        summary.processed_count,
        plural(summary.processed_count, "file", "files"),
    );
    if summary.is_dry_run && summary.wrapped_texts > 0 {
        let _ = writeln!(writer, "Run without {} to write these changes.", "--dry-run".cyan());
    }
    if let Some(path) = &summary.report_path {
        let _ = writeln!(writer, "  {} {}", "Report".bold(), path.display());
    }
}

fn print_annotate<W: Write>(summary: &AnnotateSummary, writer: &mut W) {
    for (path, annotated) in &summary.catalogs {
        let _ = writeln!(
            writer,
            "{} {}: {} {} annotated",
            SUCCESS_MARK.green(),
            path.display(),
            annotated,
            plural(*annotated, "item", "items")
        );
    }
}

fn print_transfer<W: Write>(summary: &TransferSummary, writer: &mut W) {
    let verb = match summary.operation {
        TransferOperation::Transfer => "Transferred",
        TransferOperation::Restore => "Restored",
    };
    let _ = writeln!(
        writer,
        "{} {}",
        SUCCESS_MARK.green(),
        format!(
            "{} {} {} into {}",
            verb,
            summary.updated,
            plural(summary.updated, "item", "items"),
            summary.output.display()
        )
        .green()
    );
    if summary.unmatched > 0 {
        let _ = writeln!(
            writer,
            "  {} {} without a match",
            summary.unmatched,
            plural(summary.unmatched, "item", "items")
        );
    }
}

fn print_stats<W: Write>(summary: &StatsSummary, writer: &mut W) {
    if summary.json {
        let map: serde_json::Map<String, serde_json::Value> = summary
            .catalogs
            .iter()
            .map(|(path, stats)| {
                (
                    path.display().to_string(),
                    serde_json::to_value(stats).unwrap_or_default(),
                )
            })
            .collect();
        if let Ok(json) = serde_json::to_string_pretty(&map) {
            let _ = writeln!(writer, "{}", json);
        }
        return;
    }

    for (path, stats) in &summary.catalogs {
        print_catalog_stats(path.display().to_string(), stats, writer);
    }
}

fn print_catalog_stats<W: Write>(name: String, stats: &CatalogStats, writer: &mut W) {
    let messages = &stats.messages;
    let context = &stats.context;
    let _ = writeln!(writer, "{}", name.bold());
    let _ = writeln!(
        writer,
        "  messages: {} ({} translated, {} fuzzy)",
        messages.all, messages.translated, messages.fuzzy
    );
    let _ = writeln!(
        writer,
        "    {} chars with spaces, {} chars, {} words",
        messages.text.chars_with_spaces, messages.text.chars, messages.text.words
    );
    let _ = writeln!(writer, "  contexts: {}", context.all);
    let _ = writeln!(
        writer,
        "    {} chars with spaces, {} chars, {} words",
        context.text.chars_with_spaces, context.text.chars, context.text.words
    );
}

#[cfg(test)]
mod tests {
    use crate::cli::report::*;
    use crate::issues::{ParseErrorIssue, SourceContext, SubstitutionFailureIssue};

    fn render(issues: &[Issue]) -> String {
        colored::control::set_override(false);
        let mut out = Vec::new();
        report_to(issues, &mut out);
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_report_file_issue() {
        let issue = Issue::ParseError(ParseErrorIssue {
            file_path: "src/a.js".to_string(),
            error: "Unexpected token".to_string(),
        });
        let text = render(&[issue]);
        assert!(text.contains("error: \"Unexpected token\"  parse-error\n"));
        assert!(text.contains("  --> src/a.js\n"));
        assert!(text.contains("= hint: the file was left unchanged"));
        assert!(text.ends_with("✘ 1 problems (1 error, 0 warnings)\n"));
    }

    #[test]
    fn test_report_source_issue_with_caret() {
        let text = "foo('Привет');";
        let issue = Issue::SubstitutionFailure(SubstitutionFailureIssue {
            context: SourceContext::at_offset("a.js", text, 4),
            literal: "'Привет'".to_string(),
            error: "bad pattern".to_string(),
        });
        let out = render(&[issue]);
        assert!(out.contains("  --> a.js:1:5\n"));
        assert!(out.contains("1 | foo('Привет');\n"));
        assert!(out.contains("  |     ^\n"));
        assert!(out.contains("= note: bad pattern"));
    }

    #[test]
    fn test_report_nothing_for_no_issues() {
        assert_eq!(render(&[]), "");
    }

    #[test]
    fn test_parse_warning_only_when_not_verbose() {
        colored::control::set_override(false);
        let mut out = Vec::new();
        print_parse_warning_to(2, true, &mut out);
        assert!(out.is_empty());
        print_parse_warning_to(2, false, &mut out);
        let text = String::from_utf8(out).unwrap();
        assert!(text.starts_with("warning: 2 file(s) could not be parsed"));
    }
}

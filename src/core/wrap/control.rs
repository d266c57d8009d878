//! Control messages: the batch-mode worklist.

use std::cmp::Ordering;
use std::collections::HashSet;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Per-message match statistics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ControlMessageCounts {
    /// Boundary matches found inside candidate literals.
    pub candidate: usize,
    /// Matches that were wrapped.
    pub wrapped: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ControlMessageInfo {
    pub message: String,
    pub counts: ControlMessageCounts,
}

impl ControlMessageInfo {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            counts: ControlMessageCounts::default(),
        }
    }
}

/// Longer messages first, then lexical.
pub fn by_length_desc(a: &str, b: &str) -> Ordering {
    b.chars()
        .count()
        .cmp(&a.chars().count())
        .then_with(|| a.cmp(b))
}

/// Build a worklist from plain messages.
///
/// Empty strings and duplicates are dropped. Without a `sorter` the list is
/// ordered by [`by_length_desc`], so a phrase is always tried before any
/// shorter phrase it contains.
pub fn prepare_control_messages<I, S>(
    messages: I,
    filter: Option<&dyn Fn(&str) -> bool>,
    sorter: Option<&dyn Fn(&str, &str) -> Ordering>,
) -> Vec<ControlMessageInfo>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let mut seen = HashSet::new();
    let mut messages: Vec<String> = messages
        .into_iter()
        .map(Into::into)
        .filter(|m| !m.is_empty())
        .filter(|m| filter.is_none_or(|f| f(m)))
        .filter(|m| seen.insert(m.clone()))
        .collect();

    match sorter {
        Some(sorter) => messages.sort_by(|a, b| sorter(a, b)),
        None => messages.sort_by(|a, b| by_length_desc(a, b)),
    }

    messages.into_iter().map(ControlMessageInfo::new).collect()
}

/// Add `message` to the worklist if absent, keeping it sorted by length.
pub fn insert_control_message(worklist: &mut Vec<ControlMessageInfo>, message: &str) {
    if worklist.iter().any(|m| m.message == message) {
        return;
    }
    worklist.push(ControlMessageInfo::new(message));
    worklist.sort_by(|a, b| by_length_desc(&a.message, &b.message));
}

/// Add the counts of `other` into `totals`, appending messages `totals` lacks.
pub fn merge_counts(totals: &mut Vec<ControlMessageInfo>, other: &[ControlMessageInfo]) {
    for info in other {
        match totals.iter_mut().find(|m| m.message == info.message) {
            Some(total) => {
                total.counts.candidate += info.counts.candidate;
                total.counts.wrapped += info.counts.wrapped;
            }
            None => totals.push(info.clone()),
        }
    }
}

/// Read messages from a text file, one per line.
pub fn load_control_messages(path: &Path) -> Result<Vec<ControlMessageInfo>> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read control messages: {}", path.display()))?;
    let lines = content
        .lines()
        .map(|line| line.trim_end_matches('\r'))
        .filter(|line| !line.trim().is_empty());
    Ok(prepare_control_messages(lines, None, None))
}

/// Write the per-message counts as a JSON audit report.
pub fn write_control_messages_report(path: &Path, worklist: &[ControlMessageInfo]) -> Result<()> {
    let json = serde_json::to_string_pretty(worklist)
        .context("Failed to serialize control message report")?;
    fs::write(path, json + "\n")
        .with_context(|| format!("Failed to write control message report: {}", path.display()))
}

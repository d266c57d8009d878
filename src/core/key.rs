//! Message key model shared by the collector, the wrapper and the catalog builder.
//!
//! A message key is the catalog lookup identity: the raw key, optionally
//! joined with a context through [`CONTEXT_GLUE`]. The same encoding is used
//! by the runtime formatter that later consumes the catalogs.

use indexmap::IndexMap;
use serde::Serialize;

/// Glue between key and context inside a message key.
///
/// A control character that never occurs in source text.
pub const CONTEXT_GLUE: char = '\u{4}';

/// Context used when the operator asks for "wrap with context".
pub const DEFAULT_MESSAGE_CONTEXT: &str = "L10N_CONTEXT";

/// Join `key` and `context` into a message key.
///
/// An empty or missing context yields the key unchanged.
pub fn build_message_key(key: &str, context: Option<&str>) -> String {
    match context {
        Some(context) if !context.is_empty() => format!("{}{}{}", key, CONTEXT_GLUE, context),
        _ => key.to_string(),
    }
}

/// Split a message key back into key and context.
pub fn unbuild_message_key(message_key: &str) -> (String, Option<String>) {
    match message_key.split_once(CONTEXT_GLUE) {
        Some((key, context)) if !context.is_empty() => (key.to_string(), Some(context.to_string())),
        Some((key, _)) => (key.to_string(), None),
        None => (message_key.to_string(), None),
    }
}

/// Line/column position of a call-site argument.
///
/// `line` is 1-based, `col` is 0-based (in characters).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub struct Position {
    pub line: usize,
    pub col: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Location {
    pub start: Position,
    pub end: Position,
    /// Source file, stamped by the collector once a key was extracted.
    pub src: Option<String>,
}

/// One translator call-site occurrence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct KeyItem {
    pub key: Option<String>,
    pub context: Option<String>,
    pub location: Option<Location>,
}

impl KeyItem {
    /// Message key for this item, or `None` when no usable key was extracted.
    pub fn message_key(&self) -> Option<String> {
        match self.key.as_deref() {
            Some(key) if !key.is_empty() => Some(build_message_key(key, self.context.as_deref())),
            _ => None,
        }
    }

    /// Source line of the occurrence, 0 when unknown.
    pub fn line(&self) -> usize {
        self.location.as_ref().map_or(0, |l| l.start.line)
    }

    pub fn src(&self) -> &str {
        self.location
            .as_ref()
            .and_then(|l| l.src.as_deref())
            .unwrap_or_default()
    }
}

/// Insertion-ordered map from message key to every occurrence of it.
///
/// All items under one message key share the same key and context.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct KeyItems {
    entries: IndexMap<String, Vec<KeyItem>>,
}

impl KeyItems {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an occurrence. Items without a key are discarded.
    ///
    /// Returns `true` when the item was stored.
    pub fn push(&mut self, item: KeyItem) -> bool {
        let Some(message_key) = item.message_key() else {
            return false;
        };
        self.entries.entry(message_key).or_default().push(item);
        true
    }

    /// Merge another map, keeping this map's order and appending new keys.
    pub fn extend(&mut self, other: KeyItems) {
        for (message_key, items) in other.entries {
            self.entries.entry(message_key).or_default().extend(items);
        }
    }

    pub fn get(&self, message_key: &str) -> Option<&[KeyItem]> {
        self.entries.get(message_key).map(Vec::as_slice)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Vec<KeyItem>)> {
        self.entries.iter()
    }

    /// Number of distinct message keys.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Total number of occurrences across all keys.
    pub fn occurrences(&self) -> usize {
        self.entries.values().map(Vec::len).sum()
    }
}

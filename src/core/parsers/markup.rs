//! Markup scanner for template sources.
//!
//! Finds the byte ranges of HTML text nodes and attribute values that lie
//! outside template code. Mustaches are masked first, so a text node such
//! as `Привет {{name}}!` yields two runs.

use std::ops::Range;
use std::sync::LazyLock;

use regex::Regex;

const MASK: char = '\u{1}';

static MUSTACHE_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)\{\{!--.*?--\}\}|\{\{\{.+?\}\}\}|\{\{.+?\}\}")
        .unwrap()
});

/// Replace every byte of every mustache with [`MASK`].
///
/// The result has the same byte length as the input.
pub fn mask_mustaches(code: &str) -> String {
    let mut masked = String::with_capacity(code.len());
    let mut last = 0;
    for m in MUSTACHE_REGEX.find_iter(code) {
        masked.push_str(&code[last..m.start()]);
        masked.extend(std::iter::repeat_n(MASK, m.len()));
        last = m.end();
    }
    masked.push_str(&code[last..]);
    masked
}

/// A run of markup text outside template code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkupRun {
    pub range: Range<usize>,
    /// Delimiter of the enclosing attribute value, if it is quoted.
    pub quote: Option<char>,
}

/// Unmasked markup text runs, in document order.
///
/// Each range is a maximal run of text-node or attribute-value characters
/// containing no template code. Ranges are not trimmed.
pub fn markup_text_runs(code: &str) -> Vec<MarkupRun> {
    let masked = mask_mustaches(code);
    let mut runs = Vec::new();
    for run in Scanner::new(&masked).scan() {
        split_runs(&masked, run, &mut runs);
    }
    runs
}

fn split_runs(masked: &str, run: MarkupRun, runs: &mut Vec<MarkupRun>) {
    let MarkupRun { range, quote } = run;
    let mut start = None;
    for (i, c) in masked[range.clone()].char_indices() {
        let at = range.start + i;
        match (c == MASK, start) {
            (true, Some(s)) => {
                runs.push(MarkupRun { range: s..at, quote });
                start = None;
            }
            (false, None) => start = Some(at),
            _ => {}
        }
    }
    if let Some(s) = start {
        runs.push(MarkupRun {
            range: s..range.end,
            quote,
        });
    }
}

struct Scanner<'a> {
    text: &'a str,
    bytes: &'a [u8],
    pos: usize,
    runs: Vec<MarkupRun>,
}

impl<'a> Scanner<'a> {
    fn new(text: &'a str) -> Self {
        Self {
            text,
            bytes: text.as_bytes(),
            pos: 0,
            runs: Vec::new(),
        }
    }

    fn scan(mut self) -> Vec<MarkupRun> {
        let mut text_start = 0;
        while self.pos < self.bytes.len() {
            if self.bytes[self.pos] != b'<' {
                self.pos += 1;
                continue;
            }
            let tag_start = self.pos;
            let next = self.bytes.get(self.pos + 1).copied();
            match next {
                Some(b'!') if self.text[self.pos..].starts_with("<!--") => {
                    self.push(text_start..tag_start);
                    self.skip_past("-->");
                }
                Some(b'!') | Some(b'/') | Some(b'?') => {
                    self.push(text_start..tag_start);
                    self.skip_past(">");
                }
                Some(c) if c.is_ascii_alphabetic() => {
                    self.push(text_start..tag_start);
                    self.scan_tag();
                }
                _ => {
                    self.pos += 1;
                    continue;
                }
            }
            text_start = self.pos;
        }
        self.push(text_start..self.bytes.len());
        self.runs
    }

    fn push(&mut self, range: Range<usize>) {
        self.push_quoted(range, None);
    }

    fn push_quoted(&mut self, range: Range<usize>, quote: Option<char>) {
        if !range.is_empty() {
            self.runs.push(MarkupRun { range, quote });
        }
    }

    fn skip_past(&mut self, needle: &str) {
        self.pos = match self.text[self.pos..].find(needle) {
            Some(i) => self.pos + i + needle.len(),
            None => self.bytes.len(),
        };
    }

    fn skip_whitespace(&mut self) {
        while self.pos < self.bytes.len() && self.bytes[self.pos].is_ascii_whitespace() {
            self.pos += 1;
        }
    }

    fn take_name(&mut self) -> Range<usize> {
        let start = self.pos;
        while self.pos < self.bytes.len() {
            let b = self.bytes[self.pos];
            if b.is_ascii_whitespace() || matches!(b, b'>' | b'/' | b'=') {
                break;
            }
            self.pos += 1;
        }
        start..self.pos
    }

    /// Scan an opening tag starting at `<`, recording attribute values.
    fn scan_tag(&mut self) {
        self.pos += 1;
        let name = self.take_name();
        let name = self.text[name].to_ascii_lowercase();

        loop {
            self.skip_whitespace();
            match self.bytes.get(self.pos) {
                None => return,
                Some(b'>') => {
                    self.pos += 1;
                    break;
                }
                Some(b'/') => {
                    self.pos += 1;
                    if self.bytes.get(self.pos) == Some(&b'>') {
                        self.pos += 1;
                        return;
                    }
                    continue;
                }
                _ => {}
            }

            let attribute = self.take_name();
            if attribute.is_empty() {
                self.pos += 1;
                continue;
            }
            self.skip_whitespace();
            if self.bytes.get(self.pos) != Some(&b'=') {
                continue;
            }
            self.pos += 1;
            self.skip_whitespace();
            match self.bytes.get(self.pos).copied() {
                Some(quote @ (b'"' | b'\'')) => {
                    let start = self.pos + 1;
                    let end = self.bytes[start..]
                        .iter()
                        .position(|&b| b == quote)
                        .map_or(self.bytes.len(), |i| start + i);
                    self.push_quoted(start..end, Some(char::from(quote)));
                    self.pos = (end + 1).min(self.bytes.len());
                }
                Some(_) => {
                    let start = self.pos;
                    while self.pos < self.bytes.len()
                        && !self.bytes[self.pos].is_ascii_whitespace()
                        && self.bytes[self.pos] != b'>'
                    {
                        self.pos += 1;
                    }
                    self.push(start..self.pos);
                }
                None => return,
            }
        }

        if name == "script" || name == "style" {
            let close = format!("</{}", name);
            let lower = self.text[self.pos..].to_ascii_lowercase();
            self.pos = match lower.find(&close) {
                Some(i) => self.pos + i,
                None => self.bytes.len(),
            };
        }
    }
}

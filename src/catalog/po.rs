//! Gettext PO codec.
//!
//! Parses `.po`/`.pot` text into a [`Catalog`] and serializes it back. The
//! entry with an empty `msgid` and no context is the header; its `msgstr`
//! holds `Name: value` lines kept in order. Obsolete `#~` entries are parsed
//! like live ones and flagged. Previous-msgid (`#|`) lines are dropped.

use std::fmt;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result, bail};
use indexmap::IndexMap;

/// A parsed catalog.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Catalog {
    /// `#` comments of the header entry.
    pub comments: Vec<String>,
    /// `#.` comments of the header entry.
    pub extracted_comments: Vec<String>,
    pub headers: IndexMap<String, String>,
    pub items: Vec<CatalogItem>,
}

/// One catalog entry.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CatalogItem {
    pub msgid: String,
    pub msgctxt: Option<String>,
    pub msgid_plural: Option<String>,
    /// One string for singular entries, one per plural form otherwise.
    pub msgstr: Vec<String>,
    /// `#:` references, one per line.
    pub references: Vec<String>,
    /// `#` translator comments.
    pub comments: Vec<String>,
    /// `#.` extracted comments.
    pub extracted_comments: Vec<String>,
    /// `#,` flags such as `fuzzy`.
    pub flags: Vec<String>,
    pub obsolete: bool,
}

impl CatalogItem {
    pub fn new(msgid: impl Into<String>, msgctxt: Option<String>) -> Self {
        Self {
            msgid: msgid.into(),
            msgctxt,
            ..Default::default()
        }
    }

    pub fn is_fuzzy(&self) -> bool {
        self.flags.iter().any(|f| f == "fuzzy")
    }

    /// All `msgstr` forms joined with a space.
    pub fn translation(&self) -> String {
        self.msgstr.join(" ")
    }

    pub fn is_translated(&self) -> bool {
        !self.translation().trim().is_empty()
    }

    /// Same `(msgid, msgctxt)` identity; an empty context counts as none.
    pub fn matches(&self, msgid: &str, msgctxt: Option<&str>) -> bool {
        self.msgid == msgid && non_empty(self.msgctxt.as_deref()) == non_empty(msgctxt)
    }
}

fn non_empty(s: Option<&str>) -> Option<&str> {
    s.filter(|s| !s.is_empty())
}

impl Catalog {
    /// Read and parse the catalog at `path`.
    pub fn read(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("Failed to read catalog: {}", path.display()))?;
        Self::parse(&text).with_context(|| format!("Failed to parse catalog: {}", path.display()))
    }

    /// Serialize and write the catalog to `path`.
    pub fn write(&self, path: &Path) -> Result<()> {
        fs::write(path, self.to_string())
            .with_context(|| format!("Failed to write catalog: {}", path.display()))
    }

    pub fn parse(text: &str) -> Result<Self> {
        let mut parser = Parser::default();
        for (i, line) in text.lines().enumerate() {
            parser
                .line(line.trim_end_matches('\r'))
                .with_context(|| format!("line {}", i + 1))?;
        }
        parser.finish_entry();
        Ok(parser.catalog)
    }

    /// Index of the live item with the given identity.
    pub fn position(&self, msgid: &str, msgctxt: Option<&str>) -> Option<usize> {
        self.items
            .iter()
            .position(|item| !item.obsolete && item.matches(msgid, msgctxt))
    }

    /// Live (non-obsolete) items.
    pub fn live_items(&self) -> impl Iterator<Item = &CatalogItem> {
        self.items.iter().filter(|item| !item.obsolete)
    }
}

// ============================================================
// Parsing
// ============================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    Msgctxt,
    Msgid,
    MsgidPlural,
    Msgstr(usize),
}

#[derive(Default)]
struct Parser {
    catalog: Catalog,
    item: CatalogItem,
    field: Option<Field>,
    /// A `msgid` keyword was seen for the current entry.
    has_msgid: bool,
    /// Comments were seen for the current entry.
    has_comments: bool,
    seen_entries: usize,
}

impl Parser {
    fn line(&mut self, line: &str) -> Result<()> {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            self.finish_entry();
            return Ok(());
        }

        if let Some(rest) = trimmed.strip_prefix("#~") {
            let rest = rest.trim_start();
            if rest.is_empty() {
                return Ok(());
            }
            if !rest.starts_with('#') {
                return self.keyword(rest, true);
            }
            return self.comment(rest);
        }
        if trimmed.starts_with('#') {
            return self.comment(trimmed);
        }
        self.keyword(trimmed, false)
    }

    fn comment(&mut self, line: &str) -> Result<()> {
        // A comment after the strings starts the next entry.
        if self.field.is_some() {
            self.finish_entry();
        }
        self.has_comments = true;

        let mut chars = line.chars();
        chars.next();
        let marker = chars.next();
        let body = |prefix_len: usize| line[prefix_len..].trim().to_string();
        match marker {
            Some('.') => self.item.extracted_comments.push(body(2)),
            Some(':') => self
                .item
                .references
                .extend(line[2..].split_whitespace().map(str::to_string)),
            Some(',') => self.item.flags.extend(
                line[2..]
                    .split(',')
                    .map(str::trim)
                    .filter(|f| !f.is_empty())
                    .map(str::to_string),
            ),
            Some('|') => {}
            _ => self.item.comments.push(body(1)),
        }
        Ok(())
    }

    fn keyword(&mut self, line: &str, obsolete: bool) -> Result<()> {
        if line.starts_with('"') {
            let value = unquote(line)?;
            match self.field {
                Some(field) => self.append(field, &value),
                None => bail!("string without a keyword: {}", line),
            }
            return Ok(());
        }

        let (keyword, rest) = line
            .split_once(char::is_whitespace)
            .with_context(|| format!("expected a quoted string: {}", line))?;
        let field = match keyword {
            "msgctxt" => Field::Msgctxt,
            "msgid" => Field::Msgid,
            "msgid_plural" => Field::MsgidPlural,
            "msgstr" => Field::Msgstr(0),
            _ => match keyword
                .strip_prefix("msgstr[")
                .and_then(|s| s.strip_suffix(']'))
            {
                Some(index) => Field::Msgstr(
                    index
                        .parse()
                        .with_context(|| format!("bad plural index: {}", keyword))?,
                ),
                None => bail!("unknown keyword: {}", keyword),
            },
        };

        // A new msgctxt/msgid after the strings of an entry starts the next one.
        if matches!(field, Field::Msgctxt | Field::Msgid)
            && matches!(self.field, Some(Field::Msgstr(_)))
        {
            self.finish_entry();
        }
        self.item.obsolete |= obsolete;

        let value = unquote(rest)?;
        match field {
            Field::Msgctxt => self.item.msgctxt = Some(String::new()),
            Field::Msgid => self.has_msgid = true,
            Field::MsgidPlural => self.item.msgid_plural = Some(String::new()),
            Field::Msgstr(index) => {
                if self.item.msgstr.len() <= index {
                    self.item.msgstr.resize(index + 1, String::new());
                }
            }
        }
        self.field = Some(field);
        self.append(field, &value);
        Ok(())
    }

    fn append(&mut self, field: Field, value: &str) {
        let target = match field {
            Field::Msgctxt => self.item.msgctxt.get_or_insert_default(),
            Field::Msgid => &mut self.item.msgid,
            Field::MsgidPlural => self.item.msgid_plural.get_or_insert_default(),
            Field::Msgstr(index) => &mut self.item.msgstr[index],
        };
        target.push_str(value);
    }

    fn finish_entry(&mut self) {
        let item = std::mem::take(&mut self.item);
        let has_msgid = std::mem::take(&mut self.has_msgid);
        let has_comments = std::mem::take(&mut self.has_comments);
        self.field = None;

        if !has_msgid {
            // Comments with no entry below them belong to the header.
            if has_comments && self.seen_entries == 0 {
                self.catalog.comments.extend(item.comments);
                self.catalog.extracted_comments.extend(item.extracted_comments);
            }
            return;
        }

        let is_header = self.seen_entries == 0
            && !item.obsolete
            && item.msgid.is_empty()
            && item.msgctxt.is_none();
        self.seen_entries += 1;
        if is_header {
            self.catalog.headers = parse_headers(&item.translation());
            self.catalog.comments.extend(item.comments);
            self.catalog.extracted_comments.extend(item.extracted_comments);
            return;
        }
        self.catalog.items.push(item);
    }
}

fn parse_headers(text: &str) -> IndexMap<String, String> {
    text.lines()
        .filter_map(|line| line.split_once(':'))
        .map(|(name, value)| (name.trim().to_string(), value.trim().to_string()))
        .collect()
}

/// Strip the surrounding quotes of a PO string and unescape it.
fn unquote(s: &str) -> Result<String> {
    let s = s.trim();
    let Some(inner) = s.strip_prefix('"').and_then(|s| s.strip_suffix('"')) else {
        bail!("expected a quoted string: {}", s);
    };

    let mut result = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            result.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => result.push('\n'),
            Some('t') => result.push('\t'),
            Some('r') => result.push('\r'),
            Some('"') => result.push('"'),
            Some('\\') => result.push('\\'),
            Some(other) => {
                result.push('\\');
                result.push(other);
            }
            None => result.push('\\'),
        }
    }
    Ok(result)
}

// ============================================================
// Serialization
// ============================================================

fn escape(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '\\' => result.push_str("\\\\"),
            '"' => result.push_str("\\\""),
            '\n' => result.push_str("\\n"),
            '\t' => result.push_str("\\t"),
            '\r' => result.push_str("\\r"),
            _ => result.push(c),
        }
    }
    result
}

/// Write `keyword "value"`, splitting after each inner newline the way
/// gettext tools do.
fn write_string(out: &mut String, prefix: &str, keyword: &str, value: &str) {
    let parts: Vec<&str> = value.split_inclusive('\n').collect();
    if parts.len() <= 1 {
        out.push_str(&format!("{}{} \"{}\"\n", prefix, keyword, escape(value)));
        return;
    }
    out.push_str(&format!("{}{} \"\"\n", prefix, keyword));
    for part in parts {
        out.push_str(&format!("{}\"{}\"\n", prefix, escape(part)));
    }
}

fn write_comments(out: &mut String, marker: &str, comments: &[String]) {
    for comment in comments {
        if comment.is_empty() {
            out.push_str(&format!("{}\n", marker));
        } else {
            out.push_str(&format!("{} {}\n", marker, comment));
        }
    }
}

impl fmt::Display for CatalogItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut out = String::new();
        write_comments(&mut out, "#", &self.comments);
        write_comments(&mut out, "#.", &self.extracted_comments);
        write_comments(&mut out, "#:", &self.references);
        if !self.flags.is_empty() {
            out.push_str(&format!("#, {}\n", self.flags.join(", ")));
        }

        let prefix = if self.obsolete { "#~ " } else { "" };
        if let Some(msgctxt) = &self.msgctxt {
            write_string(&mut out, prefix, "msgctxt", msgctxt);
        }
        write_string(&mut out, prefix, "msgid", &self.msgid);
        match &self.msgid_plural {
            Some(plural) => {
                write_string(&mut out, prefix, "msgid_plural", plural);
                let forms = self.msgstr.len().max(2);
                for i in 0..forms {
                    let value = self.msgstr.get(i).map_or("", String::as_str);
                    write_string(&mut out, prefix, &format!("msgstr[{}]", i), value);
                }
            }
            None => {
                let value = self.msgstr.first().map_or("", String::as_str);
                write_string(&mut out, prefix, "msgstr", value);
            }
        }
        f.write_str(&out)
    }
}

impl fmt::Display for Catalog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut out = String::new();
        write_comments(&mut out, "#", &self.comments);
        write_comments(&mut out, "#.", &self.extracted_comments);
        out.push_str("msgid \"\"\nmsgstr \"\"\n");
        for (name, value) in &self.headers {
            out.push_str(&format!("\"{}\\n\"\n", escape(&format!("{}: {}", name, value))));
        }
        for item in &self.items {
            out.push('\n');
            out.push_str(&item.to_string());
        }
        f.write_str(&out)
    }
}

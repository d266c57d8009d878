//! Template generation and per-locale merge.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use anyhow::{Context, Result, bail};
use indexmap::IndexMap;

use super::po::{Catalog, CatalogItem};
use crate::core::key::KeyItems;
use crate::issues::{Issue, MergeToolFailureIssue};

pub const TEMPLATE_FILE_NAME: &str = "messages.pot";

const PROJECT_ID_VERSION: &str = "harvest i18n";

/// Fixed header block of every catalog; only `Language` varies.
pub fn catalog_headers(language: &str) -> IndexMap<String, String> {
    [
        ("Project-Id-Version", PROJECT_ID_VERSION),
        ("Report-Msgid-Bugs-To", ""),
        ("POT-Creation-Date", ""),
        ("PO-Revision-Date", ""),
        ("Last-Translator", ""),
        ("Language", language),
        ("Language-Team", ""),
        ("Content-Type", "text/plain; charset=UTF-8"),
        ("Content-Transfer-Encoding", "8bit"),
        ("Plural-Forms", ""),
        ("MIME-Version", "1.0"),
        ("X-Generator", ""),
    ]
    .into_iter()
    .map(|(name, value)| (name.to_string(), value.to_string()))
    .collect()
}

/// Build the locale-less template: one item per message key, sorted by
/// message key, with a `src:line` reference per occurrence ordered by file.
pub fn build_template(key_items: &KeyItems) -> Catalog {
    let mut entries: Vec<_> = key_items.iter().collect();
    entries.sort_by(|a, b| a.0.cmp(b.0));

    let items = entries
        .into_iter()
        .filter_map(|(_, occurrences)| {
            let first = occurrences.first()?;
            let mut item = CatalogItem::new(first.key.clone()?, first.context.clone());
            let mut sorted: Vec<_> = occurrences.iter().collect();
            sorted.sort_by(|a, b| a.src().cmp(b.src()));
            item.references = sorted
                .into_iter()
                .map(|occurrence| format!("{}:{}", occurrence.src(), occurrence.line()))
                .collect();
            item.msgstr = vec![String::new()];
            Some(item)
        })
        .collect();

    Catalog {
        headers: catalog_headers(""),
        items,
        ..Default::default()
    }
}

/// `<dir>/<base_name><locale>.po`
pub fn locale_catalog_path(dir: &Path, base_name: &str, locale: &str) -> PathBuf {
    dir.join(format!("{}{}.po", base_name, locale))
}

// ============================================================
// Merge Tool
// ============================================================

/// Merges a template into an existing locale catalog in place.
pub trait MergeTool {
    fn merge(&self, catalog: &Path, template: &Path) -> Result<()>;
}

/// Runs GNU `msgmerge`.
pub struct Msgmerge {
    program: String,
}

impl Msgmerge {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

impl MergeTool for Msgmerge {
    fn merge(&self, catalog: &Path, template: &Path) -> Result<()> {
        let output = Command::new(&self.program)
            .args(["-U", "-v", "-s", "--no-fuzzy-matching", "--no-wrap"])
            .arg(catalog)
            .arg(template)
            .output()
            .with_context(|| format!("Failed to run {}", self.program))?;

        if !output.status.success() {
            bail!(
                "{} exited with {}: {}",
                self.program,
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            );
        }
        Ok(())
    }
}

/// A locale and the catalog file that holds it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocaleCatalog {
    pub locale: String,
    pub path: PathBuf,
}

#[derive(Debug, Default)]
pub struct MergeResult {
    /// Locales whose catalog did not exist and was created empty.
    pub created: Vec<String>,
    /// Locales merged successfully.
    pub merged: Vec<String>,
    pub issues: Vec<Issue>,
}

/// Merge `template` into each locale catalog, one locale at a time.
///
/// A missing catalog is first created with the template headers, its
/// `Language` set and no items. A failure for one locale is recorded and
/// the remaining locales still run.
pub fn merge_into_locale(
    template: &Path,
    catalogs: &[LocaleCatalog],
    tool: &dyn MergeTool,
) -> MergeResult {
    let mut result = MergeResult::default();

    for LocaleCatalog { locale, path } in catalogs {
        let failure = |error: String| {
            Issue::MergeToolFailure(MergeToolFailureIssue {
                catalog_path: path.display().to_string(),
                locale: locale.clone(),
                error,
            })
        };

        if !path.exists() {
            let empty = Catalog {
                headers: catalog_headers(locale),
                ..Default::default()
            };
            if let Err(e) = empty.write(path) {
                result.issues.push(failure(format!("{:#}", e)));
                continue;
            }
            result.created.push(locale.clone());
        }

        match tool.merge(path, template) {
            Ok(()) => result.merged.push(locale.clone()),
            Err(e) => result.issues.push(failure(format!("{:#}", e))),
        }
    }

    result
}

#[derive(Debug)]
pub struct BuildResult {
    pub template_path: PathBuf,
    /// Number of items in the template.
    pub message_count: usize,
    pub merge: MergeResult,
}

/// Write `messages.pot` into `dir`, then merge it into every locale
/// catalog when a merge tool is given.
pub fn build_catalogs(
    key_items: &KeyItems,
    dir: &Path,
    base_name: &str,
    locales: &[String],
    merge_tool: Option<&dyn MergeTool>,
) -> Result<BuildResult> {
    fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create directory: {}", dir.display()))?;

    let template = build_template(key_items);
    let template_path = dir.join(TEMPLATE_FILE_NAME);
    template.write(&template_path)?;

    let merge = match merge_tool {
        Some(tool) => {
            let catalogs: Vec<_> = locales
                .iter()
                .map(|locale| LocaleCatalog {
                    locale: locale.clone(),
                    path: locale_catalog_path(dir, base_name, locale),
                })
                .collect();
            merge_into_locale(&template_path, &catalogs, tool)
        }
        None => MergeResult::default(),
    };

    Ok(BuildResult {
        template_path,
        message_count: template.items.len(),
        merge,
    })
}

//! Context annotation and the translate-the-key workflow.
//!
//! The workflow lets a catalog keyed in one language be re-keyed by its
//! translation: [`transfer_translations`] replaces each destination key by
//! the source translation and remembers the original identity in extracted
//! comments, [`restore_transfer`] maps translations made on the re-keyed
//! catalog back onto the original one.

use super::po::{Catalog, CatalogItem};
use crate::issues::{Issue, TransferOperation, UnmatchedTransferItemIssue};

/// Translator comment carrying a translatable context.
pub const CONTEXT_LABEL: &str = "CONTEXT:";
/// Extracted comment recording the original msgid.
pub const MSG_ID_LABEL: &str = "[msgid]";
/// Extracted comment recording the original msgctxt.
pub const MSG_CONTEXT_LABEL: &str = "[msgctxt]";

/// Add a bare `CONTEXT:` comment to every item with a context that has
/// none yet. Running it again changes nothing.
///
/// Returns the number of items annotated.
pub fn annotate_context(catalog: &mut Catalog) -> usize {
    let mut annotated = 0;
    for item in &mut catalog.items {
        let has_context = item.msgctxt.as_deref().is_some_and(|c| !c.is_empty());
        let labeled = item.comments.iter().any(|c| c.contains(CONTEXT_LABEL));
        if has_context && !labeled {
            item.comments.push(CONTEXT_LABEL.to_string());
            annotated += 1;
        }
    }
    annotated
}

/// Context written by a translator after the last `CONTEXT:` label.
fn context_from_comments(item: &CatalogItem) -> Option<String> {
    let comments = item.comments.join(" ");
    let i = comments.rfind(CONTEXT_LABEL)?;
    let context = comments[i + CONTEXT_LABEL.len()..].trim();
    (!context.is_empty()).then(|| context.to_string())
}

/// Original `(msgid, msgctxt)` recorded by an earlier transfer.
#[derive(Debug, Default, PartialEq, Eq)]
struct OriginalIdentity {
    msgid: Option<String>,
    msgctxt: Option<String>,
}

fn original_identity(item: &CatalogItem) -> OriginalIdentity {
    let mut identity = OriginalIdentity::default();
    for comment in &item.extracted_comments {
        if let Some(rest) = comment.strip_prefix(MSG_ID_LABEL) {
            identity.msgid = Some(rest.strip_prefix(' ').unwrap_or(rest).to_string());
        }
        if let Some(rest) = comment.strip_prefix(MSG_CONTEXT_LABEL) {
            identity.msgctxt = Some(rest.strip_prefix(' ').unwrap_or(rest).to_string());
        }
    }
    identity
}

/// Outcome of a transfer or restore.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct TransferResult {
    /// Destination items that were updated.
    pub updated: usize,
    /// `(msgid, msgctxt)` of source items with no destination match.
    pub unmatched: Vec<(String, Option<String>)>,
}

impl TransferResult {
    pub fn issues(&self, catalog_path: &str, operation: TransferOperation) -> Vec<Issue> {
        self.unmatched
            .iter()
            .map(|(msgid, msgctxt)| {
                Issue::UnmatchedTransferItem(UnmatchedTransferItemIssue {
                    catalog_path: catalog_path.to_string(),
                    operation,
                    msgid: msgid.clone(),
                    msgctxt: msgctxt.clone(),
                })
            })
            .collect()
    }
}

/// Re-key `dest` by the translations of `source`.
///
/// For each source item the destination item with the same identity gets
/// its original msgid and msgctxt recorded (once) as extracted comments,
/// then takes the source translation as msgid and the context written
/// after `CONTEXT:` in the source comments as msgctxt.
pub fn transfer_translations(source: &Catalog, dest: &mut Catalog) -> TransferResult {
    let mut result = TransferResult::default();

    for src in source.live_items() {
        let Some(index) = dest.position(&src.msgid, src.msgctxt.as_deref()) else {
            result.unmatched.push((src.msgid.clone(), src.msgctxt.clone()));
            continue;
        };
        let dst = &mut dest.items[index];

        let recorded = original_identity(dst);
        if recorded.msgctxt.is_none()
            && let Some(msgctxt) = src.msgctxt.as_deref().filter(|c| !c.is_empty())
        {
            dst.extracted_comments
                .push(format!("{} {}", MSG_CONTEXT_LABEL, msgctxt));
        }
        if recorded.msgid.is_none() {
            dst.extracted_comments
                .push(format!("{} {}", MSG_ID_LABEL, src.msgid));
        }

        let translation = src.translation();
        if !translation.is_empty() {
            dst.msgid = translation;
        }
        if let Some(context) = context_from_comments(src) {
            dst.msgctxt = Some(context);
        }
        result.updated += 1;
    }

    result
}

/// Copy the translations of a re-keyed `source` back onto `dest`.
///
/// Each source item is matched by the original identity recorded in its
/// extracted comments; only non-empty translations are copied.
pub fn restore_transfer(source: &Catalog, dest: &mut Catalog) -> TransferResult {
    let mut result = TransferResult::default();

    for src in source.live_items() {
        let identity = original_identity(src);
        let index = identity
            .msgid
            .as_deref()
            .and_then(|msgid| dest.position(msgid, identity.msgctxt.as_deref()));
        let Some(index) = index else {
            result.unmatched.push((src.msgid.clone(), src.msgctxt.clone()));
            continue;
        };

        if src.is_translated() {
            dest.items[index].msgstr = src.msgstr.clone();
            result.updated += 1;
        }
    }

    result
}

#[cfg(test)]
mod tests {
    use crate::catalog::annotate::*;
    use pretty_assertions::assert_eq;

    /// Russian-keyed catalog with English translations.
    const RU_EN: &str = r#"msgid ""
msgstr ""
"Language: en\n"

# CONTEXT: menu
msgctxt "меню"
msgid "Файл"
msgstr "File"

msgid "Открыть"
msgstr "Open"

msgid "Закрыть"
msgstr ""
"#;

    /// Russian-keyed catalog awaiting Chinese translations.
    const RU_ZH: &str = r#"msgid ""
msgstr ""
"Language: zh\n"

#: src/a.js:1
msgctxt "меню"
msgid "Файл"
msgstr ""

#: src/a.js:2
msgid "Открыть"
msgstr ""

#: src/a.js:3
msgid "Закрыть"
msgstr ""
"#;

    fn identities(catalog: &Catalog) -> Vec<(String, Option<String>)> {
        catalog
            .items
            .iter()
            .map(|item| (item.msgid.clone(), item.msgctxt.clone()))
            .collect()
    }

    #[test]
    fn test_annotate_context_is_idempotent() {
        let mut catalog = Catalog::parse(RU_ZH).unwrap();
        assert_eq!(annotate_context(&mut catalog), 1);
        let once = catalog.to_string();
        assert_eq!(annotate_context(&mut catalog), 0);
        assert_eq!(catalog.to_string(), once);
        assert_eq!(catalog.items[0].comments, vec!["CONTEXT:"]);
        assert!(catalog.items[1].comments.is_empty());
    }

    #[test]
    fn test_annotate_keeps_existing_label() {
        let mut catalog = Catalog::parse(RU_EN).unwrap();
        assert_eq!(annotate_context(&mut catalog), 0);
        assert_eq!(catalog.items[0].comments, vec!["CONTEXT: menu"]);
    }

    #[test]
    fn test_transfer_rekeys_destination() {
        let source = Catalog::parse(RU_EN).unwrap();
        let mut dest = Catalog::parse(RU_ZH).unwrap();
        let result = transfer_translations(&source, &mut dest);

        assert_eq!(result.updated, 3);
        assert!(result.unmatched.is_empty());
        assert_eq!(
            identities(&dest),
            vec![
                ("File".to_string(), Some("menu".to_string())),
                ("Open".to_string(), None),
                ("Закрыть".to_string(), None),
            ]
        );
        assert_eq!(
            dest.items[0].extracted_comments,
            vec!["[msgctxt] меню", "[msgid] Файл"]
        );
        assert_eq!(dest.items[1].extracted_comments, vec!["[msgid] Открыть"]);
        assert_eq!(dest.items[0].references, vec!["src/a.js:1"]);
    }

    #[test]
    fn test_transfer_twice_is_stable() {
        let source = Catalog::parse(RU_EN).unwrap();
        let mut dest = Catalog::parse(RU_ZH).unwrap();
        transfer_translations(&source, &mut dest);
        let once = dest.to_string();

        let result = transfer_translations(&source, &mut dest);
        assert_eq!(dest.to_string(), once);
        // Only the untranslated item still carries its original key.
        assert_eq!(result.updated, 1);
        assert_eq!(result.unmatched.len(), 2);
    }

    #[test]
    fn test_restore_recovers_original_identity() {
        let source = Catalog::parse(RU_EN).unwrap();
        let original = Catalog::parse(RU_ZH).unwrap();
        let mut transferred = original.clone();
        transfer_translations(&source, &mut transferred);

        transferred.items[0].msgstr = vec!["文件".to_string()];
        transferred.items[1].msgstr = vec!["打开".to_string()];

        let mut restored = original.clone();
        let result = restore_transfer(&transferred, &mut restored);

        assert_eq!(result.updated, 2);
        assert!(result.unmatched.is_empty());
        assert_eq!(identities(&restored), identities(&original));
        assert_eq!(restored.items[0].msgstr, vec!["文件"]);
        assert_eq!(restored.items[1].msgstr, vec!["打开"]);
        assert_eq!(restored.items[2].msgstr, vec![""]);
    }

    #[test]
    fn test_restore_reports_items_without_identity() {
        let source = Catalog::parse(RU_EN).unwrap();
        let mut dest = Catalog::parse(RU_ZH).unwrap();
        let result = restore_transfer(&source, &mut dest);

        assert_eq!(result.updated, 0);
        assert_eq!(result.unmatched.len(), 3);
        let issues = result.issues("zh.po", TransferOperation::Restore);
        assert_eq!(issues.len(), 3);
        assert_eq!(issues[0].rule().to_string(), "unmatched-transfer-item");
    }

    #[test]
    fn test_context_from_comments_uses_last_label() {
        let mut item = CatalogItem::new("a", None);
        item.comments = vec!["CONTEXT: old".to_string(), "CONTEXT: new".to_string()];
        assert_eq!(context_from_comments(&item).as_deref(), Some("new"));
        item.comments = vec!["CONTEXT:".to_string()];
        assert_eq!(context_from_comments(&item), None);
    }
}

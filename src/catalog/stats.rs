//! Catalog statistics.

use serde::Serialize;

use super::po::Catalog;
use crate::utils::word_count;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TextCounts {
    pub chars_with_spaces: usize,
    /// Characters other than whitespace.
    pub chars: usize,
    pub words: usize,
}

impl TextCounts {
    fn add(&mut self, text: &str) {
        self.chars_with_spaces += text.chars().count();
        self.chars += text.chars().filter(|c| !c.is_whitespace()).count();
        self.words += word_count(text);
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageCounts {
    pub all: usize,
    pub translated: usize,
    pub fuzzy: usize,
    #[serde(flatten)]
    pub text: TextCounts,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContextCounts {
    pub all: usize,
    #[serde(flatten)]
    pub text: TextCounts,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CatalogStats {
    pub messages: MessageCounts,
    pub context: ContextCounts,
}

/// Count the live items of `catalog`. Text counts are taken over trimmed
/// msgids and contexts.
pub fn catalog_stats(catalog: &Catalog) -> CatalogStats {
    let mut stats = CatalogStats::default();

    for item in catalog.live_items() {
        stats.messages.all += 1;

        let msgid = item.msgid.trim();
        if !msgid.is_empty() {
            stats.messages.text.add(msgid);
        }
        let msgctxt = item.msgctxt.as_deref().map(str::trim).unwrap_or_default();
        if !msgctxt.is_empty() {
            stats.context.all += 1;
            stats.context.text.add(msgctxt);
        }
        if item.is_translated() {
            stats.messages.translated += 1;
        }
        if item.is_fuzzy() {
            stats.messages.fuzzy += 1;
        }
    }

    stats
}

#[cfg(test)]
mod tests {
    use crate::catalog::stats::*;
    use pretty_assertions::assert_eq;

    const CATALOG: &str = r#"msgid ""
msgstr ""
"Language: en\n"

msgctxt "главное меню"
msgid "Открыть файл"
msgstr "Open file"

#, fuzzy
msgid "Сохранить"
msgstr "Save"

msgctxt "кнопка"
msgid " Да "
msgstr ""

#~ msgid "Старое сообщение"
#~ msgstr "Old"
"#;

    #[test]
    fn test_catalog_stats() {
        let stats = catalog_stats(&Catalog::parse(CATALOG).unwrap());
        assert_eq!(
            stats,
            CatalogStats {
                messages: MessageCounts {
                    all: 3,
                    translated: 2,
                    fuzzy: 1,
                    text: TextCounts {
                        chars_with_spaces: 23,
                        chars: 22,
                        words: 4,
                    },
                },
                context: ContextCounts {
                    all: 2,
                    text: TextCounts {
                        chars_with_spaces: 18,
                        chars: 17,
                        words: 3,
                    },
                },
            }
        );
    }

    #[test]
    fn test_stats_json_shape() {
        let stats = catalog_stats(&Catalog::default());
        let json = serde_json::to_value(stats).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "messages": {"all": 0, "translated": 0, "fuzzy": 0, "charsWithSpaces": 0, "chars": 0, "words": 0},
                "context": {"all": 0, "charsWithSpaces": 0, "chars": 0, "words": 0}
            })
        );
    }
}

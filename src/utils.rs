//! Common utility functions shared across the codebase.

use std::sync::LazyLock;

use regex::{Captures, Regex};

static PLACEHOLDER_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\{([^{}]+)\}").unwrap());

/// Replace `{name}` placeholders with values from `vars`.
///
/// Unknown placeholders are left as they are.
///
/// # Examples
///
/// ```
/// use harvest::utils::format_template;
///
/// let text = format_template(
///     "var {translator} = require('{translatorRequire}');",
///     &[("translator", "tr"), ("translatorRequire", "i18n")],
/// );
/// assert_eq!(text, "var tr = require('i18n');");
/// assert_eq!(format_template("{missing}", &[]), "{missing}");
/// ```
pub fn format_template(template: &str, vars: &[(&str, &str)]) -> String {
    PLACEHOLDER_REGEX
        .replace_all(template, |caps: &Captures| {
            let name = &caps[1];
            vars.iter()
                .find(|(key, _)| *key == name)
                .map_or_else(|| caps[0].to_string(), |(_, value)| value.to_string())
        })
        .into_owned()
}

/// Number of lines in `text` (an empty text has one line).
pub fn text_line_count(text: &str) -> usize {
    text.split('\n').count()
}

/// Number of whitespace-separated words.
pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

#[cfg(test)]
mod tests {
    use crate::utils::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_format_template_repeats_and_unknowns() {
        assert_eq!(
            format_template("{a}-{a}-{b}", &[("a", "x")]),
            "x-x-{b}".to_string()
        );
    }

    #[test]
    fn test_text_line_count() {
        assert_eq!(text_line_count(""), 1);
        assert_eq!(text_line_count("a\nb"), 2);
        assert_eq!(text_line_count("a\r\nb\n"), 3);
    }

    #[test]
    fn test_word_count() {
        assert_eq!(word_count("  Привет,  мир!\n"), 2);
        assert_eq!(word_count(""), 0);
    }
}

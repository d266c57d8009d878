//! Collector: finds translator call-sites and accumulates their keys.
//!
//! Within a file occurrences are recorded in document order; across files
//! [`collect_files`] merges in the order the files are given, so the
//! resulting [`KeyItems`] is reproducible run to run.

use std::convert::Infallible;
use std::fs;
use std::ops::ControlFlow;
use std::path::Path;

use anyhow::{Context, Result};
use rayon::prelude::*;

use crate::core::grammar::{Grammar, GrammarConfig, Grammars};
use crate::core::key::KeyItems;
use crate::core::syntax::{LineIndex, SyntaxNode, Visitor, walk};
use crate::issues::{Issue, ParseErrorIssue};

/// Caller hooks for a collection run.
#[derive(Clone, Copy, Default)]
pub struct CollectOptions<'a> {
    /// Rewrites every extracted key before it is stored.
    pub transform_key: Option<&'a (dyn Fn(&str) -> String + Sync)>,
    /// Prunes a child slot of a node.
    pub skip_property: Option<&'a (dyn Fn(&str, &SyntaxNode) -> bool + Sync)>,
}

struct Collector<'a> {
    config: &'a GrammarConfig,
    index: LineIndex<'a>,
    file: &'a str,
    options: CollectOptions<'a>,
    key_items: &'a mut KeyItems,
}

impl Visitor for Collector<'_> {
    type Break = Infallible;

    fn visit(&mut self, node: &SyntaxNode) -> ControlFlow<Infallible> {
        if !self.config.is_translator_call(node) {
            return ControlFlow::Continue(());
        }

        let mut item = self.config.extract_key_item(node, &self.index);
        if let (Some(key), Some(transform)) = (&item.key, self.options.transform_key) {
            item.key = Some(transform(key));
        }
        if item.key.is_some()
            && let Some(location) = item.location.as_mut()
        {
            location.src = Some(self.file.to_string());
        }
        self.key_items.push(item);
        ControlFlow::Continue(())
    }

    fn prune(&mut self, slot: &str, parent: &SyntaxNode) -> bool {
        self.options
            .skip_property
            .is_some_and(|skip| skip(slot, parent))
    }
}

/// Append every translator call-site of `ast` to `key_items`.
///
/// `code` is the text `ast` was parsed from; `file` is stamped on every
/// occurrence that yielded a key.
pub fn collect(
    ast: &SyntaxNode,
    code: &str,
    file: &str,
    config: &GrammarConfig,
    options: CollectOptions<'_>,
    key_items: &mut KeyItems,
) {
    let mut collector = Collector {
        config,
        index: LineIndex::new(code),
        file,
        options,
        key_items,
    };
    let _ = walk(ast, &mut collector);
}

/// Parse `code` with `config`'s grammar and collect its call-sites.
pub fn collect_source(
    code: &str,
    file: &str,
    config: &GrammarConfig,
    options: CollectOptions<'_>,
) -> Result<KeyItems> {
    let ast = config.grammar.parse(code, file)?;
    let mut key_items = KeyItems::new();
    collect(&ast, code, file, config, options, &mut key_items);
    Ok(key_items)
}

/// Result of collecting from a set of files.
pub struct CollectResult {
    pub key_items: KeyItems,
    /// Number of files that contributed (parsed successfully).
    pub parsed_count: usize,
    pub issues: Vec<Issue>,
}

/// Collect from `files`, reading and parsing them in parallel.
///
/// Occurrence sources are recorded relative to `base_dir`. A file that
/// cannot be read or parsed contributes nothing and is reported as an issue.
pub fn collect_files(
    base_dir: &str,
    files: &[String],
    grammars: &Grammars,
    options: CollectOptions<'_>,
) -> CollectResult {
    let results: Vec<(String, Result<KeyItems>)> = files
        .par_iter()
        .filter_map(|file_path| {
            let grammar = Grammar::from_path(Path::new(file_path))?;
            let src = relative_path(base_dir, file_path);
            let result = fs::read_to_string(file_path)
                .with_context(|| format!("Failed to read file: {}", file_path))
                .and_then(|code| collect_source(&code, &src, grammars.get(grammar), options));
            Some((file_path.clone(), result))
        })
        .collect();

    let mut key_items = KeyItems::new();
    let mut parsed_count = 0;
    let mut issues = Vec::new();

    for (file_path, result) in results {
        match result {
            Ok(items) => {
                parsed_count += 1;
                key_items.extend(items);
            }
            Err(e) => issues.push(Issue::ParseError(ParseErrorIssue {
                file_path,
                error: format!("{:#}", e),
            })),
        }
    }

    CollectResult {
        key_items,
        parsed_count,
        issues,
    }
}

/// `file_path` relative to `base_dir`, with `/` separators.
pub fn relative_path(base_dir: &str, file_path: &str) -> String {
    let path = Path::new(file_path);
    let relative = path.strip_prefix(base_dir).unwrap_or(path);
    relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .filter(|c| c != ".")
        .collect::<Vec<_>>()
        .join("/")
}

#[cfg(test)]
mod tests {
    use crate::core::collect::*;
    use crate::core::key::Position;
    use crate::core::syntax::NodeKind;
    use pretty_assertions::assert_eq;
    use tempfile::tempdir;

    fn js() -> GrammarConfig {
        Grammars::default().get(Grammar::Js).clone()
    }

    #[test]
    fn test_collect_occurrences_in_document_order() {
        let code = "tr.msg('Привет');\nfoo(translator.message('Привет'), tr.msg('Пока', 'ctx'));\ntr.msg(x);";
        let items = collect_source(code, "src/a.js", &js(), CollectOptions::default()).unwrap();

        assert_eq!(items.len(), 2);
        assert_eq!(items.occurrences(), 3);

        let hello = items.get("Привет").unwrap();
        assert_eq!(hello.len(), 2);
        assert_eq!(hello[0].line(), 1);
        assert_eq!(hello[1].line(), 2);
        assert_eq!(hello[1].src(), "src/a.js");

        let bye = items.get("Пока\u{4}ctx").unwrap();
        assert_eq!(bye[0].context.as_deref(), Some("ctx"));
        assert_eq!(
            bye[0].location.as_ref().map(|l| l.start),
            Some(Position { line: 2, col: 41 })
        );
    }

    #[test]
    fn test_nested_translator_calls_are_found() {
        let code = "tr.msg('a {x}', null, { x: tr.msg('b') });";
        let items = collect_source(code, "a.js", &js(), CollectOptions::default()).unwrap();
        let keys: Vec<&String> = items.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["a {x}", "b"]);
    }

    #[test]
    fn test_transform_key_and_skip_property() {
        let upper = |key: &str| key.to_uppercase();
        let skip_functions =
            |slot: &str, parent: &SyntaxNode| slot == "body" && parent.kind == NodeKind::Other;
        let code = "tr.msg('a'); function f() { tr.msg('b'); }";

        let items = collect_source(
            code,
            "a.js",
            &js(),
            CollectOptions {
                transform_key: Some(&upper),
                skip_property: Some(&skip_functions),
            },
        )
        .unwrap();
        let keys: Vec<&String> = items.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["A"]);
    }

    #[test]
    fn test_collect_lua_and_template() {
        let grammars = Grammars::default();
        let lua = collect_source(
            "local s = tr.msg('Луа', 'ctx')",
            "a.lua",
            grammars.get(Grammar::Lua),
            CollectOptions::default(),
        )
        .unwrap();
        assert!(lua.get("Луа\u{4}ctx").is_some());

        let template = collect_source(
            "<b>{{MSG 'Шаблон'}}</b>\n<i title=\"{{MSG 'Атрибут' 'ctx'}}\"></i>",
            "a.hbs",
            grammars.get(Grammar::Template),
            CollectOptions::default(),
        )
        .unwrap();
        assert_eq!(template.get("Шаблон").unwrap()[0].line(), 1);
        assert_eq!(template.get("Атрибут\u{4}ctx").unwrap()[0].line(), 2);
    }

    #[test]
    fn test_collect_files_reports_parse_errors_and_continues() {
        let dir = tempdir().unwrap();
        let base = dir.path().to_str().unwrap().to_string();
        fs::write(dir.path().join("a.js"), "tr.msg('один');").unwrap();
        fs::write(dir.path().join("b.js"), "tr.msg(;").unwrap();
        fs::write(dir.path().join("c.lua"), "tr.msg('один')").unwrap();

        let files: Vec<String> = ["a.js", "b.js", "c.lua"]
            .iter()
            .map(|f| dir.path().join(f).to_string_lossy().into_owned())
            .collect();
        let result = collect_files(&base, &files, &Grammars::default(), CollectOptions::default());

        assert_eq!(result.parsed_count, 2);
        assert_eq!(result.issues.len(), 1);
        let srcs: Vec<&str> = result.key_items.get("один").unwrap().iter().map(|i| i.src()).collect();
        assert_eq!(srcs, vec!["a.js", "c.lua"]);
    }

    #[test]
    fn test_relative_path() {
        assert_eq!(relative_path("/p", "/p/src/a.js"), "src/a.js");
        assert_eq!(relative_path("./", "./src/a.js"), "src/a.js");
    }
}

//! Grammar adapters.
//!
//! A [`GrammarConfig`] is thin, immutable knowledge about one grammar's node
//! shapes: which calls are translator calls, where their key and context
//! arguments live, which literals are wrap candidates and which child slots
//! are off limits while wrapping. It never parses; the matching parser in
//! [`crate::core::parsers`] produces the tree it inspects.

mod defaults;

use std::path::Path;

use anyhow::{Context, Result};
use regex::Regex;

use crate::config::{Config, GrammarOverride};
use crate::core::key::{KeyItem, Location};
use crate::core::parsers::{js::parse_js, lua::parse_lua, template::parse_template};
use crate::core::syntax::{LineIndex, NodeKind, SyntaxNode};

pub use defaults::{JS_REQUIRE_TEMPLATE, LUA_REQUIRE_TEMPLATE};

/// Source grammars the engine understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Grammar {
    Js,
    Lua,
    Template,
}

impl Grammar {
    pub const ALL: [Grammar; 3] = [Grammar::Js, Grammar::Lua, Grammar::Template];

    /// Grammar of a file, by extension.
    pub fn from_path(path: &Path) -> Option<Grammar> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "js" | "mjs" | "cjs" => Some(Grammar::Js),
            "lua" => Some(Grammar::Lua),
            "hbs" | "handlebars" => Some(Grammar::Template),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Grammar::Js => "js",
            Grammar::Lua => "lua",
            Grammar::Template => "template",
        }
    }

    pub fn parse(self, code: &str, file_path: &str) -> Result<SyntaxNode> {
        match self {
            Grammar::Js => parse_js(code, file_path),
            Grammar::Lua => parse_lua(code),
            Grammar::Template => parse_template(code),
        }
    }
}

/// Argument position and accepted node kinds for a key or context argument.
#[derive(Debug, Clone)]
pub struct ArgSlot {
    pub index: usize,
    pub types: Vec<NodeKind>,
}

#[derive(Debug, Clone, Default)]
pub struct Excludes {
    pub properties: Vec<String>,
    pub node_types: Vec<NodeKind>,
    pub operators: Vec<String>,
    pub callee_names: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct WrapConfig {
    pub literal_node_types: Vec<NodeKind>,
    pub target_pattern: Regex,
    pub concat_operator: String,
    pub excludes: Excludes,
}

#[derive(Debug, Clone)]
pub struct GrammarConfig {
    pub grammar: Grammar,
    pub call_node_types: Vec<NodeKind>,
    /// Slot holding the callee (`callee`, `base`, `path`).
    pub callee_slot: &'static str,
    /// Slot holding call arguments (`arguments`, `params`).
    pub arguments_slot: &'static str,
    /// Path to the translator object name; `None` for helper-style calls.
    pub callee_object_path: Option<&'static str>,
    /// Path to the method or helper name.
    pub callee_property_path: &'static str,
    pub callee_object_names: Vec<String>,
    pub callee_property_names: Vec<String>,
    pub key_arg: ArgSlot,
    pub context_arg: ArgSlot,
    pub wrap: WrapConfig,
    /// Import statement template, `None` when the grammar has no imports.
    pub require_template: Option<&'static str>,
}

impl GrammarConfig {
    /// Built-in configuration for `grammar` with the given target pattern.
    pub fn new(grammar: Grammar, target_pattern: Regex) -> Self {
        match grammar {
            Grammar::Js => defaults::js(target_pattern),
            Grammar::Lua => defaults::lua(target_pattern),
            Grammar::Template => defaults::template(target_pattern),
        }
    }

    /// Merge user overrides into this configuration.
    pub fn with_override(mut self, overrides: &GrammarOverride) -> Self {
        if let Some(names) = &overrides.callee_object_names {
            self.callee_object_names = names.clone();
        }
        if let Some(names) = &overrides.callee_property_names {
            self.callee_property_names = names.clone();
        }
        let excludes = &mut self.wrap.excludes;
        excludes
            .callee_names
            .extend(overrides.exclude_callees.iter().cloned());
        excludes
            .properties
            .extend(overrides.exclude_properties.iter().cloned());
        self
    }

    /// Recognize the call the wrapper writes, `translator.message(..)`,
    /// next to the configured names.
    pub fn with_translator(mut self, translator: &str, message: &str) -> Self {
        if !self.callee_object_names.iter().any(|n| n == translator) {
            self.callee_object_names.push(translator.to_string());
        }
        if !self.callee_property_names.iter().any(|n| n == message) {
            self.callee_property_names.push(message.to_string());
        }
        self
    }

    /// Whether `node` is a call to the translator.
    pub fn is_translator_call(&self, node: &SyntaxNode) -> bool {
        if !self.call_node_types.contains(&node.kind) {
            return false;
        }
        let object_matches = match self.callee_object_path {
            Some(path) => node
                .value_at(path)
                .is_some_and(|name| self.callee_object_names.iter().any(|n| n == name)),
            None => true,
        };
        object_matches
            && node
                .value_at(self.callee_property_path)
                .is_some_and(|name| self.callee_property_names.iter().any(|n| n == name))
    }

    /// Whether `node` is a string literal that should be wrapped.
    ///
    /// Regex literals never qualify since they carry no string value kind.
    pub fn is_wrap_candidate(&self, node: &SyntaxNode) -> bool {
        self.wrap.literal_node_types.contains(&node.kind)
            && node
                .value
                .as_deref()
                .is_some_and(|value| self.wrap.target_pattern.is_match(value))
    }

    /// Key and context of a translator call.
    ///
    /// Arguments of an unlisted kind, or concatenations with a non-literal
    /// operand, yield `None` for that slot. The context is only read when a
    /// key was found; the location is that of the key argument.
    pub fn extract_key_item(&self, call: &SyntaxNode, index: &LineIndex) -> KeyItem {
        let key_node = self.argument(call, &self.key_arg);
        let key = key_node.and_then(|n| self.fold(n));

        let context = match key {
            Some(_) => self
                .argument(call, &self.context_arg)
                .and_then(|n| self.fold(n)),
            None => None,
        };

        let location = match (&key, key_node) {
            (Some(_), Some(node)) => {
                let (start, end) = node.span.positions(index);
                Some(Location {
                    start,
                    end,
                    src: None,
                })
            }
            _ => None,
        };

        KeyItem {
            key,
            context,
            location,
        }
    }

    fn argument<'a>(&self, call: &'a SyntaxNode, slot: &ArgSlot) -> Option<&'a SyntaxNode> {
        call.slot(self.arguments_slot)
            .nth(slot.index)
            .filter(|n| slot.types.contains(&n.kind))
    }

    /// Constant-fold a literal or a concatenation of literals.
    fn fold(&self, node: &SyntaxNode) -> Option<String> {
        match node.kind {
            NodeKind::StringLiteral => node.value.clone(),
            NodeKind::BinaryExpression
                if node.operator.as_deref() == Some(self.wrap.concat_operator.trim()) =>
            {
                let mut left = self.fold(node.get("left")?)?;
                let right = self.fold(node.get("right")?)?;
                left.push_str(&right);
                Some(left)
            }
            _ => None,
        }
    }

    /// Names a call is known by: the bare callee and the member name.
    pub fn callee_names<'a>(&self, call: &'a SyntaxNode) -> impl Iterator<Item = &'a str> {
        let bare = call
            .get(self.callee_slot)
            .filter(|n| matches!(n.kind, NodeKind::Identifier | NodeKind::PathExpression))
            .and_then(|n| n.value.as_deref());
        let member = call.value_at(self.callee_property_path);
        bare.into_iter().chain(member)
    }

    /// Whether the wrapper must not descend into `parent`'s `slot` children.
    pub fn is_wrap_pruned(&self, slot: &str, parent: &SyntaxNode) -> bool {
        let excludes = &self.wrap.excludes;

        if slot == self.arguments_slot
            && self.call_node_types.contains(&parent.kind)
            && self
                .callee_names(parent)
                .any(|name| excludes.callee_names.iter().any(|n| n == name))
        {
            return true;
        }

        excludes.properties.iter().any(|p| p == slot)
            || excludes.node_types.contains(&parent.kind)
            || parent
                .operator
                .as_deref()
                .is_some_and(|op| excludes.operators.iter().any(|o| o == op))
            || self.is_translator_call(parent)
    }

    /// Whether `node` imports the translator module.
    pub fn is_translator_import(&self, node: &SyntaxNode, module: &str) -> bool {
        match node.kind {
            NodeKind::ImportDeclaration => node.value.as_deref() == Some(module),
            NodeKind::CallExpression => {
                node.kind_at(self.callee_slot) == Some(NodeKind::Identifier)
                    && node
                        .slot(self.arguments_slot)
                        .next()
                        .and_then(|n| n.value.as_deref())
                        == Some(module)
            }
            _ => false,
        }
    }
}

/// Immutable per-grammar configurations for one run.
#[derive(Debug, Clone)]
pub struct Grammars {
    js: GrammarConfig,
    lua: GrammarConfig,
    template: GrammarConfig,
}

impl Grammars {
    /// Merge `config` over the built-in defaults.
    pub fn from_config(config: &Config) -> Result<Self> {
        let target = Regex::new(&config.wrap_target_pattern).with_context(|| {
            format!(
                "Invalid regex in 'wrapTargetPattern': \"{}\"",
                config.wrap_target_pattern
            )
        })?;
        let (translator, message) = (&config.translator, &config.translator_message);
        Ok(Self {
            js: GrammarConfig::new(Grammar::Js, target.clone())
                .with_override(&config.js)
                .with_translator(translator, message),
            lua: GrammarConfig::new(Grammar::Lua, target.clone())
                .with_override(&config.lua)
                .with_translator(translator, message),
            template: GrammarConfig::new(Grammar::Template, target)
                .with_override(&config.template),
        })
    }

    pub fn get(&self, grammar: Grammar) -> &GrammarConfig {
        match grammar {
            Grammar::Js => &self.js,
            Grammar::Lua => &self.lua,
            Grammar::Template => &self.template,
        }
    }
}

impl Default for Grammars {
    fn default() -> Self {
        let target = defaults::target_pattern();
        Self {
            js: GrammarConfig::new(Grammar::Js, target.clone()),
            lua: GrammarConfig::new(Grammar::Lua, target.clone()),
            template: GrammarConfig::new(Grammar::Template, target),
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::core::grammar::*;
    use pretty_assertions::assert_eq;

    fn find<'a>(node: &'a SyntaxNode, pred: &dyn Fn(&SyntaxNode) -> bool) -> Option<&'a SyntaxNode> {
        if pred(node) {
            return Some(node);
        }
        node.children.iter().find_map(|c| find(&c.node, pred))
    }

    fn js_call(code: &str) -> (SyntaxNode, GrammarConfig) {
        let ast = parse_js(code, "a.js").unwrap();
        (ast, Grammars::default().get(Grammar::Js).clone())
    }

    #[test]
    fn test_grammar_from_path() {
        assert_eq!(Grammar::from_path(Path::new("a/b.js")), Some(Grammar::Js));
        assert_eq!(Grammar::from_path(Path::new("b.MJS")), Some(Grammar::Js));
        assert_eq!(Grammar::from_path(Path::new("b.lua")), Some(Grammar::Lua));
        assert_eq!(
            Grammar::from_path(Path::new("b.handlebars")),
            Some(Grammar::Template)
        );
        assert_eq!(Grammar::from_path(Path::new("b.ts")), None);
        assert_eq!(Grammar::from_path(Path::new("Makefile")), None);
    }

    #[test]
    fn test_js_translator_call_and_folded_key() {
        let code = "tr.msg('Привет, ' + 'мир', 'greeting'); foo.msg('x'); tr.other('y');";
        let (ast, config) = js_call(code);
        let index = LineIndex::new(code);

        let calls: Vec<&SyntaxNode> = ast
            .children
            .iter()
            .map(|c| &c.node)
            .filter(|n| n.kind == NodeKind::CallExpression)
            .collect();
        assert_eq!(calls.len(), 3);
        assert!(config.is_translator_call(calls[0]));
        assert!(!config.is_translator_call(calls[1]));
        assert!(!config.is_translator_call(calls[2]));

        let item = config.extract_key_item(calls[0], &index);
        assert_eq!(item.key.as_deref(), Some("Привет, мир"));
        assert_eq!(item.context.as_deref(), Some("greeting"));
        assert_eq!(item.line(), 1);
    }

    #[test]
    fn test_fold_fails_on_non_literal_operand() {
        let code = "tr.msg('a' + name, 'ctx');";
        let (ast, config) = js_call(code);
        let call = find(&ast, &|n| n.kind == NodeKind::CallExpression).unwrap();
        let item = config.extract_key_item(call, &LineIndex::new(code));
        assert_eq!(item.key, None);
        assert_eq!(item.context, None);
        assert_eq!(item.location, None);
    }

    #[test]
    fn test_wrap_candidate_and_prune() {
        let code = "if (a === 'Да') { obj['ключ'] = 'Значение'; }";
        let (ast, config) = js_call(code);

        let literal = find(&ast, &|n| n.value.as_deref() == Some("Значение")).unwrap();
        assert!(config.is_wrap_candidate(literal));

        let regex = parse_js("x = /абв/;", "a.js").unwrap();
        let regex = find(&regex, &|n| n.kind == NodeKind::RegExpLiteral).unwrap();
        assert!(!config.is_wrap_candidate(regex));

        let if_stmt = &ast.children[0].node;
        assert!(config.is_wrap_pruned("test", if_stmt));
        assert!(!config.is_wrap_pruned("consequent", if_stmt));

        let comparison = if_stmt.get("test").unwrap();
        assert!(config.is_wrap_pruned("right", comparison));
    }

    #[test]
    fn test_excluded_callee_arguments_are_pruned() {
        let code = "require('модуль'); translator.message('Привет');";
        let (ast, config) = js_call(code);
        let require = &ast.children[0].node;
        assert!(config.is_wrap_pruned("arguments", require));
        assert!(config.is_translator_import(require, "модуль"));

        let message = &ast.children[1].node;
        assert!(config.is_translator_call(message));
        assert!(config.is_wrap_pruned("arguments", message));
    }

    #[test]
    fn test_overrides_merge_into_defaults() {
        let config = GrammarConfig::new(Grammar::Lua, Regex::new("x").unwrap()).with_override(
            &GrammarOverride {
                callee_object_names: Some(vec!["i18n".to_string()]),
                exclude_callees: vec!["log".to_string()],
                ..Default::default()
            },
        );
        assert_eq!(config.callee_object_names, vec!["i18n"]);
        assert_eq!(config.callee_property_names, vec!["message", "msg"]);
        assert!(config.wrap.excludes.callee_names.contains(&"require".to_string()));
        assert!(config.wrap.excludes.callee_names.contains(&"log".to_string()));
    }

    #[test]
    fn test_configured_translator_name_is_recognized() {
        let config = Config {
            translator: "i18n".to_string(),
            translator_message: "t".to_string(),
            ..Default::default()
        };
        let grammars = Grammars::from_config(&config).unwrap();

        let js = grammars.get(Grammar::Js);
        assert_eq!(js.callee_object_names, vec!["translator", "tr", "i18n"]);
        assert_eq!(js.callee_property_names, vec!["message", "msg", "t"]);
        let ast = parse_js("i18n.t('Привет');", "a.js").unwrap();
        assert!(js.is_translator_call(&ast.children[0].node));

        let lua = grammars.get(Grammar::Lua);
        let ast = parse_lua("i18n.t('Привет')").unwrap();
        assert!(find(&ast, &|n| lua.is_translator_call(n)).is_some());

        let template = grammars.get(Grammar::Template);
        assert_eq!(template.callee_property_names, vec!["MSG"]);
    }

    #[test]
    fn test_lua_translator_call() {
        let code = "local s = translator.message([[Привет]] .. 'мир')";
        let ast = parse_lua(code).unwrap();
        let config = Grammars::default().get(Grammar::Lua).clone();
        let call = find(&ast, &|n| config.is_translator_call(n)).unwrap();
        let item = config.extract_key_item(call, &LineIndex::new(code));
        assert_eq!(item.key.as_deref(), Some("Приветмир"));
    }

    #[test]
    fn test_template_helper_call() {
        let code = "<p>{{MSG 'Привет' 'ctx'}}</p>\n{{other 'x'}}";
        let ast = parse_template(code).unwrap();
        let config = Grammars::default().get(Grammar::Template).clone();

        let helper = &ast.children[0].node;
        assert!(config.is_translator_call(helper));
        assert!(!config.is_translator_call(&ast.children[1].node));

        let item = config.extract_key_item(helper, &LineIndex::new(code));
        assert_eq!(item.key.as_deref(), Some("Привет"));
        assert_eq!(item.context.as_deref(), Some("ctx"));
        assert_eq!(item.location.map(|l| l.start.col), Some(9));
    }
}

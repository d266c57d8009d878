use std::sync::LazyLock;

use regex::Regex;

use super::{ArgSlot, Excludes, Grammar, GrammarConfig, WrapConfig};
use crate::core::syntax::NodeKind;

pub const JS_REQUIRE_TEMPLATE: &str =
    "var {translator} = require('{translatorRequire}').translator;";

pub const LUA_REQUIRE_TEMPLATE: &str = "{translator} = require('{translatorRequire}').translator";

/// Cyrillic letters and the numero sign.
static TARGET_PATTERN: LazyLock<Regex> = LazyLock::new(|| Regex::new("(?i)[№а-яё]").unwrap());

pub fn target_pattern() -> Regex {
    TARGET_PATTERN.clone()
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

fn script_arg(index: usize) -> ArgSlot {
    ArgSlot {
        index,
        types: vec![NodeKind::StringLiteral, NodeKind::BinaryExpression],
    }
}

pub fn js(target_pattern: Regex) -> GrammarConfig {
    GrammarConfig {
        grammar: Grammar::Js,
        call_node_types: vec![NodeKind::CallExpression],
        callee_slot: "callee",
        arguments_slot: "arguments",
        callee_object_path: Some("callee.object"),
        callee_property_path: "callee.property",
        callee_object_names: strings(&["translator", "tr"]),
        callee_property_names: strings(&["message", "msg"]),
        key_arg: script_arg(0),
        context_arg: script_arg(1),
        wrap: WrapConfig {
            literal_node_types: vec![NodeKind::StringLiteral],
            target_pattern,
            concat_operator: " + ".to_string(),
            excludes: Excludes {
                properties: strings(&["key", "property", "test"]),
                node_types: vec![NodeKind::LogicalExpression],
                operators: strings(&["==", "===", "!=", "!=="]),
                callee_names: strings(&["require"]),
            },
        },
        require_template: Some(JS_REQUIRE_TEMPLATE),
    }
}

pub fn lua(target_pattern: Regex) -> GrammarConfig {
    GrammarConfig {
        grammar: Grammar::Lua,
        call_node_types: vec![NodeKind::CallExpression],
        callee_slot: "base",
        arguments_slot: "arguments",
        callee_object_path: Some("base.base"),
        callee_property_path: "base.identifier",
        callee_object_names: strings(&["translator", "tr"]),
        callee_property_names: strings(&["message", "msg"]),
        key_arg: script_arg(0),
        context_arg: script_arg(1),
        wrap: WrapConfig {
            literal_node_types: vec![NodeKind::StringLiteral],
            target_pattern,
            concat_operator: " .. ".to_string(),
            excludes: Excludes {
                properties: strings(&["key", "index", "condition"]),
                node_types: vec![NodeKind::LogicalExpression],
                operators: strings(&["==", "~="]),
                callee_names: strings(&["require", "dofile", "pcall"]),
            },
        },
        require_template: Some(LUA_REQUIRE_TEMPLATE),
    }
}

pub fn template(target_pattern: Regex) -> GrammarConfig {
    GrammarConfig {
        grammar: Grammar::Template,
        call_node_types: vec![NodeKind::MustacheStatement, NodeKind::SubExpression],
        callee_slot: "path",
        arguments_slot: "params",
        callee_object_path: None,
        callee_property_path: "path",
        callee_object_names: Vec::new(),
        callee_property_names: strings(&["MSG"]),
        key_arg: ArgSlot {
            index: 0,
            types: vec![NodeKind::StringLiteral],
        },
        context_arg: ArgSlot {
            index: 1,
            types: vec![NodeKind::StringLiteral],
        },
        wrap: WrapConfig {
            literal_node_types: vec![NodeKind::StringLiteral],
            target_pattern,
            concat_operator: String::new(),
            excludes: Excludes {
                properties: strings(&["path"]),
                ..Default::default()
            },
        },
        require_template: None,
    }
}

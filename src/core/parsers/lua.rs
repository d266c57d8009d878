//! Lua source parser.
//!
//! Parses with `emmylua_parser` and lowers the rowan tree into a
//! [`SyntaxNode`] tree using luaparse-style slot names (`base`,
//! `identifier`, `index`, `condition`, ...).

use anyhow::{Result, anyhow};
use emmylua_parser::{
    BinaryOperator, LuaAstNode, LuaAstToken, LuaBinaryExpr, LuaIndexExpr, LuaLiteralExpr,
    LuaLiteralToken, LuaNameExpr, LuaParser, LuaSyntaxKind, LuaSyntaxNode, LuaTokenKind,
    ParserConfig,
};

use crate::core::syntax::{NodeKind, Span, SyntaxNode};

/// Parse Lua source into a syntax tree with byte-offset spans.
///
/// Any syntax error fails the whole file.
pub fn parse_lua(code: &str) -> Result<SyntaxNode> {
    let tree = LuaParser::parse(code, ParserConfig::default());

    if tree.has_syntax_errors() {
        let message = tree
            .get_errors()
            .first()
            .map(|e| {
                let offset = u32::from(e.range.start()) as usize;
                format!("{} at offset {}", e.message, offset)
            })
            .unwrap_or_default();
        return Err(anyhow!("Failed to parse lua: {}", message));
    }

    let mut program = lower(&tree.get_red_root());
    program.kind = NodeKind::Program;
    Ok(program)
}

fn span_of(node: &LuaSyntaxNode) -> Span {
    let range = node.text_range();
    Span::offsets(
        u32::from(range.start()) as usize,
        u32::from(range.end()) as usize,
    )
}

fn is_expression(kind: LuaSyntaxKind) -> bool {
    matches!(
        kind,
        LuaSyntaxKind::ParenExpr
            | LuaSyntaxKind::LiteralExpr
            | LuaSyntaxKind::ClosureExpr
            | LuaSyntaxKind::UnaryExpr
            | LuaSyntaxKind::BinaryExpr
            | LuaSyntaxKind::TableArrayExpr
            | LuaSyntaxKind::TableObjectExpr
            | LuaSyntaxKind::TableEmptyExpr
            | LuaSyntaxKind::IndexExpr
            | LuaSyntaxKind::NameExpr
    ) || is_call(kind)
}

fn is_call(kind: LuaSyntaxKind) -> bool {
    matches!(
        kind,
        LuaSyntaxKind::CallExpr
            | LuaSyntaxKind::RequireCallExpr
            | LuaSyntaxKind::ErrorCallExpr
            | LuaSyntaxKind::AssertCallExpr
            | LuaSyntaxKind::TypeCallExpr
            | LuaSyntaxKind::SetmetatableCallExpr
    )
}

fn binary_operator(op: BinaryOperator) -> &'static str {
    match op {
        BinaryOperator::OpAdd => "+",
        BinaryOperator::OpSub => "-",
        BinaryOperator::OpMul => "*",
        BinaryOperator::OpDiv => "/",
        BinaryOperator::OpIDiv => "//",
        BinaryOperator::OpMod => "%",
        BinaryOperator::OpPow => "^",
        BinaryOperator::OpBAnd => "&",
        BinaryOperator::OpBOr => "|",
        BinaryOperator::OpBXor => "~",
        BinaryOperator::OpShl => "<<",
        BinaryOperator::OpShr => ">>",
        BinaryOperator::OpConcat => "..",
        BinaryOperator::OpLt => "<",
        BinaryOperator::OpLe => "<=",
        BinaryOperator::OpGt => ">",
        BinaryOperator::OpGe => ">=",
        BinaryOperator::OpEq => "==",
        BinaryOperator::OpNe => "~=",
        BinaryOperator::OpAnd => "and",
        BinaryOperator::OpOr => "or",
        BinaryOperator::OpNop => "",
    }
}

fn syntax_kind(node: &LuaSyntaxNode) -> LuaSyntaxKind {
    LuaSyntaxKind::from(node.kind())
}

/// `f 'x'`, `f [[x]]` and `f {..}` pass their single argument without
/// parentheses.
fn has_parens(args: &LuaSyntaxNode) -> bool {
    args.children_with_tokens()
        .any(|t| LuaTokenKind::from(t.kind()) == LuaTokenKind::TkLeftParen)
}

fn lower(node: &LuaSyntaxNode) -> SyntaxNode {
    let kind = syntax_kind(node);
    let span = span_of(node);

    match kind {
        _ if is_call(kind) => {
            let mut call = SyntaxNode::new(NodeKind::CallExpression, span);
            for child in node.children() {
                if syntax_kind(&child) == LuaSyntaxKind::CallArgList {
                    let bare = !has_parens(&child);
                    for arg in child.children() {
                        let mut argument = lower(&arg);
                        argument.bare_argument = bare;
                        call.push("arguments", argument);
                    }
                } else {
                    call.push("base", lower(&child));
                }
            }
            call
        }
        LuaSyntaxKind::IndexExpr => {
            let mut member = SyntaxNode::new(NodeKind::MemberExpression, span);
            let mut children = node.children();
            if let Some(prefix) = children.next() {
                member.push("base", lower(&prefix));
            }
            if let Some(name) = LuaIndexExpr::cast(node.clone()).and_then(|e| e.get_name_token()) {
                let range = name.syntax().text_range();
                let identifier = SyntaxNode::new(
                    NodeKind::Identifier,
                    Span::offsets(
                        u32::from(range.start()) as usize,
                        u32::from(range.end()) as usize,
                    ),
                )
                .with_value(name.get_name_text());
                member.push("identifier", identifier);
            }
            for index in children {
                member.push("index", lower(&index));
            }
            member
        }
        LuaSyntaxKind::BinaryExpr => {
            let op = LuaBinaryExpr::cast(node.clone())
                .and_then(|b| b.get_op_token())
                .map(|t| t.get_op())
                .unwrap_or(BinaryOperator::OpNop);
            let kind = match op {
                BinaryOperator::OpAnd | BinaryOperator::OpOr => NodeKind::LogicalExpression,
                _ => NodeKind::BinaryExpression,
            };
            let mut binary = SyntaxNode::new(kind, span).with_operator(binary_operator(op));
            let mut operands = node.children();
            if let Some(left) = operands.next() {
                binary.push("left", lower(&left));
            }
            if let Some(right) = operands.next() {
                binary.push("right", lower(&right));
            }
            binary
        }
        LuaSyntaxKind::LiteralExpr => {
            match LuaLiteralExpr::cast(node.clone()).and_then(|l| l.get_literal()) {
                Some(LuaLiteralToken::String(token)) => {
                    SyntaxNode::new(NodeKind::StringLiteral, span).with_value(token.get_value())
                }
                _ => SyntaxNode::new(NodeKind::Literal, span),
            }
        }
        LuaSyntaxKind::NameExpr => {
            let mut ident = SyntaxNode::new(NodeKind::Identifier, span);
            if let Some(name) = LuaNameExpr::cast(node.clone()).and_then(|n| n.get_name_text()) {
                ident = ident.with_value(name);
            }
            ident
        }
        LuaSyntaxKind::TableFieldAssign | LuaSyntaxKind::TableFieldValue => {
            let mut field = SyntaxNode::new(NodeKind::Property, span);
            let parts: Vec<LuaSyntaxNode> = node.children().collect();
            let value_index = parts.len().saturating_sub(1);
            for (i, part) in parts.iter().enumerate() {
                let slot = if i == value_index { "value" } else { "key" };
                field.push(slot, lower(part));
            }
            field
        }
        LuaSyntaxKind::IfStat
        | LuaSyntaxKind::ElseIfClauseStat
        | LuaSyntaxKind::WhileStat
        | LuaSyntaxKind::RepeatStat => {
            let node_kind = match kind {
                LuaSyntaxKind::IfStat => NodeKind::IfStatement,
                LuaSyntaxKind::WhileStat | LuaSyntaxKind::RepeatStat => NodeKind::WhileStatement,
                _ => NodeKind::Other,
            };
            let mut statement = SyntaxNode::new(node_kind, span);
            for child in node.children() {
                let slot = if is_expression(syntax_kind(&child)) {
                    "condition"
                } else {
                    "body"
                };
                statement.push(slot, lower(&child));
            }
            statement
        }
        _ => {
            let mut other = SyntaxNode::new(NodeKind::Other, span);
            for child in node.children() {
                other.push("body", lower(&child));
            }
            other
        }
    }
}

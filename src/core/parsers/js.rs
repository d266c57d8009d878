//! JS source parser.
//!
//! Parses with swc and lowers the module/script into a [`SyntaxNode`] tree.
//! Only the node shapes the engine inspects are lowered explicitly; every
//! other swc node is transparent and its descendants attach to the nearest
//! lowered ancestor under the current slot.

use std::sync::Arc;

use anyhow::{Result, anyhow};
use swc_common::{BytePos, FileName, GLOBALS, Globals, SourceMap, Spanned};
use swc_ecma_ast::{
    ArrowExpr, BinExpr, BinaryOp, Bool, CallExpr, ClassMethod, ClassProp, CondExpr, DoWhileStmt,
    ExportAll, ForStmt, Function, GetterProp, Ident, IfStmt, ImportDecl, KeyValuePatProp,
    KeyValueProp, MemberExpr, MemberProp, MethodProp, NamedExport, Null, Number, PropName, Regex,
    SetterProp, Str, Tpl, WhileStmt,
};
use swc_ecma_parser::{EsSyntax, Parser, StringInput, Syntax};
use swc_ecma_visit::{Visit, VisitWith};

use crate::core::syntax::{NodeKind, Span, SyntaxNode};

/// Parse JS source into a syntax tree with byte-offset spans.
pub fn parse_js(code: &str, file_path: &str) -> Result<SyntaxNode> {
    let source_map: Arc<SourceMap> = Default::default();

    GLOBALS.set(&Globals::new(), || {
        let source_file =
            source_map.new_source_file(FileName::Real(file_path.into()).into(), code.to_string());

        let syntax = Syntax::Es(EsSyntax {
            allow_return_outside_function: true,
            ..Default::default()
        });

        let mut parser = Parser::new(syntax, StringInput::from(&*source_file), None);
        let program = parser
            .parse_program()
            .map_err(|e| anyhow!("Failed to parse js: {:?}", e))?;

        if let Some(error) = parser.take_errors().into_iter().next() {
            return Err(anyhow!("Failed to parse js: {:?}", error));
        }

        let mut lowering = Lowering::new(source_file.start_pos.0, code.len());
        program.visit_with(&mut lowering);
        Ok(lowering.finish())
    })
}

struct Lowering {
    base: u32,
    stack: Vec<(&'static str, SyntaxNode)>,
    slot: &'static str,
}

impl Lowering {
    fn new(base: u32, len: usize) -> Self {
        Self {
            base,
            stack: vec![("body", SyntaxNode::new(NodeKind::Program, Span::offsets(0, len)))],
            slot: "body",
        }
    }

    fn span(&self, span: swc_common::Span) -> Span {
        self.range(span.lo, span.hi)
    }

    fn range(&self, lo: BytePos, hi: BytePos) -> Span {
        Span::offsets(
            lo.0.saturating_sub(self.base) as usize,
            hi.0.saturating_sub(self.base) as usize,
        )
    }

    fn open(&mut self, node: SyntaxNode) {
        self.stack.push((self.slot, node));
    }

    fn close(&mut self) {
        if self.stack.len() < 2 {
            return;
        }
        if let Some((slot, node)) = self.stack.pop()
            && let Some((_, parent)) = self.stack.last_mut()
        {
            parent.push(slot, node);
        }
    }

    fn leaf(&mut self, node: SyntaxNode) {
        let slot = self.slot;
        if let Some((_, parent)) = self.stack.last_mut() {
            parent.push(slot, node);
        }
    }

    fn in_slot(&mut self, slot: &'static str, f: impl FnOnce(&mut Self)) {
        let previous = std::mem::replace(&mut self.slot, slot);
        f(self);
        self.slot = previous;
    }

    /// Open a `Property` whose name goes under `key`; `rest` lowers the
    /// remaining parts under their own slots.
    fn keyed(&mut self, span: Span, key: &PropName, rest: impl FnOnce(&mut Self)) {
        self.open(SyntaxNode::new(NodeKind::Property, span));
        self.in_slot("key", |v| key.visit_with(v));
        rest(self);
        self.close();
    }

    /// Module specifier of a re-export, kept as an opaque leaf.
    fn module_source(&mut self, span: swc_common::Span, source: &Str) {
        let mut leaf = SyntaxNode::new(NodeKind::Other, self.span(span));
        if let Some(value) = source.value.as_str() {
            leaf = leaf.with_value(value);
        }
        self.leaf(leaf);
    }

    fn finish(mut self) -> SyntaxNode {
        while self.stack.len() > 1 {
            self.close();
        }
        self.stack
            .pop()
            .map(|(_, node)| node)
            .unwrap_or_else(|| SyntaxNode::new(NodeKind::Program, Span::offsets(0, 0)))
    }
}

impl Visit for Lowering {
    fn visit_call_expr(&mut self, node: &CallExpr) {
        self.open(SyntaxNode::new(NodeKind::CallExpression, self.span(node.span)));
        self.in_slot("callee", |v| node.callee.visit_with(v));
        self.in_slot("arguments", |v| {
            for arg in &node.args {
                arg.visit_with(v);
            }
        });
        self.close();
    }

    fn visit_member_expr(&mut self, node: &MemberExpr) {
        self.open(SyntaxNode::new(NodeKind::MemberExpression, self.span(node.span)));
        self.in_slot("object", |v| node.obj.visit_with(v));
        self.in_slot("property", |v| match &node.prop {
            MemberProp::Ident(ident) => {
                let leaf = SyntaxNode::new(NodeKind::Identifier, v.span(ident.span))
                    .with_value(ident.sym.as_str());
                v.leaf(leaf);
            }
            MemberProp::PrivateName(name) => {
                let leaf = SyntaxNode::new(NodeKind::Identifier, v.span(name.span))
                    .with_value(name.name.as_str());
                v.leaf(leaf);
            }
            MemberProp::Computed(computed) => computed.expr.visit_with(v),
        });
        self.close();
    }

    fn visit_bin_expr(&mut self, node: &BinExpr) {
        let kind = match node.op {
            BinaryOp::LogicalAnd | BinaryOp::LogicalOr | BinaryOp::NullishCoalescing => {
                NodeKind::LogicalExpression
            }
            _ => NodeKind::BinaryExpression,
        };
        self.open(SyntaxNode::new(kind, self.span(node.span)).with_operator(node.op.to_string()));
        self.in_slot("left", |v| node.left.visit_with(v));
        self.in_slot("right", |v| node.right.visit_with(v));
        self.close();
    }

    fn visit_cond_expr(&mut self, node: &CondExpr) {
        self.open(SyntaxNode::new(NodeKind::ConditionalExpression, self.span(node.span)));
        self.in_slot("test", |v| node.test.visit_with(v));
        self.in_slot("consequent", |v| node.cons.visit_with(v));
        self.in_slot("alternate", |v| node.alt.visit_with(v));
        self.close();
    }

    fn visit_key_value_prop(&mut self, node: &KeyValueProp) {
        let span = self.range(node.key.span().lo, node.value.span().hi);
        self.keyed(span, &node.key, |v| {
            v.in_slot("value", |v| node.value.visit_with(v));
        });
    }

    fn visit_key_value_pat_prop(&mut self, node: &KeyValuePatProp) {
        let span = self.range(node.key.span().lo, node.value.span().hi);
        self.keyed(span, &node.key, |v| {
            v.in_slot("value", |v| node.value.visit_with(v));
        });
    }

    fn visit_method_prop(&mut self, node: &MethodProp) {
        let span = self.range(node.key.span().lo, node.function.span.hi);
        self.keyed(span, &node.key, |v| {
            v.in_slot("value", |v| node.function.visit_with(v));
        });
    }

    fn visit_getter_prop(&mut self, node: &GetterProp) {
        self.keyed(self.span(node.span), &node.key, |v| {
            v.in_slot("value", |v| node.body.visit_with(v));
        });
    }

    fn visit_setter_prop(&mut self, node: &SetterProp) {
        self.keyed(self.span(node.span), &node.key, |v| {
            v.in_slot("value", |v| {
                node.param.visit_with(v);
                node.body.visit_with(v);
            });
        });
    }

    fn visit_class_method(&mut self, node: &ClassMethod) {
        self.keyed(self.span(node.span), &node.key, |v| {
            v.in_slot("value", |v| node.function.visit_with(v));
        });
    }

    fn visit_class_prop(&mut self, node: &ClassProp) {
        self.keyed(self.span(node.span), &node.key, |v| {
            v.in_slot("value", |v| node.value.visit_with(v));
        });
    }

    fn visit_export_all(&mut self, node: &ExportAll) {
        self.module_source(node.span, &node.src);
    }

    fn visit_named_export(&mut self, node: &NamedExport) {
        match &node.src {
            Some(src) => self.module_source(node.span, src),
            None => node.visit_children_with(self),
        }
    }

    fn visit_if_stmt(&mut self, node: &IfStmt) {
        self.open(SyntaxNode::new(NodeKind::IfStatement, self.span(node.span)));
        self.in_slot("test", |v| node.test.visit_with(v));
        self.in_slot("consequent", |v| node.cons.visit_with(v));
        self.in_slot("alternate", |v| node.alt.visit_with(v));
        self.close();
    }

    fn visit_while_stmt(&mut self, node: &WhileStmt) {
        self.open(SyntaxNode::new(NodeKind::WhileStatement, self.span(node.span)));
        self.in_slot("test", |v| node.test.visit_with(v));
        self.in_slot("body", |v| node.body.visit_with(v));
        self.close();
    }

    fn visit_do_while_stmt(&mut self, node: &DoWhileStmt) {
        self.open(SyntaxNode::new(NodeKind::WhileStatement, self.span(node.span)));
        self.in_slot("body", |v| node.body.visit_with(v));
        self.in_slot("test", |v| node.test.visit_with(v));
        self.close();
    }

    fn visit_for_stmt(&mut self, node: &ForStmt) {
        self.open(SyntaxNode::new(NodeKind::ForStatement, self.span(node.span)));
        self.in_slot("init", |v| node.init.visit_with(v));
        self.in_slot("test", |v| node.test.visit_with(v));
        self.in_slot("update", |v| node.update.visit_with(v));
        self.in_slot("body", |v| node.body.visit_with(v));
        self.close();
    }

    fn visit_function(&mut self, node: &Function) {
        self.open(SyntaxNode::new(NodeKind::Other, self.span(node.span)));
        self.in_slot("body", |v| node.visit_children_with(v));
        self.close();
    }

    fn visit_arrow_expr(&mut self, node: &ArrowExpr) {
        self.open(SyntaxNode::new(NodeKind::Other, self.span(node.span)));
        self.in_slot("body", |v| node.visit_children_with(v));
        self.close();
    }

    fn visit_tpl(&mut self, node: &Tpl) {
        self.open(SyntaxNode::new(NodeKind::TemplateLiteral, self.span(node.span)));
        self.in_slot("expressions", |v| {
            for expr in &node.exprs {
                expr.visit_with(v);
            }
        });
        self.close();
    }

    fn visit_import_decl(&mut self, node: &ImportDecl) {
        let mut leaf = SyntaxNode::new(NodeKind::ImportDeclaration, self.span(node.span));
        if let Some(source) = node.src.value.as_str() {
            leaf = leaf.with_value(source);
        }
        self.leaf(leaf);
    }

    fn visit_str(&mut self, node: &Str) {
        let mut leaf = SyntaxNode::new(NodeKind::StringLiteral, self.span(node.span));
        if let Some(value) = node.value.as_str() {
            leaf = leaf.with_value(value);
        }
        self.leaf(leaf);
    }

    fn visit_regex(&mut self, node: &Regex) {
        let leaf = SyntaxNode::new(NodeKind::RegExpLiteral, self.span(node.span))
            .with_value(node.exp.as_str());
        self.leaf(leaf);
    }

    fn visit_ident(&mut self, node: &Ident) {
        let leaf =
            SyntaxNode::new(NodeKind::Identifier, self.span(node.span)).with_value(node.sym.as_str());
        self.leaf(leaf);
    }

    fn visit_number(&mut self, node: &Number) {
        self.leaf(SyntaxNode::new(NodeKind::Literal, self.span(node.span)));
    }

    fn visit_bool(&mut self, node: &Bool) {
        self.leaf(SyntaxNode::new(NodeKind::Literal, self.span(node.span)));
    }

    fn visit_null(&mut self, node: &Null) {
        self.leaf(SyntaxNode::new(NodeKind::Literal, self.span(node.span)));
    }
}

use serde::{Deserialize, Serialize};

use super::span::Span;

/// Closed set of node kinds shared by all grammars.
///
/// Script grammars use ESTree-style names, the template grammar uses the
/// names of its own AST. Anything the engine does not inspect is `Other`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NodeKind {
    Program,
    CallExpression,
    MemberExpression,
    Identifier,
    StringLiteral,
    RegExpLiteral,
    TemplateLiteral,
    Literal,
    BinaryExpression,
    LogicalExpression,
    ConditionalExpression,
    Property,
    IfStatement,
    WhileStatement,
    ForStatement,
    ImportDeclaration,
    MustacheStatement,
    BlockStatement,
    SubExpression,
    PathExpression,
    HashPair,
    Other,
}

/// A child node together with the slot (property name) it occupies.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Child {
    pub slot: &'static str,
    pub node: SyntaxNode,
}

/// Grammar-independent syntax tree node.
///
/// `value` carries the cooked string of literals, the name of identifiers
/// and the original text of template paths. `operator` is set on binary
/// and logical expressions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SyntaxNode {
    pub kind: NodeKind,
    pub span: Span,
    pub value: Option<String>,
    pub operator: Option<String>,
    /// Call argument written without parentheses (Lua `f 'x'`). An
    /// expression spliced in its place must be parenthesized.
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub bare_argument: bool,
    pub children: Vec<Child>,
}

impl SyntaxNode {
    pub fn new(kind: NodeKind, span: Span) -> Self {
        Self {
            kind,
            span,
            value: None,
            operator: None,
            bare_argument: false,
            children: Vec::new(),
        }
    }

    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.value = Some(value.into());
        self
    }

    pub fn with_operator(mut self, operator: impl Into<String>) -> Self {
        self.operator = Some(operator.into());
        self
    }

    pub fn push(&mut self, slot: &'static str, node: SyntaxNode) {
        self.children.push(Child { slot, node });
    }

    /// Children stored under `slot`, in document order.
    pub fn slot<'a>(&'a self, slot: &str) -> impl Iterator<Item = &'a SyntaxNode> {
        self.children
            .iter()
            .filter(move |c| c.slot == slot)
            .map(|c| &c.node)
    }

    /// Look up a descendant by path.
    ///
    /// Segments are separated by `.`; a segment is a slot name, optionally
    /// indexed (`arguments[1]`). An unindexed segment selects the first
    /// child in that slot.
    ///
    /// ```
    /// # use harvest::core::syntax::{NodeKind, Span, SyntaxNode};
    /// let mut member = SyntaxNode::new(NodeKind::MemberExpression, Span::offsets(0, 6));
    /// member.push("object", SyntaxNode::new(NodeKind::Identifier, Span::offsets(0, 2)).with_value("tr"));
    /// let mut call = SyntaxNode::new(NodeKind::CallExpression, Span::offsets(0, 8));
    /// call.push("callee", member);
    /// assert_eq!(call.value_at("callee.object"), Some("tr"));
    /// assert!(call.get("arguments[0]").is_none());
    /// ```
    pub fn get(&self, path: &str) -> Option<&SyntaxNode> {
        path.split('.').try_fold(self, |node, segment| {
            let (slot, index) = parse_segment(segment)?;
            node.slot(slot).nth(index)
        })
    }

    /// `value` of the node at `path`.
    pub fn value_at(&self, path: &str) -> Option<&str> {
        self.get(path).and_then(|n| n.value.as_deref())
    }

    /// `kind` of the node at `path`.
    pub fn kind_at(&self, path: &str) -> Option<NodeKind> {
        self.get(path).map(|n| n.kind)
    }
}

fn parse_segment(segment: &str) -> Option<(&str, usize)> {
    match segment.split_once('[') {
        Some((slot, rest)) => {
            let index = rest.strip_suffix(']')?.parse().ok()?;
            Some((slot, index))
        }
        None => Some((segment, 0)),
    }
}

#[cfg(test)]
mod tests {
    use crate::core::syntax::node::*;
    use pretty_assertions::assert_eq;

    fn ident(name: &str) -> SyntaxNode {
        SyntaxNode::new(NodeKind::Identifier, Span::offsets(0, 0)).with_value(name)
    }

    #[test]
    fn test_get_by_indexed_path() {
        let mut call = SyntaxNode::new(NodeKind::CallExpression, Span::offsets(0, 10));
        call.push("callee", ident("foo"));
        call.push("arguments", ident("a"));
        call.push("arguments", ident("b"));

        assert_eq!(call.value_at("callee"), Some("foo"));
        assert_eq!(call.value_at("arguments"), Some("a"));
        assert_eq!(call.value_at("arguments[1]"), Some("b"));
        assert_eq!(call.value_at("arguments[2]"), None);
        assert_eq!(call.value_at("arguments[x]"), None);
        assert_eq!(call.kind_at("callee"), Some(NodeKind::Identifier));
    }

    #[test]
    fn test_node_kind_deserializes_from_name() {
        let kinds: Vec<NodeKind> =
            serde_json::from_str(r#"["StringLiteral", "LogicalExpression"]"#).unwrap();
        assert_eq!(
            kinds,
            vec![NodeKind::StringLiteral, NodeKind::LogicalExpression]
        );
    }
}

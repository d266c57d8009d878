use std::ops::ControlFlow;

use super::node::SyntaxNode;

/// Callbacks for a pre-order walk over a [`SyntaxNode`] tree.
pub trait Visitor {
    /// Value carried out of the walk when a visit breaks.
    type Break;

    /// Called for every reached node before its children.
    fn visit(&mut self, node: &SyntaxNode) -> ControlFlow<Self::Break>;

    /// Whether the children of `parent` stored under `slot` are skipped.
    fn prune(&mut self, _slot: &str, _parent: &SyntaxNode) -> bool {
        false
    }
}

/// Walk `root` in pre-order (document order), stopping at the first break.
///
/// Every node is visited at most once.
pub fn walk<V: Visitor>(root: &SyntaxNode, visitor: &mut V) -> ControlFlow<V::Break> {
    visitor.visit(root)?;
    for child in &root.children {
        if visitor.prune(child.slot, root) {
            continue;
        }
        walk(&child.node, visitor)?;
    }
    ControlFlow::Continue(())
}

//! Grammar-independent syntax tree.
//!
//! Every parser lowers its native AST into [`SyntaxNode`]s: a closed
//! [`NodeKind`], a [`Span`], and children tagged with the slot they occupy
//! (`callee`, `arguments`, `params`, ...). The collector and the wrapper only
//! ever look at this tree, through path lookups and a pruning [`walk`].

mod node;
mod span;
mod walk;

pub use node::{Child, NodeKind, SyntaxNode};
pub use span::{LineIndex, Span};
pub use walk::{Visitor, walk};

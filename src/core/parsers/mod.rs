//! Source parsers.
//!
//! Each parser lowers its native AST into the shared
//! [`SyntaxNode`](crate::core::syntax::SyntaxNode) tree:
//! - `js`: JS sources (uses swc)
//! - `lua`: Lua sources (uses emmylua_parser)
//! - `template`: Handlebars templates (mustache statements only)
//! - `markup`: HTML text and attribute ranges of templates

pub mod js;
pub mod lua;
pub mod markup;
pub mod template;

//! Grammar-agnostic extraction and rewrite engine.
//!
//! ## Module Structure
//!
//! - `key`: Message keys and the collected occurrences per key
//! - `syntax`: Generic syntax tree, span resolution and the pruning walker
//! - `parsers`: One parser per grammar, each lowering into `syntax`
//! - `grammar`: Per-grammar configuration and node predicates
//! - `file_scanner`: Source file enumeration
//! - `collect`: Finds translator call-sites and harvests their keys
//! - `wrap`: Splices translator calls around candidate literals

pub mod collect;
pub mod file_scanner;
pub mod grammar;
pub mod key;
pub mod parsers;
pub mod syntax;
pub mod wrap;

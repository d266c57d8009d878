//! Harvest - translatable-text extraction, rewrite and catalog engine
//!
//! Harvest finds translator call-sites in JavaScript, Lua and Handlebars-like
//! template sources, wraps untranslated string literals in translator calls,
//! and maintains the gettext catalogs the runtime formatter reads.
//!
//! ## Module Structure
//!
//! - `catalog`: PO codec, template build, locale merge, transfer and statistics
//! - `cli`: Command-line interface layer
//! - `config`: Configuration file loading and parsing
//! - `core`: Grammar-agnostic collection and wrapping engine
//! - `issues`: Issue type definitions and reporting
//! - `utils`: Shared utility functions

pub mod catalog;
pub mod cli;
pub mod config;
pub mod core;
pub mod issues;
pub mod utils;

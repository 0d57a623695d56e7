//! # Control Queries
//!
//! A query language for locating controls in an accessibility tree with
//! support for:
//! - Property comparisons (exact, substring, regular expression), optionally
//!   case-insensitive or negated
//! - Child, descendant, parent and ancestor scopes with depth limits
//! - Nested sub-queries and proximity conditions
//! - Skip/take pagination applied after filtering
//!
//! Queries are built either with the fluent [`Query`] builder or parsed from
//! CPath text with [`parse_cpath`], and run by a [`SearchEngine`].

pub mod ast;
pub mod condition;
pub mod engine;
pub mod parser;
pub mod part;
pub mod property;

// Re-exports
pub use ast::*;
pub use condition::*;
pub use engine::*;
pub use parser::*;
pub use part::*;
pub use property::*;

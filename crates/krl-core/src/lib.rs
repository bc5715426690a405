//! # KRL Core
//!
//! Syntax tree and source span types for the KRL event rule language.
//!
//! - [`ast`]: rulesets, rules, event expressions, actions, statements and
//!   expressions
//! - [`span`]: byte ranges used for diagnostics and source mapping
//!
//! The tree is plain owned data. It derives `serde` traits so tools can dump
//! it as JSON; parsing lives in `krl_parser`.

pub mod ast;
pub mod span;

pub use ast::*;
pub use span::{Span, Spanned};

//! KRL parser
//!
//! This crate turns KRL source text into the located syntax tree defined in
//! `krl-core`, or rejects it with a diagnostic.
//!
//! - `lexer`: logos tokenizer with string, regex and chevron modes
//! - `engine`: Earley chart parser over the grammar table in `grammar`
//! - `resolver`: accepts exactly one derivation
//! - `diagnostic`: line/column lookup and message rendering
//!
//! ```
//! let program = krl_parser::parse("ruleset hello { }").unwrap();
//! assert_eq!(program.as_ruleset().unwrap().rid.value, "hello");
//! ```

pub mod diagnostic;
mod engine;
pub mod error;
mod grammar;
pub mod lexer;
pub mod options;
pub mod resolver;

pub use error::{Location, ParseError, ParseResult};
pub use lexer::{tokenize, SpannedToken, Token};
pub use options::ParseOptions;

use engine::Input;
use grammar::{Nt, GRAMMAR};
use krl_core::{Expr, Program};
use tracing::debug;

/// Parse a ruleset or a statement list.
pub fn parse(source: &str) -> ParseResult<Program> {
    parse_with_options(source, &ParseOptions::default())
}

/// Parse with options. Lex and syntax errors carry a rendered message and a
/// [`Location`] naming `options.filename`.
pub fn parse_with_options(source: &str, options: &ParseOptions) -> ParseResult<Program> {
    debug!(len = source.len(), filename = ?options.filename, "parsing");
    run(Nt::Main, source)
        .and_then(grammar::value::Value::into_program)
        .map_err(|err| diagnostic::locate(err, source, options.filename.as_deref()))
}

/// Parse a single expression.
pub fn parse_expression(source: &str) -> ParseResult<Expr> {
    run(Nt::Expression, source)
        .and_then(grammar::value::Value::into_expr)
        .map_err(|err| diagnostic::locate(err, source, None))
}

fn run(start: Nt, source: &str) -> ParseResult<grammar::value::Value> {
    let tokens = tokenize(source)?;
    engine::run(&GRAMMAR, start, Input::new(tokens, source.len(), None))
}

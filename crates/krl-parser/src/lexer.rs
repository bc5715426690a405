//! Lexer for KRL using Logos
//!
//! Plain code is matched by the derived automaton. Literals with their own
//! lexical rules (strings, `re#..#` regexes, `<<..>>` chevrons, block
//! comments) are scanned by callbacks that take over the remainder of the
//! input. Chevron interpolations `#{ ... }` run a nested [`Lexer`] whose
//! offsets are absolute, so every token span points into the original
//! source no matter how deep the nesting goes.

use crate::error::{LexError, LexErrorKind, ParseError, ParseResult};
use krl_core::Span;
use logos::Logos;
use std::fmt;
use tracing::trace;

/// `domain:name`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DomainName {
    pub domain: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegexLiteral {
    pub pattern: String,
    pub flags: String,
}

/// One piece of a chevron body
#[derive(Debug, Clone, PartialEq)]
pub enum ChevronPart {
    /// Literal text with chevron escapes resolved; `start..end` is the raw text
    Text {
        value: String,
        start: usize,
        end: usize,
    },
    /// `#{ ... }`: tokens between the braces; `close` is the offset of `}`
    Interpolation {
        tokens: Vec<SpannedToken>,
        start: usize,
        close: usize,
    },
}

/// Token type for KRL
#[derive(Logos, Debug, Clone, PartialEq)]
#[logos(extras = usize)]
#[logos(error = LexError)]
pub enum Token {
    // === Trivia ===
    #[regex(r"[ \t\r\n\f]+")]
    Whitespace,
    #[regex(r"//[^\n]*")]
    LineComment,
    #[token("/*", block_comment)]
    BlockComment,

    // === Literals ===
    #[regex(r"[0-9]+(\.[0-9]+)?", parse_number)]
    #[regex(r"\.[0-9]+", parse_number)]
    Number(f64),
    #[token("\"", string_literal)]
    Str(String),
    #[token("re#", regex_literal)]
    RegExp(RegexLiteral),
    #[token("<<", chevron_literal)]
    Chevron(Vec<ChevronPart>),

    // === Names ===
    /// Identifiers and keywords alike; the grammar decides which words are
    /// reserved where
    #[regex(r"[A-Za-z_$][A-Za-z0-9_$]*", |lex| lex.slice().to_string())]
    Symbol(String),
    #[regex(r"[A-Za-z_$][A-Za-z0-9_$]*:[A-Za-z_$][A-Za-z0-9_$]*", domain_name)]
    DomainIdent(DomainName),

    // === Delimiters ===
    #[token("(")]
    LParen,
    #[token(")")]
    RParen,
    #[token("[")]
    LBracket,
    #[token("]")]
    RBracket,
    #[token("{")]
    LBrace,
    #[token("}")]
    RBrace,
    #[token(",")]
    Comma,
    #[token(";")]
    Semicolon,
    #[token(":")]
    Colon,
    #[token(".")]
    Dot,

    // === Operators ===
    #[token(":=")]
    ColonEq,
    #[token("=")]
    Eq,
    #[token("=>")]
    FatArrow,
    #[token("|")]
    Pipe,
    #[token("+")]
    Plus,
    #[token("-")]
    Minus,
    #[token("*")]
    Star,
    #[token("/")]
    Slash,
    #[token("%")]
    Percent,
    #[token("==")]
    EqEq,
    #[token("!=")]
    NotEq,
    #[token("<")]
    Lt,
    #[token(">")]
    Gt,
    #[token("<=")]
    Le,
    #[token(">=")]
    Ge,
    #[token("<=>")]
    Spaceship,
    #[token("><")]
    Contains,
    #[token("&&")]
    AndAnd,
    #[token("||")]
    OrOr,
}

impl Token {
    /// Whitespace and comments, dropped before parsing
    pub fn is_trivia(&self) -> bool {
        matches!(
            self,
            Token::Whitespace | Token::LineComment | Token::BlockComment
        )
    }

    /// Source text of punctuation and operator tokens
    pub fn punct(&self) -> Option<&'static str> {
        Some(match self {
            Token::LParen => "(",
            Token::RParen => ")",
            Token::LBracket => "[",
            Token::RBracket => "]",
            Token::LBrace => "{",
            Token::RBrace => "}",
            Token::Comma => ",",
            Token::Semicolon => ";",
            Token::Colon => ":",
            Token::Dot => ".",
            Token::ColonEq => ":=",
            Token::Eq => "=",
            Token::FatArrow => "=>",
            Token::Pipe => "|",
            Token::Plus => "+",
            Token::Minus => "-",
            Token::Star => "*",
            Token::Slash => "/",
            Token::Percent => "%",
            Token::EqEq => "==",
            Token::NotEq => "!=",
            Token::Lt => "<",
            Token::Gt => ">",
            Token::Le => "<=",
            Token::Ge => ">=",
            Token::Spaceship => "<=>",
            Token::Contains => "><",
            Token::AndAnd => "&&",
            Token::OrOr => "||",
            _ => return None,
        })
    }

    pub fn symbol(&self) -> Option<&str> {
        match self {
            Token::Symbol(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(p) = self.punct() {
            return write!(f, "{}", p);
        }
        match self {
            Token::Whitespace => write!(f, "whitespace"),
            Token::LineComment | Token::BlockComment => write!(f, "comment"),
            Token::Number(n) => write!(f, "{}", n),
            Token::Str(s) => write!(f, "\"{}\"", s),
            Token::RegExp(re) => write!(f, "re#{}#{}", re.pattern, re.flags),
            Token::Chevron(_) => write!(f, "<<...>>"),
            Token::Symbol(s) => write!(f, "{}", s),
            Token::DomainIdent(d) => write!(f, "{}:{}", d.domain, d.name),
            _ => write!(f, "?"),
        }
    }
}

/// Spanned token with absolute byte offsets
#[derive(Debug, Clone, PartialEq)]
pub struct SpannedToken {
    pub token: Token,
    pub start: usize,
    pub end: usize,
}

impl SpannedToken {
    pub fn span(&self) -> Span {
        Span::new(self.start, self.end)
    }
}

/// Lexer wrapper that produces spanned tokens with absolute offsets
pub struct Lexer<'source> {
    inner: logos::Lexer<'source, Token>,
}

impl<'source> Lexer<'source> {
    pub fn new(source: &'source str) -> Self {
        Self::with_offset(source, 0)
    }

    /// Lex `source`, which starts at byte `base` of the enclosing input.
    pub fn with_offset(source: &'source str, base: usize) -> Self {
        Self {
            inner: Token::lexer_with_extras(source, base),
        }
    }

    fn base(&self) -> usize {
        self.inner.extras
    }
}

impl<'source> Iterator for Lexer<'source> {
    type Item = Result<SpannedToken, LexError>;

    fn next(&mut self) -> Option<Self::Item> {
        let result = self.inner.next()?;
        let span = self.inner.span();
        let (start, end) = (self.base() + span.start, self.base() + span.end);
        Some(match result {
            Ok(token) => Ok(SpannedToken { token, start, end }),
            Err(err) => Err(LexError {
                kind: err.kind,
                offset: Some(err.offset.unwrap_or(start)),
            }),
        })
    }
}

/// Tokenize a source string, trivia included
pub fn tokenize(source: &str) -> ParseResult<Vec<SpannedToken>> {
    let tokens = Lexer::new(source)
        .collect::<Result<Vec<_>, _>>()
        .map_err(|err| ParseError::lex(err.kind, err.offset.unwrap_or(0)))?;
    trace!(count = tokens.len(), "tokenized");
    Ok(tokens)
}

// ----------------------------------------------------------------------------
// Callbacks
// ----------------------------------------------------------------------------

/// Absolute offset where the current token starts
fn token_start(lex: &logos::Lexer<Token>) -> usize {
    lex.extras + lex.span().start
}

fn parse_number(lex: &mut logos::Lexer<Token>) -> Option<f64> {
    lex.slice().parse().ok()
}

fn domain_name(lex: &mut logos::Lexer<Token>) -> Option<DomainName> {
    let (domain, name) = lex.slice().split_once(':')?;
    Some(DomainName {
        domain: domain.to_string(),
        name: name.to_string(),
    })
}

fn block_comment(lex: &mut logos::Lexer<Token>) -> Result<(), LexError> {
    match lex.remainder().find("*/") {
        Some(end) => {
            lex.bump(end + 2);
            Ok(())
        }
        None => Err(LexError::new(
            LexErrorKind::UnterminatedComment,
            token_start(lex),
        )),
    }
}

/// `"..."`: only `\"` and `\\` are escapes, any other backslash is kept.
fn string_literal(lex: &mut logos::Lexer<Token>) -> Result<String, LexError> {
    let mut value = String::new();
    let mut chars = lex.remainder().char_indices();
    while let Some((i, c)) = chars.next() {
        match c {
            '"' => {
                lex.bump(i + 1);
                return Ok(value);
            }
            '\\' => match chars.next() {
                Some((_, '"')) => value.push('"'),
                Some((_, '\\')) => value.push('\\'),
                Some((_, other)) => {
                    value.push('\\');
                    value.push(other);
                }
                None => break,
            },
            _ => value.push(c),
        }
    }
    Err(LexError::new(
        LexErrorKind::UnterminatedString,
        token_start(lex),
    ))
}

/// `re#...#flags`: `\#` is an escaped delimiter, `\\` stays in the pattern
/// so the regex still matches one backslash; flags are trailing letters.
fn regex_literal(lex: &mut logos::Lexer<Token>) -> Result<RegexLiteral, LexError> {
    let rest = lex.remainder();
    let mut pattern = String::new();
    let mut chars = rest.char_indices();
    let mut close = None;
    while let Some((i, c)) = chars.next() {
        match c {
            '#' => {
                close = Some(i);
                break;
            }
            '\\' => match chars.next() {
                Some((_, '#')) => pattern.push('#'),
                Some((_, other)) => {
                    pattern.push('\\');
                    pattern.push(other);
                }
                None => break,
            },
            _ => pattern.push(c),
        }
    }
    let Some(close) = close else {
        return Err(LexError::new(
            LexErrorKind::UnterminatedRegExp,
            token_start(lex),
        ));
    };
    let flags: String = rest[close + 1..]
        .chars()
        .take_while(|c| c.is_ascii_alphabetic())
        .collect();
    lex.bump(close + 1 + flags.len());
    Ok(RegexLiteral { pattern, flags })
}

/// `<<...>>` with `#{ expr }` interpolations. Escapes: `\>`, `\<`, `\\`
/// and `\#{`; other backslashes are kept.
fn chevron_literal(lex: &mut logos::Lexer<Token>) -> Result<Vec<ChevronPart>, LexError> {
    let open = token_start(lex);
    let base = lex.extras + lex.span().end;
    let rest = lex.remainder();

    let mut parts = Vec::new();
    let mut text = String::new();
    let mut text_start = 0;
    let mut i = 0;

    let flush = |parts: &mut Vec<ChevronPart>, text: &mut String, from: usize, to: usize| {
        if !text.is_empty() {
            parts.push(ChevronPart::Text {
                value: std::mem::take(text),
                start: base + from,
                end: base + to,
            });
        }
    };

    while i < rest.len() {
        let here = &rest[i..];
        if here.starts_with(">>") {
            flush(&mut parts, &mut text, text_start, i);
            lex.bump(i + 2);
            return Ok(parts);
        }
        if here.starts_with("#{") {
            flush(&mut parts, &mut text, text_start, i);
            let (tokens, close) = interpolation(&rest[i + 2..], base + i + 2, base + i)?;
            parts.push(ChevronPart::Interpolation {
                tokens,
                start: base + i,
                close,
            });
            i = close - base + 1;
            text_start = i;
            continue;
        }
        if let Some(escaped) = here.strip_prefix('\\') {
            if escaped.starts_with("#{") {
                text.push_str("#{");
                i += 3;
                continue;
            }
            if let Some(c @ ('>' | '<' | '\\')) = escaped.chars().next() {
                text.push(c);
                i += 2;
                continue;
            }
        }
        if let Some(c) = here.chars().next() {
            text.push(c);
            i += c.len_utf8();
        }
    }
    Err(LexError::new(LexErrorKind::UnterminatedChevron, open))
}

/// Lex the body of `#{ ... }` up to the matching `}`. Returns the tokens and
/// the absolute offset of the closing brace.
fn interpolation(
    source: &str,
    base: usize,
    open: usize,
) -> Result<(Vec<SpannedToken>, usize), LexError> {
    let mut tokens = Vec::new();
    let mut depth = 0usize;
    for result in Lexer::with_offset(source, base) {
        let tok = result?;
        match tok.token {
            Token::RBrace if depth == 0 => return Ok((tokens, tok.start)),
            Token::RBrace => depth -= 1,
            Token::LBrace => depth += 1,
            _ => {}
        }
        tokens.push(tok);
    }
    Err(LexError::new(
        LexErrorKind::UnterminatedInterpolation,
        open,
    ))
}

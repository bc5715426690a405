//! Rendering parse failures for humans
//!
//! A located error message looks like
//!
//! ```text
//! No possible parsings
//! select-blah.krl:4:12
//!
//!     select blah
//!            ^
//! ```

use crate::error::{Location, ParseError};

/// Context lines kept in the structured [`Location::excerpt`]
const LOCATION_CONTEXT: usize = 3;

/// 1-based line and column of a byte offset. Columns count characters.
/// Returns `None` when the offset is past the end or inside a character.
pub fn line_column(source: &str, offset: usize) -> Option<(usize, usize)> {
    let before = source.get(..offset)?;
    let line = before.matches('\n').count() + 1;
    let line_start = before.rfind('\n').map(|i| i + 1).unwrap_or(0);
    let col = before[line_start..].chars().count() + 1;
    Some((line, col))
}

/// The line at `line` with `context` lines on each side and a caret line
/// under `col` directly after the target line.
pub fn excerpt(source: &str, line: usize, col: usize, context: usize) -> String {
    let lines: Vec<&str> = source
        .split('\n')
        .map(|l| l.strip_suffix('\r').unwrap_or(l))
        .collect();
    let target = line.saturating_sub(1).min(lines.len().saturating_sub(1));
    let first = target.saturating_sub(context);
    let last = (target + context).min(lines.len().saturating_sub(1));

    let mut out: Vec<String> = Vec::with_capacity(last - first + 2);
    for l in &lines[first..=target] {
        out.push((*l).to_string());
    }
    out.push(format!("{}^", " ".repeat(col.saturating_sub(1))));
    for l in &lines[target + 1..=last] {
        out.push((*l).to_string());
    }
    out.join("\n")
}

/// Strip framework noise from a raw message: leading `Error:` prefixes,
/// `(@...)` position annotations and trailing periods.
pub fn clean_message(raw: &str) -> String {
    let mut msg = raw.trim();
    for prefix in ["Error:", "error:"] {
        while let Some(rest) = msg.strip_prefix(prefix) {
            msg = rest.trim_start();
        }
    }

    let mut cleaned = String::with_capacity(msg.len());
    let mut rest = msg;
    while let Some(open) = rest.find("(@") {
        cleaned.push_str(&rest[..open]);
        // The annotation may quote a `)` token, so it ends at the last paren.
        match rest[open..].rfind(')') {
            Some(close) => rest = &rest[open + close + 1..],
            None => {
                rest = "";
            }
        }
    }
    cleaned.push_str(rest);

    cleaned
        .trim()
        .trim_end_matches(['.', '!'])
        .trim_end()
        .to_string()
}

/// Attach a rendered message and structured location to a lex or syntax
/// error. Errors without a mappable offset are returned unchanged.
pub fn locate(err: ParseError, source: &str, filename: Option<&str>) -> ParseError {
    let Some((line, col)) = err.offset().and_then(|at| line_column(source, at)) else {
        return err;
    };
    let render = |raw: &str| {
        format!(
            "{}\n{}:{}:{}\n \n{}",
            clean_message(raw),
            filename.unwrap_or(""),
            line,
            col,
            excerpt(source, line, col, 0)
        )
    };
    let location = Location {
        filename: filename.map(str::to_string),
        line,
        col,
        excerpt: excerpt(source, line, col, LOCATION_CONTEXT),
    };
    match err {
        ParseError::Lex {
            kind,
            offset,
            message,
            ..
        } => ParseError::Lex {
            kind,
            offset,
            message: render(&message),
            location: Some(location),
        },
        ParseError::Syntax {
            offset, message, ..
        } => ParseError::Syntax {
            offset,
            message: render(&message),
            location: Some(location),
        },
        other => other,
    }
}

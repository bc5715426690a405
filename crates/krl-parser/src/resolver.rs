//! Picking the one derivation a program must have
//!
//! The grammar is meant to give every legal program exactly one parse.
//! Anything else is reported rather than resolved by preference.

use crate::error::{ParseError, ParseResult};
use tracing::warn;

/// Accept exactly one derivation.
///
/// Zero derivations is a syntax error. Two or more means the grammar itself
/// is ambiguous for this input, which is reported with the count.
pub fn resolve(derivations: u64) -> ParseResult<()> {
    match derivations {
        0 => Err(ParseError::no_parse(None, None)),
        1 => Ok(()),
        count => {
            warn!(count, "ambiguous parse");
            Err(ParseError::Ambiguity { count })
        }
    }
}

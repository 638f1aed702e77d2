//! Parse failure types shared across the crate.

use thiserror::Error;

/// Failures surfaced while consuming an OBJ stream.
///
/// Parsing is a pure transformation: any of these aborts the current parse
/// and is reported to the caller synchronously.
#[derive(Debug, Error)]
pub enum ParseError {
    /// A token that must be numeric could not be converted.
    #[error("'{directive}' directive carries a malformed number '{token}'")]
    Number {
        directive: &'static str,
        token: String,
    },

    /// A directive is missing a required argument.
    #[error("'{directive}' directive is missing an argument")]
    MissingArgument { directive: &'static str },

    /// A face index dereferences outside the current segment's pool.
    ///
    /// The local offset is relative to the segment start; a negative value
    /// means the index points at an element of an earlier segment (e.g. a
    /// relative reference, which this parser does not support).
    #[error(
        "face index {index} resolves outside the current segment \
         (local offset {local}, pool length {pool_len})"
    )]
    Index {
        index: i64,
        local: i64,
        pool_len: usize,
    },
}

pub type ParseResult<T> = Result<T, ParseError>;

//! Error taxonomy.
//!
//! Only two conditions are actual errors: a frame referencing an identity
//! outside the fixed rosters (consistency fault) and a malformed frame line
//! (protocol fault). Selection exhaustion and a failed deflection search are
//! handled by documented fallbacks and never surface here.

use thiserror::Error;

/// Consistency faults against the fixed rosters. Fatal: rosters never change
/// after init and the host is assumed well-formed.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum EngineError {
    #[error("frame references unknown creature id {id}")]
    UnknownCreature { id: i32 },
    #[error("frame references unknown drone id {id} after roster freeze")]
    UnknownDrone { id: i32 },
}

/// Malformed host input, reported with the 1-based line number of the
/// offending transcript/stream line.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ParseError {
    #[error("line {line}: expected {expected}, stream ended")]
    UnexpectedEof { line: usize, expected: &'static str },
    #[error("line {line}: expected {expected} fields, found {found}")]
    FieldCount {
        line: usize,
        expected: usize,
        found: usize,
    },
    #[error("line {line}: invalid integer token `{token}`")]
    InvalidInt { line: usize, token: String },
    #[error("line {line}: unknown radar quadrant `{token}`")]
    UnknownQuadrant { line: usize, token: String },
}

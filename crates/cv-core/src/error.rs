//! Error taxonomy shared by every `cv-*` crate.
//!
//! Shape and schema violations indicate a programming error upstream and are
//! always surfaced.  The only lenient path in the workspace is non-strict
//! `PopulationStore::validate`, which resizes instead of failing.

use thiserror::Error;

use crate::AttrKind;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum PopError {
    #[error("\"{0}\" is not a declared attribute")]
    UnknownAttribute(String),

    #[error("attribute \"{0}\" is declared more than once")]
    DuplicateAttribute(String),

    #[error("length of \"{what}\" does not match ({got} vs. {expected})")]
    LengthMismatch {
        what:     String,
        expected: usize,
        got:      usize,
    },

    #[error("attribute \"{name}\" holds {actual:?} values, not {requested:?}")]
    KindMismatch {
        name:      String,
        requested: AttrKind,
        actual:    AttrKind,
    },

    #[error("layer integrity violated in column \"{column}\": {detail}")]
    LayerIntegrity { column: String, detail: String },

    #[error("column \"{0}\" is not declared by the edge schema")]
    ColumnMismatch(String),

    #[error("cannot read contacts: {0}")]
    UnsupportedContactFormat(String),

    #[error("layer \"{0}\" not found")]
    LayerNotFound(String),

    #[error("schema mismatch: {0}")]
    SchemaMismatch(String),

    #[error("index {index} is outside [0, {len})")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("population store failed strict validation and must be corrected first")]
    InvalidState,

    #[error("configuration error: {0}")]
    Config(String),
}

/// Shorthand result type for all `cv-*` crates.
pub type PopResult<T> = Result<T, PopError>;

/// `Ok(())` if `index < len`, else [`PopError::IndexOutOfRange`].
#[inline]
pub fn check_index(index: usize, len: usize) -> PopResult<()> {
    if index < len {
        Ok(())
    } else {
        Err(PopError::IndexOutOfRange { index, len })
    }
}

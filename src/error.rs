//! Error type for fallible map operations.
//!
//! Lookups that have a natural "absent" answer return `Option`; the operations
//! that mirror checked accessors (`at`, cursor stepping, erase by cursor) return
//! [`Result`] so callers can propagate failures with `?`.

use thiserror::Error;

/// Errors returned by checked map operations.
///
/// A failed operation never leaves the map partially modified.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Error {
    /// No key equivalent to the requested one is stored in the map.
    #[error("no entry found for key")]
    NotFound,

    /// The cursor cannot be used for the requested operation.
    ///
    /// This is returned when:
    /// - the cursor belongs to another map;
    /// - the entry it referred to has since been removed (even if its storage was reused);
    /// - it is the end cursor and the operation needs an element, or needs a successor;
    /// - it is the begin cursor and the operation needs a predecessor.
    #[error("invalid cursor")]
    InvalidCursor,
}

/// A specialized [`Result`](core::result::Result) type for map operations.
pub type Result<T> = core::result::Result<T, Error>;

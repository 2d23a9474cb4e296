//! Errors signalled by the list and the table.

use thiserror::Error;

/// Result type alias for list and table operations.
pub type Result<T> = std::result::Result<T, Error>;

/// The two failures the containers report. Everything else that can be
/// "missing" (popping an empty list, looking up an absent key with `get`) is
/// reported through `Option` instead.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// Positional access outside `[0, len)`.
    #[error("list index {index} is out of range for a list of length {len}")]
    IndexOutOfRange { index: usize, len: usize },

    /// Checked access to a key that isn't in the table.
    #[error(
        "key (\"{0}\") not found, use .get() if you are not sure the record exists"
    )]
    KeyNotFound(String),
}

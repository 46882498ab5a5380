use std::path::PathBuf;

/// Reason a [`crate::Person`] could not be constructed.
///
/// Exactly one variant is reported per failed construction: the first rule
/// that fails in the validation chain.
#[derive(Debug, Clone, Copy, thiserror::Error, Eq, PartialEq, Hash)]
pub enum ValidationError {
    #[error("first name empty")]
    EmptyFirstName,
    #[error("last name empty")]
    EmptyLastName,
    #[error("first name too short")]
    FirstNameTooShort,
    #[error("last name too short")]
    LastNameTooShort,
    #[error("invalid state")]
    InvalidState,
    #[error("invalid zip")]
    InvalidZip,
    #[error("invalid phone")]
    InvalidPhone,
}

#[derive(Debug, Clone, Copy, thiserror::Error, Eq, PartialEq)]
pub enum IndexError {
    #[error("row index {index} out of bounds for address book with {len} entries")]
    Row { index: usize, len: usize },
    #[error("field number out of bounds: {field}")]
    Field { field: usize },
}

#[derive(Debug, Clone, thiserror::Error, Eq, PartialEq)]
pub enum LoadError {
    #[error("address book file not found or unreadable: {}", path.display())]
    NotFound { path: PathBuf },
    #[error("not a valid address book file {}: {reason}", path.display())]
    Format {
        path: PathBuf,
        reason: String,
    },
}

impl LoadError {
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    #[must_use]
    pub fn is_format(&self) -> bool {
        matches!(self, Self::Format { .. })
    }
}

#[derive(Debug, Clone, thiserror::Error, Eq, PartialEq)]
#[error("failed to save address book to {}: {reason}", path.display())]
pub struct PersistError {
    pub path: PathBuf,
    pub reason: String,
}

use std::path::Path;

use crate::book::AddressBook;
use crate::error::{LoadError, PersistError};

/// Storage backend that can fill an [`AddressBook`] from a file and write one back.
///
/// Implementations must leave `book` untouched when `load` fails and must not
/// reorder persons in either direction.
pub trait BookRepository {
    /// Replace the contents of `book` with the persons stored at `source`.
    ///
    /// # Errors
    /// Returns [`LoadError::NotFound`] when `source` is missing or unreadable and
    /// [`LoadError::Format`] when it is not a valid address book file.
    fn load(&self, book: &mut AddressBook, source: &Path) -> Result<(), LoadError>;

    /// Replace the contents of `destination` with the persons in `book`.
    ///
    /// # Errors
    /// Returns [`PersistError`] when `destination` cannot be created or written.
    fn save(&self, book: &AddressBook, destination: &Path) -> Result<(), PersistError>;
}

impl<R: BookRepository + ?Sized> BookRepository for &R {
    fn load(&self, book: &mut AddressBook, source: &Path) -> Result<(), LoadError> {
        (**self).load(book, source)
    }

    fn save(&self, book: &AddressBook, destination: &Path) -> Result<(), PersistError> {
        (**self).save(book, destination)
    }
}

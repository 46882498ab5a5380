use std::path::Path;

use crate::book::AddressBook;
use crate::error::{IndexError, LoadError, PersistError};
use crate::person::Person;
use crate::repository::BookRepository;

/// Front door for a UI: forwards edits to the book and open/save to the repository.
#[derive(Debug)]
pub struct AddressBookController<R> {
    book: AddressBook,
    repository: R,
}

impl<R: BookRepository> AddressBookController<R> {
    #[must_use]
    pub fn new(repository: R) -> Self {
        Self::with_book(AddressBook::new(), repository)
    }

    #[must_use]
    pub fn with_book(book: AddressBook, repository: R) -> Self {
        Self { book, repository }
    }

    #[must_use]
    pub fn book(&self) -> &AddressBook {
        &self.book
    }

    pub fn book_mut(&mut self) -> &mut AddressBook {
        &mut self.book
    }

    #[must_use]
    pub fn repository(&self) -> &R {
        &self.repository
    }

    pub fn add(&mut self, person: Person) {
        self.book.add(person);
    }

    /// # Errors
    /// Returns [`IndexError::Row`] when `index` is out of range.
    pub fn set(&mut self, index: usize, person: Person) -> Result<(), IndexError> {
        self.book.set(index, person)
    }

    /// # Errors
    /// Returns [`IndexError::Row`] when `index` is out of range.
    pub fn remove(&mut self, index: usize) -> Result<Person, IndexError> {
        self.book.remove(index)
    }

    /// # Errors
    /// Returns [`IndexError::Row`] when `index` is out of range.
    pub fn get(&self, index: usize) -> Result<&Person, IndexError> {
        self.book.get(index)
    }

    pub fn clear(&mut self) {
        self.book.clear();
    }

    /// Load `source` into the book and tell listeners the whole table changed.
    ///
    /// # Errors
    /// Propagates the repository's [`LoadError`]; the book is unchanged on error.
    pub fn open(&mut self, source: &Path) -> Result<(), LoadError> {
        self.repository.load(&mut self.book, source)?;
        self.book.notify_reloaded();
        Ok(())
    }

    /// # Errors
    /// Propagates the repository's [`PersistError`].
    pub fn save(&self, destination: &Path) -> Result<(), PersistError> {
        self.repository.save(&self.book, destination)
    }
}

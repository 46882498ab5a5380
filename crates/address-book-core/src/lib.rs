//! Contact records, the observable address book that holds them, and the
//! controller that binds the book to a storage backend.

mod book;
mod controller;
mod error;
mod person;
mod repository;

pub use book::{
    column_index, AddressBook, BookEvent, BookListener, EventLog, ListenerId, SortOrder,
};
pub use controller::AddressBookController;
pub use error::{IndexError, LoadError, PersistError, ValidationError};
pub use person::{FieldRule, Person, COLUMN_NAMES, FIELD_COUNT};
pub use repository::BookRepository;

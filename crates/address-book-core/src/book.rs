use std::cell::RefCell;
use std::rc::Rc;

use serde::Serialize;

use crate::error::IndexError;
use crate::person::{Person, COLUMN_NAMES, FIELD_COUNT};

/// Change notification emitted by [`AddressBook`] after every mutation.
///
/// Row ranges are inclusive, matching what a table view needs to repaint.
#[derive(Debug, Clone, Copy, Serialize, Eq, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BookEvent {
    Inserted {
        first: usize,
        last: usize,
    },
    Updated {
        first: usize,
        last: usize,
    },
    Deleted {
        first: usize,
        last: usize,
    },
    /// Every row may have changed; views should re-read the whole table.
    Reloaded,
}

impl BookEvent {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Inserted { .. } => "inserted",
            Self::Updated { .. } => "updated",
            Self::Deleted { .. } => "deleted",
            Self::Reloaded => "reloaded",
        }
    }
}

pub trait BookListener {
    fn book_changed(&mut self, event: &BookEvent);
}

impl<F> BookListener for F
where
    F: FnMut(&BookEvent),
{
    fn book_changed(&mut self, event: &BookEvent) {
        self(event);
    }
}

/// Shared recorder of every event it receives. Clones observe the same log.
#[derive(Debug, Clone, Default)]
pub struct EventLog {
    events: Rc<RefCell<Vec<BookEvent>>>,
}

impl EventLog {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn events(&self) -> Vec<BookEvent> {
        self.events.borrow().clone()
    }

    /// Return the recorded events and start a fresh log.
    pub fn drain(&self) -> Vec<BookEvent> {
        std::mem::take(&mut *self.events.borrow_mut())
    }
}

impl BookListener for EventLog {
    fn book_changed(&mut self, event: &BookEvent) {
        self.events.borrow_mut().push(*event);
    }
}

#[derive(Debug, Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct ListenerId(u64);

#[derive(Debug, Clone, Copy, Eq, PartialEq, Default)]
pub enum SortOrder {
    #[default]
    Ascending,
    Descending,
}

/// Ordered, observable collection of [`Person`] values backing the contact table.
#[derive(Default)]
pub struct AddressBook {
    persons: Vec<Person>,
    listeners: Vec<(ListenerId, Box<dyn BookListener>)>,
    next_listener: u64,
}

impl std::fmt::Debug for AddressBook {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AddressBook")
            .field("persons", &self.persons)
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

impl AddressBook {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&mut self, listener: impl BookListener + 'static) -> ListenerId {
        let id = ListenerId(self.next_listener);
        self.next_listener += 1;
        self.listeners.push((id, Box::new(listener)));
        id
    }

    /// Returns `false` when `id` was not subscribed.
    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(existing, _)| *existing != id);
        self.listeners.len() != before
    }

    fn notify(&mut self, event: BookEvent) {
        for (_, listener) in &mut self.listeners {
            listener.book_changed(&event);
        }
    }

    fn row_error(&self, index: usize) -> IndexError {
        IndexError::Row {
            index,
            len: self.persons.len(),
        }
    }

    fn check_row(&self, index: usize) -> Result<(), IndexError> {
        if index < self.persons.len() {
            Ok(())
        } else {
            Err(self.row_error(index))
        }
    }

    pub fn add(&mut self, person: Person) {
        let index = self.persons.len();
        self.persons.push(person);
        self.notify(BookEvent::Inserted {
            first: index,
            last: index,
        });
    }

    /// Replace the person at `index`.
    ///
    /// # Errors
    /// Returns [`IndexError::Row`] when `index` is not below [`Self::len`].
    pub fn set(&mut self, index: usize, person: Person) -> Result<(), IndexError> {
        self.check_row(index)?;
        self.persons[index] = person;
        self.notify(BookEvent::Updated {
            first: index,
            last: index,
        });
        Ok(())
    }

    /// Remove and return the person at `index`, shifting later rows down.
    ///
    /// # Errors
    /// Returns [`IndexError::Row`] when `index` is not below [`Self::len`].
    pub fn remove(&mut self, index: usize) -> Result<Person, IndexError> {
        self.check_row(index)?;
        let removed = self.persons.remove(index);
        self.notify(BookEvent::Deleted {
            first: index,
            last: index,
        });
        Ok(removed)
    }

    /// # Errors
    /// Returns [`IndexError::Row`] when `index` is not below [`Self::len`].
    pub fn get(&self, index: usize) -> Result<&Person, IndexError> {
        match self.persons.get(index) {
            Some(person) => Ok(person),
            None => Err(self.row_error(index)),
        }
    }

    pub fn clear(&mut self) {
        if self.persons.is_empty() {
            return;
        }

        let last = self.persons.len() - 1;
        self.persons.clear();
        self.notify(BookEvent::Deleted { first: 0, last });
    }

    /// Clear the book, then append `persons` in order.
    pub fn replace_all(&mut self, persons: impl IntoIterator<Item = Person>) {
        self.clear();
        for person in persons {
            self.add(person);
        }
    }

    pub fn notify_reloaded(&mut self) {
        self.notify(BookEvent::Reloaded);
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.persons.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.persons.is_empty()
    }

    #[must_use]
    pub fn persons(&self) -> &[Person] {
        &self.persons
    }

    #[must_use]
    pub fn column_schema(&self) -> &'static [&'static str; FIELD_COUNT] {
        &COLUMN_NAMES
    }

    #[must_use]
    pub fn column_count(&self) -> usize {
        FIELD_COUNT
    }

    #[must_use]
    pub fn column_name(&self, column: usize) -> Option<&'static str> {
        COLUMN_NAMES.get(column).copied()
    }

    /// # Errors
    /// Returns [`IndexError::Row`] or [`IndexError::Field`] for an invalid coordinate.
    pub fn cell_at(&self, row: usize, column: usize) -> Result<&str, IndexError> {
        self.get(row)?.field(column)
    }

    /// Indices of persons matching `query`, in book order.
    #[must_use]
    pub fn search(&self, query: &str) -> Vec<usize> {
        self.persons
            .iter()
            .enumerate()
            .filter(|(_, person)| person.matches_query(query))
            .map(|(index, _)| index)
            .collect()
    }

    /// Row indices ordered by the text of `column`. Ties keep book order.
    ///
    /// # Errors
    /// Returns [`IndexError::Field`] when `column` is not a valid column.
    pub fn sorted_indices(
        &self,
        column: usize,
        order: SortOrder,
    ) -> Result<Vec<usize>, IndexError> {
        if column >= FIELD_COUNT {
            return Err(IndexError::Field { field: column });
        }

        let mut keyed = self
            .persons
            .iter()
            .enumerate()
            .map(|(index, person)| {
                let key = person.fields()[column].to_lowercase();
                (key, index)
            })
            .collect::<Vec<_>>();
        keyed.sort_by(|(left, _), (right, _)| match order {
            SortOrder::Ascending => left.cmp(right),
            SortOrder::Descending => right.cmp(left),
        });
        Ok(keyed.into_iter().map(|(_, index)| index).collect())
    }
}

/// Column index for a display name or a field key, ignoring case and spacing.
#[must_use]
pub fn column_index(name: &str) -> Option<usize> {
    let wanted = normalize_column(name);
    COLUMN_NAMES
        .iter()
        .position(|column| normalize_column(column) == wanted)
}

fn normalize_column(name: &str) -> String {
    name.chars()
        .filter(char::is_ascii_alphanumeric)
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

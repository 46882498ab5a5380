use std::fmt::{Display, Formatter};

use once_cell::sync::Lazy;
use regex_lite::Regex;
use serde::Serialize;

use crate::error::{IndexError, ValidationError};

/// Number of text fields carried by every person.
pub const FIELD_COUNT: usize = 7;

/// Display names of the person fields, in table column order.
///
/// Last name comes first even though it is the second constructor argument.
pub const COLUMN_NAMES: [&str; FIELD_COUNT] = [
    "Last Name",
    "First Name",
    "Address",
    "City",
    "State",
    "ZIP",
    "Phone",
];

static NAME_PATTERN: Lazy<Option<Regex>> = Lazy::new(|| Regex::new(r"^\S{2,}$").ok());
static STATE_PATTERN: Lazy<Option<Regex>> = Lazy::new(|| Regex::new(r"^[A-Z]{2}$").ok());
static ZIP_PATTERN: Lazy<Option<Regex>> = Lazy::new(|| Regex::new(r"^[0-9]{5}$").ok());
static PHONE_PATTERN: Lazy<Option<Regex>> = Lazy::new(|| Regex::new(r"^[0-9]{10}$").ok());

fn full_match(pattern: &Lazy<Option<Regex>>, value: &str) -> bool {
    pattern.as_ref().is_some_and(|re| re.is_match(value))
}

/// One construction-time check on a single person field.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum FieldRule {
    FirstNameNotEmpty,
    LastNameNotEmpty,
    FirstNameLength,
    LastNameLength,
    StateCode,
    ZipCode,
    PhoneNumber,
}

impl FieldRule {
    /// Rules in the order they are evaluated; the first failure is reported.
    pub const CHAIN: [Self; 7] = [
        Self::FirstNameNotEmpty,
        Self::LastNameNotEmpty,
        Self::FirstNameLength,
        Self::LastNameLength,
        Self::StateCode,
        Self::ZipCode,
        Self::PhoneNumber,
    ];

    #[must_use]
    pub fn holds(self, person: &Person) -> bool {
        match self {
            Self::FirstNameNotEmpty => !person.first_name.is_empty(),
            Self::LastNameNotEmpty => !person.last_name.is_empty(),
            Self::FirstNameLength => full_match(&NAME_PATTERN, &person.first_name),
            Self::LastNameLength => full_match(&NAME_PATTERN, &person.last_name),
            Self::StateCode => full_match(&STATE_PATTERN, &person.state),
            Self::ZipCode => full_match(&ZIP_PATTERN, &person.zip),
            Self::PhoneNumber => full_match(&PHONE_PATTERN, &person.phone),
        }
    }

    #[must_use]
    pub fn violation(self) -> ValidationError {
        match self {
            Self::FirstNameNotEmpty => ValidationError::EmptyFirstName,
            Self::LastNameNotEmpty => ValidationError::EmptyLastName,
            Self::FirstNameLength => ValidationError::FirstNameTooShort,
            Self::LastNameLength => ValidationError::LastNameTooShort,
            Self::StateCode => ValidationError::InvalidState,
            Self::ZipCode => ValidationError::InvalidZip,
            Self::PhoneNumber => ValidationError::InvalidPhone,
        }
    }
}

/// A single validated contact. Immutable once constructed.
#[derive(Debug, Clone, Serialize, Eq, PartialEq, Hash)]
pub struct Person {
    first_name: String,
    last_name: String,
    address: String,
    city: String,
    state: String,
    zip: String,
    phone: String,
}

impl Person {
    /// Build a person, rejecting it if any field rule fails.
    ///
    /// # Errors
    /// Returns the [`ValidationError`] of the first failing rule in
    /// [`FieldRule::CHAIN`] order.
    pub fn new(
        first_name: impl Into<String>,
        last_name: impl Into<String>,
        address: impl Into<String>,
        city: impl Into<String>,
        state: impl Into<String>,
        zip: impl Into<String>,
        phone: impl Into<String>,
    ) -> Result<Self, ValidationError> {
        let candidate = Self {
            first_name: first_name.into(),
            last_name: last_name.into(),
            address: address.into(),
            city: city.into(),
            state: state.into(),
            zip: zip.into(),
            phone: phone.into(),
        };

        match FieldRule::CHAIN.iter().find(|rule| !rule.holds(&candidate)) {
            Some(rule) => Err(rule.violation()),
            None => Ok(candidate),
        }
    }

    #[must_use]
    pub fn first_name(&self) -> &str {
        &self.first_name
    }

    #[must_use]
    pub fn last_name(&self) -> &str {
        &self.last_name
    }

    #[must_use]
    pub fn address(&self) -> &str {
        &self.address
    }

    #[must_use]
    pub fn city(&self) -> &str {
        &self.city
    }

    #[must_use]
    pub fn state(&self) -> &str {
        &self.state
    }

    #[must_use]
    pub fn zip(&self) -> &str {
        &self.zip
    }

    #[must_use]
    pub fn phone(&self) -> &str {
        &self.phone
    }

    /// All fields in table column order (see [`COLUMN_NAMES`]).
    #[must_use]
    pub fn fields(&self) -> [&str; FIELD_COUNT] {
        [
            &self.last_name,
            &self.first_name,
            &self.address,
            &self.city,
            &self.state,
            &self.zip,
            &self.phone,
        ]
    }

    /// Field value by table column index.
    ///
    /// # Errors
    /// Returns [`IndexError::Field`] when `index` is not in `0..7`.
    pub fn field(&self, index: usize) -> Result<&str, IndexError> {
        self.fields()
            .get(index)
            .copied()
            .ok_or(IndexError::Field { field: index })
    }

    /// Case-insensitive substring search across every field.
    #[must_use]
    pub fn matches_query(&self, query: &str) -> bool {
        let needle = query.to_lowercase();
        self.fields()
            .iter()
            .any(|value| value.to_lowercase().contains(&needle))
    }

    /// `"{last_name}, {first_name}"`.
    #[must_use]
    pub fn display_name(&self) -> String {
        self.to_string()
    }
}

impl Display for Person {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}, {}", self.last_name, self.first_name)
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    fn build(fields: [&str; 7]) -> Result<Person, ValidationError> {
        let [first, last, address, city, state, zip, phone] = fields;
        Person::new(first, last, address, city, state, zip, phone)
    }

    fn fixture() -> Person {
        let person = Person::new(
            "John",
            "Doe",
            "123 Fake Street",
            "Fort Myers",
            "FL",
            "33901",
            "0123456789",
        );
        match person {
            Ok(person) => person,
            Err(err) => panic!("fixture person should be valid: {err}"),
        }
    }

    #[test]
    fn field_patterns_compile() {
        for pattern in [&NAME_PATTERN, &STATE_PATTERN, &ZIP_PATTERN, &PHONE_PATTERN] {
            assert!(pattern.is_some());
        }
    }

    #[test]
    fn getters_return_constructor_values() {
        let person = fixture();
        assert_eq!(person.first_name(), "John");
        assert_eq!(person.last_name(), "Doe");
        assert_eq!(person.address(), "123 Fake Street");
        assert_eq!(person.city(), "Fort Myers");
        assert_eq!(person.state(), "FL");
        assert_eq!(person.zip(), "33901");
        assert_eq!(person.phone(), "0123456789");
    }

    #[test]
    fn field_index_puts_last_name_first() -> Result<(), IndexError> {
        let person = fixture();
        assert_eq!(person.field(0)?, "Doe");
        assert_eq!(person.field(1)?, "John");
        assert_eq!(person.field(2)?, "123 Fake Street");
        assert_eq!(person.field(3)?, "Fort Myers");
        assert_eq!(person.field(4)?, "FL");
        assert_eq!(person.field(5)?, "33901");
        assert_eq!(person.field(6)?, "0123456789");
        Ok(())
    }

    #[test]
    fn field_index_out_of_range_is_rejected() {
        let person = fixture();
        let err = person.field(7);
        assert_eq!(err, Err(IndexError::Field { field: 7 }));
        if let Err(err) = err {
            assert_eq!(err.to_string(), "field number out of bounds: 7");
        }
    }

    #[test]
    fn display_name_is_last_comma_first() {
        let person = fixture();
        assert_eq!(person.display_name(), "Doe, John");
        assert_eq!(person.to_string(), "Doe, John");
    }

    #[test]
    fn matches_query_checks_every_field_case_insensitively() {
        let person = fixture();
        for needle in [
            "John",
            "doe",
            "123 fake street",
            "MYERS",
            "fl",
            "33901",
            "0123456789",
        ] {
            assert!(person.matches_query(needle), "expected match for {needle}");
        }
        assert!(!person.matches_query("Michael"));
        assert!(person.matches_query(""));
    }

    #[test]
    fn matches_query_treats_regex_metacharacters_literally() {
        let person = fixture();
        assert!(!person.matches_query(".*"));
        assert!(!person.matches_query("J[o]hn"));
    }

    #[test]
    fn jane_doe_search_example() -> Result<(), ValidationError> {
        let person = Person::new(
            "Jane",
            "Doe",
            "1 Main St",
            "Tampa",
            "FL",
            "12345",
            "1234567890",
        )?;
        assert!(person.matches_query("jan"));
        assert!(!person.matches_query("xyz"));
        Ok(())
    }

    #[test]
    fn each_single_violation_reports_its_own_error() {
        let valid = [
            "Jane",
            "Doe",
            "1 Main St",
            "Tampa",
            "FL",
            "12345",
            "1234567890",
        ];
        let cases: [(usize, &str, ValidationError); 12] = [
            (0, "", ValidationError::EmptyFirstName),
            (1, "", ValidationError::EmptyLastName),
            (0, "A", ValidationError::FirstNameTooShort),
            (0, "Mary Ann", ValidationError::FirstNameTooShort),
            (1, "D", ValidationError::LastNameTooShort),
            (1, " Do", ValidationError::LastNameTooShort),
            (4, "ny", ValidationError::InvalidState),
            (4, "NYC", ValidationError::InvalidState),
            (5, "1234", ValidationError::InvalidZip),
            (5, "1234a", ValidationError::InvalidZip),
            (6, "12345678901", ValidationError::InvalidPhone),
            (6, "123-456-78", ValidationError::InvalidPhone),
        ];

        for (slot, value, expected) in cases {
            let mut fields = valid;
            fields[slot] = value;
            assert_eq!(build(fields), Err(expected), "slot {slot} value {value:?}");
        }
    }

    #[test]
    fn first_failure_in_chain_wins() {
        assert_eq!(
            build(["", "", "", "", "", "", ""]),
            Err(ValidationError::EmptyFirstName)
        );
        assert_eq!(
            build(["J", "", "", "", "", "", ""]),
            Err(ValidationError::EmptyLastName)
        );
        assert_eq!(
            build(["J", "D", "", "", "fl", "1", "2"]),
            Err(ValidationError::FirstNameTooShort)
        );
        assert_eq!(
            build(["Jo", "Do", "", "", "fl", "1", "2"]),
            Err(ValidationError::InvalidState)
        );
        assert_eq!(
            build(["Jo", "Do", "", "", "FL", "1", "2"]),
            Err(ValidationError::InvalidZip)
        );
    }

    #[test]
    fn address_and_city_are_unconstrained() {
        let person = build(["Jo", "Do", "", "", "FL", "12345", "1234567890"]);
        assert!(person.is_ok());
    }

    #[test]
    fn validation_messages_are_stable() {
        let messages = [
            (ValidationError::EmptyFirstName, "first name empty"),
            (ValidationError::EmptyLastName, "last name empty"),
            (ValidationError::FirstNameTooShort, "first name too short"),
            (ValidationError::LastNameTooShort, "last name too short"),
            (ValidationError::InvalidState, "invalid state"),
            (ValidationError::InvalidZip, "invalid zip"),
            (ValidationError::InvalidPhone, "invalid phone"),
        ];
        for (error, message) in messages {
            assert_eq!(error.to_string(), message);
        }
    }

    #[test]
    fn serializes_with_snake_case_field_names() -> Result<(), serde_json::Error> {
        let value = serde_json::to_value(fixture())?;
        assert_eq!(value["first_name"], "John");
        assert_eq!(value["last_name"], "Doe");
        assert_eq!(value["phone"], "0123456789");
        Ok(())
    }

    proptest! {
        #[test]
        fn property_valid_tuples_round_trip_through_field_index(
            first in "[A-Za-z0-9]{2,12}",
            last in "[A-Za-z0-9'-]{2,12}",
            address in "[ -~]{0,24}",
            city in "[ -~]{0,16}",
            state in "[A-Z]{2}",
            zip in "[0-9]{5}",
            phone in "[0-9]{10}",
        ) {
            let person = Person::new(
                first.clone(), last.clone(), address.clone(), city.clone(),
                state.clone(), zip.clone(), phone.clone(),
            );
            prop_assert!(person.is_ok());
            if let Ok(person) = person {
                let expected = [&last, &first, &address, &city, &state, &zip, &phone];
                for (index, value) in expected.iter().enumerate() {
                    prop_assert_eq!(person.field(index), Ok(value.as_str()));
                }
                prop_assert_eq!(person.display_name(), format!("{last}, {first}"));
            }
        }

        #[test]
        fn property_short_zip_is_always_rejected(zip in "[0-9]{0,4}") {
            let result = Person::new("Jane", "Doe", "", "", "FL", zip, "1234567890");
            prop_assert_eq!(result, Err(ValidationError::InvalidZip));
        }

        #[test]
        fn property_query_of_any_field_substring_matches(
            city in "[a-zA-Z]{3,12}",
            start in 0_usize..3,
        ) {
            let person = Person::new("Jane", "Doe", "", city.clone(), "FL", "12345", "1234567890");
            prop_assert!(person.is_ok());
            if let Ok(person) = person {
                let needle = city[start..].to_uppercase();
                prop_assert!(person.matches_query(&needle));
            }
        }
    }
}

//! Person domain model.
//!
//! # Responsibility
//! - Define the canonical Person document stored in the `people` collection.
//! - Validate record fields before they reach persistence.
//!
//! # Invariants
//! - `id` is assigned by the store and never reused for another person.
//! - `name` is non-empty after trimming.
//! - `favorite_foods` keeps caller order; duplicates and empty entries are allowed.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Store-assigned identifier of a person document.
pub type PersonId = Uuid;

/// Validation failures for person records.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PersonValidationError {
    /// `name` is missing or blank.
    MissingName,
    /// Nil UUID cannot identify a stored document.
    NilId,
}

impl Display for PersonValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingName => write!(f, "person `name` is required"),
            Self::NilId => write!(f, "person id must not be nil"),
        }
    }
}

impl Error for PersonValidationError {}

/// Record fields accepted by insert operations.
///
/// There is no `id` field: identity is always assigned by the store.
/// A JSON payload without `name` decodes to an empty name and is then
/// rejected by [`NewPerson::validate`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewPerson {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub age: Option<i64>,
    #[serde(default)]
    pub favorite_foods: Vec<String>,
}

impl NewPerson {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            age: None,
            favorite_foods: Vec::new(),
        }
    }

    pub fn with_age(mut self, age: i64) -> Self {
        self.age = Some(age);
        self
    }

    pub fn with_foods<I, S>(mut self, foods: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.favorite_foods = foods.into_iter().map(Into::into).collect();
        self
    }

    /// Checks creation invariants without touching the store.
    pub fn validate(&self) -> Result<(), PersonValidationError> {
        validate_name(&self.name)
    }

    /// Binds these fields to a freshly generated identifier.
    pub(crate) fn into_person(self) -> Person {
        Person {
            id: Uuid::new_v4(),
            name: self.name,
            age: self.age,
            favorite_foods: self.favorite_foods,
        }
    }
}

/// Canonical stored person document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "RawPerson")]
pub struct Person {
    pub id: PersonId,
    pub name: String,
    pub age: Option<i64>,
    pub favorite_foods: Vec<String>,
}

impl Person {
    /// Validates a full document, including its identity.
    pub fn validate(&self) -> Result<(), PersonValidationError> {
        if self.id.is_nil() {
            return Err(PersonValidationError::NilId);
        }
        validate_name(&self.name)
    }

    /// Appends one food to the end of the list.
    pub fn add_favorite_food(&mut self, food: impl Into<String>) {
        self.favorite_foods.push(food.into());
    }

    /// Applies a field projection to this document.
    pub fn project(self, projection: &Projection) -> PersonDocument {
        PersonDocument {
            id: self.id,
            name: projection.includes(PersonField::Name).then_some(self.name),
            age: if projection.includes(PersonField::Age) {
                self.age
            } else {
                None
            },
            favorite_foods: projection
                .includes(PersonField::FavoriteFoods)
                .then_some(self.favorite_foods),
        }
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawPerson {
    id: PersonId,
    name: String,
    #[serde(default)]
    age: Option<i64>,
    #[serde(default)]
    favorite_foods: Vec<String>,
}

impl TryFrom<RawPerson> for Person {
    type Error = PersonValidationError;

    fn try_from(raw: RawPerson) -> Result<Self, Self::Error> {
        let person = Person {
            id: raw.id,
            name: raw.name,
            age: raw.age,
            favorite_foods: raw.favorite_foods,
        };
        person.validate()?;
        Ok(person)
    }
}

/// Non-identity fields of a person document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PersonField {
    Name,
    Age,
    FavoriteFoods,
}

/// Field selection for query results.
///
/// `id` is always returned; other fields are returned unless excluded.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Projection {
    excluded: BTreeSet<PersonField>,
}

impl Projection {
    /// Selects every field.
    pub fn all() -> Self {
        Self::default()
    }

    /// Drops `field` from the output.
    pub fn exclude(mut self, field: PersonField) -> Self {
        self.excluded.insert(field);
        self
    }

    pub fn includes(&self, field: PersonField) -> bool {
        !self.excluded.contains(&field)
    }
}

/// Person document after projection.
///
/// Excluded fields are `None` and left out of serialized output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonDocument {
    pub id: PersonId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub age: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub favorite_foods: Option<Vec<String>>,
}

pub(crate) fn validate_name(name: &str) -> Result<(), PersonValidationError> {
    if name.trim().is_empty() {
        return Err(PersonValidationError::MissingName);
    }
    Ok(())
}

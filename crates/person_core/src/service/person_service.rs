//! Person use-case service.
//!
//! # Responsibility
//! - Expose the person record operations as use-case level entry points.
//! - Build filters, updates and queries; delegate execution to the repository.
//! - Log the outcome of every operation.
//!
//! # Invariants
//! - Each call completes exactly once with either a value or an error.
//! - "No match" is reported as `None`, never as an error.
//! - Service layer remains storage-agnostic.

use crate::model::person::{NewPerson, Person, PersonDocument, PersonField, PersonId, Projection};
use crate::repo::person_repo::{
    DeleteSummary, PersonFilter, PersonQuery, PersonRepository, PersonUpdate, RepoResult,
    SortKey, SortOrder,
};
use log::{error, info};

/// Food appended by [`PersonService::find_edit_then_save`].
pub const FOOD_TO_ADD: &str = "hamburger";
/// Age written by [`PersonService::find_and_update`].
pub const AGE_TO_SET: i64 = 20;
/// Name removed by [`PersonService::remove_many_people`].
pub const NAME_TO_REMOVE: &str = "Mary";
/// Food searched by [`PersonService::query_chain`].
pub const FOOD_TO_SEARCH: &str = "burrito";
/// Result cap of [`PersonService::query_chain`].
pub const QUERY_CHAIN_LIMIT: u32 = 2;

/// Use-case service wrapper for person operations.
pub struct PersonService<R: PersonRepository> {
    repo: R,
}

impl<R: PersonRepository> PersonService<R> {
    /// Creates a service using the provided repository implementation.
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Validates and inserts one person.
    ///
    /// A record without `name` is rejected before any store write.
    pub fn create_and_save_person(&self, person: &NewPerson) -> RepoResult<Person> {
        let result = self.repo.insert_person(person);
        log_outcome("create_and_save_person", &result, |created| {
            format!("person_id={}", created.id)
        });
        result
    }

    /// Inserts a batch of people; nothing is written if any entry is invalid.
    pub fn create_many_people(&self, people: &[NewPerson]) -> RepoResult<Vec<Person>> {
        let result = self.repo.insert_people(people);
        log_outcome("create_many_people", &result, |created| {
            format!("count={}", created.len())
        });
        result
    }

    /// Returns every person whose name equals `name`.
    pub fn find_people_by_name(&self, name: &str) -> RepoResult<Vec<Person>> {
        let result = self.repo.find_people(&PersonFilter::by_name(name));
        log_outcome("find_people_by_name", &result, |found| {
            format!("count={}", found.len())
        });
        result
    }

    /// Returns the first person whose favorite foods contain `food`.
    pub fn find_one_by_food(&self, food: &str) -> RepoResult<Option<Person>> {
        let result = self.repo.find_one(&PersonFilter::by_food(food));
        log_outcome("find_one_by_food", &result, describe_optional);
        result
    }

    pub fn find_person_by_id(&self, id: PersonId) -> RepoResult<Option<Person>> {
        let result = self.repo.get_person(id);
        log_outcome("find_person_by_id", &result, describe_optional);
        result
    }

    /// Loads a person, appends [`FOOD_TO_ADD`] and saves the full record.
    pub fn find_edit_then_save(&self, id: PersonId) -> RepoResult<Option<Person>> {
        self.add_favorite_food(id, FOOD_TO_ADD)
    }

    /// Fetch-mutate-save round trip appending `food`.
    ///
    /// Load and save share one transaction. Returns `None` when no person
    /// has `id`.
    pub fn add_favorite_food(&self, id: PersonId, food: &str) -> RepoResult<Option<Person>> {
        let result = self
            .repo
            .modify_person(id, |person| person.add_favorite_food(food));
        log_outcome("find_edit_then_save", &result, describe_optional);
        result
    }

    /// Sets the age of the first person named `name` to [`AGE_TO_SET`].
    pub fn find_and_update(&self, name: &str) -> RepoResult<Option<Person>> {
        self.set_age_by_name(name, AGE_TO_SET)
    }

    /// Atomic filter update; returns the post-update document.
    pub fn set_age_by_name(&self, name: &str, age: i64) -> RepoResult<Option<Person>> {
        let result = self
            .repo
            .update_one(&PersonFilter::by_name(name), &PersonUpdate::set_age(age));
        log_outcome("find_and_update", &result, describe_optional);
        result
    }

    /// Deletes one person; returns the removed document.
    pub fn remove_by_id(&self, id: PersonId) -> RepoResult<Option<Person>> {
        let result = self.repo.delete_person(id);
        log_outcome("remove_by_id", &result, describe_optional);
        result
    }

    /// Deletes every person named [`NAME_TO_REMOVE`].
    pub fn remove_many_people(&self) -> RepoResult<DeleteSummary> {
        self.remove_people_by_name(NAME_TO_REMOVE)
    }

    pub fn remove_people_by_name(&self, name: &str) -> RepoResult<DeleteSummary> {
        let result = self.repo.delete_many(&PersonFilter::by_name(name));
        log_outcome("remove_many_people", &result, |summary| {
            format!("deleted_count={}", summary.deleted_count)
        });
        result
    }

    /// People who like [`FOOD_TO_SEARCH`], sorted by name, at most
    /// [`QUERY_CHAIN_LIMIT`], without `age`.
    pub fn query_chain(&self) -> RepoResult<Vec<PersonDocument>> {
        let query = PersonQuery::new(PersonFilter::by_food(FOOD_TO_SEARCH))
            .sort(SortKey::Name, SortOrder::Ascending)
            .limit(QUERY_CHAIN_LIMIT)
            .select(Projection::all().exclude(PersonField::Age));
        self.find_people_matching(&query)
    }

    /// Runs an arbitrary chained query.
    pub fn find_people_matching(&self, query: &PersonQuery) -> RepoResult<Vec<PersonDocument>> {
        let result = self.repo.query_people(query);
        log_outcome("query_chain", &result, |found| {
            format!("count={}", found.len())
        });
        result
    }
}

fn describe_optional(person: &Option<Person>) -> String {
    match person {
        Some(person) => format!("found=true person_id={}", person.id),
        None => "found=false".to_string(),
    }
}

fn log_outcome<T, F>(operation: &str, result: &RepoResult<T>, describe: F)
where
    F: FnOnce(&T) -> String,
{
    match result {
        Ok(value) => {
            info!(
                "event=person_op module=service op={} status=ok {}",
                operation,
                describe(value)
            );
        }
        Err(err) => {
            error!(
                "event=person_op module=service op={} status=error error={}",
                operation, err
            );
        }
    }
}

//! Person repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Provide document-style CRUD and query APIs over the `people` table.
//! - Keep SQL details inside the persistence boundary.
//!
//! # Invariants
//! - Write paths validate input before any SQL mutation.
//! - Read paths reject invalid persisted state instead of masking it.
//! - Without an explicit sort, results follow insertion order (`seq`).
//! - Multi-statement writes run inside one `IMMEDIATE` transaction.

use crate::db::migrations::latest_version;
use crate::db::{DbError, StoreHandle};
use crate::model::person::{
    validate_name, NewPerson, Person, PersonDocument, PersonId, PersonValidationError,
    Projection,
};
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, Row, Transaction, TransactionBehavior};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

const PERSON_SELECT_SQL: &str = "SELECT id, name, age, favorite_foods FROM people";

const REQUIRED_COLUMNS: &[&str] = &[
    "seq",
    "id",
    "name",
    "age",
    "favorite_foods",
    "created_at",
    "updated_at",
];

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error for person persistence and query operations.
#[derive(Debug)]
pub enum RepoError {
    Validation(PersonValidationError),
    Db(DbError),
    NotFound(PersonId),
    /// Persisted row cannot be converted into a valid `Person`.
    InvalidData(String),
    /// Caller-supplied filter/update/query is unusable.
    InvalidInput(String),
    /// Connection schema is not at the expected migrated version.
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    MissingRequiredTable(&'static str),
    MissingRequiredColumn {
        table: &'static str,
        column: &'static str,
    },
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound(id) => write!(f, "person not found: {id}"),
            Self::InvalidData(message) => write!(f, "invalid persisted person data: {message}"),
            Self::InvalidInput(message) => write!(f, "invalid request: {message}"),
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "person repository requires schema version {expected_version}, got {actual_version}"
            ),
            Self::MissingRequiredTable(table) => {
                write!(f, "person repository requires table `{table}`")
            }
            Self::MissingRequiredColumn { table, column } => write!(
                f,
                "person repository requires column `{column}` in table `{table}`"
            ),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Db(err) => Some(err),
            Self::NotFound(_)
            | Self::InvalidData(_)
            | Self::InvalidInput(_)
            | Self::UninitializedConnection { .. }
            | Self::MissingRequiredTable(_)
            | Self::MissingRequiredColumn { .. } => None,
        }
    }
}

impl From<PersonValidationError> for RepoError {
    fn from(value: PersonValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Field-match conditions, combined with AND. Empty matches every document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PersonFilter {
    pub id: Option<PersonId>,
    /// Exact, case-sensitive name match.
    pub name: Option<String>,
    /// Matches documents whose `favoriteFoods` contains this exact value.
    pub favorite_food: Option<String>,
}

impl PersonFilter {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn by_id(id: PersonId) -> Self {
        Self {
            id: Some(id),
            ..Self::default()
        }
    }

    pub fn by_name(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }

    pub fn by_food(food: impl Into<String>) -> Self {
        Self {
            favorite_food: Some(food.into()),
            ..Self::default()
        }
    }

    fn to_where_clause(&self) -> (String, Vec<Value>) {
        let mut clauses = Vec::new();
        let mut binds = Vec::new();

        if let Some(id) = self.id {
            clauses.push("id = ?");
            binds.push(Value::Text(id.to_string()));
        }
        if let Some(name) = &self.name {
            clauses.push("name = ?");
            binds.push(Value::Text(name.clone()));
        }
        if let Some(food) = &self.favorite_food {
            clauses.push(
                "EXISTS (SELECT 1 FROM json_each(people.favorite_foods) WHERE json_each.value = ?)",
            );
            binds.push(Value::Text(food.clone()));
        }

        if clauses.is_empty() {
            return (" WHERE 1 = 1".to_string(), binds);
        }
        (format!(" WHERE {}", clauses.join(" AND ")), binds)
    }
}

/// `$set`/`$push` style modification applied by [`PersonRepository::update_one`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PersonUpdate {
    pub name: Option<String>,
    pub age: Option<i64>,
    pub push_food: Option<String>,
}

impl PersonUpdate {
    pub fn set_age(age: i64) -> Self {
        Self {
            age: Some(age),
            ..Self::default()
        }
    }

    pub fn set_name(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }

    pub fn push_food(food: impl Into<String>) -> Self {
        Self {
            push_food: Some(food.into()),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.age.is_none() && self.push_food.is_none()
    }

    fn validate(&self) -> RepoResult<()> {
        if self.is_empty() {
            return Err(RepoError::InvalidInput(
                "update must change at least one field".to_string(),
            ));
        }
        if let Some(name) = &self.name {
            validate_name(name)?;
        }
        Ok(())
    }

    fn apply(&self, person: &mut Person) {
        if let Some(name) = &self.name {
            person.name = name.clone();
        }
        if let Some(age) = self.age {
            person.age = Some(age);
        }
        if let Some(food) = &self.push_food {
            person.add_favorite_food(food.clone());
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortKey {
    Name,
    Age,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Ascending,
    Descending,
}

impl SortOrder {
    fn as_sql(self) -> &'static str {
        match self {
            Self::Ascending => "ASC",
            Self::Descending => "DESC",
        }
    }
}

/// Chained find: filter, then sort, then limit, then field selection.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PersonQuery {
    pub filter: PersonFilter,
    pub sort: Option<(SortKey, SortOrder)>,
    /// `None` and `Some(0)` both mean "no limit".
    pub limit: Option<u32>,
    pub projection: Projection,
}

impl PersonQuery {
    pub fn new(filter: PersonFilter) -> Self {
        Self {
            filter,
            ..Self::default()
        }
    }

    pub fn sort(mut self, key: SortKey, order: SortOrder) -> Self {
        self.sort = Some((key, order));
        self
    }

    pub fn limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn select(mut self, projection: Projection) -> Self {
        self.projection = projection;
        self
    }
}

/// Outcome of a bulk delete.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteSummary {
    pub deleted_count: u64,
}

/// Repository interface for the person collection.
pub trait PersonRepository {
    fn insert_person(&self, person: &NewPerson) -> RepoResult<Person>;
    /// Inserts all or nothing; every entry is validated before the first write.
    fn insert_people(&self, people: &[NewPerson]) -> RepoResult<Vec<Person>>;
    fn get_person(&self, id: PersonId) -> RepoResult<Option<Person>>;
    fn find_people(&self, filter: &PersonFilter) -> RepoResult<Vec<Person>>;
    fn find_one(&self, filter: &PersonFilter) -> RepoResult<Option<Person>>;
    /// Replaces the stored document with `person`; `NotFound` if it vanished.
    fn save_person(&self, person: &Person) -> RepoResult<Person>;
    /// Loads one document, applies `mutate` and saves the full record,
    /// all inside one transaction. `None` when no document has `id`.
    fn modify_person<F>(&self, id: PersonId, mutate: F) -> RepoResult<Option<Person>>
    where
        F: FnOnce(&mut Person);
    /// Updates the first match and returns its post-update state.
    fn update_one(&self, filter: &PersonFilter, update: &PersonUpdate)
        -> RepoResult<Option<Person>>;
    /// Removes one document and returns what was removed.
    fn delete_person(&self, id: PersonId) -> RepoResult<Option<Person>>;
    fn delete_many(&self, filter: &PersonFilter) -> RepoResult<DeleteSummary>;
    fn query_people(&self, query: &PersonQuery) -> RepoResult<Vec<PersonDocument>>;
}

/// SQLite-backed person repository.
pub struct SqlitePersonRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqlitePersonRepository<'conn> {
    /// Constructs a repository from a migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_person_connection_ready(conn)?;
        Ok(Self { conn })
    }

    /// Constructs a repository from the process store handle.
    ///
    /// A degraded handle yields `RepoError::Db(DbError::Unavailable(_))`.
    pub fn from_handle(handle: &'conn StoreHandle) -> RepoResult<Self> {
        Self::try_new(handle.connection()?)
    }
}

impl PersonRepository for SqlitePersonRepository<'_> {
    fn insert_person(&self, person: &NewPerson) -> RepoResult<Person> {
        person.validate()?;

        let person = person.clone().into_person();
        insert_row(self.conn, &person)?;
        Ok(person)
    }

    fn insert_people(&self, people: &[NewPerson]) -> RepoResult<Vec<Person>> {
        for person in people {
            person.validate()?;
        }

        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        let mut created = Vec::with_capacity(people.len());
        for person in people {
            let person = person.clone().into_person();
            insert_row(&tx, &person)?;
            created.push(person);
        }
        tx.commit()?;

        Ok(created)
    }

    fn get_person(&self, id: PersonId) -> RepoResult<Option<Person>> {
        self.find_one(&PersonFilter::by_id(id))
    }

    fn find_people(&self, filter: &PersonFilter) -> RepoResult<Vec<Person>> {
        select_people(self.conn, filter, None, None)
    }

    fn find_one(&self, filter: &PersonFilter) -> RepoResult<Option<Person>> {
        Ok(select_people(self.conn, filter, None, Some(1))?
            .into_iter()
            .next())
    }

    fn save_person(&self, person: &Person) -> RepoResult<Person> {
        person.validate()?;

        if write_row(self.conn, person)? == 0 {
            return Err(RepoError::NotFound(person.id));
        }
        Ok(person.clone())
    }

    fn modify_person<F>(&self, id: PersonId, mutate: F) -> RepoResult<Option<Person>>
    where
        F: FnOnce(&mut Person),
    {
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        let Some(mut person) = select_people(&tx, &PersonFilter::by_id(id), None, Some(1))?
            .into_iter()
            .next()
        else {
            return Ok(None);
        };

        mutate(&mut person);
        if person.id != id {
            return Err(RepoError::InvalidInput(
                "mutation must not change the person id".to_string(),
            ));
        }
        person.validate()?;
        write_row(&tx, &person)?;
        tx.commit()?;

        Ok(Some(person))
    }

    fn update_one(
        &self,
        filter: &PersonFilter,
        update: &PersonUpdate,
    ) -> RepoResult<Option<Person>> {
        update.validate()?;

        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        let Some(mut person) = select_people(&tx, filter, None, Some(1))?.into_iter().next()
        else {
            return Ok(None);
        };

        update.apply(&mut person);
        person.validate()?;
        write_row(&tx, &person)?;
        tx.commit()?;

        Ok(Some(person))
    }

    fn delete_person(&self, id: PersonId) -> RepoResult<Option<Person>> {
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        let Some(person) = select_people(&tx, &PersonFilter::by_id(id), None, Some(1))?
            .into_iter()
            .next()
        else {
            return Ok(None);
        };

        tx.execute("DELETE FROM people WHERE id = ?1;", [id.to_string()])?;
        tx.commit()?;

        Ok(Some(person))
    }

    fn delete_many(&self, filter: &PersonFilter) -> RepoResult<DeleteSummary> {
        let (where_sql, binds) = filter.to_where_clause();
        let deleted = self.conn.execute(
            &format!("DELETE FROM people{where_sql};"),
            params_from_iter(binds),
        )?;

        Ok(DeleteSummary {
            deleted_count: deleted as u64,
        })
    }

    fn query_people(&self, query: &PersonQuery) -> RepoResult<Vec<PersonDocument>> {
        let limit = query.limit.filter(|limit| *limit > 0);
        let people = select_people(self.conn, &query.filter, query.sort, limit)?;

        Ok(people
            .into_iter()
            .map(|person| person.project(&query.projection))
            .collect())
    }
}

fn select_people(
    conn: &Connection,
    filter: &PersonFilter,
    sort: Option<(SortKey, SortOrder)>,
    limit: Option<u32>,
) -> RepoResult<Vec<Person>> {
    let (where_sql, mut binds) = filter.to_where_clause();
    let mut sql = format!("{PERSON_SELECT_SQL}{where_sql}");

    match sort {
        Some((key, order)) => {
            let column = match key {
                SortKey::Name => "name",
                SortKey::Age => "age",
            };
            sql.push_str(&format!(" ORDER BY {column} {}, seq ASC", order.as_sql()));
        }
        None => sql.push_str(" ORDER BY seq ASC"),
    }

    if let Some(limit) = limit {
        sql.push_str(" LIMIT ?");
        binds.push(Value::Integer(i64::from(limit)));
    }

    let mut stmt = conn.prepare(&sql)?;
    let mut rows = stmt.query(params_from_iter(binds))?;
    let mut people = Vec::new();

    while let Some(row) = rows.next()? {
        people.push(parse_person_row(row)?);
    }

    Ok(people)
}

fn insert_row(conn: &Connection, person: &Person) -> RepoResult<()> {
    conn.execute(
        "INSERT INTO people (id, name, age, favorite_foods) VALUES (?1, ?2, ?3, ?4);",
        params![
            person.id.to_string(),
            person.name.as_str(),
            person.age,
            foods_to_db(&person.favorite_foods)?,
        ],
    )?;
    Ok(())
}

fn write_row(conn: &Connection, person: &Person) -> RepoResult<usize> {
    let changed = conn.execute(
        "UPDATE people
         SET
            name = ?2,
            age = ?3,
            favorite_foods = ?4,
            updated_at = (strftime('%s', 'now') * 1000)
         WHERE id = ?1;",
        params![
            person.id.to_string(),
            person.name.as_str(),
            person.age,
            foods_to_db(&person.favorite_foods)?,
        ],
    )?;
    Ok(changed)
}

fn parse_person_row(row: &Row<'_>) -> RepoResult<Person> {
    let id_text: String = row.get("id")?;
    let id = Uuid::parse_str(&id_text).map_err(|_| {
        RepoError::InvalidData(format!("invalid uuid value `{id_text}` in people.id"))
    })?;

    let foods_text: String = row.get("favorite_foods")?;
    let favorite_foods: Vec<String> = serde_json::from_str(&foods_text).map_err(|err| {
        RepoError::InvalidData(format!(
            "invalid favorite_foods value for person {id}: {err}"
        ))
    })?;

    let person = Person {
        id,
        name: row.get("name")?,
        age: row.get("age")?,
        favorite_foods,
    };
    person
        .validate()
        .map_err(|err| RepoError::InvalidData(format!("person {id}: {err}")))?;
    Ok(person)
}

fn foods_to_db(foods: &[String]) -> RepoResult<String> {
    serde_json::to_string(foods)
        .map_err(|err| RepoError::InvalidInput(format!("cannot encode favoriteFoods: {err}")))
}

fn ensure_person_connection_ready(conn: &Connection) -> RepoResult<()> {
    let expected_version = latest_version();
    let actual_version: u32 = conn.query_row("PRAGMA user_version;", [], |row| row.get(0))?;
    if actual_version != expected_version {
        return Err(RepoError::UninitializedConnection {
            expected_version,
            actual_version,
        });
    }

    if !table_exists(conn, "people")? {
        return Err(RepoError::MissingRequiredTable("people"));
    }

    for &column in REQUIRED_COLUMNS {
        if !table_has_column(conn, "people", column)? {
            return Err(RepoError::MissingRequiredColumn {
                table: "people",
                column,
            });
        }
    }

    Ok(())
}

fn table_exists(conn: &Connection, table: &str) -> RepoResult<bool> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1
            FROM sqlite_master
            WHERE type = 'table' AND name = ?1
        );",
        [table],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}

fn table_has_column(conn: &Connection, table: &str, column: &str) -> RepoResult<bool> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({table});"))?;
    let mut rows = stmt.query([])?;
    while let Some(row) = rows.next()? {
        let current: String = row.get(1)?;
        if current == column {
            return Ok(true);
        }
    }
    Ok(false)
}

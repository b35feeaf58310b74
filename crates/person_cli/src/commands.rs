//! Command dispatch.
//!
//! Every command ends by calling `done` exactly once, including when the
//! store is unavailable or input cannot be read. `version` never touches
//! the store.

use crate::args::Command;
use person_core::fixtures::{sample_people, sample_person};
use person_core::{
    complete, core_version, NewPerson, Person, PersonRepository, PersonService, RepoError,
    RepoResult, SqlitePersonRepository, StoreConfig, StoreHandle,
};
use serde::Serialize;
use serde_json::Value;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};

#[derive(Debug)]
pub enum CliError {
    Repo(RepoError),
    ReadInput { path: PathBuf, source: std::io::Error },
    Json(serde_json::Error),
}

impl Display for CliError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Repo(err) => write!(f, "{err}"),
            Self::ReadInput { path, source } => {
                write!(f, "cannot read `{}`: {source}", path.display())
            }
            Self::Json(err) => write!(f, "invalid JSON: {err}"),
        }
    }
}

impl Error for CliError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Repo(err) => Some(err),
            Self::ReadInput { source, .. } => Some(source),
            Self::Json(err) => Some(err),
        }
    }
}

impl From<RepoError> for CliError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

impl From<serde_json::Error> for CliError {
    fn from(value: serde_json::Error) -> Self {
        Self::Json(value)
    }
}

pub type CliResult<T> = Result<T, CliError>;

/// Resolves the store from `PERSON_DB_URI` through `lookup`.
///
/// A missing, empty or unreachable store yields a degraded handle.
pub fn connect<F>(lookup: F) -> StoreHandle
where
    F: Fn(&str) -> Option<String>,
{
    match StoreConfig::from_lookup(lookup) {
        Ok(config) => StoreHandle::connect(&config),
        Err(err) => StoreHandle::degraded(err.to_string()),
    }
}

/// Runs `command` against `handle` and reports through `done`.
pub fn run<Done>(handle: &StoreHandle, command: Command, done: Done)
where
    Done: FnOnce(CliResult<Value>),
{
    match command {
        Command::Version => done(Ok(version_value())),
        Command::Seed => with_service(handle, |service| seed(service), done),
        Command::Create { name, age, foods } => {
            let person = NewPerson {
                name,
                age,
                favorite_foods: foods,
            };
            with_service(
                handle,
                |service| service.create_and_save_person(&person),
                done,
            )
        }
        Command::CreateMany { file } => match read_people(&file) {
            Ok(people) => with_service(
                handle,
                |service| service.create_many_people(&people),
                done,
            ),
            Err(err) => done(Err(err)),
        },
        Command::FindByName { name } => with_service(
            handle,
            |service| service.find_people_by_name(&name),
            done,
        ),
        Command::FindOneByFood { food } => {
            with_service(handle, |service| service.find_one_by_food(&food), done)
        }
        Command::FindById { id } => {
            with_service(handle, |service| service.find_person_by_id(id), done)
        }
        Command::AddHamburger { id } => {
            with_service(handle, |service| service.find_edit_then_save(id), done)
        }
        Command::SetAge { name } => {
            with_service(handle, |service| service.find_and_update(&name), done)
        }
        Command::RemoveById { id } => {
            with_service(handle, |service| service.remove_by_id(id), done)
        }
        Command::RemoveMary => with_service(handle, |service| service.remove_many_people(), done),
        Command::QueryChain => with_service(handle, |service| service.query_chain(), done),
    }
}

fn with_service<'h, T, Op, Done>(handle: &'h StoreHandle, operation: Op, done: Done)
where
    T: Serialize,
    Op: FnOnce(&PersonService<SqlitePersonRepository<'h>>) -> RepoResult<T>,
    Done: FnOnce(CliResult<Value>),
{
    complete(
        || {
            let service = PersonService::new(SqlitePersonRepository::from_handle(handle)?);
            operation(&service)
        },
        |result| done(render(result)),
    )
}

fn seed<R: PersonRepository>(service: &PersonService<R>) -> RepoResult<Vec<Person>> {
    let mut created = vec![service.create_and_save_person(&sample_person())?];
    created.extend(service.create_many_people(&sample_people())?);
    Ok(created)
}

fn version_value() -> Value {
    Value::String(core_version().to_string())
}

fn read_people(path: &Path) -> CliResult<Vec<NewPerson>> {
    let text = std::fs::read_to_string(path).map_err(|source| CliError::ReadInput {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(serde_json::from_str(&text)?)
}

fn render<T: Serialize>(result: RepoResult<T>) -> CliResult<Value> {
    Ok(serde_json::to_value(result?)?)
}

#[cfg(test)]
mod tests {
    use super::{connect, run, CliError};
    use crate::args::Command;
    use person_core::config::DB_URI_ENV;
    use person_core::{DbError, RepoError, StoreConfig, StoreHandle};
    use serde_json::Value;
    use std::io::Write;

    fn run_to_value(handle: &StoreHandle, command: Command) -> Result<Value, CliError> {
        let mut outcome = None;
        run(handle, command, |result| outcome = Some(result));
        outcome.expect("run must report exactly once")
    }

    #[test]
    fn seed_then_find_one_by_food() {
        let handle = StoreHandle::connect(&StoreConfig::in_memory());

        let seeded = run_to_value(&handle, Command::Seed).unwrap();
        assert_eq!(seeded.as_array().unwrap().len(), 4);

        let found = run_to_value(
            &handle,
            Command::FindOneByFood {
                food: "Mushroom".to_string(),
            },
        )
        .unwrap();
        assert_eq!(found["name"], "Mario");
    }

    #[test]
    fn absent_results_render_as_null() {
        let handle = StoreHandle::connect(&StoreConfig::in_memory());
        let value = run_to_value(
            &handle,
            Command::SetAge {
                name: "Nobody".to_string(),
            },
        )
        .unwrap();
        assert_eq!(value, Value::Null);

        let summary = run_to_value(&handle, Command::RemoveMary).unwrap();
        assert_eq!(summary["deletedCount"], 0);
    }

    #[test]
    fn create_many_reads_json_file() {
        let handle = StoreHandle::connect(&StoreConfig::in_memory());
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"[{{"name": "Ana", "favoriteFoods": ["burrito"]}}, {{"name": "Bo", "age": 3, "favoriteFoods": ["burrito"]}}]"#
        )
        .unwrap();

        let created = run_to_value(
            &handle,
            Command::CreateMany {
                file: file.path().to_path_buf(),
            },
        )
        .unwrap();
        assert_eq!(created.as_array().unwrap().len(), 2);

        let chained = run_to_value(&handle, Command::QueryChain).unwrap();
        let docs = chained.as_array().unwrap();
        assert_eq!(docs.len(), 2);
        assert!(docs.iter().all(|doc| doc.get("age").is_none()));
    }

    #[test]
    fn degraded_store_reports_unavailable() {
        let handle = StoreHandle::degraded("PERSON_DB_URI is not set");
        let err = run_to_value(&handle, Command::QueryChain).unwrap_err();
        assert!(matches!(
            err,
            CliError::Repo(RepoError::Db(DbError::Unavailable(_)))
        ));

        let version = run_to_value(&handle, Command::Version).unwrap();
        assert!(version.is_string());
    }

    #[test]
    fn missing_connection_string_degrades_store() {
        let handle = connect(|_| None);
        assert!(!handle.is_connected());

        let err = run_to_value(
            &handle,
            Command::FindByName {
                name: "Mary".to_string(),
            },
        )
        .unwrap_err();
        match err {
            CliError::Repo(RepoError::Db(DbError::Unavailable(reason))) => {
                assert!(reason.contains(DB_URI_ENV), "unexpected reason: {reason}")
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn blank_connection_string_degrades_store() {
        let handle = connect(|key| (key == DB_URI_ENV).then(|| "  ".to_string()));
        assert!(!handle.is_connected());
        assert!(matches!(
            run_to_value(&handle, Command::Seed),
            Err(CliError::Repo(RepoError::Db(DbError::Unavailable(_))))
        ));
    }

    #[test]
    fn memory_connection_string_serves_commands() {
        let handle = connect(|key| (key == DB_URI_ENV).then(|| "sqlite::memory:".to_string()));
        assert!(handle.is_connected());
        assert_eq!(run_to_value(&handle, Command::QueryChain).unwrap(), Value::Array(vec![]));
    }
}

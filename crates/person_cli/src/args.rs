//! CLI argument definitions.

use clap::{Parser, Subcommand};
use person_core::config::{DB_URI_ENV, LOG_DIR_ENV, LOG_LEVEL_ENV};
use std::path::PathBuf;
use uuid::Uuid;

/// Person collection walkthrough against a SQLite document store.
#[derive(Parser, Debug)]
#[command(name = "person", version, about, long_about = None)]
pub struct Cli {
    /// Store connection string (`sqlite://people.db`, `sqlite::memory:`, ...)
    #[arg(long, global = true, env = "PERSON_DB_URI")]
    pub db_uri: Option<String>,

    /// Log level: trace|debug|info|warn|error
    #[arg(long, global = true, env = "PERSON_LOG_LEVEL")]
    pub log_level: Option<String>,

    /// Absolute directory for rolling log files; stderr when unset
    #[arg(long, global = true, env = "PERSON_LOG_DIR")]
    pub log_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    /// Config lookup backed by the parsed flags (which already fall back
    /// to the environment).
    pub fn setting(&self, key: &str) -> Option<String> {
        match key {
            DB_URI_ENV => self.db_uri.clone(),
            LOG_LEVEL_ENV => self.log_level.clone(),
            LOG_DIR_ENV => self
                .log_dir
                .as_ref()
                .map(|dir| dir.to_string_lossy().into_owned()),
            _ => None,
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Insert the sample people
    Seed,

    /// Create and save one person
    Create {
        #[arg(long)]
        name: String,
        #[arg(long)]
        age: Option<i64>,
        /// Favorite food; repeat for several
        #[arg(long = "food")]
        foods: Vec<String>,
    },

    /// Create people from a JSON array file
    CreateMany { file: PathBuf },

    /// Find every person with this exact name
    FindByName { name: String },

    /// Find the first person who likes this food
    FindOneByFood { food: String },

    FindById { id: Uuid },

    /// Append "hamburger" to a person's favorite foods
    AddHamburger { id: Uuid },

    /// Set age 20 on the first person with this name
    SetAge { name: String },

    RemoveById { id: Uuid },

    /// Delete every person named "Mary"
    RemoveMary,

    /// Two burrito lovers by name, without age
    QueryChain,

    /// Print the core library version
    Version,
}

#[cfg(test)]
mod tests {
    use super::Cli;
    use clap::Parser;
    use person_core::config::{DB_URI_ENV, LOG_DIR_ENV, LOG_LEVEL_ENV};

    #[test]
    fn flags_feed_config_lookup() {
        let cli = Cli::try_parse_from([
            "person",
            "--db-uri",
            "sqlite::memory:",
            "--log-level",
            "warn",
            "--log-dir",
            "/tmp/person-logs",
            "version",
        ])
        .unwrap();

        assert_eq!(cli.setting(DB_URI_ENV).as_deref(), Some("sqlite::memory:"));
        assert_eq!(cli.setting(LOG_LEVEL_ENV).as_deref(), Some("warn"));
        assert_eq!(cli.setting(LOG_DIR_ENV).as_deref(), Some("/tmp/person-logs"));
        assert_eq!(cli.setting("UNRELATED"), None);
    }
}

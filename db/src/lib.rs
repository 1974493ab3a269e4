//! Client library for a MariaDB (or SQLite) Bible database laid out as a
//! translation catalog plus one verse table per translation.

use diesel::prelude::*;
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};
use thiserror::Error;

/// Database backend the crate talks to. MariaDB when built with the
/// `mysql` feature, SQLite otherwise.
#[cfg(feature = "mysql")]
pub type DbBackend = diesel::mysql::Mysql;
#[cfg(not(feature = "mysql"))]
pub type DbBackend = diesel::sqlite::Sqlite;

/// Connection type for [DbBackend](crate::DbBackend).
#[cfg(feature = "mysql")]
pub type DbConnection = MysqlConnection;
#[cfg(not(feature = "mysql"))]
pub type DbConnection = SqliteConnection;

pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

#[derive(Clone, Error, Debug, PartialEq)]
pub enum DbError {
    #[error("'{}' is not a known book of the Bible.", book)]
    UnknownBook { book: String },

    #[error("{} is not a valid book number (expected 1-66).", ordinal)]
    InvalidOrdinal { ordinal: i32 },

    #[error("'{}' is not a valid Bible reference.", reference)]
    InvalidReference { reference: String },

    #[error("Could not connect to the database. Root cause: {:?}.", cause)]
    Connection { cause: String },

    #[error("There was a database error. Root cause: {:?}.", cause)]
    Query { cause: String },

    #[error("There was a database migration error. Root cause: {:?}.", cause)]
    Migration { cause: String },

    #[error("Invalid configuration value for {}: {:?}.", key, cause)]
    Config { key: String, cause: String },

    #[error("'{}' is not a valid log level.", level)]
    InvalidLogLevel { level: String },

    #[error("'{}' is not a usable translation table name.", table)]
    InvalidTable { table: String },
}

/// Establishes a database connection with the given URL.
pub fn establish_connection(db_url: &str) -> Result<DbConnection, DbError> {
    DbConnection::establish(db_url).map_err(|e| DbError::Connection {
        cause: e.to_string(),
    })
}

/// Run any pending embedded migrations.
pub fn run_migrations(conn: &mut DbConnection) -> Result<(), DbError> {
    conn.run_pending_migrations(MIGRATIONS)
        .map(|_| ())
        .map_err(|e| DbError::Migration {
            cause: e.to_string(),
        })
}

pub mod books;
mod client;
pub mod config;
pub mod models;
pub mod query;
mod sword_drill;

pub use books::{ordinal_to_name, resolve_book, Book, Testament};
pub use client::{BibleDatabase, SqlSink};
pub use config::Config;
pub use models::{Reference, Translation, Verse};
pub use query::{build_query, Param, Statement};
pub use sword_drill::{SwordDrill, SwordDrillable};

#[cfg(all(test, not(feature = "mysql")))]
pub(crate) fn test_connection() -> DbConnection {
    let mut conn = establish_connection(":memory:").unwrap();
    run_migrations(&mut conn).unwrap();
    conn
}

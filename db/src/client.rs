use std::path::Path;

use log::{error, info, LevelFilter};

use crate::books;
use crate::config::Config;
use crate::models::{Reference, Translation, Verse};
use crate::query::Statement;
pub use crate::sword_drill::SqlSink;
use crate::sword_drill::{SwordDrill, SwordDrillable};
use crate::{establish_connection, DbConnection, DbError};

/// A client for the Bible database.
///
/// The client owns at most one connection. It is opened explicitly with
/// [connect](BibleDatabase::connect), lazily by the first query, or for
/// the length of a closure with [scoped](BibleDatabase::scoped), and it
/// is closed by [disconnect](BibleDatabase::disconnect) or when the
/// client is dropped.
///
/// Queries block until the database answers. A client is not meant to be
/// shared between threads; use one client per thread or put it behind a
/// lock.
pub struct BibleDatabase {
    config: Config,
    conn: Option<DbConnection>,
    sink: Option<SqlSink>,
}

impl BibleDatabase {
    /// Creates a disconnected client. Applies the configured log level,
    /// if any.
    pub fn new(config: Config) -> Result<BibleDatabase, DbError> {
        if let Some(ref level) = config.log_level {
            set_log_level(level)?;
        }
        info!(
            "Bible database client initialized with host: {}",
            config.host
        );

        Ok(BibleDatabase {
            config,
            conn: None,
            sink: None,
        })
    }

    /// Creates a client configured from `.env` and the environment.
    pub fn from_env() -> Result<BibleDatabase, DbError> {
        Self::new(Config::from_env()?)
    }

    /// Creates a client configured from the given env file and the
    /// environment.
    pub fn from_env_file<P: AsRef<Path>>(path: P) -> Result<BibleDatabase, DbError> {
        Self::new(Config::from_env_file(path)?)
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Opens the connection, replacing any open one.
    pub fn connect(&mut self) -> Result<(), DbError> {
        let url = self.config.database_url()?;
        match establish_connection(&url) {
            Ok(conn) => {
                self.conn = Some(conn);
                info!("Connected to the Bible database");
                Ok(())
            }
            Err(e) => {
                error!("Error connecting to the Bible database: {}", e);
                Err(e)
            }
        }
    }

    /// Closes the connection. Does nothing when not connected.
    pub fn disconnect(&mut self) {
        if self.conn.take().is_some() {
            info!("Disconnected from the Bible database");
        }
    }

    pub fn is_connected(&self) -> bool {
        self.conn.is_some()
    }

    /// Connects unless already connected.
    pub fn ensure_connected(&mut self) -> Result<(), DbError> {
        if self.conn.is_none() {
            self.connect()?;
        }
        Ok(())
    }

    /// Borrows the live connection, connecting first if needed.
    pub fn connection(&mut self) -> Result<&mut DbConnection, DbError> {
        self.ensure_connected()?;
        self.conn.as_mut().ok_or_else(|| DbError::Connection {
            cause: "connection was not initialized".to_string(),
        })
    }

    /// Connects, runs `f`, and disconnects, whether `f` succeeds or not.
    /// If `f` panics the connection is closed when the client drops.
    pub fn scoped<T, F>(&mut self, f: F) -> Result<T, DbError>
    where
        F: FnOnce(&mut BibleDatabase) -> Result<T, DbError>,
    {
        self.connect()?;
        let result = f(self);
        self.disconnect();
        result
    }

    /// Sets the maximum level of log output. SQL statements are logged at
    /// `DEBUG`.
    ///
    /// This only moves the `log` crate's global max level. The installed
    /// logger must pass the records through, so a logger with its own
    /// stricter filter still drops them.
    pub fn set_log_level(&self, level: &str) -> Result<(), DbError> {
        set_log_level(level)
    }

    /// Sends every statement to `sink` before it is executed.
    pub fn enable_debug<F>(&mut self, sink: F)
    where
        F: FnMut(&Statement) + Send + 'static,
    {
        self.sink = Some(Box::new(sink));
    }

    pub fn disable_debug(&mut self) {
        self.sink = None;
    }

    pub fn is_debug(&self) -> bool {
        self.sink.is_some()
    }

    /// Gets the verses of `reference` (e.g. "John 3:16", "Jude 5",
    /// "Gen 1:1-3") in the translation with the given code.
    ///
    /// An unknown translation code, or a reference with no verses in the
    /// database, gives an empty list.
    pub fn get_verses(&mut self, reference: &str, translation: &str) -> Result<Vec<Verse>, DbError> {
        let reference: Reference = reference.parse()?;
        self.verses(&reference, translation)
    }

    /// Like [get_verses](BibleDatabase::get_verses), for an already parsed
    /// reference.
    pub fn verses(&mut self, reference: &Reference, translation: &str) -> Result<Vec<Verse>, DbError> {
        self.ensure_connected()?;
        let BibleDatabase { conn, sink, .. } = self;
        match conn {
            Some(conn) => SwordDrill::verses(reference, translation, conn, sink),
            None => Err(not_connected()),
        }
    }

    /// Gets the codes of the translations in the database, in catalog
    /// order.
    pub fn get_available_translations(&mut self) -> Result<Vec<String>, DbError> {
        Ok(self
            .translations()?
            .into_iter()
            .map(|t| t.abbreviation)
            .collect())
    }

    /// Gets every row of the translation catalog.
    pub fn translations(&mut self) -> Result<Vec<Translation>, DbError> {
        self.ensure_connected()?;
        let BibleDatabase { conn, sink, .. } = self;
        match conn {
            Some(conn) => SwordDrill::translations(conn, sink),
            None => Err(not_connected()),
        }
    }

    /// Resolves a book name or abbreviation to its number.
    pub fn book_number(&self, name: &str) -> Result<i32, DbError> {
        books::resolve_book(name)
    }

    /// Gets the canonical name of a book from its number.
    pub fn book_name(&self, number: i32) -> Result<&'static str, DbError> {
        books::ordinal_to_name(number)
    }

    /// Applies the embedded schema migrations to the connected database.
    pub fn run_migrations(&mut self) -> Result<(), DbError> {
        crate::run_migrations(self.connection()?)
    }
}

impl Drop for BibleDatabase {
    fn drop(&mut self) {
        self.disconnect();
    }
}

fn not_connected() -> DbError {
    DbError::Connection {
        cause: "not connected".to_string(),
    }
}

/// Sets the global `log` max level from a level name. Accepts the
/// `log` crate's names plus `WARNING` and `CRITICAL`. Does not touch the
/// installed logger's filter.
pub(crate) fn set_log_level(level: &str) -> Result<(), DbError> {
    let filter = match level.trim().to_uppercase().as_str() {
        "OFF" => LevelFilter::Off,
        "TRACE" => LevelFilter::Trace,
        "DEBUG" => LevelFilter::Debug,
        "INFO" => LevelFilter::Info,
        "WARN" | "WARNING" => LevelFilter::Warn,
        "ERROR" | "CRITICAL" => LevelFilter::Error,
        _ => {
            return Err(DbError::InvalidLogLevel {
                level: level.to_string(),
            })
        }
    };
    log::set_max_level(filter);
    Ok(())
}

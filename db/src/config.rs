use std::env;
use std::path::Path;

use url::Url;

use crate::DbError;

/// Connection settings, normally read from the environment or a `.env`
/// file.
#[derive(Clone, Debug, PartialEq)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
    pub database: String,
    /// Used as-is instead of the URL assembled from the other fields.
    pub database_url: Option<String>,
    /// Log level applied when a client is created.
    pub log_level: Option<String>,
}

impl Default for Config {
    fn default() -> Config {
        Config {
            host: "127.0.0.1".to_string(),
            port: 3306,
            user: "root".to_string(),
            password: String::new(),
            database: "bible".to_string(),
            database_url: None,
            log_level: None,
        }
    }
}

impl Config {
    /// Loads `.env` from the working directory, if present, then reads the
    /// environment.
    pub fn from_env() -> Result<Config, DbError> {
        dotenv::dotenv().ok();
        Self::from_vars(|key| env::var(key).ok())
    }

    /// Loads the given env file, if present, then reads the environment.
    pub fn from_env_file<P: AsRef<Path>>(path: P) -> Result<Config, DbError> {
        dotenv::from_path(path.as_ref()).ok();
        Self::from_vars(|key| env::var(key).ok())
    }

    /// Builds a config from a variable lookup, falling back to the
    /// defaults for anything unset or empty.
    pub fn from_vars<F>(var: F) -> Result<Config, DbError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| var(key).filter(|v| !v.trim().is_empty());
        let defaults = Config::default();

        let port = match var("DB_PORT") {
            Some(port) => port.trim().parse().map_err(|e| DbError::Config {
                key: "DB_PORT".to_string(),
                cause: format!("{}: {}", port, e),
            })?,
            None => defaults.port,
        };

        Ok(Config {
            host: var("DB_HOST").unwrap_or(defaults.host),
            port,
            user: var("DB_USER").unwrap_or(defaults.user),
            password: var("DB_PASSWORD").unwrap_or(defaults.password),
            database: var("DB_NAME").unwrap_or(defaults.database),
            database_url: var("DATABASE_URL"),
            log_level: var("LOG_LEVEL"),
        })
    }

    /// The URL handed to the database driver.
    ///
    /// `DATABASE_URL` wins when set. Otherwise a `mysql://` URL is built
    /// from the individual settings, with the credentials percent-encoded.
    pub fn database_url(&self) -> Result<String, DbError> {
        if let Some(ref url) = self.database_url {
            return Ok(url.clone());
        }

        let config_error = |cause: String| DbError::Config {
            key: "DB_HOST".to_string(),
            cause,
        };
        let mut url = Url::parse(&format!("mysql://{}:{}", self.host, self.port))
            .map_err(|e| config_error(format!("{}: {}", self.host, e)))?;
        let password = Some(self.password.as_str()).filter(|p| !p.is_empty());
        if url.set_username(&self.user).is_err() || url.set_password(password).is_err() {
            return Err(config_error(format!("{} cannot carry credentials", self.host)));
        }
        url.set_path(&format!("/{}", self.database));

        Ok(url.into())
    }
}

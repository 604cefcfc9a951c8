//! Connection configuration
//!
//! Settings are read from TOML:
//!
//! ```toml
//! kind = "sqlite"
//! database = "app.db"
//! cast_untyped_columns = true
//! ```

use crate::errors::{config_error, io_error, Result};
use rowkeeper_core::{Dialect, PropertyTypeDeterminer, TypeCaster};
use rowkeeper_core_types::Sensitive;
use serde::Deserialize;
use std::path::Path;

/// Name SQLite uses for a private in-memory database
pub const IN_MEMORY: &str = ":memory:";

const DEFAULT_PORT: u16 = 3306;

fn default_kind() -> Dialect {
    Dialect::Sqlite
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

/// Connection settings
///
/// `Debug` output never contains the password.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DatabaseConfig {
    #[serde(default = "default_kind")]
    pub kind: Dialect,
    #[serde(default)]
    pub host: Option<String>,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub password: Option<Sensitive<String>>,
    #[serde(default)]
    pub database: Option<String>,
    #[serde(default)]
    pub charset: Option<String>,
    /// Infer types for columns without a registered typer
    #[serde(default)]
    pub cast_untyped_columns: bool,
}

impl DatabaseConfig {
    /// Settings for a SQLite file
    pub fn sqlite(path: impl Into<String>) -> Self {
        Self {
            kind: Dialect::Sqlite,
            host: None,
            port: DEFAULT_PORT,
            username: None,
            password: None,
            database: Some(path.into()),
            charset: None,
            cast_untyped_columns: false,
        }
    }

    /// Settings for a private in-memory SQLite database
    pub fn in_memory() -> Self {
        Self::sqlite(IN_MEMORY)
    }

    /// Parse and validate TOML settings
    ///
    /// # Errors
    ///
    /// `Config` when the text is not valid TOML for this struct or fails
    /// [`validate`](Self::validate).
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: Self =
            toml::from_str(text).map_err(|e| config_error(format!("parse: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a TOML settings file
    ///
    /// # Errors
    ///
    /// `Config` when the file cannot be read or its content is rejected by
    /// [`from_toml_str`](Self::from_toml_str).
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .map_err(|e| io_error(&format!("read {}", path.display()), e))?;
        Self::from_toml_str(&text)
    }

    /// Check that the settings name everything the dialect needs
    ///
    /// # Errors
    ///
    /// `Config` when SQLite has no database or MySQL has no host.
    pub fn validate(&self) -> Result<()> {
        match self.kind {
            Dialect::Sqlite if is_blank(&self.database) => {
                Err(config_error("a sqlite connection requires a database"))
            }
            Dialect::MySql if is_blank(&self.host) => {
                Err(config_error("a mysql connection requires a host"))
            }
            _ => Ok(()),
        }
    }

    /// Data source name in the form MySQL drivers expect
    ///
    /// # Errors
    ///
    /// `Config` when the settings are not MySQL settings or lack a host.
    pub fn mysql_dsn(&self) -> Result<String> {
        if self.kind != Dialect::MySql {
            return Err(config_error("a dsn is only built for mysql connections"));
        }
        self.validate()?;

        let mut dsn = format!(
            "mysql:host={};port={};dbname={}",
            self.host.as_deref().unwrap_or_default(),
            self.port,
            self.database.as_deref().unwrap_or_default()
        );
        if let Some(charset) = self.charset.as_deref().filter(|c| !c.is_empty()) {
            dsn.push_str(";charset=");
            dsn.push_str(charset);
        }
        Ok(dsn)
    }

    /// Property type determiner honouring `cast_untyped_columns`
    pub fn determiner(&self) -> PropertyTypeDeterminer {
        PropertyTypeDeterminer::new(TypeCaster::new(self.cast_untyped_columns))
    }
}

fn is_blank(value: &Option<String>) -> bool {
    value.as_deref().map_or(true, str::is_empty)
}

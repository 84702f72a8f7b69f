//! Configuration management.
//!
//! Configuration is resolved in this order, later sources winning:
//!
//! 1. Built-in defaults
//! 2. The config file (`--config`, `SNIPPETS_CONFIG_PATH`, or the platform config dir)
//! 3. Environment variables (`SNIPPETS_DATABASE_URL`, `SNIPPETS_TABLE`,
//!    `SNIPPETS_LOG_FILE`, `SNIPPETS_LOG_FORMAT`, `SNIPPETS_LOG`)
//! 4. The `--database` command-line flag
//!
//! ```toml
//! [database]
//! url = "snippets.db"
//! table = "snippets"
//! create_table = true
//!
//! [logging]
//! file = "snippets.log"
//! format = "pretty"
//! filter = "debug"
//! ```

use crate::observability::LogFormat;
use crate::{Error, Result};
use regex::Regex;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

/// Environment variable naming a config file.
pub const CONFIG_PATH_ENV: &str = "SNIPPETS_CONFIG_PATH";
/// Environment variable overriding the database URL.
pub const DATABASE_URL_ENV: &str = "SNIPPETS_DATABASE_URL";
/// Environment variable overriding the table name.
pub const TABLE_ENV: &str = "SNIPPETS_TABLE";
/// Environment variable overriding the log file.
pub const LOG_FILE_ENV: &str = "SNIPPETS_LOG_FILE";
/// Environment variable overriding the log format.
pub const LOG_FORMAT_ENV: &str = "SNIPPETS_LOG_FORMAT";
/// Environment variable overriding the log filter directive.
pub const LOG_FILTER_ENV: &str = "SNIPPETS_LOG";

/// Default table name.
pub const DEFAULT_TABLE: &str = "snippets";

/// PostgreSQL's identifier length limit, applied to both backends.
const MAX_IDENTIFIER_LEN: usize = 63;

static IDENTIFIER_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    #[allow(clippy::expect_used)]
    Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("static identifier regex")
});

/// Main configuration for snippets.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SnippetsConfig {
    /// Database settings.
    pub database: DatabaseSettings,
    /// Logging settings.
    pub logging: LoggingSettings,
}

/// Database connection settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatabaseSettings {
    /// `SQLite` path (or `:memory:`), or a `postgres://` URL.
    pub url: String,
    /// Table holding the snippets.
    pub table: String,
    /// Whether to create the table when it does not exist.
    pub create_table: bool,
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        Self {
            url: "snippets.db".to_string(),
            table: DEFAULT_TABLE.to_string(),
            create_table: true,
        }
    }
}

/// Backend selected by a database URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DatabaseBackend {
    /// `SQLite` database file, or `:memory:`.
    Sqlite(PathBuf),
    /// PostgreSQL connection URL.
    Postgres(String),
}

impl DatabaseSettings {
    /// Returns the backend implied by the URL scheme.
    #[must_use]
    pub fn backend(&self) -> DatabaseBackend {
        let url = self.url.trim();
        if url.starts_with("postgres://") || url.starts_with("postgresql://") {
            return DatabaseBackend::Postgres(url.to_string());
        }
        let path = url.strip_prefix("sqlite://").unwrap_or(url);
        DatabaseBackend::Sqlite(PathBuf::from(path))
    }

    /// Validates the settings.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidInput`] if the table name is not a plain SQL identifier.
    pub fn validate(&self) -> Result<()> {
        validate_table_name(&self.table)
    }
}

/// Logging settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggingSettings {
    /// Log file the subscriber appends to.
    pub file: PathBuf,
    /// Output format.
    pub format: LogFormat,
    /// `EnvFilter` directive, e.g. `debug` or `snippets=info`.
    pub filter: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            file: PathBuf::from("snippets.log"),
            format: LogFormat::Pretty,
            filter: "debug".to_string(),
        }
    }
}

/// Configuration file structure (for TOML parsing).
#[derive(Debug, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    /// Database section.
    pub database: Option<ConfigFileDatabase>,
    /// Logging section.
    pub logging: Option<ConfigFileLogging>,
}

/// Database section in config file.
#[derive(Debug, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct ConfigFileDatabase {
    /// Database URL or path.
    pub url: Option<String>,
    /// Table name.
    pub table: Option<String>,
    /// Create the table if missing.
    pub create_table: Option<bool>,
}

/// Logging section in config file.
#[derive(Debug, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct ConfigFileLogging {
    /// Log file path.
    pub file: Option<String>,
    /// Log format: "pretty" or "json".
    pub format: Option<String>,
    /// Filter directive.
    pub filter: Option<String>,
}

impl SnippetsConfig {
    /// Loads configuration from a file path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| Error::OperationFailed {
            operation: "read_config_file".to_string(),
            cause: format!("{}: {e}", path.display()),
        })?;

        Self::parse_toml(&contents)
    }

    /// Parses configuration from TOML text.
    ///
    /// # Errors
    ///
    /// Returns an error if the text is not valid TOML, has unknown keys, or
    /// holds an invalid value.
    pub fn parse_toml(contents: &str) -> Result<Self> {
        let file: ConfigFile = toml::from_str(contents).map_err(|e| Error::OperationFailed {
            operation: "parse_config_file".to_string(),
            cause: e.to_string(),
        })?;

        Self::from_config_file(file)
    }

    /// Returns the default config file location, if a home directory is known.
    ///
    /// `~/.config/snippets/config.toml` on Linux, the platform config dir elsewhere.
    #[must_use]
    pub fn default_path() -> Option<PathBuf> {
        directories::BaseDirs::new()
            .map(|dirs| dirs.config_dir().join("snippets").join("config.toml"))
    }

    /// Loads configuration from the default location.
    ///
    /// A missing file yields the defaults; an unreadable or invalid file is an error.
    ///
    /// # Errors
    ///
    /// Returns an error if the default config file exists but cannot be loaded.
    pub fn load_default() -> Result<Self> {
        match Self::default_path() {
            Some(path) if path.exists() => Self::load_from_file(&path),
            _ => Ok(Self::default()),
        }
    }

    /// Loads configuration for the command line.
    ///
    /// Uses `path` when given, then [`CONFIG_PATH_ENV`], then the default
    /// location, and finally applies environment overrides.
    ///
    /// # Errors
    ///
    /// Returns an error if a config file cannot be loaded or an override is invalid.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = if let Some(config_path) = path {
            Self::load_from_file(config_path)?
        } else if let Some(config_path) = std::env::var(CONFIG_PATH_ENV)
            .ok()
            .filter(|p| !p.trim().is_empty())
        {
            Self::load_from_file(Path::new(&config_path))?
        } else {
            Self::load_default()?
        };

        config.apply_overrides(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// Applies overrides from a variable lookup (normally the process environment).
    ///
    /// Empty values are ignored.
    ///
    /// # Errors
    ///
    /// Returns an error if an overridden value is invalid.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(url) = get(DATABASE_URL_ENV) {
            self.database.url = url;
        }
        if let Some(table) = get(TABLE_ENV) {
            self.database.table = table;
        }
        if let Some(file) = get(LOG_FILE_ENV) {
            self.logging.file = PathBuf::from(file);
        }
        if let Some(format) = get(LOG_FORMAT_ENV) {
            self.logging.format = format.parse()?;
        }
        if let Some(filter) = get(LOG_FILTER_ENV).or_else(|| get("RUST_LOG")) {
            self.logging.filter = filter;
        }

        self.database.validate()
    }

    /// Converts a `ConfigFile` to `SnippetsConfig`.
    fn from_config_file(file: ConfigFile) -> Result<Self> {
        let mut config = Self::default();

        if let Some(database) = file.database {
            if let Some(url) = database.url {
                config.database.url = url;
            }
            if let Some(table) = database.table {
                config.database.table = table;
            }
            if let Some(create_table) = database.create_table {
                config.database.create_table = create_table;
            }
        }
        if let Some(logging) = file.logging {
            if let Some(file) = logging.file {
                config.logging.file = PathBuf::from(file);
            }
            if let Some(format) = logging.format {
                config.logging.format = format.parse()?;
            }
            if let Some(filter) = logging.filter {
                config.logging.filter = filter;
            }
        }

        config.database.validate()?;
        Ok(config)
    }

    /// Sets the database URL.
    #[must_use]
    pub fn with_database_url(mut self, url: impl Into<String>) -> Self {
        self.database.url = url.into();
        self
    }

    /// Sets the table name.
    #[must_use]
    pub fn with_table(mut self, table: impl Into<String>) -> Self {
        self.database.table = table.into();
        self
    }
}

/// Checks that a table name can be interpolated into statement text.
///
/// # Errors
///
/// Returns [`Error::InvalidInput`] unless the name matches `[A-Za-z_][A-Za-z0-9_]*`
/// and is at most 63 bytes long.
pub fn validate_table_name(name: &str) -> Result<()> {
    if name.len() <= MAX_IDENTIFIER_LEN && IDENTIFIER_PATTERN.is_match(name) {
        Ok(())
    } else {
        Err(Error::InvalidInput(format!(
            "table name {name:?} must be a plain SQL identifier"
        )))
    }
}

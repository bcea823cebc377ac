use clap::ValueEnum;
use deadpool_postgres::Config as PgConfig;

use crate::error::DoodleDbError;

/// Database the app always talks to.
pub const DEFAULT_DBNAME: &str = "doodle";
pub const DEFAULT_HOST: &str = "localhost";
pub const DEFAULT_PORT: u16 = 5432;

/// Whether connections are wrapped in TLS.
///
/// Parsed from the `SSL` variable, which historically held a bare boolean,
/// so `true`/`false` and `1`/`0` are accepted alongside the mode names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, ValueEnum)]
pub enum TlsMode {
    /// Plain TCP
    #[default]
    #[value(aliases = ["false", "0", "off"])]
    Disable,
    /// TLS via the platform's native stack
    #[value(aliases = ["true", "1", "on"])]
    Require,
}

impl TlsMode {
    /// Parse a raw flag value; an unset or blank flag means [`TlsMode::Disable`].
    ///
    /// # Errors
    /// Returns `DoodleDbError::ConfigError` for values that are neither a mode name nor a boolean.
    pub fn parse_flag(raw: Option<&str>) -> Result<Self, DoodleDbError> {
        match raw.map(str::trim) {
            None | Some("") => Ok(Self::Disable),
            Some(value) => <Self as ValueEnum>::from_str(value, true).map_err(|_| {
                DoodleDbError::ConfigError(format!("unrecognized SSL flag: {value}"))
            }),
        }
    }
}

/// Connection settings for the doodle database.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DoodleDbConfig {
    pub user: String,
    pub password: String,
    pub host: String,
    pub dbname: String,
    pub port: u16,
    pub tls: TlsMode,
}

impl DoodleDbConfig {
    /// Settings with the app's fixed database name and port.
    #[must_use]
    pub fn new(user: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            user: user.into(),
            password: password.into(),
            host: DEFAULT_HOST.to_string(),
            dbname: DEFAULT_DBNAME.to_string(),
            port: DEFAULT_PORT,
            tls: TlsMode::Disable,
        }
    }

    /// Load from `DBUSER`, `DBPASS`, `DBHOST` and `SSL`.
    ///
    /// # Errors
    /// Returns `DoodleDbError::ConfigError` if a required variable is missing or `SSL` is malformed.
    pub fn from_env() -> Result<Self, DoodleDbError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`DoodleDbConfig::from_env`] but reads through `lookup`, which keeps
    /// the process environment out of tests.
    ///
    /// # Errors
    /// Returns `DoodleDbError::ConfigError` if a required variable is missing or `SSL` is malformed.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, DoodleDbError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &str| {
            lookup(key)
                .filter(|v| !v.is_empty())
                .ok_or_else(|| DoodleDbError::ConfigError(format!("{key} is required")))
        };

        let mut cfg = Self::new(required("DBUSER")?, required("DBPASS")?);
        if let Some(host) = lookup("DBHOST").filter(|h| !h.trim().is_empty()) {
            cfg.host = host;
        }
        cfg.tls = TlsMode::parse_flag(lookup("SSL").as_deref())?;
        Ok(cfg)
    }

    /// Translate into the pool's configuration.
    ///
    /// # Errors
    /// Returns `DoodleDbError::ConfigError` if a field the pool needs is blank.
    pub fn to_pg_config(&self) -> Result<PgConfig, DoodleDbError> {
        for (name, value) in [
            ("user", &self.user),
            ("host", &self.host),
            ("dbname", &self.dbname),
        ] {
            if value.trim().is_empty() {
                return Err(DoodleDbError::ConfigError(format!("{name} is required")));
            }
        }

        let mut pg = PgConfig::new();
        pg.user = Some(self.user.clone());
        pg.password = Some(self.password.clone());
        pg.host = Some(self.host.clone());
        pg.dbname = Some(self.dbname.clone());
        pg.port = Some(self.port);
        pg.ssl_mode = Some(match self.tls {
            TlsMode::Disable => deadpool_postgres::SslMode::Disable,
            TlsMode::Require => deadpool_postgres::SslMode::Require,
        });
        Ok(pg)
    }
}

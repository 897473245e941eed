use crate::{Connection, Error, Result};
use anyhow::Context;
use serde::Deserialize;
use std::{fs, path::Path};

/// Connection configuration, in TOML.
///
/// Every connection lives under a key and is resolved through `<key>.url`,
/// `<key>.username` and `<key>.password`, either as dotted keys or as a table.
///
/// ```toml
/// # in memory database
/// memory.url = "sqlite://:memory:"
///
/// [db]
/// url = "sqlite://target/data.sqlite"
/// username = "admin"
/// ```
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Properties {
    table: toml::Table,
}

impl Properties {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)
            .with_context(|| format!("While reading the properties file {}", path.display()))?;
        Self::parse(&text)
            .with_context(|| format!("While loading the properties file {}", path.display()))
    }

    pub fn parse(text: &str) -> anyhow::Result<Self> {
        let table = toml::from_str(text).context("While parsing the properties")?;
        Ok(Self { table })
    }

    /// Value at a dotted `key`, walking nested tables.
    pub fn get(&self, key: &str) -> Option<&toml::Value> {
        let mut parts = key.split('.');
        let mut value = self.table.get(parts.next()?)?;
        for part in parts {
            value = value.as_table()?.get(part)?;
        }
        Some(value)
    }

    /// Assigns a dotted `key`, creating the intermediate tables.
    pub fn set(&mut self, key: &str, value: impl Into<toml::Value>) {
        let mut table = &mut self.table;
        let mut parts = key.split('.').peekable();
        while let Some(part) = parts.next() {
            if parts.peek().is_none() {
                table.insert(part.to_string(), value.into());
                return;
            }
            let entry = table
                .entry(part)
                .or_insert(toml::Value::Table(toml::Table::new()));
            if !entry.is_table() {
                *entry = toml::Value::Table(toml::Table::new());
            }
            let toml::Value::Table(next) = entry else {
                unreachable!();
            };
            table = next;
        }
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    /// Resolves the connection settings stored under `key`.
    ///
    /// The url is required, the credentials default to empty strings.
    pub fn connection_settings(&self, key: &str) -> Result<ConnectionSettings> {
        let Some(value) = self.get(key) else {
            return Err(Error::ConnectionError {
                message: format!("No `{key}` connection is configured"),
            });
        };
        let settings: ConnectionSettings =
            value
                .clone()
                .try_into()
                .map_err(|e| Error::ConnectionError {
                    message: format!("Invalid `{key}` connection settings: {e}"),
                })?;
        if settings.url.is_empty() {
            return Err(Error::ConnectionError {
                message: format!("The `{key}.url` property is empty"),
            });
        }
        Ok(settings)
    }
}

/// Everything needed to open a connection.
#[derive(Clone, PartialEq, Eq, Deserialize)]
pub struct ConnectionSettings {
    pub url: String,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

impl ConnectionSettings {
    pub fn connect<C: Connection>(&self) -> Result<C> {
        C::connect(&self.url).map_err(|e| {
            log::error!("{:#}", e);
            Error::ConnectionError {
                message: format!("{:#}", e),
            }
        })
    }
}

impl std::fmt::Debug for ConnectionSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectionSettings")
            .field("url", &self.url)
            .field("username", &self.username)
            .field("password", &"***")
            .finish()
    }
}

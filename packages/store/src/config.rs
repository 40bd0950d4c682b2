//! # Storage configuration (`notelist.toml`)
//!
//! Defines the TOML configuration file that names every place the note list
//! persists data (filename: [`StoreConfig::filename`] = `"notelist.toml"`).
//! The values here are *names only*: which database, which table, which
//! key-value slot, which cookie. Schema shape and versioning are owned by the
//! backends themselves.
//!
//! ## Structure
//!
//! ```toml
//! [database]
//! name = "notelist"       # database name (native: file "<name>.db")
//! table = "notes"         # table / object-store holding the notes
//!
//! [simple]
//! key = "notelist"        # key-value slot holding the serialized note set
//!
//! [cookie]
//! name = "draft"          # cookie remembering the not-yet-saved input text
//! path = "/"
//! ```
//!
//! All structs derive `Default` (with the production names above) so that a
//! missing or partial config file is equivalent to the default configuration.

use serde::{Deserialize, Serialize};

/// Top-level configuration stored in `notelist.toml`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct StoreConfig {
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub simple: SimpleConfig,
    #[serde(default)]
    pub cookie: CookieConfig,
}

/// Structured-database section.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Database name. On native targets this becomes the file `<name>.db`
    /// inside the chosen base directory; in the browser it is the IndexedDB
    /// database name.
    #[serde(default = "default_database_name")]
    pub name: String,
    /// Table (object store) that holds the notes.
    #[serde(default = "default_table")]
    pub table: String,
}

/// Simple key-value backend section.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SimpleConfig {
    /// The single key under which the whole note set is serialized.
    #[serde(default = "default_simple_key")]
    pub key: String,
}

/// Draft-cookie section.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CookieConfig {
    /// Cookie name for the last-typed, not-yet-saved input text.
    #[serde(default = "default_cookie_name")]
    pub name: String,
    /// Cookie path attribute.
    #[serde(default = "default_cookie_path")]
    pub path: String,
}

fn default_database_name() -> String {
    "notelist".to_string()
}

fn default_table() -> String {
    "notes".to_string()
}

fn default_simple_key() -> String {
    "notelist".to_string()
}

fn default_cookie_name() -> String {
    "draft".to_string()
}

fn default_cookie_path() -> String {
    "/".to_string()
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            name: default_database_name(),
            table: default_table(),
        }
    }
}

impl Default for SimpleConfig {
    fn default() -> Self {
        Self {
            key: default_simple_key(),
        }
    }
}

impl Default for CookieConfig {
    fn default() -> Self {
        Self {
            name: default_cookie_name(),
            path: default_cookie_path(),
        }
    }
}

impl StoreConfig {
    /// The well-known filename for the config file.
    pub fn filename() -> &'static str {
        "notelist.toml"
    }

    /// Parse from TOML string.
    pub fn from_toml(s: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(s)
    }

    /// Serialize to TOML string.
    pub fn to_toml(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_names() {
        let config = StoreConfig::default();
        assert_eq!(StoreConfig::filename(), "notelist.toml");
        assert_eq!(config.database.name, "notelist");
        assert_eq!(config.database.table, "notes");
        assert_eq!(config.simple.key, "notelist");
        assert_eq!(config.cookie.name, "draft");
        assert_eq!(config.cookie.path, "/");
    }

    #[test]
    fn test_toml_roundtrip() {
        let mut config = StoreConfig::default();
        config.database.name = "scratch".to_string();
        config.cookie.name = "last-input".to_string();

        let text = config.to_toml().unwrap();
        let parsed = StoreConfig::from_toml(&text).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn test_partial_file_falls_back_to_defaults() {
        let parsed = StoreConfig::from_toml("[cookie]\nname = \"area\"\n").unwrap();
        assert_eq!(parsed.cookie.name, "area");
        assert_eq!(parsed.cookie.path, "/");
        assert_eq!(parsed.database, DatabaseConfig::default());
        assert_eq!(parsed.simple, SimpleConfig::default());
    }
}

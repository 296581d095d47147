//! Layered settings: YAML files, then `.env` files, then the process environment.

mod loader;
pub mod value;

use std::fmt;
use std::ops::Deref;
use std::path::Path;

use loader::Entries;
pub use value::{ConfigValue, FromConfigValue};

/// Overrides the profile passed to [`DevConfig::load`].
pub const PROFILE_ENV: &str = "DEVCAMPER_PROFILE";

#[derive(Debug)]
pub enum ConfigError {
    NotFound(String),
    TypeMismatch { key: String, expected: &'static str },
    /// Unreadable file or malformed YAML.
    Load(String),
    Invalid { key: String, message: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::NotFound(key) => write!(f, "missing setting `{key}`"),
            ConfigError::TypeMismatch { key, expected } => write!(f, "setting `{key}` is not a valid {expected}"),
            ConfigError::Load(detail) => write!(f, "cannot read settings: {detail}"),
            ConfigError::Invalid { key, message } => write!(f, "setting `{key}` rejected: {message}"),
        }
    }
}

impl std::error::Error for ConfigError {}

/// Settings struct assembled from the flat entries of a [`DevConfig`].
pub trait ConfigProperties: Sized {
    fn from_config(config: &DevConfig) -> Result<Self, ConfigError>;
}

/// Flat `section.key` settings plus an optional typed view `T`.
///
/// Later sources win:
///
/// | source | example |
/// |---|---|
/// | `application.yaml` | `jwt: { secret: ... }` |
/// | `application-{profile}.yaml` | |
/// | `.env`, `.env.{profile}` | `JWT_SECRET=...` |
/// | process environment | `JWT_SECRET=...` |
///
/// Dotenv files only fill variables the environment does not already carry.
/// Environment names map to keys by lowercasing and turning `_` into `.`.
#[derive(Debug, Clone)]
pub struct DevConfig<T = ()> {
    entries: Entries,
    profile: String,
    typed: T,
}

impl DevConfig {
    pub fn load(profile: &str) -> Result<Self, ConfigError> {
        Self::load_from(Path::new("."), profile)
    }

    pub fn load_from(dir: &Path, profile: &str) -> Result<Self, ConfigError> {
        let profile = std::env::var(PROFILE_ENV).unwrap_or_else(|_| profile.to_owned());

        let mut entries = Entries::new();
        for file in ["application.yaml".to_owned(), format!("application-{profile}.yaml")] {
            loader::merge_file(&dir.join(file), &mut entries)?;
        }
        for file in [".env".to_owned(), format!(".env.{profile}")] {
            load_dotenv(&dir.join(file))?;
        }
        overlay_environment(&mut entries);

        tracing::debug!(%profile, entries = entries.len(), "settings loaded");
        Ok(DevConfig { entries, profile, typed: () })
    }

    pub fn from_yaml_str(yaml: &str, profile: &str) -> Result<Self, ConfigError> {
        let mut entries = Entries::new();
        loader::merge_str(yaml, &mut entries)?;
        Ok(DevConfig { entries, profile: profile.to_owned(), typed: () })
    }

    /// No entries, `test` profile.
    pub fn empty() -> Self {
        DevConfig { entries: Entries::new(), profile: "test".to_owned(), typed: () }
    }

    pub fn set(&mut self, key: &str, value: ConfigValue) {
        self.entries.insert(key.to_owned(), value);
    }

    pub fn with_typed<C: ConfigProperties>(self) -> Result<DevConfig<C>, ConfigError> {
        let typed = C::from_config(&self)?;
        let DevConfig { entries, profile, .. } = self;
        Ok(DevConfig { entries, profile, typed })
    }
}

/// Fill unset variables from a dotenv file. Only a missing file is skipped.
fn load_dotenv(path: &Path) -> Result<(), ConfigError> {
    match dotenvy::from_path(path) {
        Ok(()) => Ok(()),
        Err(dotenvy::Error::Io(e)) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(ConfigError::Load(format!("{}: {e}", path.display()))),
    }
}

fn overlay_environment(entries: &mut Entries) {
    for (name, raw) in std::env::vars() {
        entries.insert(name.to_lowercase().replace('_', "."), ConfigValue::Text(raw));
    }
}

impl<T> DevConfig<T> {
    pub fn get<V: FromConfigValue>(&self, key: &str) -> Result<V, ConfigError> {
        match self.entries.get(key) {
            Some(raw) => V::from_config_value(raw, key),
            None => Err(ConfigError::NotFound(key.to_owned())),
        }
    }

    /// Like [`get`](Self::get) but falls back to `default` when the key is absent.
    /// A present but unconvertible entry is still an error.
    pub fn get_or<V: FromConfigValue>(&self, key: &str, default: V) -> Result<V, ConfigError> {
        if self.entries.contains_key(key) {
            self.get(key)
        } else {
            Ok(default)
        }
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn profile(&self) -> &str {
        &self.profile
    }

    pub fn typed(&self) -> &T {
        &self.typed
    }
}

impl<T> Deref for DevConfig<T> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        self.typed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Server {
        port: u16,
        debug: bool,
    }

    impl ConfigProperties for Server {
        fn from_config(config: &DevConfig) -> Result<Self, ConfigError> {
            Ok(Server {
                port: config.get_or("server.port", 5000)?,
                debug: config.get_or("server.debug", false)?,
            })
        }
    }

    #[test]
    fn typed_layer_reads_raw_values() {
        let config = DevConfig::from_yaml_str("server:\n  port: 8080\n", "test")
            .unwrap()
            .with_typed::<Server>()
            .unwrap();
        assert_eq!(config.port, 8080);
        assert!(!config.debug);
        assert_eq!(config.get::<String>("server.port").unwrap(), "8080");
        assert!(config.contains_key("server.port"));
    }

    #[test]
    fn missing_key_is_not_found() {
        let config = DevConfig::empty();
        assert!(matches!(config.get::<String>("jwt.secret"), Err(ConfigError::NotFound(_))));
    }

    #[test]
    fn wrong_type_is_reported_even_with_default() {
        let mut config = DevConfig::empty();
        config.set("server.port", ConfigValue::Text("http".into()));
        assert!(matches!(
            config.get_or::<u16>("server.port", 5000),
            Err(ConfigError::TypeMismatch { .. })
        ));
    }

    #[test]
    fn text_values_coerce_to_bool() {
        let mut config = DevConfig::empty();
        config.set("logging.http", ConfigValue::Text("yes".into()));
        assert!(config.get::<bool>("logging.http").unwrap());
    }

    #[test]
    fn broken_dotenv_files_fail_loading() {
        let dir = std::env::temp_dir().join(format!("devcamper-dotenv-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join(".env"), "this line has no equals sign\n").unwrap();

        let err = DevConfig::load_from(&dir, "cfgtest").unwrap_err();
        assert!(matches!(err, ConfigError::Load(ref msg) if msg.contains(".env")), "{err}");

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn missing_dotenv_files_are_skipped() {
        load_dotenv(Path::new("does-not-exist/.env")).unwrap();
    }

    #[test]
    fn environment_names_become_dotted_keys() {
        let mut entries = Entries::new();
        std::env::set_var("DEVCAMPER_CFGTEST_SECRET", "s3cret");
        overlay_environment(&mut entries);
        assert_eq!(
            entries.get("devcamper.cfgtest.secret"),
            Some(&ConfigValue::Text("s3cret".into()))
        );
    }
}

use devcamper_core::{ConfigError, ConfigProperties, DevConfig};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    Memory,
    Sqlite,
}

/// Typed application settings, read from the layered [`DevConfig`].
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub jwt_secret: String,
    pub jwt_issuer: String,
    /// Token and cookie lifetime in days.
    pub jwt_expire_days: i64,
    pub store_backend: StoreBackend,
    pub store_url: String,
    /// Log every request through the tower-http trace layer.
    pub http_logging: bool,
    /// Base URL for password reset links. Falls back to the request's host.
    pub reset_url: Option<String>,
    /// Mark the token cookie `Secure`.
    pub secure_cookies: bool,
}

impl ConfigProperties for AppConfig {
    fn from_config(config: &DevConfig) -> Result<Self, ConfigError> {
        let backend: String = config.get_or("store.backend", "memory".to_string())?;
        let store_backend = match backend.as_str() {
            "memory" => StoreBackend::Memory,
            "sqlite" => StoreBackend::Sqlite,
            other => {
                return Err(ConfigError::Invalid {
                    key: "store.backend".into(),
                    message: format!("unknown backend '{other}', expected memory or sqlite"),
                })
            }
        };
        let jwt_expire_days: i64 = config.get_or("jwt.expire", 30)?;
        if jwt_expire_days < 1 {
            return Err(ConfigError::Invalid {
                key: "jwt.expire".into(),
                message: "must be at least one day".into(),
            });
        }
        let production = config.profile() == "production";

        Ok(AppConfig {
            host: config.get_or("server.host", "0.0.0.0".to_string())?,
            port: config.get_or("server.port", 5000)?,
            jwt_secret: config.get("jwt.secret")?,
            jwt_issuer: config.get_or("jwt.issuer", "devcamper".to_string())?,
            jwt_expire_days,
            store_backend,
            store_url: config.get_or("store.url", "sqlite://devcamper.db".to_string())?,
            http_logging: config.get_or("logging.http", config.profile() == "dev")?,
            reset_url: config.get_or("app.reseturl", None)?,
            secure_cookies: production,
        })
    }
}

impl AppConfig {
    /// Settings for tests and tools: in-memory store, fixed secret.
    pub fn for_tests() -> Self {
        AppConfig {
            host: "127.0.0.1".into(),
            port: 0,
            jwt_secret: "devcamper-test-secret".into(),
            jwt_issuer: "devcamper".into(),
            jwt_expire_days: 30,
            store_backend: StoreBackend::Memory,
            store_url: String::new(),
            http_logging: false,
            reset_url: Some("http://localhost:5000".into()),
            secure_cookies: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_apply_around_the_required_secret() {
        let config = DevConfig::from_yaml_str("jwt:\n  secret: s3cret\n", "dev")
            .unwrap()
            .with_typed::<AppConfig>()
            .unwrap();
        assert_eq!(config.port, 5000);
        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.jwt_expire_days, 30);
        assert_eq!(config.store_backend, StoreBackend::Memory);
        assert!(config.http_logging);
        assert!(config.reset_url.is_none());
    }

    #[test]
    fn missing_secret_is_an_error() {
        let err = DevConfig::from_yaml_str("server:\n  port: 8080\n", "dev")
            .unwrap()
            .with_typed::<AppConfig>()
            .unwrap_err();
        assert!(matches!(err, ConfigError::NotFound(key) if key == "jwt.secret"));
    }

    #[test]
    fn unknown_backend_is_rejected() {
        let yaml = "jwt:\n  secret: x\nstore:\n  backend: mongo\n";
        let err = DevConfig::from_yaml_str(yaml, "dev")
            .unwrap()
            .with_typed::<AppConfig>()
            .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { .. }));
    }

    #[test]
    fn production_profile_secures_cookies_and_quiets_http_logs() {
        let config = DevConfig::from_yaml_str("jwt:\n  secret: x\n  expire: 7\n", "production")
            .unwrap()
            .with_typed::<AppConfig>()
            .unwrap();
        assert!(config.secure_cookies);
        assert!(!config.http_logging);
        assert_eq!(config.jwt_expire_days, 7);
    }
}

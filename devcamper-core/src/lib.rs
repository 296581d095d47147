pub mod config;
pub mod error;
pub mod layers;
pub mod validation;

pub use config::{ConfigError, ConfigProperties, ConfigValue, DevConfig, FromConfigValue};
pub use error::{error_response, AppError};
pub use layers::{api_cors, catch_panic_layer, http_trace, init_tracing};
pub use validation::{validate, ValidJson, Validate};

/// Re-export of the HTTP toolkit so downstream crates use the same version.
pub use axum;

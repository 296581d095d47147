use std::sync::Arc;

use devcamper_core::axum::extract::FromRef;
use devcamper_security::{JwtService, SecurityConfig};

use crate::config::AppConfig;
use crate::mailer::{LogMailer, Mailer};
use crate::store::Store;

/// Shared handles every handler can reach.
#[derive(Clone)]
pub struct AppState {
    pub store: Store,
    pub jwt: Arc<JwtService>,
    pub mailer: Arc<dyn Mailer>,
    pub config: Arc<AppConfig>,
}

impl AppState {
    pub fn new(config: AppConfig, store: Store) -> Self {
        let security = SecurityConfig::new(config.jwt_secret.clone())
            .with_issuer(config.jwt_issuer.clone())
            .with_expire_days(config.jwt_expire_days);
        Self {
            store,
            jwt: Arc::new(JwtService::new(security)),
            mailer: Arc::new(LogMailer),
            config: Arc::new(config),
        }
    }

    pub fn with_mailer(mut self, mailer: Arc<dyn Mailer>) -> Self {
        self.mailer = mailer;
        self
    }
}

impl FromRef<AppState> for Arc<JwtService> {
    fn from_ref(state: &AppState) -> Self {
        state.jwt.clone()
    }
}

pub mod auth;
pub mod config;
pub mod controllers;
pub mod mailer;
pub mod models;
pub mod seed;
pub mod state;
pub mod store;

use devcamper_core::axum::http::Uri;
use devcamper_core::axum::Router;
use devcamper_core::{api_cors, catch_panic_layer, http_trace, AppError};

pub use config::AppConfig;
pub use state::AppState;
pub use store::Store;

/// Every resource router, mounted under `/api/v1`, plus the shared layers.
pub fn app(state: AppState) -> Router {
    let api = Router::new()
        .nest("/bootcamps", controllers::bootcamps::routes())
        .nest("/courses", controllers::courses::routes())
        .nest("/reviews", controllers::reviews::routes())
        .nest("/auth", controllers::auth::routes())
        .nest("/users", controllers::users::routes());

    let http_logging = state.config.http_logging;
    let mut router = Router::new()
        .nest("/api/v1", api)
        .fallback(route_not_found)
        .with_state(state)
        .layer(catch_panic_layer())
        .layer(api_cors());
    if http_logging {
        router = router.layer(http_trace());
    }
    router
}

async fn route_not_found(uri: Uri) -> AppError {
    AppError::not_found(format!("Route {} not found", uri.path()))
}

#![allow(dead_code)]

use std::path::Path;
use std::sync::Arc;

use devcamper::mailer::MemoryMailer;
use devcamper::seed::{self, SeedData};
use devcamper::{app, AppConfig, AppState, Store};
use devcamper_test::TestApp;

pub const ADMIN: &str = "5d7a514b5d2c12c7449be042";
pub const PUBLISHER: &str = "5d7a514b5d2c12c7449be043";
pub const USER: &str = "5d7a514b5d2c12c7449be044";
/// Publisher who owns Devworks.
pub const JOHN: &str = "5d7a514b5d2c12c7449be045";
/// Plain user who owns ModernTech.
pub const KEVIN: &str = "5d7a514b5d2c12c7449be046";

pub const DEVWORKS: &str = "5d713995b721c3bb38c1f5d0";
pub const MODERNTECH: &str = "5d713a66ec8f2b88b8f830b8";
pub const CODEMASTERS: &str = "5d725a037b292f5f8ceff787";
pub const DEVCENTRAL: &str = "5d725a1b7b292f5f8ceff788";

pub const DEVWORKS_FRONT_END: &str = "5d725a4a7b292f5f8ceff789";
pub const MODERNTECH_UI_UX: &str = "5d725cd2c4ded7bcb480eaa2";

/// USER's review of Devworks.
pub const USER_REVIEW: &str = "5d7a514b5d2c12c7449be020";

pub const MISSING_ID: &str = "5d713995b721c3bb38c1f5ff";

pub struct Harness {
    pub app: TestApp,
    pub state: AppState,
    pub mailer: Arc<MemoryMailer>,
}

impl Harness {
    pub fn token(&self, user_id: &str) -> String {
        self.state.jwt.sign(user_id).unwrap()
    }
}

/// The sample data set in an in-memory store. Seeded accounts have no
/// password; tests that log in register their own account.
pub async fn seeded() -> Harness {
    seeded_with(Arc::new(MemoryMailer::new())).await
}

pub async fn seeded_with(mailer: Arc<MemoryMailer>) -> Harness {
    let store = Store::memory();
    let dir = Path::new(env!("CARGO_MANIFEST_DIR")).join("_data");
    let mut data = SeedData::load(&dir).await.unwrap();
    for user in &mut data.users {
        user.remove("password");
    }
    seed::import(&store, data).await.unwrap();

    let state = AppState::new(AppConfig::for_tests(), store).with_mailer(mailer.clone());
    Harness {
        app: TestApp::new(app(state.clone())),
        state,
        mailer,
    }
}

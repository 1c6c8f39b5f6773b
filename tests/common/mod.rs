// SPDX-License-Identifier: MIT OR Apache-2.0

//! Shared helpers for partner API tests.
//!
//! Sets up wiremock servers with common login and order-list responses.

#![allow(dead_code)]

use std::sync::Once;
use std::time::Duration;

use orderdash_core::auth::{RefreshMode, TokenManager};
use orderdash_core::config::PartnerConfig;
use serde_json::{json, Value};
use tracing::Level;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const LOGIN_PATH: &str = "/auth/poc-orderlist/login";
pub const CLIENT_ID: &str = "dashboard-test";
pub const CLIENT_SECRET: &str = "test-secret";

static INIT: Once = Once::new();

/// Route crate logs to the test writer.
pub fn init_tracing() {
    INIT.call_once(|| {
        tracing_subscriber::fmt()
            .with_max_level(Level::DEBUG)
            .with_test_writer()
            .try_init()
            .ok();
    });
}

/// Partner config pointing at `server`.
pub fn config_for(server: &MockServer) -> PartnerConfig {
    PartnerConfig::new(server.uri(), CLIENT_ID, CLIENT_SECRET)
}

/// Manager with a private cache pointing at `server`.
pub fn manager_for(server: &MockServer) -> TokenManager {
    TokenManager::new(config_for(server)).expect("valid test config")
}

/// Manager in single-flight mode pointing at `server`.
pub fn single_flight_manager_for(server: &MockServer) -> TokenManager {
    TokenManager::builder(config_for(server))
        .refresh_mode(RefreshMode::SingleFlight)
        .build()
        .expect("valid test config")
}

/// Login endpoint returning `body` with status 200.
pub fn login_ok(body: Value) -> Mock {
    Mock::given(method("POST"))
        .and(path(LOGIN_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
}

/// Mount a login endpoint issuing `token`, expecting exactly `times` calls.
pub async fn mock_login(server: &MockServer, token: &str, times: u64) {
    login_ok(json!({ "token": token, "expires_in": 3600 }))
        .expect(times)
        .mount(server)
        .await;
}

/// Mount a login endpoint that issues `first` once, then `second`.
pub async fn mock_rotating_login(server: &MockServer, first: &str, second: &str) {
    login_ok(json!({ "token": first }))
        .up_to_n_times(1)
        .mount(server)
        .await;
    login_ok(json!({ "token": second })).mount(server).await;
}

/// Mount a login endpoint that answers after `delay`.
pub async fn mock_slow_login(server: &MockServer, token: &str, delay: Duration) {
    Mock::given(method("POST"))
        .and(path(LOGIN_PATH))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "token": token }))
                .set_delay(delay),
        )
        .mount(server)
        .await;
}

/// A small order list: one breached, one approaching, one on track, one delivered.
pub fn sample_orders() -> Value {
    json!([
        {
            "id": "ORD-1",
            "status": "PROCESSING",
            "slaInfo": { "target_minutes": 300, "elapsed_minutes": 310, "status": "ACTIVE" }
        },
        {
            "id": "ORD-2",
            "status": "PICKING",
            "slaInfo": { "target_minutes": 300, "elapsed_minutes": 250, "status": "ACTIVE" }
        },
        {
            "id": "ORD-3",
            "status": "PACKED",
            "slaInfo": { "target_minutes": 600, "elapsed_minutes": 30, "status": "ACTIVE" }
        },
        {
            "id": "ORD-4",
            "status": "DELIVERED",
            "slaInfo": { "target_minutes": 300, "elapsed_minutes": 900, "status": "BREACH" }
        }
    ])
}

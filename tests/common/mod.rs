#![allow(dead_code)]

use std::sync::Arc;
use std::sync::atomic::{AtomicI64, Ordering};

use apikr::{Api, Clock, Configuration, Provider};
use serde_json::{Value, json};
use tracing_subscriber::EnvFilter;
use wiremock::MockServer;

pub const NOW: i64 = 1_700_000_000;
pub const TOKEN_LIFETIME: i64 = 1800;

pub const IMP_KEY: &str = "imp_apikey";
pub const IMP_SECRET: &str =
    "ekKoeW8RyKuT0zgaZsUtXXTLQ4AhPFW3ZGseDA6bkA5lamv9OqDMnxyeB9wqOsuO9W3Mx9YSJ4dTqJ3f";
pub const TMAP_KEY: &str = "c2e0150d-a4ba-391e-89ad-d8f74f167432";

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Clock the test can move forward.
#[derive(Clone)]
pub struct ManualClock(Arc<AtomicI64>);

impl ManualClock {
    pub fn new(now: i64) -> Self {
        Self(Arc::new(AtomicI64::new(now)))
    }

    pub fn advance(&self, secs: i64) {
        self.0.fetch_add(secs, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> i64 {
        self.0.load(Ordering::SeqCst)
    }
}

pub fn tmap_api(server: &MockServer) -> Api {
    init_tracing();
    let config = Configuration::new(
        Provider::TMap,
        [("apiKey", TMAP_KEY), ("baseUrl", server.uri().as_str())],
    )
    .unwrap();
    Api::new(config)
}

pub fn iamport_api(server: &MockServer, clock: &ManualClock) -> Api {
    init_tracing();
    let config = Configuration::new(
        Provider::Iamport,
        [
            ("impKey", IMP_KEY),
            ("impSecret", IMP_SECRET),
            ("baseUrl", server.uri().as_str()),
        ],
    )
    .unwrap();
    Api::builder(config).clock(clock.clone()).build()
}

/// Successful `/users/getToken` body.
pub fn token_body(token: &str) -> Value {
    json!({
        "code": 0,
        "message": null,
        "response": {
            "access_token": token,
            "now": NOW,
            "expired_at": NOW + TOKEN_LIFETIME
        }
    })
}

pub fn customer_body(uid: &str) -> Value {
    json!({
        "code": 0,
        "message": null,
        "response": {
            "customer_uid": uid,
            "card_name": "신한카드",
            "inserted": NOW,
            "updated": NOW
        }
    })
}

#![allow(dead_code)]

use pantry_service::config::{AdminConfig, PantryConfig, StorageConfig};
use pantry_service::services::init_metrics;
use pantry_service::startup::Application;
use reqwest::{Client, RequestBuilder, Response};
use rust_decimal::Decimal;
use secrecy::Secret;
use serde_json::{json, Value};
use service_core::config::Config;
use std::path::PathBuf;

pub const ADMIN_PASSWORD: &str = "test-password";
pub const ADMIN_HEADER: &str = "x-admin-password";

pub struct TestApp {
    pub http_address: String,
    pub http_port: u16,
    pub client: Client,
}

impl TestApp {
    /// Spawn with in-memory sheets.
    pub async fn spawn() -> Self {
        Self::spawn_with_data_dir(None).await
    }

    /// Spawn with CSV sheets under `data_dir` when given.
    pub async fn spawn_with_data_dir(data_dir: Option<PathBuf>) -> Self {
        init_metrics();

        let config = PantryConfig {
            common: Config {
                host: "127.0.0.1".to_string(),
                port: 0,
            },
            service_name: "pantry-service-test".to_string(),
            log_level: "warn".to_string(),
            otlp_endpoint: None,
            admin: AdminConfig {
                password: Secret::new(ADMIN_PASSWORD.to_string()),
            },
            storage: StorageConfig { data_dir },
            draft_ttl_minutes: 10,
        };

        let app = Application::build(config)
            .await
            .expect("Failed to build test application");

        let http_port = app.http_port();
        let http_address = format!("http://127.0.0.1:{}", http_port);

        tokio::spawn(async move {
            app.run_until_stopped().await.ok();
        });

        let client = Client::new();
        let health_url = format!("{}/health", http_address);
        for _ in 0..50 {
            if client.get(&health_url).send().await.is_ok() {
                break;
            }
            tokio::time::sleep(tokio::time::Duration::from_millis(50)).await;
        }

        TestApp {
            http_address,
            http_port,
            client,
        }
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.http_address, path)
    }

    /// Attach the admin password.
    pub fn admin(&self, request: RequestBuilder) -> RequestBuilder {
        request.header(ADMIN_HEADER, ADMIN_PASSWORD)
    }

    pub async fn admin_get(&self, path: &str) -> Response {
        self.admin(self.client.get(self.url(path)))
            .send()
            .await
            .expect("Failed to execute request")
    }

    pub async fn set_rate(&self, item: &str, rate: Decimal) {
        let response = self
            .admin(self.client.put(self.url("/rates")))
            .json(&json!({ "item": item, "rate": rate }))
            .send()
            .await
            .expect("Failed to execute request");
        assert!(
            response.status().is_success(),
            "setting rate for {} failed: {}",
            item,
            response.status()
        );
    }

    pub async fn record(&self, body: Value) -> Response {
        self.client
            .post(self.url("/entries"))
            .json(&body)
            .send()
            .await
            .expect("Failed to execute request")
    }

    /// Record an entry that must succeed.
    pub async fn record_ok(
        &self,
        date: &str,
        person_id: &str,
        coupon_id: &str,
        item: &str,
        quantity: u32,
        action: &str,
    ) -> Value {
        let response = self
            .record(entry_body(date, person_id, coupon_id, item, quantity, action))
            .await;
        assert_eq!(response.status().as_u16(), 201);
        response.json().await.expect("Failed to parse JSON")
    }
}

pub fn entry_body(
    date: &str,
    person_id: &str,
    coupon_id: &str,
    item: &str,
    quantity: u32,
    action: &str,
) -> Value {
    json!({
        "date": date,
        "person_id": person_id,
        "name": format!("Name {}", person_id),
        "coupon_id": coupon_id,
        "item": item,
        "quantity": quantity,
        "action": action,
        "pantry_handler": "Ravi"
    })
}

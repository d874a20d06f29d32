//! Shared test utilities for uptimex-cli integration tests

#![allow(dead_code)]

use std::time::Duration;
use uptimex_cli::client::ApiClient;

/// Create a test client pointing to a mock server
pub fn create_test_client(base_url: &str) -> ApiClient {
    ApiClient::with_base_url(base_url.to_string()).expect("Failed to create test client")
}

/// Create a test client with a short timeout (for timeout tests)
pub fn create_impatient_client(base_url: &str, timeout: Duration) -> ApiClient {
    ApiClient::with_timeout(base_url.to_string(), timeout).expect("Failed to create test client")
}

/// A minimal service payload as the API returns it.
pub fn service_json(id: &str, name: &str) -> serde_json::Value {
    serde_json::json!({
        "id": id,
        "name": name,
        "url": format!("https://{}.example.com", id),
        "isActive": true,
        "lastCheckSucceeded": false
    })
}

/// One group in an analyze response.
pub fn group_json(id: &str, name: &str, checks: usize) -> serde_json::Value {
    let items: Vec<serde_json::Value> = (0..checks)
        .map(|i| {
            serde_json::json!({
                "id": format!("{}-check-{}", id, i),
                "isHealthy": true,
                "responseTimeMs": 120,
                "isUnderSla": true,
                "httpStatusCode": 200,
                "errorMessage": null,
                "at": "2024-01-15T08:00:00Z"
            })
        })
        .collect();
    serde_json::json!({
        "monitoredServiceId": id,
        "monitoredServiceName": name,
        "items": items,
        "itemsCount": checks,
        "isUnderSlaItemsCount": checks,
        "isUpperThanSlaItemsCount": 0,
        "uptimePercentage": 100.0
    })
}

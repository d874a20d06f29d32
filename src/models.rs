//! Wire types for the UptimeX API.
//!
//! Field names follow the API's camelCase JSON. Timestamps are kept as the
//! strings the server sent; see [`crate::output::parse_api_timestamp`] for
//! display.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

/// Page size used by the report view. The server accepts others, the
/// dashboard never changes it.
pub const REPORT_PAGE_SIZE: u32 = 1000;

/// Default expected response time offered by a blank service form.
pub const DEFAULT_EXPECTED_RESPONSE_TIME_MS: u32 = 1000;

// ============================================================================
// Monitored services
// ============================================================================

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MonitoredService {
    pub id: String,
    pub name: String,
    pub url: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default, rename = "type")]
    pub service_type: Option<String>,
    #[serde(default)]
    pub is_active: bool,
    #[serde(default)]
    pub environment: Option<String>,
    #[serde(default)]
    pub expected_response_time_ms: Option<u32>,
    #[serde(default)]
    pub owner_team: Option<String>,
    #[serde(default)]
    pub contact_email: Option<String>,
    #[serde(default)]
    pub project_name: Option<String>,
    #[serde(default)]
    pub max_allowed_downtime_per_month: Option<String>,
    #[serde(default)]
    pub check_interval: Option<String>,
    #[serde(default)]
    pub last_checked_at: Option<String>,
    #[serde(default)]
    pub last_check_succeeded: bool,
    #[serde(default)]
    pub last_response_time_ms: Option<f64>,
    #[serde(default)]
    pub tags: Option<Vec<String>>,
}

impl MonitoredService {
    pub fn tags(&self) -> &[String] {
        self.tags.as_deref().unwrap_or_default()
    }
}

/// Body for create (POST) and full-replace update (PUT).
///
/// Every optional is serialized, absent ones as `null`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceInput {
    pub name: String,
    pub url: String,
    pub description: Option<String>,
    #[serde(rename = "type")]
    pub service_type: Option<String>,
    pub is_active: bool,
    pub environment: Option<String>,
    pub expected_response_time_ms: Option<u32>,
    pub owner_team: Option<String>,
    pub contact_email: Option<String>,
    pub project_name: Option<String>,
    pub max_allowed_downtime_per_month: Option<String>,
    pub check_interval: Option<String>,
    pub tags: Vec<String>,
}

// ============================================================================
// Uptime analysis
// ============================================================================

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UptimeCheck {
    pub id: String,
    pub is_healthy: bool,
    pub response_time_ms: f64,
    pub is_under_sla: bool,
    /// Absent when the check failed before any HTTP response.
    #[serde(default)]
    pub http_status_code: Option<u16>,
    #[serde(default)]
    pub error_message: Option<String>,
    pub at: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceUptimeGroup {
    pub monitored_service_id: String,
    pub monitored_service_name: String,
    #[serde(default)]
    pub items: Vec<UptimeCheck>,
    pub items_count: u64,
    pub is_under_sla_items_count: u64,
    pub is_upper_than_sla_items_count: u64,
    pub uptime_percentage: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeResponse {
    #[serde(default)]
    pub items: Vec<ServiceUptimeGroup>,
    #[serde(default)]
    pub total_count: Option<u64>,
}

/// Query for `GET /monitored-services/analyze`.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalyzeFilter {
    pub monitored_service_id: Option<String>,
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
    pub page_number: u32,
    pub page_size: u32,
}

impl Default for AnalyzeFilter {
    fn default() -> Self {
        Self {
            monitored_service_id: None,
            from: None,
            to: None,
            page_number: 1,
            page_size: REPORT_PAGE_SIZE,
        }
    }
}

/// Query-string form of [`AnalyzeFilter`]. Absent filters are left out.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct AnalyzeQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    monitored_service_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    from: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    to: Option<String>,
    page_number: u32,
    page_size: u32,
}

impl From<&AnalyzeFilter> for AnalyzeQuery {
    fn from(filter: &AnalyzeFilter) -> Self {
        Self {
            monitored_service_id: filter.monitored_service_id.clone(),
            from: filter.from.map(to_iso_string),
            to: filter.to.map(to_iso_string),
            page_number: filter.page_number,
            page_size: filter.page_size,
        }
    }
}

/// Millisecond-precision UTC timestamp with a `Z` suffix.
pub fn to_iso_string(dt: DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Millis, true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_service_decodes_minimal_payload() {
        let json = serde_json::json!({
            "id": "svc-1",
            "name": "Payments API",
            "url": "https://pay.example.com"
        });

        let service: MonitoredService = serde_json::from_value(json).unwrap();

        assert_eq!(service.name, "Payments API");
        assert!(!service.last_check_succeeded);
        assert!(!service.is_active);
        assert!(service.tags().is_empty());
        assert!(service.last_response_time_ms.is_none());
    }

    #[test]
    fn test_service_decodes_null_tags() {
        let json = serde_json::json!({
            "id": "svc-1",
            "name": "n",
            "url": "u",
            "tags": null,
            "type": "http"
        });

        let service: MonitoredService = serde_json::from_value(json).unwrap();

        assert!(service.tags.is_none());
        assert_eq!(service.service_type.as_deref(), Some("http"));
    }

    #[test]
    fn test_service_input_serializes_nulls() {
        let input = ServiceInput {
            name: "n".to_string(),
            url: "u".to_string(),
            description: None,
            service_type: None,
            is_active: true,
            environment: None,
            expected_response_time_ms: Some(1000),
            owner_team: None,
            contact_email: None,
            project_name: None,
            max_allowed_downtime_per_month: None,
            check_interval: None,
            tags: vec![],
        };

        let value = serde_json::to_value(&input).unwrap();

        assert_eq!(value["type"], serde_json::Value::Null);
        assert_eq!(value["maxAllowedDowntimePerMonth"], serde_json::Value::Null);
        assert_eq!(value["isActive"], true);
        assert_eq!(value["tags"], serde_json::json!([]));
    }

    #[test]
    fn test_analyze_query_skips_absent_filters() {
        let filter = AnalyzeFilter::default();

        let query = serde_json::to_value(AnalyzeQuery::from(&filter)).unwrap();

        assert_eq!(
            query,
            serde_json::json!({ "pageNumber": 1, "pageSize": 1000 })
        );
    }

    #[test]
    fn test_iso_string_matches_browser_format() {
        let dt = Utc.with_ymd_and_hms(2024, 3, 1, 8, 30, 0).unwrap();
        assert_eq!(to_iso_string(dt), "2024-03-01T08:30:00.000Z");
    }

    #[test]
    fn test_analyze_response_without_total_count() {
        let json = serde_json::json!({ "items": [] });
        let response: AnalyzeResponse = serde_json::from_value(json).unwrap();
        assert!(response.total_count.is_none());
    }

    #[test]
    fn test_check_with_fractional_timing_and_no_status() {
        let json = serde_json::json!({
            "id": "c1",
            "isHealthy": false,
            "responseTimeMs": 12.5,
            "isUnderSla": true,
            "httpStatusCode": null,
            "errorMessage": "connection refused",
            "at": "2024-01-15T08:00:00Z"
        });

        let check: UptimeCheck = serde_json::from_value(json).unwrap();

        assert_eq!(check.response_time_ms, 12.5);
        assert_eq!(check.http_status_code, None);
    }

    #[test]
    fn test_service_with_fractional_last_response_time() {
        let json = serde_json::json!({
            "id": "svc-1",
            "name": "Payments API",
            "url": "https://pay.example.com",
            "lastResponseTimeMs": 87.25
        });

        let service: MonitoredService = serde_json::from_value(json).unwrap();

        assert_eq!(service.last_response_time_ms, Some(87.25));
    }
}

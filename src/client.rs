use crate::config::Context;
use crate::error::CliError;
use crate::models::{AnalyzeFilter, AnalyzeQuery, AnalyzeResponse, MonitoredService, ServiceInput};
use reqwest::{Client, Response, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::sync::LazyLock;
use std::time::Duration;

/// Every call gives up after this long and surfaces as a network error.
pub const TIMEOUT_SECS: u64 = 7;

const SERVICES_PATH: &str = "/monitored-services";

/// `uptimex/{version} ({os}; {arch})`
pub static USER_AGENT: LazyLock<String> = LazyLock::new(|| {
    format!(
        "uptimex/{} ({}; {})",
        env!("CARGO_PKG_VERSION"),
        std::env::consts::OS,
        std::env::consts::ARCH
    )
});

/// Thin pass-through to the UptimeX HTTP API. No retries, no caching.
#[derive(Debug, Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(ctx: &Context) -> Result<Self, CliError> {
        Self::with_base_url(ctx.api_url())
    }

    /// Create a client with an explicit base URL (used by tests)
    pub fn with_base_url(base_url: String) -> Result<Self, CliError> {
        Self::with_timeout(base_url, Duration::from_secs(TIMEOUT_SECS))
    }

    pub fn with_timeout(base_url: String, timeout: Duration) -> Result<Self, CliError> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT.as_str())
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    // ========================================================================
    // Monitored services
    // ========================================================================

    pub async fn list_services(&self) -> Result<Vec<MonitoredService>, CliError> {
        self.get(SERVICES_PATH).await
    }

    pub async fn get_service(&self, id: &str) -> Result<MonitoredService, CliError> {
        self.get(&service_path(id))
            .await
            .map_err(|e| not_found_as_service(e, id))
    }

    pub async fn create_service(&self, input: &ServiceInput) -> Result<MonitoredService, CliError> {
        self.post(SERVICES_PATH, input).await
    }

    /// Full replace: every field of `input` overwrites the stored service.
    pub async fn update_service(
        &self,
        id: &str,
        input: &ServiceInput,
    ) -> Result<MonitoredService, CliError> {
        self.put(&service_path(id), input)
            .await
            .map_err(|e| not_found_as_service(e, id))
    }

    pub async fn delete_service(&self, id: &str) -> Result<(), CliError> {
        self.delete(&service_path(id))
            .await
            .map_err(|e| not_found_as_service(e, id))
    }

    // ========================================================================
    // Uptime analysis
    // ========================================================================

    pub async fn analyze_uptime(&self, filter: &AnalyzeFilter) -> Result<AnalyzeResponse, CliError> {
        let query = AnalyzeQuery::from(filter);
        self.get_with_query(&format!("{}/analyze", SERVICES_PATH), &query)
            .await
    }

    // ========================================================================
    // Transport
    // ========================================================================

    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, CliError> {
        let url = format!("{}{}", self.base_url, path);
        tracing::debug!(%url, "GET");

        let response = self.client.get(&url).send().await?;

        Self::handle_response(response).await
    }

    pub async fn get_with_query<T: DeserializeOwned, Q: Serialize>(
        &self,
        path: &str,
        query: &Q,
    ) -> Result<T, CliError> {
        let url = format!("{}{}", self.base_url, path);
        tracing::debug!(%url, "GET with query");

        let response = self.client.get(&url).query(query).send().await?;

        Self::handle_response(response).await
    }

    pub async fn post<T: DeserializeOwned, B: Serialize>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, CliError> {
        let url = format!("{}{}", self.base_url, path);
        tracing::debug!(%url, "POST");

        let response = self.client.post(&url).json(body).send().await?;

        Self::handle_response(response).await
    }

    pub async fn put<T: DeserializeOwned, B: Serialize>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, CliError> {
        let url = format!("{}{}", self.base_url, path);
        tracing::debug!(%url, "PUT");

        let response = self.client.put(&url).json(body).send().await?;

        Self::handle_response(response).await
    }

    /// DELETE; any 2xx counts as success and the body is ignored.
    pub async fn delete(&self, path: &str) -> Result<(), CliError> {
        let url = format!("{}{}", self.base_url, path);
        tracing::debug!(%url, "DELETE");

        let response = self.client.delete(&url).send().await?;

        if response.status().is_success() {
            Ok(())
        } else {
            Err(Self::handle_error(response).await)
        }
    }

    async fn handle_response<T: DeserializeOwned>(response: Response) -> Result<T, CliError> {
        let status = response.status();
        if status.is_success() {
            let body = response.bytes().await?;
            let data = serde_json::from_slice::<T>(&body)?;
            Ok(data)
        } else {
            Err(Self::handle_error(response).await)
        }
    }

    async fn handle_error(response: Response) -> CliError {
        let status = response.status();

        // ASP.NET style problem details use `title`; other handlers use error/message
        #[derive(serde::Deserialize)]
        struct ErrorResponse {
            error: Option<String>,
            message: Option<String>,
            title: Option<String>,
        }

        let error_msg = match response.json::<ErrorResponse>().await {
            Ok(err) => err.error.or(err.message).or(err.title),
            Err(_) => None,
        };

        match status {
            StatusCode::NOT_FOUND => CliError::http(
                status,
                error_msg.unwrap_or_else(|| "Resource not found".to_string()),
            ),
            _ => CliError::http(
                status,
                error_msg.unwrap_or_else(|| {
                    status
                        .canonical_reason()
                        .unwrap_or("Request failed")
                        .to_string()
                }),
            ),
        }
    }
}

fn service_path(id: &str) -> String {
    format!("{}/{}", SERVICES_PATH, urlencoding::encode(id))
}

fn not_found_as_service(err: CliError, id: &str) -> CliError {
    match err {
        CliError::Http { status, .. } if status == StatusCode::NOT_FOUND => {
            CliError::ServiceNotFound(id.to_string())
        }
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_service_path_encodes_id() {
        assert_eq!(service_path("abc"), "/monitored-services/abc");
        assert_eq!(service_path("a b/c"), "/monitored-services/a%20b%2Fc");
    }

    #[test]
    fn test_not_found_maps_to_service_not_found() {
        let err = CliError::http(StatusCode::NOT_FOUND, "gone");
        assert!(matches!(
            not_found_as_service(err, "svc-9"),
            CliError::ServiceNotFound(id) if id == "svc-9"
        ));
    }

    #[test]
    fn test_other_status_passes_through() {
        let err = CliError::http(StatusCode::INTERNAL_SERVER_ERROR, "boom");
        assert!(matches!(
            not_found_as_service(err, "svc-9"),
            CliError::Http { status, .. } if status == StatusCode::INTERNAL_SERVER_ERROR
        ));
    }

    #[test]
    fn test_user_agent_names_version_and_platform() {
        assert!(USER_AGENT.starts_with("uptimex/"));
        assert!(USER_AGENT.contains(env!("CARGO_PKG_VERSION")));
        assert!(USER_AGENT.contains(std::env::consts::OS));
    }

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        let client = ApiClient::with_base_url("http://localhost:9/".to_string()).unwrap();
        assert_eq!(client.base_url(), "http://localhost:9");
    }
}

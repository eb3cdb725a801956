//! Shared plumbing for the HTTP-backed collaborators

use reqwest::Client;

use crate::error::{Error, Result, Upstream};

pub(crate) fn build_client(service: Upstream) -> Result<Client> {
    Client::builder()
        .connect_timeout(std::time::Duration::from_secs(15))
        .timeout(std::time::Duration::from_secs(120))
        .pool_idle_timeout(std::time::Duration::from_secs(90))
        .tcp_nodelay(true)
        .build()
        .map_err(|e| Error::upstream(service, format!("failed to build HTTP client: {}", e)))
}

/// Parse a response body as JSON, returning a clear error if the server returned HTML
/// (e.g. a gateway error page) or a non-success status.
pub(crate) async fn parse_json_response<T: serde::de::DeserializeOwned>(
    response: reqwest::Response,
    endpoint: &str,
    service: Upstream,
) -> Result<T> {
    let status = response.status();
    let body = response.text().await.map_err(|e| {
        Error::upstream(
            service,
            format!("failed to read response body from {}: {}", endpoint, e),
        )
    })?;

    let trimmed = body.trim_start();
    if trimmed.starts_with('<') {
        let preview: String = trimmed.chars().take(200).collect();
        return Err(Error::upstream(
            service,
            format!(
                "{} returned HTML instead of JSON (HTTP {}): {}",
                endpoint, status, preview
            ),
        ));
    }

    if !status.is_success() {
        let preview: String = body.chars().take(300).collect();
        return Err(Error::upstream(
            service,
            format!("{} returned HTTP {}: {}", endpoint, status, preview),
        ));
    }

    serde_json::from_str::<T>(&body).map_err(|e| {
        let preview: String = body.chars().take(300).collect();
        Error::upstream(
            service,
            format!(
                "failed to parse JSON from {} (HTTP {}): {}. Body: {}",
                endpoint, status, e, preview
            ),
        )
    })
}

pub(crate) fn send_error(service: Upstream, endpoint: &str, err: reqwest::Error) -> Error {
    Error::upstream(service, format!("request to {} failed: {}", endpoint, err))
}

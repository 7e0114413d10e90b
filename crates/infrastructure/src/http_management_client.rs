use std::time::Duration;

use mgmtctl_core::{AppError, AppResult, ManagementContext};
use reqwest::StatusCode;
use reqwest::header;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, warn};
use url::Url;
use uuid::Uuid;

const CLIENT_REQUEST_ID_HEADER: &str = "x-ms-client-request-id";

/// JSON client for the management control plane.
///
/// Sends one request per call and never retries.
#[derive(Clone)]
pub struct HttpManagementClient {
    http_client: reqwest::Client,
    base_url: Url,
}

impl HttpManagementClient {
    /// Creates a client from an existing HTTP client and the endpoint base URL.
    pub fn new(http_client: reqwest::Client, base_url: &str) -> AppResult<Self> {
        let base_url = Url::parse(base_url).map_err(|error| {
            AppError::Validation(format!("invalid management endpoint '{base_url}': {error}"))
        })?;

        if !matches!(base_url.scheme(), "http" | "https") || base_url.cannot_be_a_base() {
            return Err(AppError::Validation(format!(
                "management endpoint '{base_url}' must be an http or https URL"
            )));
        }

        Ok(Self {
            http_client,
            base_url,
        })
    }

    /// Creates a client whose requests fail once `request_timeout` elapses.
    pub fn with_timeout(base_url: &str, request_timeout: Duration) -> AppResult<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(request_timeout)
            .build()
            .map_err(|error| AppError::Internal(format!("failed to build HTTP client: {error}")))?;

        Self::new(http_client, base_url)
    }

    /// Returns the endpoint base URL.
    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub(crate) fn resource_url(&self, segments: &[&str], api_version: &str) -> AppResult<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| {
                AppError::Internal(format!(
                    "management endpoint '{}' cannot carry a resource path",
                    self.base_url
                ))
            })?
            .pop_if_empty()
            .extend(segments);
        url.query_pairs_mut()
            .append_pair("api-version", api_version);

        Ok(url)
    }

    pub(crate) async fn get_json<T>(&self, context: &ManagementContext, url: Url) -> AppResult<T>
    where
        T: DeserializeOwned,
    {
        let builder = self.http_client.get(url.clone());
        self.execute(context, reqwest::Method::GET, url, builder)
            .await
    }

    pub(crate) async fn send_json<B, T>(
        &self,
        context: &ManagementContext,
        method: reqwest::Method,
        url: Url,
        body: &B,
    ) -> AppResult<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let builder = self.http_client.request(method.clone(), url.clone()).json(body);
        self.execute(context, method, url, builder).await
    }

    async fn execute<T>(
        &self,
        context: &ManagementContext,
        method: reqwest::Method,
        url: Url,
        builder: reqwest::RequestBuilder,
    ) -> AppResult<T>
    where
        T: DeserializeOwned,
    {
        let request_id = Uuid::new_v4();
        debug!(
            method = %method,
            url = %url,
            request_id = %request_id,
            subscription_id = %context.subscription_id(),
            "sending management request"
        );

        let response = builder
            .bearer_auth(context.access_token())
            .header(CLIENT_REQUEST_ID_HEADER, request_id.to_string())
            .header(header::ACCEPT, "application/json")
            .send()
            .await
            .map_err(|error| {
                warn!(
                    method = %method,
                    url = %url,
                    request_id = %request_id,
                    timeout = error.is_timeout(),
                    error = %error,
                    "management request did not complete"
                );
                AppError::Transport(format!("{method} {} failed: {error}", url.path()))
            })?;

        let status = response.status();
        if !status.is_success() {
            let error = error_from_response(response, url.path()).await;
            warn!(
                method = %method,
                status = status.as_u16(),
                request_id = %request_id,
                error = %error,
                "management endpoint rejected request"
            );
            return Err(error);
        }

        response.json::<T>().await.map_err(|error| {
            AppError::Transport(format!(
                "failed to decode response body of {method} {}: {error}",
                url.path()
            ))
        })
    }
}

async fn error_from_response(response: reqwest::Response, resource: &str) -> AppError {
    let status = response.status();
    let body = response
        .text()
        .await
        .unwrap_or_else(|_| "<response body unavailable>".to_owned());
    let message = service_error_message(status, body.as_str());

    if status == StatusCode::NOT_FOUND {
        return AppError::NotFound(format!("{resource}: {message}"));
    }

    AppError::Service {
        status: status.as_u16(),
        message,
    }
}

/// Extracts `code: message` from a management error envelope, or falls back to the raw body.
fn service_error_message(status: StatusCode, body: &str) -> String {
    let envelope = serde_json::from_str::<Value>(body).ok();
    let detail = envelope.as_ref().and_then(|value| value.get("error"));
    let code = detail
        .and_then(|value| value.get("code"))
        .and_then(Value::as_str);
    let message = detail
        .and_then(|value| value.get("message"))
        .and_then(Value::as_str);

    match (code, message) {
        (Some(code), Some(message)) => format!("{code}: {message}"),
        (None, Some(message)) => message.to_owned(),
        (Some(code), None) => code.to_owned(),
        (None, None) if body.trim().is_empty() => status
            .canonical_reason()
            .unwrap_or("no response body")
            .to_owned(),
        (None, None) => body.to_owned(),
    }
}

#[cfg(test)]
mod tests {
    use reqwest::StatusCode;

    use super::{HttpManagementClient, service_error_message};

    #[test]
    fn resource_url_escapes_segments_and_appends_api_version() {
        let client = HttpManagementClient::new(reqwest::Client::new(), "https://example.test/");
        let Ok(client) = client else {
            panic!("client should accept the endpoint");
        };

        let url = client.resource_url(&["subscriptions", "sub 1", "jobs", "a/b"], "2015-01-01");
        assert_eq!(
            url.map(|url| url.to_string()).ok().as_deref(),
            Some("https://example.test/subscriptions/sub%201/jobs/a%2Fb?api-version=2015-01-01")
        );
    }

    #[test]
    fn rejects_non_http_endpoint() {
        assert!(HttpManagementClient::new(reqwest::Client::new(), "ftp://example.test").is_err());
        assert!(HttpManagementClient::new(reqwest::Client::new(), "not a url").is_err());
    }

    #[test]
    fn error_message_prefers_envelope() {
        let message = service_error_message(
            StatusCode::CONFLICT,
            r#"{"error":{"code":"ProtectionProfileExists","message":"already exists"}}"#,
        );
        assert_eq!(message, "ProtectionProfileExists: already exists");
    }

    #[test]
    fn error_message_falls_back_to_body_or_reason() {
        assert_eq!(
            service_error_message(StatusCode::BAD_GATEWAY, "upstream down"),
            "upstream down"
        );
        assert_eq!(
            service_error_message(StatusCode::INTERNAL_SERVER_ERROR, ""),
            "Internal Server Error"
        );
    }
}

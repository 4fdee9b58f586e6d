use gotour_core::{ServiceError, ServiceResult};
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::error;

/// `{ success, data, message }` wrapper used by every GoTour API response.
#[derive(Debug, Deserialize)]
#[serde(bound(deserialize = "T: Deserialize<'de>"))]
pub struct Envelope<T> {
    pub success: bool,
    #[serde(default)]
    pub data: Option<T>,
    #[serde(default)]
    pub message: Option<String>,
}

impl<T> Envelope<T> {
    pub fn into_result(self) -> ServiceResult<T> {
        if !self.success {
            return Err(ServiceError::Rejected(
                self.message.unwrap_or_else(|| "Request was not accepted".to_string()),
            ));
        }
        self.data
            .ok_or_else(|| ServiceError::Malformed("response has no data".to_string()))
    }
}

/// Decode an enveloped body into its payload.
pub fn decode_envelope<T: DeserializeOwned>(body: &str) -> ServiceResult<T> {
    serde_json::from_str::<Envelope<T>>(body)
        .map_err(|e| ServiceError::Malformed(e.to_string()))?
        .into_result()
}

#[derive(Deserialize)]
struct ErrorBody {
    message: Option<String>,
}

/// Shared HTTP connection to the GoTour backend. Cheap to clone.
#[derive(Clone)]
pub struct BackendClient {
    http: Client,
    base_url: String,
    timeout: Duration,
}

impl BackendClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> ServiceResult<Self> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ServiceError::Network(format!("HTTP client setup failed: {}", e)))?;

        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            timeout,
        })
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> ServiceResult<T> {
        let body = self.send(self.http.get(self.url(path)), path).await?;
        decode_envelope(&body)
    }

    pub async fn post<B, T>(&self, path: &str, payload: &B, bearer: Option<&str>) -> ServiceResult<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let body = self.send(self.post_request(path, payload, bearer), path).await?;
        decode_envelope(&body)
    }

    /// POST for endpoints that answer without the envelope.
    pub async fn post_bare<B, T>(&self, path: &str, payload: &B) -> ServiceResult<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let body = self.send(self.post_request(path, payload, None), path).await?;
        serde_json::from_str(&body).map_err(|e| ServiceError::Malformed(e.to_string()))
    }

    fn post_request<B: Serialize + ?Sized>(&self, path: &str, payload: &B, bearer: Option<&str>) -> RequestBuilder {
        let request = self.http.post(self.url(path)).json(payload);
        match bearer {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn send(&self, request: RequestBuilder, path: &str) -> ServiceResult<String> {
        let res = request.send().await.map_err(|e| {
            if e.is_timeout() {
                error!("Backend call {} timed out", path);
                ServiceError::Timeout(self.timeout.as_millis() as u64)
            } else {
                error!("Backend connection error on {}: {}", path, e);
                ServiceError::Network(e.to_string())
            }
        })?;

        let status = res.status();
        let text = res.text().await.map_err(|e| {
            error!("Backend body read failed on {}: {}", path, e);
            ServiceError::Network(e.to_string())
        })?;

        if status.is_success() {
            return Ok(text);
        }

        let message = serde_json::from_str::<ErrorBody>(&text)
            .ok()
            .and_then(|b| b.message)
            .unwrap_or_else(|| format!("{} returned {}", path, status));
        error!("Backend call {} failed. Status: {}, Message: {}", path, status, message);

        Err(classify(status, message))
    }
}

fn classify(status: StatusCode, message: String) -> ServiceError {
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => ServiceError::Unauthorized(message),
        StatusCode::NOT_FOUND => ServiceError::NotFound(message),
        StatusCode::REQUEST_TIMEOUT | StatusCode::GATEWAY_TIMEOUT => ServiceError::Network(message),
        s if s.is_server_error() => ServiceError::Network(message),
        _ => ServiceError::Rejected(message),
    }
}

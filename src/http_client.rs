// HTTP booking client
// Speaks the booking REST API: POST /book, GET /bookings, and
// GET/PUT/DELETE /bookings/{id}. Reads are retried with backoff; writes are
// sent exactly once.

use crate::booking::{BookingRecord, BookingRequest, BookingStatus};
use crate::store::{validate_request, BookingStore, StoreError};
use async_trait::async_trait;
use parking_lot::Mutex;
use reqwest::{Method, Url};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info, warn};

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Initialization error: {0}")]
    InitError(String),
}

#[derive(Debug, Clone)]
pub struct ClientConfig {
    // API root, e.g. http://localhost:5000/api
    pub base_url: String,
    pub timeout_ms: u64,
    pub retry_config: RetryConfig,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:5000/api".to_string(),
            timeout_ms: 5000,
            retry_config: RetryConfig::default(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct RetryConfig {
    pub max_retries: u32,
    pub initial_backoff_ms: u64,
    pub max_backoff_ms: u64,
    pub backoff_multiplier: f64,
    pub jitter_factor: f64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            initial_backoff_ms: 100,
            max_backoff_ms: 10000,
            backoff_multiplier: 2.0,
            jitter_factor: 0.1,
        }
    }
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ClientStats {
    pub requests_sent: usize,
    pub requests_succeeded: usize,
    pub requests_failed: usize,
    pub requests_retried: usize,
}

// Response bodies of the booking API
#[derive(Debug, Deserialize)]
struct CreateEnvelope {
    #[serde(default)]
    message: Option<String>,
    booking: BookingRecord,
}

#[derive(Debug, Deserialize)]
struct DataEnvelope<T> {
    data: T,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ErrorEnvelope {
    message: Option<String>,
    error: Option<serde_json::Value>,
}

pub struct HttpBookingClient {
    http: reqwest::Client,
    base_url: Url,
    config: ClientConfig,
    stats: Mutex<ClientStats>,
}

impl HttpBookingClient {
    pub fn new(config: ClientConfig) -> Result<Self, ClientError> {
        let base = config.base_url.trim();
        if base.is_empty() {
            return Err(ClientError::ConfigError("base_url must not be empty".to_string()));
        }
        if !(base.starts_with("http://") || base.starts_with("https://")) {
            return Err(ClientError::ConfigError(format!(
                "base_url must be an http(s) URL, got {}",
                base
            )));
        }
        let base_url = Url::parse(base)
            .map_err(|e| ClientError::ConfigError(format!("invalid base_url {}: {}", base, e)))?;
        if config.timeout_ms == 0 {
            return Err(ClientError::ConfigError("timeout_ms must be positive".to_string()));
        }

        let http = reqwest::Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()
            .map_err(|e| ClientError::InitError(e.to_string()))?;

        Ok(Self {
            http,
            base_url,
            config,
            stats: Mutex::new(ClientStats::default()),
        })
    }

    pub fn stats(&self) -> ClientStats {
        self.stats.lock().clone()
    }

    // Appends each segment to the API root, percent-encoding '/', '?' and '#'
    pub fn url(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        // http(s) URLs always have a path
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    // Exponential backoff with jitter
    pub fn calculate_backoff(retry_attempt: u32, config: &RetryConfig) -> Duration {
        let base_backoff_ms = (config.initial_backoff_ms as f64
            * config.backoff_multiplier.powf(retry_attempt as f64))
        .min(config.max_backoff_ms as f64);

        let jitter = rand::random::<f64>() * config.jitter_factor * base_backoff_ms;
        let backoff_ms = base_backoff_ms * (1.0 - config.jitter_factor / 2.0) + jitter;

        Duration::from_millis(backoff_ms as u64)
    }

    async fn call<T: DeserializeOwned>(
        &self,
        method: Method,
        segments: &[&str],
        body: Option<&serde_json::Value>,
        retry: bool,
    ) -> Result<T, StoreError> {
        let url = self.url(segments);
        let max_retries = if retry {
            self.config.retry_config.max_retries
        } else {
            0
        };

        let mut attempt = 0;
        loop {
            match self.send_once(method.clone(), &url, body).await {
                Err(e) if attempt < max_retries && e.is_retryable() => {
                    let backoff = Self::calculate_backoff(attempt, &self.config.retry_config);
                    warn!(%method, path = url.path(), attempt, error = %e, backoff_ms = backoff.as_millis() as u64, "retrying booking API call");
                    self.stats.lock().requests_retried += 1;
                    tokio::time::sleep(backoff).await;
                    attempt += 1;
                }
                result => return result,
            }
        }
    }

    async fn send_once<T: DeserializeOwned>(
        &self,
        method: Method,
        url: &Url,
        body: Option<&serde_json::Value>,
    ) -> Result<T, StoreError> {
        let mut builder = self.http.request(method.clone(), url.clone());
        if let Some(body) = body {
            builder = builder.json(body);
        }

        self.stats.lock().requests_sent += 1;
        let result = Self::execute::<T>(builder).await;

        let mut stats = self.stats.lock();
        match &result {
            Ok(_) => stats.requests_succeeded += 1,
            Err(e) => {
                stats.requests_failed += 1;
                debug!(%method, path = url.path(), error = %e, "booking API call failed");
            }
        }
        result
    }

    async fn execute<T: DeserializeOwned>(builder: reqwest::RequestBuilder) -> Result<T, StoreError> {
        let response = builder
            .send()
            .await
            .map_err(|e| StoreError::Transport(e.to_string()))?;
        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| StoreError::Transport(e.to_string()))?;

        if !status.is_success() {
            return Err(api_error(status.as_u16(), &text));
        }
        serde_json::from_str(&text).map_err(|e| StoreError::Decode(e.to_string()))
    }
}

// Builds an error from a non-2xx response, preferring the server's message
fn api_error(status_code: u16, body: &str) -> StoreError {
    let envelope: ErrorEnvelope = serde_json::from_str(body).unwrap_or_default();
    let message = envelope
        .message
        .or_else(|| match envelope.error {
            Some(serde_json::Value::String(s)) => Some(s),
            Some(other) => Some(other.to_string()),
            None => None,
        })
        .unwrap_or_else(|| format!("HTTP {}", status_code));

    StoreError::Api {
        status_code,
        message,
    }
}

fn not_found_as(id: &str) -> impl FnOnce(StoreError) -> StoreError + '_ {
    move |e| match e {
        StoreError::Api {
            status_code: 404, ..
        } => StoreError::NotFound(id.to_string()),
        other => other,
    }
}

#[async_trait]
impl BookingStore for HttpBookingClient {
    async fn create(&self, request: BookingRequest) -> Result<BookingRecord, StoreError> {
        validate_request(&request)?;
        let body = serde_json::to_value(&request).map_err(|e| StoreError::Decode(e.to_string()))?;

        let envelope: CreateEnvelope = self.call(Method::POST, &["book"], Some(&body), false).await?;
        debug!(
            booking_id = %envelope.booking.id,
            message = envelope.message.as_deref().unwrap_or_default(),
            "booking created"
        );
        Ok(envelope.booking)
    }

    async fn list(&self) -> Result<Vec<BookingRecord>, StoreError> {
        let envelope: DataEnvelope<Vec<BookingRecord>> =
            self.call(Method::GET, &["bookings"], None, true).await?;
        Ok(envelope.data)
    }

    async fn get(&self, id: &str) -> Result<BookingRecord, StoreError> {
        let envelope: DataEnvelope<BookingRecord> = self
            .call(Method::GET, &["bookings", id], None, true)
            .await
            .map_err(not_found_as(id))?;
        Ok(envelope.data)
    }

    async fn update_status(
        &self,
        id: &str,
        status: BookingStatus,
    ) -> Result<BookingRecord, StoreError> {
        let body = serde_json::json!({ "status": status });
        let envelope: DataEnvelope<BookingRecord> = self
            .call(Method::PUT, &["bookings", id], Some(&body), false)
            .await
            .map_err(not_found_as(id))?;

        info!(booking_id = %id, status = %status, "booking status updated");
        Ok(envelope.data)
    }

    async fn delete(&self, id: &str) -> Result<(), StoreError> {
        let _: serde_json::Value = self
            .call(Method::DELETE, &["bookings", id], None, false)
            .await
            .map_err(not_found_as(id))?;

        info!(booking_id = %id, "booking deleted");
        Ok(())
    }
}

// Shared transport for building and driving reqwest::Client instances.
//
// Each client owns one `HttpTransport`; the cloud clients get the long
// timeout, the local client the short one. The transport knows nothing about
// PurpleAir: it sends a descriptor and hands back status + body.

use std::error::Error as _;
use std::time::Duration;

use tracing::{debug, trace};

use crate::endpoint::RequestDescriptor;
use crate::error::Error;

/// Transport configuration for one HTTP client.
#[derive(Debug, Clone)]
pub struct TransportConfig {
    pub timeout: Duration,
    pub user_agent: String,
}

impl TransportConfig {
    /// Build a `reqwest::Client` from this config. No I/O happens here.
    pub fn build_client(&self) -> Result<reqwest::Client, Error> {
        reqwest::Client::builder()
            .timeout(self.timeout)
            .user_agent(self.user_agent.as_str())
            .build()
            .map_err(|e| Error::config(format!("failed to build HTTP client: {e}")))
    }
}

/// Status line and body of a completed exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    pub status: u16,
    /// Canonical reason phrase for `status`, empty if unknown.
    pub reason: String,
    pub body: String,
}

impl RawResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        let reason = reqwest::StatusCode::from_u16(status)
            .ok()
            .and_then(|s| s.canonical_reason())
            .unwrap_or_default()
            .to_owned();
        Self {
            status,
            reason,
            body: body.into(),
        }
    }
}

/// The request never produced a complete response.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct NetworkError {
    pub message: String,
    pub timed_out: bool,
}

impl NetworkError {
    fn from_reqwest(err: &reqwest::Error, timeout: Duration) -> Self {
        if err.is_timeout() {
            let target = err.url().map_or_else(String::new, |u| format!(" to {u}"));
            return Self {
                message: format!("request{target} timed out after {}ms", timeout.as_millis()),
                timed_out: true,
            };
        }

        // reqwest keeps the useful part (connection refused, dns error)
        // in the source chain.
        let mut message = err.to_string();
        let mut source = err.source();
        while let Some(cause) = source {
            message.push_str(": ");
            message.push_str(&cause.to_string());
            source = cause.source();
        }
        Self {
            message,
            timed_out: false,
        }
    }
}

/// Executes request descriptors.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    http: reqwest::Client,
    timeout: Duration,
}

impl HttpTransport {
    pub fn new(config: &TransportConfig) -> Result<Self, Error> {
        Ok(Self {
            http: config.build_client()?,
            timeout: config.timeout,
        })
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Send one request and wait for the full body or the timeout.
    pub async fn execute(&self, descriptor: &RequestDescriptor) -> Result<RawResponse, NetworkError> {
        debug!("{} {}", descriptor.method, descriptor.url);

        let mut builder = self
            .http
            .request(descriptor.method.clone(), descriptor.url.clone())
            .headers(descriptor.headers.clone());
        if let Some(ref body) = descriptor.body {
            builder = builder.json(body);
        }

        let resp = builder
            .send()
            .await
            .map_err(|e| NetworkError::from_reqwest(&e, self.timeout))?;
        let status = resp.status().as_u16();
        trace!(status, url = %descriptor.url, "response received");

        let body = resp
            .text()
            .await
            .map_err(|e| NetworkError::from_reqwest(&e, self.timeout))?;
        Ok(RawResponse::new(status, body))
    }
}

// ── Client configuration ──
//
// Passed programmatically to the `with_config` constructors. Derives serde
// so host applications can load it from their own config files, but this
// crate never reads files or environment variables itself.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::Error;
use crate::transport::TransportConfig;

/// Production base URL of the cloud API.
pub const DEFAULT_BASE_URL: &str = "https://api.purpleair.com/v1/";

/// Tuning shared by the read, write and local clients.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Cloud API root. Overridable for proxies and tests.
    pub base_url: String,

    /// Timeout for cloud requests, in seconds.
    pub cloud_timeout_secs: u64,

    /// Timeout for local device requests, in milliseconds. Local devices
    /// answer quickly; a hung device should fail fast.
    pub local_timeout_ms: u64,

    /// Maximum number of local devices polled at once.
    pub local_concurrency: usize,

    pub user_agent: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.into(),
            cloud_timeout_secs: 30,
            local_timeout_ms: 3_000,
            local_concurrency: 8,
            user_agent: concat!("purpleair-api/", env!("CARGO_PKG_VERSION")).into(),
        }
    }
}

impl ClientConfig {
    /// Parse `base_url`, forcing a trailing slash so relative joins
    /// (`sensors/123`) append rather than replace the last segment.
    pub(crate) fn base_url(&self) -> Result<Url, Error> {
        let mut url = Url::parse(&self.base_url)
            .map_err(|e| Error::config(format!("invalid base URL {:?}: {e}", self.base_url)))?;
        if url.cannot_be_a_base() {
            return Err(Error::config(format!(
                "base URL {:?} cannot carry a path",
                self.base_url
            )));
        }
        if !url.path().ends_with('/') {
            let path = format!("{}/", url.path());
            url.set_path(&path);
        }
        Ok(url)
    }

    /// A zero timeout would fail every request, so it is rejected here.
    pub(crate) fn cloud_transport(&self) -> Result<TransportConfig, Error> {
        if self.cloud_timeout_secs == 0 {
            return Err(Error::config("cloud_timeout_secs must be greater than zero"));
        }
        Ok(TransportConfig {
            timeout: Duration::from_secs(self.cloud_timeout_secs),
            user_agent: self.user_agent.clone(),
        })
    }

    pub(crate) fn local_transport(&self) -> Result<TransportConfig, Error> {
        if self.local_timeout_ms == 0 {
            return Err(Error::config("local_timeout_ms must be greater than zero"));
        }
        Ok(TransportConfig {
            timeout: Duration::from_millis(self.local_timeout_ms),
            user_agent: self.user_agent.clone(),
        })
    }

    pub(crate) fn local_concurrency(&self) -> usize {
        self.local_concurrency.max(1)
    }
}

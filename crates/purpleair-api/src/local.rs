// Polls PurpleAir sensors on the LAN via their built-in `/json` endpoint.
//
// No key, no cloud. One request per listed address per poll, capped at
// `local_concurrency` in flight, with results reported in list order.

use futures_util::stream::{self, StreamExt};
use tracing::debug;

use crate::auth::DeviceAddresses;
use crate::config::ClientConfig;
use crate::endpoint::EndpointBuilder;
use crate::error::{ApiError, ApiErrorKind, Error};
use crate::record::LocalReading;
use crate::response;
use crate::transport::HttpTransport;

/// Result of polling one address.
#[derive(Debug, Clone, PartialEq)]
pub struct DeviceOutcome {
    pub address: String,
    pub result: Result<LocalReading, ApiError>,
}

impl DeviceOutcome {
    pub fn is_ok(&self) -> bool {
        self.result.is_ok()
    }
}

/// Every outcome of one poll, in the order the addresses were listed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PollReport {
    outcomes: Vec<DeviceOutcome>,
}

impl PollReport {
    pub fn outcomes(&self) -> &[DeviceOutcome] {
        &self.outcomes
    }

    pub fn into_outcomes(self) -> Vec<DeviceOutcome> {
        self.outcomes
    }

    /// `(address, reading)` for every device that answered with a JSON
    /// object.
    pub fn successes(&self) -> impl Iterator<Item = (&str, &LocalReading)> {
        self.outcomes
            .iter()
            .filter_map(|o| o.result.as_ref().ok().map(|r| (o.address.as_str(), r)))
    }

    pub fn failures(&self) -> impl Iterator<Item = (&str, &ApiError)> {
        self.outcomes
            .iter()
            .filter_map(|o| o.result.as_ref().err().map(|e| (o.address.as_str(), e)))
    }

    pub fn all_succeeded(&self) -> bool {
        self.outcomes.iter().all(DeviceOutcome::is_ok)
    }

    pub fn len(&self) -> usize {
        self.outcomes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }
}

/// Client for a fixed list of local sensors.
///
/// Building one never fails on the address list itself: an empty list is
/// only rejected by [`LocalClient::poll`], and a malformed address only
/// fails its own slot in the report.
#[derive(Debug, Clone)]
pub struct LocalClient {
    addresses: DeviceAddresses,
    transport: HttpTransport,
    concurrency: usize,
}

impl LocalClient {
    pub fn new(addresses: impl Into<DeviceAddresses>) -> Result<Self, Error> {
        Self::with_config(addresses, &ClientConfig::default())
    }

    pub fn with_config(
        addresses: impl Into<DeviceAddresses>,
        config: &ClientConfig,
    ) -> Result<Self, Error> {
        Ok(Self {
            addresses: addresses.into(),
            transport: HttpTransport::new(&config.local_transport()?)?,
            concurrency: config.local_concurrency(),
        })
    }

    pub fn addresses(&self) -> &DeviceAddresses {
        &self.addresses
    }

    /// Fetch `http://{address}/json` from every listed device.
    ///
    /// Fails only when there is nothing to poll. Per-device failures
    /// (timeouts, refused connections, bad bodies) are recorded in the
    /// report and never abort the batch.
    pub async fn poll(&self) -> Result<PollReport, ApiError> {
        if self.addresses.is_empty() {
            return Err(ApiError::with_kind(
                ApiErrorKind::NoDevices,
                "no local sensor addresses configured",
            ));
        }

        debug!(
            devices = self.addresses.len(),
            concurrency = self.concurrency,
            "polling local sensors"
        );

        let outcomes: Vec<DeviceOutcome> = stream::iter(self.addresses.iter())
            .map(|address| async move {
                DeviceOutcome {
                    address: address.clone(),
                    result: self.poll_device(address).await,
                }
            })
            .buffered(self.concurrency)
            .collect()
            .await;

        let report = PollReport { outcomes };
        debug!(
            ok = report.successes().count(),
            failed = report.failures().count(),
            "local poll finished"
        );
        Ok(report)
    }

    /// Fetch one device, whether or not it is in the configured list.
    pub async fn poll_device(&self, address: &str) -> Result<LocalReading, ApiError> {
        let descriptor = EndpointBuilder::local(address)
            .map_err(|e| ApiError::with_kind(ApiErrorKind::InvalidAddress, e.message()))?;
        let result = response::validate(self.transport.execute(&descriptor).await);
        if let Err(ref e) = result {
            debug!(address, error = %e, "local sensor poll failed");
        }
        result
    }
}

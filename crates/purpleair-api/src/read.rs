// Async client for the PurpleAir read API.
//
// Every public method is one exchange: build descriptor, execute, validate.
// Nothing is cached between calls.

use tracing::debug;

use crate::auth::{ApiKey, KeyInfo, Read};
use crate::config::ClientConfig;
use crate::endpoint::{EndpointBuilder, ReadRequest};
use crate::error::Error;
use crate::query::{HistoryFormat, HistoryQuery, MemberHistoryQuery, SensorQuery, SensorsQuery};
use crate::record::{GroupRecord, MemberRecord, Record, SensorHistory, SensorReading};
use crate::response;
use crate::transport::HttpTransport;

/// Client bound to a single read key.
///
/// Construction validates the key locally and builds the HTTP client; it
/// never touches the network.
#[derive(Debug, Clone)]
pub struct ReadClient {
    key: ApiKey<Read>,
    endpoints: EndpointBuilder,
    transport: HttpTransport,
}

impl ReadClient {
    // ── Constructors ─────────────────────────────────────────────────

    /// Client for the production API with default timeouts.
    pub fn new(api_key: impl Into<String>) -> Result<Self, Error> {
        Self::with_config(api_key, &ClientConfig::default())
    }

    pub fn with_config(api_key: impl Into<String>, config: &ClientConfig) -> Result<Self, Error> {
        Self::from_key(ApiKey::new(api_key)?, config)
    }

    pub fn from_key(key: ApiKey<Read>, config: &ClientConfig) -> Result<Self, Error> {
        Ok(Self {
            key,
            endpoints: EndpointBuilder::new(config.base_url()?),
            transport: HttpTransport::new(&config.cloud_transport()?)?,
        })
    }

    pub fn endpoints(&self) -> &EndpointBuilder {
        &self.endpoints
    }

    // ── Exchange ─────────────────────────────────────────────────────

    async fn fetch(&self, request: &ReadRequest<'_>) -> Result<Record, Error> {
        let descriptor = self.endpoints.read(&self.key, request)?;
        Ok(response::validate(self.transport.execute(&descriptor).await)?)
    }

    async fn fetch_text(&self, request: &ReadRequest<'_>) -> Result<String, Error> {
        let descriptor = self.endpoints.read(&self.key, request)?;
        Ok(response::validate_text(self.transport.execute(&descriptor).await)?)
    }

    // ━━ Public API ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

    // ── Keys ─────────────────────────────────────────────────────────

    /// `GET /v1/keys`. Fails with a configuration error if the service
    /// reports anything other than a READ key.
    pub async fn check_key(&self) -> Result<KeyInfo, Error> {
        debug!("checking read key");
        let info: KeyInfo = self.fetch(&ReadRequest::Keys).await?.decode()?;
        self.key.expect_reported(info)
    }

    // ── Sensors ──────────────────────────────────────────────────────

    /// `GET /v1/sensors/{sensor_index}`. The reading is under `sensor`.
    pub async fn sensor(
        &self,
        sensor_index: u64,
        query: &SensorQuery,
    ) -> Result<SensorReading, Error> {
        debug!(sensor_index, "fetching sensor");
        self.fetch(&ReadRequest::Sensor {
            sensor_index,
            query,
        })
        .await
    }

    /// `GET /v1/sensors`. Rows come back as `data` in `fields` order.
    pub async fn sensors(&self, query: &SensorsQuery) -> Result<SensorReading, Error> {
        debug!(fields = query.fields.len(), "fetching sensors");
        self.fetch(&ReadRequest::Sensors(query)).await
    }

    /// `GET /v1/sensors/{sensor_index}/history`
    pub async fn sensor_history(
        &self,
        sensor_index: u64,
        query: &HistoryQuery,
    ) -> Result<SensorHistory, Error> {
        debug!(sensor_index, "fetching sensor history");
        self.fetch(&ReadRequest::SensorHistory {
            sensor_index,
            query,
            format: HistoryFormat::Json,
        })
        .await
    }

    /// `GET /v1/sensors/{sensor_index}/history/csv`, returned verbatim.
    pub async fn sensor_history_csv(
        &self,
        sensor_index: u64,
        query: &HistoryQuery,
    ) -> Result<String, Error> {
        debug!(sensor_index, "fetching sensor history (csv)");
        self.fetch_text(&ReadRequest::SensorHistory {
            sensor_index,
            query,
            format: HistoryFormat::Csv,
        })
        .await
    }

    // ── Groups ───────────────────────────────────────────────────────

    /// `GET /v1/groups`
    pub async fn groups(&self) -> Result<GroupRecord, Error> {
        debug!("listing groups");
        self.fetch(&ReadRequest::Groups).await
    }

    /// `GET /v1/groups/{group_id}`
    pub async fn group(&self, group_id: u64) -> Result<GroupRecord, Error> {
        debug!(group_id, "fetching group");
        self.fetch(&ReadRequest::Group { group_id }).await
    }

    // ── Members ──────────────────────────────────────────────────────

    /// `GET /v1/groups/{group_id}/members/{member_id}`
    pub async fn member(
        &self,
        group_id: u64,
        member_id: u64,
        fields: &[String],
    ) -> Result<MemberRecord, Error> {
        debug!(group_id, member_id, "fetching member");
        self.fetch(&ReadRequest::Member {
            group_id,
            member_id,
            fields,
        })
        .await
    }

    /// `GET /v1/groups/{group_id}/members/{member_id}/history`
    pub async fn member_history(
        &self,
        group_id: u64,
        member_id: u64,
        query: &MemberHistoryQuery,
    ) -> Result<SensorHistory, Error> {
        debug!(group_id, member_id, "fetching member history");
        self.fetch(&ReadRequest::MemberHistory {
            group_id,
            member_id,
            query,
            format: HistoryFormat::Json,
        })
        .await
    }

    /// `GET /v1/groups/{group_id}/members/{member_id}/history/csv`
    pub async fn member_history_csv(
        &self,
        group_id: u64,
        member_id: u64,
        query: &MemberHistoryQuery,
    ) -> Result<String, Error> {
        debug!(group_id, member_id, "fetching member history (csv)");
        self.fetch_text(&ReadRequest::MemberHistory {
            group_id,
            member_id,
            query,
            format: HistoryFormat::Csv,
        })
        .await
    }

    /// `GET /v1/groups/{group_id}/members`
    pub async fn members(
        &self,
        group_id: u64,
        query: &SensorsQuery,
    ) -> Result<MemberRecord, Error> {
        debug!(group_id, "fetching members");
        self.fetch(&ReadRequest::Members { group_id, query }).await
    }
}

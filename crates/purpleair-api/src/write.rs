// Async client for the PurpleAir write API: group and member management.

use tracing::{debug, info};

use crate::auth::{ApiKey, KeyInfo, Write};
use crate::config::ClientConfig;
use crate::endpoint::{EndpointBuilder, WriteRequest};
use crate::error::Error;
use crate::query::NewMember;
use crate::record::{GroupRecord, MemberRecord, Record};
use crate::response;
use crate::transport::HttpTransport;

/// Client bound to a single write key.
#[derive(Debug, Clone)]
pub struct WriteClient {
    key: ApiKey<Write>,
    endpoints: EndpointBuilder,
    transport: HttpTransport,
}

impl WriteClient {
    pub fn new(api_key: impl Into<String>) -> Result<Self, Error> {
        Self::with_config(api_key, &ClientConfig::default())
    }

    pub fn with_config(api_key: impl Into<String>, config: &ClientConfig) -> Result<Self, Error> {
        Self::from_key(ApiKey::new(api_key)?, config)
    }

    pub fn from_key(key: ApiKey<Write>, config: &ClientConfig) -> Result<Self, Error> {
        Ok(Self {
            key,
            endpoints: EndpointBuilder::new(config.base_url()?),
            transport: HttpTransport::new(&config.cloud_transport()?)?,
        })
    }

    pub fn endpoints(&self) -> &EndpointBuilder {
        &self.endpoints
    }

    async fn send(&self, request: &WriteRequest<'_>) -> Result<Record, Error> {
        let descriptor = self.endpoints.write(&self.key, request)?;
        Ok(response::validate(self.transport.execute(&descriptor).await)?)
    }

    async fn send_empty(&self, request: &WriteRequest<'_>) -> Result<(), Error> {
        let descriptor = self.endpoints.write(&self.key, request)?;
        Ok(response::validate_empty(
            self.transport.execute(&descriptor).await,
        )?)
    }

    /// `GET /v1/keys`. Fails with a configuration error unless the service
    /// reports a WRITE key.
    pub async fn check_key(&self) -> Result<KeyInfo, Error> {
        debug!("checking write key");
        let info: KeyInfo = self.send(&WriteRequest::Keys).await?.decode()?;
        self.key.expect_reported(info)
    }

    /// `POST /v1/groups`. The new id is under `group_id`.
    pub async fn create_group(&self, name: &str) -> Result<GroupRecord, Error> {
        let record = self.send(&WriteRequest::CreateGroup { name }).await?;
        info!(group_id = record.u64("group_id"), "group created");
        Ok(record)
    }

    /// `POST /v1/groups/{group_id}/members`
    pub async fn create_member(
        &self,
        group_id: u64,
        member: &NewMember,
    ) -> Result<MemberRecord, Error> {
        let record = self
            .send(&WriteRequest::CreateMember { group_id, member })
            .await?;
        info!(group_id, member_id = record.u64("member_id"), "member created");
        Ok(record)
    }

    /// `DELETE /v1/groups/{group_id}`. Removes every member too.
    pub async fn delete_group(&self, group_id: u64) -> Result<(), Error> {
        self.send_empty(&WriteRequest::DeleteGroup { group_id })
            .await?;
        info!(group_id, "group deleted");
        Ok(())
    }

    /// `DELETE /v1/groups/{group_id}/members/{member_id}`
    pub async fn delete_member(&self, group_id: u64, member_id: u64) -> Result<(), Error> {
        self.send_empty(&WriteRequest::DeleteMember {
            group_id,
            member_id,
        })
        .await?;
        info!(group_id, member_id, "member deleted");
        Ok(())
    }
}

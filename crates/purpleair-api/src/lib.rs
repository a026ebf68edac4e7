// purpleair-api: Async Rust client for the PurpleAir cloud API (read + write)
// and the local sensor JSON endpoint.
//
// Three facades share one request pipeline:
//   ReadClient  ── read key  ── sensors, history, groups, members
//   WriteClient ── write key ── create/delete groups and members
//   LocalClient ── no key    ── http://<device>/json on the LAN

pub mod auth;
pub mod config;
pub mod endpoint;
pub mod error;
pub mod local;
pub mod query;
pub mod read;
pub mod record;
pub mod response;
pub mod transport;
pub mod write;

pub use auth::{API_KEY_HEADER, ApiKey, DeviceAddresses, KeyInfo, KeyKind, KeyType, Read, Write};
pub use config::{ClientConfig, DEFAULT_BASE_URL};
pub use endpoint::{EndpointBuilder, ReadRequest, RequestDescriptor, WriteRequest};
pub use error::{ApiError, ApiErrorKind, Error};
pub use local::{DeviceOutcome, LocalClient, PollReport};
pub use query::{
    Average, BoundingBox, HistoryFormat, HistoryQuery, LocationType, MemberHistoryQuery,
    NewMember, Privacy, SensorQuery, SensorsQuery, TimeRange, Timestamp,
};
pub use read::ReadClient;
pub use record::{GroupRecord, LocalReading, MemberRecord, Record, SensorHistory, SensorReading};
pub use transport::{HttpTransport, NetworkError, RawResponse, TransportConfig};
pub use write::WriteClient;

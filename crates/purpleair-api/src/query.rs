// ── Typed request parameters ──
//
// Optional filters default to `None`/empty and are simply left off the
// query string. Required pieces (field lists for bulk and history reads)
// are validated by the endpoint builder, not here.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Where a sensor is installed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LocationType {
    Outside,
    Inside,
}

impl LocationType {
    /// Wire value: `0` outside, `1` inside.
    pub fn code(self) -> u8 {
        match self {
            Self::Outside => 0,
            Self::Inside => 1,
        }
    }
}

/// Geographic filter. Both corners are required by the service.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub nwlng: f64,
    pub nwlat: f64,
    pub selng: f64,
    pub selat: f64,
}

/// History timestamps: UNIX seconds or an ISO 8601 string, passed through
/// as given. The service echoes the same format back in `time_stamp`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Timestamp {
    Unix(i64),
    Iso8601(String),
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unix(secs) => write!(f, "{secs}"),
            Self::Iso8601(s) => f.write_str(s),
        }
    }
}

impl From<i64> for Timestamp {
    fn from(secs: i64) -> Self {
        Self::Unix(secs)
    }
}

impl From<&str> for Timestamp {
    fn from(s: &str) -> Self {
        Self::Iso8601(s.to_owned())
    }
}

/// `start_timestamp` (inclusive) .. `end_timestamp` (exclusive).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeRange {
    pub start: Option<Timestamp>,
    pub end: Option<Timestamp>,
}

impl TimeRange {
    pub fn between(start: impl Into<Timestamp>, end: impl Into<Timestamp>) -> Self {
        Self {
            start: Some(start.into()),
            end: Some(end.into()),
        }
    }
}

/// History averaging period, in minutes on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Average {
    RealTime,
    TenMinutes,
    ThirtyMinutes,
    OneHour,
    SixHours,
    OneDay,
    OneWeek,
    OneMonth,
    OneYear,
}

impl Average {
    pub fn minutes(self) -> u32 {
        match self {
            Self::RealTime => 0,
            Self::TenMinutes => 10,
            Self::ThirtyMinutes => 30,
            Self::OneHour => 60,
            Self::SixHours => 360,
            Self::OneDay => 1_440,
            Self::OneWeek => 10_080,
            Self::OneMonth => 43_200,
            Self::OneYear => 525_600,
        }
    }
}

/// Which registration period's data a history read returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Privacy {
    Auto,
    Public,
    Private,
    Both,
}

impl Privacy {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Auto => "auto",
            Self::Public => "public",
            Self::Private => "private",
            Self::Both => "both",
        }
    }
}

/// History response body format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum HistoryFormat {
    #[default]
    Json,
    Csv,
}

/// Options for a single-sensor read.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SensorQuery {
    /// Read key of a private sensor.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub read_key: Option<String>,
    /// Restrict the returned fields. Empty means the service default set.
    #[serde(default)]
    pub fields: Vec<String>,
}

/// Options for multi-sensor and group-members reads. `fields` is required.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SensorsQuery {
    pub fields: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location_type: Option<LocationType>,
    #[serde(default)]
    pub read_keys: Vec<String>,
    /// Limit results to these sensor indices.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub show_only: Option<Vec<u64>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub modified_since: Option<i64>,
    /// Seconds; `0` matches any age.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_age: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bounding_box: Option<BoundingBox>,
}

impl SensorsQuery {
    pub fn fields<I, S>(fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            fields: fields.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }
}

/// Options for a single sensor's history. `fields` is required.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryQuery {
    pub fields: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub read_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub privacy: Option<Privacy>,
    #[serde(default)]
    pub range: TimeRange,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub average: Option<Average>,
}

/// Options for a group member's history. `fields` is required.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberHistoryQuery {
    pub fields: Vec<String>,
    #[serde(default)]
    pub range: TimeRange,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub average: Option<Average>,
}

/// The three ways the service accepts a new group member.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NewMember {
    /// A public sensor by `sensor_index`.
    SensorIndex(u64),
    /// A public sensor by the id printed on its label.
    SensorId(String),
    /// A private sensor. `owner_email` must match the registration, and
    /// `location_type` is required if the sensor was registered private.
    PrivateSensor {
        sensor_id: String,
        owner_email: String,
        location_type: Option<LocationType>,
    },
}

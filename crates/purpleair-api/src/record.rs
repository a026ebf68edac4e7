// ── Loosely-typed response records ──
//
// Sensor payloads vary by firmware and API version, so responses are kept as
// JSON objects with forgiving accessors instead of fixed structs. Callers
// that want a schema can `decode` into their own type.

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::error::{ApiError, ApiErrorKind};

/// A JSON object returned by the cloud service or a local device.
///
/// Every accessor returns `None` for a missing key or a value of the wrong
/// type; nothing panics on an unexpected shape.
#[derive(Debug, Clone, Default, PartialEq, Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct Record(Map<String, Value>);

/// `GET /sensors/{index}` and `GET /sensors`.
pub type SensorReading = Record;
/// `GET /sensors/{index}/history` and member history.
pub type SensorHistory = Record;
/// Group membership payloads.
pub type MemberRecord = Record;
/// Group list and detail payloads.
pub type GroupRecord = Record;
/// `GET http://<device>/json`.
pub type LocalReading = Record;

impl Record {
    pub fn new(fields: Map<String, Value>) -> Self {
        Self(fields)
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn f64(&self, key: &str) -> Option<f64> {
        self.get(key).and_then(Value::as_f64)
    }

    pub fn i64(&self, key: &str) -> Option<i64> {
        self.get(key).and_then(Value::as_i64)
    }

    pub fn u64(&self, key: &str) -> Option<u64> {
        self.get(key).and_then(Value::as_u64)
    }

    pub fn str(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(Value::as_str)
    }

    pub fn bool(&self, key: &str) -> Option<bool> {
        self.get(key).and_then(Value::as_bool)
    }

    pub fn array(&self, key: &str) -> Option<&[Value]> {
        self.get(key).and_then(Value::as_array).map(Vec::as_slice)
    }

    /// Nested object as its own record (e.g. the `sensor` block).
    pub fn record(&self, key: &str) -> Option<Record> {
        self.get(key)
            .and_then(Value::as_object)
            .map(|m| Record(m.clone()))
    }

    /// Walk nested objects by key. Keys are taken literally, so names with
    /// dots like `pm2.5` work.
    pub fn pointer(&self, path: &[&str]) -> Option<&Value> {
        let (first, rest) = path.split_first()?;
        let mut current = self.0.get(*first)?;
        for key in rest {
            current = current.as_object()?.get(*key)?;
        }
        Some(current)
    }

    pub fn f64_at(&self, path: &[&str]) -> Option<f64> {
        self.pointer(path).and_then(Value::as_f64)
    }

    pub fn str_at(&self, path: &[&str]) -> Option<&str> {
        self.pointer(path).and_then(Value::as_str)
    }

    /// Deserialize into a caller-defined schema.
    pub fn decode<T: DeserializeOwned>(&self) -> Result<T, ApiError> {
        T::deserialize(&Value::Object(self.0.clone())).map_err(|e| {
            ApiError::with_kind(
                ApiErrorKind::MalformedResponse,
                format!("record does not match requested type: {e}"),
            )
        })
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    pub fn into_inner(self) -> Map<String, Value> {
        self.0
    }
}

impl From<Map<String, Value>> for Record {
    fn from(fields: Map<String, Value>) -> Self {
        Self(fields)
    }
}

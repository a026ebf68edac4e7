// Request descriptors for the PurpleAir cloud API and local sensors.
//
// Cloud base path: /v1/
// Auth: X-API-Key header (cloud only)
// Local: http://<address>/json, no auth
//
// Building a descriptor is pure: no I/O, and the only failure is a
// configuration error for missing or malformed parameters.

use reqwest::Method;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use serde_json::{Value, json};
use url::Url;

use crate::auth::{ApiKey, KeyKind, Read, Write};
use crate::error::Error;
use crate::query::{
    HistoryFormat, HistoryQuery, MemberHistoryQuery, NewMember, SensorQuery, SensorsQuery,
    TimeRange, Timestamp,
};

/// One fully specified, not yet executed HTTP exchange.
#[derive(Debug, Clone)]
pub struct RequestDescriptor {
    pub(crate) method: Method,
    pub(crate) url: Url,
    pub(crate) headers: HeaderMap,
    pub(crate) body: Option<Value>,
}

impl RequestDescriptor {
    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Header value as text, if present and ASCII.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    pub fn body(&self) -> Option<&Value> {
        self.body.as_ref()
    }
}

// ── Operations ───────────────────────────────────────────────────────

/// Operations available to a read key.
#[derive(Debug, Clone, Copy)]
pub enum ReadRequest<'a> {
    /// `GET keys`
    Keys,
    /// `GET sensors/{index}`
    Sensor {
        sensor_index: u64,
        query: &'a SensorQuery,
    },
    /// `GET sensors`
    Sensors(&'a SensorsQuery),
    /// `GET sensors/{index}/history[/csv]`
    SensorHistory {
        sensor_index: u64,
        query: &'a HistoryQuery,
        format: HistoryFormat,
    },
    /// `GET groups`
    Groups,
    /// `GET groups/{group_id}`
    Group { group_id: u64 },
    /// `GET groups/{group_id}/members/{member_id}`
    Member {
        group_id: u64,
        member_id: u64,
        fields: &'a [String],
    },
    /// `GET groups/{group_id}/members/{member_id}/history[/csv]`
    MemberHistory {
        group_id: u64,
        member_id: u64,
        query: &'a MemberHistoryQuery,
        format: HistoryFormat,
    },
    /// `GET groups/{group_id}/members`
    Members {
        group_id: u64,
        query: &'a SensorsQuery,
    },
}

/// Operations available to a write key.
#[derive(Debug, Clone, Copy)]
pub enum WriteRequest<'a> {
    /// `GET keys`
    Keys,
    /// `POST groups`
    CreateGroup { name: &'a str },
    /// `POST groups/{group_id}/members`
    CreateMember {
        group_id: u64,
        member: &'a NewMember,
    },
    /// `DELETE groups/{group_id}`
    DeleteGroup { group_id: u64 },
    /// `DELETE groups/{group_id}/members/{member_id}`
    DeleteMember { group_id: u64, member_id: u64 },
}

// ── Builder ──────────────────────────────────────────────────────────

/// Turns operations into [`RequestDescriptor`]s.
#[derive(Debug, Clone)]
pub struct EndpointBuilder {
    base_url: Url,
}

type Params = Vec<(&'static str, String)>;

impl EndpointBuilder {
    /// `base_url` must end with `/` (see `ClientConfig`); relative paths are
    /// joined onto it.
    pub fn new(base_url: Url) -> Self {
        Self { base_url }
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn read(
        &self,
        key: &ApiKey<Read>,
        request: &ReadRequest<'_>,
    ) -> Result<RequestDescriptor, Error> {
        match *request {
            ReadRequest::Keys => self.cloud(key, Method::GET, "keys", Params::new(), None),
            ReadRequest::Sensor {
                sensor_index,
                query,
            } => {
                let mut params = Params::new();
                if let Some(ref read_key) = query.read_key {
                    params.push(("read_key", non_empty("read_key", read_key)?));
                }
                if let Some(fields) = optional_list(&query.fields) {
                    params.push(("fields", fields));
                }
                self.cloud(
                    key,
                    Method::GET,
                    &format!("sensors/{sensor_index}"),
                    params,
                    None,
                )
            }
            ReadRequest::Sensors(query) => {
                let params = sensors_params(query)?;
                self.cloud(key, Method::GET, "sensors", params, None)
            }
            ReadRequest::SensorHistory {
                sensor_index,
                query,
                format,
            } => {
                let mut params = vec![("fields", required_list("fields", &query.fields)?)];
                if let Some(ref read_key) = query.read_key {
                    params.push(("read_key", non_empty("read_key", read_key)?));
                }
                if let Some(privacy) = query.privacy {
                    params.push(("privacy", privacy.as_str().to_owned()));
                }
                push_range(&mut params, &query.range)?;
                if let Some(average) = query.average {
                    params.push(("average", average.minutes().to_string()));
                }
                let path = history_path(&format!("sensors/{sensor_index}"), format);
                self.cloud(key, Method::GET, &path, params, None)
            }
            ReadRequest::Groups => self.cloud(key, Method::GET, "groups", Params::new(), None),
            ReadRequest::Group { group_id } => self.cloud(
                key,
                Method::GET,
                &format!("groups/{group_id}"),
                Params::new(),
                None,
            ),
            ReadRequest::Member {
                group_id,
                member_id,
                fields,
            } => {
                let mut params = Params::new();
                if let Some(fields) = optional_list(fields) {
                    params.push(("fields", fields));
                }
                self.cloud(
                    key,
                    Method::GET,
                    &format!("groups/{group_id}/members/{member_id}"),
                    params,
                    None,
                )
            }
            ReadRequest::MemberHistory {
                group_id,
                member_id,
                query,
                format,
            } => {
                let mut params = vec![("fields", required_list("fields", &query.fields)?)];
                push_range(&mut params, &query.range)?;
                if let Some(average) = query.average {
                    params.push(("average", average.minutes().to_string()));
                }
                let path = history_path(&format!("groups/{group_id}/members/{member_id}"), format);
                self.cloud(key, Method::GET, &path, params, None)
            }
            ReadRequest::Members { group_id, query } => {
                let params = sensors_params(query)?;
                self.cloud(
                    key,
                    Method::GET,
                    &format!("groups/{group_id}/members"),
                    params,
                    None,
                )
            }
        }
    }

    pub fn write(
        &self,
        key: &ApiKey<Write>,
        request: &WriteRequest<'_>,
    ) -> Result<RequestDescriptor, Error> {
        match *request {
            WriteRequest::Keys => self.cloud(key, Method::GET, "keys", Params::new(), None),
            WriteRequest::CreateGroup { name } => {
                let name = non_empty("name", name)?;
                self.cloud(
                    key,
                    Method::POST,
                    "groups",
                    Params::new(),
                    Some(json!({ "name": name })),
                )
            }
            WriteRequest::CreateMember { group_id, member } => self.cloud(
                key,
                Method::POST,
                &format!("groups/{group_id}/members"),
                Params::new(),
                Some(member_body(member)?),
            ),
            WriteRequest::DeleteGroup { group_id } => self.cloud(
                key,
                Method::DELETE,
                &format!("groups/{group_id}"),
                Params::new(),
                None,
            ),
            WriteRequest::DeleteMember {
                group_id,
                member_id,
            } => self.cloud(
                key,
                Method::DELETE,
                &format!("groups/{group_id}/members/{member_id}"),
                Params::new(),
                None,
            ),
        }
    }

    /// `GET http://{address}/json` for one local sensor. No key header.
    pub fn local(address: &str) -> Result<RequestDescriptor, Error> {
        let address = address.trim();
        if address.is_empty() {
            return Err(Error::config("device address must not be empty"));
        }
        if address
            .chars()
            .any(|c| c.is_whitespace() || matches!(c, '/' | '?' | '#' | '@'))
        {
            return Err(Error::config(format!(
                "device address {address:?} must be a bare host or host:port"
            )));
        }
        let url = Url::parse(&format!("http://{address}/json"))
            .map_err(|e| Error::config(format!("invalid device address {address:?}: {e}")))?;

        Ok(RequestDescriptor {
            method: Method::GET,
            url,
            headers: HeaderMap::new(),
            body: None,
        })
    }

    fn cloud<K: KeyKind>(
        &self,
        key: &ApiKey<K>,
        method: Method,
        path: &str,
        params: Params,
        body: Option<Value>,
    ) -> Result<RequestDescriptor, Error> {
        let mut url = self
            .base_url
            .join(path)
            .map_err(|e| Error::config(format!("invalid request path {path:?}: {e}")))?;
        if !params.is_empty() {
            url.query_pairs_mut().extend_pairs(params);
        }

        let mut headers = HeaderMap::new();
        headers.insert(HeaderName::from_static("x-api-key"), key.header_value()?);
        headers.insert(
            reqwest::header::ACCEPT,
            HeaderValue::from_static("application/json"),
        );

        Ok(RequestDescriptor {
            method,
            url,
            headers,
            body,
        })
    }
}

// ── Parameter encoding ───────────────────────────────────────────────

fn non_empty(name: &str, value: &str) -> Result<String, Error> {
    let value = value.trim();
    if value.is_empty() {
        return Err(Error::config(format!("{name} must not be empty")));
    }
    Ok(value.to_owned())
}

/// Trim entries, drop blanks, join with the service's `,` delimiter.
fn join_list<S: AsRef<str>>(items: &[S]) -> String {
    items
        .iter()
        .map(|s| s.as_ref().trim())
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join(",")
}

fn optional_list<S: AsRef<str>>(items: &[S]) -> Option<String> {
    let joined = join_list(items);
    (!joined.is_empty()).then_some(joined)
}

fn required_list<S: AsRef<str>>(name: &str, items: &[S]) -> Result<String, Error> {
    optional_list(items)
        .ok_or_else(|| Error::config(format!("{name} must list at least one entry")))
}

fn sensors_params(query: &SensorsQuery) -> Result<Params, Error> {
    let mut params = vec![("fields", required_list("fields", &query.fields)?)];
    if let Some(location) = query.location_type {
        params.push(("location_type", location.code().to_string()));
    }
    if !query.read_keys.is_empty() {
        params.push(("read_keys", required_list("read_keys", &query.read_keys)?));
    }
    if let Some(ref show_only) = query.show_only {
        if show_only.is_empty() {
            return Err(Error::config("show_only must list at least one sensor"));
        }
        let ids: Vec<String> = show_only.iter().map(u64::to_string).collect();
        params.push(("show_only", ids.join(",")));
    }
    if let Some(since) = query.modified_since {
        params.push(("modified_since", since.to_string()));
    }
    if let Some(max_age) = query.max_age {
        params.push(("max_age", max_age.to_string()));
    }
    if let Some(bbox) = query.bounding_box {
        params.push(("nwlng", bbox.nwlng.to_string()));
        params.push(("nwlat", bbox.nwlat.to_string()));
        params.push(("selng", bbox.selng.to_string()));
        params.push(("selat", bbox.selat.to_string()));
    }
    Ok(params)
}

fn push_range(params: &mut Params, range: &TimeRange) -> Result<(), Error> {
    if let (Some(Timestamp::Unix(start)), Some(Timestamp::Unix(end))) = (&range.start, &range.end)
    {
        if start > end {
            return Err(Error::config(format!(
                "start_timestamp {start} is after end_timestamp {end}"
            )));
        }
    }
    for (name, ts) in [("start_timestamp", &range.start), ("end_timestamp", &range.end)] {
        match ts {
            Some(Timestamp::Iso8601(s)) => params.push((name, non_empty(name, s)?)),
            Some(ts @ Timestamp::Unix(_)) => params.push((name, ts.to_string())),
            None => {}
        }
    }
    Ok(())
}

fn history_path(resource: &str, format: HistoryFormat) -> String {
    match format {
        HistoryFormat::Json => format!("{resource}/history"),
        HistoryFormat::Csv => format!("{resource}/history/csv"),
    }
}

fn member_body(member: &NewMember) -> Result<Value, Error> {
    match member {
        NewMember::SensorIndex(index) => Ok(json!({ "sensor_index": index })),
        NewMember::SensorId(id) => {
            let sensor_id = non_empty("sensor_id", id)?;
            Ok(json!({ "sensor_id": sensor_id }))
        }
        NewMember::PrivateSensor {
            sensor_id,
            owner_email,
            location_type,
        } => {
            let mut body = serde_json::Map::new();
            body.insert("sensor_id".into(), non_empty("sensor_id", sensor_id)?.into());
            body.insert(
                "owner_email".into(),
                non_empty("owner_email", owner_email)?.into(),
            );
            if let Some(location) = location_type {
                body.insert("location_type".into(), location.code().into());
            }
            Ok(Value::Object(body))
        }
    }
}

use std::fmt;
use std::marker::PhantomData;

use reqwest::header::HeaderValue;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Header the cloud service reads the API key from.
pub const API_KEY_HEADER: &str = "X-API-Key";

/// Key classification as reported by `GET /v1/keys`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum KeyType {
    Read,
    Write,
    /// Disabled or any type this crate does not know about.
    #[serde(other)]
    Unknown,
}

impl fmt::Display for KeyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Read => "READ",
            Self::Write => "WRITE",
            Self::Unknown => "UNKNOWN",
        })
    }
}

/// Response of `GET /v1/keys`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct KeyInfo {
    pub api_version: String,
    pub time_stamp: i64,
    pub api_key_type: KeyType,
}

mod sealed {
    pub trait Sealed {}
}

/// Compile-time key family. Implemented only by [`Read`] and [`Write`].
pub trait KeyKind: sealed::Sealed + Send + Sync + 'static {
    const TYPE: KeyType;
}

/// Marker for read keys.
#[derive(Debug, Clone, Copy)]
pub struct Read;

/// Marker for write keys.
#[derive(Debug, Clone, Copy)]
pub struct Write;

impl sealed::Sealed for Read {}
impl sealed::Sealed for Write {}

impl KeyKind for Read {
    const TYPE: KeyType = KeyType::Read;
}

impl KeyKind for Write {
    const TYPE: KeyType = KeyType::Write;
}

/// A PurpleAir API key bound to one key family.
///
/// The family lives in the type, so an `ApiKey<Read>` can never reach a
/// write endpoint. The secret is only exposed when the request header is
/// built, and that header is flagged sensitive.
#[derive(Clone)]
pub struct ApiKey<K: KeyKind> {
    secret: SecretString,
    kind: PhantomData<K>,
}

impl<K: KeyKind> ApiKey<K> {
    /// Wrap a key string. Empty or non-header-safe keys are rejected with
    /// [`Error::Configuration`]. Any other content is passed through as is.
    pub fn new(key: impl Into<String>) -> Result<Self, Error> {
        let key = key.into();
        if key.is_empty() {
            return Err(Error::config(format!(
                "{} API key must not be empty",
                K::TYPE
            )));
        }
        if HeaderValue::from_str(&key).is_err() {
            return Err(Error::config(format!(
                "{} API key contains characters not allowed in an HTTP header",
                K::TYPE
            )));
        }
        Ok(Self {
            secret: key.into(),
            kind: PhantomData,
        })
    }

    pub fn key_type(&self) -> KeyType {
        K::TYPE
    }

    /// Compare the type reported by `GET /v1/keys` with this key's family.
    pub(crate) fn expect_reported(&self, info: KeyInfo) -> Result<KeyInfo, Error> {
        if info.api_key_type == K::TYPE {
            Ok(info)
        } else {
            Err(Error::config(format!(
                "expected a {} key, service reports {}",
                K::TYPE,
                info.api_key_type
            )))
        }
    }

    pub(crate) fn header_value(&self) -> Result<HeaderValue, Error> {
        let mut value = HeaderValue::from_str(self.secret.expose_secret())
            .map_err(|e| Error::config(format!("invalid API key header value: {e}")))?;
        value.set_sensitive(true);
        Ok(value)
    }
}

impl<K: KeyKind> fmt::Debug for ApiKey<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiKey")
            .field("type", &K::TYPE)
            .field("secret", &"[REDACTED]")
            .finish()
    }
}

/// Ordered list of local sensor addresses (IPv4 or hostname, optional
/// `:port`).
///
/// May be empty: the local client only rejects an empty list when a poll is
/// attempted. Duplicates are kept and polled once per occurrence.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DeviceAddresses(Vec<String>);

impl DeviceAddresses {
    pub fn new<I, S>(addresses: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(addresses.into_iter().map(Into::into).collect())
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, String> {
        self.0.iter()
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }
}

impl<S: Into<String>> FromIterator<S> for DeviceAddresses {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self::new(iter)
    }
}

impl From<Vec<String>> for DeviceAddresses {
    fn from(addresses: Vec<String>) -> Self {
        Self(addresses)
    }
}

impl From<Vec<&str>> for DeviceAddresses {
    fn from(addresses: Vec<&str>) -> Self {
        Self::new(addresses)
    }
}

impl<'a> IntoIterator for &'a DeviceAddresses {
    type Item = &'a String;
    type IntoIter = std::slice::Iter<'a, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

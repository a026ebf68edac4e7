use thiserror::Error;

/// Top-level error type for the `purpleair-api` crate.
///
/// Configuration problems are reported before any request leaves the
/// process. Everything that goes wrong on the wire, at the cloud service or
/// on a local device, arrives as [`ApiError`].
#[derive(Debug, Error)]
pub enum Error {
    // ── Configuration ───────────────────────────────────────────────
    /// Invalid or missing construction-time or call-time input
    /// (empty key, empty field list, inverted time range, ...).
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    // ── Remote ──────────────────────────────────────────────────────
    /// The exchange itself failed: transport, status, or body shape.
    #[error(transparent)]
    Api(#[from] ApiError),
}

impl Error {
    pub(crate) fn config(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Human-readable message, without the variant prefix.
    pub fn message(&self) -> &str {
        match self {
            Self::Configuration { message } => message,
            Self::Api(err) => err.message(),
        }
    }

    /// The wrapped [`ApiError`], if this is a remote failure.
    pub fn as_api(&self) -> Option<&ApiError> {
        match self {
            Self::Api(err) => Some(err),
            Self::Configuration { .. } => None,
        }
    }

    pub fn is_configuration(&self) -> bool {
        matches!(self, Self::Configuration { .. })
    }
}

/// Where an [`ApiError`] came from.
///
/// The public surface only promises a message, but the validator tags every
/// error so callers (and tests) can branch without parsing strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiErrorKind {
    /// Connection refused, DNS failure, or timeout.
    Network { timed_out: bool },
    /// Non-success HTTP status.
    Status { code: u16 },
    /// 2xx with a body that is not a JSON object.
    MalformedResponse,
    /// Local poll attempted with an empty address list.
    NoDevices,
    /// A local address that cannot form a request URL.
    InvalidAddress,
    /// Constructed by a caller via [`ApiError::new`].
    Other,
}

/// Unified failure for every PurpleAir exchange.
///
/// `Display` prints the message verbatim. No retry metadata is carried:
/// anything the service said about rate limits is embedded in the text.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct ApiError {
    message: String,
    kind: ApiErrorKind,
}

impl ApiError {
    pub fn new(message: impl Into<String>) -> Self {
        Self::with_kind(ApiErrorKind::Other, message)
    }

    pub(crate) fn with_kind(kind: ApiErrorKind, message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            kind,
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn kind(&self) -> ApiErrorKind {
        self.kind
    }

    /// HTTP status code, when the failure was a non-success response.
    pub fn status(&self) -> Option<u16> {
        match self.kind {
            ApiErrorKind::Status { code } => Some(code),
            _ => None,
        }
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self.kind, ApiErrorKind::Network { timed_out: true })
    }

    pub fn is_network(&self) -> bool {
        matches!(self.kind, ApiErrorKind::Network { .. })
    }
}

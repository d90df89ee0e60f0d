//! Error taxonomy for node queries.
//!
//! Lower layers produce a [`FetchError`]; every public query wraps it in a
//! [`QueryError`] whose `Display` is the fixed, query-specific message and
//! whose `source()` keeps the underlying cause for diagnostics.

use crate::query::Query;

/// Substrings in an error reply body that mean the requested item is absent
/// or the id could not be interpreted.
const NOT_FOUND_PHRASES: &[&str] = &["not found", "missing", "does not exist", "invalid"];

// ==============================================================================
// Transport Errors
// ==============================================================================

/// Failure reported by a [`Transport`](crate::transport::Transport).
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// Connection, TLS, timeout or body-read failure.
    #[error("HTTP transport failure: {0}")]
    Http(#[from] reqwest::Error),

    /// The node answered with a non-success status.
    #[error("node responded with HTTP {status}: {body}")]
    Status { status: u16, body: String },
}

impl TransportError {
    /// Whether a retry has a chance of succeeding: connect and timeout
    /// failures, `429`, and any `5xx` that is not a not-found reply.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Http(err) => err.is_connect() || err.is_timeout(),
            Self::Status { status, .. } => {
                (*status == 429 || (500..600).contains(status)) && !self.is_not_found()
            }
        }
    }

    /// Whether the node reported the requested item as absent: `404`, or a
    /// `4xx`/`5xx` whose body names a missing or uninterpretable item.
    pub fn is_not_found(&self) -> bool {
        let Self::Status { status, body } = self else {
            return false;
        };
        if *status == 404 {
            return true;
        }
        if !(400..600).contains(status) {
            return false;
        }

        let body = body.to_ascii_lowercase();
        NOT_FOUND_PHRASES.iter().any(|phrase| body.contains(phrase))
    }
}

// ==============================================================================
// Fetch Errors
// ==============================================================================

/// Unclassified cause of a failed query.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error("node has no {what}")]
    NotFound { what: String },

    #[error("malformed {entity} in node response: {reason}")]
    Decode { entity: &'static str, reason: String },

    #[error("invalid block range: {reason}")]
    Range { reason: String },
}

impl FetchError {
    pub(crate) fn decode(entity: &'static str, reason: impl std::fmt::Display) -> Self {
        Self::Decode {
            entity,
            reason: reason.to_string(),
        }
    }

    pub(crate) fn not_found(what: impl Into<String>) -> Self {
        Self::NotFound { what: what.into() }
    }

    pub(crate) fn range(reason: impl Into<String>) -> Self {
        Self::Range {
            reason: reason.into(),
        }
    }
}

// ==============================================================================
// Query Errors
// ==============================================================================

/// Classification of a failed query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    NotFound,
    Range,
    Decode,
    Transport,
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotFound => write!(f, "not_found"),
            Self::Range => write!(f, "range"),
            Self::Decode => write!(f, "decode"),
            Self::Transport => write!(f, "transport"),
        }
    }
}

/// The only error a public query returns.
///
/// `Display` yields the fixed message for the query (for example
/// `"Error fetching block."`), which callers may match on. The node's detail
/// is reachable through [`std::error::Error::source`].
#[derive(Debug, thiserror::Error)]
#[error("{}", .query.failure_message())]
pub struct QueryError {
    query: Query,
    source: FetchError,
}

impl QueryError {
    pub(crate) fn new(query: Query, source: FetchError) -> Self {
        Self { query, source }
    }

    /// The query that failed.
    pub fn query(&self) -> &Query {
        &self.query
    }

    pub fn kind(&self) -> ErrorKind {
        match &self.source {
            FetchError::Transport(_) => ErrorKind::Transport,
            FetchError::NotFound { .. } => ErrorKind::NotFound,
            FetchError::Decode { .. } => ErrorKind::Decode,
            FetchError::Range { .. } => ErrorKind::Range,
        }
    }

    /// The underlying cause, for callers that want more than the message.
    pub fn cause(&self) -> &FetchError {
        &self.source
    }
}

// ==============================================================================
// Configuration Errors
// ==============================================================================

/// Rejected [`ClientConfig`](crate::config::ClientConfig) values.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid endpoint `{url}`: expected HTTP(S) URL ({reason})")]
    InvalidEndpoint { url: String, reason: String },

    #[error("unsupported endpoint scheme `{0}`; expected http or https")]
    UnsupportedScheme(String),

    #[error("basic auth user and password must both be non-empty")]
    EmptyCredentials,

    #[error("{0} must be at least 1")]
    Zero(&'static str),
}

pub use reqwest::StatusCode;
use thiserror::Error;

/// Fallback detail when neither the provider nor HTTP gives us any text.
pub const GENERIC_DETAIL: &str = "Failed to fetch";

/// Why a weather lookup failed.
///
/// HTTP variants carry the provider's `message` when it sent one, otherwise the
/// status reason phrase.
#[derive(Debug, Error)]
pub enum FetchError {
    /// 401: API key invalid or missing.
    #[error("{detail}")]
    Unauthorized { detail: String },

    /// 404: the provider could not resolve the city.
    #[error("{detail}")]
    NotFound { detail: String },

    /// 429: caller should back off.
    #[error("{detail}")]
    RateLimited { detail: String },

    /// Any other non-2xx status.
    #[error("{detail}")]
    Http { status: u16, detail: String },

    /// A 2xx response whose body is not a weather record.
    #[error("unreadable weather record (status {status}): {detail}")]
    Malformed { status: u16, detail: String },

    /// No HTTP response at all (DNS, connection refused, offline...).
    #[error("failed to reach weather service: {0}")]
    Transport(#[source] reqwest::Error),
}

impl FetchError {
    /// Classify a failed HTTP status.
    pub fn from_status(status: StatusCode, detail: impl Into<String>) -> Self {
        let detail = detail.into();
        match status {
            StatusCode::UNAUTHORIZED => Self::Unauthorized { detail },
            StatusCode::NOT_FOUND => Self::NotFound { detail },
            StatusCode::TOO_MANY_REQUESTS => Self::RateLimited { detail },
            other => Self::Http { status: other.as_u16(), detail },
        }
    }

    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::Unauthorized { .. } => Some(401),
            Self::NotFound { .. } => Some(404),
            Self::RateLimited { .. } => Some(429),
            Self::Http { status, .. } | Self::Malformed { status, .. } => Some(*status),
            Self::Transport(_) => None,
        }
    }

    pub fn detail(&self) -> String {
        match self {
            Self::Unauthorized { detail }
            | Self::NotFound { detail }
            | Self::RateLimited { detail }
            | Self::Http { detail, .. }
            | Self::Malformed { detail, .. } => detail.clone(),
            Self::Transport(e) => e.to_string(),
        }
    }
}

/// Pick the most helpful detail text for a failed response: the body's
/// `message`, then the reason phrase, then [`GENERIC_DETAIL`].
pub(crate) fn failure_detail(status: StatusCode, body: Option<&serde_json::Value>) -> String {
    body.and_then(|b| b.get("message"))
        .and_then(|m| m.as_str())
        .filter(|m| !m.is_empty())
        .map(str::to_owned)
        .or_else(|| status.canonical_reason().map(str::to_owned))
        .unwrap_or_else(|| GENERIC_DETAIL.to_string())
}

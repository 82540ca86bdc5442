//! Error types and response classification
//!
//! Failed Spikkl calls surface as a single [`ApiError`] enum. Responses with
//! an HTTP status of 400 or higher are run through [`ApiError::classify`],
//! which first inspects the structured failure envelope
//! (`{"status": "failed", "status_code": "<TAG>"}`) and falls back to the
//! raw HTTP status when the envelope is absent or carries an unknown tag.
//! Both dispatches are plain lookup tables, so adding a code touches no
//! control flow.

use serde_json::Value;
use thiserror::Error;

use crate::validator::ValidationError;

/// Discriminant for classified API failures
///
/// Semantic kinds come from the failure envelope's `status_code` tag and are
/// independent of the HTTP status; generic kinds are derived from the HTTP
/// status alone when no envelope matches. `Other` is the final fallback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// `ACCESS_RESTRICTED` — the request origin is not allowed
    AccessRestricted,
    /// `INVALID_API_KEY` — the key is unknown to the service
    InvalidApiKey,
    /// `REVOKED_API_KEY` — the key was valid once but has been revoked
    RevokedApiKey,
    /// `ZERO_RESULTS` — the query matched nothing
    ZeroResults,
    /// `QUOTA_REACHED` — the subscription has no requests left
    QuotaReached,
    /// `OUT_OF_RANGE` — the coordinate lies outside the service coverage
    OutOfRange,
    /// `INVALID_REQUEST` — the service rejected the query parameters
    InvalidRequest,
    /// HTTP 400 without a recognized envelope
    BadRequest,
    /// HTTP 401 without a recognized envelope
    Unauthorized,
    /// HTTP 403 without a recognized envelope
    AccessDenied,
    /// HTTP 404 without a recognized envelope
    PageNotFound,
    /// HTTP 500 without a recognized envelope
    ServerError,
    /// Neither the envelope nor the HTTP status matched
    Other,
}

/// Envelope `status_code` tag to error kind
const STATUS_TAG_KINDS: &[(&str, ErrorKind)] = &[
    ("ACCESS_RESTRICTED", ErrorKind::AccessRestricted),
    ("INVALID_API_KEY", ErrorKind::InvalidApiKey),
    ("REVOKED_API_KEY", ErrorKind::RevokedApiKey),
    ("ZERO_RESULTS", ErrorKind::ZeroResults),
    ("QUOTA_REACHED", ErrorKind::QuotaReached),
    ("OUT_OF_RANGE", ErrorKind::OutOfRange),
    ("INVALID_REQUEST", ErrorKind::InvalidRequest),
];

/// HTTP status to error kind, used when no envelope tag matches
const HTTP_STATUS_KINDS: &[(u16, ErrorKind)] = &[
    (400, ErrorKind::BadRequest),
    (401, ErrorKind::Unauthorized),
    (403, ErrorKind::AccessDenied),
    (404, ErrorKind::PageNotFound),
    (500, ErrorKind::ServerError),
];

impl ErrorKind {
    /// Resolve an envelope `status_code` tag, if known
    #[must_use]
    pub fn from_status_tag(tag: &str) -> Option<Self> {
        STATUS_TAG_KINDS
            .iter()
            .find(|(candidate, _)| *candidate == tag)
            .map(|(_, kind)| *kind)
    }

    /// Resolve an HTTP status code, if known
    #[must_use]
    pub fn from_http_status(status: u16) -> Option<Self> {
        HTTP_STATUS_KINDS
            .iter()
            .find(|(candidate, _)| *candidate == status)
            .map(|(_, kind)| *kind)
    }

    /// The fixed human-readable message for this kind
    #[must_use]
    pub const fn message(self) -> &'static str {
        match self {
            Self::AccessRestricted => "Access restricted for this origin.",
            Self::InvalidApiKey => "Invalid API key provided.",
            Self::RevokedApiKey => "Provided API key revoked.",
            Self::ZeroResults => "No results found.",
            Self::QuotaReached => "No requests left, consider upgrading.",
            Self::OutOfRange => "Provided coordinate not in range.",
            Self::InvalidRequest => "Invalid parameters provided.",
            Self::BadRequest => "Bad request.",
            Self::Unauthorized => "Unauthorized.",
            Self::AccessDenied => "Access denied.",
            Self::PageNotFound => "Not found.",
            Self::ServerError => "Server error.",
            Self::Other => "API Error.",
        }
    }
}

/// Errors that can occur during Spikkl API operations
#[derive(Debug, Error)]
pub enum ApiError {
    /// The configured API key does not match the required format
    #[error(
        "Invalid api key: \"{key}\". Your API key should contain lowercase hexadecimal characters only and must be 32 characters long."
    )]
    InvalidApiKey {
        /// The rejected key, trimmed
        key: String,
    },

    /// A request was attempted before an API key was configured
    #[error("You have not set an API key. Please use set_api_key() to set the API key.")]
    MissingApiKey,

    /// Caller input failed country-specific validation
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The HTTP request itself failed, no response was received
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// The HTTP request timed out
    #[error("Request timed out after {timeout_secs} seconds")]
    Timeout {
        /// The timeout duration in seconds
        timeout_secs: u64,
    },

    /// The transport returned without a readable response
    #[error("Did not receive any API response.")]
    NoResponse,

    /// The response arrived with an empty body
    #[error("No response body found.")]
    EmptyBody,

    /// The response body is not valid JSON
    #[error("Unable to decode Spikkl response: \"{body}\".")]
    MalformedResponse {
        /// The raw body as received
        body: String,
    },

    /// The service reported a failure, classified by envelope or HTTP status
    #[error("{}", .kind.message())]
    Api {
        /// The classified failure kind
        kind: ErrorKind,
        /// The HTTP status code as received
        status: u16,
        /// The raw response body, for caller inspection
        body: String,
    },
}

impl ApiError {
    /// Classify a non-2xx HTTP response into a typed error
    ///
    /// The body is parsed as JSON first; unparseable bodies become
    /// [`ApiError::MalformedResponse`]. A failure envelope with a known
    /// `status_code` tag wins over the HTTP status; otherwise the status
    /// table applies, and anything left over lands on [`ErrorKind::Other`].
    #[must_use]
    pub fn classify(status: u16, body: &str) -> Self {
        let Ok(value) = serde_json::from_str::<Value>(body) else {
            return Self::MalformedResponse {
                body: body.to_string(),
            };
        };

        let kind = envelope_kind(&value)
            .or_else(|| ErrorKind::from_http_status(status))
            .unwrap_or(ErrorKind::Other);

        Self::Api {
            kind,
            status,
            body: body.to_string(),
        }
    }

    /// The classified failure kind, if this error came from a response
    #[must_use]
    pub const fn kind(&self) -> Option<ErrorKind> {
        match self {
            Self::Api { kind, .. } => Some(*kind),
            _ => None,
        }
    }

    /// The HTTP status code, if this error came from a response
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// The raw response body, if this error carries one
    #[must_use]
    pub fn response_body(&self) -> Option<&str> {
        match self {
            Self::Api { body, .. } | Self::MalformedResponse { body } => Some(body),
            _ => None,
        }
    }

    /// Returns true if retrying the call could succeed
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        match self {
            Self::ConnectionFailed(_) | Self::Timeout { .. } | Self::NoResponse => true,
            Self::Api { kind, .. } => matches!(*kind, ErrorKind::ServerError),
            _ => false,
        }
    }
}

/// Extract the error kind from a failure envelope, if present and known
///
/// Requires `status == "failed"` and a `status_code` string matching one of
/// the semantic tags.
fn envelope_kind(value: &Value) -> Option<ErrorKind> {
    let status = value.get("status")?.as_str()?;
    if status != "failed" {
        return None;
    }

    let tag = value.get("status_code")?.as_str()?;
    ErrorKind::from_status_tag(tag)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_semantic_tag_wins_over_http_status() {
        let err = ApiError::classify(422, r#"{"status":"failed","status_code":"INVALID_REQUEST"}"#);

        assert_eq!(err.kind(), Some(ErrorKind::InvalidRequest));
        assert_eq!(err.status(), Some(422));
        assert_eq!(err.to_string(), "Invalid parameters provided.");
    }

    #[test]
    fn test_all_semantic_tags_classified() {
        let cases = [
            ("ACCESS_RESTRICTED", ErrorKind::AccessRestricted, "Access restricted for this origin."),
            ("INVALID_API_KEY", ErrorKind::InvalidApiKey, "Invalid API key provided."),
            ("REVOKED_API_KEY", ErrorKind::RevokedApiKey, "Provided API key revoked."),
            ("ZERO_RESULTS", ErrorKind::ZeroResults, "No results found."),
            ("QUOTA_REACHED", ErrorKind::QuotaReached, "No requests left, consider upgrading."),
            ("OUT_OF_RANGE", ErrorKind::OutOfRange, "Provided coordinate not in range."),
            ("INVALID_REQUEST", ErrorKind::InvalidRequest, "Invalid parameters provided."),
        ];

        for (tag, kind, message) in cases {
            let body = format!(r#"{{"status":"failed","status_code":"{tag}"}}"#);
            let err = ApiError::classify(400, &body);
            assert_eq!(err.kind(), Some(kind), "tag: {tag}");
            assert_eq!(err.to_string(), message, "tag: {tag}");
        }
    }

    #[test]
    fn test_http_status_fallback_without_envelope() {
        let err = ApiError::classify(404, r#"{"error":"gone"}"#);

        assert_eq!(err.kind(), Some(ErrorKind::PageNotFound));
        assert_eq!(err.status(), Some(404));
        assert_eq!(err.to_string(), "Not found.");
    }

    #[test]
    fn test_all_http_statuses_classified() {
        let cases = [
            (400, ErrorKind::BadRequest, "Bad request."),
            (401, ErrorKind::Unauthorized, "Unauthorized."),
            (403, ErrorKind::AccessDenied, "Access denied."),
            (404, ErrorKind::PageNotFound, "Not found."),
            (500, ErrorKind::ServerError, "Server error."),
        ];

        for (status, kind, message) in cases {
            let err = ApiError::classify(status, "{}");
            assert_eq!(err.kind(), Some(kind), "status: {status}");
            assert_eq!(err.to_string(), message, "status: {status}");
        }
    }

    #[test]
    fn test_unknown_tag_falls_back_to_http_status() {
        let err = ApiError::classify(404, r#"{"status":"failed","status_code":"UNKNOWN_TAG"}"#);

        assert_eq!(err.kind(), Some(ErrorKind::PageNotFound));
        assert_eq!(err.to_string(), "Not found.");
    }

    #[test]
    fn test_unmatched_status_yields_generic_error() {
        let err = ApiError::classify(418, r#"{"status":"failed","status_code":"UNKNOWN_TAG"}"#);

        assert_eq!(err.kind(), Some(ErrorKind::Other));
        assert_eq!(err.status(), Some(418));
        assert_eq!(err.to_string(), "API Error.");
    }

    #[test]
    fn test_status_ok_envelope_is_not_semantic() {
        // An envelope whose status is not "failed" must not dispatch on the tag.
        let err = ApiError::classify(500, r#"{"status":"ok","status_code":"ZERO_RESULTS"}"#);

        assert_eq!(err.kind(), Some(ErrorKind::ServerError));
    }

    #[test]
    fn test_non_object_json_falls_back_to_http_status() {
        let err = ApiError::classify(400, "[1, 2, 3]");
        assert_eq!(err.kind(), Some(ErrorKind::BadRequest));
    }

    #[test]
    fn test_malformed_body_carries_raw_body() {
        let err = ApiError::classify(500, "not json");

        assert!(matches!(err, ApiError::MalformedResponse { .. }));
        assert_eq!(
            err.to_string(),
            "Unable to decode Spikkl response: \"not json\"."
        );
        assert_eq!(err.response_body(), Some("not json"));
    }

    #[test]
    fn test_classified_error_retains_body() {
        let body = r#"{"status":"failed","status_code":"ZERO_RESULTS"}"#;
        let err = ApiError::classify(404, body);
        assert_eq!(err.response_body(), Some(body));
    }

    #[test]
    fn test_retryable_errors() {
        assert!(ApiError::ConnectionFailed("reset".to_string()).is_retryable());
        assert!(ApiError::Timeout { timeout_secs: 10 }.is_retryable());
        assert!(ApiError::classify(500, "{}").is_retryable());

        assert!(!ApiError::MissingApiKey.is_retryable());
        assert!(!ApiError::classify(400, "{}").is_retryable());
        assert!(!ApiError::EmptyBody.is_retryable());
    }

    #[test]
    fn test_validation_error_is_transparent() {
        let validation = ValidationError::InvalidLongitude { longitude: 181.0 };
        let err = ApiError::from(validation);
        assert_eq!(err.to_string(), "Invalid longitude provided [181].");
    }
}

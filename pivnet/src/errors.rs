//! Errors returned by the remote API.

use reqwest::StatusCode;
use thiserror::Error;

/// Error body, as returned by the API on failures.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: Option<String>,
}

/// Non-successful API response.
///
/// The message is the one sent by the remote end, unmodified.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ApiError {
    #[error("pivnet resource not found: {0}")]
    NotFound(String),
    #[error("pivnet request unauthorized: {0}")]
    Unauthorized(String),
    #[error("pivnet request forbidden: {0}")]
    Forbidden(String),
    #[error("pivnet rate limit exceeded: {0}")]
    RateLimited(String),
    #[error("pivnet request failed with status {status}: {message}")]
    Unexpected { status: u16, message: String },
}

impl ApiError {
    /// Build an error from a response status and its raw body.
    pub fn from_response(status: StatusCode, body: &str) -> Self {
        let message = match serde_json::from_str::<ErrorBody>(body) {
            Ok(ErrorBody { message: Some(msg) }) => msg,
            _ if body.trim().is_empty() => status
                .canonical_reason()
                .unwrap_or("no response body")
                .to_string(),
            _ => body.trim().to_string(),
        };

        match status {
            StatusCode::NOT_FOUND => ApiError::NotFound(message),
            StatusCode::UNAUTHORIZED => ApiError::Unauthorized(message),
            StatusCode::FORBIDDEN => ApiError::Forbidden(message),
            StatusCode::TOO_MANY_REQUESTS => ApiError::RateLimited(message),
            _ => ApiError::Unexpected {
                status: status.as_u16(),
                message,
            },
        }
    }

    /// HTTP status code of the failed response.
    pub fn status(&self) -> u16 {
        match self {
            ApiError::NotFound(_) => 404,
            ApiError::Unauthorized(_) => 401,
            ApiError::Forbidden(_) => 403,
            ApiError::RateLimited(_) => 429,
            ApiError::Unexpected { status, .. } => *status,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_message_is_kept_verbatim() {
        let err = ApiError::from_response(
            StatusCode::NOT_FOUND,
            r#"{"status":404,"message":"Product with slug 'foo' not found"}"#,
        );
        assert_eq!(
            err,
            ApiError::NotFound("Product with slug 'foo' not found".to_string())
        );
        assert_eq!(err.status(), 404);
    }

    #[test]
    fn raw_body_when_not_json() {
        let err = ApiError::from_response(StatusCode::BAD_GATEWAY, "upstream down\n");
        assert_eq!(
            err.to_string(),
            "pivnet request failed with status 502: upstream down"
        );
    }

    #[test]
    fn reason_when_body_is_empty() {
        let err = ApiError::from_response(StatusCode::TOO_MANY_REQUESTS, "");
        assert_eq!(err, ApiError::RateLimited("Too Many Requests".to_string()));
    }
}

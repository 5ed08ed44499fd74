use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Access denied for {url}: {body}")]
    AccessDenied { url: String, body: String },

    #[error("Data source not found: {0}")]
    NotFound(String),

    #[error("Rate limited by {0} - please wait before retrying")]
    RateLimited(String),

    #[error("Server error from {url}: {body}")]
    ServerError { url: String, body: String },

    #[error("Network error: {0}")]
    NetworkError(#[from] reqwest::Error),

    #[error("Invalid response from {url}: {detail}")]
    InvalidResponse { url: String, detail: String },
}

/// Maximum length for error response bodies in error messages
const MAX_ERROR_BODY_LENGTH: usize = 300;

impl ApiError {
    /// Truncate a response body to avoid logging excessive data
    fn truncate_body(body: &str) -> String {
        if body.len() <= MAX_ERROR_BODY_LENGTH {
            return body.to_string();
        }
        let mut end = MAX_ERROR_BODY_LENGTH;
        while !body.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}... (truncated, {} total bytes)", &body[..end], body.len())
    }

    pub fn from_status(status: reqwest::StatusCode, url: &str, body: &str) -> Self {
        let url = url.to_string();
        let body = Self::truncate_body(body);
        match status.as_u16() {
            401 | 403 => ApiError::AccessDenied { url, body },
            404 | 410 => ApiError::NotFound(url),
            429 => ApiError::RateLimited(url),
            500..=599 => ApiError::ServerError { url, body },
            _ => ApiError::InvalidResponse {
                url,
                detail: format!("status {}: {}", status, body),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::StatusCode;

    const URL: &str = "https://example.org/students.json";

    #[test]
    fn test_from_status() {
        assert!(matches!(
            ApiError::from_status(StatusCode::NOT_FOUND, URL, ""),
            ApiError::NotFound(url) if url == URL
        ));
        assert!(matches!(
            ApiError::from_status(StatusCode::FORBIDDEN, URL, "no"),
            ApiError::AccessDenied { .. }
        ));
        assert!(matches!(
            ApiError::from_status(StatusCode::TOO_MANY_REQUESTS, URL, ""),
            ApiError::RateLimited(_)
        ));
        assert!(matches!(
            ApiError::from_status(StatusCode::BAD_GATEWAY, URL, "oops"),
            ApiError::ServerError { .. }
        ));
        assert!(matches!(
            ApiError::from_status(StatusCode::IM_A_TEAPOT, URL, ""),
            ApiError::InvalidResponse { .. }
        ));
    }

    #[test]
    fn test_truncate_body() {
        assert_eq!(ApiError::truncate_body("short"), "short");
        let long = "é".repeat(400);
        let truncated = ApiError::truncate_body(&long);
        assert!(truncated.contains("(truncated, 800 total bytes)"));
        assert!(truncated.len() < long.len());
    }
}

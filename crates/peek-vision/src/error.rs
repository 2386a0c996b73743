/// Longest slice of an error body carried into a message
const DETAILS_LIMIT: usize = 200;

#[derive(Debug, thiserror::Error)]
pub enum VisionError {
    #[error("Vision API request timed out.")]
    Timeout,

    #[error("Bad request (400). Check API key, endpoint and payload.\nDetails: {details}")]
    BadRequest { details: String },

    #[error("Forbidden (403). API key is invalid or lacks permission.")]
    Forbidden,

    #[error("Rate limited (429). Wait before capturing again.")]
    RateLimited,

    #[error("Vision API returned HTTP {status}.")]
    HttpStatus { status: u16 },

    #[error("Could not reach vision API: {0}")]
    Network(String),

    #[error("Could not parse API response: {0}")]
    Parse(String),

    #[error("Content blocked. Reason: {reason}. Details: {details}")]
    Blocked { reason: String, details: String },

    #[error("No candidates or feedback in API response.")]
    EmptyResponse,
}

impl VisionError {
    /// Map a non-success HTTP status and its body
    pub fn from_status(status: u16, body: &str) -> Self {
        match status {
            400 => VisionError::BadRequest {
                details: truncate(body.trim(), DETAILS_LIMIT),
            },
            403 => VisionError::Forbidden,
            429 => VisionError::RateLimited,
            status => VisionError::HttpStatus { status },
        }
    }
}

impl From<reqwest::Error> for VisionError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            VisionError::Timeout
        } else if e.is_decode() {
            VisionError::Parse(e.to_string())
        } else {
            VisionError::Network(e.to_string())
        }
    }
}

fn truncate(text: &str, limit: usize) -> String {
    match text.char_indices().nth(limit) {
        Some((idx, _)) => format!("{}...", &text[..idx]),
        None => text.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_codes_map_to_distinct_kinds() {
        assert!(matches!(VisionError::from_status(400, "bad"), VisionError::BadRequest { .. }));
        assert!(matches!(VisionError::from_status(403, ""), VisionError::Forbidden));
        assert!(matches!(VisionError::from_status(429, ""), VisionError::RateLimited));
        assert!(matches!(
            VisionError::from_status(503, ""),
            VisionError::HttpStatus { status: 503 }
        ));
    }

    #[test]
    fn rate_limit_message_differs_from_network_message() {
        let limited = VisionError::RateLimited.to_string();
        let network = VisionError::Network("connection refused".into()).to_string();
        assert!(limited.contains("429"));
        assert_ne!(limited, network);
    }

    #[test]
    fn bad_request_details_are_truncated() {
        let body = "x".repeat(500);
        let VisionError::BadRequest { details } = VisionError::from_status(400, &body) else {
            panic!("expected BadRequest");
        };
        assert_eq!(details.chars().count(), DETAILS_LIMIT + 3);
        assert!(details.ends_with("..."));
    }

    #[test]
    fn truncate_respects_char_boundaries() {
        assert_eq!(truncate("日本語テキスト", 3), "日本語...");
        assert_eq!(truncate("short", 10), "short");
    }
}

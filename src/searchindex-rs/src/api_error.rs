use reqwest::StatusCode;
use searchindex_core::ErrorBody;

/// Error reported by the search API for a non-2xx response
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("API error ({status}, {}): {message}", .code.as_deref().unwrap_or("Error"))]
pub struct ApiError {
    pub status: u16,
    pub code: Option<String>,
    pub message: String,
    pub raw_body: String,
}

/// Builds an [`ApiError`] from the status and body of a failed response
pub trait ErrorTranslator: Send + Sync {
    fn translate(&self, status: u16, body: &str) -> ApiError;
}

/// Reads `{"code": ..., "message": ...}` error documents.
///
/// Without a usable `message` the raw body text is used, and for an empty body
/// the HTTP reason phrase.
#[derive(Debug, Default, Clone, Copy)]
pub struct SearchErrorTranslator;

impl ErrorTranslator for SearchErrorTranslator {
    fn translate(&self, status: u16, body: &str) -> ApiError {
        let parsed = serde_json::from_str::<serde_json::Value>(body)
            .map(|value| ErrorBody::from_value(&value))
            .unwrap_or_default();

        let message = parsed
            .message
            .filter(|m| !m.is_empty())
            .unwrap_or_else(|| fallback_message(status, body));

        ApiError {
            status,
            code: parsed.code,
            message,
            raw_body: body.to_string(),
        }
    }
}

fn fallback_message(status: u16, body: &str) -> String {
    let text = body.trim();
    if !text.is_empty() {
        return text.to_string();
    }

    StatusCode::from_u16(status)
        .ok()
        .and_then(|s| s.canonical_reason())
        .unwrap_or("Unknown error")
        .to_string()
}

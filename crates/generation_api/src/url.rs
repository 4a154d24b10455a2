/// Default base URL of a locally hosted generation server.
pub const DEFAULT_GENERATION_BASE_URL: &str = "http://localhost:8000";

/// Path segment of the streaming generation endpoint.
pub const GENERATE_STREAM_PATH: &str = "/generate-stream";

/// Normalize a base URL to the streaming generation endpoint.
///
/// Normalization rules:
/// 1) blank input falls back to [`DEFAULT_GENERATION_BASE_URL`]
/// 2) keep `/generate-stream` unchanged
/// 3) append `/generate-stream` otherwise
pub fn normalize_generation_url(input: &str) -> String {
    let base = if input.trim().is_empty() {
        DEFAULT_GENERATION_BASE_URL
    } else {
        input.trim()
    };

    let trimmed = base.trim_end_matches('/');
    if trimmed.ends_with(GENERATE_STREAM_PATH) {
        return trimmed.to_string();
    }
    format!("{trimmed}{GENERATE_STREAM_PATH}")
}

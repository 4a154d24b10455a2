use reqwest::StatusCode;

use generation_api::error::parse_error_message;

#[test]
fn parse_error_message_reads_fastapi_detail_string() {
    let body = r#"{"detail":"Model not loaded"}"#;
    let message = parse_error_message(StatusCode::SERVICE_UNAVAILABLE, body);
    assert_eq!(message, "Model not loaded");
}

#[test]
fn parse_error_message_joins_validation_detail_entries() {
    let body = r#"{"detail":[{"loc":["body","prompt"],"msg":"field required"},{"loc":["body","session_id"],"msg":"field required"}]}"#;
    let message = parse_error_message(StatusCode::UNPROCESSABLE_ENTITY, body);
    assert_eq!(message, "field required; field required");
}

#[test]
fn parse_error_message_reads_nested_error_message() {
    let body = r#"{"error":{"message":"invalid model"}}"#;
    let message = parse_error_message(StatusCode::BAD_REQUEST, body);
    assert_eq!(message, "invalid model");
}

#[test]
fn parse_error_message_falls_back_to_raw_body() {
    let body = "raw failure text";
    let message = parse_error_message(StatusCode::INTERNAL_SERVER_ERROR, body);
    assert_eq!(message, "raw failure text");
}

#[test]
fn parse_error_message_uses_reason_phrase_for_empty_body() {
    let message = parse_error_message(StatusCode::BAD_GATEWAY, "");
    assert_eq!(message, "Bad Gateway");
}

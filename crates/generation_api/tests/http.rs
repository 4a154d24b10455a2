use generation_api::{
    normalize_generation_url, GenerateRequest, GenerationApiConfig, GenerationApiError,
    GenerationClient,
};
use serde_json::Value;

#[test]
fn smoke_client_constructs_from_config() {
    let config = GenerationApiConfig::new("http://127.0.0.1:8000").with_user_agent("chatline-test");
    let client = GenerationClient::new(config).expect("client creation should succeed");

    assert_eq!(
        client.normalized_endpoint(),
        normalize_generation_url("http://127.0.0.1:8000")
    );
    assert_eq!(client.config().user_agent.as_deref(), Some("chatline-test"));
}

#[test]
fn http_request_posts_json_body_to_stream_endpoint() {
    let config = GenerationApiConfig::new("http://127.0.0.1:8000")
        .insert_header("x-client", "chatline");
    let client = GenerationClient::new(config).expect("client");
    let request = GenerateRequest::new("2", "USER: hello");

    let http_request = client
        .build_request(&request)
        .expect("build request")
        .build()
        .expect("request");

    assert_eq!(
        http_request.url().as_str(),
        "http://127.0.0.1:8000/generate-stream"
    );
    assert_eq!(http_request.method(), "POST");
    assert_eq!(
        http_request
            .headers()
            .get("x-client")
            .and_then(|value| value.to_str().ok()),
        Some("chatline")
    );
    assert_eq!(
        http_request
            .headers()
            .get("accept")
            .and_then(|value| value.to_str().ok()),
        Some("text/event-stream")
    );

    let body = http_request
        .body()
        .and_then(|body| body.as_bytes())
        .expect("json body should be buffered");
    let body: Value = serde_json::from_slice(body).expect("body should be JSON");
    assert_eq!(body["session_id"], "2");
    assert_eq!(body["prompt"], "USER: hello");
    assert_eq!(body["new_context"], true);
}

#[test]
fn http_request_rejects_unparseable_base_url() {
    let client = GenerationClient::new(GenerationApiConfig::new("not a url")).expect("client");
    let error = client
        .build_request(&GenerateRequest::new("0", "hi"))
        .err()
        .expect("invalid base URL must fail");

    assert!(matches!(error, GenerationApiError::InvalidBaseUrl(_)));
}

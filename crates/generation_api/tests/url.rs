use generation_api::normalize_generation_url;

#[test]
fn url_normalization_keeps_existing_stream_endpoint() {
    assert_eq!(
        normalize_generation_url("http://localhost:8000/generate-stream"),
        "http://localhost:8000/generate-stream"
    );
}

#[test]
fn url_normalization_appends_endpoint_to_base() {
    assert_eq!(
        normalize_generation_url("http://10.0.0.5:9000/"),
        "http://10.0.0.5:9000/generate-stream"
    );
}

#[test]
fn url_normalization_falls_back_to_local_default_when_blank() {
    assert_eq!(
        normalize_generation_url("   "),
        "http://localhost:8000/generate-stream"
    );
}

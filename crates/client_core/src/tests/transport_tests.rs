use super::*;
use crate::stub_backend::{spawn_stub_backend, unreachable_base_url};
use shared::{error::ErrorCode, normalize::ResponseShape};

#[test]
fn endpoint_families_resolve_against_the_base_url() {
    let transport = ApiTransport::new("http://localhost:5000/api/");
    assert_eq!(
        transport.endpoint_url(EndpointFamily::Public, "/categories"),
        "http://localhost:5000/api/public/categories"
    );
    assert_eq!(
        transport.endpoint_url(EndpointFamily::Admin, "products/42"),
        "http://localhost:5000/api/products/42"
    );
}

#[test]
fn query_flattening_skips_absent_fields() {
    let request = ApiRequest::get(EndpointFamily::Public, "products")
        .query(&shared::protocol::ProductQuery {
            page: Some(3),
            sort: Some("price".into()),
            ..Default::default()
        })
        .expect("query");
    assert_eq!(
        request.query,
        vec![
            ("page".to_string(), "3".to_string()),
            ("sort".to_string(), "price".to_string()),
        ]
    );
}

#[tokio::test]
async fn not_found_with_unparsable_body_is_a_failure_envelope() {
    let (base_url, _state) = spawn_stub_backend().await;
    let transport = ApiTransport::new(base_url);

    let response = transport
        .send(ApiRequest::get(EndpointFamily::Public, "broken"))
        .await;

    assert!(!response.success);
    assert_eq!(response.status, Some(404));
    assert_eq!(response.failure_code(), Some(ErrorCode::NotFound));
    assert_eq!(
        response.message.as_deref(),
        Some("Request failed with status 404")
    );
    assert!(response.extract_list::<serde_json::Value>().is_empty());
}

#[tokio::test]
async fn malformed_success_body_degrades_to_failure() {
    let (base_url, _state) = spawn_stub_backend().await;
    let transport = ApiTransport::new(base_url);

    let response = transport
        .send(ApiRequest::get(EndpointFamily::Public, "garbled"))
        .await;

    assert!(!response.success);
    assert_eq!(response.status, Some(200));
    assert_eq!(response.failure_code(), Some(ErrorCode::MalformedBody));
    assert_eq!(response.shape(), ResponseShape::Unrecognized);
}

#[tokio::test]
async fn server_message_is_surfaced_on_error_status() {
    let (base_url, _state) = spawn_stub_backend().await;
    let transport = ApiTransport::new(base_url);

    let response = transport
        .send(ApiRequest::get(EndpointFamily::Public, "products/missing"))
        .await;

    assert!(!response.success);
    assert_eq!(response.message.as_deref(), Some("Product not found"));
}

#[tokio::test]
async fn unreachable_server_reports_network_error() {
    let transport = ApiTransport::new(unreachable_base_url().await);

    let response = transport
        .send(ApiRequest::get(EndpointFamily::Public, "categories"))
        .await;

    assert!(!response.success);
    assert_eq!(response.status, None);
    assert_eq!(response.error.as_deref(), Some("Network error"));
    assert_eq!(response.failure_code(), Some(ErrorCode::Network));
}

#[tokio::test]
async fn default_headers_merge_with_caller_headers_and_bearer() {
    let (base_url, _state) = spawn_stub_backend().await;
    let transport = ApiTransport::new(base_url);

    let request = ApiRequest::get(EndpointFamily::Public, "echo")
        .header(
            HeaderName::from_static("x-client"),
            HeaderValue::from_static("storefront-cli"),
        )
        .bearer("abc123");
    let response = transport.send(request).await;

    assert!(response.success);
    let echoed = response.item().expect("echo item");
    assert_eq!(echoed["accept"], "application/json");
    assert_eq!(echoed["contentType"], "application/json");
    assert_eq!(echoed["authorization"], "Bearer abc123");
    assert_eq!(echoed["custom"], "storefront-cli");
}

#[tokio::test]
async fn caller_headers_override_defaults() {
    let (base_url, _state) = spawn_stub_backend().await;
    let transport = ApiTransport::new(base_url);

    let request = ApiRequest::get(EndpointFamily::Public, "echo")
        .header(ACCEPT, HeaderValue::from_static("application/vnd.urbanspace+json"));
    let response = transport.send(request).await;

    let echoed = response.item().expect("echo item");
    assert_eq!(echoed["accept"], "application/vnd.urbanspace+json");
    assert!(echoed["authorization"].is_null());
}

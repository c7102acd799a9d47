//! Integration tests for the API client over real HTTP.
//!
//! Each test starts its own wiremock server and points a plain-HTTP client at
//! it, exercising the default `reqwest` transport end-to-end: path
//! resolution, parameter encoding, auth headers and response handling.

use serde_json::json;
use theoldreader::{Client, ClientOptions, Error, Headers, Params, Response};
use wiremock::matchers::{body_string, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client_for(server: &MockServer, token: Option<&str>) -> Client {
    let options = ClientOptions {
        use_ssl: false,
        host: server.address().to_string(),
        timeout: None,
    };
    Client::with_options(token.map(str::to_string), options).unwrap()
}

fn params(pairs: &[(&str, &str)]) -> Params {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

// ============================================================================
// Request Shape
// ============================================================================

#[tokio::test]
async fn test_get_sends_query_under_base_path() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/reader/api/0/stream/items/ids"))
        .and(query_param("s", "user/-/state/com.google/reading-list"))
        .and(query_param("n", "10"))
        .and(query_param("output", "json"))
        .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"itemRefs":[]}"#))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server, None);
    let response = client
        .call(
            "stream/items/ids",
            &params(&[
                ("s", "user/-/state/com.google/reading-list"),
                ("n", "10"),
                ("bogus", "1"),
            ]),
            &Headers::new(),
        )
        .await
        .unwrap();

    assert_eq!(response, Response::Json(json!({"itemRefs": []})));

    let received = server.received_requests().await.unwrap();
    let keys: Vec<String> = received[0]
        .url
        .query_pairs()
        .map(|(k, _)| k.into_owned())
        .collect();
    assert!(!keys.contains(&"bogus".to_string()));
}

#[tokio::test]
async fn test_post_sends_form_body() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/reader/api/0/accounts/ClientLogin"))
        .and(header("content-type", "application/x-www-form-urlencoded"))
        .and(body_string(
            "Email=a%40b.com&Passwd=p&accountType=HOSTED_OR_GOOGLE&client=x&output=json&service=reader",
        ))
        .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"Auth":"tok"}"#))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server, None);
    let response = client
        .call(
            "accounts/ClientLogin",
            &params(&[
                ("client", "x"),
                ("Email", "a@b.com"),
                ("Passwd", "p"),
                ("evil", "dropme"),
            ]),
            &Headers::new(),
        )
        .await
        .unwrap();

    assert_eq!(response.as_json(), Some(&json!({"Auth": "tok"})));
}

#[tokio::test]
async fn test_absolute_endpoint_skips_base_path() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/reader/subscriptions/export"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<opml version=\"1.0\"/>"))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server, Some("tok"));
    let response = client.export_subscriptions().await.unwrap();
    assert_eq!(response.as_text(), Some("<opml version=\"1.0\"/>"));
}

// ============================================================================
// Authentication
// ============================================================================

#[tokio::test]
async fn test_token_sent_as_google_login_header() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/reader/api/0/user-info"))
        .and(header("Authorization", "GoogleLogin auth=secret"))
        .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"userId":"1"}"#))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server, Some("secret"));
    client.user_info().await.unwrap();
}

#[tokio::test]
async fn test_no_authorization_header_without_token() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("{}"))
        .mount(&server)
        .await;

    let client = client_for(&server, None);
    client.status().await.unwrap();

    let received = server.received_requests().await.unwrap();
    assert_eq!(received.len(), 1);
    assert!(received[0].headers.get("authorization").is_none());
}

#[tokio::test]
async fn test_login_then_authorized_call() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/reader/api/0/accounts/ClientLogin"))
        .respond_with(
            ResponseTemplate::new(200).set_body_string(r#"{"SID":"none","LSID":"none","Auth":"fresh"}"#),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/reader/api/0/unread-count"))
        .and(header("Authorization", "GoogleLogin auth=fresh"))
        .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"max":1000}"#))
        .expect(1)
        .mount(&server)
        .await;

    let mut client = client_for(&server, None);
    client.login("a@b.com", "p", None).await.unwrap();
    assert_eq!(client.token(), Some("fresh"));

    let response = client.unread_count().await.unwrap();
    assert_eq!(response.as_json(), Some(&json!({"max": 1000})));
}

// ============================================================================
// Response Handling
// ============================================================================

#[tokio::test]
async fn test_plain_text_success_is_not_an_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/reader/api/0/token"))
        .respond_with(ResponseTemplate::new(200).set_body_string("plain text"))
        .mount(&server)
        .await;

    let client = client_for(&server, Some("tok"));
    let response = client.api_token().await.unwrap();
    assert_eq!(response, Response::Text("plain text".to_string()));
}

#[tokio::test]
async fn test_404_json_error_body() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404).set_body_string(r#"{"error":"not found"}"#))
        .mount(&server)
        .await;

    let client = client_for(&server, None);
    let err = client.tag_list().await.unwrap_err();
    let api = err.as_api().expect("expected ApiError");
    assert_eq!(api.status(), 404);
    assert_eq!(api.get("error"), Some(&json!("not found")));
    assert_eq!(api.get("code"), Some(&json!(404)));
    assert!(api.uri().contains("/reader/api/0/tag/list"));
}

#[tokio::test]
async fn test_500_raw_error_body() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500).set_body_string("Internal Server Error"))
        .expect(1) // no retries
        .mount(&server)
        .await;

    let client = client_for(&server, None);
    let err = client
        .mark_all_as_read(&params(&[("s", "feed/1"), ("ts", "1700000000")]))
        .await
        .unwrap_err();

    let api = err.as_api().expect("expected ApiError");
    assert_eq!(api.status(), 500);
    assert_eq!(api.get("errors"), Some(&json!("Internal Server Error")));
    assert_eq!(api.get("code"), Some(&json!(500)));
    let uri = api.get("uri").and_then(|v| v.as_str()).unwrap();
    assert!(uri.starts_with(&server.uri()));
    assert!(uri.contains("/reader/api/0/mark-all-as-read"));
}

#[tokio::test]
async fn test_non_200_success_status_is_an_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(201).set_body_string("OK"))
        .mount(&server)
        .await;

    let client = client_for(&server, None);
    let err = client
        .subscription_quickadd(&params(&[("quickadd", "https://example.com/feed")]))
        .await
        .unwrap_err();
    assert_eq!(err.as_api().map(|e| e.status()), Some(201));
}

// ============================================================================
// Failures Before I/O and in Transport
// ============================================================================

#[tokio::test]
async fn test_unknown_endpoint_makes_no_request() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let client = client_for(&server, Some("tok"));
    let err = client
        .call("not-an-endpoint", &Params::new(), &Headers::new())
        .await
        .unwrap_err();
    assert!(matches!(err, Error::UnknownEndpoint(_)));
}

#[tokio::test]
async fn test_connection_refused_surfaces_transport_error() {
    let options = ClientOptions {
        use_ssl: false,
        host: "127.0.0.1:1".to_string(),
        timeout: None,
    };
    let client = Client::with_options(None, options).unwrap();
    let err = client.status().await.unwrap_err();

    match err {
        Error::Transport(source) => {
            let reqwest_err = source
                .downcast_ref::<reqwest::Error>()
                .expect("reqwest error");
            assert!(reqwest_err.is_connect());
        }
        other => panic!("expected transport error, got {other:?}"),
    }
}

use std::borrow::Cow;
use std::time::Duration;

use serde_json::json;
use truthsense_http::{Auth, HttpClient, HttpError, RequestOpts};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn get_json_decodes_success_body() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/news"))
        .and(query_param("keywords", "vaccine"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": [{"title": "t"}]})))
        .mount(&server)
        .await;

    let client = HttpClient::new(&server.uri()).unwrap();
    let opts = RequestOpts {
        query: Some(vec![("keywords", Cow::Borrowed("vaccine"))]),
        ..Default::default()
    };
    let got: serde_json::Value = client.get_json("v1/news", opts).await.unwrap();
    assert_eq!(got["data"][0]["title"], "t");
}

#[tokio::test]
async fn query_auth_is_sent_as_query_param() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/search"))
        .and(query_param("api_key", "k-123"))
        .and(query_param("q", "claim"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ok": true})))
        .expect(1)
        .mount(&server)
        .await;

    let client = HttpClient::new(&server.uri()).unwrap();
    let opts = RequestOpts {
        auth: Some(Auth::Query {
            name: "api_key",
            value: Cow::Borrowed("k-123"),
        }),
        query: Some(vec![("q", Cow::Borrowed("claim"))]),
        ..Default::default()
    };
    let got: serde_json::Value = client.get_json("search", opts).await.unwrap();
    assert_eq!(got["ok"], true);
}

#[tokio::test]
async fn server_errors_are_retried_until_success() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/flaky"))
        .respond_with(ResponseTemplate::new(500))
        .up_to_n_times(1)
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/flaky"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ok": true})))
        .expect(1)
        .mount(&server)
        .await;

    let client = HttpClient::new(&server.uri()).unwrap();
    let got: serde_json::Value = client
        .get_json("flaky", RequestOpts::default())
        .await
        .unwrap();
    assert_eq!(got["ok"], true);
}

#[tokio::test]
async fn api_error_carries_status_and_message() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/denied"))
        .respond_with(
            ResponseTemplate::new(403)
                .set_body_json(json!({"error": {"message": "API key invalid"}})),
        )
        .mount(&server)
        .await;

    let client = HttpClient::new(&server.uri()).unwrap();
    let opts = RequestOpts {
        retries: Some(0),
        ..Default::default()
    };
    let err = client
        .get_json::<serde_json::Value>("denied", opts)
        .await
        .unwrap_err();
    match err {
        HttpError::Api {
            status, message, ..
        } => {
            assert_eq!(status.as_u16(), 403);
            assert_eq!(message, "API key invalid");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn non_json_success_body_is_a_decode_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/text"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&server)
        .await;

    let client = HttpClient::new(&server.uri()).unwrap();
    let err = client
        .get_json::<serde_json::Value>("text", RequestOpts::default())
        .await
        .unwrap_err();
    assert!(matches!(err, HttpError::Decode(_, _)));
}

#[tokio::test]
async fn multibyte_error_body_degrades_to_decode_error() {
    let server = MockServer::start().await;
    // Long non-JSON body whose 500th byte sits inside a multibyte char;
    // the snippet must not abort the request on its way to Decode.
    let body = format!("{}ééé", "a".repeat(499));
    Mock::given(method("GET"))
        .and(path("/accents"))
        .respond_with(ResponseTemplate::new(200).set_body_string(body))
        .mount(&server)
        .await;

    let client = HttpClient::new(&server.uri()).unwrap();
    let err = client
        .get_json::<serde_json::Value>("accents", RequestOpts::default())
        .await
        .unwrap_err();
    match err {
        HttpError::Decode(_, snippet) => {
            assert!(snippet.ends_with("..."));
            assert!(!snippet.contains('é'));
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn post_json_sends_body_and_honors_retry_budget_zero() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/generate"))
        .respond_with(ResponseTemplate::new(503))
        .expect(1)
        .mount(&server)
        .await;

    let client = HttpClient::new(&server.uri())
        .unwrap()
        .with_timeout(Duration::from_secs(2));
    let opts = RequestOpts {
        retries: Some(0),
        ..Default::default()
    };
    let err = client
        .post_json::<_, serde_json::Value>("generate", &json!({"contents": []}), opts)
        .await
        .unwrap_err();
    assert_eq!(err.status().map(|s| s.as_u16()), Some(503));
}

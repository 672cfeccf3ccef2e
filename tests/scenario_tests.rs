//! # Scenario Tests
//!
//! Runs the built-in scenario suite against stub servers and checks that the
//! reported outcomes are computed from the responses.

use ollama_smoke::{builtin_scenarios, run_scenarios, Config, SmokeClient};
use serde_json::json;
use wiremock::{
    matchers::{method, path},
    Mock, MockServer, ResponseTemplate,
};

fn client_for(base_url: String) -> SmokeClient {
    let config = Config {
        base_url,
        ..Config::for_test()
    };
    SmokeClient::new(&config).unwrap()
}

#[tokio::test]
async fn test_suite_passes_against_conforming_server() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "choices": [{"message": {"role": "assistant", "content": "{\"result\":4}"}}]
        })))
        .expect(3)
        .mount(&mock_server)
        .await;

    let summary = run_scenarios(&client_for(mock_server.uri()), &builtin_scenarios())
        .await
        .unwrap();

    assert_eq!(summary.reports.len(), 3);
    assert!(summary.all_passed());
    assert_eq!(summary.failed_checks(), 0);

    let first = &summary.reports[0];
    assert_eq!(first.scenario, "simple-json");
    assert_eq!(first.response.status, 200);
    assert!(first.check("json-content").unwrap().passed);
}

#[tokio::test]
async fn test_plain_text_reply_fails_json_check_only() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "choices": [{"message": {"content": "The answer is 4."}}]
        })))
        .mount(&mock_server)
        .await;

    let summary = run_scenarios(&client_for(mock_server.uri()), &builtin_scenarios()[..1])
        .await
        .unwrap();

    let report = &summary.reports[0];
    assert!(!report.passed());
    assert!(report.check("status").unwrap().passed);
    assert!(report.check("choices").unwrap().passed);
    assert!(!report.check("json-content").unwrap().passed);
    assert_eq!(summary.failed_checks(), 1);
}

#[tokio::test]
async fn test_hello_world_accepts_prose_reply() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "choices": [{"message": {"content": "Here you go:\n\nprint(\"Hello, world!\")"}}]
        })))
        .expect(3)
        .mount(&mock_server)
        .await;

    let summary = run_scenarios(&client_for(mock_server.uri()), &builtin_scenarios())
        .await
        .unwrap();

    let hello = summary
        .reports
        .iter()
        .find(|r| r.scenario == "hello-world")
        .expect("hello-world report");
    assert!(hello.passed());
    assert!(hello.check("json-content").is_none());
    assert_eq!(hello.content.as_deref(), Some("Here you go:\n\nprint(\"Hello, world!\")"));

    // the two json scenarios still fail on the same reply
    assert_eq!(summary.failed_checks(), 2);

    let requests = mock_server.received_requests().await.unwrap();
    let last: serde_json::Value = serde_json::from_slice(&requests[2].body).unwrap();
    assert_eq!(last["messages"].as_array().unwrap().len(), 1);
    assert_eq!(last["messages"][0]["role"], "user");
}

#[tokio::test]
async fn test_missing_choices_is_a_failed_check_not_an_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({"error": "boom"})))
        .mount(&mock_server)
        .await;

    let summary = run_scenarios(&client_for(mock_server.uri()), &builtin_scenarios())
        .await
        .unwrap();

    assert!(!summary.all_passed());
    // json scenarios carry three checks each, hello-world two
    assert_eq!(summary.failed_checks(), 8);
    assert!(summary.reports.iter().all(|r| r.content.is_none()));
}

#[tokio::test]
async fn test_refused_connection_aborts_suite() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);

    let err = run_scenarios(&client_for(format!("http://127.0.0.1:{}", port)), &builtin_scenarios())
        .await
        .unwrap_err();

    assert!(err.is_network(), "expected network error, got {:?}", err);
}

#[tokio::test]
async fn test_decode_failure_stops_after_first_scenario() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>proxy error</html>"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let err = run_scenarios(&client_for(mock_server.uri()), &builtin_scenarios())
        .await
        .unwrap_err();

    assert!(err.is_decode());
}

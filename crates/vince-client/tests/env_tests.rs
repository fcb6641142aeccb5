//! Entry points that read configuration from the process environment.

use serde_json::json;
use vince_client::{ErrorCode, test_connection, validate_key};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const VARS: [&str; 3] = ["VINCE_CLIENT_ID", "VINCE_CLIENT_SECRET", "VINCE_BASE_URL"];

fn env_for(base_url: &str) -> Vec<(&'static str, Option<String>)> {
    vec![
        (VARS[0], Some("svc-key".to_string())),
        (VARS[1], Some("app-secret".to_string())),
        (VARS[2], Some(base_url.to_string())),
    ]
}

fn env_without(missing: &str, base_url: &str) -> Vec<(&'static str, Option<String>)> {
    env_for(base_url)
        .into_iter()
        .map(|(k, v)| if k == missing { (k, None) } else { (k, v) })
        .collect()
}

fn refused_url() -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    format!("http://127.0.0.1:{port}")
}

#[tokio::test]
async fn test_connection_true_when_service_answers_200() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/health"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let reachable = temp_env::async_with_vars(env_for(&server.uri()), test_connection()).await;
    assert!(reachable);
}

#[tokio::test]
async fn test_connection_false_for_each_missing_var() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/health"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    for var in VARS {
        let reachable =
            temp_env::async_with_vars(env_without(var, &server.uri()), test_connection()).await;
        assert!(!reachable, "{var} unset should make the check fail");
    }
}

#[tokio::test]
async fn test_connection_false_when_empty() {
    let vars = vec![
        (VARS[0], Some(String::new())),
        (VARS[1], Some("app-secret".to_string())),
        (VARS[2], Some("http://127.0.0.1:1".to_string())),
    ];
    assert!(!temp_env::async_with_vars(vars, test_connection()).await);
}

#[tokio::test]
async fn test_connection_false_when_refused() {
    let vars = env_for(&refused_url());
    assert!(!temp_env::async_with_vars(vars, test_connection()).await);
}

#[tokio::test]
async fn validate_key_reports_missing_client_id() {
    let vars: Vec<(&str, Option<&str>)> = VARS.iter().map(|v| (*v, None)).collect();
    let result = temp_env::async_with_vars(vars, validate_key("some-key")).await;
    assert_eq!(
        serde_json::to_value(&result).unwrap(),
        json!({
            "valid": false,
            "error": "Required environment variable VINCE_CLIENT_ID is not set",
            "code": "CONFIGURATION_ERROR"
        })
    );
}

#[tokio::test]
async fn validate_key_reports_first_missing_var() {
    let vars = env_without(VARS[1], "http://127.0.0.1:1");
    let result = temp_env::async_with_vars(vars, validate_key("some-key")).await;
    let failure = result.failure_details().unwrap();
    assert_eq!(failure.code, ErrorCode::ConfigurationError);
    assert_eq!(
        failure.error,
        "Required environment variable VINCE_CLIENT_SECRET is not set"
    );
}

#[tokio::test]
async fn validate_key_reports_invalid_base_url() {
    let vars = env_for("not a url");
    let result = temp_env::async_with_vars(vars, validate_key("some-key")).await;
    assert_eq!(result.code(), Some(&ErrorCode::ConfigurationError));
}

#[tokio::test]
async fn validate_key_uses_env_credentials() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/validate"))
        .and(wiremock::matchers::header("Authorization", "Bearer svc-key"))
        .and(wiremock::matchers::body_json(json!({
            "apiKey": "sk-proj-abc123-def456",
            "clientSecret": "app-secret"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "valid": true,
            "data": {"applicationName": "app", "keyId": "k1", "metadata": "{\"a\":1}"}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let base_url = format!("{}/", server.uri());
    let result =
        temp_env::async_with_vars(env_for(&base_url), validate_key("sk-proj-abc123-def456")).await;
    assert_eq!(
        serde_json::to_value(&result).unwrap(),
        json!({
            "valid": true,
            "data": {"applicationName": "app", "keyId": "k1", "metadata": {"a": 1}}
        })
    );
}

#[tokio::test]
async fn validate_key_connection_error() {
    let vars = env_for(&refused_url());
    let result = temp_env::async_with_vars(vars, validate_key("some-key")).await;
    assert_eq!(result.code(), Some(&ErrorCode::ConnectionError));
}

//! Integration tests for the acme-dns HTTP client
//!
//! Uses wiremock to stand in for an acme-dns instance.

use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use acmedns_client::{Account, AcmeDnsClient, ChallengeService, ClientError};

const TOKEN: &str = "LHDhK3oGRvkiefQnx7OOczTY5Tic_xZ6HcMOc_gmtoM";

fn account() -> Account {
    Account {
        subdomain: "abc".to_string(),
        username: "u".to_string(),
        password: "p".to_string(),
        fulldomain: "abc.example.org".to_string(),
        allowfrom: Vec::new(),
    }
}

// ============================================================================
// Registration
// ============================================================================

mod register {
    use super::*;

    #[tokio::test]
    async fn test_register_success_without_allowfrom() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/register"))
            .respond_with(ResponseTemplate::new(201).set_body_json(serde_json::json!({
                "subdomain": "abc",
                "username": "u",
                "password": "p",
                "fulldomain": "abc.example.org"
            })))
            .expect(1)
            .mount(&mock_server)
            .await;

        let client = AcmeDnsClient::new(mock_server.uri()).unwrap();
        let registered = client.register(&[]).await.unwrap();

        assert_eq!(registered, account());

        // No body is sent when nothing is whitelisted
        let requests = mock_server.received_requests().await.unwrap();
        assert_eq!(requests.len(), 1);
        assert!(requests[0].body.is_empty());
    }

    #[tokio::test]
    async fn test_register_sends_allowfrom() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/register"))
            .and(body_json(serde_json::json!({
                "allowfrom": ["1.2.3.4/32", "10.0.0.0/8"]
            })))
            .respond_with(ResponseTemplate::new(201).set_body_json(serde_json::json!({
                "subdomain": "abc",
                "username": "u",
                "password": "p",
                "fulldomain": "abc.example.org",
                "allowfrom": ["1.2.3.4/32", "10.0.0.0/8"]
            })))
            .expect(1)
            .mount(&mock_server)
            .await;

        let client = AcmeDnsClient::new(mock_server.uri()).unwrap();
        let registered = client
            .register(&["1.2.3.4/32".to_string(), "10.0.0.0/8".to_string()])
            .await
            .unwrap();

        assert_eq!(registered.allowfrom, vec!["1.2.3.4/32", "10.0.0.0/8"]);
    }

    #[tokio::test]
    async fn test_register_failure_carries_status_and_body() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/register"))
            .respond_with(
                ResponseTemplate::new(400).set_body_string(r#"{"error": "invalid_allowfrom_cidr"}"#),
            )
            .mount(&mock_server)
            .await;

        let client = AcmeDnsClient::new(mock_server.uri()).unwrap();
        let err = client
            .register(&["1.2.3.4/32".to_string()])
            .await
            .unwrap_err();

        assert_eq!(err.status(), Some(400));
        match err {
            ClientError::Registration { status, body } => {
                assert_eq!(status, 400);
                assert!(body.contains("invalid_allowfrom_cidr"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_register_other_success_status_is_failure() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/register"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "subdomain": "abc",
                "username": "u",
                "password": "p",
                "fulldomain": "abc.example.org"
            })))
            .mount(&mock_server)
            .await;

        let client = AcmeDnsClient::new(mock_server.uri()).unwrap();
        let err = client.register(&[]).await.unwrap_err();

        assert_eq!(err.status(), Some(200));
    }

    #[tokio::test]
    async fn test_register_unparseable_account() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/register"))
            .respond_with(ResponseTemplate::new(201).set_body_string("not json"))
            .mount(&mock_server)
            .await;

        let client = AcmeDnsClient::new(mock_server.uri()).unwrap();
        let err = client.register(&[]).await.unwrap_err();

        assert!(matches!(err, ClientError::InvalidResponse(_)));
    }
}

// ============================================================================
// TXT updates
// ============================================================================

mod update {
    use super::*;

    #[tokio::test]
    async fn test_update_success() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/update"))
            .and(header("X-Api-User", "u"))
            .and(header("X-Api-Key", "p"))
            .and(header("Content-Type", "application/json"))
            .and(body_json(serde_json::json!({
                "subdomain": "abc",
                "txt": TOKEN
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "txt": TOKEN
            })))
            .expect(1)
            .mount(&mock_server)
            .await;

        let client = AcmeDnsClient::new(mock_server.uri()).unwrap();
        let result = client.update_txt(&account(), TOKEN).await;

        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_update_short_token_is_still_sent() {
        let mock_server = MockServer::start().await;

        // Length is the caller's responsibility; the client only warns
        Mock::given(method("POST"))
            .and(path("/update"))
            .and(body_json(serde_json::json!({
                "subdomain": "abc",
                "txt": "short"
            })))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&mock_server)
            .await;

        let client = AcmeDnsClient::new(mock_server.uri()).unwrap();
        let result = client.update_txt(&account(), "short").await;

        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_update_failure_is_verbose() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/update"))
            .respond_with(ResponseTemplate::new(400).set_body_json(serde_json::json!({
                "error": "bad_txt"
            })))
            .mount(&mock_server)
            .await;

        let client = AcmeDnsClient::new(mock_server.uri()).unwrap();
        let err = client.update_txt(&account(), "short").await.unwrap_err();

        assert_eq!(err.status(), Some(400));
        let msg = err.to_string();
        assert!(msg.contains("------- Response HTTP status: 400"));
        assert!(msg.contains("\"subdomain\": \"abc\""));
        assert!(msg.contains("\"txt\": \"short\""));
        assert!(msg.contains("\"error\": \"bad_txt\""));
        assert!(msg.contains("\"X-Api-User\": \"u\""));
    }

    #[tokio::test]
    async fn test_update_failure_does_not_leak_api_key() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/update"))
            .respond_with(ResponseTemplate::new(401).set_body_string("forbidden"))
            .mount(&mock_server)
            .await;

        let mut account = account();
        account.password = "secret_password_12345".to_string();

        let client = AcmeDnsClient::new(mock_server.uri()).unwrap();
        let err = client.update_txt(&account, TOKEN).await.unwrap_err();

        match &err {
            ClientError::Update { response_body, .. } => assert_eq!(response_body, "forbidden"),
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(!err.to_string().contains("secret_password"));
    }

    #[tokio::test]
    async fn test_update_created_is_not_success() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/update"))
            .respond_with(ResponseTemplate::new(201))
            .mount(&mock_server)
            .await;

        let client = AcmeDnsClient::new(mock_server.uri()).unwrap();
        let err = client.update_txt(&account(), TOKEN).await.unwrap_err();

        assert_eq!(err.status(), Some(201));
    }
}

#[tokio::test]
async fn test_unreachable_service_is_transport_error() {
    // Nothing listens on port 1
    let client = AcmeDnsClient::new("http://127.0.0.1:1").unwrap();
    let err = client.register(&[]).await.unwrap_err();

    assert!(matches!(err, ClientError::Transport(_)));
    assert_eq!(err.status(), None);
}

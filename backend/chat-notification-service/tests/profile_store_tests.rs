/// Firestore profile reads against a mock REST endpoint
///
/// This test module covers:
/// - 404 as a missing profile
/// - Typed `stringValue` decoding of a found document
/// - Server errors surfacing as profile store errors
use chat_notification_service::*;
use nova_fcm_shared::ServiceAccountTokenProvider;
use serde_json::json;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const USERS_PATH: &str = "/v1/projects/chat-app/databases/(default)/documents/users";

fn store_for(server: &MockServer) -> FirestoreProfileStore {
    FirestoreProfileStore::new(
        "chat-app".to_string(),
        "users".to_string(),
        ServiceAccountTokenProvider::with_static_token("owner"),
        reqwest::Client::new(),
    )
    .with_endpoint(server.uri())
}

#[tokio::test]
async fn test_found_document_decodes_profile() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(format!("{}/u2", USERS_PATH)))
        .and(header("authorization", "Bearer owner"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "name": "projects/chat-app/databases/(default)/documents/users/u2",
            "fields": {
                "displayName": {"stringValue": "Bob"},
                "fcmToken": {"stringValue": "tok123"},
                "online": {"booleanValue": true}
            },
            "createTime": "2024-01-01T00:00:00Z",
            "updateTime": "2024-01-02T00:00:00Z"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let profile = store_for(&server).get_profile("u2").await.unwrap();

    assert_eq!(
        profile,
        Some(UserProfile {
            display_name: Some("Bob".to_string()),
            fcm_token: Some("tok123".to_string()),
        })
    );
}

#[tokio::test]
async fn test_not_found_is_missing_profile() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(format!("{}/ghost", USERS_PATH)))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({
            "error": {"code": 404, "status": "NOT_FOUND"}
        })))
        .mount(&server)
        .await;

    let profile = store_for(&server).get_profile("ghost").await.unwrap();
    assert_eq!(profile, None);
}

#[tokio::test]
async fn test_server_error_is_profile_store_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(format!("{}/u2", USERS_PATH)))
        .respond_with(ResponseTemplate::new(500).set_body_string("internal"))
        .mount(&server)
        .await;

    let err = store_for(&server).get_profile("u2").await.unwrap_err();

    match err {
        AppError::ProfileStore(message) => {
            assert!(message.contains("500"));
            assert!(message.contains("internal"));
        }
        other => panic!("expected ProfileStore error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_unparseable_document_is_profile_store_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(format!("{}/u2", USERS_PATH)))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>"))
        .mount(&server)
        .await;

    let err = store_for(&server).get_profile("u2").await.unwrap_err();
    assert!(matches!(err, AppError::ProfileStore(_)));
}

#[tokio::test]
async fn test_invalid_user_id_never_reaches_server() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let err = store_for(&server).get_profile("u1/private").await.unwrap_err();
    assert!(matches!(err, AppError::ProfileStore(_)));
}

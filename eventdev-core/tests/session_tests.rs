use eventdev_core::api::{ApiClient, NewUser};
use eventdev_core::error::EventDevError;
use eventdev_core::session::{Session, SessionState};
use serde_json::json;
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{body_json, body_partial_json, header, method, path},
};

fn session(server: &MockServer) -> Session {
    Session::new(ApiClient::new(format!("{}/api/v1", server.uri())).unwrap())
}

async fn mount_me(server: &MockServer, roles: &[&str]) {
    Mock::given(method("GET"))
        .and(path("/api/v1/auth/me"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "user": {
                "id": "3f1c",
                "email": "ana@example.com",
                "roles": roles,
                "comunidade_id": 10
            }
        })))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_check_anonymous_on_401() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/auth/me"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let mut session = session(&server);
    assert_eq!(session.state(), &SessionState::Unknown);
    assert_eq!(session.check().await.unwrap(), &SessionState::Anonymous);
}

#[tokio::test]
async fn test_check_keeps_state_on_server_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/auth/me"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let mut session = session(&server);
    assert!(session.check().await.is_err());
    assert_eq!(session.state(), &SessionState::Unknown);
}

#[tokio::test]
async fn test_sign_in_then_sign_out() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/auth/signin"))
        .and(header("rid", "emailpassword"))
        .and(body_json(json!({
            "formFields": [
                { "id": "email", "value": "ana@example.com" },
                { "id": "password", "value": "s3cret" }
            ]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "status": "OK" })))
        .expect(1)
        .mount(&server)
        .await;
    mount_me(&server, &["community"]).await;
    Mock::given(method("POST"))
        .and(path("/api/v1/auth/signout"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "status": "OK" })))
        .expect(1)
        .mount(&server)
        .await;

    let mut session = session(&server);
    let user = session.sign_in(" ana@example.com ", "s3cret").await.unwrap();
    assert_eq!(user.email, "ana@example.com");
    assert_eq!(user.community_id, Some(10));
    assert!(session.has_role("community"));
    assert!(session.require_role("community").is_ok());

    session.sign_out().await;
    assert_eq!(session.state(), &SessionState::Anonymous);
}

#[tokio::test]
async fn test_wrong_credentials_is_distinct() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/auth/signin"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "status": "WRONG_CREDENTIALS_ERROR" })),
        )
        .mount(&server)
        .await;

    let mut session = session(&server);
    let err = session.sign_in("ana@example.com", "nope").await.unwrap_err();
    assert!(matches!(err, EventDevError::WrongCredentials));
    assert!(!session.is_authenticated());
}

#[tokio::test]
async fn test_field_error_becomes_validation() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/auth/signin"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "FIELD_ERROR",
            "formFields": [{ "id": "email", "error": "Email is invalid" }]
        })))
        .mount(&server)
        .await;

    let mut session = session(&server);
    match session.sign_in("ana", "pw").await.unwrap_err() {
        EventDevError::Validation(errors) => {
            assert_eq!(errors.field("email"), Some("Email is invalid"))
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn test_sign_out_clears_even_when_backend_fails() {
    let server = MockServer::start().await;
    mount_me(&server, &["admin"]).await;
    Mock::given(method("POST"))
        .and(path("/api/v1/auth/signout"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let mut session = session(&server);
    session.check().await.unwrap();
    assert!(session.is_admin());

    session.sign_out().await;
    assert_eq!(session.state(), &SessionState::Anonymous);
    assert!(!session.is_admin());
}

#[tokio::test]
async fn test_create_user_requires_admin_and_reports_messages() {
    let server = MockServer::start().await;
    mount_me(&server, &["admin"]).await;
    Mock::given(method("POST"))
        .and(path("/api/v1/auth/admin/create-user"))
        .and(body_partial_json(json!({ "email": "new@example.com", "role": "community" })))
        .respond_with(ResponseTemplate::new(409).set_body_json(json!({
            "message": ["E-mail already registered"]
        })))
        .mount(&server)
        .await;

    let new_user = NewUser {
        email: "new@example.com".into(),
        password: "s3cret".into(),
        role: "community".into(),
    };

    let anonymous = session(&server);
    assert!(matches!(
        anonymous.create_user(&new_user).await,
        Err(EventDevError::Unauthorized)
    ));

    let mut admin = session(&server);
    admin.check().await.unwrap();
    let err = admin.create_user(&new_user).await.unwrap_err();
    assert_eq!(err.status(), Some(409));
    assert_eq!(err.to_string(), "E-mail already registered (HTTP 409)");
}

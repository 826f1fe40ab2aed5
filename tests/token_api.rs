use mockito::{Matcher, Server};
use serde_json::json;

use soteria_cli::api::{AccessType, ApiError, Credential, SoteriaClient};

#[tokio::test]
async fn token_sends_grant_and_returns_plain_body() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", "/token")
        .match_body(Matcher::Json(json!({
            "grant_type": "2",
            "client_id": "driver",
            "client_secret": "s3cret"
        })))
        .with_status(202)
        .with_body("eyJhbGciOiJSUzI1NiJ9.payload.sig\n")
        .create_async()
        .await;

    let client = SoteriaClient::new(&server.url()).unwrap();
    let token = client
        .token("driver", "s3cret", AccessType::Pub)
        .await
        .unwrap();
    mock.assert_async().await;

    assert_eq!(token, "eyJhbGciOiJSUzI1NiJ9.payload.sig");
}

#[tokio::test]
async fn rejected_token_request_is_unauthorized() {
    let mut server = Server::new_async().await;
    let _mock = server
        .mock("POST", "/token")
        .with_status(401)
        .with_body("request is not authorized")
        .create_async()
        .await;

    let client = SoteriaClient::new(&server.url()).unwrap();
    let err = client
        .token("driver", "wrong", AccessType::Sub)
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::Unauthorized));
}

#[tokio::test]
async fn token_server_error_carries_body() {
    let mut server = Server::new_async().await;
    let _mock = server
        .mock("POST", "/token")
        .with_status(500)
        .with_body("internal server error")
        .create_async()
        .await;

    let client = SoteriaClient::new(&server.url()).unwrap();
    let err = client
        .token("driver", "s3cret", AccessType::Sub)
        .await
        .unwrap_err();

    match err {
        ApiError::UnexpectedStatus { status, body } => {
            assert_eq!(status.as_u16(), 500);
            assert_eq!(body, "internal server error");
        }
        other => panic!("expected unexpected-status error, got {other:?}"),
    }
}

#[tokio::test]
async fn auth_probe_posts_token_form() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", "/auth")
        .match_header(
            "content-type",
            Matcher::Regex("application/x-www-form-urlencoded".into()),
        )
        .match_body(Matcher::UrlEncoded("token".into(), "tok-123".into()))
        .with_status(200)
        .with_body("ok")
        .create_async()
        .await;

    let client = SoteriaClient::new(&server.url()).unwrap();
    client
        .check_auth(&Credential::Token("tok-123".to_string()))
        .await
        .unwrap();
    mock.assert_async().await;
}

#[tokio::test]
async fn auth_probe_posts_login_form() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", "/auth")
        .match_body(Matcher::AllOf(vec![
            Matcher::UrlEncoded("username".into(), "driver".into()),
            Matcher::UrlEncoded("password".into(), "password".into()),
        ]))
        .with_status(200)
        .with_body("ok")
        .create_async()
        .await;

    let client = SoteriaClient::new(&server.url()).unwrap();
    client
        .check_auth(&Credential::Login {
            username: "driver".to_string(),
            password: "password".to_string(),
        })
        .await
        .unwrap();
    mock.assert_async().await;
}

#[tokio::test]
async fn denied_acl_probe_is_unauthorized() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", "/acl")
        .match_body(Matcher::AllOf(vec![
            Matcher::UrlEncoded("access".into(), "2".into()),
            Matcher::UrlEncoded("token".into(), "tok-123".into()),
            Matcher::UrlEncoded("topic".into(), "snapp/driver/1234/location".into()),
        ]))
        .with_status(401)
        .with_body("request is not authorized")
        .create_async()
        .await;

    let client = SoteriaClient::new(&server.url()).unwrap();
    let err = client
        .check_acl("tok-123", AccessType::Pub, "snapp/driver/1234/location")
        .await
        .unwrap_err();
    mock.assert_async().await;

    assert!(matches!(err, ApiError::Unauthorized));
}

#[tokio::test]
async fn allowed_acl_probe_is_ok() {
    let mut server = Server::new_async().await;
    let _mock = server
        .mock("POST", "/acl")
        .with_status(200)
        .with_body("ok")
        .create_async()
        .await;

    let client = SoteriaClient::new(&server.url()).unwrap();
    client
        .check_acl("tok-123", AccessType::Sub, "snapp/driver/1234/location")
        .await
        .unwrap();
}

#[tokio::test]
async fn emq_store_posts_duration_in_seconds() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", "/emq")
        .match_body(Matcher::Json(json!({
            "username": "driver",
            "password": "password",
            "duration": 3600
        })))
        .with_status(200)
        .with_body(
            json!({
                "code": "successful_operation",
                "message": "operation done successfully: []",
                "data": null
            })
            .to_string(),
        )
        .create_async()
        .await;

    let client = SoteriaClient::new(&server.url()).unwrap();
    client
        .store_emq_user("driver", "password", 3600)
        .await
        .unwrap();
    mock.assert_async().await;
}

mod common;

use anyhow::Result;
use axum::http::{Method, StatusCode};
use serde_json::json;

use common::TestApp;
use zoo_api::types::Role;

#[tokio::test]
async fn registration_hides_the_password_and_forces_role() -> Result<()> {
    let app = TestApp::new();

    let (status, body) = app
        .send(
            Method::POST,
            "/users",
            None,
            Some(json!({
                "user_name": "keeper",
                "email": " Keeper@Zoo.Test ",
                "password": "s3cret!",
                "role": "admin",
            })),
        )
        .await?;
    assert_eq!(status, StatusCode::OK, "{}", body);
    assert_eq!(body["message"], "User added");
    assert_eq!(body["data"]["email"], "keeper@zoo.test");
    assert_eq!(body["data"]["role"], "user");
    assert!(body["data"].get("password").is_none());

    let (_, list) = app.get("/users").await?;
    let users = list.as_array().unwrap();
    assert_eq!(users.len(), 1);
    assert!(users[0].get("password").is_none());

    let (status, login) = app
        .send(
            Method::POST,
            "/auth/login",
            None,
            Some(json!({"username": "keeper", "password": "s3cret!"})),
        )
        .await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(login["user"]["role"], "user");
    Ok(())
}

#[tokio::test]
async fn invalid_email_is_rejected() -> Result<()> {
    let app = TestApp::new();
    let (status, body) = app
        .send(
            Method::POST,
            "/users",
            None,
            Some(json!({"user_name": "keeper", "email": "keeper", "password": "x"})),
        )
        .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Must be a valid email: email");
    Ok(())
}

#[tokio::test]
async fn password_update_is_rehashed() -> Result<()> {
    let app = TestApp::new();
    let (user, _) = app.seed_user("keeper", Role::User).await?;

    let (status, body) = app
        .send(
            Method::PUT,
            &format!("/users/{}", user.id),
            None,
            Some(json!({"password": "brand-new", "role": "admin"})),
        )
        .await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "User updated");
    assert_eq!(body["data"]["role"], "user");

    let stored = app.state.users().find_by_id(&user.id).await?.unwrap();
    assert_ne!(stored.password, "brand-new");

    let (status, _) = app
        .send(
            Method::POST,
            "/auth/login",
            None,
            Some(json!({"username": "keeper", "password": "brand-new"})),
        )
        .await?;
    assert_eq!(status, StatusCode::OK);
    Ok(())
}

#[tokio::test]
async fn deleted_user_is_gone() -> Result<()> {
    let app = TestApp::new();
    let (user, _) = app.seed_user("keeper", Role::User).await?;
    let uri = format!("/users/{}", user.id);

    let (status, body) = app.send(Method::DELETE, &uri, None, None).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "User deleted");
    assert_eq!(body["data"]["user_name"], "keeper");

    let (status, body) = app.get(&uri).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "No users found");
    Ok(())
}

#[tokio::test]
async fn oversized_bodies_are_refused_before_storing() -> Result<()> {
    let mut config = common::test_config();
    config.server.max_body_bytes = 1024;
    let app = TestApp::with_config(config);

    let (status, body) = app
        .send(
            Method::POST,
            "/users",
            None,
            Some(json!({
                "user_name": "keeper",
                "email": "keeper@zoo.test",
                "password": "s3cret!",
                "padding": "x".repeat(2048),
            })),
        )
        .await?;
    assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE, "{}", body);
    assert_eq!(body["message"], "Request body exceeds 1024 bytes");

    let (_, list) = app.get("/users").await?;
    assert!(list.as_array().unwrap().is_empty());
    Ok(())
}

#[tokio::test]
async fn default_body_cap_applies() -> Result<()> {
    let app = TestApp::new();

    let (status, _) = app
        .send(
            Method::POST,
            "/users",
            None,
            Some(json!({
                "user_name": "keeper",
                "email": "keeper@zoo.test",
                "password": "s3cret!",
                "padding": "x".repeat(8 * 1024 * 1024),
            })),
        )
        .await?;
    assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);

    let (_, list) = app.get("/users").await?;
    assert!(list.as_array().unwrap().is_empty());
    Ok(())
}

mod common;

use common::spawn_app;
use credential_gate::account::Role;
use credential_gate::auth::{validate_access_token, AccessClaims};
use credential_gate::store::CredentialStore;
use jsonwebtoken::{encode, EncodingKey, Header};
use serde_json::Value;

#[tokio::test]
async fn protected_route_without_token_returns_401() {
    let app = spawn_app();

    let response = app.get_with_token("/users", None).await;

    assert_eq!(401, response.status().as_u16());
}

#[tokio::test]
async fn protected_route_with_garbage_token_returns_401() {
    let app = spawn_app();

    let response = app.get_with_token("/users", Some("garbage")).await;

    assert_eq!(401, response.status().as_u16());
}

#[tokio::test]
async fn admin_route_rejects_user_role() {
    let app = spawn_app();
    let (access_token, _) = app.register_and_login("john@example.com").await;

    let response = app.get_with_token("/users", Some(&access_token)).await;

    assert_eq!(403, response.status().as_u16());
}

#[tokio::test]
async fn admin_route_admits_admin_role() {
    let app = spawn_app();
    app.register_and_login("john@example.com").await;
    app.grant("john@example.com", Role::Admin).await;
    let (access_token, _) = app.login("john@example.com").await;

    let response = app.get_with_token("/users", Some(&access_token)).await;
    assert_eq!(200, response.status().as_u16());

    let body: Value = response.json().await.unwrap();
    let users = body.as_array().unwrap();
    assert_eq!(users.len(), 1);
    assert_eq!(users[0]["email"], "john@example.com");
    assert!(users[0].get("password_hash").is_none());
}

#[tokio::test]
async fn stale_token_keeps_old_roles_until_refresh() {
    let app = spawn_app();
    let (access_token, refresh_token) = app.register_and_login("john@example.com").await;
    app.grant("john@example.com", Role::Admin).await;

    let response = app.get_with_token("/users", Some(&access_token)).await;
    assert_eq!(403, response.status().as_u16());

    let refreshed: Value = app.get_refresh(Some(&refresh_token)).await.json().await.unwrap();
    let access_token = refreshed["accessToken"].as_str().unwrap();
    let response = app.get_with_token("/users", Some(access_token)).await;
    assert_eq!(200, response.status().as_u16());
}

#[tokio::test]
async fn expired_access_token_returns_401() {
    let app = spawn_app();
    let (access_token, _) = app.register_and_login("john@example.com").await;
    app.grant("john@example.com", Role::Admin).await;

    let mut claims: AccessClaims = validate_access_token(&access_token, &app.jwt).unwrap();
    claims.user_info.roles.push(Role::Admin.code());
    claims.iat -= 600;
    claims.exp = claims.iat + 300;
    let expired = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(app.jwt.access_token_secret.as_bytes()),
    )
    .unwrap();

    let response = app.get_with_token("/users", Some(&expired)).await;

    assert_eq!(401, response.status().as_u16());
}

#[tokio::test]
async fn who_am_i_exposes_verified_claims() {
    let app = spawn_app();
    let (access_token, _) = app.register_and_login("john@example.com").await;

    let response = app.get_with_token("/users/me", Some(&access_token)).await;
    assert_eq!(200, response.status().as_u16());

    let body: Value = response.json().await.unwrap();
    assert_eq!(body["email"], "john@example.com");
    assert_eq!(body["roles"], serde_json::json!([2001]));
}

#[tokio::test]
async fn admin_can_fetch_and_delete_users() {
    let app = spawn_app();
    app.register_and_login("admin@example.com").await;
    app.grant("admin@example.com", Role::Admin).await;
    let (admin_token, _) = app.login("admin@example.com").await;
    app.register_and_login("john@example.com").await;

    let john = app
        .store
        .find_by_email("john@example.com")
        .await
        .unwrap()
        .unwrap();

    let response = app
        .get_with_token(&format!("/users/{}", john.id), Some(&admin_token))
        .await;
    assert_eq!(200, response.status().as_u16());
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["name"], "Jane Doe");

    let response = app
        .client
        .delete(&format!("{}/users/{}", app.address, john.id))
        .bearer_auth(&admin_token)
        .send()
        .await
        .expect("Failed to execute request.");
    assert_eq!(204, response.status().as_u16());
    assert!(app.store.find_by_id(john.id).await.unwrap().is_none());

    let response = app
        .get_with_token(&format!("/users/{}", john.id), Some(&admin_token))
        .await;
    assert_eq!(404, response.status().as_u16());
}

#[tokio::test]
async fn admin_grants_role_seen_at_next_refresh() {
    let app = spawn_app();
    app.register_and_login("admin@example.com").await;
    app.grant("admin@example.com", Role::Admin).await;
    let (admin_token, _) = app.login("admin@example.com").await;
    let (_, editor_session) = app.register_and_login("john@example.com").await;
    let john = app
        .store
        .find_by_email("john@example.com")
        .await
        .unwrap()
        .unwrap();

    let response = app
        .client
        .post(&format!("{}/users/{}/roles", app.address, john.id))
        .bearer_auth(&admin_token)
        .json(&serde_json::json!({ "role": "Editor" }))
        .send()
        .await
        .expect("Failed to execute request.");
    assert_eq!(204, response.status().as_u16());

    let refreshed: Value = app.get_refresh(Some(&editor_session)).await.json().await.unwrap();
    assert_eq!(refreshed["roles"], serde_json::json!([2001, 1984]));

    let response = app
        .client
        .post(&format!("{}/users/{}/roles", app.address, uuid::Uuid::new_v4()))
        .bearer_auth(&admin_token)
        .json(&serde_json::json!({ "role": "Editor" }))
        .send()
        .await
        .expect("Failed to execute request.");
    assert_eq!(404, response.status().as_u16());
}

#[tokio::test]
async fn granting_roles_requires_admin() {
    let app = spawn_app();
    let (access_token, _) = app.register_and_login("john@example.com").await;
    let john = app
        .store
        .find_by_email("john@example.com")
        .await
        .unwrap()
        .unwrap();

    let response = app
        .client
        .post(&format!("{}/users/{}/roles", app.address, john.id))
        .bearer_auth(&access_token)
        .json(&serde_json::json!({ "role": "Admin" }))
        .send()
        .await
        .expect("Failed to execute request.");

    assert_eq!(403, response.status().as_u16());
    let john = app.store.find_by_id(john.id).await.unwrap().unwrap();
    assert_eq!(john.roles.codes(), vec![2001]);
}

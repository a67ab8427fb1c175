#![allow(dead_code)]

use std::net::TcpListener;
use std::sync::Arc;

use credential_gate::account::Role;
use credential_gate::configuration::{HashingSettings, JwtSettings};
use credential_gate::startup::run;
use credential_gate::store::{CredentialStore, MemoryStore};
use serde_json::{json, Value};

/// The one browser origin the test server admits
pub const ALLOWED_ORIGIN: &str = "http://app.example.com";

pub struct TestApp {
    pub address: String,
    pub store: Arc<MemoryStore>,
    pub jwt: JwtSettings,
    pub client: reqwest::Client,
}

pub fn jwt_settings() -> JwtSettings {
    JwtSettings {
        access_token_secret: "access-secret-key-at-least-32-characters".to_string(),
        refresh_token_secret: "refresh-secret-key-at-least-32-characters".to_string(),
        access_token_expiry: 300,
        refresh_token_expiry: 86400,
        refreshed_access_token_expiry: 10,
        issuer: "integration-test".to_string(),
    }
}

pub fn spawn_app() -> TestApp {
    let listener = TcpListener::bind("127.0.0.1:0").expect("Failed to bind random port");
    let port = listener.local_addr().unwrap().port();

    let store = Arc::new(MemoryStore::new());
    let server = run(
        listener,
        store.clone(),
        jwt_settings(),
        HashingSettings { cost: 4 },
        vec![ALLOWED_ORIGIN.to_string()],
    )
    .expect("Failed to bind address");
    let _ = tokio::spawn(server);

    TestApp {
        address: format!("http://127.0.0.1:{}", port),
        store,
        jwt: jwt_settings(),
        client: reqwest::Client::new(),
    }
}

impl TestApp {
    pub async fn post_register(&self, body: &Value) -> reqwest::Response {
        self.client
            .post(&format!("{}/api/register", &self.address))
            .json(body)
            .send()
            .await
            .expect("Failed to execute request.")
    }

    pub async fn post_login(&self, body: &Value) -> reqwest::Response {
        self.client
            .post(&format!("{}/api/login", &self.address))
            .json(body)
            .send()
            .await
            .expect("Failed to execute request.")
    }

    pub async fn get_refresh(&self, session: Option<&str>) -> reqwest::Response {
        let mut request = self.client.get(&format!("{}/api/refresh", &self.address));
        if let Some(token) = session {
            request = request.header("Cookie", format!("jwt={}", token));
        }
        request.send().await.expect("Failed to execute request.")
    }

    pub async fn post_logout(&self, session: Option<&str>) -> reqwest::Response {
        let mut request = self.client.post(&format!("{}/api/logout", &self.address));
        if let Some(token) = session {
            request = request.header("Cookie", format!("jwt={}", token));
        }
        request.send().await.expect("Failed to execute request.")
    }

    pub async fn get_with_token(&self, path: &str, token: Option<&str>) -> reqwest::Response {
        let mut request = self.client.get(&format!("{}{}", &self.address, path));
        if let Some(token) = token {
            request = request.bearer_auth(token);
        }
        request.send().await.expect("Failed to execute request.")
    }

    /// Registers and logs in; returns (access token, refresh token).
    pub async fn register_and_login(&self, email: &str) -> (String, String) {
        let response = self
            .post_register(&json!({
                "name": "Jane Doe",
                "email": email,
                "pwd": "password123"
            }))
            .await;
        assert_eq!(200, response.status().as_u16());

        self.login(email).await
    }

    pub async fn login(&self, email: &str) -> (String, String) {
        let response = self
            .post_login(&json!({ "email": email, "pwd": "password123" }))
            .await;
        assert_eq!(200, response.status().as_u16());

        let refresh_token = session_cookie(&response).expect("Missing session cookie");
        let body: Value = response.json().await.expect("Failed to parse response");
        let access_token = body["accessToken"].as_str().unwrap().to_string();
        (access_token, refresh_token)
    }

    pub async fn grant(&self, email: &str, role: Role) {
        let account = self
            .store
            .find_by_email(email)
            .await
            .unwrap()
            .expect("Account not found");
        assert!(self.store.grant_role(account.id, role).await.unwrap());
    }
}

/// Raw `Set-Cookie` header for the session cookie, if the response set one.
pub fn session_cookie_header(response: &reqwest::Response) -> Option<String> {
    response
        .headers()
        .get_all(reqwest::header::SET_COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .find(|value| value.starts_with("jwt="))
        .map(|value| value.to_string())
}

/// Value of the session cookie, if the response set one.
pub fn session_cookie(response: &reqwest::Response) -> Option<String> {
    session_cookie_header(response).map(|header| {
        header["jwt=".len()..]
            .split(';')
            .next()
            .unwrap_or_default()
            .to_string()
    })
}

#![allow(dead_code)]

use std::sync::Arc;

use auth::HashParams;
use auth::PasswordHasher;
use auth::TokenIssuer;
use identity_service::account::credentials::AccountDomain;
use identity_service::account::service::AuthService;
use identity_service::inbound::http::router::create_router;
use identity_service::outbound::repositories::InMemoryCredentialStore;

pub const TEST_SECRET: &[u8] = b"test-secret-key-for-jwt-signing-at-least-32-bytes";
pub const TEST_ISSUER: &str = "auth-system";
pub const TEST_AUDIENCE: &str = "auth-system-clients";

/// Auth service over the in-memory store, with cheap hashing parameters
pub struct TestService {
    pub store: InMemoryCredentialStore,
    pub tokens: Arc<TokenIssuer>,
    pub service: Arc<AuthService<InMemoryCredentialStore>>,
}

impl TestService {
    pub fn new() -> Self {
        let store = InMemoryCredentialStore::new();
        let tokens = Arc::new(
            TokenIssuer::new(TEST_SECRET, TEST_ISSUER, TEST_AUDIENCE)
                .expect("Failed to create token issuer"),
        );
        let hasher = PasswordHasher::with_params(HashParams {
            memory_kib: 256,
            iterations: 1,
            parallelism: 1,
        })
        .expect("Failed to create password hasher");

        let service = Arc::new(AuthService::new(
            Arc::new(store.clone()),
            AccountDomain::new(Arc::new(hasher)),
            Arc::clone(&tokens),
        ));

        Self {
            store,
            tokens,
            service,
        }
    }
}

/// Test application that spawns a real server
pub struct TestApp {
    pub address: String,
    pub port: u16,
    pub store: InMemoryCredentialStore,
    pub tokens: Arc<TokenIssuer>,
    pub api_client: reqwest::Client,
}

impl TestApp {
    /// Spawn the application in a background task and return TestApp
    pub async fn spawn() -> Self {
        let TestService {
            store,
            tokens,
            service,
        } = TestService::new();

        // Use random port (0 = OS assigns)
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind random port");
        let port = listener.local_addr().unwrap().port();
        let address = format!("http://127.0.0.1:{}", port);

        let router = create_router(service);

        // Spawn server in background
        tokio::spawn(async move {
            axum::serve(listener, router).await.expect("Server error");
        });

        Self {
            address,
            port,
            store,
            tokens,
            api_client: reqwest::Client::builder()
                .build()
                .expect("Failed to create reqwest client"),
        }
    }

    /// Helper to make GET request
    pub fn get(&self, path: &str) -> reqwest::RequestBuilder {
        self.api_client.get(format!("{}{}", self.address, path))
    }

    /// Helper to make POST request
    pub fn post(&self, path: &str) -> reqwest::RequestBuilder {
        self.api_client.post(format!("{}{}", self.address, path))
    }

    /// Helper to make GET request with Bearer token
    pub fn get_authenticated(&self, path: &str, token: &str) -> reqwest::RequestBuilder {
        self.get(path).bearer_auth(token)
    }

    /// Register an account through the API and return the response body
    pub async fn register(&self, email: &str, username: &str, password: &str) -> serde_json::Value {
        let response = self
            .post("/api/auth/register")
            .json(&serde_json::json!({
                "email": email,
                "username": username,
                "password": password
            }))
            .send()
            .await
            .expect("Failed to execute request");

        assert_eq!(response.status(), reqwest::StatusCode::CREATED);
        response.json().await.expect("Failed to parse response")
    }
}

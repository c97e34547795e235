//! Test application setup utilities
//!
//! Builds in-process instances of the application with throwaway SQLite
//! databases and drives them through `tower::ServiceExt::oneshot`.

use axum::{body::Body, http::Request, Router};
use tower::ServiceExt;
use uuid::Uuid;

use portal_transparencia::{
    api,
    config::{AppConfig, AuthConfig, DatabaseConfig},
    db,
    db::UserRepository,
    middleware::auth::create_access_token,
    models::User,
    services, AppState,
};

pub const ADMIN_EMAIL: &str = "admin@teste.gov.br";
pub const ADMIN_PASSWORD: &str = "senha-segura-de-teste";

/// Test application wrapper for integration testing
pub struct TestApp {
    pub router: Router,
    pub state: AppState,
}

impl TestApp {
    /// Create a new test application backed by a throwaway SQLite file
    pub async fn new() -> Self {
        let config = test_config();

        let db = db::init_pool(&config.database)
            .await
            .expect("Failed to initialize test database");

        services::auth::ensure_bootstrap_admin(&db, &config.auth)
            .await
            .expect("Failed to seed test administrator");

        let audit = services::spawn_audit_writer(db.clone());

        let state = AppState {
            config,
            db,
            audit,
        };

        let router = Router::new()
            .nest("/api/v1", api::public_routes())
            .nest(
                "/api/v1",
                api::protected_routes().layer(axum::middleware::from_fn_with_state(
                    state.clone(),
                    portal_transparencia::middleware::auth_middleware,
                )),
            )
            .with_state(state.clone());

        Self { router, state }
    }

    /// Access token for the seeded administrator
    pub async fn admin_token(&self) -> String {
        let admin = UserRepository::new(&self.state.db)
            .find_by_email(ADMIN_EMAIL)
            .await
            .expect("Failed to load test administrator")
            .expect("Test administrator is missing");
        self.token_for(&admin)
    }

    /// Create an extra user with the given role and return its token
    pub async fn create_user_with_role(&self, role: &str) -> (User, String) {
        let hash = services::auth::hash_password("senha-de-teste").unwrap();
        let user = User::new(
            format!("Usuario {}", role.to_lowercase()),
            format!("{}@teste.gov.br", Uuid::new_v4().simple()),
            hash,
            role.to_string(),
        );
        UserRepository::new(&self.state.db)
            .insert(&user)
            .await
            .expect("Failed to insert test user");
        let token = self.token_for(&user);
        (user, token)
    }

    fn token_for(&self, user: &User) -> String {
        create_access_token(user, &self.state.config.auth.jwt_secret, 30)
            .expect("Failed to generate test token")
    }

    /// Wait until all queued audit events have been written
    pub async fn flush_audit(&self) {
        self.state.audit.flush().await;
    }

    /// Make a GET request to the test application
    pub async fn get(&self, uri: &str) -> TestResponse {
        self.request(
            Request::builder()
                .method("GET")
                .uri(uri)
                .body(Body::empty())
                .unwrap(),
        )
        .await
    }

    /// Make an authenticated GET request
    pub async fn get_auth(&self, uri: &str, token: &str) -> TestResponse {
        self.request(
            Request::builder()
                .method("GET")
                .uri(uri)
                .header("Authorization", format!("Bearer {}", token))
                .body(Body::empty())
                .unwrap(),
        )
        .await
    }

    /// Make a POST request with JSON body
    pub async fn post_json(&self, uri: &str, body: serde_json::Value) -> TestResponse {
        self.request(
            Request::builder()
                .method("POST")
                .uri(uri)
                .header("Content-Type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
    }

    /// Make an authenticated POST request with JSON body
    pub async fn post_json_auth(
        &self,
        uri: &str,
        body: serde_json::Value,
        token: &str,
    ) -> TestResponse {
        self.request(
            Request::builder()
                .method("POST")
                .uri(uri)
                .header("Content-Type", "application/json")
                .header("Authorization", format!("Bearer {}", token))
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
    }

    /// Make an authenticated PUT request with JSON body
    pub async fn put_json_auth(
        &self,
        uri: &str,
        body: serde_json::Value,
        token: &str,
    ) -> TestResponse {
        self.request(
            Request::builder()
                .method("PUT")
                .uri(uri)
                .header("Content-Type", "application/json")
                .header("Authorization", format!("Bearer {}", token))
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
    }

    /// Make an authenticated PATCH request with JSON body
    pub async fn patch_json_auth(
        &self,
        uri: &str,
        body: serde_json::Value,
        token: &str,
    ) -> TestResponse {
        self.request(
            Request::builder()
                .method("PATCH")
                .uri(uri)
                .header("Content-Type", "application/json")
                .header("Authorization", format!("Bearer {}", token))
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
    }

    /// Make an authenticated DELETE request
    pub async fn delete_auth(&self, uri: &str, token: &str) -> TestResponse {
        self.request(
            Request::builder()
                .method("DELETE")
                .uri(uri)
                .header("Authorization", format!("Bearer {}", token))
                .body(Body::empty())
                .unwrap(),
        )
        .await
    }

    /// Upload a file as a multipart form POST
    pub async fn post_file(&self, uri: &str, filename: &str, content: &[u8]) -> TestResponse {
        self.request(multipart_request(uri, filename, content, None))
            .await
    }

    /// Upload a file as an authenticated multipart form POST
    pub async fn post_file_auth(
        &self,
        uri: &str,
        filename: &str,
        content: &[u8],
        token: &str,
    ) -> TestResponse {
        self.request(multipart_request(uri, filename, content, Some(token)))
            .await
    }

    /// Make an arbitrary request
    pub async fn request(&self, request: Request<Body>) -> TestResponse {
        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("Failed to execute request");

        let status = response.status();
        let headers = response.headers().clone();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("Failed to read response body");

        TestResponse {
            status,
            headers,
            body,
        }
    }
}

const MULTIPART_BOUNDARY: &str = "portal-test-boundary-4f7a";

fn multipart_request(
    uri: &str,
    filename: &str,
    content: &[u8],
    token: Option<&str>,
) -> Request<Body> {
    let mut body = Vec::new();
    body.extend_from_slice(format!("--{}\r\n", MULTIPART_BOUNDARY).as_bytes());
    body.extend_from_slice(
        format!(
            "Content-Disposition: form-data; name=\"file\"; filename=\"{}\"\r\n",
            filename
        )
        .as_bytes(),
    );
    body.extend_from_slice(b"Content-Type: text/csv\r\n\r\n");
    body.extend_from_slice(content);
    body.extend_from_slice(format!("\r\n--{}--\r\n", MULTIPART_BOUNDARY).as_bytes());

    let mut builder = Request::builder().method("POST").uri(uri).header(
        "Content-Type",
        format!("multipart/form-data; boundary={}", MULTIPART_BOUNDARY),
    );
    if let Some(token) = token {
        builder = builder.header("Authorization", format!("Bearer {}", token));
    }
    builder.body(Body::from(body)).unwrap()
}

/// Response from a test request
#[derive(Debug)]
pub struct TestResponse {
    pub status: axum::http::StatusCode,
    pub headers: axum::http::HeaderMap,
    pub body: bytes::Bytes,
}

impl TestResponse {
    /// Get the response body as a string
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).to_string()
    }

    /// Parse the response body as JSON
    pub fn json<T: serde::de::DeserializeOwned>(&self) -> T {
        serde_json::from_slice(&self.body).expect("Failed to parse response as JSON")
    }

    /// Get a response header as a string
    pub fn header(&self, name: &str) -> Option<String> {
        self.headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(String::from)
    }

    /// Assert the response status
    pub fn assert_status(&self, expected: axum::http::StatusCode) -> &Self {
        assert_eq!(
            self.status,
            expected,
            "Expected status {}, got {}. Body: {}",
            expected,
            self.status,
            self.text()
        );
        self
    }

    /// Assert the response status is OK (200)
    pub fn assert_ok(&self) -> &Self {
        self.assert_status(axum::http::StatusCode::OK)
    }

    /// Assert the response status is Created (201)
    pub fn assert_created(&self) -> &Self {
        self.assert_status(axum::http::StatusCode::CREATED)
    }

    /// Assert the response status is No Content (204)
    pub fn assert_no_content(&self) -> &Self {
        self.assert_status(axum::http::StatusCode::NO_CONTENT)
    }

    /// Assert the response status is Bad Request (400)
    pub fn assert_bad_request(&self) -> &Self {
        self.assert_status(axum::http::StatusCode::BAD_REQUEST)
    }

    /// Assert the response status is Unauthorized (401)
    pub fn assert_unauthorized(&self) -> &Self {
        self.assert_status(axum::http::StatusCode::UNAUTHORIZED)
    }

    /// Assert the response status is Forbidden (403)
    pub fn assert_forbidden(&self) -> &Self {
        self.assert_status(axum::http::StatusCode::FORBIDDEN)
    }

    /// Assert the response status is Not Found (404)
    pub fn assert_not_found(&self) -> &Self {
        self.assert_status(axum::http::StatusCode::NOT_FOUND)
    }
}

/// Create a test configuration with a unique temporary SQLite database
pub fn test_config() -> AppConfig {
    let db_path = format!(
        "/tmp/portal_test_{}.db",
        Uuid::new_v4().to_string().replace('-', "")
    );

    let mut config = AppConfig::default();
    config.database = DatabaseConfig {
        url: format!("sqlite://{}?mode=rwc", db_path),
        max_connections: 1,
    };
    config.auth = AuthConfig {
        jwt_secret: "test_secret_key_that_is_at_least_32_bytes_long".to_string(),
        access_token_expiry_minutes: 30,
        refresh_token_expiry_days: 7,
        bootstrap_admin_email: ADMIN_EMAIL.to_string(),
        bootstrap_admin_password: ADMIN_PASSWORD.to_string(),
    };
    config
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_app_creation() {
        let app = TestApp::new().await;
        assert_eq!(app.state.config.auth.bootstrap_admin_email, ADMIN_EMAIL);
    }

    #[tokio::test]
    async fn test_health_endpoint() {
        let app = TestApp::new().await;
        let response = app.get("/api/v1/health").await;
        response.assert_ok();
    }
}

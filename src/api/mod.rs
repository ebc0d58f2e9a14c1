//! Fundacion REST API
//!
//! HTTP API layer for the portal, built with Axum. Authentication uses
//! `Authorization: Bearer <token>` headers issued by `POST /api/login`.
//!
//! # Endpoints
//!
//! ## Accounts
//! - `POST /api/login`, `POST /api/register`, `POST /api/logout`, `GET /api/me`
//! - `GET /api/users`, `PUT /api/users/:id/role` (admin)
//!
//! ## Donations
//! - `GET|POST /api/donations`, `GET /api/donations/mine`, `GET /api/donations/export`
//!
//! ## Donation tickets
//! - `GET|POST /api/donation-tickets`, `GET /api/donation-tickets/:id`
//! - `GET|POST /api/donation-tickets/:id/messages`
//! - `PUT /api/donation-tickets/:id/status` (admin)
//!
//! ## Volunteers
//! - `GET|POST /api/volunteer-options`, `PUT|DELETE /api/volunteer-options/:id`
//! - `PUT /api/volunteer-options/:id/status`, `POST /api/volunteer-options/:id/enroll`
//! - `GET /api/volunteers`, `GET /api/volunteers/mine`, `PUT /api/volunteers/:id/status`
//! - `GET|POST /api/volunteer-proposals`, `PUT /api/volunteer-proposals/:id/status`
//!
//! ## Workshops
//! - `GET|POST /api/workshops`, `GET|PUT|DELETE /api/workshops/:id`
//! - `POST|DELETE /api/workshops/:id/register`, `GET /api/workshops/:id/registrations`
//!
//! ## Events & news
//! - `GET|POST /api/events-news`, `GET|PUT|DELETE /api/events-news/:id`
//!
//! ## Health
//! - `GET /health/live` - Liveness probe
//! - `GET /health/ready` - Readiness probe
//! - `GET /health` - Full health status
//!
//! # Example
//!
//! ```rust,no_run
//! use fundacion::api::{serve, ApiConfig, AppState};
//! use fundacion::store::Store;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let store = Arc::new(Store::open("./fundacion.db")?);
//!     let config = ApiConfig::default();
//!
//!     let state = AppState::new(store, config.clone());
//!     serve(state, &config).await?;
//!
//!     Ok(())
//! }
//! ```

pub mod auth;
pub mod dto;
pub mod error;
pub mod extract;
pub mod routes;
pub mod state;

pub use error::{ApiError, ApiResult};
pub use state::{ApiConfig, AppState};

use axum::{
    extract::DefaultBodyLimit,
    http::HeaderValue,
    routing::{get, post, put},
    Router,
};
use std::sync::Arc;
use std::time::Duration;
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

/// Build the API router with all routes and middleware
pub fn build_router(state: AppState) -> Router {
    let api_routes = Router::new()
        // Account routes
        .route("/login", post(routes::auth::login))
        .route("/register", post(routes::auth::register))
        .route("/logout", post(routes::auth::logout))
        .route("/me", get(routes::auth::me))
        .route("/users", get(routes::users::list_users))
        .route("/users/:id/role", put(routes::users::set_role))
        // Donation routes
        .route(
            "/donations",
            get(routes::donations::list_donations).post(routes::donations::create_donation),
        )
        .route("/donations/mine", get(routes::donations::my_donations))
        .route("/donations/export", get(routes::donations::export_donations))
        // Ticket routes
        .route(
            "/donation-tickets",
            get(routes::tickets::list_tickets).post(routes::tickets::create_ticket),
        )
        .route("/donation-tickets/:id", get(routes::tickets::get_ticket))
        .route(
            "/donation-tickets/:id/messages",
            get(routes::tickets::list_messages).post(routes::tickets::post_message),
        )
        .route("/donation-tickets/:id/status", put(routes::tickets::set_status))
        // Volunteer routes
        .route(
            "/volunteer-options",
            get(routes::volunteers::list_options).post(routes::volunteers::create_option),
        )
        .route(
            "/volunteer-options/:id",
            put(routes::volunteers::update_option).delete(routes::volunteers::delete_option),
        )
        .route(
            "/volunteer-options/:id/status",
            put(routes::volunteers::set_option_status),
        )
        .route("/volunteer-options/:id/enroll", post(routes::volunteers::enroll))
        .route("/volunteers", get(routes::volunteers::list_enrollments))
        .route("/volunteers/mine", get(routes::volunteers::my_enrollments))
        .route(
            "/volunteers/:id/status",
            put(routes::volunteers::set_enrollment_status),
        )
        .route(
            "/volunteer-proposals",
            get(routes::volunteers::list_proposals).post(routes::volunteers::create_proposal),
        )
        .route(
            "/volunteer-proposals/:id/status",
            put(routes::volunteers::review_proposal),
        )
        // Workshop routes
        .route(
            "/workshops",
            get(routes::workshops::list_workshops).post(routes::workshops::create_workshop),
        )
        .route(
            "/workshops/:id",
            get(routes::workshops::get_workshop)
                .put(routes::workshops::update_workshop)
                .delete(routes::workshops::delete_workshop),
        )
        .route(
            "/workshops/:id/register",
            post(routes::workshops::register).delete(routes::workshops::unregister),
        )
        .route(
            "/workshops/:id/registrations",
            get(routes::workshops::registrations),
        )
        // Events & news routes
        .route(
            "/events-news",
            get(routes::events_news::list_items).post(routes::events_news::create_item),
        )
        .route(
            "/events-news/:id",
            get(routes::events_news::get_item)
                .put(routes::events_news::update_item)
                .delete(routes::events_news::delete_item),
        )
        .layer(DefaultBodyLimit::max(state.config.max_body_size));

    let health_routes = Router::new()
        .route("/live", get(routes::health::liveness))
        .route("/ready", get(routes::health::readiness))
        .route("/", get(routes::health::full_health));

    let cors = cors_layer(&state.config.cors_origins);
    let timeout = TimeoutLayer::new(Duration::from_secs(state.config.request_timeout_secs.max(1)));
    let shared_state = Arc::new(state);

    Router::new()
        .nest("/api", api_routes)
        .nest("/health", health_routes)
        .layer(timeout)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(shared_state)
}

/// Permissive when no origins are configured, otherwise an allow-list
fn cors_layer(origins: &[String]) -> CorsLayer {
    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|o| match o.parse() {
            Ok(v) => Some(v),
            Err(_) => {
                tracing::warn!(origin = %o, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    if allowed.is_empty() {
        CorsLayer::permissive()
    } else {
        CorsLayer::new()
            .allow_origin(AllowOrigin::list(allowed))
            .allow_methods(Any)
            .allow_headers(Any)
    }
}

/// Start the API server
pub async fn serve(state: AppState, config: &ApiConfig) -> Result<(), ApiError> {
    let router = build_router(state);

    let addr = config.addr();
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("Fundacion API listening on {}", addr);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| ApiError::Internal(format!("Server error: {}", e)))?;

    tracing::info!("Fundacion API shut down gracefully");
    Ok(())
}

/// Wait for shutdown signal
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install signal handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received, starting graceful shutdown");
}

/// Live server on an ephemeral port for client-side tests
#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use crate::client::ApiClient;
    use crate::store::{NewUser, Role, Store};
    use std::time::Duration;

    pub(crate) struct TestServer {
        pub base_url: String,
        pub admin_email: String,
        pub admin_password: String,
        pub store: Arc<Store>,
    }

    pub(crate) async fn spawn_server() -> TestServer {
        let store = Arc::new(Store::open_in_memory().unwrap());
        store
            .ensure_admin("Admin", "admin@example.org", "admin-pass")
            .await
            .unwrap();

        let router = build_router(AppState::new(Arc::clone(&store), ApiConfig::default()));
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });

        TestServer {
            base_url: format!("http://{}", addr),
            admin_email: "admin@example.org".to_string(),
            admin_password: "admin-pass".to_string(),
            store,
        }
    }

    impl TestServer {
        pub(crate) fn client(&self) -> ApiClient {
            ApiClient::new(&self.base_url, Duration::from_secs(5)).unwrap()
        }

        async fn signed_in(&self, email: &str, password: &str) -> ApiClient {
            let client = self.client();
            let login = client
                .login(&crate::api::dto::LoginRequest {
                    email: email.to_string(),
                    password: password.to_string(),
                })
                .await
                .unwrap();
            client.with_token(login.token)
        }

        pub(crate) async fn admin_client(&self) -> ApiClient {
            self.signed_in(&self.admin_email, &self.admin_password).await
        }

        /// Create a regular account and sign it in
        pub(crate) async fn user_client(&self, email: &str) -> ApiClient {
            self.store
                .create_user(NewUser {
                    name: "Test user".to_string(),
                    email: email.to_string(),
                    password: "password1".to_string(),
                    role: Role::User,
                })
                .await
                .unwrap();
            self.signed_in(email, "password1").await
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{NewUser, Role, Store};
    use axum::{
        body::Body,
        http::{header, Request, StatusCode},
        response::Response,
    };
    use serde_json::{json, Value};
    use tower::util::ServiceExt;

    struct TestApp {
        router: Router,
        store: Arc<Store>,
    }

    impl TestApp {
        async fn new() -> Self {
            let store = Arc::new(Store::open_in_memory().unwrap());
            store
                .ensure_admin("Admin", "admin@example.org", "admin-pass")
                .await
                .unwrap();
            let router = build_router(AppState::new(Arc::clone(&store), ApiConfig::default()));
            Self { router, store }
        }

        async fn send(
            &self,
            method: &str,
            uri: &str,
            token: Option<&str>,
            body: Option<Value>,
        ) -> Response {
            let mut builder = Request::builder().method(method).uri(uri);
            if let Some(token) = token {
                builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
            }
            let body = match body {
                Some(json) => {
                    builder = builder.header(header::CONTENT_TYPE, "application/json");
                    Body::from(json.to_string())
                }
                None => Body::empty(),
            };
            self.router
                .clone()
                .oneshot(builder.body(body).unwrap())
                .await
                .unwrap()
        }

        async fn user_token(&self, email: &str) -> String {
            self.store
                .create_user(NewUser {
                    name: "Lucia".to_string(),
                    email: email.to_string(),
                    password: "password1".to_string(),
                    role: Role::User,
                })
                .await
                .unwrap();
            self.login(email, "password1").await
        }

        async fn login(&self, email: &str, password: &str) -> String {
            let response = self
                .send(
                    "POST",
                    "/api/login",
                    None,
                    Some(json!({ "email": email, "password": password })),
                )
                .await;
            assert_eq!(response.status(), StatusCode::OK);
            json_body(response).await["token"].as_str().unwrap().to_string()
        }
    }

    async fn json_body(response: Response) -> Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_health_endpoints() {
        let app = TestApp::new().await;
        for uri in ["/health/live", "/health/ready", "/health"] {
            let response = app.send("GET", uri, None, None).await;
            assert_eq!(response.status(), StatusCode::OK, "{}", uri);
        }

        let body = json_body(app.send("GET", "/health", None, None).await).await;
        assert_eq!(body["database"], "ok");
    }

    #[tokio::test]
    async fn test_register_login_me_logout() {
        let app = TestApp::new().await;

        let response = app
            .send(
                "POST",
                "/api/register",
                None,
                Some(json!({ "name": "Marta", "email": "marta@example.org", "password": "longenough" })),
            )
            .await;
        assert_eq!(response.status(), StatusCode::CREATED);
        assert_eq!(json_body(response).await["role"], "user");

        let token = app.login("marta@example.org", "longenough").await;
        let me = json_body(app.send("GET", "/api/me", Some(&token), None).await).await;
        assert_eq!(me["email"], "marta@example.org");

        let response = app.send("POST", "/api/logout", Some(&token), None).await;
        assert_eq!(response.status(), StatusCode::NO_CONTENT);

        let response = app.send("GET", "/api/me", Some(&token), None).await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_bad_credentials_and_short_password() {
        let app = TestApp::new().await;

        let response = app
            .send(
                "POST",
                "/api/login",
                None,
                Some(json!({ "email": "admin@example.org", "password": "nope" })),
            )
            .await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let response = app
            .send(
                "POST",
                "/api/register",
                None,
                Some(json!({ "name": "X", "email": "x@example.org", "password": "short" })),
            )
            .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = json_body(response).await;
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
        assert!(body["request_id"].is_string());
    }

    #[tokio::test]
    async fn test_role_gating() {
        let app = TestApp::new().await;
        let user = app.user_token("user@example.org").await;

        let response = app.send("GET", "/api/users", None, None).await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let response = app.send("GET", "/api/users", Some(&user), None).await;
        assert_eq!(response.status(), StatusCode::FORBIDDEN);

        let admin = app.login("admin@example.org", "admin-pass").await;
        let response = app.send("GET", "/api/users?per_page=1", Some(&admin), None).await;
        assert_eq!(response.status(), StatusCode::OK);
        let page = json_body(response).await;
        assert_eq!(page["total_items"], 2);
        assert_eq!(page["total_pages"], 2);
        assert_eq!(page["items"].as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_ticket_lifecycle() {
        let app = TestApp::new().await;
        let admin = app.login("admin@example.org", "admin-pass").await;

        let response = app
            .send(
                "POST",
                "/api/donation-tickets",
                None,
                Some(json!({
                    "subject": "Clothes pickup",
                    "donor_name": "Pablo",
                    "donor_email": "pablo@example.org",
                    "message": "I have two boxes of winter clothes"
                })),
            )
            .await;
        assert_eq!(response.status(), StatusCode::CREATED);
        let created = json_body(response).await;
        let id = created["ticket"]["id"].as_i64().unwrap();
        assert_eq!(created["ticket"]["status"], "open");
        assert!(created["ticket"]["user_id"].is_null());

        let status_uri = format!("/api/donation-tickets/{}/status", id);

        // open -> archived is not allowed
        let response = app
            .send("PUT", &status_uri, Some(&admin), Some(json!({ "status": "archived" })))
            .await;
        assert_eq!(response.status(), StatusCode::CONFLICT);

        let response = app
            .send("PUT", &status_uri, Some(&admin), Some(json!({ "status": "closed" })))
            .await;
        assert_eq!(response.status(), StatusCode::OK);
        assert!(json_body(response).await["assigned_admin"].is_number());

        let response = app
            .send("PUT", &status_uri, Some(&admin), Some(json!({ "status": "archived" })))
            .await;
        assert_eq!(response.status(), StatusCode::OK);

        let response = app
            .send(
                "POST",
                &format!("/api/donation-tickets/{}/messages", id),
                Some(&admin),
                Some(json!({ "body": "Thanks!" })),
            )
            .await;
        assert_eq!(response.status(), StatusCode::CONFLICT);

        let list = json_body(app.send("GET", "/api/donation-tickets", Some(&admin), None).await).await;
        assert_eq!(list["total_items"], 0);

        let list = json_body(
            app.send("GET", "/api/donation-tickets?include_archived=true", Some(&admin), None)
                .await,
        )
        .await;
        assert_eq!(list["total_items"], 1);
    }

    #[tokio::test]
    async fn test_anonymous_ticket_requires_email() {
        let app = TestApp::new().await;
        let response = app
            .send(
                "POST",
                "/api/donation-tickets",
                None,
                Some(json!({ "subject": "Hi", "message": "Hello" })),
            )
            .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_users_only_reach_own_tickets() {
        let app = TestApp::new().await;
        let ana = app.user_token("ana@example.org").await;
        let ben = app.user_token("ben@example.org").await;

        let created = json_body(
            app.send(
                "POST",
                "/api/donation-tickets",
                Some(&ana),
                Some(json!({ "subject": "Receipt", "message": "I need a tax receipt" })),
            )
            .await,
        )
        .await;
        let id = created["ticket"]["id"].as_i64().unwrap();
        assert_eq!(created["ticket"]["donor_email"], "ana@example.org");

        let uri = format!("/api/donation-tickets/{}", id);
        assert_eq!(app.send("GET", &uri, Some(&ana), None).await.status(), StatusCode::OK);
        assert_eq!(app.send("GET", &uri, Some(&ben), None).await.status(), StatusCode::FORBIDDEN);

        let bens = json_body(app.send("GET", "/api/donation-tickets", Some(&ben), None).await).await;
        assert_eq!(bens["total_items"], 0);

        let response = app
            .send(
                "POST",
                &format!("{}/messages", uri),
                Some(&ana),
                Some(json!({ "body": "Any news?" })),
            )
            .await;
        assert_eq!(response.status(), StatusCode::CREATED);

        let messages = json_body(app.send("GET", &format!("{}/messages", uri), Some(&ana), None).await).await;
        assert_eq!(messages.as_array().unwrap().len(), 2);

        // only admins change status
        let response = app
            .send("PUT", &format!("{}/status", uri), Some(&ana), Some(json!({ "status": "closed" })))
            .await;
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_donation_with_message_opens_ticket() {
        let app = TestApp::new().await;
        let response = app
            .send(
                "POST",
                "/api/donations",
                None,
                Some(json!({
                    "donor_name": "Rosa",
                    "donor_email": "rosa@example.org",
                    "amount_cents": 2500,
                    "kind": "money",
                    "message": "For the school program"
                })),
            )
            .await;
        assert_eq!(response.status(), StatusCode::CREATED);
        let donation = json_body(response).await;
        assert_eq!(donation["currency"], "EUR");
        assert!(donation["ticket_id"].is_number());

        let response = app
            .send(
                "POST",
                "/api/donations",
                None,
                Some(json!({ "donor_name": "Rosa", "donor_email": "rosa@example.org", "kind": "money" })),
            )
            .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let admin = app.login("admin@example.org", "admin-pass").await;
        let response = app.send("GET", "/api/donations/export", Some(&admin), None).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[header::CONTENT_TYPE], "text/csv");
    }

    #[tokio::test]
    async fn test_full_workshop_rejects_registration() {
        let app = TestApp::new().await;
        let admin = app.login("admin@example.org", "admin-pass").await;
        let ana = app.user_token("ana@example.org").await;
        let ben = app.user_token("ben@example.org").await;

        let workshop = json_body(
            app.send(
                "POST",
                "/api/workshops",
                Some(&admin),
                Some(json!({
                    "title": "First aid",
                    "description": "Basics",
                    "date": "2030-05-01T10:00:00Z",
                    "location": "Room 2",
                    "capacity": 1
                })),
            )
            .await,
        )
        .await;
        let uri = format!("/api/workshops/{}/register", workshop["id"]);

        assert_eq!(app.send("POST", &uri, Some(&ana), None).await.status(), StatusCode::CREATED);
        let response = app.send("POST", &uri, Some(&ben), None).await;
        assert_eq!(response.status(), StatusCode::CONFLICT);
        assert_eq!(json_body(response).await["error"]["code"], "CAPACITY_REACHED");
    }

    #[tokio::test]
    async fn test_volunteer_options_visibility() {
        let app = TestApp::new().await;
        let admin = app.login("admin@example.org", "admin-pass").await;
        let user = app.user_token("vol@example.org").await;

        let response = app
            .send(
                "POST",
                "/api/volunteer-proposals",
                Some(&user),
                Some(json!({
                    "title": "Reading club",
                    "description": "Read to kids",
                    "schedule": "Fridays",
                    "location": "Library"
                })),
            )
            .await;
        assert_eq!(response.status(), StatusCode::CREATED);
        let proposal = json_body(response).await;

        let public = json_body(app.send("GET", "/api/volunteer-options", None, None).await).await;
        assert_eq!(public["total_items"], 0);

        let response = app
            .send(
                "PUT",
                &format!("/api/volunteer-proposals/{}/status", proposal["id"]),
                Some(&admin),
                Some(json!({ "status": "approved" })),
            )
            .await;
        assert_eq!(response.status(), StatusCode::OK);
        let option_id = json_body(response).await["option_id"].as_i64().unwrap();

        let public = json_body(app.send("GET", "/api/volunteer-options", None, None).await).await;
        assert_eq!(public["total_items"], 1);

        let response = app
            .send(
                "POST",
                &format!("/api/volunteer-options/{}/enroll", option_id),
                Some(&user),
                None,
            )
            .await;
        assert_eq!(response.status(), StatusCode::CREATED);

        let mine = json_body(app.send("GET", "/api/volunteers/mine", Some(&user), None).await).await;
        assert_eq!(mine["items"][0]["status"], "pending");
    }

    #[tokio::test]
    async fn test_events_news_type_filter() {
        let app = TestApp::new().await;
        let admin = app.login("admin@example.org", "admin-pass").await;

        for (title, kind) in [("Gala", "event"), ("New roof", "news"), ("Fair", "event")] {
            let response = app
                .send(
                    "POST",
                    "/api/events-news",
                    Some(&admin),
                    Some(json!({
                        "title": title,
                        "description": "...",
                        "date": "2030-01-01T00:00:00Z",
                        "type": kind
                    })),
                )
                .await;
            assert_eq!(response.status(), StatusCode::CREATED);
        }

        let events = json_body(app.send("GET", "/api/events-news?type=event", None, None).await).await;
        assert_eq!(events["total_items"], 2);

        let response = app.send("GET", "/api/events-news/999", None, None).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    async fn assert_validation_envelope(response: Response) {
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = json_body(response).await;
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
        assert!(!body["error"]["message"].as_str().unwrap().is_empty());
        assert!(!body["request_id"].as_str().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_malformed_requests_use_error_envelope() {
        let app = TestApp::new().await;

        // unknown enum value in a JSON body
        let response = app
            .send(
                "POST",
                "/api/donations",
                None,
                Some(json!({
                    "donor_name": "Ana",
                    "donor_email": "ana@example.org",
                    "amount_cents": 1000,
                    "kind": "cash"
                })),
            )
            .await;
        assert_validation_envelope(response).await;

        // missing required field
        let response = app
            .send("POST", "/api/donation-tickets", None, Some(json!({ "subject": "x" })))
            .await;
        assert_validation_envelope(response).await;

        let response = app.send("GET", "/api/events-news?type=bogus", None, None).await;
        assert_validation_envelope(response).await;

        let response = app.send("GET", "/api/events-news/abc", None, None).await;
        assert_validation_envelope(response).await;

        // body that is not JSON at all
        let request = Request::builder()
            .method("POST")
            .uri("/api/login")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from("{not json"))
            .unwrap();
        let response = app.router.clone().oneshot(request).await.unwrap();
        assert_validation_envelope(response).await;
    }
}

//! Fundacion REST Client
//!
//! Typed HTTP client for the portal backend. Every method maps to one
//! endpoint, attaches the bearer token when one is set and turns non-2xx
//! responses into [`ClientError`]. There are no retries: a failed call is
//! reported and the dashboard decides what to do.
//!
//! # Example
//!
//! ```rust,no_run
//! use fundacion::client::ApiClient;
//! use fundacion::forms::LoginForm;
//! use std::time::Duration;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut client = ApiClient::new("http://localhost:8090", Duration::from_secs(10))?;
//!
//!     let form = LoginForm {
//!         email: "ana@example.org".to_string(),
//!         password: "secret-password".to_string(),
//!     };
//!     let login = client.login(&form.validate()?).await?;
//!     client.set_token(Some(login.token));
//!
//!     let me = client.me().await?;
//!     println!("Signed in as {}", me.name);
//!     Ok(())
//! }
//! ```

pub mod error;

pub use error::ClientError;

use reqwest::{Client, Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;

use crate::api::dto::{
    CreateDonationRequest, CreateTicketRequest, EnrollRequest, HealthResponse, LoginRequest,
    LoginResponse, RegisterRequest, ReplyRequest, ReviewUpdate, RoleUpdate, TicketDetail,
    TicketListParams, TicketStatusUpdate, VolunteerOptionRequest,
};
use crate::pagination::{Page, PageParams};
use crate::store::{
    Donation, DonationTicket, EventNewsDetails, EventNewsItem, EventNewsKind, Id, ReviewStatus,
    Role, TicketMessage, TicketStatus, User, VolunteerDetails, VolunteerForm, VolunteerOption,
    VolunteerProposal, Workshop, WorkshopDetails, WorkshopRegistration,
};

/// Result type for client calls
pub type ClientResult<T> = Result<T, ClientError>;

/// Build `?a=1&b=x` from the pairs that have a value
fn query_string(pairs: &[(&str, Option<String>)]) -> String {
    let parts: Vec<String> = pairs
        .iter()
        .filter_map(|(k, v)| {
            v.as_ref()
                .map(|v| format!("{}={}", k, urlencoding::encode(v)))
        })
        .collect();

    if parts.is_empty() {
        String::new()
    } else {
        format!("?{}", parts.join("&"))
    }
}

fn page_pairs(page: &PageParams) -> [(&'static str, Option<String>); 2] {
    [
        ("page", page.page.map(|p| p.to_string())),
        ("per_page", page.per_page.map(|p| p.to_string())),
    ]
}

/// REST client for the portal backend
#[derive(Debug, Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
    token: Option<String>,
}

impl ApiClient {
    /// Create a client for `base_url` (e.g. "http://localhost:8090")
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> ClientResult<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(ClientError::Request)?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token: None,
        })
    }

    /// Same client with a bearer token attached
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    pub fn set_token(&mut self, token: Option<String>) {
        self.token = token;
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = format!("{}{}", self.base_url, path);
        let builder = self.client.request(method, url);
        match &self.token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    async fn execute(&self, builder: RequestBuilder) -> ClientResult<Response> {
        let response = builder.send().await.map_err(ClientError::from_transport)?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let err = ClientError::from_status(status, &body);
        tracing::debug!(status = status.as_u16(), error = %err, "Backend call failed");
        Err(err)
    }

    async fn fetch<T: DeserializeOwned>(&self, builder: RequestBuilder) -> ClientResult<T> {
        let response = self.execute(builder).await?;
        response
            .json()
            .await
            .map_err(|e| ClientError::Decode(e.to_string()))
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> ClientResult<T> {
        self.fetch(self.request(Method::GET, path)).await
    }

    async fn send_json<B: Serialize, T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: &B,
    ) -> ClientResult<T> {
        self.fetch(self.request(method, path).json(body)).await
    }

    async fn delete(&self, path: &str) -> ClientResult<()> {
        self.execute(self.request(Method::DELETE, path)).await?;
        Ok(())
    }

    // ==================== Health ====================

    /// `GET /health/live`
    pub async fn live(&self) -> ClientResult<()> {
        self.execute(self.request(Method::GET, "/health/live")).await?;
        Ok(())
    }

    pub async fn health(&self) -> ClientResult<HealthResponse> {
        self.get("/health").await
    }

    // ==================== Accounts ====================

    pub async fn login(&self, req: &LoginRequest) -> ClientResult<LoginResponse> {
        self.send_json(Method::POST, "/api/login", req).await
    }

    pub async fn register(&self, req: &RegisterRequest) -> ClientResult<User> {
        self.send_json(Method::POST, "/api/register", req).await
    }

    pub async fn logout(&self) -> ClientResult<()> {
        self.execute(self.request(Method::POST, "/api/logout")).await?;
        Ok(())
    }

    pub async fn me(&self) -> ClientResult<User> {
        self.get("/api/me").await
    }

    pub async fn list_users(&self, page: PageParams) -> ClientResult<Page<User>> {
        self.get(&format!("/api/users{}", query_string(&page_pairs(&page))))
            .await
    }

    pub async fn set_role(&self, user_id: Id, role: Role) -> ClientResult<User> {
        self.send_json(
            Method::PUT,
            &format!("/api/users/{}/role", user_id),
            &RoleUpdate { role },
        )
        .await
    }

    // ==================== Donations ====================

    pub async fn create_donation(&self, req: &CreateDonationRequest) -> ClientResult<Donation> {
        self.send_json(Method::POST, "/api/donations", req).await
    }

    pub async fn list_donations(&self, page: PageParams) -> ClientResult<Page<Donation>> {
        self.get(&format!("/api/donations{}", query_string(&page_pairs(&page))))
            .await
    }

    pub async fn my_donations(&self, page: PageParams) -> ClientResult<Page<Donation>> {
        self.get(&format!(
            "/api/donations/mine{}",
            query_string(&page_pairs(&page))
        ))
        .await
    }

    /// CSV text of every donation
    pub async fn export_donations(&self) -> ClientResult<String> {
        let response = self
            .execute(self.request(Method::GET, "/api/donations/export"))
            .await?;
        response.text().await.map_err(ClientError::from_transport)
    }

    // ==================== Tickets ====================

    pub async fn create_ticket(&self, req: &CreateTicketRequest) -> ClientResult<TicketDetail> {
        self.send_json(Method::POST, "/api/donation-tickets", req)
            .await
    }

    pub async fn list_tickets(
        &self,
        params: &TicketListParams,
    ) -> ClientResult<Page<DonationTicket>> {
        let [page, per_page] = page_pairs(&params.page_params());
        let query = query_string(&[
            ("status", params.status.map(|s| s.to_string())),
            (
                "include_archived",
                params.include_archived.then(|| "true".to_string()),
            ),
            page,
            per_page,
        ]);
        self.get(&format!("/api/donation-tickets{}", query)).await
    }

    pub async fn get_ticket(&self, id: Id) -> ClientResult<TicketDetail> {
        self.get(&format!("/api/donation-tickets/{}", id)).await
    }

    pub async fn list_messages(&self, id: Id) -> ClientResult<Vec<TicketMessage>> {
        self.get(&format!("/api/donation-tickets/{}/messages", id))
            .await
    }

    pub async fn reply(&self, id: Id, body: &str) -> ClientResult<TicketMessage> {
        self.send_json(
            Method::POST,
            &format!("/api/donation-tickets/{}/messages", id),
            &ReplyRequest {
                body: body.to_string(),
            },
        )
        .await
    }

    pub async fn set_ticket_status(
        &self,
        id: Id,
        status: TicketStatus,
    ) -> ClientResult<DonationTicket> {
        self.send_json(
            Method::PUT,
            &format!("/api/donation-tickets/{}/status", id),
            &TicketStatusUpdate { status },
        )
        .await
    }

    // ==================== Volunteers ====================

    pub async fn list_options(&self, page: PageParams) -> ClientResult<Page<VolunteerOption>> {
        self.get(&format!(
            "/api/volunteer-options{}",
            query_string(&page_pairs(&page))
        ))
        .await
    }

    pub async fn create_option(&self, req: &VolunteerOptionRequest) -> ClientResult<VolunteerOption> {
        self.send_json(Method::POST, "/api/volunteer-options", req)
            .await
    }

    pub async fn update_option(
        &self,
        id: Id,
        req: &VolunteerOptionRequest,
    ) -> ClientResult<VolunteerOption> {
        self.send_json(Method::PUT, &format!("/api/volunteer-options/{}", id), req)
            .await
    }

    pub async fn delete_option(&self, id: Id) -> ClientResult<()> {
        self.delete(&format!("/api/volunteer-options/{}", id)).await
    }

    pub async fn set_option_status(
        &self,
        id: Id,
        status: ReviewStatus,
    ) -> ClientResult<VolunteerOption> {
        self.send_json(
            Method::PUT,
            &format!("/api/volunteer-options/{}/status", id),
            &ReviewUpdate { status },
        )
        .await
    }

    pub async fn enroll(&self, option_id: Id, note: Option<String>) -> ClientResult<VolunteerForm> {
        self.send_json(
            Method::POST,
            &format!("/api/volunteer-options/{}/enroll", option_id),
            &EnrollRequest { note },
        )
        .await
    }

    pub async fn list_enrollments(&self, page: PageParams) -> ClientResult<Page<VolunteerForm>> {
        self.get(&format!("/api/volunteers{}", query_string(&page_pairs(&page))))
            .await
    }

    pub async fn my_enrollments(&self, page: PageParams) -> ClientResult<Page<VolunteerForm>> {
        self.get(&format!(
            "/api/volunteers/mine{}",
            query_string(&page_pairs(&page))
        ))
        .await
    }

    pub async fn set_enrollment_status(
        &self,
        id: Id,
        status: ReviewStatus,
    ) -> ClientResult<VolunteerForm> {
        self.send_json(
            Method::PUT,
            &format!("/api/volunteers/{}/status", id),
            &ReviewUpdate { status },
        )
        .await
    }

    pub async fn list_proposals(&self, page: PageParams) -> ClientResult<Page<VolunteerProposal>> {
        self.get(&format!(
            "/api/volunteer-proposals{}",
            query_string(&page_pairs(&page))
        ))
        .await
    }

    pub async fn create_proposal(&self, details: &VolunteerDetails) -> ClientResult<VolunteerProposal> {
        self.send_json(Method::POST, "/api/volunteer-proposals", details)
            .await
    }

    pub async fn review_proposal(
        &self,
        id: Id,
        status: ReviewStatus,
    ) -> ClientResult<VolunteerProposal> {
        self.send_json(
            Method::PUT,
            &format!("/api/volunteer-proposals/{}/status", id),
            &ReviewUpdate { status },
        )
        .await
    }

    // ==================== Workshops ====================

    pub async fn list_workshops(&self, page: PageParams) -> ClientResult<Page<Workshop>> {
        self.get(&format!("/api/workshops{}", query_string(&page_pairs(&page))))
            .await
    }

    pub async fn get_workshop(&self, id: Id) -> ClientResult<Workshop> {
        self.get(&format!("/api/workshops/{}", id)).await
    }

    pub async fn create_workshop(&self, details: &WorkshopDetails) -> ClientResult<Workshop> {
        self.send_json(Method::POST, "/api/workshops", details).await
    }

    pub async fn update_workshop(&self, id: Id, details: &WorkshopDetails) -> ClientResult<Workshop> {
        self.send_json(Method::PUT, &format!("/api/workshops/{}", id), details)
            .await
    }

    pub async fn delete_workshop(&self, id: Id) -> ClientResult<()> {
        self.delete(&format!("/api/workshops/{}", id)).await
    }

    pub async fn register_workshop(&self, id: Id) -> ClientResult<WorkshopRegistration> {
        self.fetch(self.request(Method::POST, &format!("/api/workshops/{}/register", id)))
            .await
    }

    pub async fn unregister_workshop(&self, id: Id) -> ClientResult<()> {
        self.delete(&format!("/api/workshops/{}/register", id)).await
    }

    pub async fn workshop_registrations(&self, id: Id) -> ClientResult<Vec<WorkshopRegistration>> {
        self.get(&format!("/api/workshops/{}/registrations", id))
            .await
    }

    // ==================== Events & news ====================

    pub async fn list_events_news(
        &self,
        kind: Option<EventNewsKind>,
        page: PageParams,
    ) -> ClientResult<Page<EventNewsItem>> {
        let [p, pp] = page_pairs(&page);
        let query = query_string(&[("type", kind.map(|k| k.to_string())), p, pp]);
        self.get(&format!("/api/events-news{}", query)).await
    }

    pub async fn get_event_news(&self, id: Id) -> ClientResult<EventNewsItem> {
        self.get(&format!("/api/events-news/{}", id)).await
    }

    pub async fn create_event_news(&self, details: &EventNewsDetails) -> ClientResult<EventNewsItem> {
        self.send_json(Method::POST, "/api/events-news", details).await
    }

    pub async fn update_event_news(
        &self,
        id: Id,
        details: &EventNewsDetails,
    ) -> ClientResult<EventNewsItem> {
        self.send_json(Method::PUT, &format!("/api/events-news/{}", id), details)
            .await
    }

    pub async fn delete_event_news(&self, id: Id) -> ClientResult<()> {
        self.delete(&format!("/api/events-news/{}", id)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::testing::spawn_server;
    use crate::forms::{ContactForm, DonationForm};
    use crate::store::DonationKind;

    #[test]
    fn test_query_string() {
        assert_eq!(query_string(&[("page", None)]), "");
        assert_eq!(
            query_string(&[("status", Some("open".into())), ("q", Some("a b&c".into()))]),
            "?status=open&q=a%20b%26c"
        );
    }

    #[tokio::test]
    async fn test_login_and_me_against_live_server() {
        let server = spawn_server().await;
        let client = ApiClient::new(&server.base_url, Duration::from_secs(5)).unwrap();

        let login = client
            .login(&LoginRequest {
                email: server.admin_email.clone(),
                password: server.admin_password.clone(),
            })
            .await
            .unwrap();
        assert!(login.user.is_admin());

        let client = client.with_token(login.token);
        assert_eq!(client.me().await.unwrap().email, server.admin_email);

        client.logout().await.unwrap();
        let err = client.me().await.unwrap_err();
        assert!(err.is_unauthorized());
        assert_eq!(err.user_message(), "Sesión expirada");
    }

    #[tokio::test]
    async fn test_ticket_calls_and_conflicts() {
        let server = spawn_server().await;
        let anonymous = ApiClient::new(&server.base_url, Duration::from_secs(5)).unwrap();

        let request = ContactForm {
            name: "Pablo".into(),
            email: "pablo@example.org".into(),
            phone: String::new(),
            subject: "Pickup".into(),
            message: "Two boxes of books".into(),
        }
        .validate()
        .unwrap();
        let detail = anonymous.create_ticket(&request).await.unwrap();
        assert!(detail.ticket.is_anonymous());

        // anonymous tickets are admin-only
        assert!(matches!(
            anonymous.get_ticket(detail.ticket.id).await.unwrap_err(),
            ClientError::Unauthorized
        ));

        let admin = server.admin_client().await;
        let closed = admin
            .set_ticket_status(detail.ticket.id, TicketStatus::Closed)
            .await
            .unwrap();
        assert_eq!(closed.status, TicketStatus::Closed);

        let err = admin
            .set_ticket_status(detail.ticket.id, TicketStatus::Closed)
            .await
            .unwrap_err();
        assert!(matches!(err, ClientError::Conflict(_)));
        assert_eq!(err.user_message(), "Error loading data");

        let page = admin
            .list_tickets(&TicketListParams {
                status: Some(TicketStatus::Closed),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(page.total_items, 1);
    }

    #[tokio::test]
    async fn test_donation_and_export() {
        let server = spawn_server().await;
        let anonymous = ApiClient::new(&server.base_url, Duration::from_secs(5)).unwrap();

        let request = DonationForm {
            name: "Rosa".into(),
            email: "rosa@example.org".into(),
            amount: "20,50".into(),
            currency: None,
            kind: DonationKind::Money,
            message: String::new(),
        }
        .validate()
        .unwrap();
        let donation = anonymous.create_donation(&request).await.unwrap();
        assert_eq!(donation.amount_cents, 2050);
        assert!(donation.ticket_id.is_none());

        let csv = server.admin_client().await.export_donations().await.unwrap();
        assert!(csv.contains("20.50,EUR"));
    }

    #[tokio::test]
    async fn test_unreachable_backend_is_connection_error() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let client = ApiClient::new(format!("http://{}", addr), Duration::from_secs(2)).unwrap();
        let err = client.me().await.unwrap_err();
        assert!(err.is_transport());
        assert_eq!(err.user_message(), "Error de conexión");
    }
}

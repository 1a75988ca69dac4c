//! Typed client for the HangOut REST backend.
//!
//! Every endpoint lives under `/api/v1/`. Resource operations are grouped in
//! submodules as `impl ApiClient` blocks; this module owns the shared request
//! path: URL building, bearer attachment, status mapping and body decoding.

pub mod auth;
pub mod businesses;
pub mod categories;
pub mod error;
pub mod events;
pub mod forms;
pub mod models;
pub mod reviews;
pub mod users;
pub mod validation;
pub mod vouchers;

pub use error::{ClientError, ClientResult, ValidationErrorBuilder, ValidationErrors};

use reqwest::header::ACCEPT;
use reqwest::{Client, Method, RequestBuilder};
use serde::de::DeserializeOwned;

use crate::config::ApiConfig;
use crate::session::SessionStore;
use models::{Ack, Envelope};

pub const API_PREFIX: &str = "/api/v1";

/// How an endpoint treats the session token
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthPolicy {
    /// Never send a token
    Public,
    /// Send the token when one is stored
    Optional,
    /// Fail with `Unauthenticated` before sending when no token is stored
    Required,
}

#[derive(Clone)]
pub struct ApiClient {
    http: Client,
    base_url: String,
    session: SessionStore,
}

impl ApiClient {
    pub fn new(config: &ApiConfig, session: SessionStore) -> ClientResult<Self> {
        let http = Client::builder()
            .timeout(config.timeout())
            .user_agent(config.user_agent.clone())
            .build()?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            session,
        })
    }

    pub fn session(&self) -> &SessionStore {
        &self.session
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!(
            "{}{}/{}",
            self.base_url,
            API_PREFIX,
            path.trim_start_matches('/')
        )
    }

    /// Stored token, with an empty string treated as no token
    fn bearer_token(&self) -> Option<String> {
        self.session.token().filter(|t| !t.is_empty())
    }

    /// Start a request. The token is read from the session on every call.
    fn request(&self, method: Method, path: &str, auth: AuthPolicy) -> ClientResult<RequestBuilder> {
        let token = match auth {
            AuthPolicy::Public => None,
            AuthPolicy::Optional => self.bearer_token(),
            AuthPolicy::Required => Some(self.bearer_token().ok_or_else(|| {
                tracing::debug!(%method, path, "Refusing unauthenticated request");
                ClientError::Unauthenticated
            })?),
        };

        let mut builder = self
            .http
            .request(method, self.url(path))
            .header(ACCEPT, "*/*");
        if let Some(token) = token {
            builder = builder.bearer_auth(token);
        }
        Ok(builder)
    }

    /// Send and return the raw body of a 2xx response
    async fn execute(&self, builder: RequestBuilder) -> ClientResult<String> {
        let request = builder.build()?;
        let method = request.method().clone();
        let path = request.url().path().to_string();
        tracing::debug!(%method, %path, "Sending request");

        let response = self.http.execute(request).await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            tracing::warn!(%method, %path, %status, "Request failed");
            return Err(error::request_failed(status, &body));
        }

        Ok(body)
    }

    async fn send<T: DeserializeOwned>(&self, builder: RequestBuilder) -> ClientResult<T> {
        let body = self.execute(builder).await?;
        serde_json::from_str(&body).map_err(|e| ClientError::MalformedResponse(e.to_string()))
    }

    /// Send and unwrap the `{ data }` envelope
    async fn send_data<T: DeserializeOwned>(&self, builder: RequestBuilder) -> ClientResult<T> {
        Ok(self.send::<Envelope<T>>(builder).await?.data)
    }

    /// Send a mutation whose response body is not inspected. Empty and
    /// plain-text bodies are accepted.
    async fn send_ack(&self, builder: RequestBuilder) -> ClientResult<Ack> {
        let body = self.execute(builder).await?;
        let trimmed = body.trim();
        if trimmed.is_empty() {
            return Ok(Ack::default());
        }
        Ok(serde_json::from_str(trimmed).unwrap_or_else(|_| Ack {
            data: None,
            message: Some(trimmed.to_string()),
        }))
    }
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.base_url)
            .field("session", &self.session)
            .finish()
    }
}

/// Reject an empty identifier before anything else happens
pub(crate) fn require_id<'a>(field: &'static str, value: &'a str) -> ClientResult<&'a str> {
    let value = value.trim();
    if value.is_empty() {
        return Err(ClientError::MissingCredential(field));
    }
    Ok(value)
}

/// Query string under construction. Unset and empty values are left out.
#[derive(Debug, Clone, Default)]
pub(crate) struct QueryParams(Vec<(&'static str, String)>);

impl QueryParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(mut self, key: &'static str, value: impl ToString) -> Self {
        self.0.push((key, value.to_string()));
        self
    }

    pub fn push_opt(self, key: &'static str, value: Option<&str>) -> Self {
        match value.map(str::trim) {
            Some(v) if !v.is_empty() => self.push(key, v),
            _ => self,
        }
    }

    pub fn pairs(&self) -> &[(&'static str, String)] {
        &self.0
    }
}

/// `page` / `size` paging with optional sort
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageQuery {
    pub page: u32,
    pub size: u32,
    pub sort_by: Option<String>,
    pub is_asc: bool,
}

impl Default for PageQuery {
    fn default() -> Self {
        Self {
            page: 1,
            size: 10,
            sort_by: None,
            is_asc: true,
        }
    }
}

impl PageQuery {
    pub fn new(page: u32, size: u32) -> Self {
        Self {
            page,
            size,
            ..Self::default()
        }
    }

    /// Category listings default to 30 per page
    pub fn categories() -> Self {
        Self::new(1, 30)
    }

    pub fn sorted_by(mut self, field: impl Into<String>, ascending: bool) -> Self {
        self.sort_by = Some(field.into());
        self.is_asc = ascending;
        self
    }

    pub(crate) fn params(&self) -> QueryParams {
        QueryParams::new()
            .push("page", self.page)
            .push("size", self.size)
            .push_opt("sortBy", self.sort_by.as_deref())
            .push("isAsc", self.is_asc)
    }

    /// Same paging without the sort parameters
    pub(crate) fn plain_params(&self) -> QueryParams {
        QueryParams::new()
            .push("page", self.page)
            .push("size", self.size)
    }
}

/// `pageNumber` / `pageSize` paging
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageNumberQuery {
    pub page_number: u32,
    pub page_size: u32,
}

impl Default for PageNumberQuery {
    fn default() -> Self {
        Self {
            page_number: 1,
            page_size: 10,
        }
    }
}

impl PageNumberQuery {
    pub fn new(page_number: u32, page_size: u32) -> Self {
        Self {
            page_number,
            page_size,
        }
    }

    pub(crate) fn params(&self) -> QueryParams {
        QueryParams::new()
            .push("pageNumber", self.page_number)
            .push("pageSize", self.page_size)
    }
}

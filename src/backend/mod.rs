mod error;
mod types;

pub use error::BackendError;
pub use types::{
    AdminUser, ExplainRequest, ExplainResponse, FeedbackItem, FeedbackRequest, Language, Level,
    LoginRequest, Profile, Rating, SaveRequest, SavedExplanation, SignupRequest, TokenResponse,
};

use std::future::Future;

use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, instrument};

use crate::history::{self, HistoryEntry};

use self::types::ErrorBody;

/// The REST surface of the explanation service.
///
/// Endpoints that exist in a guest and a signed-in flavour take an optional
/// token and pick the route from it.
pub trait Backend: Send + Sync {
    fn signup(&self, request: &SignupRequest<'_>)
    -> impl Future<Output = Result<(), BackendError>> + Send;

    fn login(
        &self,
        request: &LoginRequest<'_>,
    ) -> impl Future<Output = Result<TokenResponse, BackendError>> + Send;

    fn profile(&self, token: &str) -> impl Future<Output = Result<Profile, BackendError>> + Send;

    fn explain(
        &self,
        token: Option<&str>,
        request: &ExplainRequest<'_>,
    ) -> impl Future<Output = Result<ExplainResponse, BackendError>> + Send;

    fn search_history(
        &self,
        token: &str,
    ) -> impl Future<Output = Result<Vec<HistoryEntry>, BackendError>> + Send;

    fn submit_feedback(
        &self,
        token: Option<&str>,
        request: &FeedbackRequest<'_>,
    ) -> impl Future<Output = Result<(), BackendError>> + Send;

    fn save_explanation(
        &self,
        token: &str,
        request: &SaveRequest<'_>,
    ) -> impl Future<Output = Result<(), BackendError>> + Send;

    fn saved_explanations(
        &self,
        token: &str,
    ) -> impl Future<Output = Result<Vec<SavedExplanation>, BackendError>> + Send;

    fn delete_saved(
        &self,
        token: &str,
        term: &str,
    ) -> impl Future<Output = Result<(), BackendError>> + Send;

    fn admin_users(
        &self,
        token: &str,
    ) -> impl Future<Output = Result<Vec<AdminUser>, BackendError>> + Send;

    fn admin_feedback(
        &self,
        token: &str,
    ) -> impl Future<Output = Result<Vec<FeedbackItem>, BackendError>> + Send;
}

/// reqwest-backed client. No timeouts or retries: a failed call is final.
#[derive(Clone)]
pub struct BackendClient {
    http: Client,
    base_url: String,
}

impl BackendClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            http: Client::new(),
            base_url,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn authorized(&self, builder: RequestBuilder, token: Option<&str>) -> RequestBuilder {
        match token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, BackendError> {
        let response = checked(request).await?;
        response
            .json::<T>()
            .await
            .map_err(|err| BackendError::Decode(err.to_string()))
    }

    /// For mutations whose reply body carries nothing the app reads.
    async fn send_discarding(&self, request: RequestBuilder) -> Result<(), BackendError> {
        checked(request).await.map(|_| ())
    }
}

async fn checked(request: RequestBuilder) -> Result<Response, BackendError> {
    let response = request.send().await.map_err(BackendError::Transport)?;
    let status = response.status();

    if !status.is_success() {
        let detail = error_detail(response).await;
        debug!(%status, %detail, "backend returned an error status");
        return Err(BackendError::from_status(status, detail));
    }

    Ok(response)
}

async fn error_detail(response: Response) -> String {
    match response.json::<ErrorBody>().await {
        Ok(ErrorBody {
            detail: Some(Value::String(detail)),
        }) if !detail.is_empty() => detail,
        Ok(ErrorBody {
            detail: Some(other),
        }) if !other.is_null() => other.to_string(),
        _ => error::generic_detail(),
    }
}

impl Backend for BackendClient {
    #[instrument(skip_all, fields(email = %request.email))]
    async fn signup(&self, request: &SignupRequest<'_>) -> Result<(), BackendError> {
        let builder = self.http.post(self.url("/auth/signup")).json(request);
        self.send_discarding(builder).await
    }

    #[instrument(skip_all, fields(email = %request.email))]
    async fn login(&self, request: &LoginRequest<'_>) -> Result<TokenResponse, BackendError> {
        let builder = self.http.post(self.url("/auth/login")).json(request);
        self.send(builder).await
    }

    async fn profile(&self, token: &str) -> Result<Profile, BackendError> {
        let builder = self.http.get(self.url("/user/profile")).bearer_auth(token);
        self.send(builder).await
    }

    #[instrument(skip_all, fields(term = %request.term, guest = token.is_none()))]
    async fn explain(
        &self,
        token: Option<&str>,
        request: &ExplainRequest<'_>,
    ) -> Result<ExplainResponse, BackendError> {
        let path = if token.is_some() {
            "/explain"
        } else {
            "/explain/guest"
        };
        let builder = self.authorized(self.http.post(self.url(path)), token).json(request);
        let raw: Value = self.send(builder).await?;
        ExplainResponse::from_value(raw).map_err(|err| BackendError::Decode(err.to_string()))
    }

    async fn search_history(&self, token: &str) -> Result<Vec<HistoryEntry>, BackendError> {
        let builder = self
            .http
            .get(self.url("/user/search-history"))
            .bearer_auth(token);
        let raw: Value = self.send(builder).await?;
        Ok(history::from_response(raw))
    }

    #[instrument(skip_all, fields(term = %request.term, rating = ?request.rating, guest = token.is_none()))]
    async fn submit_feedback(
        &self,
        token: Option<&str>,
        request: &FeedbackRequest<'_>,
    ) -> Result<(), BackendError> {
        let path = if token.is_some() {
            "/feedback"
        } else {
            "/feedback/guest"
        };
        let builder = self.authorized(self.http.post(self.url(path)), token).json(request);
        self.send_discarding(builder).await
    }

    #[instrument(skip_all, fields(term = %request.term))]
    async fn save_explanation(
        &self,
        token: &str,
        request: &SaveRequest<'_>,
    ) -> Result<(), BackendError> {
        let builder = self
            .http
            .post(self.url("/save"))
            .bearer_auth(token)
            .json(request);
        self.send_discarding(builder).await
    }

    async fn saved_explanations(&self, token: &str) -> Result<Vec<SavedExplanation>, BackendError> {
        let builder = self
            .http
            .get(self.url("/user/saved-explanations"))
            .bearer_auth(token);
        self.send(builder).await
    }

    #[instrument(skip_all, fields(term = %term))]
    async fn delete_saved(&self, token: &str, term: &str) -> Result<(), BackendError> {
        let builder = self
            .http
            .delete(self.url("/save"))
            .query(&[("term", term)])
            .bearer_auth(token);
        self.send_discarding(builder).await
    }

    async fn admin_users(&self, token: &str) -> Result<Vec<AdminUser>, BackendError> {
        let builder = self.http.get(self.url("/admin/users")).bearer_auth(token);
        self.send(builder).await
    }

    async fn admin_feedback(&self, token: &str) -> Result<Vec<FeedbackItem>, BackendError> {
        let builder = self.http.get(self.url("/admin/feedback")).bearer_auth(token);
        self.send(builder).await
    }
}

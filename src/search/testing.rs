use std::sync::{
    Mutex,
    atomic::{AtomicBool, Ordering},
};

use reqwest::StatusCode;
use serde_json::json;

use crate::{
    backend::{
        AdminUser, Backend, BackendError, ExplainRequest, ExplainResponse, FeedbackItem,
        FeedbackRequest, LoginRequest, Profile, SaveRequest, SavedExplanation, SignupRequest,
        TokenResponse,
    },
    history::HistoryEntry,
    preferences::ClientState,
    session::{Session, token_with_claims},
};

/// In-memory stand-in for the explanation service that records every call.
#[derive(Default)]
pub(crate) struct FakeBackend {
    calls: Mutex<Vec<String>>,
    history: Mutex<Vec<HistoryEntry>>,
    saved: Mutex<Vec<SavedExplanation>>,
    feedback: Mutex<Vec<(String, String, String)>>,
    soft_error: Mutex<Option<String>>,
    fail_explain: AtomicBool,
    fail_history: AtomicBool,
    fail_feedback: AtomicBool,
    fail_save: AtomicBool,
    fail_saved_list: AtomicBool,
    expire_sessions: AtomicBool,
}

impl FakeBackend {
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn count(&self, prefix: &str) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|call| call.starts_with(prefix))
            .count()
    }

    pub fn saved_terms(&self) -> Vec<String> {
        self.saved
            .lock()
            .unwrap()
            .iter()
            .map(|entry| entry.term.clone())
            .collect()
    }

    /// `(term, rating, reason)` for every accepted submission.
    pub fn feedback(&self) -> Vec<(String, String, String)> {
        self.feedback.lock().unwrap().clone()
    }

    pub fn seed_saved(&self, term: &str) {
        self.saved.lock().unwrap().push(SavedExplanation {
            term: term.to_string(),
            explanation: format!("Saved explanation of {term}."),
            saved_at: Some("2024-05-01T10:00:00".to_string()),
        });
    }

    pub fn soft_error(&self, message: Option<&str>) {
        *self.soft_error.lock().unwrap() = message.map(str::to_string);
    }

    pub fn fail_explain(&self, fail: bool) {
        self.fail_explain.store(fail, Ordering::SeqCst);
    }

    pub fn fail_history(&self, fail: bool) {
        self.fail_history.store(fail, Ordering::SeqCst);
    }

    pub fn fail_feedback(&self, fail: bool) {
        self.fail_feedback.store(fail, Ordering::SeqCst);
    }

    pub fn fail_save(&self, fail: bool) {
        self.fail_save.store(fail, Ordering::SeqCst);
    }

    pub fn fail_saved_list(&self, fail: bool) {
        self.fail_saved_list.store(fail, Ordering::SeqCst);
    }

    pub fn expire_sessions(&self, expire: bool) {
        self.expire_sessions.store(expire, Ordering::SeqCst);
    }

    fn record(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }

    fn check_token(&self, token: Option<&str>) -> Result<(), BackendError> {
        if token.is_some() && self.expire_sessions.load(Ordering::SeqCst) {
            return Err(BackendError::Unauthorized("Invalid token".to_string()));
        }
        Ok(())
    }
}

fn server_error() -> BackendError {
    BackendError::Rejected {
        status: StatusCode::INTERNAL_SERVER_ERROR,
        detail: "boom".to_string(),
    }
}

pub(crate) fn guest() -> ClientState {
    ClientState::default()
}

pub(crate) fn signed_in() -> ClientState {
    let token = token_with_claims(json!({"email": "ada@example.com", "name": "Ada", "role": "user"}));
    ClientState::new(Session::from_token(token), Default::default(), Default::default())
}

impl Backend for FakeBackend {
    async fn signup(&self, request: &SignupRequest<'_>) -> Result<(), BackendError> {
        self.record(format!("signup {}", request.email));
        Ok(())
    }

    async fn login(&self, request: &LoginRequest<'_>) -> Result<TokenResponse, BackendError> {
        self.record(format!("login {}", request.email));
        Ok(TokenResponse {
            access_token: token_with_claims(json!({"email": request.email})),
        })
    }

    async fn profile(&self, token: &str) -> Result<Profile, BackendError> {
        self.record("profile".to_string());
        self.check_token(Some(token))?;
        Ok(Profile {
            name: "Ada".to_string(),
            email: "ada@example.com".to_string(),
        })
    }

    async fn explain(
        &self,
        token: Option<&str>,
        request: &ExplainRequest<'_>,
    ) -> Result<ExplainResponse, BackendError> {
        let mode = if token.is_some() { "user" } else { "guest" };
        self.record(format!(
            "explain {mode} {} {} {}",
            request.term,
            request.level.as_str(),
            request.language.as_str()
        ));
        self.check_token(token)?;

        if self.fail_explain.load(Ordering::SeqCst) {
            return Err(server_error());
        }

        if let Some(message) = self.soft_error.lock().unwrap().clone() {
            return Ok(ExplainResponse::from_value(json!({"error": message})).unwrap());
        }

        if token.is_some() {
            self.history.lock().unwrap().push(HistoryEntry {
                term: request.term.to_string(),
                level: Some(request.level),
                explanation: None,
            });
        }

        Ok(ExplainResponse::from_value(json!({
            "term": request.term,
            "level": request.level.as_str(),
            "explanation": format!("{} explained simply.", request.term),
            "relative_terms": [format!("{} process", request.term)],
        }))
        .unwrap())
    }

    async fn search_history(&self, token: &str) -> Result<Vec<HistoryEntry>, BackendError> {
        self.record("history".to_string());
        self.check_token(Some(token))?;
        if self.fail_history.load(Ordering::SeqCst) {
            return Err(server_error());
        }
        Ok(self.history.lock().unwrap().clone())
    }

    async fn submit_feedback(
        &self,
        token: Option<&str>,
        request: &FeedbackRequest<'_>,
    ) -> Result<(), BackendError> {
        let mode = if token.is_some() { "user" } else { "guest" };
        self.record(format!("feedback {mode} {}", request.term));
        self.check_token(token)?;
        if self.fail_feedback.load(Ordering::SeqCst) {
            return Err(server_error());
        }
        let rating = serde_json::to_value(request.rating)
            .ok()
            .and_then(|value| value.as_str().map(str::to_string))
            .unwrap_or_default();
        self.feedback.lock().unwrap().push((
            request.term.to_string(),
            rating,
            request.reason.to_string(),
        ));
        Ok(())
    }

    async fn save_explanation(
        &self,
        token: &str,
        request: &SaveRequest<'_>,
    ) -> Result<(), BackendError> {
        self.record(format!("save {}", request.term));
        self.check_token(Some(token))?;
        if self.fail_save.load(Ordering::SeqCst) {
            return Err(server_error());
        }
        let mut saved = self.saved.lock().unwrap();
        if !saved.iter().any(|entry| entry.term == request.term) {
            saved.push(SavedExplanation {
                term: request.term.to_string(),
                explanation: request.explanation.to_string(),
                saved_at: Some("2024-05-02T08:30:00".to_string()),
            });
        }
        Ok(())
    }

    async fn saved_explanations(&self, token: &str) -> Result<Vec<SavedExplanation>, BackendError> {
        self.record("saved".to_string());
        self.check_token(Some(token))?;
        if self.fail_saved_list.load(Ordering::SeqCst) {
            return Err(server_error());
        }
        Ok(self.saved.lock().unwrap().clone())
    }

    async fn delete_saved(&self, token: &str, term: &str) -> Result<(), BackendError> {
        self.record(format!("unsave {term}"));
        self.check_token(Some(token))?;
        if self.fail_save.load(Ordering::SeqCst) {
            return Err(server_error());
        }
        self.saved.lock().unwrap().retain(|entry| entry.term != term);
        Ok(())
    }

    async fn admin_users(&self, token: &str) -> Result<Vec<AdminUser>, BackendError> {
        self.record("admin users".to_string());
        self.check_token(Some(token))?;
        Ok(Vec::new())
    }

    async fn admin_feedback(&self, token: &str) -> Result<Vec<FeedbackItem>, BackendError> {
        self.record("admin feedback".to_string());
        self.check_token(Some(token))?;
        Ok(Vec::new())
    }
}

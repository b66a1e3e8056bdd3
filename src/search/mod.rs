pub mod feedback;
pub mod saved;
mod view;

#[cfg(test)]
pub(crate) mod testing;

pub use view::{HomeView, Notice, SearchResult};

use tracing::{error, info, warn};

use crate::{
    backend::{Backend, BackendError, ExplainRequest, Level},
    preferences::ClientState,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchOutcome {
    /// Blank input; nothing was sent.
    Ignored,
    /// Guest quota already spent; nothing was sent.
    Blocked,
    Explained,
    /// The call completed but the generator reported an error in the body.
    SoftError,
    Failed,
    SessionExpired,
}

/// Run one search for the browser described by `client`, updating `view`.
///
/// The guest quota is consumed only once a response has come back, including
/// responses that carry a soft error; transport failures and error statuses
/// leave it untouched.
pub async fn run_search<B: Backend>(
    backend: &B,
    client: &mut ClientState,
    view: &mut HomeView,
    term: &str,
    level: Level,
) -> SearchOutcome {
    let term = term.trim();
    view.query = term.to_string();
    view.level = level;

    if term.is_empty() {
        return SearchOutcome::Ignored;
    }

    let token = client.session().token().map(str::to_owned);

    if token.is_none() && client.quota().is_consumed() {
        info!(term, "guest search blocked, free query already used");
        view.notice = Some(Notice::GuestLimitReached);
        return SearchOutcome::Blocked;
    }

    view.show_result(None);

    let request = ExplainRequest {
        term,
        level,
        language: client.language(),
    };

    let response = match backend.explain(token.as_deref(), &request).await {
        Ok(response) => response,
        Err(err) => return search_failed(view, term, err),
    };

    match token.as_deref() {
        Some(token) => {
            refresh_history(backend, token, view).await;
        }
        None => client.consume_guest_quota(),
    }

    if let Some(message) = response.error.clone() {
        warn!(term, %message, "explanation service reported an error");
        view.notice = Some(Notice::SoftError(message));
        return SearchOutcome::SoftError;
    }

    view.show_result(Some(SearchResult::from_response(term, level, response)));
    view.notice = None;
    SearchOutcome::Explained
}

fn search_failed(view: &mut HomeView, term: &str, err: BackendError) -> SearchOutcome {
    if err.is_auth() {
        warn!(?err, term, "session rejected during search");
        return SearchOutcome::SessionExpired;
    }

    error!(?err, term, "explanation request failed");
    view.notice = Some(Notice::SearchFailed);
    SearchOutcome::Failed
}

/// Replace the history list with the server copy. A failed refresh keeps the
/// previous list.
pub async fn refresh_history<B: Backend>(backend: &B, token: &str, view: &mut HomeView) -> bool {
    match backend.search_history(token).await {
        Ok(entries) => {
            view.history = entries;
            true
        }
        Err(err) => {
            warn!(?err, "failed to refresh search history");
            false
        }
    }
}

/// Load history and the saved set the first time a signed-in browser opens
/// the home page.
pub async fn hydrate<B: Backend>(backend: &B, client: &ClientState, view: &mut HomeView) {
    let Some(token) = client.session().token() else {
        return;
    };

    let (history, saved) = tokio::join!(
        backend.search_history(token),
        backend.saved_explanations(token)
    );

    match history {
        Ok(entries) => view.history = entries,
        Err(err) => warn!(?err, "failed to load search history"),
    }
    match saved {
        Ok(entries) => view.saved = entries,
        Err(err) => warn!(?err, "failed to load saved explanations"),
    }

    view.synced = true;
}

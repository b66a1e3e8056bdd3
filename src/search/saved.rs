use tracing::{error, warn};

use crate::{
    backend::{Backend, BackendError, SaveRequest},
    preferences::ClientState,
};

use super::{HomeView, Notice};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveOutcome {
    Saved,
    Removed,
    NoResult,
    LoginRequired,
    Failed,
    SessionExpired,
}

/// Save the displayed explanation, or remove it if it is already saved, then
/// reload the saved set from the server.
pub async fn toggle_save<B: Backend>(
    backend: &B,
    client: &ClientState,
    view: &mut HomeView,
) -> SaveOutcome {
    let Some(token) = client.session().token() else {
        view.notice = Some(Notice::LoginToSave);
        return SaveOutcome::LoginRequired;
    };

    let was_saved = view.is_saved();

    let mutation = {
        let Some(result) = view.result.as_ref() else {
            return SaveOutcome::NoResult;
        };

        if was_saved {
            backend.delete_saved(token, &result.term).await
        } else {
            let request = SaveRequest {
                term: &result.term,
                explanation: &result.explanation,
            };
            backend.save_explanation(token, &request).await
        }
    };

    if let Err(err) = mutation {
        return save_failed(view, was_saved, err);
    }

    let reloaded = refresh_saved(backend, token, view).await;

    let (notice, outcome) = if was_saved {
        (Notice::Removed, SaveOutcome::Removed)
    } else {
        (Notice::Saved, SaveOutcome::Saved)
    };

    if reloaded {
        view.notice = Some(notice);
    } else {
        // Reload on the next home render.
        view.synced = false;
        view.notice = Some(Notice::SavedListStale);
    }
    outcome
}

fn save_failed(view: &mut HomeView, was_saved: bool, err: BackendError) -> SaveOutcome {
    if err.is_auth() {
        warn!(?err, "session rejected while updating saved explanations");
        return SaveOutcome::SessionExpired;
    }

    error!(?err, removing = was_saved, "failed to update saved explanations");
    view.notice = Some(Notice::SaveFailed);
    SaveOutcome::Failed
}

/// Replace the saved set with the server copy. The list is never merged
/// locally.
pub async fn refresh_saved<B: Backend>(backend: &B, token: &str, view: &mut HomeView) -> bool {
    match backend.saved_explanations(token).await {
        Ok(entries) => {
            view.saved = entries;
            true
        }
        Err(err) => {
            warn!(?err, "failed to reload saved explanations");
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        backend::Level,
        search::{
            run_search,
            testing::{FakeBackend, guest, signed_in},
        },
    };

    #[tokio::test]
    async fn save_then_unsave_round_trips_the_saved_set() {
        let backend = FakeBackend::default();
        backend.seed_saved("osmosis");
        let mut client = signed_in();
        let mut view = HomeView::default();
        refresh_saved(&backend, client.session().token().unwrap(), &mut view).await;
        let before = view.saved.clone();

        run_search(&backend, &mut client, &mut view, "entropy", Level::Student).await;
        assert!(!view.is_saved());

        assert_eq!(toggle_save(&backend, &client, &mut view).await, SaveOutcome::Saved);
        assert!(view.is_saved());
        assert_eq!(backend.saved_terms(), vec!["osmosis", "entropy"]);

        assert_eq!(toggle_save(&backend, &client, &mut view).await, SaveOutcome::Removed);
        assert!(!view.is_saved());
        assert_eq!(view.saved, before);

        let mut fresh = HomeView::default();
        refresh_saved(&backend, client.session().token().unwrap(), &mut fresh).await;
        assert!(!fresh.saved.iter().any(|entry| entry.term == "entropy"));
        assert_eq!(backend.count("saved"), 4);
    }

    #[tokio::test]
    async fn guests_are_asked_to_log_in() {
        let backend = FakeBackend::default();
        let mut client = guest();
        let mut view = HomeView::default();
        run_search(&backend, &mut client, &mut view, "entropy", Level::Student).await;
        let before = backend.calls().len();

        assert_eq!(
            toggle_save(&backend, &client, &mut view).await,
            SaveOutcome::LoginRequired
        );
        assert_eq!(view.notice, Some(Notice::LoginToSave));
        assert_eq!(backend.calls().len(), before);
    }

    #[tokio::test]
    async fn failed_save_keeps_local_state() {
        let backend = FakeBackend::default();
        let mut client = signed_in();
        let mut view = HomeView::default();
        run_search(&backend, &mut client, &mut view, "entropy", Level::Student).await;
        backend.fail_save(true);

        assert_eq!(toggle_save(&backend, &client, &mut view).await, SaveOutcome::Failed);
        assert!(!view.is_saved());
        assert_eq!(view.notice, Some(Notice::SaveFailed));
        assert_eq!(backend.count("saved"), 0);
    }

    #[tokio::test]
    async fn failed_reload_after_save_asks_for_a_resync() {
        let backend = FakeBackend::default();
        let mut client = signed_in();
        let mut view = HomeView::default();
        run_search(&backend, &mut client, &mut view, "entropy", Level::Student).await;
        view.synced = true;
        backend.fail_saved_list(true);

        assert_eq!(toggle_save(&backend, &client, &mut view).await, SaveOutcome::Saved);
        assert_eq!(view.notice, Some(Notice::SavedListStale));
        assert!(!view.synced);
        assert_eq!(backend.saved_terms(), vec!["entropy"]);

        backend.fail_saved_list(false);
        crate::search::hydrate(&backend, &client, &mut view).await;
        assert!(view.is_saved());
        assert_eq!(toggle_save(&backend, &client, &mut view).await, SaveOutcome::Removed);
        assert!(backend.saved_terms().is_empty());
        assert_eq!(backend.count("unsave entropy"), 1);
    }

    #[tokio::test]
    async fn nothing_displayed_means_nothing_to_save() {
        let backend = FakeBackend::default();
        let client = signed_in();
        let mut view = HomeView::default();

        assert_eq!(
            toggle_save(&backend, &client, &mut view).await,
            SaveOutcome::NoResult
        );
        assert!(backend.calls().is_empty());
    }
}

use tracing::{error, warn};

use crate::{
    backend::{Backend, FeedbackRequest, Rating},
    preferences::ClientState,
};

use super::{HomeView, Notice};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedbackOutcome {
    Submitted,
    AlreadySubmitted,
    NoResult,
    PromptOpened,
    ReasonRequired,
    Failed,
    SessionExpired,
}

pub async fn submit_positive<B: Backend>(
    backend: &B,
    client: &ClientState,
    view: &mut HomeView,
) -> FeedbackOutcome {
    submit(backend, client, view, Rating::Positive, "").await
}

pub fn open_reason_prompt(view: &mut HomeView) -> FeedbackOutcome {
    if view.result.is_none() {
        return FeedbackOutcome::NoResult;
    }
    if view.feedback.submitted {
        return FeedbackOutcome::AlreadySubmitted;
    }

    view.feedback.reason_prompt_open = true;
    FeedbackOutcome::PromptOpened
}

pub fn cancel_reason_prompt(view: &mut HomeView) {
    view.feedback.reason_prompt_open = false;
}

/// Submit a thumbs-down. Blank reasons are refused before any request and the
/// prompt stays open.
pub async fn submit_negative<B: Backend>(
    backend: &B,
    client: &ClientState,
    view: &mut HomeView,
    reason: &str,
) -> FeedbackOutcome {
    if view.feedback.submitted {
        return FeedbackOutcome::AlreadySubmitted;
    }

    let reason = reason.trim();
    if reason.is_empty() {
        view.feedback.reason_prompt_open = view.result.is_some();
        view.notice = Some(Notice::ReasonRequired);
        return FeedbackOutcome::ReasonRequired;
    }

    submit(backend, client, view, Rating::Negative, reason).await
}

async fn submit<B: Backend>(
    backend: &B,
    client: &ClientState,
    view: &mut HomeView,
    rating: Rating,
    reason: &str,
) -> FeedbackOutcome {
    if view.feedback.submitted {
        return FeedbackOutcome::AlreadySubmitted;
    }

    let submitted = {
        let Some(result) = view.result.as_ref() else {
            return FeedbackOutcome::NoResult;
        };

        let request = FeedbackRequest {
            term: &result.term,
            rating,
            reason,
            explanation: &result.explanation,
        };
        backend
            .submit_feedback(client.session().token(), &request)
            .await
    };

    match submitted {
        Ok(()) => {
            view.feedback.submitted = true;
            view.feedback.reason_prompt_open = false;
            view.notice = Some(Notice::FeedbackThanks);
            FeedbackOutcome::Submitted
        }
        Err(err) if err.is_auth() => {
            warn!(?err, "session rejected while submitting feedback");
            FeedbackOutcome::SessionExpired
        }
        Err(err) => {
            error!(?err, ?rating, "failed to submit feedback");
            view.notice = Some(Notice::FeedbackFailed);
            FeedbackOutcome::Failed
        }
    }
}

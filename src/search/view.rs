use std::borrow::Cow;

use serde_json::Value;

use crate::{
    backend::{ExplainResponse, Level, SavedExplanation},
    history::HistoryEntry,
};

#[derive(Debug, Clone, PartialEq)]
pub struct SearchResult {
    pub term: String,
    pub level: Level,
    pub explanation: String,
    pub related_terms: Vec<String>,
    pub raw: Value,
}

impl SearchResult {
    pub fn from_response(term: &str, level: Level, response: ExplainResponse) -> Self {
        let ExplainResponse {
            term: echoed_term,
            explanation,
            relative_terms,
            raw,
            ..
        } = response;

        Self {
            term: echoed_term
                .filter(|echoed| !echoed.trim().is_empty())
                .unwrap_or_else(|| term.to_string()),
            level,
            explanation: explanation.unwrap_or_default(),
            related_terms: relative_terms
                .into_iter()
                .map(|related| related.trim().to_string())
                .filter(|related| !related.is_empty())
                .collect(),
            raw,
        }
    }
}

/// One-shot message shown above the search form on the next render.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    GuestLimitReached,
    SearchFailed,
    SoftError(String),
    LoginToSave,
    Saved,
    Removed,
    SaveFailed,
    SavedListStale,
    ReasonRequired,
    FeedbackThanks,
    FeedbackFailed,
}

impl Notice {
    pub fn message(&self) -> Cow<'_, str> {
        match self {
            Notice::GuestLimitReached => Cow::Borrowed(
                "You have used your free guest search. Log in or sign up to keep exploring.",
            ),
            Notice::SearchFailed => Cow::Borrowed("Sorry, an error occurred. Please try again."),
            Notice::SoftError(message) => Cow::Borrowed(message.as_str()),
            Notice::LoginToSave => Cow::Borrowed("Please log in to save explanations."),
            Notice::Saved => Cow::Borrowed("Explanation saved."),
            Notice::Removed => Cow::Borrowed("Explanation removed from your saved list."),
            Notice::SaveFailed => {
                Cow::Borrowed("Could not update your saved explanations. Please try again.")
            }
            Notice::SavedListStale => Cow::Borrowed(
                "Your change went through, but the saved list could not be reloaded.",
            ),
            Notice::ReasonRequired => {
                Cow::Borrowed("Please tell us what was wrong before submitting.")
            }
            Notice::FeedbackThanks => Cow::Borrowed("Thanks for your feedback!"),
            Notice::FeedbackFailed => Cow::Borrowed("Could not submit feedback. Please try again."),
        }
    }

    pub fn is_error(&self) -> bool {
        !matches!(
            self,
            Notice::Saved | Notice::Removed | Notice::FeedbackThanks
        )
    }

    pub fn prompts_login(&self) -> bool {
        matches!(self, Notice::GuestLimitReached | Notice::LoginToSave)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FeedbackState {
    pub(super) submitted: bool,
    pub(super) reason_prompt_open: bool,
}

impl FeedbackState {
    pub fn is_submitted(&self) -> bool {
        self.submitted
    }

    pub fn is_prompt_open(&self) -> bool {
        self.reason_prompt_open
    }
}

/// Display state of the home page for one browser.
#[derive(Debug, Clone, Default)]
pub struct HomeView {
    pub query: String,
    pub level: Level,
    pub result: Option<SearchResult>,
    pub feedback: FeedbackState,
    pub saved: Vec<SavedExplanation>,
    pub history: Vec<HistoryEntry>,
    pub notice: Option<Notice>,
    pub synced: bool,
}

impl HomeView {
    pub fn current_term(&self) -> Option<&str> {
        self.result.as_ref().map(|result| result.term.as_str())
    }

    /// Exact-match membership of the displayed term in the saved set.
    pub fn is_saved(&self) -> bool {
        self.current_term()
            .is_some_and(|term| self.saved.iter().any(|saved| saved.term == term))
    }

    pub fn take_notice(&mut self) -> Option<Notice> {
        self.notice.take()
    }

    pub(super) fn show_result(&mut self, result: Option<SearchResult>) {
        self.result = result;
        self.feedback = FeedbackState::default();
    }
}

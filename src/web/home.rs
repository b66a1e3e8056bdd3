use axum::{
    extract::{Form, State},
    response::{Html, Redirect},
};
use axum_extra::extract::cookie::CookieJar;
use serde::Deserialize;
use uuid::Uuid;

use crate::{
    backend::{Language, Level},
    history::{self, RECENT_LIMIT},
    preferences::{ClientState, clear_token},
    search::{
        self, HomeView, Notice, SearchOutcome, SearchResult,
        feedback::{self, FeedbackOutcome},
        saved::{self, SaveOutcome},
    },
};

use super::{
    AppState, escape_html,
    flash::render_notice,
    templates::{PageLayout, format_timestamp, render_page},
    views::{current_view_id, ensure_view_id},
};

const HOME_STYLES: &str = r#"
        .search-form { display: grid; grid-template-columns: 1fr 180px auto; gap: 0.75rem; align-items: end; }
        .language-form { display: flex; gap: 0.75rem; align-items: end; margin-bottom: 1.25rem; max-width: 360px; }
        .guest-banner { background: #fef3c7; color: #92400e; border: 1px solid #fde68a; padding: 0.9rem 1.1rem; border-radius: 10px; margin-bottom: 1.5rem; }
        .guest-banner a { color: inherit; font-weight: 700; }
        .result-meta { color: #64748b; font-size: 0.9rem; margin-top: -0.5rem; }
        .explanation { line-height: 1.7; }
        .related { display: flex; flex-wrap: wrap; gap: 0.5rem; margin: 1rem 0; }
        .related button { background: #e0f2fe; color: #1d4ed8; padding: 0.4rem 0.85rem; border-radius: 999px; }
        .result-actions { display: flex; flex-wrap: wrap; gap: 0.75rem; align-items: center; margin-top: 1.25rem; }
        .reason-form { margin-top: 1rem; display: grid; gap: 0.75rem; }
        .term-list { list-style: none; padding: 0; margin: 0; display: flex; flex-direction: column; gap: 0.5rem; }
        .term-list button { background: transparent; color: #1d4ed8; padding: 0; }
        .term-list .level-tag { color: #64748b; font-size: 0.85rem; margin-left: 0.5rem; }
        details summary { cursor: pointer; font-weight: 600; }
        .raw-response { margin-top: 1.25rem; }
        .raw-response pre { background: #f1f5f9; padding: 1rem; border-radius: 8px; overflow-x: auto; font-size: 0.85rem; }
        @media (max-width: 768px) {
            .search-form { grid-template-columns: 1fr; }
        }
"#;

#[derive(Deserialize)]
pub struct SearchForm {
    #[serde(default)]
    pub term: String,
    #[serde(default)]
    pub level: Option<String>,
}

#[derive(Deserialize)]
pub struct LanguageForm {
    pub language: String,
}

#[derive(Deserialize)]
pub struct ReasonForm {
    #[serde(default)]
    pub reason: String,
}

/// Cookie state and view for one home-page request.
struct HomeRequest {
    jar: CookieJar,
    client: ClientState,
    view_id: Uuid,
    view: HomeView,
}

impl HomeRequest {
    async fn open(state: &AppState, jar: CookieJar) -> Self {
        let client = ClientState::load(&jar);
        let (jar, view_id) = ensure_view_id(jar, state.secure_cookies());
        let view = state.views().load(view_id).await;
        Self {
            jar,
            client,
            view_id,
            view,
        }
    }

    async fn finish(self, state: &AppState) -> (CookieJar, Redirect) {
        let jar = self.client.persist(self.jar, state.secure_cookies());
        state.views().store(self.view_id, self.view).await;
        (jar, Redirect::to("/home"))
    }

    /// The backend rejected the token: drop it along with the view built on it.
    async fn expire(self, state: &AppState) -> (CookieJar, Redirect) {
        state.views().discard(self.view_id).await;
        let jar = clear_token(self.client.persist(self.jar, state.secure_cookies()));
        (jar, Redirect::to("/login?error=session_expired"))
    }
}

pub async fn root() -> Redirect {
    Redirect::to("/home")
}

/// Render the home page. A guest without a stored view sees the empty page and
/// nothing is recorded until a form is submitted.
pub async fn home_page(
    State(state): State<AppState>,
    jar: CookieJar,
) -> (CookieJar, Html<String>) {
    let client = ClientState::load(&jar);
    let stored = match current_view_id(&jar) {
        Some(id) => state.views().get(id).await.map(|view| (id, view)),
        None => None,
    };

    let (jar, view_id, mut view) = match stored {
        Some((id, view)) => (jar, id, view),
        None if client.session().is_authenticated() => {
            let (jar, id) = ensure_view_id(jar, state.secure_cookies());
            (jar, id, HomeView::default())
        }
        None => {
            let html = render_home(&client, &HomeView::default(), None);
            let jar = client.persist(jar, state.secure_cookies());
            return (jar, Html(html));
        }
    };

    if client.session().is_authenticated() && !view.synced {
        search::hydrate(state.backend(), &client, &mut view).await;
    }

    let notice = view.take_notice();
    let html = render_home(&client, &view, notice.as_ref());

    let jar = client.persist(jar, state.secure_cookies());
    state.views().store(view_id, view).await;
    (jar, Html(html))
}

pub async fn search(
    State(state): State<AppState>,
    jar: CookieJar,
    Form(form): Form<SearchForm>,
) -> (CookieJar, Redirect) {
    let mut request = HomeRequest::open(&state, jar).await;
    let level = form
        .level
        .as_deref()
        .and_then(Level::parse)
        .unwrap_or_default();

    let outcome = search::run_search(
        state.backend(),
        &mut request.client,
        &mut request.view,
        &form.term,
        level,
    )
    .await;

    match outcome {
        SearchOutcome::SessionExpired => request.expire(&state).await,
        _ => request.finish(&state).await,
    }
}

pub async fn set_language(
    State(state): State<AppState>,
    jar: CookieJar,
    Form(form): Form<LanguageForm>,
) -> (CookieJar, Redirect) {
    let mut request = HomeRequest::open(&state, jar).await;
    if let Some(language) = Language::parse(&form.language) {
        request.client.set_language(language);
    }
    request.finish(&state).await
}

pub async fn positive_feedback(
    State(state): State<AppState>,
    jar: CookieJar,
) -> (CookieJar, Redirect) {
    let mut request = HomeRequest::open(&state, jar).await;
    let outcome =
        feedback::submit_positive(state.backend(), &request.client, &mut request.view).await;
    finish_feedback(request, &state, outcome).await
}

pub async fn open_negative_feedback(
    State(state): State<AppState>,
    jar: CookieJar,
) -> (CookieJar, Redirect) {
    let mut request = HomeRequest::open(&state, jar).await;
    feedback::open_reason_prompt(&mut request.view);
    request.finish(&state).await
}

pub async fn cancel_negative_feedback(
    State(state): State<AppState>,
    jar: CookieJar,
) -> (CookieJar, Redirect) {
    let mut request = HomeRequest::open(&state, jar).await;
    feedback::cancel_reason_prompt(&mut request.view);
    request.finish(&state).await
}

pub async fn negative_feedback(
    State(state): State<AppState>,
    jar: CookieJar,
    Form(form): Form<ReasonForm>,
) -> (CookieJar, Redirect) {
    let mut request = HomeRequest::open(&state, jar).await;
    let outcome = feedback::submit_negative(
        state.backend(),
        &request.client,
        &mut request.view,
        &form.reason,
    )
    .await;
    finish_feedback(request, &state, outcome).await
}

async fn finish_feedback(
    request: HomeRequest,
    state: &AppState,
    outcome: FeedbackOutcome,
) -> (CookieJar, Redirect) {
    match outcome {
        FeedbackOutcome::SessionExpired => request.expire(state).await,
        _ => request.finish(state).await,
    }
}

pub async fn toggle_save(State(state): State<AppState>, jar: CookieJar) -> (CookieJar, Redirect) {
    let mut request = HomeRequest::open(&state, jar).await;
    let outcome = saved::toggle_save(state.backend(), &request.client, &mut request.view).await;

    match outcome {
        SaveOutcome::SessionExpired => request.expire(&state).await,
        _ => request.finish(&state).await,
    }
}

fn render_home(client: &ClientState, view: &HomeView, notice: Option<&Notice>) -> String {
    let session = client.session();
    let signed_in = session.is_authenticated();

    let notice_html = notice.map(render_notice).unwrap_or_default();
    let guest_banner = if signed_in {
        String::new()
    } else {
        render_guest_banner(client.quota().is_consumed())
    };

    let search_panel = render_search_panel(client.language(), view);
    let result_panel = view
        .result
        .as_ref()
        .map(|result| render_result(result, view, signed_in))
        .unwrap_or_default();

    let account_panels = if signed_in {
        format!(
            "{history}{saved}",
            history = render_history(view),
            saved = render_saved(view)
        )
    } else {
        String::new()
    };

    let body = format!(
        r#"        {notice_html}
        {guest_banner}
        {search_panel}
        {result_panel}
        {account_panels}"#
    );

    render_page(PageLayout {
        meta_title: "Home",
        session,
        body_html: body.into(),
        extra_styles: Some(HOME_STYLES),
    })
}

fn render_guest_banner(quota_used: bool) -> String {
    let message = if quota_used {
        "You have used your free guest search."
    } else {
        "Guests get one free search."
    };
    format!(
        r#"<div class="guest-banner">{message} <a href="/login">Log in</a> or <a href="/signup">sign up</a> for unlimited searches, history and saved explanations.</div>"#
    )
}

fn render_search_panel(language: Language, view: &HomeView) -> String {
    let language_options: String = Language::ALL
        .iter()
        .map(|option| {
            format!(
                r#"<option value="{value}"{selected}>{label}</option>"#,
                value = option.as_str(),
                label = option.label(),
                selected = if *option == language { " selected" } else { "" },
            )
        })
        .collect();

    format!(
        r#"<section class="panel">
            <form class="language-form" method="post" action="/home/language">
                <div style="flex:1;">
                    <label for="language">Language</label>
                    <select id="language" name="language">{language_options}</select>
                </div>
                <button type="submit" class="secondary">Apply</button>
            </form>
            <form class="search-form" method="post" action="/home/search">
                <div>
                    <label for="term">Scientific term</label>
                    <input id="term" name="term" value="{query}" placeholder="e.g. photosynthesis" autocomplete="off">
                </div>
                <div>
                    <label for="level">Explain for</label>
                    <select id="level" name="level">{level_options}</select>
                </div>
                <button type="submit">Explain</button>
            </form>
        </section>"#,
        query = escape_html(&view.query),
        level_options = level_options(view.level),
    )
}

fn level_options(current: Level) -> String {
    Level::ALL
        .iter()
        .map(|level| {
            format!(
                r#"<option value="{value}"{selected}>{label}</option>"#,
                value = level.as_str(),
                label = level.label(),
                selected = if *level == current { " selected" } else { "" },
            )
        })
        .collect()
}

/// A one-button form that searches `term` again at `level`.
fn search_button(term: &str, level: Level) -> String {
    format!(
        r#"<form class="inline-form" method="post" action="/home/search"><input type="hidden" name="term" value="{term}"><input type="hidden" name="level" value="{level}"><button type="submit">{label}</button></form>"#,
        term = escape_html(term),
        level = level.as_str(),
        label = escape_html(term),
    )
}

fn render_result(result: &SearchResult, view: &HomeView, signed_in: bool) -> String {
    let explanation = escape_html(&result.explanation).replace('\n', "<br>");

    let related = if result.related_terms.is_empty() {
        String::new()
    } else {
        let buttons: String = result
            .related_terms
            .iter()
            .map(|term| search_button(term, result.level))
            .collect();
        format!(r#"<h3>Related terms</h3><div class="related">{buttons}</div>"#)
    };

    let save_label = if signed_in && view.is_saved() {
        "Remove from saved"
    } else {
        "Save explanation"
    };

    format!(
        r#"<section class="panel">
            <h2>{term}</h2>
            <p class="result-meta">Explained for: {level}</p>
            <div class="explanation">{explanation}</div>
            {related}
            <div class="result-actions">
                <form class="inline-form" method="post" action="/home/save"><button type="submit">{save_label}</button></form>
                {feedback}
            </div>
            {reason_form}
            {raw}
        </section>"#,
        term = escape_html(&result.term),
        level = result.level.label(),
        feedback = render_feedback_controls(view),
        reason_form = render_reason_form(view),
        raw = render_raw_response(&result.raw),
    )
}

fn render_raw_response(raw: &serde_json::Value) -> String {
    if raw.is_null() {
        return String::new();
    }
    let pretty = serde_json::to_string_pretty(raw).unwrap_or_default();
    format!(
        r#"<details class="raw-response"><summary>Response details</summary><pre>{}</pre></details>"#,
        escape_html(&pretty)
    )
}

fn render_feedback_controls(view: &HomeView) -> String {
    if view.feedback.is_submitted() {
        return r#"<span class="note">Thanks for your feedback!</span>"#.to_string();
    }

    let thumbs_down = if view.feedback.is_prompt_open() {
        r#"<button type="button" class="secondary" disabled>👎 Not helpful</button>"#.to_string()
    } else {
        r#"<form class="inline-form" method="post" action="/home/feedback/negative/open"><button type="submit" class="secondary">👎 Not helpful</button></form>"#.to_string()
    };

    format!(
        r#"<span class="note">Was this helpful?</span>
                <form class="inline-form" method="post" action="/home/feedback/positive"><button type="submit" class="secondary">👍 Helpful</button></form>
                {thumbs_down}"#
    )
}

fn render_reason_form(view: &HomeView) -> String {
    if view.feedback.is_submitted() || !view.feedback.is_prompt_open() {
        return String::new();
    }

    r#"<form class="reason-form" method="post" action="/home/feedback/negative">
                <label for="reason">What was wrong with this explanation?</label>
                <textarea id="reason" name="reason" rows="3"></textarea>
                <div class="result-actions">
                    <button type="submit">Submit feedback</button>
                    <button type="submit" class="secondary" formaction="/home/feedback/negative/cancel">Cancel</button>
                </div>
            </form>"#
        .to_string()
}

fn render_history(view: &HomeView) -> String {
    let items: String = history::recent(&view.history, RECENT_LIMIT)
        .map(|entry| {
            let level = entry.level.unwrap_or(view.level);
            let tag = entry
                .level
                .map(|level| format!(r#"<span class="level-tag">{}</span>"#, level.label()))
                .unwrap_or_default();
            let title = entry
                .explanation
                .as_deref()
                .map(|explanation| format!(r#" title="{}""#, escape_html(explanation)))
                .unwrap_or_default();
            format!("<li{title}>{}{tag}</li>", search_button(&entry.term, level))
        })
        .collect();

    let list = if items.is_empty() {
        r#"<p class="note">No searches yet.</p>"#.to_string()
    } else {
        format!(r#"<ul class="term-list">{items}</ul>"#)
    };

    format!(r#"<section class="panel"><h2>Recent searches</h2>{list}</section>"#)
}

fn render_saved(view: &HomeView) -> String {
    let items: String = view
        .saved
        .iter()
        .map(|entry| {
            let saved_at = entry
                .saved_at
                .as_deref()
                .map(format_timestamp)
                .map(|when| format!(r#"<span class="level-tag">{}</span>"#, escape_html(&when)))
                .unwrap_or_default();
            format!(
                "<li><details><summary>{term}{saved_at}</summary><p class=\"explanation\">{explanation}</p></details></li>",
                term = escape_html(&entry.term),
                explanation = escape_html(&entry.explanation).replace('\n', "<br>"),
            )
        })
        .collect();

    let list = if items.is_empty() {
        r#"<p class="note">Nothing saved yet.</p>"#.to_string()
    } else {
        format!(r#"<ul class="term-list">{items}</ul>"#)
    };

    format!(r#"<section class="panel"><h2>Saved explanations</h2>{list}</section>"#)
}

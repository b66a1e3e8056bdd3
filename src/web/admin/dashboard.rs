use axum::{
    extract::State,
    response::{Html, Redirect},
};
use axum_extra::extract::cookie::CookieJar;
use tracing::{error, warn};

use crate::{
    analytics::{DashboardSnapshot, DashboardSummary, TermCount},
    backend::{AdminUser, Backend, BackendError, FeedbackItem},
    session::Session,
    web::{
        AppState, escape_html,
        templates::{PageLayout, format_timestamp, render_page},
    },
};

use super::auth::require_admin;

const DASHBOARD_STYLES: &str = r#"
        main { max-width: 1080px; }
        .cards { display: grid; grid-template-columns: repeat(auto-fit, minmax(200px, 1fr)); gap: 1rem; }
        .card { background: #ffffff; border: 1px solid #e2e8f0; border-radius: 12px; padding: 1.25rem; box-shadow: 0 12px 30px rgba(15, 23, 42, 0.06); }
        .card .card-label { color: #64748b; font-size: 0.9rem; }
        .card .card-value { font-size: 2rem; font-weight: 700; color: #1d4ed8; margin-top: 0.35rem; }
        .bar-row { display: grid; grid-template-columns: 180px 1fr 48px; gap: 0.75rem; align-items: center; margin-bottom: 0.5rem; }
        .bar-track { background: #f1f5f9; border-radius: 999px; height: 0.85rem; overflow: hidden; }
        .bar-fill { background: #2563eb; height: 100%; }
        .bar-count { text-align: right; font-weight: 600; }
        .split { display: grid; grid-template-columns: repeat(auto-fit, minmax(280px, 1fr)); gap: 1rem; }
        .stat-line { display: flex; justify-content: space-between; padding: 0.5rem 0; border-bottom: 1px solid #f1f5f9; }
        .rating-positive { color: #166534; font-weight: 600; }
        .rating-negative { color: #b91c1c; font-weight: 600; }
        details summary { cursor: pointer; color: #1d4ed8; font-weight: 600; }
        details table { margin-top: 0.75rem; font-size: 0.9rem; }
        .section-title { color: #1d4ed8; margin: 2.5rem 0 1rem; font-size: 1.4rem; font-weight: 700; border-bottom: 2px solid #e2e8f0; padding-bottom: 0.5rem; }
"#;

pub async fn dashboard(
    State(state): State<AppState>,
    jar: CookieJar,
) -> Result<Html<String>, Redirect> {
    let session = require_admin(&jar)?;
    let token = session
        .require_token()
        .map_err(|_| Redirect::to("/login"))?;

    let snapshot = match load_snapshot(state.backend(), token).await {
        Ok(snapshot) => snapshot,
        Err(err) if err.is_auth() => {
            warn!(?err, "admin session rejected");
            return Err(Redirect::to("/login?error=session_expired"));
        }
        Err(err) if err.is_forbidden() => {
            warn!(?err, "admin access denied by backend");
            return Err(Redirect::to("/login?error=not_authorized"));
        }
        Err(err) => {
            error!(?err, "failed to load admin dashboard data");
            return Ok(Html(render_load_error(&session, &err)));
        }
    };

    let summary = DashboardSummary::derive(&snapshot);
    Ok(Html(render_dashboard(&session, &snapshot, &summary)))
}

/// Fetch users and feedback together. Either failure fails the whole load.
pub async fn load_snapshot<B: Backend>(
    backend: &B,
    token: &str,
) -> Result<DashboardSnapshot, BackendError> {
    let (users, feedback) =
        tokio::try_join!(backend.admin_users(token), backend.admin_feedback(token))?;
    Ok(DashboardSnapshot { users, feedback })
}

fn render_load_error(session: &Session, err: &BackendError) -> String {
    let body = format!(
        r#"        <section class="panel">
            <h2>Admin dashboard</h2>
            <div class="flash error">Could not load dashboard data: {message}</div>
            <p class="note"><a href="/admin">Try again</a></p>
        </section>"#,
        message = escape_html(&err.user_message()),
    );

    render_page(PageLayout {
        meta_title: "Admin dashboard",
        session,
        body_html: body.into(),
        extra_styles: Some(DASHBOARD_STYLES),
    })
}

fn render_dashboard(
    session: &Session,
    snapshot: &DashboardSnapshot,
    summary: &DashboardSummary,
) -> String {
    let totals = summary.totals;
    let cards = [
        ("Total users", totals.users),
        ("Total searches", totals.searches),
        ("Total feedback", totals.feedback),
        ("Saved explanations", totals.saved_items),
    ]
    .iter()
    .map(|(label, value)| {
        format!(
            r#"<div class="card"><div class="card-label">{label}</div><div class="card-value">{value}</div></div>"#
        )
    })
    .collect::<String>();

    let top_terms = render_top_terms(&summary.top_terms);

    let distribution = summary.feedback;
    let activity = summary.activity;
    let breakdown = format!(
        r#"<div class="split">
            <div class="panel">
                <h2>Feedback</h2>
                <div class="stat-line"><span class="rating-positive">Positive</span><span>{positive} ({positive_share})</span></div>
                <div class="stat-line"><span class="rating-negative">Negative</span><span>{negative} ({negative_share})</span></div>
            </div>
            <div class="panel">
                <h2>User activity</h2>
                <div class="stat-line"><span>Users with searches</span><span>{with_searches}</span></div>
                <div class="stat-line"><span>Users without searches</span><span>{without_searches}</span></div>
                <div class="stat-line"><span>Active share</span><span>{active_share}</span></div>
            </div>
        </div>"#,
        positive = distribution.positive,
        negative = distribution.negative,
        positive_share = format_share(distribution.positive_share()),
        negative_share = format_share(distribution.negative_share()),
        with_searches = activity.with_searches,
        without_searches = activity.without_searches,
        active_share = format_share(activity.active_share()),
    );

    let users_table = render_users_table(&snapshot.users);
    let feedback_table = render_feedback_table(&snapshot.feedback);

    let body = format!(
        r#"        <section>
            <h2 class="section-title">Overview</h2>
            <div class="cards">{cards}</div>
        </section>
        <section class="panel">
            <h2>Top searched terms</h2>
            {top_terms}
        </section>
        <section>
            {breakdown}
        </section>
        <section>
            <h2 class="section-title">Users</h2>
            {users_table}
        </section>
        <section>
            <h2 class="section-title">All feedback</h2>
            {feedback_table}
        </section>"#
    );

    render_page(PageLayout {
        meta_title: "Admin dashboard",
        session,
        body_html: body.into(),
        extra_styles: Some(DASHBOARD_STYLES),
    })
}

fn render_top_terms(terms: &[TermCount]) -> String {
    let Some(max) = terms.iter().map(|entry| entry.count).max() else {
        return r#"<p class="note">No searches recorded yet.</p>"#.to_string();
    };

    terms
        .iter()
        .map(|entry| {
            let width = entry.count as f64 / max as f64 * 100.0;
            format!(
                r#"<div class="bar-row"><span>{term}</span><div class="bar-track"><div class="bar-fill" style="width: {width:.0}%;"></div></div><span class="bar-count">{count}</span></div>"#,
                term = escape_html(&entry.term),
                count = entry.count,
            )
        })
        .collect()
}

fn render_users_table(users: &[AdminUser]) -> String {
    let mut rows = String::new();

    if users.is_empty() {
        rows.push_str(r#"<tr><td colspan="6">No users yet.</td></tr>"#);
    }

    for user in users {
        let history = if user.search_history.is_empty() {
            "None".to_string()
        } else {
            user.search_history
                .iter()
                .map(|entry| entry.term.as_str())
                .collect::<Vec<_>>()
                .join(", ")
        };

        let feedback_cell = if user.is_admin() {
            "N/A".to_string()
        } else if user.feedback.is_empty() {
            "0".to_string()
        } else {
            format!(
                "<details><summary>{count}</summary>{table}</details>",
                count = user.feedback.len(),
                table = render_feedback_rows(&user.feedback, false),
            )
        };

        rows.push_str(&format!(
            "<tr data-user-id=\"{id}\"><td>{name}</td><td>{email}</td><td>{role}</td><td>{history}</td><td>{saved}</td><td>{feedback}</td></tr>",
            id = escape_html(&user.id),
            name = escape_html(&user.name),
            email = escape_html(&user.email),
            role = escape_html(user.role_label()),
            history = escape_html(&history),
            saved = user.saved_items.len(),
            feedback = feedback_cell,
        ));
    }

    format!(
        "<table><thead><tr><th>Name</th><th>Email</th><th>Role</th><th>Search history</th><th>Saved</th><th>Feedback</th></tr></thead><tbody>{rows}</tbody></table>"
    )
}

fn render_feedback_table(feedback: &[FeedbackItem]) -> String {
    if feedback.is_empty() {
        return r#"<p class="note">No feedback submitted yet.</p>"#.to_string();
    }
    render_feedback_rows(feedback, true)
}

fn render_feedback_rows(feedback: &[FeedbackItem], with_user: bool) -> String {
    let user_header = if with_user { "<th>User</th>" } else { "" };
    let rows: String = feedback
        .iter()
        .map(|item| {
            let user_cell = if with_user {
                format!("<td>{}</td>", escape_html(&feedback_author(item)))
            } else {
                String::new()
            };
            let rating_class = match item.rating.as_str() {
                "positive" => "rating-positive",
                "negative" => "rating-negative",
                _ => "",
            };
            let date = item
                .created_at
                .as_deref()
                .map(format_timestamp)
                .unwrap_or_default();

            format!(
                "<tr>{user_cell}<td>{term}</td><td class=\"{rating_class}\">{rating}</td><td>{reason}</td><td>{date}</td></tr>",
                term = escape_html(&item.term),
                rating = escape_html(&item.rating),
                reason = escape_html(item.reason.as_deref().unwrap_or_default()),
                date = escape_html(&date),
            )
        })
        .collect();

    format!(
        "<table><thead><tr>{user_header}<th>Term</th><th>Rating</th><th>Reason</th><th>Date</th></tr></thead><tbody>{rows}</tbody></table>"
    )
}

fn feedback_author(item: &FeedbackItem) -> String {
    if item.is_guest() {
        return "Anonymous Guest".to_string();
    }
    match (item.user_name.trim(), item.user_email.trim()) {
        ("", email) => email.to_string(),
        (name, "") => name.to_string(),
        (name, email) => format!("{name} ({email})"),
    }
}

fn format_share(share: Option<f64>) -> String {
    share
        .map(|value| format!("{:.1}%", value * 100.0))
        .unwrap_or_else(|| "N/A".to_string())
}

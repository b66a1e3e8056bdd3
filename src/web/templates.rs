use std::borrow::Cow;

use chrono::{DateTime, Datelike, NaiveDateTime, Utc};

use crate::session::Session;

pub const APP_TITLE: &str = "Scientific Terminologies Simplified";

const BASE_STYLES: &str = r#"
        :root { color-scheme: light; }
        body { font-family: "Helvetica Neue", Arial, sans-serif; margin: 0; background: #f8fafc; color: #0f172a; }
        header { background: #ffffff; padding: 1.5rem; border-bottom: 1px solid #e2e8f0; }
        .header-bar { display: flex; justify-content: space-between; align-items: center; flex-wrap: wrap; gap: 1rem; }
        .header-bar h1 { margin: 0; font-size: 1.5rem; }
        .header-bar h1 a { color: inherit; text-decoration: none; }
        nav { display: flex; gap: 0.75rem; align-items: center; flex-wrap: wrap; }
        .nav-link { display: inline-flex; align-items: center; color: #1d4ed8; text-decoration: none; font-weight: 600; background: #e0f2fe; padding: 0.5rem 0.95rem; border-radius: 999px; border: 1px solid #bfdbfe; }
        .nav-link:hover { background: #bfdbfe; border-color: #93c5fd; }
        .nav-link.admin { color: #0f172a; background: #fee2e2; border-color: #fecaca; }
        .nav-user { color: #475569; font-size: 0.95rem; }
        .inline-form { margin: 0; display: inline; }
        main { padding: 2rem 1.5rem; max-width: 960px; margin: 0 auto; box-sizing: border-box; }
        section { margin-bottom: 2rem; }
        .panel { background: #ffffff; border-radius: 12px; border: 1px solid #e2e8f0; padding: 1.5rem; box-shadow: 0 18px 40px rgba(15, 23, 42, 0.08); }
        .panel h2 { margin-top: 0; }
        label { display: block; margin-bottom: 0.5rem; font-weight: 600; color: #0f172a; }
        input, select, textarea { width: 100%; padding: 0.75rem; border-radius: 8px; border: 1px solid #cbd5f5; background: #f8fafc; color: #0f172a; box-sizing: border-box; font-size: 1rem; }
        input:focus, select:focus, textarea:focus { outline: none; border-color: #2563eb; box-shadow: 0 0 0 3px rgba(37, 99, 235, 0.12); }
        button { padding: 0.75rem 1.2rem; border: none; border-radius: 8px; background: #2563eb; color: #ffffff; font-weight: 600; cursor: pointer; transition: background 0.15s ease; }
        button:hover { background: #1d4ed8; }
        button:disabled { opacity: 0.6; cursor: not-allowed; }
        button.secondary { background: #e2e8f0; color: #0f172a; }
        button.secondary:hover { background: #cbd5e1; }
        table { width: 100%; border-collapse: collapse; background: #ffffff; border: 1px solid #e2e8f0; border-radius: 12px; overflow: hidden; }
        th, td { padding: 0.75rem 1rem; border-bottom: 1px solid #e2e8f0; text-align: left; vertical-align: top; }
        th { background: #f1f5f9; font-weight: 600; }
        .flash { margin-bottom: 1.5rem; padding: 0.9rem 1.1rem; border-radius: 10px; font-weight: 500; }
        .flash.success { background: #dcfce7; color: #166534; border: 1px solid #bbf7d0; }
        .flash.error { background: #fee2e2; color: #b91c1c; border: 1px solid #fecaca; }
        .flash a { color: inherit; font-weight: 700; }
        .note { color: #475569; font-size: 0.95rem; line-height: 1.6; }
        .app-footer { margin-top: 3rem; text-align: center; font-size: 0.85rem; color: #94a3b8; }
        @media (max-width: 768px) {
            header { padding: 1.25rem 1rem; }
            main { padding: 1.5rem 1rem; }
            .header-bar { flex-direction: column; align-items: flex-start; }
            th, td { padding: 0.5rem; }
        }
"#;

pub struct PageLayout<'a> {
    pub meta_title: &'a str,
    pub session: &'a Session,
    pub body_html: Cow<'a, str>,
    pub extra_styles: Option<&'a str>,
}

pub fn render_page(layout: PageLayout<'_>) -> String {
    let PageLayout {
        meta_title,
        session,
        body_html,
        extra_styles,
    } = layout;

    let nav = render_nav(session);
    let footer = render_footer();

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <title>{meta_title}</title>
    <meta name="viewport" content="width=device-width, initial-scale=1">
    <style>
{BASE_STYLES}
{extra_styles}
    </style>
</head>
<body>
    <header>
        <div class="header-bar">
            <h1><a href="/home">{APP_TITLE}</a></h1>
            {nav}
        </div>
    </header>
    <main>
{body_html}
        {footer}
    </main>
</body>
</html>"#,
        meta_title = escape_html(meta_title),
        extra_styles = extra_styles.unwrap_or_default(),
    )
}

fn render_nav(session: &Session) -> String {
    if !session.is_authenticated() {
        return r#"<nav><a class="nav-link" href="/login">Log in</a><a class="nav-link" href="/signup">Sign up</a></nav>"#
            .to_string();
    }

    let greeting = session
        .display_name()
        .map(|name| format!(r#"<span class="nav-user">{}</span>"#, escape_html(name)))
        .unwrap_or_default();
    let admin_link = if session.is_admin() {
        r#"<a class="nav-link admin" href="/admin">Admin</a>"#
    } else {
        ""
    };

    format!(
        r#"<nav>{greeting}<a class="nav-link" href="/home">Home</a><a class="nav-link" href="/profile">Profile</a>{admin_link}<form class="inline-form" method="post" action="/logout"><button type="submit" class="secondary">Log out</button></form></nav>"#
    )
}

pub fn render_footer() -> String {
    let current_year = Utc::now().year();
    format!(r#"<footer class="app-footer">© {current_year} {APP_TITLE}</footer>"#)
}

/// Render a backend timestamp for display. Values that are not RFC 3339 or a
/// naive ISO datetime are shown as sent.
pub fn format_timestamp(raw: &str) -> String {
    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return parsed.with_timezone(&Utc).format("%b %-d, %Y %H:%M").to_string();
    }
    if let Ok(parsed) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
        return parsed.format("%b %-d, %Y %H:%M").to_string();
    }
    raw.to_string()
}

pub fn escape_html(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

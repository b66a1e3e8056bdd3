use crate::search::Notice;

use super::escape_html;

/// Compose a flash message HTML snippet for known status or error codes in the
/// query string.
pub fn compose_flash_message(status: Option<&str>, error: Option<&str>) -> String {
    if let Some(status) = status {
        let message = match status {
            "registered" => "Account created. Please log in.",
            "logged_out" => "You have been logged out.",
            _ => "",
        };

        if !message.is_empty() {
            return format!(r#"<div class="flash success">{message}</div>"#);
        }
    }

    if let Some(error) = error {
        let message = match error {
            "session_expired" => "Your session has expired. Please log in again.",
            "not_authorized" => "Admin access is required for that page.",
            _ => "Something went wrong. Please try again.",
        };

        return format!(r#"<div class="flash error">{message}</div>"#);
    }

    String::new()
}

/// Render a one-shot notice from the home flows. Login prompts carry links to
/// both account pages.
pub fn render_notice(notice: &Notice) -> String {
    let class = if notice.is_error() { "error" } else { "success" };
    let links = if notice.prompts_login() {
        r#" <a href="/login">Log in</a> or <a href="/signup">sign up</a>."#
    } else {
        ""
    };

    format!(
        r#"<div class="flash {class}">{message}{links}</div>"#,
        message = escape_html(&notice.message()),
    )
}

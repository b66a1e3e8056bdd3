use axum::{
    extract::{Form, Query, State},
    http::StatusCode,
    response::{Html, Redirect},
};
use axum_extra::extract::cookie::CookieJar;
use serde::Deserialize;
use tracing::{error, info};

use crate::{
    backend::{Backend, BackendError, LoginRequest, SignupRequest},
    preferences::{ClientState, clear_token, store_token},
    session::Session,
};

use super::{
    AppState, escape_html,
    flash::compose_flash_message,
    templates::{PageLayout, render_page},
    views::current_view_id,
};

const AUTH_STYLES: &str = r#"
        .auth-panel { max-width: 440px; margin: 0 auto; }
        .auth-panel .field { margin-top: 1rem; }
        .auth-panel button { margin-top: 1.75rem; width: 100%; }
        .auth-panel .switch { margin-top: 1.25rem; text-align: center; }
"#;

#[derive(Default, Deserialize)]
pub struct AuthQuery {
    pub status: Option<String>,
    pub error: Option<String>,
}

#[derive(Deserialize)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

#[derive(Deserialize)]
pub struct SignupForm {
    pub name: String,
    pub email: String,
    pub password: String,
}

pub async fn login_page(jar: CookieJar, Query(params): Query<AuthQuery>) -> Html<String> {
    let client = ClientState::load(&jar);
    let flash = compose_flash_message(params.status.as_deref(), params.error.as_deref());
    Html(render_login_page(client.session(), &flash, ""))
}

pub async fn process_login(
    State(state): State<AppState>,
    jar: CookieJar,
    Form(form): Form<LoginForm>,
) -> Result<(CookieJar, Redirect), (StatusCode, Html<String>)> {
    let email = form.email.trim();
    let request = LoginRequest {
        email,
        password: &form.password,
    };

    let token = match state.backend().login(&request).await {
        Ok(response) => response.access_token,
        Err(err) => {
            log_rejection(&err, "login");
            let flash = error_flash(&err);
            return Err((
                err.response_status(),
                Html(render_login_page(&Session::guest(), &flash, email)),
            ));
        }
    };

    // The view belongs to whoever used this browser before.
    if let Some(view_id) = current_view_id(&jar) {
        state.views().discard(view_id).await;
    }

    let session = Session::from_token(token.clone());
    let target = if session.is_admin() { "/admin" } else { "/home" };
    info!(admin = session.is_admin(), "user logged in");

    let jar = store_token(jar, token, state.secure_cookies());
    Ok((jar, Redirect::to(target)))
}

pub async fn signup_page(jar: CookieJar) -> Html<String> {
    let client = ClientState::load(&jar);
    Html(render_signup_page(client.session(), "", "", ""))
}

pub async fn process_signup(
    State(state): State<AppState>,
    jar: CookieJar,
    Form(form): Form<SignupForm>,
) -> Result<Redirect, (StatusCode, Html<String>)> {
    let name = form.name.trim();
    let email = form.email.trim();
    let request = SignupRequest {
        name,
        email,
        password: &form.password,
    };

    match state.backend().signup(&request).await {
        Ok(()) => Ok(Redirect::to("/login?status=registered")),
        Err(err) => {
            log_rejection(&err, "signup");
            let client = ClientState::load(&jar);
            Err((
                err.response_status(),
                Html(render_signup_page(
                    client.session(),
                    &error_flash(&err),
                    name,
                    email,
                )),
            ))
        }
    }
}

/// Drop the token only. The guest flag and language stay with the browser.
pub async fn logout(State(state): State<AppState>, jar: CookieJar) -> (CookieJar, Redirect) {
    if let Some(view_id) = current_view_id(&jar) {
        state.views().discard(view_id).await;
    }
    (clear_token(jar), Redirect::to("/login?status=logged_out"))
}

fn log_rejection(err: &BackendError, action: &str) {
    match err {
        BackendError::Transport(_) | BackendError::Decode(_) => {
            error!(?err, action, "account request failed")
        }
        _ => info!(?err, action, "account request rejected"),
    }
}

fn error_flash(err: &BackendError) -> String {
    format!(
        r#"<div class="flash error">{}</div>"#,
        escape_html(&err.user_message())
    )
}

fn render_login_page(session: &Session, flash: &str, email: &str) -> String {
    let body = format!(
        r#"        <section class="panel auth-panel">
            <h2>Log in</h2>
            {flash}
            <form method="post" action="/login">
                <div class="field">
                    <label for="email">Email</label>
                    <input id="email" type="email" name="email" value="{email}" required>
                </div>
                <div class="field">
                    <label for="password">Password</label>
                    <input id="password" type="password" name="password" required>
                </div>
                <button type="submit">Log in</button>
            </form>
            <p class="note switch">New here? <a href="/signup">Create an account</a> or <a href="/home">continue as a guest</a>.</p>
        </section>"#,
        email = escape_html(email),
    );

    render_page(PageLayout {
        meta_title: "Log in",
        session,
        body_html: body.into(),
        extra_styles: Some(AUTH_STYLES),
    })
}

fn render_signup_page(session: &Session, flash: &str, name: &str, email: &str) -> String {
    let body = format!(
        r#"        <section class="panel auth-panel">
            <h2>Sign up</h2>
            {flash}
            <form method="post" action="/signup">
                <div class="field">
                    <label for="name">Name</label>
                    <input id="name" name="name" value="{name}" required>
                </div>
                <div class="field">
                    <label for="email">Email</label>
                    <input id="email" type="email" name="email" value="{email}" required>
                </div>
                <div class="field">
                    <label for="password">Password</label>
                    <input id="password" type="password" name="password" required>
                </div>
                <button type="submit">Create account</button>
            </form>
            <p class="note switch">Already registered? <a href="/login">Log in</a>.</p>
        </section>"#,
        name = escape_html(name),
        email = escape_html(email),
    );

    render_page(PageLayout {
        meta_title: "Sign up",
        session,
        body_html: body.into(),
        extra_styles: Some(AUTH_STYLES),
    })
}

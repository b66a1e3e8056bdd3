use axum::{
    extract::State,
    response::{Html, Redirect},
};
use axum_extra::extract::cookie::CookieJar;
use tracing::warn;

use crate::{
    backend::{Backend, Profile},
    preferences::ClientState,
    session::Session,
};

use super::{
    AppState, escape_html,
    templates::{PageLayout, render_page},
};

pub async fn profile_page(
    State(state): State<AppState>,
    jar: CookieJar,
) -> Result<Html<String>, Redirect> {
    let client = ClientState::load(&jar);
    let token = client
        .session()
        .require_token()
        .map_err(|_| Redirect::to("/login"))?;

    let profile = state.backend().profile(token).await.map_err(|err| {
        warn!(?err, "failed to load profile");
        Redirect::to("/login")
    })?;

    Ok(Html(render_profile(client.session(), &profile)))
}

fn render_profile(session: &Session, profile: &Profile) -> String {
    let body = format!(
        r#"        <section class="panel">
            <h2>Your profile</h2>
            <table>
                <tbody>
                    <tr><th>Name</th><td>{name}</td></tr>
                    <tr><th>Email</th><td>{email}</td></tr>
                </tbody>
            </table>
            <p class="note"><a href="/home">Back to search</a></p>
        </section>"#,
        name = escape_html(&profile.name),
        email = escape_html(&profile.email),
    );

    render_page(PageLayout {
        meta_title: "Profile",
        session,
        body_html: body.into(),
        extra_styles: None,
    })
}

use axum::response::Redirect;
use axum_extra::extract::cookie::CookieJar;

use crate::{preferences::ClientState, session::Session};

/// Only the role claim is checked here; the backend authorizes each admin call.
pub fn require_admin(jar: &CookieJar) -> Result<Session, Redirect> {
    let client = ClientState::load(jar);
    let session = client.session();

    if !session.is_authenticated() {
        return Err(Redirect::to("/login"));
    }
    if !session.is_admin() {
        return Err(Redirect::to("/login?error=not_authorized"));
    }

    Ok(session.clone())
}

use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use cookie::time::Duration as CookieDuration;

use crate::{backend::Language, session::Session};

pub const TOKEN_COOKIE: &str = "auth_token";
pub const GUEST_QUOTA_COOKIE: &str = "guest_query_used";
pub const LANGUAGE_COOKIE: &str = "selected_language";
pub const PERSIST_DAYS: i64 = 365;

/// Whether the browser has spent its single guest search. One-way: there is
/// no operation that resets it.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct GuestQuota {
    consumed: bool,
}

impl GuestQuota {
    pub fn is_consumed(&self) -> bool {
        self.consumed
    }

    pub fn consume(&mut self) {
        self.consumed = true;
    }
}

/// Everything the browser keeps between page loads.
#[derive(Clone, Debug, Default)]
pub struct ClientState {
    session: Session,
    quota: GuestQuota,
    language: Language,
}

impl ClientState {
    pub fn new(session: Session, quota: GuestQuota, language: Language) -> Self {
        Self {
            session,
            quota,
            language,
        }
    }

    pub fn load(jar: &CookieJar) -> Self {
        let session = jar
            .get(TOKEN_COOKIE)
            .map(|cookie| Session::from_token(cookie.value()))
            .unwrap_or_default();

        let quota = GuestQuota {
            consumed: jar
                .get(GUEST_QUOTA_COOKIE)
                .is_some_and(|cookie| cookie.value() == "true"),
        };

        let language = jar
            .get(LANGUAGE_COOKIE)
            .and_then(|cookie| Language::parse(cookie.value()))
            .unwrap_or_default();

        Self::new(session, quota, language)
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn quota(&self) -> GuestQuota {
        self.quota
    }

    pub fn consume_guest_quota(&mut self) {
        self.quota.consume();
    }

    pub fn language(&self) -> Language {
        self.language
    }

    pub fn set_language(&mut self, language: Language) {
        self.language = language;
    }

    /// Write the quota flag and language back. The token is owned by login and
    /// logout and is never touched here.
    pub fn persist(&self, jar: CookieJar, secure: bool) -> CookieJar {
        let mut jar = jar.add(persistent_cookie(
            LANGUAGE_COOKIE,
            self.language.as_str().to_string(),
            secure,
        ));
        if self.quota.is_consumed() {
            jar = jar.add(persistent_cookie(
                GUEST_QUOTA_COOKIE,
                "true".to_string(),
                secure,
            ));
        }
        jar
    }
}

pub fn store_token(jar: CookieJar, token: String, secure: bool) -> CookieJar {
    jar.add(persistent_cookie(TOKEN_COOKIE, token, secure))
}

pub fn clear_token(jar: CookieJar) -> CookieJar {
    let mut removal = Cookie::new(TOKEN_COOKIE, "");
    removal.set_path("/");
    removal.set_http_only(true);
    removal.set_same_site(SameSite::Lax);
    removal.set_max_age(CookieDuration::seconds(0));
    jar.remove(removal)
}

fn persistent_cookie(name: &'static str, value: String, secure: bool) -> Cookie<'static> {
    let mut cookie = Cookie::new(name, value);
    cookie.set_path("/");
    cookie.set_http_only(true);
    cookie.set_same_site(SameSite::Lax);
    cookie.set_secure(secure);
    cookie.set_max_age(CookieDuration::days(PERSIST_DAYS));
    cookie
}

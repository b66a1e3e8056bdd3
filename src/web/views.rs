use std::{collections::HashMap, sync::Arc};

use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use chrono::{DateTime, Duration, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::search::HomeView;

pub const VIEW_COOKIE: &str = "view_id";

struct ViewEntry {
    view: HomeView,
    touched_at: DateTime<Utc>,
}

/// Home-page display state kept per browser between requests.
///
/// Handlers copy a view out, run a flow without holding the lock, and write it
/// back. Two overlapping requests from one browser resolve last-write-wins.
#[derive(Clone)]
pub struct ViewStore {
    entries: Arc<RwLock<HashMap<Uuid, ViewEntry>>>,
    ttl: Duration,
}

impl ViewStore {
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: Arc::new(RwLock::new(HashMap::new())),
            ttl,
        }
    }

    pub async fn get(&self, id: Uuid) -> Option<HomeView> {
        let guard = self.entries.read().await;
        guard.get(&id).map(|entry| entry.view.clone())
    }

    pub async fn load(&self, id: Uuid) -> HomeView {
        self.get(id).await.unwrap_or_default()
    }

    pub async fn store(&self, id: Uuid, view: HomeView) {
        let now = Utc::now();
        let cutoff = now - self.ttl;
        let mut guard = self.entries.write().await;
        guard.retain(|_, entry| entry.touched_at > cutoff);
        guard.insert(
            id,
            ViewEntry {
                view,
                touched_at: now,
            },
        );
    }

    pub async fn discard(&self, id: Uuid) {
        self.entries.write().await.remove(&id);
    }

    #[cfg(test)]
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }
}

pub fn current_view_id(jar: &CookieJar) -> Option<Uuid> {
    jar.get(VIEW_COOKIE)
        .and_then(|cookie| Uuid::parse_str(cookie.value()).ok())
}

/// Reuse the browser's view id or issue a new one.
pub fn ensure_view_id(jar: CookieJar, secure: bool) -> (CookieJar, Uuid) {
    if let Some(id) = current_view_id(&jar) {
        return (jar, id);
    }

    let id = Uuid::new_v4();
    let mut cookie = Cookie::new(VIEW_COOKIE, id.to_string());
    cookie.set_path("/");
    cookie.set_http_only(true);
    cookie.set_same_site(SameSite::Lax);
    cookie.set_secure(secure);
    (jar.add(cookie), id)
}

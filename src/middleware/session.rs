use std::{collections::HashMap, sync::Arc};

use chrono::{DateTime, Duration, Utc};
use tokio::sync::RwLock;
use tower_cookies::{Cookie, Cookies};

use crate::{
    config::Config,
    models::ReviewQueue,
    utils::{auth::SESSION_HOURS, create_token},
    AppState,
};

use super::CurrentUser;

pub const AUTH_COOKIE: &str = "auth_token";

#[derive(Clone)]
struct CachedQueue {
    queue: ReviewQueue,
    fetched_at: DateTime<Utc>,
}

impl CachedQueue {
    // No session cookie lives longer than this, so an older entry has no owner.
    fn is_stale(&self, now: DateTime<Utc>) -> bool {
        now - self.fetched_at >= Duration::hours(SESSION_HOURS)
    }
}

/// Server-side view state that outlives a single request, keyed by the
/// session id in the auth cookie.
#[derive(Clone, Default)]
pub struct SessionStore {
    queues: Arc<RwLock<HashMap<String, CachedQueue>>>,
}

impl SessionStore {
    pub async fn queue(&self, session_id: &str) -> Option<ReviewQueue> {
        let now = Utc::now();
        self.queues
            .read()
            .await
            .get(session_id)
            .filter(|cached| !cached.is_stale(now))
            .map(|cached| cached.queue.clone())
    }

    pub async fn put_queue(&self, session_id: &str, queue: ReviewQueue) {
        self.put_queue_at(session_id, queue, Utc::now()).await;
    }

    /// Caches `queue` as fetched at `fetched_at`, evicting every entry whose
    /// session can no longer be alive.
    async fn put_queue_at(&self, session_id: &str, queue: ReviewQueue, fetched_at: DateTime<Utc>) {
        let now = Utc::now();
        let mut queues = self.queues.write().await;

        let before = queues.len();
        queues.retain(|_, cached| !cached.is_stale(now));
        if queues.len() != before {
            log::debug!("Evicted {} stale review queues", before - queues.len());
        }

        queues.insert(session_id.to_string(), CachedQueue { queue, fetched_at });
    }

    /// Drops one request from the cached queue. Returns whether it was there.
    pub async fn remove_from_queue(&self, session_id: &str, expense_id: &str) -> bool {
        match self.queues.write().await.get_mut(session_id) {
            Some(cached) => cached.queue.remove(expense_id),
            None => false,
        }
    }

    pub async fn clear(&self, session_id: &str) {
        self.queues.write().await.remove(session_id);
    }
}

/// Persists `user` as the session.
pub fn login(cookies: &Cookies, user: &CurrentUser, secret: &str) -> Result<(), jsonwebtoken::errors::Error> {
    let token = create_token(user, secret)?;

    let cookie = Cookie::build((AUTH_COOKIE, token))
        .path("/")
        .http_only(true)
        .max_age(time::Duration::hours(SESSION_HOURS))
        .build();
    cookies.add(cookie);

    log::info!("{} logged in as {}", user.email, user.role);
    Ok(())
}

/// Clears the session cookie and whatever view state the session held.
pub async fn logout(cookies: &Cookies, state: &AppState, user: Option<&CurrentUser>) {
    cookies.remove(Cookie::build((AUTH_COOKIE, "")).path("/").build());

    if let Some(user) = user {
        state.sessions.clear(&user.session_id).await;
        log::info!("{} logged out", user.email);
    }
}

/// Bearer sent to the backend on behalf of `user`.
pub fn bearer_for<'a>(config: &'a Config, user: &'a CurrentUser) -> &'a str {
    config.static_api_token.as_deref().unwrap_or(&user.token)
}

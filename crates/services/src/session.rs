use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};

use chrono::Utc;
use dashmap::DashMap;
use tracing::debug;

use crate::auth::AuthError;

/// Sign-in state changes, published to every registered listener.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthEvent {
    SignedIn { session_id: String, email: String },
    SignedOut { session_id: String },
}

type Listener = Arc<dyn Fn(&AuthEvent) + Send + Sync>;
type Listeners = DashMap<u64, Listener>;

/// Tracks signed-out sessions and fans auth events out to listeners.
///
/// Tokens are stateless, so a session is active until it expires or is
/// signed out here. Revocations are dropped once the session would have
/// expired anyway.
pub struct SessionStore {
    revoked: DashMap<String, i64>,
    listeners: Arc<Listeners>,
    next_listener_id: AtomicU64,
}

/// Handle for a registered listener. Dropping it detaches the listener.
#[must_use = "dropping a Subscription immediately unsubscribes the listener"]
pub struct Subscription {
    id: u64,
    listeners: Weak<Listeners>,
}

impl Subscription {
    pub fn unsubscribe(self) {}
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(listeners) = self.listeners.upgrade() {
            listeners.remove(&self.id);
            debug!(listener = self.id, "Auth listener detached");
        }
    }
}

impl SessionStore {
    pub fn new() -> Self {
        Self {
            revoked: DashMap::new(),
            listeners: Arc::new(DashMap::new()),
            next_listener_id: AtomicU64::new(1),
        }
    }

    pub fn subscribe<F>(&self, listener: F) -> Subscription
    where
        F: Fn(&AuthEvent) + Send + Sync + 'static,
    {
        let id = self.next_listener_id.fetch_add(1, Ordering::Relaxed);
        self.listeners.insert(id, Arc::new(listener));
        Subscription {
            id,
            listeners: Arc::downgrade(&self.listeners),
        }
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    pub fn signed_in(&self, session_id: &str, email: &str) {
        self.publish(&AuthEvent::SignedIn {
            session_id: session_id.to_string(),
            email: email.to_string(),
        });
    }

    /// Revokes the session until `expires_at` (unix seconds).
    pub fn sign_out(&self, session_id: &str, expires_at: i64) {
        let now = Utc::now().timestamp();
        self.revoked.retain(|_, exp| *exp > now);
        self.revoked.insert(session_id.to_string(), expires_at);

        self.publish(&AuthEvent::SignedOut {
            session_id: session_id.to_string(),
        });
    }

    pub fn is_revoked(&self, session_id: &str) -> bool {
        self.revoked
            .get(session_id)
            .is_some_and(|exp| *exp > Utc::now().timestamp())
    }

    pub fn ensure_active(&self, session_id: &str) -> Result<(), AuthError> {
        if self.is_revoked(session_id) {
            return Err(AuthError::SessionRevoked);
        }
        Ok(())
    }

    fn publish(&self, event: &AuthEvent) {
        // Snapshot first so a listener may subscribe or unsubscribe while being called.
        let listeners: Vec<Listener> = self
            .listeners
            .iter()
            .map(|entry| Arc::clone(entry.value()))
            .collect();

        for listener in listeners {
            listener(event);
        }
    }
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new()
    }
}

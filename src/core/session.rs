// Authenticated session context

use crate::api::backend::Backend;
use crate::core::error::ClientError;
use crate::models::profile::Identity;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use tracing::warn;

type ExpiryHook = Box<dyn FnOnce() + Send + Sync>;

/// Created on successful authentication and handed to every component.
///
/// Holds the only path to the backend. Once a `SessionExpired` response has
/// been observed the session stays expired and every later call fails fast
/// without touching the network, and the expiry hooks have torn down
/// everything cached for the user.
pub struct Session {
    identity: Identity,
    backend: Arc<dyn Backend>,
    expired: AtomicBool,
    on_expire: Mutex<Vec<ExpiryHook>>,
}

impl Session {
    pub fn new(identity: Identity, backend: Arc<dyn Backend>) -> Self {
        Self {
            identity,
            backend,
            expired: AtomicBool::new(false),
            on_expire: Mutex::new(Vec::new()),
        }
    }

    /// Run `hook` once when the session expires, or right away if it
    /// already has
    pub fn on_expire(&self, hook: impl FnOnce() + Send + Sync + 'static) {
        {
            let mut hooks = self.on_expire.lock().unwrap_or_else(PoisonError::into_inner);
            if !self.is_expired() {
                hooks.push(Box::new(hook));
                return;
            }
        }
        hook();
    }

    pub fn identity(&self) -> &Identity {
        &self.identity
    }

    /// The authenticated backend, unless the session has expired
    pub fn backend(&self) -> Result<&dyn Backend, ClientError> {
        if self.is_expired() {
            return Err(ClientError::SessionExpired);
        }
        Ok(self.backend.as_ref())
    }

    pub fn is_expired(&self) -> bool {
        self.expired.load(Ordering::Acquire)
    }

    pub fn expire(&self) {
        let hooks = {
            let mut hooks = self.on_expire.lock().unwrap_or_else(PoisonError::into_inner);
            if self.expired.swap(true, Ordering::AcqRel) {
                return;
            }
            std::mem::take(&mut *hooks)
        };

        warn!(user_id = self.identity.user_id, "Session expired, re-authentication required");
        for hook in hooks {
            hook();
        }
    }

    /// Pass a remote result through, expiring the session on `SessionExpired`
    pub fn track<T>(&self, result: Result<T, ClientError>) -> Result<T, ClientError> {
        if let Err(err) = &result {
            if err.is_session_expired() {
                self.expire();
            }
        }
        result
    }
}

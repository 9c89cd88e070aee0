//! Store for live checkout sessions.
//!
//! Configuration data is read-only after assembly; the only mutable state is
//! the selection state owned by the session, and every mutation runs while
//! holding that session's map entry. Callers must not hold an entry across an
//! await point — the payment handoff in particular happens outside the lock
//! so the session stays closable while awaiting the gateway.

use std::sync::Arc;

use dashmap::DashMap;
use uuid::Uuid;

use crate::checkout::session::CheckoutSession;
use crate::models::Service;

#[derive(Default)]
pub struct CheckoutManager {
    sessions: DashMap<Uuid, CheckoutSession>,
}

impl CheckoutManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Opens a session for a service. Any prior session named in `replaces`
    /// is discarded wholesale first — state never merges across services.
    pub fn open(&self, service: Arc<Service>, replaces: Option<Uuid>) -> CheckoutSession {
        if let Some(previous) = replaces {
            self.sessions.remove(&previous);
        }
        let session = CheckoutSession::open(service);
        self.sessions.insert(session.id, session.clone());
        session
    }

    /// Closes a session from any state. An in-flight gateway call is not
    /// cancelled; its resolution simply finds no session to apply to.
    pub fn close(&self, id: Uuid) -> bool {
        self.sessions.remove(&id).is_some()
    }

    /// Runs a synchronous mutation against one session. The update and any
    /// derived-total read inside `f` happen in a single logical turn.
    pub fn with_session<R>(
        &self,
        id: Uuid,
        f: impl FnOnce(&mut CheckoutSession) -> R,
    ) -> Option<R> {
        self.sessions.get_mut(&id).map(|mut entry| f(&mut entry))
    }

    pub fn snapshot(&self, id: Uuid) -> Option<CheckoutSession> {
        self.sessions.get(&id).map(|entry| entry.value().clone())
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}

//! Application state shared across handlers.

use std::sync::Arc;

use crate::services::MessageHub;
use crate::store::{AuditSink, Store};

/// Application state shared across all handlers.
///
/// Cheap to clone; everything lives behind one `Arc`.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    store: Arc<dyn Store>,
    audit: Arc<dyn AuditSink>,
    hub: MessageHub,
}

impl AppState {
    /// Build state around one backend that serves both primary storage and
    /// the audit trail.
    #[must_use]
    pub fn new<S>(store: S) -> Self
    where
        S: Store + AuditSink + 'static,
    {
        let store = Arc::new(store);
        Self::with_audit_sink(store.clone(), store)
    }

    /// Build state with a separate audit sink.
    #[must_use]
    pub fn with_audit_sink(store: Arc<dyn Store>, audit: Arc<dyn AuditSink>) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                store,
                audit,
                hub: MessageHub::default(),
            }),
        }
    }

    #[must_use]
    pub fn store(&self) -> &dyn Store {
        self.inner.store.as_ref()
    }

    #[must_use]
    pub fn audit(&self) -> &dyn AuditSink {
        self.inner.audit.as_ref()
    }

    /// Live message fan-out.
    #[must_use]
    pub fn hub(&self) -> &MessageHub {
        &self.inner.hub
    }
}

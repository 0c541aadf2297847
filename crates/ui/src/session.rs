//! Chat session wiring.
//!
//! A [`ChatSession`] subscribes a [`Reconciler`] to the connection manager's
//! bus and forwards each observable change over a channel so the rendering
//! surface can redraw incrementally.

use crate::reconciler::{Reconciler, SubmitOutcome, TranscriptChange};
use crate::transcript::TranscriptEntry;
use behave_core::EventKind;
use behave_core::logging::{PrivacyConfig, redact_content};
use behave_transport::{ConnectionManager, Subscription, TransportError};
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::sync::mpsc;

/// Session setup
#[derive(Debug, Clone, Default)]
pub struct SessionOptions {
    /// Assistant greeting shown before the first turn; blank for none
    pub welcome: String,
    pub privacy: PrivacyConfig,
}

impl SessionOptions {
    pub fn with_welcome(mut self, welcome: impl Into<String>) -> Self {
        self.welcome = welcome.into();
        self
    }

    pub fn with_privacy(mut self, privacy: PrivacyConfig) -> Self {
        self.privacy = privacy;
        self
    }
}

pub struct ChatSession {
    manager: Arc<ConnectionManager>,
    reconciler: Arc<Mutex<Reconciler>>,
    changes: mpsc::UnboundedReceiver<TranscriptChange>,
    subscriptions: Vec<Subscription>,
    privacy: PrivacyConfig,
}

impl ChatSession {
    /// Subscribe to every inbound event kind and open the connection.
    ///
    /// A failed connect is logged by the manager and otherwise ignored; the
    /// next `submit` retries it.
    pub async fn open(manager: Arc<ConnectionManager>, options: SessionOptions) -> Self {
        let reconciler = Arc::new(Mutex::new(Reconciler::with_welcome(options.welcome)));
        let (tx, changes) = mpsc::unbounded_channel();

        let subscriptions = EventKind::VALUES
            .iter()
            .map(|kind| {
                let reconciler = Arc::clone(&reconciler);
                let tx = tx.clone();
                manager.subscribe(*kind, move |event| {
                    let change = lock(&reconciler).apply(event);
                    if let Some(change) = change {
                        let _ = tx.send(change);
                    }
                })
            })
            .collect();

        if let Ok(id) = manager.connect().await {
            tracing::debug!(connection = %id, "Chat session ready");
        }

        Self { manager, reconciler, changes, subscriptions, privacy: options.privacy }
    }

    /// Record `text` as a user message and send it.
    ///
    /// Fire-and-forget: a failed send is logged and the turn stays open until
    /// the backend's `end`.
    pub async fn submit(&self, text: &str) -> SubmitOutcome {
        let outcome = lock(&self.reconciler).submit(text);
        if !outcome.is_accepted() {
            tracing::debug!(?outcome, "Submission not sent");
            return outcome;
        }

        tracing::debug!(content = %redact_content(text, &self.privacy), "Sending message");
        if let Err(e) = self.manager.send(text).await {
            tracing::error!(error = %e, "Message not sent");
        }
        outcome
    }

    /// Wait for the next change applied by an inbound event
    pub async fn next_change(&mut self) -> Option<TranscriptChange> {
        self.changes.recv().await
    }

    /// Non-blocking variant of [`next_change`](Self::next_change)
    pub fn try_next_change(&mut self) -> Option<TranscriptChange> {
        self.changes.try_recv().ok()
    }

    pub fn snapshot(&self) -> Vec<TranscriptEntry> {
        lock(&self.reconciler).entries().to_vec()
    }

    pub fn entry(&self, index: usize) -> Option<TranscriptEntry> {
        lock(&self.reconciler).transcript().get(index).cloned()
    }

    pub fn is_processing(&self) -> bool {
        lock(&self.reconciler).is_processing()
    }

    /// Unsubscribe every handler and release the connection
    pub async fn close(self) -> Result<bool, TransportError> {
        let Self { manager, subscriptions, .. } = self;
        for subscription in subscriptions {
            subscription.unsubscribe();
        }
        manager.disconnect().await
    }
}

impl std::fmt::Debug for ChatSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChatSession")
            .field("manager", &self.manager)
            .field("subscriptions", &self.subscriptions.len())
            .finish_non_exhaustive()
    }
}

fn lock(reconciler: &Mutex<Reconciler>) -> MutexGuard<'_, Reconciler> {
    reconciler.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

//! Synchronous event handler dispatch
//!
//! Handlers answer events in-process, within the requesting worker's call
//! stack. They may block on external input (a console prompt, an HTTP call
//! made on a blocking client) and must send exactly one feedback through the
//! [`FeedbackSender`] they are given.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use super::{Event, Feedback};

/// Errors from synchronous interaction dispatch
#[derive(Debug, thiserror::Error)]
pub enum InteractionError {
    /// No handler registered for the event type
    #[error("no handler registered for event type: {0}")]
    NoHandler(String),

    /// Handler returned without sending feedback
    #[error("handler for event type {0} returned without sending feedback")]
    NoFeedback(String),
}

/// Callback invoked to answer an event in-process
pub type EventHandler = Arc<dyn Fn(&Event, FeedbackSender) + Send + Sync>;

/// One-shot feedback channel handed to an event handler
///
/// The first `send` wins; later sends are ignored.
#[derive(Clone)]
pub struct FeedbackSender {
    slot: Arc<Mutex<Option<Feedback>>>,
}

impl FeedbackSender {
    fn new() -> Self {
        Self {
            slot: Arc::new(Mutex::new(None)),
        }
    }

    /// Send the feedback answering the event
    pub fn send(&self, feedback: Feedback) {
        let mut slot = self.slot.lock().unwrap_or_else(|e| e.into_inner());
        if slot.is_none() {
            *slot = Some(feedback);
        }
    }

    fn take(&self) -> Option<Feedback> {
        self.slot
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .take()
    }
}

/// Registry of synchronous event handlers
///
/// Owned by one `Automa` instance: handlers are registered before `run`,
/// consulted during execution, and dropped with the instance. The registry
/// is never mutated concurrently with an in-flight run.
#[derive(Clone, Default)]
pub struct HandlerRegistry {
    handlers: HashMap<String, EventHandler>,
}

impl HandlerRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handler for an event type, replacing any previous one
    pub fn register(&mut self, event_type: impl Into<String>, handler: EventHandler) {
        self.handlers.insert(event_type.into(), handler);
    }

    /// Check if a handler is registered for the event type
    pub fn contains(&self, event_type: &str) -> bool {
        self.handlers.contains_key(event_type)
    }

    /// Number of registered handlers
    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    /// Check if the registry is empty
    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    /// Dispatch an event to its handler and collect the feedback
    ///
    /// The handler runs on the calling task and may block. The literal
    /// feedback it sends is returned untouched.
    pub fn dispatch(&self, event: &Event) -> Result<Feedback, InteractionError> {
        let handler = self
            .handlers
            .get(&event.event_type)
            .ok_or_else(|| InteractionError::NoHandler(event.event_type.clone()))?;

        let sender = FeedbackSender::new();
        handler(event, sender.clone());

        sender
            .take()
            .ok_or_else(|| InteractionError::NoFeedback(event.event_type.clone()))
    }
}

impl std::fmt::Debug for HandlerRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HandlerRegistry")
            .field("event_types", &self.handlers.keys().collect::<Vec<_>>())
            .finish()
    }
}

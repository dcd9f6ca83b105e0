//! Events and feedback for external input requests

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A request for external input, raised by a worker
///
/// Events are the payload a worker hands to the outside world when it cannot
/// proceed without input. The `event_type` selects the handler (synchronous
/// mode) or tells the external system what is being asked (asynchronous
/// mode); `data` is an arbitrary JSON payload the engine never interprets.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Event {
    /// Event type identifier, used for handler lookup
    pub event_type: String,

    /// Event payload (JSON)
    pub data: serde_json::Value,

    /// When the event was raised
    pub raised_at: DateTime<Utc>,
}

impl Event {
    /// Create a new event
    pub fn new(event_type: impl Into<String>, data: serde_json::Value) -> Self {
        Self {
            event_type: event_type.into(),
            data,
            raised_at: Utc::now(),
        }
    }
}

/// A response to an [`Event`], produced by a synchronous handler
///
/// The engine forwards the literal feedback to the requesting worker; only
/// the worker's own logic interprets its meaning.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Feedback {
    /// Response payload (JSON)
    pub data: serde_json::Value,
}

impl Feedback {
    /// Create a new feedback value
    pub fn new(data: serde_json::Value) -> Self {
        Self { data }
    }

    /// Create feedback from a plain string
    pub fn text(data: impl Into<String>) -> Self {
        Self {
            data: serde_json::Value::String(data.into()),
        }
    }
}

/// A response correlated to exactly one pending interaction
///
/// Used on the resume path: the external system answers the interaction it
/// captured at suspension time, keyed by `interaction_id`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct InteractionFeedback {
    /// Id of the pending interaction this feedback resolves
    pub interaction_id: Uuid,

    /// Response payload (JSON)
    pub data: serde_json::Value,
}

impl InteractionFeedback {
    /// Create feedback for a specific pending interaction
    pub fn new(interaction_id: Uuid, data: serde_json::Value) -> Self {
        Self {
            interaction_id,
            data,
        }
    }

    /// Create feedback for a pending interaction from a plain string
    pub fn text(interaction_id: Uuid, data: impl Into<String>) -> Self {
        Self::new(interaction_id, serde_json::Value::String(data.into()))
    }
}

/// Explicit approve/reject policy for feedback payloads
///
/// The engine itself never interprets feedback. Worker logic that wants the
/// conventional approval semantics can parse feedback through this closed
/// enum instead of matching string sentinels: the literal `"yes"` approves,
/// `"no"` rejects without a reason, and any other payload rejects with the
/// text as the reason.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "decision", rename_all = "snake_case")]
pub enum ApprovalDecision {
    /// The request was approved
    Approved,

    /// The request was rejected, optionally with a reason
    Rejected {
        /// Free-form rejection reason
        reason: Option<String>,
    },
}

impl ApprovalDecision {
    /// Parse a feedback payload into a decision
    pub fn from_data(data: &serde_json::Value) -> Self {
        match data.as_str() {
            Some("yes") => Self::Approved,
            Some("no") | None => Self::Rejected { reason: None },
            Some(other) => Self::Rejected {
                reason: Some(other.to_string()),
            },
        }
    }

    /// Whether this decision approves the request
    pub fn is_approved(&self) -> bool {
        matches!(self, Self::Approved)
    }
}

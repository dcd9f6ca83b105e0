//! Pending interaction bookkeeping

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::Event;

/// An unresolved request for external input
///
/// Created when a worker raises an asynchronous interaction; carried in the
/// execution state (and therefore in every snapshot) until a matching
/// feedback resolves it. The `interaction_id` is the correlation key the
/// external system must echo back on resume.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct InteractionRecord {
    /// Unique id for correlating feedback
    pub interaction_id: Uuid,

    /// Name of the worker awaiting the feedback
    pub worker: String,

    /// The originating event
    pub event: Event,

    /// When the interaction was recorded
    pub created_at: DateTime<Utc>,
}

impl InteractionRecord {
    /// Record a new pending interaction for a worker
    pub fn new(worker: impl Into<String>, event: Event) -> Self {
        Self {
            interaction_id: Uuid::now_v7(),
            worker: worker.into(),
            event,
            created_at: Utc::now(),
        }
    }
}

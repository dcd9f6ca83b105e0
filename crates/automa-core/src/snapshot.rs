//! Versioned snapshots of suspended runs
//!
//! A snapshot is an opaque, immutable byte payload plus a short version
//! string. It fully reconstructs an [`ExecutionState`] — completed outputs,
//! the pending set, initial arguments and every unresolved interaction — so
//! a suspended run can resume in another process after arbitrary delay.
//! Where the bytes live (database row, object store, file) is entirely the
//! caller's concern.

use serde::{Deserialize, Serialize};

use crate::graph::WorkflowDefinition;
use crate::state::ExecutionState;

/// Version tag written into every snapshot this engine produces
pub const SERIALIZATION_VERSION: &str = "automa/1";

/// An opaque, persistable serialization of a suspended run
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Snapshot {
    /// The serialized execution state
    pub serialized_bytes: Vec<u8>,

    /// Version of the serialization contract that produced the bytes
    pub serialization_version: String,
}

/// Errors from snapshot encoding and decoding
#[derive(Debug, thiserror::Error)]
pub enum SnapshotError {
    /// The snapshot was produced by a serialization contract this engine
    /// does not recognize
    #[error("unsupported snapshot version: {found} (supported: {SERIALIZATION_VERSION})")]
    UnsupportedVersion {
        /// The version tag found on the snapshot
        found: String,
    },

    /// The payload bytes do not decode under the claimed version
    #[error("corrupt snapshot payload: {0}")]
    Corrupt(#[source] serde_json::Error),

    /// The snapshot was taken against a different workflow shape
    #[error("snapshot was taken for workflow {snapshot_workflow}, which does not match {definition_workflow}")]
    DefinitionMismatch {
        /// Workflow name recorded in the snapshot
        snapshot_workflow: String,
        /// Workflow name of the definition used to decode
        definition_workflow: String,
    },

    /// The state could not be serialized
    #[error("failed to encode execution state: {0}")]
    Encode(#[source] serde_json::Error),
}

#[derive(Serialize, Deserialize)]
struct SnapshotPayload {
    fingerprint: String,
    state: ExecutionState,
}

/// Encodes and decodes execution state against a workflow definition
///
/// The codec is stateless: it cannot tell whether a snapshot has already
/// been consumed. Resuming the same snapshot twice is permitted and risks
/// duplicate side effects; preventing it is the caller's responsibility
/// (e.g., a single source of truth marking the snapshot consumed).
pub struct SnapshotCodec;

impl SnapshotCodec {
    /// Serialize a run's full state into a versioned snapshot
    pub fn encode(
        state: &ExecutionState,
        definition: &WorkflowDefinition,
    ) -> Result<Snapshot, SnapshotError> {
        let payload = SnapshotPayload {
            fingerprint: definition.fingerprint().to_string(),
            state: state.clone(),
        };

        let serialized_bytes = serde_json::to_vec(&payload).map_err(SnapshotError::Encode)?;

        Ok(Snapshot {
            serialized_bytes,
            serialization_version: SERIALIZATION_VERSION.to_string(),
        })
    }

    /// Reconstruct the execution state a snapshot captured
    ///
    /// Fails — never best-effort decodes — when the version is unknown, the
    /// bytes are unreadable, or the definition's shape differs from the one
    /// the snapshot was taken against.
    pub fn decode(
        snapshot: &Snapshot,
        definition: &WorkflowDefinition,
    ) -> Result<ExecutionState, SnapshotError> {
        if snapshot.serialization_version != SERIALIZATION_VERSION {
            return Err(SnapshotError::UnsupportedVersion {
                found: snapshot.serialization_version.clone(),
            });
        }

        let payload: SnapshotPayload =
            serde_json::from_slice(&snapshot.serialized_bytes).map_err(SnapshotError::Corrupt)?;

        if payload.fingerprint != definition.fingerprint() {
            return Err(SnapshotError::DefinitionMismatch {
                snapshot_workflow: payload.state.workflow,
                definition_workflow: definition.name().to_string(),
            });
        }

        Ok(payload.state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{WorkerNode, WorkflowBuilder};
    use crate::interaction::{Event, InteractionRecord};
    use crate::worker::{FnWorker, Worker, WorkerOutput};
    use serde_json::json;
    use std::collections::BTreeMap;
    use std::sync::Arc;
    use uuid::Uuid;

    fn noop() -> Arc<dyn Worker> {
        FnWorker::arc(|_ctx, _args| async { Ok(WorkerOutput::value(json!(null))) })
    }

    fn definition() -> Arc<WorkflowDefinition> {
        WorkflowBuilder::new("snapshot-test")
            .add_worker(WorkerNode::new("a", noop()).entry_point())
            .add_worker(WorkerNode::new("b", noop()).with_dependencies(["a"]))
            .build()
            .unwrap()
    }

    fn suspended_state(definition: &WorkflowDefinition) -> ExecutionState {
        let mut state = ExecutionState::new(
            Uuid::now_v7(),
            definition,
            BTreeMap::from([("request_id".to_string(), json!(42))]),
        );
        state.record_output("a", json!("a-output"));
        state.push_interaction(InteractionRecord::new("b", Event::new("confirm", json!(null))));
        state.status = crate::state::RunStatus::Suspended;
        state
    }

    #[test]
    fn test_roundtrip_reconstructs_state() {
        let definition = definition();
        let state = suspended_state(&definition);

        let snapshot = SnapshotCodec::encode(&state, &definition).unwrap();
        assert_eq!(snapshot.serialization_version, SERIALIZATION_VERSION);

        let decoded = SnapshotCodec::decode(&snapshot, &definition).unwrap();
        assert_eq!(decoded, state);
    }

    #[test]
    fn test_unrecognized_version_is_rejected() {
        let definition = definition();
        let state = suspended_state(&definition);

        let mut snapshot = SnapshotCodec::encode(&state, &definition).unwrap();
        snapshot.serialization_version = "automa/99".to_string();

        let result = SnapshotCodec::decode(&snapshot, &definition);
        assert!(matches!(
            result,
            Err(SnapshotError::UnsupportedVersion { found }) if found == "automa/99"
        ));
    }

    #[test]
    fn test_corrupt_bytes_are_rejected() {
        let definition = definition();
        let snapshot = Snapshot {
            serialized_bytes: b"not json at all".to_vec(),
            serialization_version: SERIALIZATION_VERSION.to_string(),
        };

        assert!(matches!(
            SnapshotCodec::decode(&snapshot, &definition),
            Err(SnapshotError::Corrupt(_))
        ));
    }

    #[test]
    fn test_definition_mismatch_is_rejected() {
        let definition = definition();
        let state = suspended_state(&definition);
        let snapshot = SnapshotCodec::encode(&state, &definition).unwrap();

        let other = WorkflowBuilder::new("other-shape")
            .add_worker(WorkerNode::new("x", noop()).entry_point())
            .build()
            .unwrap();

        assert!(matches!(
            SnapshotCodec::decode(&snapshot, &other),
            Err(SnapshotError::DefinitionMismatch { .. })
        ));
    }

    #[test]
    fn test_snapshot_preserves_pending_interactions() {
        let definition = definition();
        let state = suspended_state(&definition);

        let snapshot = SnapshotCodec::encode(&state, &definition).unwrap();
        let decoded = SnapshotCodec::decode(&snapshot, &definition).unwrap();

        assert_eq!(decoded.interactions.len(), 1);
        assert_eq!(decoded.interactions[0].worker, "b");
        assert_eq!(
            decoded.interactions[0].interaction_id,
            state.interactions[0].interaction_id
        );
    }
}

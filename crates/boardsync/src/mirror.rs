//! The mirror state machine: one Callboard event in, at most one Slate
//! mutation out.
//!
//! Callboard announces entity creation as a `new_entity` shell followed by
//! one `attribute_change` per initial field, all flagged `in_create`. The
//! mirror buffers those into a [`PendingCreate`] persisted behind the
//! [`KvStore`] capability and flushes the buffer as a single write when the
//! first event outside the sequence arrives. States:
//!
//! ```text
//! Idle ── new_entity ──────────────▶ Accumulating
//! Accumulating ── attribute_change(in_create) ──▶ Accumulating
//! Accumulating ── anything else ──▶ flush, then route the event ──▶ Idle
//! ```
//!
//! Events can be redelivered, so a flush is an upsert: if a record with
//! the pending `source_id` already exists, it is updated instead of
//! created again.

use crate::event::{ChangeEvent, EventKind};
use crate::fieldmap;
use crate::kv::{KvError, KvStore};
use crate::tracker::Tracker;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use slate::SlateError;
use slateproto::Condition;
use thiserror::Error;

/// Key under which the mirror persists its state.
pub const STATE_KEY: &str = "boardsync.state";

/// A buffered entity creation, keyed by the `source_id` correlation field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PendingCreate {
    pub module: String,
    pub fields: Map<String, Value>,
}

/// Persisted mirror state.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum SyncState {
    #[default]
    Idle,
    Accumulating(PendingCreate),
}

/// What applying one event did.
#[derive(Debug, Clone, PartialEq)]
pub enum SyncOutcome {
    /// Nothing to mirror; the reason says why.
    Skipped(String),
    /// Buffered into the pending creation.
    Deferred,
    Created { module: String, id: Option<i64> },
    Updated { module: String, id: i64 },
    Deleted { module: String, id: i64 },
}

#[derive(Debug, Error)]
pub enum SyncError {
    #[error(transparent)]
    Tracker(#[from] SlateError),

    #[error(transparent)]
    Store(#[from] KvError),

    #[error("persisted mirror state is corrupt: {0}")]
    CorruptState(String),

    #[error("no {module} record with source id {source_id}")]
    UnmappedEntity { module: String, source_id: i64 },
}

/// Routes Callboard events into a tracker. There is no rollback: a failed
/// write surfaces to the caller, and redelivery is expected to converge
/// because creates are upserts and updates are idempotent.
pub struct Mirror<T, K> {
    tracker: T,
    store: K,
}

impl<T: Tracker, K: KvStore> Mirror<T, K> {
    pub fn new(tracker: T, store: K) -> Self {
        Self { tracker, store }
    }

    /// Apply one change event.
    #[tracing::instrument(skip(self, event), fields(entity = %event.meta.entity_type, entity_id = event.meta.entity_id))]
    pub async fn apply(&self, event: &ChangeEvent) -> Result<SyncOutcome, SyncError> {
        if event.project.is_none() {
            return Ok(SyncOutcome::Skipped(
                "event outside any project".to_string(),
            ));
        }
        if event.meta.actual_attribute_changed {
            return Ok(SyncOutcome::Skipped("no field changed".to_string()));
        }

        let state = self.load_state().await?;
        match &event.meta.kind {
            EventKind::NewEntity => {
                // An unflushed buffer means the previous creation never saw
                // a closing event; flush it before starting the next one.
                if let SyncState::Accumulating(pending) = state {
                    let flushed = self.flush(pending).await?;
                    tracing::info!(?flushed, "flushed pending creation");
                }
                let mut fields = Map::new();
                fields.insert("source_id".to_string(), event.meta.entity_id.into());
                let pending = PendingCreate {
                    module: event.meta.entity_type.to_lowercase(),
                    fields,
                };
                self.save_state(&SyncState::Accumulating(pending)).await?;
                Ok(SyncOutcome::Deferred)
            }

            EventKind::AttributeChange if event.meta.in_create => {
                // Part of an in-flight creation; fold the field in. When the
                // opening new_entity was missed, start a buffer from what we
                // know - the correlation field reconstructs the link.
                let mut pending = match state {
                    SyncState::Accumulating(pending) => pending,
                    SyncState::Idle => {
                        let mut fields = Map::new();
                        fields.insert("source_id".to_string(), event.meta.entity_id.into());
                        PendingCreate {
                            module: event.meta.entity_type.to_lowercase(),
                            fields,
                        }
                    }
                };
                if let Some(attribute) = &event.meta.attribute_name {
                    let field = fieldmap::to_slate_field(&event.meta.entity_type, attribute);
                    pending
                        .fields
                        .entry(field)
                        .or_insert_with(|| event.meta.new_value.clone());
                }
                self.save_state(&SyncState::Accumulating(pending)).await?;
                Ok(SyncOutcome::Deferred)
            }

            EventKind::AttributeChange => {
                if let SyncState::Accumulating(pending) = state {
                    let flushed = self.flush(pending).await?;
                    self.save_state(&SyncState::Idle).await?;
                    tracing::info!(?flushed, "flushed pending creation");
                }
                self.route_update(event).await
            }

            EventKind::EntityRetirement => {
                if let SyncState::Accumulating(pending) = state {
                    let flushed = self.flush(pending).await?;
                    self.save_state(&SyncState::Idle).await?;
                    tracing::info!(?flushed, "flushed pending creation");
                }
                self.route_delete(event).await
            }

            EventKind::Other(kind) => {
                Ok(SyncOutcome::Skipped(format!("unhandled event type {kind}")))
            }
        }
    }

    /// Write a buffered creation as an idempotent upsert keyed by
    /// `source_id`.
    async fn flush(&self, pending: PendingCreate) -> Result<SyncOutcome, SyncError> {
        let source_id = pending
            .fields
            .get("source_id")
            .cloned()
            .unwrap_or(Value::Null);
        let existing = self
            .tracker
            .find_one(
                &pending.module,
                vec![Condition::new("source_id", "==", source_id)],
            )
            .await?;

        match existing.and_then(|record| record.id()) {
            Some(id) => {
                tracing::debug!(module = %pending.module, id, "counterpart exists, updating");
                self.tracker
                    .update(&pending.module, id, Value::Object(pending.fields))
                    .await?;
                Ok(SyncOutcome::Created {
                    module: pending.module,
                    id: Some(id),
                })
            }
            None => {
                let created = self
                    .tracker
                    .create(&pending.module, Value::Object(pending.fields.clone()))
                    .await?;
                Ok(SyncOutcome::Created {
                    module: pending.module,
                    id: created.and_then(|record| record.id()),
                })
            }
        }
    }

    async fn route_update(&self, event: &ChangeEvent) -> Result<SyncOutcome, SyncError> {
        let module = event.meta.entity_type.to_lowercase();
        let id = self.resolve_counterpart(&module, event).await?;

        let mut data = Map::new();
        if let Some(attribute) = &event.meta.attribute_name {
            let field = fieldmap::to_slate_field(&event.meta.entity_type, attribute);
            data.insert(field, event.meta.new_value.clone());
        }
        self.tracker.update(&module, id, Value::Object(data)).await?;
        Ok(SyncOutcome::Updated { module, id })
    }

    async fn route_delete(&self, event: &ChangeEvent) -> Result<SyncOutcome, SyncError> {
        let module = event.meta.entity_type.to_lowercase();
        let id = self.resolve_counterpart(&module, event).await?;
        self.tracker.delete(&module, id).await?;
        Ok(SyncOutcome::Deleted { module, id })
    }

    /// Find the Slate id of the event's entity via the correlation field.
    async fn resolve_counterpart(
        &self,
        module: &str,
        event: &ChangeEvent,
    ) -> Result<i64, SyncError> {
        let record = self
            .tracker
            .find_one(
                module,
                vec![Condition::new("source_id", "==", event.meta.entity_id)],
            )
            .await?;
        record
            .and_then(|record| record.id())
            .ok_or_else(|| SyncError::UnmappedEntity {
                module: module.to_string(),
                source_id: event.meta.entity_id,
            })
    }

    async fn load_state(&self) -> Result<SyncState, SyncError> {
        match self.store.get(STATE_KEY).await? {
            None => Ok(SyncState::Idle),
            Some(raw) => {
                serde_json::from_str(&raw).map_err(|e| SyncError::CorruptState(e.to_string()))
            }
        }
    }

    async fn save_state(&self, state: &SyncState) -> Result<(), SyncError> {
        let raw =
            serde_json::to_string(state).map_err(|e| SyncError::CorruptState(e.to_string()))?;
        self.store.set(STATE_KEY, &raw).await?;
        Ok(())
    }
}

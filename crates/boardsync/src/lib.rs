//! boardsync - mirrors Callboard change events into Slate.
//!
//! Callboard publishes an append-only event log of entity mutations. A
//! polling sensor (outside this crate) reads that log and hands each event
//! to [`Mirror::apply`], which routes it into the tracker behind the
//! [`Tracker`] seam:
//!
//! - `new_entity` starts a buffered creation: Callboard emits the entity
//!   shell first and its initial attributes as separate events, so the
//!   mirror accumulates them and issues one `create` when the sequence
//!   completes.
//! - standalone `attribute_change` becomes an `update`, resolving the
//!   remote id through the `source_id` correlation field.
//! - `entity_retirement` becomes a `delete`, resolved the same way.
//!
//! Field names are translated between the two vocabularies by
//! [`fieldmap`]. Accumulation state survives restarts behind the
//! [`KvStore`] capability; events may therefore be delivered at least
//! once, and completed accumulations are applied as idempotent upserts
//! keyed by `source_id`.

pub mod event;
pub mod fieldmap;
pub mod kv;
pub mod mirror;
pub mod tracker;

pub use event::{ChangeEvent, EventKind, EventMeta};
pub use kv::{KvError, KvStore, MemoryStore};
pub use mirror::{Mirror, PendingCreate, SyncError, SyncOutcome, SyncState};
pub use tracker::Tracker;

//! Callboard change-event records, as dispatched by the event-log sensor.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// What happened to an entity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum EventKind {
    NewEntity,
    AttributeChange,
    EntityRetirement,
    /// Anything this mirror does not handle; kept verbatim for logs.
    Other(String),
}

impl From<String> for EventKind {
    fn from(s: String) -> Self {
        match s.as_str() {
            "new_entity" => Self::NewEntity,
            "attribute_change" => Self::AttributeChange,
            "entity_retirement" => Self::EntityRetirement,
            _ => Self::Other(s),
        }
    }
}

impl From<EventKind> for String {
    fn from(kind: EventKind) -> Self {
        match kind {
            EventKind::NewEntity => "new_entity".to_string(),
            EventKind::AttributeChange => "attribute_change".to_string(),
            EventKind::EntityRetirement => "entity_retirement".to_string(),
            EventKind::Other(s) => s,
        }
    }
}

/// The event's mutation metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventMeta {
    #[serde(rename = "type")]
    pub kind: EventKind,
    #[serde(default)]
    pub entity_type: String,
    #[serde(default)]
    pub entity_id: i64,
    #[serde(default)]
    pub attribute_name: Option<String>,
    #[serde(default)]
    pub new_value: Value,
    /// Set when the attribute did not actually change value; such events
    /// are skipped.
    #[serde(default)]
    pub actual_attribute_changed: bool,
    /// Set on attribute changes that belong to an in-flight creation.
    #[serde(default)]
    pub in_create: bool,
}

/// One entry of the Callboard event log.
///
/// Events outside any project carry no `project` and are ignored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChangeEvent {
    #[serde(default)]
    pub project: Option<Value>,
    pub meta: EventMeta,
}

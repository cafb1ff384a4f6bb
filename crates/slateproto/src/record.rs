//! Module-tagged result records.

use crate::module::Module;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One result row, tagged with the module it came from.
///
/// The service returns plain JSON objects; the client stamps each one with
/// the bound module descriptor under the `module` key so callers can tell
/// rows from different collections apart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub module: Module,
    #[serde(flatten)]
    pub values: Map<String, Value>,
}

impl Record {
    /// Tag a raw row with its module. A `module` key already present in the
    /// row wins over the tag, matching select-style normalization.
    pub fn tag(module: &Module, row: Value) -> Option<Self> {
        let mut values = match row {
            Value::Object(map) => map,
            _ => return None,
        };
        let module = match values.remove("module") {
            Some(existing) => serde_json::from_value(existing).ok()?,
            None => module.clone(),
        };
        Some(Self { module, values })
    }

    /// Field accessor; `None` when the field is absent.
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.values.get(field)
    }

    /// The record's numeric `id`, when present.
    pub fn id(&self) -> Option<i64> {
        self.get("id").and_then(Value::as_i64)
    }
}

//! Module descriptors and URL segment derivation.
//!
//! A module is a named remote entity collection (task, asset, file, ...).
//! The catalog is fetched once per session from `module/getModuleData` and
//! treated as immutable for the client's lifetime.

use serde::{Deserialize, Serialize};

/// Classification of a module, carried in the catalog's `type` field.
///
/// Entity modules share one URL segment (`entity`) regardless of their code.
/// Every other value the service reports collapses to [`ModuleKind::Fixed`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ModuleKind {
    Entity,
    #[default]
    Fixed,
}

impl From<String> for ModuleKind {
    fn from(s: String) -> Self {
        if s == "entity" {
            Self::Entity
        } else {
            Self::Fixed
        }
    }
}

impl From<ModuleKind> for String {
    fn from(kind: ModuleKind) -> Self {
        match kind {
            ModuleKind::Entity => "entity".to_string(),
            ModuleKind::Fixed => "fixed".to_string(),
        }
    }
}

/// One entry of the remote module catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Module {
    pub code: String,
    #[serde(default)]
    pub id: i64,
    #[serde(default, rename = "type")]
    pub kind: ModuleKind,
}

impl Module {
    pub fn new(code: impl Into<String>, id: i64) -> Self {
        Self {
            code: code.into(),
            id,
            kind: ModuleKind::Fixed,
        }
    }

    /// The synthetic module used for event/email dispatch. It never appears
    /// in the catalog and has no stable id.
    pub fn event() -> Self {
        Self::new("event", 0)
    }

    /// URL path segment for this module.
    ///
    /// Entity-typed modules always map to the literal segment `entity`.
    /// Otherwise snake_case codes are camel-cased: the first segment stays
    /// lowercase, later segments are capitalized (`dir_template` →
    /// `dirTemplate`).
    pub fn url_segment(&self) -> String {
        if self.kind == ModuleKind::Entity {
            return "entity".to_string();
        }
        let mut segment = String::with_capacity(self.code.len());
        for (i, part) in self.code.split('_').enumerate() {
            if i == 0 {
                segment.push_str(part);
            } else {
                let mut chars = part.chars();
                if let Some(first) = chars.next() {
                    segment.extend(first.to_uppercase());
                    segment.push_str(chars.as_str());
                }
            }
        }
        segment
    }

    /// The `{code, id}` mapping attached to outgoing payloads under the
    /// `module` key.
    pub fn payload_tag(&self) -> serde_json::Value {
        serde_json::json!({ "code": self.code, "id": self.id })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn plain_code_passes_through() {
        assert_eq!(Module::new("task", 1).url_segment(), "task");
    }

    #[test]
    fn snake_case_code_is_camel_cased() {
        assert_eq!(Module::new("dir_template", 9).url_segment(), "dirTemplate");
        assert_eq!(
            Module::new("media_server_item", 3).url_segment(),
            "mediaServerItem"
        );
    }

    #[test]
    fn entity_modules_use_fixed_segment() {
        let module = Module {
            code: "shot".to_string(),
            id: 12,
            kind: ModuleKind::Entity,
        };
        assert_eq!(module.url_segment(), "entity");
    }

    #[test]
    fn catalog_row_deserializes() {
        let module: Module =
            serde_json::from_value(serde_json::json!({"code": "shot", "id": 12, "type": "entity"}))
                .unwrap();
        assert_eq!(module.kind, ModuleKind::Entity);

        let module: Module =
            serde_json::from_value(serde_json::json!({"code": "task", "id": 4, "type": "fixed"}))
                .unwrap();
        assert_eq!(module.kind, ModuleKind::Fixed);
    }

    #[test]
    fn unknown_kind_collapses_to_fixed() {
        let module: Module =
            serde_json::from_value(serde_json::json!({"code": "note", "id": 7, "type": "custom"}))
                .unwrap();
        assert_eq!(module.kind, ModuleKind::Fixed);
    }

    #[test]
    fn payload_tag_carries_code_and_id() {
        let tag = Module::new("task", 4).payload_tag();
        assert_eq!(tag, serde_json::json!({"code": "task", "id": 4}));
    }
}

//! Logical query → wire format translation.
//!
//! Filters, field lists, and order mappings arrive in the logical form the
//! façade exposes and leave in the nested, module-keyed form the service
//! expects. All functions here are pure; the bound module comes in as a
//! plain code and the built-in field set (needed to disambiguate bare field
//! names) is supplied by the caller, which pays one `fields` round-trip per
//! query-style invocation to obtain it.

use serde_json::{Map, Value};
use slateproto::Condition;
use std::collections::BTreeSet;

/// Split a possibly dotted field reference into `(module, field)`,
/// defaulting the module segment to the bound module.
fn split_field<'a>(bound: &'a str, reference: &'a str) -> (&'a str, &'a str) {
    match reference.find('.') {
        Some(dot) => {
            let module = &reference[..dot];
            let field = reference.rsplit('.').next().unwrap_or(reference);
            (module, field)
        }
        None => (bound, reference),
    }
}

/// Translate filter conditions into `{module: {field: [wire_op, value]}}`.
///
/// Dotted fields redirect into the named module's sub-mapping; bare fields
/// land under the bound module. The first condition for a `(module, field)`
/// pair wins. Unknown operator symbols are forwarded untranslated.
pub fn filters(bound: &str, conditions: &[Condition]) -> Map<String, Value> {
    let mut out = Map::new();
    for cond in conditions {
        let (module, field) = split_field(bound, &cond.field);
        let entry = out
            .entry(module.to_string())
            .or_insert_with(|| Value::Object(Map::new()));
        if let Value::Object(by_field) = entry {
            by_field
                .entry(field.to_string())
                .or_insert_with(|| serde_json::json!([cond.op.wire_token(), cond.value]));
        }
    }
    out
}

/// Translate a field list into `{module: [field, ...]}`.
///
/// `mod.field` selects one field of a related module and `mod.*` selects
/// all of them. A bare name that is not a built-in field of the bound
/// module is the legacy spelling of `name.*` and keeps working; prefer the
/// explicit form, which also shadows any future built-in field of the same
/// name.
pub fn fields(bound: &str, names: &[String], builtin: &BTreeSet<String>) -> Map<String, Value> {
    let mut out = Map::new();
    for name in names {
        if let Some(module) = name.strip_suffix(".*") {
            out.entry(module.to_string())
                .or_insert_with(|| Value::Array(Vec::new()));
        } else if name.contains('.') {
            let (module, field) = split_field(bound, name);
            push_field(&mut out, module, field);
        } else if !builtin.contains(name) {
            // legacy bare-module shim
            out.entry(name.to_string())
                .or_insert_with(|| Value::Array(Vec::new()));
        } else {
            push_field(&mut out, bound, name);
        }
    }
    out
}

fn push_field(out: &mut Map<String, Value>, module: &str, field: &str) {
    let entry = out
        .entry(module.to_string())
        .or_insert_with(|| Value::Array(Vec::new()));
    if let Value::Array(list) = entry {
        list.push(Value::String(field.to_string()));
    }
}

/// Translate an order mapping, qualifying bare keys with the bound module:
/// `{"id": "desc"}` → `{"task.id": "desc"}`.
pub fn order(bound: &str, entries: &Map<String, Value>) -> Map<String, Value> {
    let mut out = Map::new();
    for (key, direction) in entries {
        let qualified = if key.contains('.') {
            key.clone()
        } else {
            format!("{bound}.{key}")
        };
        out.entry(qualified).or_insert_with(|| direction.clone());
    }
    out
}

/// Media-style flat filter: `{field: [wire_op, value]}` with no module
/// grouping. Dotted references keep only their final segment.
pub fn flat_filters(conditions: &[Condition]) -> Map<String, Value> {
    let mut out = Map::new();
    for cond in conditions {
        let field = cond.field.rsplit('.').next().unwrap_or(&cond.field);
        out.entry(field.to_string())
            .or_insert_with(|| serde_json::json!([cond.op.wire_token(), cond.value]));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use slateproto::Condition;

    fn builtin(names: &[&str]) -> BTreeSet<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn bare_filter_lands_under_bound_module() {
        let out = filters("task", &[Condition::new("status", "==", "open")]);
        assert_eq!(
            Value::Object(out),
            serde_json::json!({"task": {"status": ["-eq", "open"]}})
        );
    }

    #[test]
    fn dotted_filter_redirects_to_named_module() {
        let out = filters(
            "task",
            &[
                Condition::new("project.id", "=", 7),
                Condition::new("status", "in", serde_json::json!(["open", "wip"])),
            ],
        );
        assert_eq!(
            Value::Object(out),
            serde_json::json!({
                "project": {"id": ["-eq", 7]},
                "task": {"status": ["-in", ["open", "wip"]]}
            })
        );
    }

    #[test]
    fn unknown_operator_is_forwarded_unchanged() {
        let out = filters("task", &[Condition::new("status", "-matches", "op*")]);
        assert_eq!(
            Value::Object(out),
            serde_json::json!({"task": {"status": ["-matches", "op*"]}})
        );
    }

    #[test]
    fn first_condition_per_field_wins() {
        let out = filters(
            "task",
            &[
                Condition::new("id", ">", 1),
                Condition::new("id", "<", 100),
            ],
        );
        assert_eq!(
            Value::Object(out),
            serde_json::json!({"task": {"id": ["-gt", 1]}})
        );
    }

    #[test]
    fn empty_inputs_translate_to_empty_mappings() {
        assert!(filters("task", &[]).is_empty());
        assert!(fields("task", &[], &builtin(&["id"])).is_empty());
        assert!(order("task", &Map::new()).is_empty());
    }

    #[test]
    fn dotted_field_never_lands_under_bound_module() {
        let out = fields(
            "task",
            &["project.name".to_string()],
            &builtin(&["id", "name"]),
        );
        assert_eq!(Value::Object(out), serde_json::json!({"project": ["name"]}));
    }

    #[test]
    fn builtin_fields_land_under_bound_module() {
        let out = fields(
            "task",
            &["id".to_string(), "name".to_string()],
            &builtin(&["id", "name"]),
        );
        assert_eq!(Value::Object(out), serde_json::json!({"task": ["id", "name"]}));
    }

    #[test]
    fn star_suffix_requests_whole_related_module() {
        let out = fields("task", &["project.*".to_string()], &builtin(&["id"]));
        assert_eq!(Value::Object(out), serde_json::json!({"project": []}));
    }

    #[test]
    fn legacy_bare_module_shim_still_works() {
        // "project" is not a built-in field of task, so it is read as a
        // module name with an empty field list.
        let out = fields("task", &["project".to_string()], &builtin(&["id", "name"]));
        assert_eq!(Value::Object(out), serde_json::json!({"project": []}));
    }

    #[test]
    fn order_keys_are_qualified_with_bound_module() {
        let mut entries = Map::new();
        entries.insert("id".to_string(), serde_json::json!("desc"));
        entries.insert("project.name".to_string(), serde_json::json!("asc"));
        let out = order("task", &entries);
        assert_eq!(
            Value::Object(out),
            serde_json::json!({"task.id": "desc", "project.name": "asc"})
        );
    }

    #[test]
    fn flat_filters_drop_module_prefixes() {
        let out = flat_filters(&[Condition::new("media.md5_name", "==", "abc")]);
        assert_eq!(
            Value::Object(out),
            serde_json::json!({"md5_name": ["-eq", "abc"]})
        );
    }
}

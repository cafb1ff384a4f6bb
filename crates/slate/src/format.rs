//! Per-operation payload formatters.
//!
//! Each function takes the merged payload produced by argument binding and
//! rewrites it into the shape one family of endpoints expects. They are
//! deliberately pure: anything that needs the live session (module-id
//! resolution, the built-in field set) is resolved by the command layer and
//! passed in, so formatting the same logical call twice always produces the
//! same payload.

use crate::error::SlateError;
use crate::translate;
use serde_json::{Map, Value};
use slateproto::Condition;
use std::collections::BTreeSet;

fn take(payload: &mut Map<String, Value>, key: &str) -> Value {
    payload.remove(key).unwrap_or(Value::Null)
}

fn take_object(payload: &mut Map<String, Value>, key: &str) -> Result<Map<String, Value>, SlateError> {
    match take(payload, key) {
        Value::Object(map) => Ok(map),
        other => Err(SlateError::InvalidArgument(format!(
            "'{key}' must be an object, got {other}"
        ))),
    }
}

fn take_conditions(payload: &mut Map<String, Value>, key: &str) -> Result<Vec<Condition>, SlateError> {
    serde_json::from_value(take(payload, key)).map_err(|_| {
        SlateError::InvalidArgument(format!(
            "'{key}' must be a list of [field, operator, value] triples"
        ))
    })
}

/// Query-style formatting: translate `filter`, `fields`, and `order` into
/// their module-keyed wire forms. `page` and the module tag pass through.
pub(crate) fn query(
    module_code: &str,
    mut payload: Map<String, Value>,
    builtin: &BTreeSet<String>,
) -> Result<Map<String, Value>, SlateError> {
    let conditions = take_conditions(&mut payload, "filter")?;
    payload.insert(
        "filter".to_string(),
        Value::Object(translate::filters(module_code, &conditions)),
    );

    let names: Vec<String> = serde_json::from_value(take(&mut payload, "fields")).map_err(|_| {
        SlateError::InvalidArgument("'fields' must be a list of field names".to_string())
    })?;
    payload.insert(
        "fields".to_string(),
        Value::Object(translate::fields(module_code, &names, builtin)),
    );

    let entries = match take(&mut payload, "order") {
        Value::Object(map) => map,
        other => {
            return Err(SlateError::InvalidArgument(format!(
                "'order' must be an object, got {other}"
            )))
        }
    };
    payload.insert(
        "order".to_string(),
        Value::Object(translate::order(module_code, &entries)),
    );

    Ok(payload)
}

/// Create: the payload becomes the caller's `data`, tagged with the module
/// unless the data already carries one.
pub(crate) fn create_data(mut payload: Map<String, Value>) -> Result<Map<String, Value>, SlateError> {
    let module = take(&mut payload, "module");
    let mut data = take_object(&mut payload, "data")?;
    if !module.is_null() {
        data.entry("module".to_string()).or_insert(module);
    }
    Ok(data)
}

/// Update: create-style data plus the target `id`.
pub(crate) fn update_data(mut payload: Map<String, Value>) -> Result<Map<String, Value>, SlateError> {
    let id = take(&mut payload, "id");
    let mut data = create_data(payload)?;
    data.insert("id".to_string(), id);
    Ok(data)
}

/// Delete: the target id only.
pub(crate) fn id_only(mut payload: Map<String, Value>) -> Result<Map<String, Value>, SlateError> {
    let mut out = Map::new();
    out.insert("id".to_string(), take(&mut payload, "id"));
    Ok(out)
}

/// Tagging: `{link_id, tag_id, module}`.
pub(crate) fn tag_link(mut payload: Map<String, Value>) -> Result<Map<String, Value>, SlateError> {
    let mut out = Map::new();
    out.insert("link_id".to_string(), take(&mut payload, "id"));
    out.insert("tag_id".to_string(), take(&mut payload, "tag_id"));
    out.insert("module".to_string(), take(&mut payload, "module"));
    Ok(out)
}

/// Member lookup: the module id travels as `link_module_id`.
pub(crate) fn member_data(mut payload: Map<String, Value>) -> Result<Map<String, Value>, SlateError> {
    let mut out = Map::new();
    out.insert(
        "link_module_id".to_string(),
        take(&mut payload, "module_id"),
    );
    out.insert("user_id".to_string(), take(&mut payload, "user_id"));
    Ok(out)
}

/// Path templates: the caller names a module, the wire wants its id.
pub(crate) fn link_path(
    mut payload: Map<String, Value>,
    link_module_id: i64,
) -> Result<Map<String, Value>, SlateError> {
    let mut out = Map::new();
    out.insert("link_module_id".to_string(), link_module_id.into());
    out.insert("link_id".to_string(), take(&mut payload, "id"));
    out.insert("code".to_string(), take(&mut payload, "template_code"));
    Ok(out)
}

/// Media endpoints take a flat filter and no module tag; other parameters
/// (e.g. `size`) pass through.
pub(crate) fn media_filter(mut payload: Map<String, Value>) -> Result<Map<String, Value>, SlateError> {
    let conditions = take_conditions(&mut payload, "filter")?;
    payload.insert(
        "filter".to_string(),
        Value::Object(translate::flat_filters(&conditions)),
    );
    payload.remove("module");
    Ok(payload)
}

/// Media create/update: `{link_module_id, link_id, media_data, media_server}`.
pub(crate) fn save_media(
    mut payload: Map<String, Value>,
    link_module_id: i64,
) -> Result<Map<String, Value>, SlateError> {
    let mut out = Map::new();
    out.insert("link_module_id".to_string(), link_module_id.into());
    out.insert("link_id".to_string(), take(&mut payload, "id"));
    out.insert("media_data".to_string(), take(&mut payload, "media_data"));
    out.insert("media_server".to_string(), take(&mut payload, "media_server"));
    Ok(out)
}

/// Custom event creation: the payload is the event data itself, marked as a
/// custom event.
pub(crate) fn event_tag(mut payload: Map<String, Value>) -> Result<Map<String, Value>, SlateError> {
    let mut data = take_object(&mut payload, "data")?;
    data.entry("type".to_string())
        .or_insert_with(|| Value::String("custom".to_string()));
    Ok(data)
}

/// Email sends: addressees joined into one comma-separated string.
pub(crate) fn email(mut payload: Map<String, Value>) -> Result<Map<String, Value>, SlateError> {
    let addressees: Vec<String> =
        serde_json::from_value(take(&mut payload, "addressee_list")).map_err(|_| {
            SlateError::InvalidArgument("'addressee_list' must be a list of strings".to_string())
        })?;
    let mut param = Map::new();
    param.insert("addressee".to_string(), addressees.join(",").into());
    param.insert("subject".to_string(), take(&mut payload, "subject"));

    let mut data = Map::new();
    data.insert("template".to_string(), take(&mut payload, "template"));
    data.insert("content".to_string(), take(&mut payload, "content"));

    let mut out = Map::new();
    out.insert("param".to_string(), Value::Object(param));
    out.insert("data".to_string(), Value::Object(data));
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn query_payload() -> Map<String, Value> {
        let mut payload = Map::new();
        payload.insert(
            "filter".to_string(),
            serde_json::json!([["status", "==", "open"], ["project.id", "=", 7]]),
        );
        payload.insert("fields".to_string(), serde_json::json!(["id", "name"]));
        payload.insert("order".to_string(), serde_json::json!({"id": "desc"}));
        payload.insert(
            "page".to_string(),
            serde_json::json!({"page_number": 0, "page_size": 0}),
        );
        payload.insert(
            "module".to_string(),
            serde_json::json!({"code": "task", "id": 4}),
        );
        payload
    }

    fn builtin() -> BTreeSet<String> {
        ["id", "name", "status"]
            .iter()
            .map(|s| s.to_string())
            .collect()
    }

    #[test]
    fn query_translates_filter_fields_and_order() {
        let out = query("task", query_payload(), &builtin()).unwrap();
        assert_eq!(
            out["filter"],
            serde_json::json!({
                "task": {"status": ["-eq", "open"]},
                "project": {"id": ["-eq", 7]}
            })
        );
        assert_eq!(out["fields"], serde_json::json!({"task": ["id", "name"]}));
        assert_eq!(out["order"], serde_json::json!({"task.id": "desc"}));
        // page and module tag pass through untouched
        assert_eq!(
            out["page"],
            serde_json::json!({"page_number": 0, "page_size": 0})
        );
        assert_eq!(out["module"], serde_json::json!({"code": "task", "id": 4}));
    }

    #[test]
    fn query_formatting_is_deterministic() {
        let a = query("task", query_payload(), &builtin()).unwrap();
        let b = query("task", query_payload(), &builtin()).unwrap();
        assert_eq!(
            serde_json::to_string(&a).unwrap(),
            serde_json::to_string(&b).unwrap()
        );
    }

    #[test]
    fn malformed_filter_is_rejected_before_io() {
        let mut payload = query_payload();
        payload.insert("filter".to_string(), serde_json::json!("not a list"));
        let err = query("task", payload, &builtin()).unwrap_err();
        assert!(matches!(err, SlateError::InvalidArgument(_)));
    }

    #[test]
    fn create_payload_is_data_plus_module_tag() {
        let mut payload = Map::new();
        payload.insert("data".to_string(), serde_json::json!({"name": "comp"}));
        payload.insert("module".to_string(), serde_json::json!({"code": "task", "id": 4}));
        let out = create_data(payload).unwrap();
        assert_eq!(
            Value::Object(out),
            serde_json::json!({"name": "comp", "module": {"code": "task", "id": 4}})
        );
    }

    #[test]
    fn caller_supplied_module_tag_wins_on_create() {
        let mut payload = Map::new();
        payload.insert(
            "data".to_string(),
            serde_json::json!({"module": {"code": "asset", "id": 9}}),
        );
        payload.insert("module".to_string(), serde_json::json!({"code": "task", "id": 4}));
        let out = create_data(payload).unwrap();
        assert_eq!(out["module"], serde_json::json!({"code": "asset", "id": 9}));
    }

    #[test]
    fn update_payload_carries_target_id() {
        let mut payload = Map::new();
        payload.insert("id".to_string(), serde_json::json!(31));
        payload.insert("data".to_string(), serde_json::json!({"status": "done"}));
        payload.insert("module".to_string(), serde_json::json!({"code": "task", "id": 4}));
        let out = update_data(payload).unwrap();
        assert_eq!(out["id"], serde_json::json!(31));
        assert_eq!(out["status"], serde_json::json!("done"));
    }

    #[test]
    fn delete_payload_is_id_only() {
        let mut payload = Map::new();
        payload.insert("id".to_string(), serde_json::json!(31));
        payload.insert("module".to_string(), serde_json::json!({"code": "task", "id": 4}));
        let out = id_only(payload).unwrap();
        assert_eq!(Value::Object(out), serde_json::json!({"id": 31}));
    }

    #[test]
    fn media_filter_is_flat_and_unmoduled() {
        let mut payload = Map::new();
        payload.insert(
            "filter".to_string(),
            serde_json::json!([["md5_name", "==", "abc"]]),
        );
        payload.insert("size".to_string(), serde_json::json!("origin"));
        payload.insert("module".to_string(), serde_json::json!({"code": "media", "id": 2}));
        let out = media_filter(payload).unwrap();
        assert_eq!(
            Value::Object(out),
            serde_json::json!({"filter": {"md5_name": ["-eq", "abc"]}, "size": "origin"})
        );
    }

    #[test]
    fn event_payload_is_marked_custom() {
        let mut payload = Map::new();
        payload.insert("data".to_string(), serde_json::json!({"operate": "file_action"}));
        let out = event_tag(payload).unwrap();
        assert_eq!(
            Value::Object(out),
            serde_json::json!({"operate": "file_action", "type": "custom"})
        );
    }

    #[test]
    fn email_payload_joins_addressees() {
        let mut payload = Map::new();
        payload.insert(
            "addressee_list".to_string(),
            serde_json::json!(["a@example.com", "b@example.com"]),
        );
        payload.insert("subject".to_string(), serde_json::json!("weekly"));
        payload.insert("template".to_string(), serde_json::json!("text"));
        payload.insert("content".to_string(), serde_json::json!("hello"));
        let out = email(payload).unwrap();
        assert_eq!(
            Value::Object(out),
            serde_json::json!({
                "param": {"addressee": "a@example.com,b@example.com", "subject": "weekly"},
                "data": {"template": "text", "content": "hello"}
            })
        );
    }
}

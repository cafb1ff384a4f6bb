//! The service's response envelope.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Every endpoint answers with this envelope. A call succeeded only when
/// the HTTP status *and* the envelope status are both 200; the HTTP layer
/// alone is not authoritative.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiResponse {
    pub status: i64,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub data: Value,
}

impl ApiResponse {
    pub fn is_ok(&self) -> bool {
        self.status == 200
    }
}

/// Collection payload nested inside `data` for select-style endpoints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RowSet {
    #[serde(default)]
    pub rows: Vec<Value>,
    #[serde(default)]
    pub total: i64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn envelope_parses_with_missing_optional_fields() {
        let resp: ApiResponse = serde_json::from_str(r#"{"status": 200}"#).unwrap();
        assert!(resp.is_ok());
        assert_eq!(resp.message, "");
        assert_eq!(resp.data, Value::Null);
    }

    #[test]
    fn failure_envelope_carries_message() {
        let resp: ApiResponse =
            serde_json::from_str(r#"{"status": 404, "message": "no such item"}"#).unwrap();
        assert!(!resp.is_ok());
        assert_eq!(resp.message, "no such item");
    }

    #[test]
    fn rowset_parses_rows_and_total() {
        let rows: RowSet =
            serde_json::from_value(serde_json::json!({"rows": [{"id": 1}], "total": 1})).unwrap();
        assert_eq!(rows.rows.len(), 1);
        assert_eq!(rows.total, 1);
    }
}

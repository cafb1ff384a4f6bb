//! Descriptors for the auxiliary server endpoints the service hands out.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A media server as returned by `getMediaUploadServer` /
/// `getMediaServerItem`. Uploads go to `upload_url` with the server-issued
/// `token`, not the session token.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct MediaServer {
    #[serde(default)]
    pub id: i64,
    #[serde(default)]
    pub upload_url: String,
    #[serde(default)]
    pub token: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// The event/email endpoint set resolved by `getEventLogServer`.
///
/// These endpoints live outside the module-based API surface: calls carry
/// no session token, and email sends sign themselves with `token` via the
/// `sign` query parameter on `request_url`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct EventServer {
    #[serde(default)]
    pub add_url: String,
    #[serde(default)]
    pub find_url: String,
    #[serde(default)]
    pub select_url: String,
    #[serde(default)]
    pub fields_url: String,
    #[serde(default)]
    pub request_url: String,
    #[serde(default)]
    pub token: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

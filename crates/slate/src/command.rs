//! The command layer: one bound (module, operation) unit of work.
//!
//! A [`Command`] is constructed fresh for every call and never reused, so
//! no state leaks between invocations. A call runs four stages:
//!
//! 1. **assemble** - bind arguments to the declared parameter order, fill
//!    defaults (dynamic ones resolved against the live session now, not at
//!    declaration time), attach the module tag.
//! 2. **format** - the operation's payload rewrite (see [`crate::format`]).
//! 3. **execute** - exactly one HTTP request, no retries.
//! 4. **parse** - normalize the envelope's `data` per the operation's
//!    result shape.

use crate::client::{read_envelope, Slate};
use crate::error::SlateError;
use crate::format;
use crate::ops::{CommandSpec, EventEndpoint, Formatter, Operation, ResultShape, Transport};
use serde_json::{Map, Value};
use slateproto::{bind, CallArgs, DynamicDefault, MediaServer, Module, Record, RowSet};
use std::path::Path;

/// Normalized result of one command invocation.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// A single module-tagged record, or nothing.
    Record(Option<Record>),
    /// A list of module-tagged records.
    Records(Vec<Record>),
    /// A scalar count.
    Total(i64),
    /// A field catalog.
    Fields(Map<String, Value>),
    /// Unnormalized pass-through data.
    Raw(Value),
}

impl Outcome {
    pub fn into_record(self) -> Result<Option<Record>, SlateError> {
        match self {
            Self::Record(record) => Ok(record),
            other => Err(unexpected_shape("record", &other)),
        }
    }

    pub fn into_records(self) -> Result<Vec<Record>, SlateError> {
        match self {
            Self::Records(records) => Ok(records),
            other => Err(unexpected_shape("record list", &other)),
        }
    }

    pub fn into_total(self) -> Result<i64, SlateError> {
        match self {
            Self::Total(total) => Ok(total),
            other => Err(unexpected_shape("total", &other)),
        }
    }

    pub fn into_fields(self) -> Result<Map<String, Value>, SlateError> {
        match self {
            Self::Fields(fields) => Ok(fields),
            other => Err(unexpected_shape("field catalog", &other)),
        }
    }

    pub fn into_raw(self) -> Result<Value, SlateError> {
        match self {
            Self::Raw(value) => Ok(value),
            other => Err(unexpected_shape("raw data", &other)),
        }
    }
}

fn unexpected_shape(wanted: &str, got: &Outcome) -> SlateError {
    SlateError::Malformed(format!("expected {wanted}, got {got:?}"))
}

/// One remote operation bound to a module for a single invocation.
pub(crate) struct Command<'c> {
    client: &'c Slate,
    module: Module,
    op: Operation,
    spec: CommandSpec,
}

impl<'c> Command<'c> {
    pub fn new(client: &'c Slate, module: Module, op: Operation) -> Self {
        let spec = op.spec();
        Self {
            client,
            module,
            op,
            spec,
        }
    }

    #[tracing::instrument(
        skip(self, args),
        fields(module = %self.module.code, operation = self.op.name())
    )]
    pub async fn call(&self, args: CallArgs) -> Result<Outcome, SlateError> {
        let payload = self.assemble(&args).await?;
        let payload = self.format(payload).await?;
        let data = self.execute(&payload).await?;
        parse_data(self.spec.shape, &self.module, data)
    }

    /// Stage 1: bind arguments, resolve dynamic defaults, attach the module
    /// tag (set-if-absent, so a `module` parameter is never clobbered).
    async fn assemble(&self, args: &CallArgs) -> Result<Map<String, Value>, SlateError> {
        let bound = bind(self.spec.params, args)?;
        let mut values = bound.values;
        for (name, dynamic) in bound.pending {
            let value = match dynamic {
                DynamicDefault::BestMediaServer => {
                    let server = self.client.get_best_media_server().await?;
                    serde_json::to_value(server)
                        .map_err(|e| SlateError::Malformed(e.to_string()))?
                }
            };
            values.insert(name.to_string(), value);
        }
        if self.spec.attach_module {
            values
                .entry("module".to_string())
                .or_insert_with(|| self.module.payload_tag());
        }
        Ok(values)
    }

    /// Stage 2: operation-specific payload rewriting. Session-dependent
    /// inputs (built-in fields, module ids) are resolved here and handed to
    /// the pure formatters.
    async fn format(&self, payload: Map<String, Value>) -> Result<Map<String, Value>, SlateError> {
        match self.spec.formatter {
            Formatter::Identity => Ok(payload),
            Formatter::Query => {
                let builtin = self.client.builtin_fields(&self.module.code).await?;
                format::query(&self.module.code, payload, &builtin)
            }
            Formatter::CreateData => format::create_data(payload),
            Formatter::UpdateData => format::update_data(payload),
            Formatter::IdOnly => format::id_only(payload),
            Formatter::TagLink => format::tag_link(payload),
            Formatter::MemberData => format::member_data(payload),
            Formatter::LinkPath => {
                let module = self.linked_module(&payload)?;
                format::link_path(payload, module.id)
            }
            Formatter::MediaFilter => format::media_filter(payload),
            Formatter::SaveMedia => {
                let module = self.linked_module(&payload)?;
                format::save_media(payload, module.id)
            }
            Formatter::EventTag => format::event_tag(payload),
            Formatter::Email => format::email(payload),
        }
    }

    /// Resolve the `module` argument (a module name) against the catalog.
    fn linked_module(&self, payload: &Map<String, Value>) -> Result<Module, SlateError> {
        let name = payload
            .get("module")
            .and_then(Value::as_str)
            .ok_or_else(|| {
                SlateError::InvalidArgument("'module' must be a module name".to_string())
            })?;
        self.client.resolve_module(name)
    }

    /// Stage 3: exactly one HTTP request. Returns the envelope's `data`.
    async fn execute(&self, payload: &Map<String, Value>) -> Result<Value, SlateError> {
        let operation = format!("{}.{}", self.module.code, self.op.name());
        match self.spec.transport {
            Transport::Module => {
                let segment = match self.spec.segment {
                    Some(fixed) => fixed.to_string(),
                    None => self.module.url_segment(),
                };
                let url = self.client.api_url(&segment, self.spec.verb);
                let response = self
                    .client
                    .http()
                    .post(&url)
                    .header("token", self.client.token())
                    .timeout(self.client.timeout())
                    .json(payload)
                    .send()
                    .await
                    .map_err(|e| {
                        SlateError::from_reqwest(&operation, self.client.timeout(), e)
                    })?;
                Ok(read_envelope(&operation, response).await?.data)
            }
            Transport::MediaUpload => self.execute_upload(&operation, payload).await,
            Transport::Event(endpoint) => {
                let server = self.client.event_server().await?;
                let url = match endpoint {
                    EventEndpoint::Add => &server.add_url,
                    EventEndpoint::Find => &server.find_url,
                    EventEndpoint::Select => &server.select_url,
                    EventEndpoint::Fields => &server.fields_url,
                };
                self.post_unsigned(&operation, url, payload).await
            }
            Transport::Email => {
                let server = self.client.event_server().await?;
                let url = format!(
                    "{}/email/{}?sign={}",
                    server.request_url.trim_end_matches('/'),
                    self.spec.verb,
                    server.token
                );
                self.post_unsigned(&operation, &url, payload).await
            }
        }
    }

    /// JSON POST without the session token header (event/email endpoints).
    async fn post_unsigned(
        &self,
        operation: &str,
        url: &str,
        payload: &Map<String, Value>,
    ) -> Result<Value, SlateError> {
        let response = self
            .client
            .http()
            .post(url)
            .timeout(self.client.timeout())
            .json(payload)
            .send()
            .await
            .map_err(|e| SlateError::from_reqwest(operation, self.client.timeout(), e))?;
        Ok(read_envelope(operation, response).await?.data)
    }

    /// Multipart upload to the resolved media server; the server-issued
    /// token travels as a form field, not a header.
    async fn execute_upload(
        &self,
        operation: &str,
        payload: &Map<String, Value>,
    ) -> Result<Value, SlateError> {
        let server: MediaServer =
            serde_json::from_value(payload.get("server").cloned().unwrap_or(Value::Null))
                .map_err(|_| {
                    SlateError::InvalidArgument("'server' must be a media server".to_string())
                })?;
        let file_path = payload
            .get("file_path")
            .and_then(Value::as_str)
            .ok_or_else(|| {
                SlateError::InvalidArgument("'file_path' must be a string".to_string())
            })?;

        let bytes = tokio::fs::read(file_path)
            .await
            .map_err(|source| SlateError::UploadRead {
                path: file_path.into(),
                source,
            })?;
        let file_name = Path::new(file_path)
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "upload".to_string());

        let form = reqwest::multipart::Form::new()
            .text("token", server.token.clone())
            .part(
                "Filedata",
                reqwest::multipart::Part::bytes(bytes).file_name(file_name),
            );

        let response = self
            .client
            .http()
            .post(&server.upload_url)
            .timeout(self.client.timeout())
            .multipart(form)
            .send()
            .await
            .map_err(|e| SlateError::from_reqwest(operation, self.client.timeout(), e))?;
        Ok(read_envelope(operation, response).await?.data)
    }
}

/// Python-style emptiness, which the envelope uses to signal "no result".
fn is_empty(data: &Value) -> bool {
    match data {
        Value::Null => true,
        Value::Object(map) => map.is_empty(),
        Value::Array(list) => list.is_empty(),
        _ => false,
    }
}

/// Stage 4: normalize a successful envelope's `data`.
pub(crate) fn parse_data(
    shape: ResultShape,
    module: &Module,
    data: Value,
) -> Result<Outcome, SlateError> {
    match shape {
        ResultShape::Tagged => {
            if is_empty(&data) {
                return Ok(Outcome::Record(None));
            }
            let record = Record::tag(module, data)
                .ok_or_else(|| SlateError::Malformed("expected a result object".to_string()))?;
            Ok(Outcome::Record(Some(record)))
        }
        ResultShape::First => match data {
            Value::Null => Ok(Outcome::Record(None)),
            Value::Array(list) => match list.into_iter().next() {
                None => Ok(Outcome::Record(None)),
                Some(row) => {
                    let record = Record::tag(module, row).ok_or_else(|| {
                        SlateError::Malformed("expected result rows to be objects".to_string())
                    })?;
                    Ok(Outcome::Record(Some(record)))
                }
            },
            _ => Err(SlateError::Malformed(
                "expected a result list".to_string(),
            )),
        },
        ResultShape::Rows => {
            let rows: RowSet = serde_json::from_value(data)
                .map_err(|e| SlateError::Malformed(format!("expected rows/total: {e}")))?;
            let records = rows
                .rows
                .into_iter()
                .map(|row| {
                    Record::tag(module, row).ok_or_else(|| {
                        SlateError::Malformed("expected result rows to be objects".to_string())
                    })
                })
                .collect::<Result<Vec<_>, _>>()?;
            Ok(Outcome::Records(records))
        }
        ResultShape::Total => {
            let rows: RowSet = serde_json::from_value(data)
                .map_err(|e| SlateError::Malformed(format!("expected rows/total: {e}")))?;
            Ok(Outcome::Total(rows.total))
        }
        ResultShape::FieldCatalog => {
            let mut catalog = Map::new();
            merge_section(&mut catalog, &data, "fixed_field");
            merge_section(&mut catalog, &data, "custom_field");
            Ok(Outcome::Fields(catalog))
        }
        ResultShape::RelationCatalog => {
            let mut catalog = Map::new();
            merge_section(&mut catalog, &data, "relation");
            Ok(Outcome::Fields(catalog))
        }
        ResultShape::RequiredFields => Ok(Outcome::Raw(
            data.get("require_field").cloned().unwrap_or(Value::Null),
        )),
        ResultShape::MediaParam => Ok(Outcome::Raw(
            data.get("param").cloned().unwrap_or(Value::Null),
        )),
        ResultShape::EventFirst => match data {
            Value::Null => Ok(Outcome::Raw(Value::Null)),
            Value::Array(list) => Ok(Outcome::Raw(
                list.into_iter().next().unwrap_or(Value::Null),
            )),
            _ => Err(SlateError::Malformed(
                "expected a result list".to_string(),
            )),
        },
        ResultShape::EventFieldCatalog => {
            let mut catalog = Map::new();
            merge_section(&mut catalog, &data, "fixed_field");
            Ok(Outcome::Fields(catalog))
        }
        ResultShape::Raw => Ok(Outcome::Raw(data)),
    }
}

fn merge_section(catalog: &mut Map<String, Value>, data: &Value, key: &str) {
    if let Some(Value::Object(section)) = data.get(key) {
        for (name, value) in section {
            catalog.insert(name.clone(), value.clone());
        }
    }
}

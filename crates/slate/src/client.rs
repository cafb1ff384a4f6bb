//! The Slate client: session bootstrap, module catalog, and dispatch.
//!
//! [`Slate::connect`] performs one login POST to acquire the session token
//! and fetches the module catalog; both are immutable for the client's
//! lifetime, so callers wanting fresh catalog state construct a new client.
//! Operations dispatch through [`Slate::call`] by `(module_name,
//! operation_name)` exactly like the service's own tables: `event`/`email`
//! bind against the event table with a synthetic module, everything else
//! resolves the catalog module and tries the public table before the data
//! table. The typed methods below are thin wrappers over that dispatch.

use crate::command::{Command, Outcome};
use crate::error::SlateError;
use crate::ops::{self, Operation};
use serde_json::Value;
use slateconf::SlateConfig;
use slateproto::{
    ApiResponse, CallArgs, Condition, EventServer, MediaServer, Module, Page, Record, RowSet,
    SortOrder,
};
use std::collections::{BTreeMap, BTreeSet};
use std::future::Future;
use std::pin::Pin;
use std::time::Duration;
use tokio::sync::OnceCell;

/// A logical query against one module.
///
/// Field references may be dotted (`"project.name"`) or use `"project.*"`
/// to request every field of a related module.
#[derive(Debug, Clone, Default)]
pub struct Query {
    pub filter: Vec<Condition>,
    pub fields: Vec<String>,
    pub order: BTreeMap<String, SortOrder>,
    pub page: Option<Page>,
}

impl Query {
    /// Query by filter conditions only.
    pub fn filtered(filter: Vec<Condition>) -> Self {
        Self {
            filter,
            ..Self::default()
        }
    }
}

/// An authenticated session against one Slate deployment.
#[derive(Debug)]
pub struct Slate {
    http: reqwest::Client,
    base_url: String,
    login_name: String,
    token: String,
    timeout: Duration,
    modules: Vec<Module>,
    event_server: OnceCell<EventServer>,
}

impl Slate {
    /// Log in and fetch the module catalog. A rejected login or an
    /// unreachable service fails construction.
    #[tracing::instrument(
        skip(config),
        fields(base_url = %config.base_url, login_name = %config.login_name)
    )]
    pub async fn connect(config: &SlateConfig) -> Result<Self, SlateError> {
        let mut base_url = config.base_url.clone();
        if !base_url.ends_with('/') {
            base_url.push('/');
        }
        let http = reqwest::Client::new();
        let timeout = Duration::from_secs(config.timeout_secs);

        let token = login(
            &http,
            &base_url,
            &config.login_name,
            &config.password,
            timeout,
        )
        .await?;
        let modules = fetch_modules(&http, &base_url, &token, timeout).await?;
        tracing::info!(modules = modules.len(), "Slate session established");

        Ok(Self {
            http,
            base_url,
            login_name: config.login_name.clone(),
            token,
            timeout,
            modules,
            event_server: OnceCell::new(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn login_name(&self) -> &str {
        &self.login_name
    }

    pub fn token(&self) -> &str {
        &self.token
    }

    /// The module catalog fetched at construction time.
    pub fn modules(&self) -> &[Module] {
        &self.modules
    }

    pub(crate) fn http(&self) -> &reqwest::Client {
        &self.http
    }

    pub(crate) fn timeout(&self) -> Duration {
        self.timeout
    }

    pub(crate) fn api_url(&self, segment: &str, verb: &str) -> String {
        format!("{}api/{}/{}", self.base_url, segment, verb)
    }

    pub(crate) fn resolve_module(&self, name: &str) -> Result<Module, SlateError> {
        match self.modules.iter().find(|m| m.code == name) {
            Some(module) => Ok(module.clone()),
            None => {
                tracing::error!(module = name, "no such module");
                Err(SlateError::UnknownModule(name.to_string()))
            }
        }
    }

    /// Resolve `(module_name, operation_name)` to a bound command.
    fn command(&self, module_name: &str, operation: &str) -> Result<Command<'_>, SlateError> {
        if module_name == "event" || module_name == "email" {
            let op = ops::event_table(operation).ok_or_else(|| SlateError::UnknownOperation {
                module: module_name.to_string(),
                operation: operation.to_string(),
            })?;
            return Ok(Command::new(self, Module::event(), Operation::Event(op)));
        }

        let module = self.resolve_module(module_name)?;
        let op = ops::public_table(operation)
            .map(Operation::Public)
            .or_else(|| ops::data_table(operation).map(Operation::Data))
            .ok_or_else(|| SlateError::UnknownOperation {
                module: module_name.to_string(),
                operation: operation.to_string(),
            })?;
        Ok(Command::new(self, module, op))
    }

    /// Dispatch one operation by name with raw call arguments.
    ///
    /// This is the generic entry point the typed methods build on; it is
    /// public so callers can reach operations without a dedicated wrapper.
    pub async fn call(
        &self,
        module_name: &str,
        operation: &str,
        args: CallArgs,
    ) -> Result<Outcome, SlateError> {
        self.command(module_name, operation)?.call(args).await
    }

    /// Boxed variant of [`Slate::call`] for internal round-trips made while
    /// another command is in flight (built-in field lookups, dynamic
    /// defaults). Boxing keeps the future types finite.
    fn call_dyn<'a>(
        &'a self,
        module_name: &'a str,
        operation: &'a str,
        args: CallArgs,
    ) -> Pin<Box<dyn Future<Output = Result<Outcome, SlateError>> + Send + 'a>> {
        Box::pin(self.call(module_name, operation, args))
    }

    /// Built-in field names of a module, used by query translation.
    pub(crate) async fn builtin_fields(
        &self,
        module_name: &str,
    ) -> Result<BTreeSet<String>, SlateError> {
        let fields = self
            .call_dyn(module_name, "fields", CallArgs::new())
            .await?
            .into_fields()?;
        Ok(fields.keys().cloned().collect())
    }

    /// The cached event/email endpoint set, resolved on first use.
    pub(crate) async fn event_server(&self) -> Result<&EventServer, SlateError> {
        self.event_server
            .get_or_try_init(|| async {
                let value = self
                    .call_dyn("media", "get_event_server", CallArgs::new())
                    .await?
                    .into_raw()?;
                serde_json::from_value(value).map_err(|e| {
                    SlateError::Malformed(format!("event server descriptor: {e}"))
                })
            })
            .await
    }

    // ==========================================================================
    // Data operations
    // ==========================================================================

    /// First record matching the query, or `None`.
    pub async fn find_one(
        &self,
        module_name: &str,
        query: Query,
    ) -> Result<Option<Record>, SlateError> {
        let args = query_args(&query)?;
        self.call(module_name, "find_one", args).await?.into_record()
    }

    /// All records matching the query.
    pub async fn select(&self, module_name: &str, query: Query) -> Result<Vec<Record>, SlateError> {
        let args = query_args(&query)?;
        self.call(module_name, "find", args).await?.into_records()
    }

    /// Count of records matching the filter.
    pub async fn summary(
        &self,
        module_name: &str,
        filter: Vec<Condition>,
    ) -> Result<i64, SlateError> {
        let args = query_args(&Query::filtered(filter))?;
        self.call(module_name, "summary", args).await?.into_total()
    }

    /// Create a record; returns whatever the service echoes back, tagged.
    pub async fn create(
        &self,
        module_name: &str,
        data: Value,
    ) -> Result<Option<Record>, SlateError> {
        tracing::debug!(module = module_name, "creating record");
        let args = CallArgs::new().arg(data);
        self.call(module_name, "create", args).await?.into_record()
    }

    /// Update one record by id.
    pub async fn update(
        &self,
        module_name: &str,
        id: i64,
        data: Value,
    ) -> Result<Option<Record>, SlateError> {
        tracing::debug!(module = module_name, id, "updating record");
        let args = CallArgs::new().arg(id).arg(data);
        self.call(module_name, "update", args).await?.into_record()
    }

    /// Delete one record by id.
    pub async fn delete(&self, module_name: &str, id: i64) -> Result<Value, SlateError> {
        tracing::debug!(module = module_name, id, "deleting record");
        let args = CallArgs::new().arg(id);
        self.call(module_name, "delete", args).await?.into_raw()
    }

    /// Attach a tag to a record.
    pub async fn tag(
        &self,
        module_name: &str,
        id: i64,
        tag_id: i64,
    ) -> Result<Option<Record>, SlateError> {
        let args = CallArgs::new().arg(id).arg(tag_id);
        self.call(module_name, "tag", args).await?.into_record()
    }

    /// Field catalog of a module: fixed and custom fields merged, keyed by
    /// field name.
    pub async fn fields(
        &self,
        module_name: &str,
    ) -> Result<serde_json::Map<String, Value>, SlateError> {
        self.call(module_name, "fields", CallArgs::new())
            .await?
            .into_fields()
    }

    /// Relation fields of a module.
    pub async fn relation_fields(
        &self,
        module_name: &str,
    ) -> Result<serde_json::Map<String, Value>, SlateError> {
        self.call(module_name, "relation_fields", CallArgs::new())
            .await?
            .into_fields()
    }

    /// Fields the service requires when creating records in a module.
    pub async fn creation_require_fields(&self, module_name: &str) -> Result<Value, SlateError> {
        self.call(module_name, "creation_require_fields", CallArgs::new())
            .await?
            .into_raw()
    }

    // ==========================================================================
    // Media and path operations
    // ==========================================================================

    /// Upload a file. Without an explicit server the current best media
    /// server is resolved first - per call, never cached.
    pub async fn upload(
        &self,
        file_path: &str,
        server: Option<MediaServer>,
    ) -> Result<Value, SlateError> {
        let server = match server {
            Some(server) => to_value("server", &server)?,
            None => Value::Null,
        };
        let args = CallArgs::new().arg(file_path).arg(server);
        self.call("media", "upload", args).await?.into_raw()
    }

    /// Objects assigned to a user within one module.
    pub async fn get_member_data(
        &self,
        user_id: i64,
        module_id: i64,
    ) -> Result<Value, SlateError> {
        let args = CallArgs::new().arg(user_id).arg(module_id);
        self.call("user", "get_member_data", args).await?.into_raw()
    }

    pub async fn get_parent_dir(&self, id: i64) -> Result<Value, SlateError> {
        let args = CallArgs::new().arg(id);
        self.call("dir_template", "get_parent_dir", args)
            .await?
            .into_raw()
    }

    pub async fn get_children_dir(&self, id: i64) -> Result<Value, SlateError> {
        let args = CallArgs::new().arg(id);
        self.call("dir_template", "get_children_dir", args)
            .await?
            .into_raw()
    }

    pub async fn get_brother_dir(&self, id: i64) -> Result<Value, SlateError> {
        let args = CallArgs::new().arg(id);
        self.call("dir_template", "get_brother_dir", args)
            .await?
            .into_raw()
    }

    /// Path template for an object of the named module.
    pub async fn get_template_path(
        &self,
        module_name: &str,
        id: i64,
        template_code: &str,
    ) -> Result<Value, SlateError> {
        let args = CallArgs::new().arg(module_name).arg(id).arg(template_code);
        self.call("dir_template", "get_template_path", args)
            .await?
            .into_raw()
    }

    /// Concrete path of an object, derived from its template.
    pub async fn get_item_path(
        &self,
        module_name: &str,
        id: i64,
        template_code: &str,
    ) -> Result<Value, SlateError> {
        let args = CallArgs::new().arg(module_name).arg(id).arg(template_code);
        self.call("dir_template", "get_item_path", args)
            .await?
            .into_raw()
    }

    /// Attach media to an object of the named module.
    pub async fn create_media(
        &self,
        module_name: &str,
        id: i64,
        media_data: Value,
        media_server: Option<MediaServer>,
    ) -> Result<Option<Record>, SlateError> {
        let args = save_media_args(module_name, id, media_data, media_server)?;
        self.call("media", "create_media", args).await?.into_record()
    }

    /// Update media attached to an object of the named module.
    pub async fn update_media(
        &self,
        module_name: &str,
        id: i64,
        media_data: Value,
        media_server: Option<MediaServer>,
    ) -> Result<Option<Record>, SlateError> {
        let args = save_media_args(module_name, id, media_data, media_server)?;
        self.call("media", "update_media", args).await?.into_record()
    }

    pub async fn get_media_data(&self, filter: Vec<Condition>) -> Result<Value, SlateError> {
        let args = CallArgs::new().arg(to_value("filter", &filter)?);
        self.call("media", "get_media_data", args).await?.into_raw()
    }

    /// The media server the service currently considers fastest.
    pub async fn get_best_media_server(&self) -> Result<MediaServer, SlateError> {
        let record = self
            .call_dyn("media", "get_best_media_server", CallArgs::new())
            .await?
            .into_record()?
            .ok_or_else(|| SlateError::Malformed("empty media server response".to_string()))?;
        serde_json::from_value(Value::Object(record.values))
            .map_err(|e| SlateError::Malformed(format!("media server descriptor: {e}")))
    }

    /// One media server by id.
    pub async fn get_media_server(&self, server_id: i64) -> Result<MediaServer, SlateError> {
        let args = CallArgs::new().arg(server_id);
        let record = self
            .call("media", "get_media_server", args)
            .await?
            .into_record()?
            .ok_or_else(|| SlateError::Malformed("empty media server response".to_string()))?;
        serde_json::from_value(Value::Object(record.values))
            .map_err(|e| SlateError::Malformed(format!("media server descriptor: {e}")))
    }

    /// Status of every media server.
    pub async fn get_media_server_status(&self) -> Result<Value, SlateError> {
        self.call("media", "get_media_server_status", CallArgs::new())
            .await?
            .into_raw()
    }

    pub async fn clear_media_thumbnail(
        &self,
        filter: Vec<Condition>,
    ) -> Result<Option<Record>, SlateError> {
        let args = CallArgs::new().arg(to_value("filter", &filter)?);
        self.call("media", "clear_media_thumbnail", args)
            .await?
            .into_record()
    }

    pub async fn get_media_full_path(
        &self,
        filter: Vec<Condition>,
        size: &str,
    ) -> Result<Value, SlateError> {
        let args = CallArgs::new().arg(to_value("filter", &filter)?).arg(size);
        self.call("media", "get_media_full_path", args)
            .await?
            .into_raw()
    }

    pub async fn select_media_data(
        &self,
        server_id: i64,
        md5_name_list: Value,
    ) -> Result<Value, SlateError> {
        let args = CallArgs::new().arg(server_id).arg(md5_name_list);
        self.call("media", "select_media_data", args)
            .await?
            .into_raw()
    }

    /// Fetch the event/email endpoint descriptor. The command layer caches
    /// one copy internally; this always asks the service.
    pub async fn get_event_server(&self) -> Result<EventServer, SlateError> {
        let value = self
            .call("media", "get_event_server", CallArgs::new())
            .await?
            .into_raw()?;
        serde_json::from_value(value)
            .map_err(|e| SlateError::Malformed(format!("event server descriptor: {e}")))
    }

    // ==========================================================================
    // Event and email operations
    // ==========================================================================

    /// Record a custom event in the event log.
    pub async fn create_event(&self, data: Value) -> Result<Value, SlateError> {
        let args = CallArgs::new().arg(data);
        self.call("event", "create", args).await?.into_raw()
    }

    /// First event matching the query, untagged, or null.
    pub async fn find_one_event(&self, query: Query) -> Result<Value, SlateError> {
        let args = query_args(&query)?;
        self.call("event", "find_one", args).await?.into_raw()
    }

    /// Events matching the query, as the event server returns them.
    pub async fn select_events(&self, query: Query) -> Result<Value, SlateError> {
        let args = query_args(&query)?;
        self.call("event", "find", args).await?.into_raw()
    }

    /// Field catalog of the event log.
    pub async fn event_fields(&self) -> Result<serde_json::Map<String, Value>, SlateError> {
        self.call("event", "fields", CallArgs::new())
            .await?
            .into_fields()
    }

    /// Send a templated email through the event server.
    pub async fn send_email(
        &self,
        addressees: &[String],
        subject: Value,
        template: &str,
        content: Value,
    ) -> Result<Value, SlateError> {
        let args = CallArgs::new()
            .arg(to_value("addressee_list", &addressees)?)
            .arg(subject)
            .arg(template)
            .arg(content);
        self.call("email", "send_email", args).await?.into_raw()
    }
}

fn to_value<T: serde::Serialize>(what: &str, value: &T) -> Result<Value, SlateError> {
    serde_json::to_value(value).map_err(|e| SlateError::InvalidArgument(format!("{what}: {e}")))
}

fn query_args(query: &Query) -> Result<CallArgs, SlateError> {
    let page = match query.page {
        Some(page) => to_value("page", &page)?,
        None => Value::Null,
    };
    Ok(CallArgs::new()
        .arg(to_value("filter", &query.filter)?)
        .arg(to_value("fields", &query.fields)?)
        .arg(to_value("order", &query.order)?)
        .arg(page))
}

fn save_media_args(
    module_name: &str,
    id: i64,
    media_data: Value,
    media_server: Option<MediaServer>,
) -> Result<CallArgs, SlateError> {
    let media_server = match media_server {
        Some(server) => to_value("media_server", &server)?,
        None => Value::Null,
    };
    Ok(CallArgs::new()
        .arg(module_name)
        .arg(id)
        .arg(media_data)
        .arg(media_server))
}

async fn login(
    http: &reqwest::Client,
    base_url: &str,
    login_name: &str,
    password: &str,
    timeout: Duration,
) -> Result<String, SlateError> {
    let url = format!("{base_url}api/login/in");
    let response = http
        .post(&url)
        .timeout(timeout)
        .form(&[
            ("login_name", login_name),
            ("password", password),
            ("from", "api"),
        ])
        .send()
        .await
        .map_err(|e| SlateError::from_reqwest("login", timeout, e))?;
    let envelope = read_envelope("login", response).await?;
    envelope
        .data
        .get("token")
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| SlateError::Malformed("login response carried no token".to_string()))
}

async fn fetch_modules(
    http: &reqwest::Client,
    base_url: &str,
    token: &str,
    timeout: Duration,
) -> Result<Vec<Module>, SlateError> {
    let url = format!("{base_url}api/module/getModuleData");
    let response = http
        .post(&url)
        .header("token", token)
        .timeout(timeout)
        .send()
        .await
        .map_err(|e| SlateError::from_reqwest("module catalog", timeout, e))?;
    let envelope = read_envelope("module catalog", response).await?;
    let rows: RowSet = serde_json::from_value(envelope.data)
        .map_err(|e| SlateError::Malformed(format!("module catalog: {e}")))?;
    rows.rows
        .into_iter()
        .map(|row| {
            serde_json::from_value(row)
                .map_err(|e| SlateError::Malformed(format!("module catalog entry: {e}")))
        })
        .collect()
}

/// Decode one response against the envelope contract: a call succeeded iff
/// the HTTP status is 200 *and* the body status is 200. Failures are logged
/// here once, then propagated.
pub(crate) async fn read_envelope(
    operation: &str,
    response: reqwest::Response,
) -> Result<ApiResponse, SlateError> {
    let status = response.status();
    let body = response
        .text()
        .await
        .map_err(|e| SlateError::Transport(e.to_string()))?;

    if !status.is_success() {
        let err = SlateError::Http {
            status: status.as_u16(),
            body,
        };
        tracing::error!(operation, %err, "request failed");
        return Err(err);
    }

    let envelope: ApiResponse = serde_json::from_str(&body)
        .map_err(|e| SlateError::Malformed(format!("{operation}: {e}")))?;
    if !envelope.is_ok() {
        let err = SlateError::Api {
            status: envelope.status,
            message: envelope.message,
        };
        tracing::error!(operation, %err, "request failed");
        return Err(err);
    }
    Ok(envelope)
}

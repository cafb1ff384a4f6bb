//! slateproto - Protocol types for the Slate production-tracking API
//!
//! This crate defines the wire-level vocabulary shared by the Slate client
//! and anything that consumes its results: module descriptors, filter
//! conditions with their operator table, command parameter declarations,
//! the response envelope, and module-tagged records.
//!
//! ## Calling convention
//!
//! Every remote operation declares an ordered list of [`ParamSpec`]s.
//! Callers supply arguments positionally and/or by name via [`CallArgs`];
//! [`bind`] merges them in declared order, fills static defaults, and
//! reports defaults that can only be resolved against a live session
//! (see [`DynamicDefault`]). The client crate turns the bound mapping into
//! exactly one HTTP request.
//!
//! ## Wire shapes
//!
//! The service speaks `POST <base>/api/<ModuleSegment>/<verb>` with a JSON
//! body and answers `{"status": <int>, "message": <string>, "data": ...}`.
//! Collection selects nest `{"rows": [...], "total": <int>}` inside `data`.
//! See [`ApiResponse`] and [`RowSet`].

pub mod envelope;
pub mod filter;
pub mod module;
pub mod params;
pub mod record;
pub mod server;

pub use envelope::{ApiResponse, RowSet};
pub use filter::{Condition, Operator, Page, SortOrder};
pub use module::{Module, ModuleKind};
pub use params::{bind, BindError, BoundArgs, CallArgs, DynamicDefault, ParamDefault, ParamSpec};
pub use record::Record;
pub use server::{EventServer, MediaServer};

//! slate - typed command-dispatch client for the Slate production-tracking
//! REST API.
//!
//! The service exposes one POST endpoint per `(module, verb)` pair and a
//! uniform `{status, message, data}` envelope. This crate wraps that
//! surface behind a closed catalog of operations ([`ops::Operation`]): each
//! invocation binds arguments against the operation's declared parameters,
//! runs its payload formatter (module-aware query translation for
//! query-style operations), issues exactly one HTTP request, and
//! normalizes the response into an [`Outcome`].
//!
//! ## Dispatch
//!
//! [`Slate::call`] resolves `(module_name, operation_name)` the way the
//! service's own tables do: the `event`/`email` module names bind against
//! the event table (separately-resolved endpoints, no session token),
//! everything else resolves a catalog module and tries the public/media
//! table before the generic data table. Typed wrappers exist for every
//! operation.
//!
//! ```no_run
//! use slate::{Condition, Query, Slate, SlateConfig};
//!
//! # async fn demo() -> Result<(), slate::SlateError> {
//! let config = SlateConfig::new("http://tracker.example/", "bot", "secret");
//! let client = Slate::connect(&config).await?;
//!
//! let open = client
//!     .select("task", Query::filtered(vec![Condition::new("status", "==", "open")]))
//!     .await?;
//! println!("{} open tasks", open.len());
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod command;
pub mod error;
pub mod ops;
pub mod translate;

mod format;

pub use client::{Query, Slate};
pub use command::Outcome;
pub use error::SlateError;
pub use ops::{DataOp, EventOp, Operation, PublicOp};

pub use slateconf::SlateConfig;
pub use slateproto::{
    CallArgs, Condition, EventServer, MediaServer, Module, Operator, Page, Record, SortOrder,
};

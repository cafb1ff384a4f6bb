//! Parameter declarations and call-argument binding.
//!
//! Each remote operation declares an ordered [`ParamSpec`] list - its call
//! signature. Callers pass a [`CallArgs`] holding positional values (bound
//! to parameter names in declared order) and named values; positional wins
//! when both name the same parameter. An explicit JSON null counts as
//! absent, so callers can pass `null` to mean "use the default".
//!
//! Defaults come in two flavors. Static defaults ([`ParamDefault::List`],
//! [`ParamDefault::Map`], ...) are substituted here. Dynamic defaults
//! ([`ParamDefault::Dynamic`]) need a live session to compute - [`bind`]
//! reports them as pending and the client resolves them per invocation,
//! never at declaration time.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

/// Declares one parameter of an operation's call signature.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParamSpec {
    pub name: &'static str,
    pub required: bool,
    pub default: ParamDefault,
}

impl ParamSpec {
    /// A required parameter with no default; absence fails the call.
    pub const fn required(name: &'static str) -> Self {
        Self {
            name,
            required: true,
            default: ParamDefault::None,
        }
    }

    /// A required parameter whose default always satisfies it.
    pub const fn defaulted(name: &'static str, default: ParamDefault) -> Self {
        Self {
            name,
            required: true,
            default,
        }
    }

    /// An optional parameter.
    pub const fn optional(name: &'static str, default: ParamDefault) -> Self {
        Self {
            name,
            required: false,
            default,
        }
    }
}

/// Default value of a parameter when the caller omits it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamDefault {
    /// No default.
    None,
    /// Empty list `[]`.
    List,
    /// Empty mapping `{}`.
    Map,
    /// The zero pagination window `{"page_number": 0, "page_size": 0}`.
    Page,
    /// A literal string.
    Text(&'static str),
    /// Computed against the live session at invocation time.
    Dynamic(DynamicDefault),
}

/// Defaults that require a round-trip to the service to compute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DynamicDefault {
    /// The media server the service currently considers fastest.
    BestMediaServer,
}

/// Positional and named arguments for one invocation.
#[derive(Debug, Clone, Default)]
pub struct CallArgs {
    positional: Vec<Value>,
    named: Map<String, Value>,
}

impl CallArgs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a positional argument.
    pub fn arg(mut self, value: impl Into<Value>) -> Self {
        self.positional.push(value.into());
        self
    }

    /// Set a named argument.
    pub fn named(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.named.insert(name.into(), value.into());
        self
    }

    pub fn positional(&self) -> &[Value] {
        &self.positional
    }
}

/// Result of binding arguments against a parameter list.
#[derive(Debug, Clone, Default)]
pub struct BoundArgs {
    /// Parameter name → value, static defaults applied.
    pub values: Map<String, Value>,
    /// Dynamic defaults still to be resolved against the session.
    pub pending: Vec<(&'static str, DynamicDefault)>,
}

/// Binding failures, surfaced before any network I/O.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum BindError {
    #[error("operation takes at most {expected} positional arguments, {given} given")]
    TooManyArguments { expected: usize, given: usize },

    #[error("missing required argument '{0}'")]
    MissingArgument(&'static str),
}

/// Bind call arguments to a declared parameter list.
///
/// Positional values map to parameter names in declared order and override
/// named values. Nulls count as absent. Missing values are filled from the
/// parameter's default; dynamic defaults are returned as pending.
pub fn bind(specs: &[ParamSpec], args: &CallArgs) -> Result<BoundArgs, BindError> {
    if args.positional.len() > specs.len() {
        return Err(BindError::TooManyArguments {
            expected: specs.len(),
            given: args.positional.len(),
        });
    }

    let mut values = args.named.clone();
    for (spec, value) in specs.iter().zip(args.positional.iter()) {
        values.insert(spec.name.to_string(), value.clone());
    }

    let mut pending = Vec::new();
    for spec in specs {
        let missing = values.get(spec.name).map_or(true, Value::is_null);
        if !missing {
            continue;
        }
        values.remove(spec.name);
        match spec.default {
            ParamDefault::None => {
                if spec.required {
                    return Err(BindError::MissingArgument(spec.name));
                }
            }
            ParamDefault::List => {
                values.insert(spec.name.to_string(), Value::Array(Vec::new()));
            }
            ParamDefault::Map => {
                values.insert(spec.name.to_string(), Value::Object(Map::new()));
            }
            ParamDefault::Page => {
                values.insert(
                    spec.name.to_string(),
                    serde_json::json!({"page_number": 0, "page_size": 0}),
                );
            }
            ParamDefault::Text(text) => {
                values.insert(spec.name.to_string(), Value::String(text.to_string()));
            }
            ParamDefault::Dynamic(dynamic) => {
                pending.push((spec.name, dynamic));
            }
        }
    }

    Ok(BoundArgs { values, pending })
}

//! The bindings an executed module leaves behind, and the interpreter report
//! they arrive in.

use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::error::ExecError;

/// One name bound by the executed module.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Binding {
    /// Python type name of the bound object, for example `int` or `function`.
    #[serde(rename = "type")]
    pub type_name: String,
    /// `repr()` of the object.
    pub repr: String,
    /// The object as JSON, when it has a JSON form. Python `None` is
    /// `Some(Value::Null)`.
    #[serde(
        default,
        deserialize_with = "present",
        skip_serializing_if = "Option::is_none"
    )]
    pub value: Option<Value>,
}

/// Names bound at module level after execution, excluding `__builtins__`.
///
/// The module runs with `__name__` set to `__rebuilt__`, so that binding is
/// always present.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Namespace {
    /// Bindings keyed by name.
    pub bindings: BTreeMap<String, Binding>,
    /// Text the module printed to standard output.
    #[serde(default)]
    pub stdout: String,
}

impl Namespace {
    /// Looks up a binding by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Binding> {
        self.bindings.get(name)
    }

    /// Returns the JSON value bound to `name`, if it has one.
    #[must_use]
    pub fn value(&self, name: &str) -> Option<&Value> {
        self.get(name).and_then(|binding| binding.value.as_ref())
    }
}

#[derive(Debug, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
enum Report {
    Ok {
        bindings: BTreeMap<String, Binding>,
        #[serde(default)]
        stdout: String,
    },
    Error {
        exception: String,
        message: String,
        traceback: String,
    },
}

/// Decodes the report from the interpreter's captured standard output.
///
/// The report is the last non-empty line.
pub(crate) fn parse_report(stdout: &str) -> Result<Namespace, ExecError> {
    let line = stdout
        .lines()
        .rev()
        .find(|line| !line.trim().is_empty())
        .ok_or_else(|| ExecError::InvalidOutput {
            message: String::from("no report on standard output"),
        })?;
    let report: Report =
        serde_json::from_str(line.trim()).map_err(|error| ExecError::InvalidOutput {
            message: error.to_string(),
        })?;
    match report {
        Report::Ok { bindings, stdout } => Ok(Namespace { bindings, stdout }),
        Report::Error {
            exception,
            message,
            traceback,
        } => Err(ExecError::Raised {
            exception,
            message,
            traceback,
        }),
    }
}

fn present<'de, D>(deserializer: D) -> Result<Option<Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Value::deserialize(deserializer).map(Some)
}

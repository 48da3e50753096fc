//! Caller-facing result types and the raw observation of a child run

use serde::{Serialize, Serializer};
use serde_json::{json, Map, Value};

/// Error text used when a failure envelope carries no usable message
pub const UNKNOWN_ERROR: &str = "Unknown error";

/// The single result of one bridge invocation
///
/// On the wire this is the envelope `{"success": true, "result": ...}` or
/// `{"success": false, "error": "...", "stack": "..."}`.
#[derive(Debug, Clone, PartialEq)]
pub enum Response {
    Success { result: Value },
    Failure { error: String, stack: Option<String> },
}

impl Response {
    pub fn success(result: impl Into<Value>) -> Self {
        Response::Success {
            result: result.into(),
        }
    }

    pub fn failure(error: impl Into<String>) -> Self {
        Response::Failure {
            error: error.into(),
            stack: None,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Response::Success { .. })
    }

    /// Interpret a JSON value as an envelope
    ///
    /// Returns `None` unless the value is an object with a boolean `success`.
    pub fn from_envelope(value: &Value) -> Option<Self> {
        let object = value.as_object()?;
        match object.get("success")?.as_bool()? {
            true => Some(Response::Success {
                result: object.get("result").cloned().unwrap_or(Value::Null),
            }),
            false => Some(Response::Failure {
                error: error_text(object),
                stack: object
                    .get("stack")
                    .and_then(Value::as_str)
                    .map(str::to_string),
            }),
        }
    }

    pub fn to_envelope(&self) -> Value {
        match self {
            Response::Success { result } => json!({ "success": true, "result": result }),
            Response::Failure { error, stack } => {
                let mut envelope = Map::new();
                envelope.insert("success".to_string(), Value::Bool(false));
                envelope.insert("error".to_string(), Value::String(error.clone()));
                if let Some(stack) = stack {
                    envelope.insert("stack".to_string(), Value::String(stack.clone()));
                }
                Value::Object(envelope)
            }
        }
    }

    /// Convert into a `Result`, dropping the stack trace
    pub fn into_result(self) -> Result<Value, String> {
        match self {
            Response::Success { result } => Ok(result),
            Response::Failure { error, .. } => Err(error),
        }
    }
}

impl Serialize for Response {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_envelope().serialize(serializer)
    }
}

fn error_text(object: &Map<String, Value>) -> String {
    match object.get("error") {
        Some(Value::String(text)) => text.clone(),
        None | Some(Value::Null) => UNKNOWN_ERROR.to_string(),
        Some(other) => other.to_string(),
    }
}

/// Raw observation of one child-process run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProcessOutcome {
    /// Exit code; a child killed by signal N reports `128 + N`
    pub exit_code: i32,
    pub stdout: Vec<u8>,
    pub stderr: Vec<u8>,
    /// Set when the bounded wait expired and the child was killed
    pub timed_out: bool,
}

impl ProcessOutcome {
    pub fn new(exit_code: i32, stdout: impl Into<Vec<u8>>, stderr: impl Into<Vec<u8>>) -> Self {
        Self {
            exit_code,
            stdout: stdout.into(),
            stderr: stderr.into(),
            timed_out: false,
        }
    }

    pub fn stdout_text(&self) -> String {
        String::from_utf8_lossy(&self.stdout).into_owned()
    }

    pub fn stderr_text(&self) -> String {
        String::from_utf8_lossy(&self.stderr).into_owned()
    }
}

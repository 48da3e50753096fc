//! Mapping of raw child output onto a [`Response`]
//!
//! Every [`ProcessOutcome`] maps to exactly one response; nothing here can fail.

use crate::response::{ProcessOutcome, Response};
use serde_json::Value;

/// Captured stream text, decided once as JSON or plain text
#[derive(Debug, Clone, PartialEq)]
pub enum Captured {
    Structured(Value),
    Raw(String),
}

impl Captured {
    /// Parse the whole trimmed text as one JSON value, or else a final line
    /// holding an envelope (the runtime may print other lines before it)
    pub fn parse(text: &str) -> Self {
        let trimmed = text.trim();
        if let Ok(value) = serde_json::from_str::<Value>(trimmed) {
            return Captured::Structured(value);
        }

        let last_line = trimmed.lines().rev().map(str::trim).find(|l| !l.is_empty());
        if let Some(line) = last_line {
            if let Ok(value) = serde_json::from_str::<Value>(line) {
                if Response::from_envelope(&value).is_some() {
                    return Captured::Structured(value);
                }
            }
        }

        Captured::Raw(trimmed.to_string())
    }

    fn envelope(&self) -> Option<Response> {
        match self {
            Captured::Structured(value) => Response::from_envelope(value),
            Captured::Raw(_) => None,
        }
    }
}

/// Interpret one child run
pub fn normalize(outcome: &ProcessOutcome) -> Response {
    if outcome.timed_out {
        return Response::failure("runtime did not finish before the configured timeout");
    }

    let stdout = outcome.stdout_text();
    if outcome.exit_code == 0 {
        return match Captured::parse(&stdout) {
            Captured::Structured(value) => {
                Response::from_envelope(&value).unwrap_or(Response::Success { result: value })
            }
            Captured::Raw(text) => Response::success(text),
        };
    }

    let stderr = outcome.stderr_text();
    let stderr_empty = stderr.trim().is_empty();
    let primary = if stderr_empty { &stdout } else { &stderr };

    match Captured::parse(primary) {
        Captured::Structured(value) => {
            Response::from_envelope(&value).unwrap_or_else(|| Response::failure(json_text(value)))
        }
        Captured::Raw(text) => {
            // Failure envelopes go to stdout while the runtime may still have
            // written warnings to stderr. A success envelope from a child that
            // then exited non-zero is not trusted.
            if !stderr_empty {
                if let Some(response @ Response::Failure { .. }) = Captured::parse(&stdout).envelope() {
                    return response;
                }
            }
            if text.is_empty() {
                Response::failure(format!(
                    "runtime exited with status {} and no output",
                    outcome.exit_code
                ))
            } else {
                Response::failure(text)
            }
        }
    }
}

fn json_text(value: Value) -> String {
    match value {
        Value::String(text) => text,
        other => other.to_string(),
    }
}

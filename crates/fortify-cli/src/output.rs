//! Rendering of bridge responses for the terminal

use colored::Colorize;
use fortify_bridge::Response;
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
}

impl OutputFormat {
    /// Unrecognized names fall back to text
    pub fn from_name(name: &str) -> Self {
        if name.eq_ignore_ascii_case("json") {
            OutputFormat::Json
        } else {
            OutputFormat::Text
        }
    }
}

/// Flatten a result into `(label, value)` rows
///
/// Objects become one row per field; anything else is a single unlabeled row.
pub fn rows(value: &Value) -> Vec<(Option<String>, String)> {
    match value {
        Value::Object(map) => map
            .iter()
            .map(|(key, field)| (Some(key.clone()), scalar_text(field)))
            .collect(),
        other => vec![(None, scalar_text(other))],
    }
}

fn scalar_text(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// Render a response in the requested format
pub fn render(response: &Response, format: OutputFormat) -> Result<String, serde_json::Error> {
    if format == OutputFormat::Json {
        return serde_json::to_string_pretty(&response.to_envelope());
    }

    let text = match response {
        Response::Success { result } => rows(result)
            .into_iter()
            .map(|(label, text)| match label {
                Some(label) => format!("{}: {}", label.cyan(), text),
                None => text,
            })
            .collect::<Vec<_>>()
            .join("\n"),
        Response::Failure { error, .. } => error.clone(),
    };
    Ok(text)
}

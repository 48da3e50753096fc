//! `encrypt` and `decrypt`

use crate::commands::run_operation;
use crate::common::GlobalOpts;
use crate::errors::CliError;
use clap::Args;
use fortify_bridge::Operation;
use serde_json::{Map, Value};
use std::fs;
use std::path::PathBuf;

#[derive(Args, Debug, Clone)]
pub struct EncryptArgs {
    /// Plain text to encrypt
    #[arg(required_unless_present = "input_file", conflicts_with = "input_file")]
    pub data: Option<String>,
    /// Read the plain text from a file instead
    #[arg(short, long, value_name = "FILE")]
    pub input_file: Option<PathBuf>,
    #[arg(short, long)]
    pub key: String,
    /// Cipher (default from config)
    #[arg(short, long)]
    pub algorithm: Option<String>,
}

#[derive(Args, Debug, Clone)]
pub struct DecryptArgs {
    /// Encrypted payload, as printed by `encrypt --json` or as text
    pub data: String,
    #[arg(short, long)]
    pub key: String,
}

pub fn handle_encrypt(args: EncryptArgs, opts: &GlobalOpts) -> Result<(), CliError> {
    let config = opts.load_config()?;

    let data = match (args.data, args.input_file) {
        (Some(data), _) => data,
        (None, Some(path)) => fs::read_to_string(&path)?,
        (None, None) => {
            return Err(CliError::InvalidInput(
                "nothing to encrypt; pass DATA or --input-file".to_string(),
            ))
        }
    };

    let operation = Operation::Encrypt {
        data,
        key: args.key,
        algorithm: args
            .algorithm
            .unwrap_or_else(|| config.default_encryption_algorithm().to_string()),
        options: Map::new(),
    };
    run_operation(opts, &config, &operation)?;
    Ok(())
}

pub fn handle_decrypt(args: DecryptArgs, opts: &GlobalOpts) -> Result<(), CliError> {
    let config = opts.load_config()?;

    let operation = Operation::Decrypt {
        encrypted: encrypted_payload(&args.data),
        key: args.key,
        options: Map::new(),
    };
    run_operation(opts, &config, &operation)?;
    Ok(())
}

/// A JSON object (or a success envelope around one) is passed structured,
/// anything else as the raw text
fn encrypted_payload(text: &str) -> Value {
    match serde_json::from_str::<Value>(text.trim()) {
        Ok(Value::Object(mut map)) => {
            if map.get("success") == Some(&Value::Bool(true)) {
                if let Some(inner) = map.remove("result") {
                    return inner;
                }
            }
            Value::Object(map)
        }
        _ => Value::String(text.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_encrypted_payload_object() {
        let payload = encrypted_payload(r#"{"ciphertext":"abc","iv":"def"}"#);
        assert_eq!(payload, json!({ "ciphertext": "abc", "iv": "def" }));
    }

    #[test]
    fn test_encrypted_payload_unwraps_envelope() {
        let payload =
            encrypted_payload(r#"{"success":true,"result":{"ciphertext":"abc"}}"#);
        assert_eq!(payload, json!({ "ciphertext": "abc" }));
    }

    #[test]
    fn test_encrypted_payload_text() {
        assert_eq!(encrypted_payload("c2VjcmV0"), json!("c2VjcmV0"));
        assert_eq!(encrypted_payload("[1,2]"), json!("[1,2]"));
    }
}

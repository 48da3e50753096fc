use crate::commands::{options_from, run_operation};
use crate::common::GlobalOpts;
use crate::config_manager::Config;
use crate::errors::CliError;
use crate::logger;
use clap::Subcommand;
use fortify_bridge::Operation;
use serde_json::Value;
use std::fs;
use std::path::PathBuf;

#[derive(Subcommand, Debug, Clone)]
pub enum KeysAction {
    /// Generate a key pair or symmetric key
    Generate {
        /// Key type: ed25519, rsa or aes-<bits> (default from config)
        #[arg(short = 't', long = "type", value_name = "TYPE")]
        key_type: Option<String>,
        /// RSA modulus size in bits
        #[arg(short, long)]
        bits: Option<u32>,
        /// Store the generated key under this name in the key storage directory
        #[arg(short, long, value_name = "NAME")]
        save: Option<String>,
    },
}

pub fn handle_keys(action: KeysAction, opts: &GlobalOpts) -> Result<(), CliError> {
    let config = opts.load_config()?;

    match action {
        KeysAction::Generate {
            key_type,
            bits,
            save,
        } => {
            if let Some(ref name) = save {
                validate_key_name(name)?;
            }

            let operation = Operation::GenerateKey {
                key_type: key_type.unwrap_or_else(|| config.default_key_type().to_string()),
                options: options_from(vec![("bits", bits.map(Value::from))]),
            };
            let result = run_operation(opts, &config, &operation)?;

            if let Some(name) = save {
                let path = save_key(&config, &name, &result)?;
                logger::success(&format!("Saved key to {}", path.display()));
            }
            Ok(())
        }
    }
}

/// Key names become file names, so they may not contain path components
fn validate_key_name(name: &str) -> Result<(), CliError> {
    let valid = !name.is_empty()
        && name != "."
        && name != ".."
        && !name.contains(|c| c == '/' || c == '\\')
        && !name.starts_with('.');
    if valid {
        Ok(())
    } else {
        Err(CliError::InvalidInput(format!(
            "'{}' is not a valid key name",
            name
        )))
    }
}

fn save_key(config: &Config, name: &str, key: &Value) -> Result<PathBuf, CliError> {
    let dir = config.ensure_key_storage_path()?;
    let path = dir.join(format!("{}.json", name));
    fs::write(&path, serde_json::to_string_pretty(key)?)?;
    Ok(path)
}

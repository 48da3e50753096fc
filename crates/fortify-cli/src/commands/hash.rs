use crate::commands::{options_from, run_operation};
use crate::common::GlobalOpts;
use crate::errors::CliError;
use clap::Subcommand;
use fortify_bridge::Operation;
use serde_json::Value;

#[derive(Subcommand, Debug, Clone)]
pub enum HashAction {
    /// Hash a password
    Password {
        password: String,
        /// argon2id or pbkdf2 (default from config)
        #[arg(short, long)]
        algorithm: Option<String>,
        #[arg(long)]
        iterations: Option<u32>,
        /// Memory cost in KiB (argon2id)
        #[arg(long)]
        memory_cost: Option<u32>,
        #[arg(long)]
        parallelism: Option<u32>,
        #[arg(long)]
        salt: Option<String>,
        /// Output encoding of the hash, e.g. encoded, hex or base64
        #[arg(long)]
        encoding: Option<String>,
    },
    /// Check a password against a stored hash
    Verify { password: String, hash: String },
}

pub fn handle_hash(action: HashAction, opts: &GlobalOpts) -> Result<(), CliError> {
    let config = opts.load_config()?;

    let operation = match action {
        HashAction::Password {
            password,
            algorithm,
            iterations,
            memory_cost,
            parallelism,
            salt,
            encoding,
        } => Operation::HashPassword {
            password,
            algorithm: algorithm
                .unwrap_or_else(|| config.default_hash_algorithm().to_string()),
            options: options_from(vec![
                ("iterations", iterations.map(Value::from)),
                ("memoryCost", memory_cost.map(Value::from)),
                ("parallelism", parallelism.map(Value::from)),
                ("salt", salt.map(Value::from)),
                ("format", encoding.map(Value::from)),
            ]),
        },
        HashAction::Verify { password, hash } => Operation::VerifyPassword { password, hash },
    };

    run_operation(opts, &config, &operation)?;
    Ok(())
}

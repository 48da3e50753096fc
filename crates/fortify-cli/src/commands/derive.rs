use crate::commands::{options_from, run_operation};
use crate::common::GlobalOpts;
use crate::errors::CliError;
use clap::Args;
use fortify_bridge::Operation;
use serde_json::Value;

/// Memory-hard key derivation
#[derive(Args, Debug, Clone)]
pub struct DeriveArgs {
    pub password: String,
    /// argon2id or balloon
    #[arg(short, long, default_value = "argon2id")]
    pub algorithm: String,
    /// Memory cost in KiB
    #[arg(long)]
    pub memory_cost: Option<u32>,
    #[arg(long)]
    pub time_cost: Option<u32>,
    #[arg(long)]
    pub parallelism: Option<u32>,
    /// Derived key length in bytes
    #[arg(long)]
    pub output_length: Option<u32>,
    #[arg(long)]
    pub salt: Option<String>,
}

pub fn handle_derive(args: DeriveArgs, opts: &GlobalOpts) -> Result<(), CliError> {
    let config = opts.load_config()?;

    let operation = Operation::DeriveKey {
        password: args.password,
        algorithm: args.algorithm,
        options: options_from(vec![
            ("memoryCost", args.memory_cost.map(Value::from)),
            ("timeCost", args.time_cost.map(Value::from)),
            ("parallelism", args.parallelism.map(Value::from)),
            ("outputLength", args.output_length.map(Value::from)),
            ("salt", args.salt.map(Value::from)),
        ]),
    };
    run_operation(opts, &config, &operation)?;
    Ok(())
}

use crate::commands::{options_from, run_operation};
use crate::common::GlobalOpts;
use crate::errors::CliError;
use clap::Subcommand;
use fortify_bridge::Operation;
use serde_json::Value;

#[derive(Subcommand, Debug, Clone)]
pub enum TokensAction {
    /// Generate an API key, session token, JWT or generic random token
    Generate {
        /// api, session, jwt or generic
        #[arg(short = 't', long = "type", value_name = "TYPE", default_value = "api")]
        token_type: String,
        /// Token length in bytes
        #[arg(long)]
        length: Option<u32>,
        /// JWT signing secret; generated when omitted
        #[arg(long)]
        secret: Option<String>,
        /// JWT lifetime, e.g. 1h or 30m
        #[arg(long)]
        expires_in: Option<String>,
        /// JWT payload as a JSON object
        #[arg(long, value_name = "JSON")]
        payload: Option<String>,
    },
}

pub fn handle_tokens(action: TokensAction, opts: &GlobalOpts) -> Result<(), CliError> {
    let config = opts.load_config()?;

    match action {
        TokensAction::Generate {
            token_type,
            length,
            secret,
            expires_in,
            payload,
        } => {
            let payload = payload.as_deref().map(parse_payload).transpose()?;
            let operation = Operation::GenerateToken {
                token_type,
                options: options_from(vec![
                    ("length", length.map(Value::from)),
                    ("secret", secret.map(Value::from)),
                    ("expiresIn", expires_in.map(Value::from)),
                    ("payload", payload),
                ]),
            };
            run_operation(opts, &config, &operation)?;
            Ok(())
        }
    }
}

fn parse_payload(text: &str) -> Result<Value, CliError> {
    match serde_json::from_str::<Value>(text) {
        Ok(value @ Value::Object(_)) => Ok(value),
        Ok(_) => Err(CliError::InvalidInput(
            "--payload must be a JSON object".to_string(),
        )),
        Err(e) => Err(CliError::InvalidInput(format!(
            "--payload is not valid JSON: {}",
            e
        ))),
    }
}

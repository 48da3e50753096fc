pub mod config;
pub mod crypto;
pub mod derive;
pub mod hash;
pub mod keys;
pub mod runtime;
pub mod tokens;

use crate::common::GlobalOpts;
use crate::config_manager::Config;
use crate::errors::CliError;
use crate::logger;
use crate::output::{self, OutputFormat};
use fortify_bridge::{Bridge, Operation, Response};
use serde_json::{Map, Value};

/// Probe the runtime and resolve the library for this invocation
pub fn connect(opts: &GlobalOpts, config: &Config) -> Result<Bridge, CliError> {
    let options = opts.bridge_options(config);
    logger::debug(&format!(
        "Connecting to runtime '{}' (timeout: {:?})",
        options.runtime.display(),
        options.timeout
    ));
    Ok(Bridge::new(options)?)
}

/// Run one operation and print its outcome
///
/// Returns the result value on success. A failure response is printed only in
/// JSON mode; in text mode it surfaces through the returned error.
pub fn run_operation(
    opts: &GlobalOpts,
    config: &Config,
    operation: &Operation,
) -> Result<Value, CliError> {
    let bridge = connect(opts, config)?;
    let format = opts.output_format(config);

    logger::spinner_start(&format!("Running {}", operation.name()));
    let response = match bridge.run_operation(operation) {
        Ok(response) => response,
        Err(e) => {
            logger::spinner_error(&format!("{} could not run", operation.name()));
            return Err(e.into());
        }
    };
    logger::spinner_stop();

    if response.is_success() || format == OutputFormat::Json {
        println!("{}", output::render(&response, format)?);
    }

    match response {
        Response::Success { result } => Ok(result),
        Response::Failure { error, stack } => {
            if let Some(stack) = stack {
                logger::debug(&format!("Runtime stack:\n{}", stack));
            }
            Err(CliError::Operation {
                operation: operation.name().to_string(),
                message: error,
            })
        }
    }
}

/// Collect `Some` values into an options object under their library names
pub(crate) fn options_from(pairs: Vec<(&str, Option<Value>)>) -> Map<String, Value> {
    pairs
        .into_iter()
        .filter_map(|(key, value)| value.map(|v| (key.to_string(), v)))
        .collect()
}

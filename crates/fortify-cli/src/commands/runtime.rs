use crate::commands::connect;
use crate::common::GlobalOpts;
use crate::errors::CliError;
use crate::output::OutputFormat;
use clap::Subcommand;
use colored::Colorize;
use serde_json::json;

#[derive(Subcommand, Debug, Clone)]
pub enum RuntimeAction {
    /// Probe the runtime and show where the library will be loaded from
    Show,
}

pub fn handle_runtime(action: RuntimeAction, opts: &GlobalOpts) -> Result<(), CliError> {
    let config = opts.load_config()?;

    match action {
        RuntimeAction::Show => {
            let bridge = connect(opts, &config)?;
            let runtime = bridge.runtime();
            let library = bridge.library();

            if opts.output_format(&config) == OutputFormat::Json {
                let report = json!({
                    "runtime": runtime.executable.display().to_string(),
                    "version": runtime.version,
                    "library": library.path().map(|p| p.display().to_string()),
                    "library_source": library.kind(),
                });
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                println!("{}: {}", "runtime".cyan(), runtime.executable.display());
                println!("{}: {}", "version".cyan(), runtime.version);
                println!("{}: {}", "library".cyan(), library);
            }
        }
    }
    Ok(())
}

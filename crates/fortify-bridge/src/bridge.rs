//! The bridge: probe once, resolve once, then compose → run → normalize per call

use crate::composer::{InvocationRequest, ScriptComposer};
use crate::errors::BridgeError;
use crate::executor::ProcessExecutor;
use crate::normalizer::normalize;
use crate::operations::Operation;
use crate::resolver::{LibraryLocation, LibraryResolver};
use crate::response::Response;
use crate::runtime::{self, RuntimeInfo, DEFAULT_PROBE_TIMEOUT};
use fortify_logger as logger;
use serde_json::{Map, Value};
use std::path::PathBuf;
use std::time::{Duration, Instant};
use tracing::debug;

/// Fully-resolved settings for one bridge instance
///
/// The bridge reads nothing from global configuration; callers merge config
/// files and flags into this value before construction.
#[derive(Debug, Clone)]
pub struct BridgeOptions {
    /// Runtime binary name or path
    pub runtime: PathBuf,
    /// Arguments for the availability probe
    pub probe_args: Vec<String>,
    pub probe_timeout: Duration,
    /// Optional library location, checked before the default search
    pub library_hint: Option<PathBuf>,
    /// Package name for `node_modules` lookups and the second load stage
    pub package_name: String,
    /// Load the installed package by name instead of searching for a path
    pub prefer_installed: bool,
    /// Bounded wait per invocation; `None` waits for the child indefinitely
    pub timeout: Option<Duration>,
    /// Directory for script files; the system temp directory when `None`
    pub temp_dir: Option<PathBuf>,
}

impl Default for BridgeOptions {
    fn default() -> Self {
        Self {
            runtime: PathBuf::from("node"),
            probe_args: vec!["--version".to_string()],
            probe_timeout: DEFAULT_PROBE_TIMEOUT,
            library_hint: None,
            package_name: "fortifyjs".to_string(),
            prefer_installed: false,
            timeout: None,
            temp_dir: None,
        }
    }
}

#[derive(Debug)]
pub struct Bridge {
    runtime: RuntimeInfo,
    library: LibraryLocation,
    composer: ScriptComposer,
    executor: ProcessExecutor,
}

impl Bridge {
    /// Probe the runtime and resolve the library relative to the working
    /// directory and the running executable
    pub fn new(options: BridgeOptions) -> Result<Self, BridgeError> {
        let resolver = LibraryResolver::from_env(&options.package_name)?;
        Self::with_resolver(options, resolver)
    }

    pub fn with_resolver(
        options: BridgeOptions,
        resolver: LibraryResolver,
    ) -> Result<Self, BridgeError> {
        let runtime = runtime::probe(&options.runtime, &options.probe_args, options.probe_timeout)?;

        let library = resolver
            .prefer_installed(options.prefer_installed)
            .resolve(options.library_hint.as_deref());
        logger::debug(&format!("Library location: {}", library));

        let executor = ProcessExecutor::new(&runtime.executable)
            .with_temp_dir(options.temp_dir)
            .with_timeout(options.timeout);

        Ok(Self {
            runtime,
            library,
            composer: ScriptComposer::new(options.package_name),
            executor,
        })
    }

    pub fn runtime(&self) -> &RuntimeInfo {
        &self.runtime
    }

    pub fn library(&self) -> &LibraryLocation {
        &self.library
    }

    /// Run one request in a fresh child process
    ///
    /// Errors only when the script file cannot be written or the runtime cannot
    /// be launched; everything the child does is reported as a [`Response`].
    pub fn invoke(&self, request: &InvocationRequest) -> Result<Response, BridgeError> {
        let started = Instant::now();
        let script = self.composer.compose(request, &self.library);
        let outcome = self.executor.run(&script)?;
        let response = normalize(&outcome);

        debug!(
            success = response.is_success(),
            exit_code = outcome.exit_code,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "bridge invocation finished"
        );
        Ok(response)
    }

    /// Run an operation body with the given input
    ///
    /// The body runs with the runtime's full privileges; never pass text
    /// that came from an untrusted source.
    pub fn execute(&self, body: &str, input: Map<String, Value>) -> Result<Response, BridgeError> {
        self.invoke(&InvocationRequest::new(body, input))
    }

    pub fn run_operation(&self, operation: &Operation) -> Result<Response, BridgeError> {
        logger::debug(&format!("Running operation '{}'", operation.name()));
        self.invoke(&operation.to_request())
    }
}

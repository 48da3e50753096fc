//! Bridge between Rust callers and the FortifyJS library running under Node.js
//!
//! Each call is composed into a standalone script, run in a fresh child
//! process, and its output normalized into a [`Response`]:
//! 1. The runtime is probed and the library located once, at construction
//! 2. Every invocation writes a scoped temp script, runs it and cleans it up
//! 3. Output is interpreted into exactly one success or failure value
//!
//! Nothing here reads global configuration; see [`BridgeOptions`].

mod bridge;
pub mod composer;
pub mod errors;
pub mod executor;
pub mod normalizer;
pub mod operations;
pub mod resolver;
pub mod response;
pub mod runtime;

pub use bridge::{Bridge, BridgeOptions};
pub use composer::{
    ComposedScript, InvocationRequest, ScriptComposer, ENTRY_VERSION, FAILURE_EXIT_CODE,
    LIBRARY_LOAD_EXIT_CODE,
};
pub use errors::BridgeError;
pub use executor::ProcessExecutor;
pub use normalizer::{normalize, Captured};
pub use operations::{Operation, OperationOptions};
pub use resolver::{LibraryLocation, LibraryResolver};
pub use response::{ProcessOutcome, Response, UNKNOWN_ERROR};
pub use runtime::{probe, RuntimeInfo, DEFAULT_PROBE_TIMEOUT};

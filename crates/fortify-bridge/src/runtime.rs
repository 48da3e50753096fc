//! Runtime availability probe, run once when a bridge is constructed

use crate::errors::BridgeError;
use crate::executor::wait_with_deadline;
use fortify_logger as logger;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::time::{Duration, Instant};

/// Default bounded wait for the probe process
pub const DEFAULT_PROBE_TIMEOUT: Duration = Duration::from_secs(10);

/// A runtime that answered the probe
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuntimeInfo {
    /// Absolute path of the runtime binary
    pub executable: PathBuf,
    /// First line the probe printed, e.g. `v20.11.1`
    pub version: String,
}

/// Locate `runtime` and run it with `args`, e.g. `node --version`
///
/// Fails with [`BridgeError::RuntimeUnavailable`] if the binary cannot be
/// found, does not start, exits unsuccessfully or outlives `timeout`.
pub fn probe(runtime: &Path, args: &[String], timeout: Duration) -> Result<RuntimeInfo, BridgeError> {
    let name = runtime.display().to_string();
    let executable = which::which(runtime)
        .map_err(|e| BridgeError::unavailable(&name, format!("{}", e)))?;

    logger::debug(&format!("Probing runtime at {}", executable.display()));

    let mut child = Command::new(&executable)
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .spawn()
        .map_err(|e| BridgeError::unavailable(&name, format!("failed to execute: {}", e)))?;

    let deadline = Instant::now().checked_add(timeout);
    let (status, timed_out) = wait_with_deadline(&mut child, deadline)
        .map_err(|e| BridgeError::unavailable(&name, format!("probe failed: {}", e)))?;

    if timed_out {
        return Err(BridgeError::unavailable(
            &name,
            format!("no answer within {:?}", timeout),
        ));
    }
    if !status.success() {
        return Err(BridgeError::unavailable(
            &name,
            format!("probe exited with {}", status),
        ));
    }

    let mut stdout = String::new();
    if let Some(mut out) = child.stdout.take() {
        let _ = out.read_to_string(&mut stdout);
    }
    let version = stdout.lines().next().unwrap_or_default().trim().to_string();

    logger::debug(&format!("Runtime {} reports version '{}'", executable.display(), version));
    Ok(RuntimeInfo {
        executable,
        version,
    })
}

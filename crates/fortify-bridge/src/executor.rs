//! Child-process execution of composed scripts
//!
//! Each run owns a uniquely named temporary script file. The file is held by a
//! [`TempPath`] guard, so it is removed when `run` returns by any path:
//! success, non-zero exit, spawn failure, collection failure or panic.

use crate::composer::ComposedScript;
use crate::errors::BridgeError;
use crate::response::ProcessOutcome;
use fortify_logger as logger;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use std::process::{Child, Command, ExitStatus, Stdio};
use std::thread;
use std::time::{Duration, Instant};
use tempfile::TempPath;
use tracing::debug;

const SCRIPT_PREFIX: &str = "fortify-";
const SCRIPT_SUFFIX: &str = ".js";
const POLL_INTERVAL: Duration = Duration::from_millis(5);

#[derive(Debug, Clone)]
pub struct ProcessExecutor {
    runtime: PathBuf,
    temp_dir: Option<PathBuf>,
    timeout: Option<Duration>,
}

impl ProcessExecutor {
    pub fn new(runtime: impl Into<PathBuf>) -> Self {
        Self {
            runtime: runtime.into(),
            temp_dir: None,
            timeout: None,
        }
    }

    /// Create script files in `dir` instead of the system temp directory
    pub fn with_temp_dir(mut self, dir: Option<PathBuf>) -> Self {
        self.temp_dir = dir;
        self
    }

    /// Kill the child if it has not exited within `timeout`
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn runtime(&self) -> &Path {
        &self.runtime
    }

    pub fn run(&self, script: &ComposedScript) -> Result<ProcessOutcome, BridgeError> {
        let resource = self.write_script(script)?;
        debug!(script = %resource.display(), runtime = %self.runtime.display(), "launching runtime");

        let started = Instant::now();
        let mut child = Command::new(&self.runtime)
            .arg(resource.as_os_str())
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|source| BridgeError::Launch {
                program: self.runtime.display().to_string(),
                source,
            })?;

        let deadline = self.timeout.and_then(|t| started.checked_add(t));
        let outcome = collect(&mut child, deadline).map_err(|e| {
            let _ = child.kill();
            let _ = child.wait();
            BridgeError::Io(e)
        })?;

        debug!(
            exit_code = outcome.exit_code,
            timed_out = outcome.timed_out,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "runtime exited"
        );
        logger::capture_streams(
            &format!("{} {}", self.runtime.display(), resource.display()),
            outcome.exit_code,
            &outcome.stdout,
            &outcome.stderr,
        );

        drop(resource);
        Ok(outcome)
    }

    fn write_script(&self, script: &ComposedScript) -> Result<TempPath, BridgeError> {
        let mut builder = tempfile::Builder::new();
        builder.prefix(SCRIPT_PREFIX).suffix(SCRIPT_SUFFIX);

        let mut file = match self.temp_dir {
            Some(ref dir) => builder.tempfile_in(dir),
            None => builder.tempfile(),
        }
        .map_err(BridgeError::Resource)?;

        file.write_all(script.as_bytes())
            .and_then(|()| file.flush())
            .map_err(BridgeError::Resource)?;

        // Close the handle before launch; the path guard still owns deletion.
        Ok(file.into_temp_path())
    }
}

fn collect(child: &mut Child, deadline: Option<Instant>) -> io::Result<ProcessOutcome> {
    let stdout = child
        .stdout
        .take()
        .ok_or_else(|| io::Error::new(io::ErrorKind::Other, "child stdout was not captured"))?;
    let stderr = child
        .stderr
        .take()
        .ok_or_else(|| io::Error::new(io::ErrorKind::Other, "child stderr was not captured"))?;

    let stdout_thread = thread::spawn(move || read_all(stdout));
    let stderr_thread = thread::spawn(move || read_all(stderr));

    let (status, timed_out) = wait_with_deadline(child, deadline)?;

    let stdout = join_reader(stdout_thread, "stdout")?;
    let stderr = join_reader(stderr_thread, "stderr")?;

    Ok(ProcessOutcome {
        exit_code: exit_code(status),
        stdout,
        stderr,
        timed_out,
    })
}

/// Join a pipe reader; a panicked reader is an I/O failure, never empty output
fn join_reader(
    handle: thread::JoinHandle<io::Result<Vec<u8>>>,
    stream: &str,
) -> io::Result<Vec<u8>> {
    handle.join().map_err(|_| {
        io::Error::new(
            io::ErrorKind::Other,
            format!("{} reader thread panicked", stream),
        )
    })?
}

fn read_all<R: Read>(mut reader: R) -> io::Result<Vec<u8>> {
    let mut buf = Vec::new();
    reader.read_to_end(&mut buf)?;
    Ok(buf)
}

/// Wait for the child, killing it once `deadline` passes
///
/// Returns the exit status and whether the deadline forced termination.
pub(crate) fn wait_with_deadline(
    child: &mut Child,
    deadline: Option<Instant>,
) -> io::Result<(ExitStatus, bool)> {
    let Some(deadline) = deadline else {
        return Ok((child.wait()?, false));
    };

    loop {
        if let Some(status) = child.try_wait()? {
            return Ok((status, false));
        }
        if Instant::now() >= deadline {
            let _ = child.kill();
            let status = child.wait()?;
            return Ok((status, true));
        }
        thread::sleep(POLL_INTERVAL);
    }
}

fn exit_code(status: ExitStatus) -> i32 {
    if let Some(code) = status.code() {
        return code;
    }

    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt as _;
        if let Some(signal) = status.signal() {
            return 128 + signal;
        }
    }

    1
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn is_empty_dir(dir: &Path) -> bool {
        std::fs::read_dir(dir).is_ok_and(|mut entries| entries.next().is_none())
    }

    #[test]
    fn test_panicked_reader_is_io_error() {
        let handle = thread::spawn(|| -> io::Result<Vec<u8>> { panic!("reader failed") });
        let result = join_reader(handle, "stdout");
        assert!(result.is_err_and(|e| e.to_string() == "stdout reader thread panicked"));
    }

    #[test]
    fn test_reader_output_passes_through() {
        let handle = thread::spawn(|| read_all(&b"captured"[..]));
        assert!(join_reader(handle, "stderr").is_ok_and(|buf| buf == b"captured"));
    }

    #[test]
    fn test_launch_failure_cleans_up() {
        let Ok(dir) = TempDir::new() else {
            return;
        };
        let executor = ProcessExecutor::new("/definitely/not/a/runtime-12345")
            .with_temp_dir(Some(dir.path().to_path_buf()));

        let result = executor.run(&ComposedScript::from_text("console.log(1)"));
        assert!(matches!(result, Err(BridgeError::Launch { .. })));
        assert!(is_empty_dir(dir.path()));
    }

    #[test]
    fn test_missing_temp_dir_is_resource_error() {
        let executor = ProcessExecutor::new("sh")
            .with_temp_dir(Some(PathBuf::from("/definitely/not/a/dir-12345")));
        let result = executor.run(&ComposedScript::from_text("exit 0"));
        assert!(matches!(result, Err(BridgeError::Resource(_))));
    }

    #[cfg(unix)]
    #[test]
    fn test_script_file_is_named_and_readable() {
        let Ok(dir) = TempDir::new() else {
            return;
        };
        let executor = ProcessExecutor::new("sh").with_temp_dir(Some(dir.path().to_path_buf()));
        let script = ComposedScript::from_text("basename \"$0\"; cat \"$0\" | wc -l");

        let outcome = executor.run(&script);
        assert!(outcome.is_ok());
        let Ok(outcome) = outcome else {
            return;
        };
        let stdout = outcome.stdout_text();
        let mut lines = stdout.lines();
        let name = lines.next().unwrap_or_default();
        assert!(name.starts_with(SCRIPT_PREFIX) && name.ends_with(SCRIPT_SUFFIX));
        assert_eq!(lines.next().map(str::trim), Some("0"));
        assert!(is_empty_dir(dir.path()));
    }

    #[cfg(unix)]
    #[test]
    fn test_signal_exit_code() {
        let executor = ProcessExecutor::new("sh");
        let outcome = executor.run(&ComposedScript::from_text("kill -9 $$"));
        assert!(outcome.is_ok_and(|o| o.exit_code == 128 + 9 && !o.timed_out));
    }
}

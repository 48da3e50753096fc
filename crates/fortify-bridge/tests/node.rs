//! End-to-end tests against a real Node.js runtime
//!
//! Each test returns early when `node` is not on PATH.

use fortify_bridge::{
    Bridge, BridgeOptions, InvocationRequest, LibraryLocation, LibraryResolver, Operation,
    ProcessExecutor, Response, ScriptComposer, LIBRARY_LOAD_EXIT_CODE,
};
use serde_json::{json, Map, Value};
use std::fs;
use std::path::Path;
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};
use tempfile::TempDir;

type TestResult = Result<(), Box<dyn std::error::Error>>;

const FAKE_LIBRARY: &str = r#"
module.exports = {
  generateKeyPair(type, options) {
    return { publicKey: 'pub-' + type, privateKey: 'priv-' + type, options };
  },
  generateSecureToken(length) {
    return 'x'.repeat(length * 2);
  },
};
"#;

const MISSING_PACKAGE: &str = "fortify-no-such-package-12345";

fn node_available() -> bool {
    which::which("node").is_ok()
}

fn object(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        _ => Map::new(),
    }
}

fn is_empty_dir(dir: &Path) -> bool {
    fs::read_dir(dir).is_ok_and(|mut entries| entries.next().is_none())
}

/// Bridge whose library hint is `<root>/lib`, scripts going to `<root>/scratch`
fn bridge_with_library(root: &Path, library: Option<&str>) -> Result<Bridge, Box<dyn std::error::Error>> {
    bridge_with_timeout(root, library, None)
}

fn bridge_with_timeout(
    root: &Path,
    library: Option<&str>,
    timeout: Option<Duration>,
) -> Result<Bridge, Box<dyn std::error::Error>> {
    let lib_dir = root.join("lib");
    let scratch = root.join("scratch");
    fs::create_dir_all(&lib_dir)?;
    fs::create_dir_all(&scratch)?;
    if let Some(source) = library {
        fs::write(lib_dir.join("index.js"), source)?;
    }

    let options = BridgeOptions {
        library_hint: Some(lib_dir),
        package_name: MISSING_PACKAGE.to_string(),
        temp_dir: Some(scratch),
        timeout,
        ..BridgeOptions::default()
    };
    let resolver = LibraryResolver::new(options.package_name.clone(), root, root);
    Ok(Bridge::with_resolver(options, resolver)?)
}

#[test]
fn test_input_survives_round_trip() -> TestResult {
    if !node_available() {
        return Ok(());
    }
    let root = TempDir::new()?;
    let bridge = bridge_with_library(root.path(), Some(FAKE_LIBRARY))?;
    assert!(matches!(bridge.library(), LibraryLocation::Found(_)));

    let input = json!({
        "quotes": "it's \"quoted\" `tick` ${notTemplate}",
        "backslash": "C:\\Users\\me\\",
        "newlines": "a\nb\r\nc\u{2028}d",
        "unicode": "ключ 🔑",
        "__proto__": { "polluted": true },
        "nested": { "list": [1, 2.5, null, true] }
    });

    let response = bridge.execute("respond(inputData);", object(input.clone()))?;

    assert_eq!(response, Response::success(input));
    Ok(())
}

#[test]
fn test_operation_runs_against_library() -> TestResult {
    if !node_available() {
        return Ok(());
    }
    let root = TempDir::new()?;
    let bridge = bridge_with_library(root.path(), Some(FAKE_LIBRARY))?;

    let response = bridge.run_operation(&Operation::GenerateKey {
        key_type: "ed25519".to_string(),
        options: Map::new(),
    })?;
    assert_eq!(
        response,
        Response::success(json!({
            "publicKey": "pub-ed25519",
            "privateKey": "priv-ed25519",
            "type": "ed25519"
        }))
    );

    let response = bridge.run_operation(&Operation::GenerateKey {
        key_type: "dsa".to_string(),
        options: Map::new(),
    })?;
    assert!(
        matches!(response, Response::Failure { ref error, .. } if error == "Unsupported key type: dsa")
    );
    assert!(is_empty_dir(&root.path().join("scratch")));
    Ok(())
}

#[test]
fn test_thrown_error_is_failure_with_stack() -> TestResult {
    if !node_available() {
        return Ok(());
    }
    let root = TempDir::new()?;
    let bridge = bridge_with_library(root.path(), Some(FAKE_LIBRARY))?;

    let response = bridge.execute("throw new Error('kaboom');", Map::new())?;

    let Response::Failure { error, stack } = response else {
        return Err("expected a failure response".into());
    };
    assert_eq!(error, "kaboom");
    assert!(stack.is_some_and(|s| s.contains("kaboom")));
    Ok(())
}

#[test]
fn test_unloadable_library_is_failure() -> TestResult {
    if !node_available() {
        return Ok(());
    }
    let root = TempDir::new()?;
    let bridge = bridge_with_library(root.path(), None)?;

    let response = bridge.execute("respond(1);", Map::new())?;

    let Response::Failure { error, .. } = response else {
        return Err("expected a failure response".into());
    };
    assert!(error.contains("Error loading"));

    let script = ScriptComposer::new(MISSING_PACKAGE).compose(
        &InvocationRequest::new("respond(1);", Map::new()),
        bridge.library(),
    );
    let outcome = ProcessExecutor::new(&bridge.runtime().executable)
        .with_temp_dir(Some(root.path().join("scratch")))
        .run(&script)?;
    assert_eq!(outcome.exit_code, LIBRARY_LOAD_EXIT_CODE);
    assert!(outcome.stdout.is_empty());
    assert!(String::from_utf8_lossy(&outcome.stderr).contains("Error loading"));
    Ok(())
}

#[test]
fn test_open_handle_does_not_block_failure() -> TestResult {
    if !node_available() {
        return Ok(());
    }
    let root = TempDir::new()?;
    let timeout = Duration::from_secs(20);
    let bridge = bridge_with_timeout(root.path(), Some(FAKE_LIBRARY), Some(timeout))?;
    let started = Instant::now();

    let response = bridge.execute(
        "setInterval(() => {}, 1000);\nthrow new Error('kaboom');",
        Map::new(),
    )?;

    let Response::Failure { error, .. } = response else {
        return Err("expected a failure response".into());
    };
    assert_eq!(error, "kaboom");
    assert!(started.elapsed() < timeout / 2);
    Ok(())
}

#[test]
fn test_concurrent_invocations_through_one_bridge() -> TestResult {
    if !node_available() {
        return Ok(());
    }
    let root = TempDir::new()?;
    let bridge = Arc::new(bridge_with_library(root.path(), Some(FAKE_LIBRARY))?);

    let handles: Vec<_> = (0..8)
        .map(|id| {
            let bridge = Arc::clone(&bridge);
            thread::spawn(move || {
                let response = bridge
                    .execute("respond({ id: inputData.id });", object(json!({ "id": id })))
                    .ok();
                (id, response)
            })
        })
        .collect();

    for handle in handles {
        let (id, response) = handle.join().map_err(|_| "invocation thread panicked")?;
        assert_eq!(response, Some(Response::success(json!({ "id": id }))));
    }
    assert!(is_empty_dir(&root.path().join("scratch")));
    Ok(())
}

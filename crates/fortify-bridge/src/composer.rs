//! Script composition
//!
//! Turns an [`InvocationRequest`] into a self-contained Node.js script. This is
//! pure text assembly: equal requests and locations always produce
//! byte-identical scripts.
//!
//! # Trust contract
//!
//! `operation_body` is inserted verbatim and runs with the full privileges of
//! the runtime. Only fixed, trusted bodies (see [`crate::operations`]) may be
//! passed here; user-supplied values belong in `input`.

use crate::resolver::LibraryLocation;
use serde_json::{Map, Value};

/// Version tag written into the script header
pub const ENTRY_VERSION: u32 = 1;

/// Exit code of a script whose library could not be loaded by any stage
pub const LIBRARY_LOAD_EXIT_CODE: i32 = 78;

/// Exit code of a script whose operation body raised
pub const FAILURE_EXIT_CODE: i32 = 1;

/// One call's worth of work for the bridge
#[derive(Debug, Clone, PartialEq)]
pub struct InvocationRequest {
    pub operation_body: String,
    pub input: Map<String, Value>,
}

impl InvocationRequest {
    pub fn new(operation_body: impl Into<String>, input: Map<String, Value>) -> Self {
        Self {
            operation_body: operation_body.into(),
            input,
        }
    }
}

/// Fully assembled script text, consumed once by the executor
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComposedScript(String);

impl ComposedScript {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }

    /// Wrap text that was assembled elsewhere, e.g. a script for another runtime
    pub fn from_text(text: impl Into<String>) -> Self {
        ComposedScript(text.into())
    }
}

const PRELUDE: &str = "'use strict';
const path = require('path');
const fs = require('fs');
";

const HELPERS: &str = "
function respond(result) {
  process.stdout.write(JSON.stringify({ success: true, result: result }) + '\\n');
}

function loadLibrary() {
  const errors = [];
  if (libraryPath !== null) {
    try {
      return require(path.join(libraryPath, 'index.js'));
    } catch (e) {
      errors.push('Error loading library from ' + libraryPath + ': ' + e.message);
    }
  }
  try {
    return require(packageName);
  } catch (e) {
    errors.push('Error loading package ' + packageName + ': ' + e.message);
  }
  process.stderr.write(errors.join('\\n') + '\\n', () => process.exit(LIBRARY_LOAD_EXIT_CODE));
  return undefined;
}

const FortifyJS = loadLibrary();

async function main() {
";

const EPILOGUE: &str = "
}

if (FortifyJS !== undefined) {
  main().catch((error) => {
    const failure = {
      success: false,
      error: error instanceof Error ? error.message : String(error),
      stack: error instanceof Error ? error.stack : undefined,
    };
    process.stdout.write(JSON.stringify(failure) + '\\n', () => process.exit(FAILURE_EXIT_CODE));
  });
}
";

#[derive(Debug, Clone)]
pub struct ScriptComposer {
    package_name: String,
}

impl ScriptComposer {
    pub fn new(package_name: impl Into<String>) -> Self {
        Self {
            package_name: package_name.into(),
        }
    }

    pub fn package_name(&self) -> &str {
        &self.package_name
    }

    pub fn compose(&self, request: &InvocationRequest, library: &LibraryLocation) -> ComposedScript {
        // The input travels as a string literal handed to JSON.parse, so any
        // payload survives exactly, including keys like __proto__.
        let input_json = Value::Object(request.input.clone()).to_string();
        let library_literal = match library.path() {
            Some(path) => js_string(&path.to_string_lossy()),
            None => "null".to_string(),
        };

        let mut script = String::with_capacity(
            PRELUDE.len() + HELPERS.len() + EPILOGUE.len() + request.operation_body.len() + 512,
        );
        script.push_str(&format!("// fortify bridge entry v{}\n", ENTRY_VERSION));
        script.push_str(PRELUDE);
        script.push('\n');
        script.push_str(&format!(
            "const LIBRARY_LOAD_EXIT_CODE = {};\n",
            LIBRARY_LOAD_EXIT_CODE
        ));
        script.push_str(&format!("const FAILURE_EXIT_CODE = {};\n", FAILURE_EXIT_CODE));
        script.push_str(&format!(
            "const inputData = JSON.parse({});\n",
            js_string(&input_json)
        ));
        script.push_str(&format!("const libraryPath = {};\n", library_literal));
        script.push_str(&format!(
            "const packageName = {};\n",
            js_string(&self.package_name)
        ));
        script.push_str(HELPERS);
        script.push_str(&request.operation_body);
        script.push_str(EPILOGUE);

        ComposedScript(script)
    }
}

/// Quote text as a JavaScript string literal (JSON string syntax is a subset)
fn js_string(text: &str) -> String {
    Value::String(text.to_string()).to_string()
}

//! Fixed operation catalogue
//!
//! Each operation is a discriminator plus parameters. Its body is a versioned
//! script compiled into the binary, so user-supplied values only ever reach the
//! runtime as JSON input, never as code.

use crate::composer::InvocationRequest;
use serde_json::{Map, Value};

const GENERATE_KEY: &str = include_str!("../../js/generate_key.js");
const HASH_PASSWORD: &str = include_str!("../../js/hash_password.js");
const VERIFY_PASSWORD: &str = include_str!("../../js/verify_password.js");
const ENCRYPT: &str = include_str!("../../js/encrypt.js");
const DECRYPT: &str = include_str!("../../js/decrypt.js");
const GENERATE_TOKEN: &str = include_str!("../../js/generate_token.js");
const DERIVE_KEY: &str = include_str!("../../js/derive_key.js");

/// Extra per-operation options, passed through to the library as-is
pub type OperationOptions = Map<String, Value>;

#[derive(Debug, Clone, PartialEq)]
pub enum Operation {
    GenerateKey {
        key_type: String,
        options: OperationOptions,
    },
    HashPassword {
        password: String,
        algorithm: String,
        options: OperationOptions,
    },
    VerifyPassword {
        password: String,
        hash: String,
    },
    Encrypt {
        data: String,
        key: String,
        algorithm: String,
        options: OperationOptions,
    },
    Decrypt {
        /// An encrypted payload object or its textual form
        encrypted: Value,
        key: String,
        options: OperationOptions,
    },
    GenerateToken {
        token_type: String,
        options: OperationOptions,
    },
    DeriveKey {
        password: String,
        algorithm: String,
        options: OperationOptions,
    },
}

impl Operation {
    pub fn name(&self) -> &'static str {
        match self {
            Operation::GenerateKey { .. } => "generate_key",
            Operation::HashPassword { .. } => "hash_password",
            Operation::VerifyPassword { .. } => "verify_password",
            Operation::Encrypt { .. } => "encrypt",
            Operation::Decrypt { .. } => "decrypt",
            Operation::GenerateToken { .. } => "generate_token",
            Operation::DeriveKey { .. } => "derive_key",
        }
    }

    pub fn body(&self) -> &'static str {
        match self {
            Operation::GenerateKey { .. } => GENERATE_KEY,
            Operation::HashPassword { .. } => HASH_PASSWORD,
            Operation::VerifyPassword { .. } => VERIFY_PASSWORD,
            Operation::Encrypt { .. } => ENCRYPT,
            Operation::Decrypt { .. } => DECRYPT,
            Operation::GenerateToken { .. } => GENERATE_TOKEN,
            Operation::DeriveKey { .. } => DERIVE_KEY,
        }
    }

    /// The `inputData` object the body reads
    pub fn input(&self) -> Map<String, Value> {
        let mut input = Map::new();
        let mut put = |key: &str, value: Value| {
            input.insert(key.to_string(), value);
        };

        match self {
            Operation::GenerateKey { key_type, options } => {
                put("keyType", key_type.as_str().into());
                put("options", Value::Object(options.clone()));
            }
            Operation::HashPassword {
                password,
                algorithm,
                options,
            }
            | Operation::DeriveKey {
                password,
                algorithm,
                options,
            } => {
                put("password", password.as_str().into());
                put("algorithm", algorithm.as_str().into());
                put("options", Value::Object(options.clone()));
            }
            Operation::VerifyPassword { password, hash } => {
                put("password", password.as_str().into());
                put("hashString", hash.as_str().into());
            }
            Operation::Encrypt {
                data,
                key,
                algorithm,
                options,
            } => {
                put("data", data.as_str().into());
                put("key", key.as_str().into());
                put("algorithm", algorithm.as_str().into());
                put("options", Value::Object(options.clone()));
            }
            Operation::Decrypt {
                encrypted,
                key,
                options,
            } => {
                put("encryptedData", encrypted.clone());
                put("key", key.as_str().into());
                put("options", Value::Object(options.clone()));
            }
            Operation::GenerateToken {
                token_type,
                options,
            } => {
                put("tokenType", token_type.as_str().into());
                put("options", Value::Object(options.clone()));
            }
        }

        input
    }

    pub fn to_request(&self) -> InvocationRequest {
        InvocationRequest::new(self.body(), self.input())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn options(value: Value) -> OperationOptions {
        match value {
            Value::Object(map) => map,
            _ => Map::new(),
        }
    }

    #[test]
    fn test_generate_key_input() {
        let op = Operation::GenerateKey {
            key_type: "rsa".to_string(),
            options: options(json!({ "bits": 4096 })),
        };
        assert_eq!(
            Value::Object(op.input()),
            json!({ "keyType": "rsa", "options": { "bits": 4096 } })
        );
        assert!(op.body().contains("generateKeyPair('rsa'"));
    }

    #[test]
    fn test_verify_password_input() {
        let op = Operation::VerifyPassword {
            password: "hunter2".to_string(),
            hash: "$argon2id$v=19$...".to_string(),
        };
        assert_eq!(
            Value::Object(op.input()),
            json!({ "password": "hunter2", "hashString": "$argon2id$v=19$..." })
        );
    }

    #[test]
    fn test_decrypt_keeps_structured_payload() {
        let encrypted = json!({ "ciphertext": "abc", "iv": "def" });
        let op = Operation::Decrypt {
            encrypted: encrypted.clone(),
            key: "k".to_string(),
            options: Map::new(),
        };
        assert_eq!(op.input().get("encryptedData"), Some(&encrypted));
    }

    #[test]
    fn test_bodies_are_fixed_and_respond() {
        let ops = [
            Operation::GenerateKey {
                key_type: "ed25519".to_string(),
                options: Map::new(),
            },
            Operation::HashPassword {
                password: "p".to_string(),
                algorithm: "pbkdf2".to_string(),
                options: Map::new(),
            },
            Operation::VerifyPassword {
                password: "p".to_string(),
                hash: "h".to_string(),
            },
            Operation::Encrypt {
                data: "d".to_string(),
                key: "k".to_string(),
                algorithm: "aes-256-gcm".to_string(),
                options: Map::new(),
            },
            Operation::Decrypt {
                encrypted: Value::String("x".to_string()),
                key: "k".to_string(),
                options: Map::new(),
            },
            Operation::GenerateToken {
                token_type: "jwt".to_string(),
                options: Map::new(),
            },
            Operation::DeriveKey {
                password: "p".to_string(),
                algorithm: "balloon".to_string(),
                options: Map::new(),
            },
        ];

        for op in &ops {
            let body = op.body();
            assert!(body.starts_with(&format!("// {} v1", op.name())), "{}", op.name());
            assert!(body.contains("respond("), "{}", op.name());
            // User values never appear in the code, only in the input.
            assert_eq!(op.to_request().operation_body, body);
        }
    }
}

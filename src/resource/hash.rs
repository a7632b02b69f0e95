// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Change-detection digest over an object's `spec` subtree.

use serde_json::Value;
use sha2::{Digest, Sha256};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HashOptions {
    /// Treat lists as unordered (e.g. container args in any order hash the same)
    pub unordered_lists: bool,
}

/// Hex SHA-256 of the canonical JSON encoding of `spec`. Object keys are
/// sorted before hashing; a missing spec hashes as `null`.
pub fn spec_hash(spec: Option<&Value>, options: &HashOptions) -> String {
    let mut canonical = String::new();
    write_canonical(spec.unwrap_or(&Value::Null), options, &mut canonical);

    let mut hasher = Sha256::new();
    hasher.update(canonical.as_bytes());
    hex::encode(hasher.finalize())
}

fn write_canonical(value: &Value, options: &HashOptions, out: &mut String) {
    match value {
        Value::Object(map) => {
            let mut keys: Vec<&String> = map.keys().collect();
            keys.sort();
            out.push('{');
            for (i, key) in keys.into_iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                out.push_str(&Value::String(key.clone()).to_string());
                out.push(':');
                write_canonical(&map[key], options, out);
            }
            out.push('}');
        }
        Value::Array(items) => {
            let mut encoded: Vec<String> = items
                .iter()
                .map(|item| {
                    let mut s = String::new();
                    write_canonical(item, options, &mut s);
                    s
                })
                .collect();
            if options.unordered_lists {
                encoded.sort();
            }
            out.push('[');
            out.push_str(&encoded.join(","));
            out.push(']');
        }
        scalar => out.push_str(&scalar.to_string()),
    }
}

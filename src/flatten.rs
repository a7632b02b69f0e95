// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Flattening of nested component configuration into dotted string keys.
//!
//! `{"image": {"tag": "1.2"}, "args": ["-v"]}` becomes
//! `image.tag = 1.2`, `args.size = 1`, `args.0 = -v`.

use crate::constants::{LIST_SIZE_SUFFIX, MAX_CONFIG_DEPTH};
use crate::error::{OutfitterError, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::btree_map::{self, BTreeMap};

/// Dotted key path to string value
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FlatConfig {
    entries: BTreeMap<String, String>,
}

impl FlatConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Insert or overwrite an entry, returning the previous value
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) -> Option<String> {
        self.entries.insert(key.into(), value.into())
    }

    /// True when some key lives below `prefix` (i.e. starts with `prefix.`)
    pub fn has_children(&self, prefix: &str) -> bool {
        let start = format!("{}.", prefix);
        self.entries
            .range(start.clone()..)
            .next()
            .is_some_and(|(k, _)| k.starts_with(&start))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> btree_map::Iter<'_, String, String> {
        self.entries.iter()
    }

    fn insert_unique(&mut self, key: String, value: String) -> Result<()> {
        match self.entries.entry(key) {
            btree_map::Entry::Vacant(slot) => {
                slot.insert(value);
                Ok(())
            }
            btree_map::Entry::Occupied(slot) => Err(OutfitterError::Config(format!(
                "key '{}' is produced more than once",
                slot.key()
            ))),
        }
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for FlatConfig {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
        }
    }
}

/// Flatten a configuration mapping. A `null` root is treated as empty.
///
/// Fails when the root is not a mapping, when nesting exceeds
/// [`MAX_CONFIG_DEPTH`], or when two paths collapse onto the same key
/// (e.g. a literal `"a.b"` key next to `a: {b: ..}`).
pub fn flatten(config: &Value) -> Result<FlatConfig> {
    let mut flat = FlatConfig::new();
    match config {
        Value::Null => {}
        Value::Object(map) => {
            for (key, value) in map {
                flatten_into(key, value, 1, &mut flat)?;
            }
        }
        other => {
            return Err(OutfitterError::Config(format!(
                "configuration root must be a mapping, got {}",
                type_name(other)
            )))
        }
    }
    Ok(flat)
}

fn flatten_into(path: &str, value: &Value, depth: usize, flat: &mut FlatConfig) -> Result<()> {
    if depth > MAX_CONFIG_DEPTH {
        return Err(OutfitterError::Config(format!(
            "configuration nested deeper than {} levels at '{}'",
            MAX_CONFIG_DEPTH, path
        )));
    }

    match value {
        Value::Object(map) => {
            for (key, child) in map {
                flatten_into(&format!("{}.{}", path, key), child, depth + 1, flat)?;
            }
            Ok(())
        }
        Value::Array(items) => {
            flat.insert_unique(
                format!("{}.{}", path, LIST_SIZE_SUFFIX),
                items.len().to_string(),
            )?;
            for (index, child) in items.iter().enumerate() {
                flatten_into(&format!("{}.{}", path, index), child, depth + 1, flat)?;
            }
            Ok(())
        }
        scalar => flat.insert_unique(path.to_string(), scalar_text(scalar)),
    }
}

fn scalar_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a list",
        Value::Object(_) => "a mapping",
    }
}

// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Template-visible view over a [`FlatConfig`].

use crate::flatten::FlatConfig;
use minijinja::value::{Object, Value};
use std::sync::Arc;

/// One level of the dotted key space. Looking up a segment yields either the
/// leaf string or a nested scope when deeper keys exist.
#[derive(Debug)]
pub(super) struct FlatScope {
    config: Arc<FlatConfig>,
    prefix: Option<String>,
}

impl FlatScope {
    pub(super) fn root(config: FlatConfig) -> Value {
        Value::from_object(FlatScope {
            config: Arc::new(config),
            prefix: None,
        })
    }

    fn path(&self, segment: &str) -> String {
        match &self.prefix {
            Some(prefix) => format!("{}.{}", prefix, segment),
            None => segment.to_string(),
        }
    }

    fn resolve(&self, segment: &str) -> Option<Value> {
        let path = self.path(segment);
        if let Some(leaf) = self.config.get(&path) {
            return Some(Value::from(leaf));
        }
        if self.config.has_children(&path) {
            return Some(Value::from_object(FlatScope {
                config: Arc::clone(&self.config),
                prefix: Some(path),
            }));
        }
        None
    }
}

impl Object for FlatScope {
    fn get_value(self: &Arc<Self>, key: &Value) -> Option<Value> {
        let segment = match key.as_str() {
            Some(s) => s.to_string(),
            None => i64::try_from(key.clone()).ok()?.to_string(),
        };

        self.resolve(&segment).or_else(|| {
            segment
                .contains('_')
                .then(|| segment.replace('_', "-"))
                .and_then(|hyphenated| self.resolve(&hyphenated))
        })
    }
}

// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Typed accessors over the untyped object payload.

use kube::core::DynamicObject;
use serde_json::Value;

/// The handful of fields the engine reads from a [`DynamicObject`], plus
/// JSON-pointer lookup into the body for readiness heuristics.
pub trait DocumentExt {
    fn api_version(&self) -> &str;
    fn kind(&self) -> &str;
    fn spec(&self) -> Option<&Value>;
    fn status(&self) -> Option<&Value>;
    /// JSON pointer into the object body, e.g. `/status/loadBalancer/ingress`
    fn lookup(&self, pointer: &str) -> Option<&Value>;

    /// API group, empty for the core group
    fn group(&self) -> &str {
        self.api_version()
            .split_once('/')
            .map(|(group, _)| group)
            .unwrap_or("")
    }

    fn lookup_i64(&self, pointer: &str) -> Option<i64> {
        self.lookup(pointer).and_then(Value::as_i64)
    }

    fn lookup_str(&self, pointer: &str) -> Option<&str> {
        self.lookup(pointer).and_then(Value::as_str)
    }
}

impl DocumentExt for DynamicObject {
    fn api_version(&self) -> &str {
        self.types
            .as_ref()
            .map(|t| t.api_version.as_str())
            .unwrap_or("")
    }

    fn kind(&self) -> &str {
        self.types.as_ref().map(|t| t.kind.as_str()).unwrap_or("")
    }

    fn spec(&self) -> Option<&Value> {
        self.data.get("spec")
    }

    fn status(&self) -> Option<&Value> {
        self.data.get("status")
    }

    fn lookup(&self, pointer: &str) -> Option<&Value> {
        self.data.pointer(pointer)
    }
}

// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Kind-specific readiness checks, looked up by (group, kind).

use crate::constants::HEALTHY_PHASES;
use crate::error::{OutfitterError, Result};
use crate::resource::DocumentExt;
use kube::core::DynamicObject;
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;

/// Observed state of one object during a lifecycle call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadinessStatus {
    Pending,
    Ready,
    Deleting,
    Deleted,
    Error,
}

impl ReadinessStatus {
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            ReadinessStatus::Ready | ReadinessStatus::Deleted | ReadinessStatus::Error
        )
    }
}

impl fmt::Display for ReadinessStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ReadinessStatus::Pending => "pending",
            ReadinessStatus::Ready => "ready",
            ReadinessStatus::Deleting => "deleting",
            ReadinessStatus::Deleted => "deleted",
            ReadinessStatus::Error => "error",
        };
        f.write_str(s)
    }
}

/// Decides whether a live object with a status payload is ready
pub type ReadinessCheck = fn(&DynamicObject) -> Result<bool>;

/// Readiness checks keyed by (group, kind), with a generic fallback
#[derive(Clone)]
pub struct ReadinessRegistry {
    checks: HashMap<(String, String), ReadinessCheck>,
}

impl Default for ReadinessRegistry {
    fn default() -> Self {
        Self::empty()
            .with("apps", "Deployment", replicas_ready)
            .with("apps", "StatefulSet", replicas_ready)
            .with("apps", "ReplicaSet", replicas_ready)
            .with("apps", "DaemonSet", daemon_set_ready)
            .with("", "Namespace", phase_ready)
            .with("", "PersistentVolumeClaim", phase_ready)
            .with("", "Pod", phase_ready)
            .with("", "Service", service_ready)
            .with("networking.k8s.io", "Ingress", ingress_ready)
            .with("apiextensions.k8s.io", "CustomResourceDefinition", crd_established)
    }
}

impl ReadinessRegistry {
    /// A registry where every kind goes through the generic fallback
    pub fn empty() -> Self {
        Self {
            checks: HashMap::new(),
        }
    }

    pub fn register(&mut self, group: &str, kind: &str, check: ReadinessCheck) {
        self.checks
            .insert((group.to_string(), kind.to_string()), check);
    }

    pub fn with(mut self, group: &str, kind: &str, check: ReadinessCheck) -> Self {
        self.register(group, kind, check);
        self
    }

    pub fn has_check(&self, group: &str, kind: &str) -> bool {
        self.checks
            .contains_key(&(group.to_string(), kind.to_string()))
    }

    /// Objects without a status are ready as soon as they exist
    pub fn is_ready(&self, object: &DynamicObject) -> Result<bool> {
        match object.status() {
            None | Some(Value::Null) => return Ok(true),
            Some(Value::Object(_)) => {}
            Some(_) => {
                return Err(OutfitterError::Parse(format!(
                    "{}/{} has a status that is not a mapping",
                    object.api_version(),
                    object.kind()
                )))
            }
        }

        match self
            .checks
            .get(&(object.group().to_string(), object.kind().to_string()))
        {
            Some(check) => check(object),
            None => generic_ready(object),
        }
    }
}

fn is_healthy_phase(phase: &str) -> bool {
    HEALTHY_PHASES.contains(&phase)
}

fn has_ingress(object: &DynamicObject) -> bool {
    object
        .lookup("/status/loadBalancer/ingress")
        .and_then(Value::as_array)
        .is_some_and(|ingress| !ingress.is_empty())
}

/// Ready on a positive readyReplicas or a healthy phase, pending otherwise
fn generic_ready(object: &DynamicObject) -> Result<bool> {
    let replicas = object
        .lookup_i64("/status/readyReplicas")
        .is_some_and(|n| n > 0);
    let phase = object
        .lookup_str("/status/phase")
        .is_some_and(is_healthy_phase);
    Ok(replicas || phase)
}

/// Check for custom resources that report a `Ready` or `Available` condition.
/// Not registered by default; add it per kind with [`ReadinessRegistry::with`].
pub fn conditions_ready(object: &DynamicObject) -> Result<bool> {
    let conditions = object
        .lookup("/status/conditions")
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or_default();
    Ok(conditions.iter().any(|c| {
        matches!(c.get("type").and_then(Value::as_str), Some("Ready" | "Available"))
            && c.get("status").and_then(Value::as_str) == Some("True")
    }))
}

fn replicas_ready(object: &DynamicObject) -> Result<bool> {
    if let (Some(observed), Some(generation)) = (
        object.lookup_i64("/status/observedGeneration"),
        object.metadata.generation,
    ) {
        if observed < generation {
            return Ok(false);
        }
    }

    let desired = object.lookup_i64("/spec/replicas").unwrap_or(1);
    let ready = object.lookup_i64("/status/readyReplicas").unwrap_or(0);
    if ready < desired {
        return Ok(false);
    }

    Ok(object
        .lookup_i64("/status/updatedReplicas")
        .map_or(true, |updated| updated >= desired))
}

fn daemon_set_ready(object: &DynamicObject) -> Result<bool> {
    let Some(desired) = object.lookup_i64("/status/desiredNumberScheduled") else {
        return Ok(false);
    };
    let ready = object.lookup_i64("/status/numberReady").unwrap_or(0);
    Ok(ready >= desired)
}

fn phase_ready(object: &DynamicObject) -> Result<bool> {
    Ok(object.lookup_str("/status/phase").is_some_and(is_healthy_phase))
}

/// Only LoadBalancer services wait for an ingress address
fn service_ready(object: &DynamicObject) -> Result<bool> {
    match object.lookup_str("/spec/type") {
        Some("LoadBalancer") => Ok(has_ingress(object)),
        _ => Ok(true),
    }
}

fn ingress_ready(object: &DynamicObject) -> Result<bool> {
    Ok(has_ingress(object))
}

fn crd_established(object: &DynamicObject) -> Result<bool> {
    let conditions = object
        .lookup("/status/conditions")
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or_default();
    Ok(conditions.iter().any(|c| {
        c.get("type").and_then(Value::as_str) == Some("Established")
            && c.get("status").and_then(Value::as_str) == Some("True")
    }))
}

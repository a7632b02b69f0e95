// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use super::Identity;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Persistable summary of one resource object
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectRecord {
    pub group: String,
    pub version: String,
    pub kind: String,
    pub name: String,
    #[serde(default)]
    pub namespace: String,
    #[serde(default)]
    pub labels: BTreeMap<String, String>,
    #[serde(default)]
    pub annotations: BTreeMap<String, String>,
    pub spec_hash: String,
}

impl ObjectRecord {
    pub fn identity(&self) -> Identity {
        Identity::new(
            &self.group,
            &self.version,
            &self.kind,
            &self.namespace,
            &self.name,
        )
    }
}

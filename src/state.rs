// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Persisted record of what a component put into the cluster

use crate::component::Component;
use crate::error::{OutfitterError, Result};
use crate::resource::{Identity, ObjectRecord};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComponentState {
    pub name: String,
    pub namespace: String,
    #[serde(default)]
    pub objects: Vec<ObjectRecord>,
}

impl ComponentState {
    /// State recording every object of `component`
    pub fn from_component(component: &Component) -> Self {
        Self {
            name: component.name().to_string(),
            namespace: component.namespace().to_string(),
            objects: component.flat_summary(),
        }
    }

    /// State recording only the objects of `component` whose identity is in `identities`
    pub fn partial(component: &Component, identities: &[Identity]) -> Self {
        let mut state = Self::from_component(component);
        state
            .objects
            .retain(|record| identities.contains(&record.identity()));
        state
    }

    pub fn find(&self, identity: &Identity) -> Option<&ObjectRecord> {
        self.objects.iter().find(|record| &record.identity() == identity)
    }

    /// Drop the records of `identities`
    pub fn forget(&mut self, identities: &[Identity]) {
        self.objects
            .retain(|record| !identities.contains(&record.identity()));
    }

    /// Load state; a missing file yields `None`
    pub fn load(path: &Path) -> Result<Option<Self>> {
        let text = match std::fs::read_to_string(path) {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(OutfitterError::io(path, e)),
        };
        let state = serde_json::from_str(&text)
            .map_err(|e| OutfitterError::State(format!("{}: {}", path.display(), e)))?;
        Ok(Some(state))
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let text = serde_json::to_string_pretty(self)
            .map_err(|e| OutfitterError::State(e.to_string()))?;
        std::fs::write(path, text).map_err(|e| OutfitterError::io(path, e))?;
        debug!("Saved state of {} objects to {}", self.objects.len(), path.display());
        Ok(())
    }

    /// Remove the state file if there is one
    pub fn remove(path: &Path) -> Result<()> {
        match std::fs::remove_file(path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(OutfitterError::io(path, e)),
        }
    }
}

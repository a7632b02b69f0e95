// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Stable object identity used as the persisted-state key.

use crate::constants::IDENTITY_SEPARATOR;
use crate::error::OutfitterError;
use kube::core::GroupVersionKind;
use std::fmt;
use std::str::FromStr;

/// `namespace::apiVersion::kind::name`. Cluster-scoped objects have an empty namespace.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Identity {
    pub group: String,
    pub version: String,
    pub kind: String,
    pub namespace: String,
    pub name: String,
}

impl Identity {
    pub fn new(
        group: impl Into<String>,
        version: impl Into<String>,
        kind: impl Into<String>,
        namespace: impl Into<String>,
        name: impl Into<String>,
    ) -> Self {
        Self {
            group: group.into(),
            version: version.into(),
            kind: kind.into(),
            namespace: namespace.into(),
            name: name.into(),
        }
    }

    /// `group/version`, or just `version` for the core group
    pub fn api_version(&self) -> String {
        if self.group.is_empty() {
            self.version.clone()
        } else {
            format!("{}/{}", self.group, self.version)
        }
    }

    pub fn api_version_kind(&self) -> String {
        format!("{}/{}", self.api_version(), self.kind)
    }

    pub fn gvk(&self) -> GroupVersionKind {
        GroupVersionKind::gvk(&self.group, &self.version, &self.kind)
    }

    pub fn namespace(&self) -> Option<&str> {
        (!self.namespace.is_empty()).then_some(self.namespace.as_str())
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{ns}{sep}{av}{sep}{kind}{sep}{name}",
            ns = self.namespace,
            av = self.api_version(),
            kind = self.kind,
            name = self.name,
            sep = IDENTITY_SEPARATOR
        )
    }
}

impl FromStr for Identity {
    type Err = OutfitterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.split(IDENTITY_SEPARATOR).collect();
        let [namespace, api_version, kind, name] = parts.as_slice() else {
            return Err(OutfitterError::Parse(format!("malformed identity '{}'", s)));
        };
        if api_version.is_empty() || kind.is_empty() || name.is_empty() {
            return Err(OutfitterError::Parse(format!("incomplete identity '{}'", s)));
        }
        let (group, version) = split_api_version(api_version);
        Ok(Identity::new(group, version, *kind, *namespace, *name))
    }
}

/// Split an apiVersion into (group, version); the core group is empty
pub fn split_api_version(api_version: &str) -> (String, String) {
    match api_version.split_once('/') {
        Some((group, version)) => (group.to_string(), version.to_string()),
        None => (String::new(), api_version.to_string()),
    }
}

// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Manifest template groups, one per resource category.

use crate::error::{OutfitterError, Result};
use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::path::Path;
use std::str::FromStr;
use tracing::debug;

/// Resource categories, declared in aggregation order: objects that others
/// reference (CRDs, RBAC, service accounts) come before the workloads and
/// services that use them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ResourceCategory {
    CustomResourceDefinitions,
    Roles,
    ClusterRoles,
    ServiceAccounts,
    RoleBindings,
    ClusterRoleBindings,
    MutatingWebhookConfigs,
    ValidatingWebhookConfigs,
    Deployments,
    Services,
}

impl ResourceCategory {
    /// Every category, in aggregation order
    pub const ALL: [ResourceCategory; 10] = [
        ResourceCategory::CustomResourceDefinitions,
        ResourceCategory::Roles,
        ResourceCategory::ClusterRoles,
        ResourceCategory::ServiceAccounts,
        ResourceCategory::RoleBindings,
        ResourceCategory::ClusterRoleBindings,
        ResourceCategory::MutatingWebhookConfigs,
        ResourceCategory::ValidatingWebhookConfigs,
        ResourceCategory::Deployments,
        ResourceCategory::Services,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceCategory::CustomResourceDefinitions => "custom-resource-definitions",
            ResourceCategory::Roles => "roles",
            ResourceCategory::ClusterRoles => "cluster-roles",
            ResourceCategory::ServiceAccounts => "service-accounts",
            ResourceCategory::RoleBindings => "role-bindings",
            ResourceCategory::ClusterRoleBindings => "cluster-role-bindings",
            ResourceCategory::MutatingWebhookConfigs => "mutating-webhook-configs",
            ResourceCategory::ValidatingWebhookConfigs => "validating-webhook-configs",
            ResourceCategory::Deployments => "deployments",
            ResourceCategory::Services => "services",
        }
    }
}

impl fmt::Display for ResourceCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ResourceCategory {
    type Err = OutfitterError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "mutating-webhook-configurations" => Ok(ResourceCategory::MutatingWebhookConfigs),
            "validating-webhook-configurations" => Ok(ResourceCategory::ValidatingWebhookConfigs),
            other => ResourceCategory::ALL
                .into_iter()
                .find(|c| c.as_str() == other)
                .ok_or_else(|| {
                    OutfitterError::Config(format!("unknown resource category '{}'", other))
                }),
        }
    }
}

/// A template's text plus a name used in diagnostics
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManifestTemplate {
    pub name: String,
    pub text: String,
}

/// Category to ordered template sequence
#[derive(Debug, Clone, Default)]
pub struct TemplateGroups {
    groups: BTreeMap<ResourceCategory, Vec<ManifestTemplate>>,
}

impl TemplateGroups {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a template to a category, named `<category>[<index>]`
    pub fn add(&mut self, category: ResourceCategory, text: impl Into<String>) -> &mut Self {
        let group = self.groups.entry(category).or_default();
        let name = format!("{}[{}]", category, group.len());
        group.push(ManifestTemplate {
            name,
            text: text.into(),
        });
        self
    }

    pub fn with(mut self, category: ResourceCategory, text: impl Into<String>) -> Self {
        self.add(category, text);
        self
    }

    pub fn get(&self, category: ResourceCategory) -> &[ManifestTemplate] {
        self.groups.get(&category).map(Vec::as_slice).unwrap_or(&[])
    }

    /// All templates concatenated in aggregation order
    pub fn ordered(&self) -> impl Iterator<Item = (ResourceCategory, &ManifestTemplate)> {
        ResourceCategory::ALL
            .into_iter()
            .flat_map(move |category| self.get(category).iter().map(move |t| (category, t)))
    }

    pub fn len(&self) -> usize {
        self.groups.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Load templates from `<root>/<category>/*`, files in name order.
    /// Missing category directories are skipped; unknown directories are an error.
    pub fn from_dir(root: impl AsRef<Path>) -> Result<Self> {
        let root = root.as_ref();
        let mut groups = TemplateGroups::new();

        let mut dirs: Vec<_> = fs::read_dir(root)
            .map_err(|e| OutfitterError::io(root, e))?
            .collect::<std::io::Result<_>>()
            .map_err(|e| OutfitterError::io(root, e))?;
        dirs.sort_by_key(|entry| entry.file_name());

        for dir in dirs {
            let path = dir.path();
            if !path.is_dir() {
                continue;
            }
            let dir_name = dir.file_name().to_string_lossy().into_owned();
            let category: ResourceCategory = dir_name.parse()?;

            let mut files: Vec<_> = fs::read_dir(&path)
                .map_err(|e| OutfitterError::io(&path, e))?
                .collect::<std::io::Result<_>>()
                .map_err(|e| OutfitterError::io(&path, e))?;
            files.sort_by_key(|entry| entry.file_name());

            for file in files {
                let file_path = file.path();
                if !file_path.is_file() {
                    continue;
                }
                let text = fs::read_to_string(&file_path)
                    .map_err(|e| OutfitterError::io(&file_path, e))?;
                debug!("Loaded template {}", file_path.display());
                groups.groups.entry(category).or_default().push(ManifestTemplate {
                    name: format!("{}/{}", dir_name, file.file_name().to_string_lossy()),
                    text,
                });
            }
        }

        Ok(groups)
    }
}

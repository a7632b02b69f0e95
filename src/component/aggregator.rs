// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Renders and parses a component's templates into ordered resource objects.

use super::templates::TemplateGroups;
use crate::constants::NAMESPACE_KEY;
use crate::error::{OutfitterError, Result};
use crate::flatten::{flatten, FlatConfig};
use crate::resource::{HashOptions, ObjectRecord, ResourceObject};
use crate::template::{RenderPolicy, TemplateRenderer};
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, info, instrument, warn};

/// Identity input of a component
#[derive(Debug, Clone, Deserialize)]
pub struct ComponentSpec {
    pub name: String,
    pub namespace: String,
    #[serde(default)]
    pub config: Value,
}

/// A manifest that rendered but could not be parsed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManifestFailure {
    pub template: String,
    pub message: String,
}

/// The rendered, parsed form of a component. Rebuilt on every lifecycle call.
#[derive(Debug, Clone)]
pub struct Component {
    name: String,
    namespace: String,
    flat_config: FlatConfig,
    objects: Vec<ResourceObject>,
    failures: Vec<ManifestFailure>,
}

impl Component {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Objects in aggregation order
    pub fn objects(&self) -> &[ResourceObject] {
        &self.objects
    }

    /// Flattened configuration the templates were rendered with, `namespace` included
    pub fn flat_config(&self) -> &FlatConfig {
        &self.flat_config
    }

    /// One record per object, in object order, for persistence
    pub fn flat_summary(&self) -> Vec<ObjectRecord> {
        self.objects.iter().map(ResourceObject::to_record).collect()
    }

    /// Manifests skipped because they did not parse
    pub fn failures(&self) -> &[ManifestFailure] {
        &self.failures
    }
}

/// Builds components from an injected set of template groups
pub struct Aggregator {
    templates: TemplateGroups,
    renderer: TemplateRenderer,
    hash_options: HashOptions,
}

impl Aggregator {
    pub fn new(templates: TemplateGroups) -> Self {
        Self {
            templates,
            renderer: TemplateRenderer::default(),
            hash_options: HashOptions::default(),
        }
    }

    pub fn with_render_policy(mut self, policy: RenderPolicy) -> Self {
        self.renderer = TemplateRenderer::new(policy);
        self
    }

    pub fn with_hash_options(mut self, options: HashOptions) -> Self {
        self.hash_options = options;
        self
    }

    pub fn templates(&self) -> &TemplateGroups {
        &self.templates
    }

    pub fn build_spec(&self, spec: &ComponentSpec) -> Result<Component> {
        self.build(&spec.name, &spec.namespace, &spec.config)
    }

    /// Render every template in aggregation order and parse the non-empty
    /// results. Template and configuration errors abort the build; manifests
    /// that render but fail to parse are recorded in
    /// [`Component::failures`] and skipped.
    #[instrument(skip(self, config))]
    pub fn build(&self, name: &str, namespace: &str, config: &Value) -> Result<Component> {
        if name.trim().is_empty() {
            return Err(OutfitterError::Config("component name must not be empty".to_string()));
        }

        let flat_config = component_config(namespace, config)?;
        let mut objects = Vec::new();
        let mut failures = Vec::new();

        for (category, template) in self.templates.ordered() {
            let rendered = self
                .renderer
                .render_named(&template.name, &template.text, &flat_config)?;

            if rendered.trim().is_empty() {
                debug!("Template {} rendered empty, skipping", template.name);
                continue;
            }

            match ResourceObject::parse_with(&rendered, &self.hash_options) {
                Ok(object) => {
                    debug!("Template {} ({}) produced {}", template.name, category, object.identity());
                    objects.push(object);
                }
                Err(e) => {
                    warn!("Failed to get object from template {}: {}", template.name, e);
                    failures.push(ManifestFailure {
                        template: template.name.clone(),
                        message: e.to_string(),
                    });
                }
            }
        }

        info!(
            "Built component {}/{} with {} objects ({} skipped)",
            namespace,
            name,
            objects.len(),
            failures.len()
        );

        Ok(Component {
            name: name.to_string(),
            namespace: namespace.to_string(),
            flat_config,
            objects,
            failures,
        })
    }
}

/// Build a component with the default render policy and hash options
pub fn build_component(
    name: &str,
    namespace: &str,
    config: &Value,
    templates: TemplateGroups,
) -> Result<Component> {
    Aggregator::new(templates).build(name, namespace, config)
}

/// Flatten the raw configuration and inject the component namespace, which
/// takes precedence over a `namespace` key in the configuration itself.
fn component_config(namespace: &str, config: &Value) -> Result<FlatConfig> {
    let mut flat = flatten(config)?;
    if let Some(previous) = flat.insert(NAMESPACE_KEY, namespace) {
        if previous != namespace {
            warn!(
                "Configuration key '{}' ({}) overridden by component namespace {}",
                NAMESPACE_KEY, previous, namespace
            );
        }
    }
    Ok(flat)
}

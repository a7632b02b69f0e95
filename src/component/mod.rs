// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Components: named bundles of manifests rendered and parsed as one unit.

pub mod aggregator;
pub mod templates;

pub use aggregator::{build_component, Aggregator, Component, ComponentSpec, ManifestFailure};
pub use templates::{ManifestTemplate, ResourceCategory, TemplateGroups};

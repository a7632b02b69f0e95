// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use super::hash::{spec_hash, HashOptions};
use super::identity::split_api_version;
use super::{DocumentExt, Identity, ObjectRecord};
use crate::error::{OutfitterError, Result};
use kube::core::DynamicObject;
use serde::Deserialize;
use serde_json::Value;
use std::collections::BTreeMap;

/// One rendered manifest, decoded
#[derive(Debug, Clone)]
pub struct ResourceObject {
    identity: Identity,
    labels: BTreeMap<String, String>,
    annotations: BTreeMap<String, String>,
    manifest: String,
    spec_hash: String,
    object: DynamicObject,
}

impl ResourceObject {
    /// Decode a single YAML or JSON document. Empty, multi-document and
    /// non-mapping input is rejected, as are manifests missing `apiVersion`,
    /// `kind` or `metadata.name`.
    pub fn parse(manifest: &str) -> Result<Self> {
        Self::parse_with(manifest, &HashOptions::default())
    }

    pub fn parse_with(manifest: &str, options: &HashOptions) -> Result<Self> {
        let json = decode_single_document(manifest)?;

        let api_version = json
            .get("apiVersion")
            .and_then(Value::as_str)
            .ok_or_else(|| OutfitterError::Parse("manifest missing apiVersion".to_string()))?;
        let kind = json
            .get("kind")
            .and_then(Value::as_str)
            .ok_or_else(|| OutfitterError::Parse("manifest missing kind".to_string()))?;
        let name = json
            .pointer("/metadata/name")
            .and_then(Value::as_str)
            .filter(|n| !n.is_empty())
            .ok_or_else(|| OutfitterError::Parse("manifest missing metadata.name".to_string()))?;
        let namespace = json
            .pointer("/metadata/namespace")
            .and_then(Value::as_str)
            .unwrap_or_default();

        let (group, version) = split_api_version(api_version);
        let identity = Identity::new(group, version, kind, namespace, name);
        let hash = spec_hash(json.get("spec"), options);

        let object: DynamicObject = serde_json::from_value(json)
            .map_err(|e| OutfitterError::Parse(format!("{}: {}", identity, e)))?;

        Ok(Self {
            labels: object.metadata.labels.clone().unwrap_or_default(),
            annotations: object.metadata.annotations.clone().unwrap_or_default(),
            identity,
            manifest: manifest.to_string(),
            spec_hash: hash,
            object,
        })
    }

    pub fn identity(&self) -> &Identity {
        &self.identity
    }

    pub fn group(&self) -> &str {
        &self.identity.group
    }

    pub fn version(&self) -> &str {
        &self.identity.version
    }

    pub fn kind(&self) -> &str {
        &self.identity.kind
    }

    pub fn name(&self) -> &str {
        &self.identity.name
    }

    pub fn namespace(&self) -> &str {
        &self.identity.namespace
    }

    pub fn labels(&self) -> &BTreeMap<String, String> {
        &self.labels
    }

    pub fn annotations(&self) -> &BTreeMap<String, String> {
        &self.annotations
    }

    /// The rendered text this object was parsed from
    pub fn manifest(&self) -> &str {
        &self.manifest
    }

    pub fn spec_hash(&self) -> &str {
        &self.spec_hash
    }

    pub fn spec(&self) -> Option<&Value> {
        self.object.spec()
    }

    pub fn object(&self) -> &DynamicObject {
        &self.object
    }

    pub fn resource_version(&self) -> Option<&str> {
        self.object.metadata.resource_version.as_deref()
    }

    /// Stamp the live resourceVersion before submitting an update
    pub fn attach_resource_version(&mut self, resource_version: impl Into<String>) {
        self.object.metadata.resource_version = Some(resource_version.into());
    }

    pub fn to_record(&self) -> ObjectRecord {
        ObjectRecord {
            group: self.identity.group.clone(),
            version: self.identity.version.clone(),
            kind: self.identity.kind.clone(),
            name: self.identity.name.clone(),
            namespace: self.identity.namespace.clone(),
            labels: self.labels.clone(),
            annotations: self.annotations.clone(),
            spec_hash: self.spec_hash.clone(),
        }
    }
}

fn decode_single_document(manifest: &str) -> Result<Value> {
    if manifest.trim().is_empty() {
        return Err(OutfitterError::Parse("manifest is empty".to_string()));
    }

    let mut documents = Vec::new();
    for document in serde_yaml::Deserializer::from_str(manifest) {
        let value = serde_yaml::Value::deserialize(document)
            .map_err(|e| OutfitterError::Parse(e.to_string()))?;
        if !value.is_null() {
            documents.push(value);
        }
    }

    let value = match documents.len() {
        0 => return Err(OutfitterError::Parse("manifest contains no document".to_string())),
        1 => documents.remove(0),
        n => {
            return Err(OutfitterError::Parse(format!(
                "manifest contains {} documents, expected one",
                n
            )))
        }
    };

    if !value.is_mapping() {
        return Err(OutfitterError::Parse("manifest is not a mapping".to_string()));
    }

    serde_json::to_value(value).map_err(|e| OutfitterError::Parse(e.to_string()))
}

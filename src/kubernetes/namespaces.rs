// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Component namespace bootstrap

use crate::constants::{MANAGED_BY_LABEL, OPERATOR_NAME};
use crate::error::{OutfitterError, Result};
use k8s_openapi::api::core::v1::Namespace;
use kube::{
    api::{ObjectMeta, PostParams},
    Api, Client,
};
use std::collections::BTreeMap;
use tracing::{debug, info, instrument};

/// Ensure the component namespace exists, creating it if it doesn't.
/// Returns true when the namespace was created by this call.
#[instrument(skip(client))]
pub async fn ensure_namespace_exists(client: &Client, namespace: &str) -> Result<bool> {
    let namespaces: Api<Namespace> = Api::all(client.clone());

    match namespaces.get_opt(namespace).await {
        Ok(Some(_)) => {
            debug!("Namespace {} already exists", namespace);
            Ok(false)
        }
        Ok(None) => {
            info!("Creating namespace {}", namespace);
            let ns = Namespace {
                metadata: ObjectMeta {
                    name: Some(namespace.to_string()),
                    labels: Some(BTreeMap::from([(
                        MANAGED_BY_LABEL.to_string(),
                        OPERATOR_NAME.to_string(),
                    )])),
                    ..Default::default()
                },
                ..Default::default()
            };
            namespaces
                .create(&PostParams::default(), &ns)
                .await
                .map_err(|e| {
                    OutfitterError::Namespace(format!("Failed to create namespace {}: {}", namespace, e))
                })?;
            info!("Namespace {} created successfully", namespace);
            Ok(true)
        }
        Err(e) => Err(OutfitterError::Namespace(format!(
            "Failed to check namespace {}: {}",
            namespace, e
        ))),
    }
}

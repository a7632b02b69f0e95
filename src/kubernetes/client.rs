// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Client creation from the ambient environment or an explicit kubeconfig file

use crate::error::{OutfitterError, Result};
use kube::config::{KubeConfigOptions, Kubeconfig};
use kube::Client;
use std::path::Path;
use tracing::{info, instrument};

/// Create a client from `kubeconfig`, or infer one (KUBECONFIG, ~/.kube/config, in-cluster)
#[instrument]
pub async fn create_client(kubeconfig: Option<&Path>) -> Result<Client> {
    match kubeconfig {
        Some(path) => {
            info!("Loading kubeconfig from {}", path.display());
            let contents = tokio::fs::read_to_string(path)
                .await
                .map_err(|e| OutfitterError::io(path, e))?;
            create_client_from_kubeconfig(&contents).await
        }
        None => Client::try_default()
            .await
            .map_err(|e| OutfitterError::Kubeconfig(format!("Failed to infer config: {}", e))),
    }
}

/// Create a Kubernetes client from a kubeconfig string
async fn create_client_from_kubeconfig(kubeconfig: &str) -> Result<Client> {
    let parsed: Kubeconfig = serde_yaml::from_str(kubeconfig)
        .map_err(|e| OutfitterError::Kubeconfig(format!("Failed to parse kubeconfig: {}", e)))?;

    let client_config = kube::Config::from_custom_kubeconfig(parsed, &KubeConfigOptions::default())
        .await
        .map_err(|e| OutfitterError::Kubeconfig(format!("Failed to create config: {}", e)))?;

    Client::try_from(client_config)
        .map_err(|e| OutfitterError::Kubeconfig(format!("Failed to create client: {}", e)))
}

// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Per-verb lifecycle calls over a component's objects, strictly in aggregation order.
//!
//! Nothing is rolled back: when an object fails, the objects before it stay
//! applied and the error lists them.

use super::api::ClusterApi;
use super::readiness::ReadinessRegistry;
use super::wait::{wait_for, WaitSettings, WaitTarget};
use crate::component::Component;
use crate::constants::readiness::{
    CREATE_TIMEOUT_SECS, DELETE_TIMEOUT_SECS, POLL_INTERVAL_SECS, UPDATE_TIMEOUT_SECS,
};
use crate::error::{OutfitterError, Result, Verb};
use crate::resource::{Identity, ObjectRecord};
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, instrument};

/// Polling cadence and per-verb deadlines
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReconcileOptions {
    pub poll_interval: Duration,
    pub create_timeout: Duration,
    pub update_timeout: Duration,
    pub delete_timeout: Duration,
}

impl Default for ReconcileOptions {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(POLL_INTERVAL_SECS),
            create_timeout: Duration::from_secs(CREATE_TIMEOUT_SECS),
            update_timeout: Duration::from_secs(UPDATE_TIMEOUT_SECS),
            delete_timeout: Duration::from_secs(DELETE_TIMEOUT_SECS),
        }
    }
}

pub struct Reconciler {
    api: ClusterApi,
    readiness: Arc<ReadinessRegistry>,
    options: ReconcileOptions,
}

impl Reconciler {
    pub fn new(api: ClusterApi) -> Self {
        Self {
            api,
            readiness: Arc::new(ReadinessRegistry::default()),
            options: ReconcileOptions::default(),
        }
    }

    pub fn with_options(mut self, options: ReconcileOptions) -> Self {
        self.options = options;
        self
    }

    pub fn with_readiness(mut self, readiness: ReadinessRegistry) -> Self {
        self.readiness = Arc::new(readiness);
        self
    }

    pub fn api(&self) -> &ClusterApi {
        &self.api
    }

    pub fn options(&self) -> &ReconcileOptions {
        &self.options
    }

    async fn wait(
        &self,
        identity: &Identity,
        target: WaitTarget,
        timeout: Duration,
        cancel: &CancellationToken,
    ) -> Result<()> {
        let settings = WaitSettings {
            interval: self.options.poll_interval,
            timeout,
        };
        wait_for(&self.api, &self.readiness, identity, target, settings, cancel).await?;
        Ok(())
    }

    /// Create each object and wait for it to become ready before moving on
    #[instrument(skip(self, component, cancel), fields(component = %component.name()))]
    pub async fn create(&self, component: &Component, cancel: &CancellationToken) -> Result<()> {
        let mut applied = Vec::new();

        for object in component.objects() {
            let identity = object.identity();
            ensure_not_cancelled(cancel, identity)
                .map_err(|e| lifecycle(Verb::Create, identity, &applied, e))?;

            info!("Creating {}", identity);
            self.api
                .create(object)
                .await
                .map_err(|e| lifecycle(Verb::Create, identity, &applied, e))?;
            applied.push(identity.clone());

            self.wait(identity, WaitTarget::Ready, self.options.create_timeout, cancel)
                .await
                .map_err(|e| lifecycle(Verb::Create, identity, &applied, e))?;
        }

        info!("Created {} objects", applied.len());
        Ok(())
    }

    /// Look up every recorded object. Objects the cluster no longer has, or
    /// whose kind it no longer serves, are dropped from the returned records.
    #[instrument(skip(self, records, cancel))]
    pub async fn read(
        &self,
        records: &[ObjectRecord],
        cancel: &CancellationToken,
    ) -> Result<Vec<ObjectRecord>> {
        let mut present = Vec::with_capacity(records.len());

        for record in records {
            let identity = record.identity();
            ensure_not_cancelled(cancel, &identity)
                .map_err(|e| lifecycle(Verb::Read, &identity, &[], e))?;

            match self.api.get(&identity).await {
                Ok(_) => present.push(record.clone()),
                Err(e) if e.is_gone() => info!("{} is gone, clearing it: {}", identity, e),
                Err(e) => return Err(lifecycle(Verb::Read, &identity, &[], e)),
            }
        }

        Ok(present)
    }

    /// Refresh each object's resourceVersion, replace it and wait for it to become ready
    #[instrument(skip(self, component, cancel), fields(component = %component.name()))]
    pub async fn update(&self, component: &Component, cancel: &CancellationToken) -> Result<()> {
        let mut applied = Vec::new();

        for object in component.objects() {
            let identity = object.identity();
            ensure_not_cancelled(cancel, identity)
                .map_err(|e| lifecycle(Verb::Update, identity, &applied, e))?;

            let live = self
                .api
                .get(identity)
                .await
                .map_err(|e| lifecycle(Verb::Update, identity, &applied, e))?;

            let mut desired = object.clone();
            if let Some(resource_version) = live.metadata.resource_version {
                desired.attach_resource_version(resource_version);
            }

            info!("Updating {}", identity);
            self.api
                .replace(&desired)
                .await
                .map_err(|e| lifecycle(Verb::Update, identity, &applied, e))?;
            applied.push(identity.clone());

            self.wait(identity, WaitTarget::Ready, self.options.update_timeout, cancel)
                .await
                .map_err(|e| lifecycle(Verb::Update, identity, &applied, e))?;
        }

        info!("Updated {} objects", applied.len());
        Ok(())
    }

    /// Delete each object and wait until the cluster confirms it is gone
    #[instrument(skip(self, component, cancel), fields(component = %component.name()))]
    pub async fn delete(&self, component: &Component, cancel: &CancellationToken) -> Result<()> {
        let mut applied = Vec::new();

        for object in component.objects() {
            let identity = object.identity();
            ensure_not_cancelled(cancel, identity)
                .map_err(|e| lifecycle(Verb::Delete, identity, &applied, e))?;

            info!("Deleting {}", identity);
            match self.api.delete(identity).await {
                Ok(()) => {}
                Err(e) if e.is_gone() => {
                    info!("{} already gone: {}", identity, e);
                    applied.push(identity.clone());
                    continue;
                }
                Err(e) => return Err(lifecycle(Verb::Delete, identity, &applied, e)),
            }
            applied.push(identity.clone());

            self.wait(identity, WaitTarget::Deleted, self.options.delete_timeout, cancel)
                .await
                .map_err(|e| lifecycle(Verb::Delete, identity, &applied, e))?;
        }

        info!("Deleted {} objects", applied.len());
        Ok(())
    }
}

fn ensure_not_cancelled(cancel: &CancellationToken, identity: &Identity) -> Result<()> {
    if cancel.is_cancelled() {
        return Err(OutfitterError::Cancelled(identity.to_string()));
    }
    Ok(())
}

fn lifecycle(verb: Verb, identity: &Identity, applied: &[Identity], source: OutfitterError) -> OutfitterError {
    error!("Failed to {} {}: {}", verb, identity, source);
    OutfitterError::Lifecycle {
        verb,
        identity: identity.clone(),
        applied: applied.to_vec(),
        source: Box::new(source),
    }
}

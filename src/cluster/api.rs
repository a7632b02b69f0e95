// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Untyped create/get/replace/delete against the control plane

use crate::constants::DEFAULT_NAMESPACE;
use crate::error::{OutfitterError, Result};
use crate::resource::{Identity, ResourceObject};
use kube::{
    api::{DeleteParams, PostParams},
    core::{ApiResource, DynamicObject},
    discovery::{Discovery, Scope},
    Api, Client,
};
use std::sync::Arc;
use tracing::{debug, instrument};

/// Cluster handle shared by every reconciliation. Cheap to clone.
#[derive(Clone)]
pub struct ClusterApi {
    client: Client,
    discovery: Option<Arc<Discovery>>,
}

impl ClusterApi {
    /// Resolve kinds from apiVersion/kind alone; scope follows the object's namespace
    pub fn new(client: Client) -> Self {
        Self {
            client,
            discovery: None,
        }
    }

    /// Resolve kinds and their scope through API discovery
    pub fn with_discovery(mut self, discovery: Discovery) -> Self {
        self.discovery = Some(Arc::new(discovery));
        self
    }

    pub fn client(&self) -> &Client {
        &self.client
    }

    fn api_for(&self, identity: &Identity) -> Result<Api<DynamicObject>> {
        let gvk = identity.gvk();

        let Some(discovery) = &self.discovery else {
            let resource = ApiResource::from_gvk(&gvk);
            return Ok(match identity.namespace() {
                Some(ns) => Api::namespaced_with(self.client.clone(), ns, &resource),
                None => Api::all_with(self.client.clone(), &resource),
            });
        };

        let (resource, caps) = discovery.resolve_gvk(&gvk).ok_or_else(|| {
            OutfitterError::KindUnknown(format!("{} is not served by the cluster", identity.api_version_kind()))
        })?;

        Ok(match caps.scope {
            Scope::Namespaced => Api::namespaced_with(
                self.client.clone(),
                identity.namespace().unwrap_or(DEFAULT_NAMESPACE),
                &resource,
            ),
            Scope::Cluster => Api::all_with(self.client.clone(), &resource),
        })
    }

    #[instrument(skip(self, object), fields(object = %object.identity()))]
    pub async fn create(&self, object: &ResourceObject) -> Result<DynamicObject> {
        let identity = object.identity();
        let api = self.api_for(identity)?;
        debug!("Creating {}", identity);
        api.create(&PostParams::default(), object.object())
            .await
            .map_err(|e| OutfitterError::from_kube(e, identity))
    }

    pub async fn get(&self, identity: &Identity) -> Result<DynamicObject> {
        let api = self.api_for(identity)?;
        api.get(&identity.name)
            .await
            .map_err(|e| OutfitterError::from_kube(e, identity))
    }

    /// Submit `object` as a full replacement. The object must carry the live
    /// resourceVersion or the API server answers with a conflict.
    #[instrument(skip(self, object), fields(object = %object.identity()))]
    pub async fn replace(&self, object: &ResourceObject) -> Result<DynamicObject> {
        let identity = object.identity();
        let api = self.api_for(identity)?;
        debug!(
            "Replacing {} at resourceVersion {:?}",
            identity,
            object.resource_version()
        );
        api.replace(&identity.name, &PostParams::default(), object.object())
            .await
            .map_err(|e| OutfitterError::from_kube(e, identity))
    }

    #[instrument(skip(self, identity), fields(object = %identity))]
    pub async fn delete(&self, identity: &Identity) -> Result<()> {
        let api = self.api_for(identity)?;
        api.delete(&identity.name, &DeleteParams::default())
            .await
            .map_err(|e| OutfitterError::from_kube(e, identity))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kubernetes::run_discovery;
    use crate::test_utils::{discovery_service, FakeApiServer};
    use serde_json::json;

    const SERVICE: &str = "apiVersion: v1\nkind: Service\nmetadata:\n  name: web\n  namespace: shop\nspec:\n  ports:\n    - port: 80\n";

    #[tokio::test]
    async fn test_create_posts_to_namespaced_collection() {
        let server = FakeApiServer::new();
        let api = ClusterApi::new(server.into_client());
        let object = ResourceObject::parse(SERVICE).unwrap();

        let created = api.create(&object).await.unwrap();

        assert!(created.metadata.resource_version.is_some());
        assert!(server.object("/api/v1/namespaces/shop/services/web").is_some());
    }

    #[tokio::test]
    async fn test_cluster_scoped_object_uses_cluster_path() {
        let server = FakeApiServer::new();
        let api = ClusterApi::new(server.into_client());
        let object = ResourceObject::parse(
            "apiVersion: rbac.authorization.k8s.io/v1\nkind: ClusterRole\nmetadata:\n  name: viewer\nrules: []\n",
        )
        .unwrap();

        api.create(&object).await.unwrap();

        assert!(server
            .object("/apis/rbac.authorization.k8s.io/v1/clusterroles/viewer")
            .is_some());
    }

    #[tokio::test]
    async fn test_get_missing_object_is_not_found() {
        let api = ClusterApi::new(FakeApiServer::new().into_client());
        let identity = Identity::new("", "v1", "Service", "shop", "web");
        let err = api.get(&identity).await.unwrap_err();
        assert!(matches!(err, OutfitterError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_unserved_kind_is_kind_unknown() {
        let server = FakeApiServer::new().unserved("/apis/example.com");
        let api = ClusterApi::new(server.into_client());
        let identity = Identity::new("example.com", "v1", "Widget", "shop", "w");
        let err = api.get(&identity).await.unwrap_err();
        assert!(matches!(err, OutfitterError::KindUnknown(_)), "{:?}", err);
    }

    #[tokio::test]
    async fn test_replace_without_resource_version_conflicts() {
        let server = FakeApiServer::new().with_object(
            "/api/v1/namespaces/shop/services/web",
            json!({"apiVersion": "v1", "kind": "Service", "metadata": {"name": "web", "namespace": "shop"}}),
        );
        let api = ClusterApi::new(server.into_client());
        let object = ResourceObject::parse(SERVICE).unwrap();

        let err = api.replace(&object).await.unwrap_err();
        assert!(matches!(err, OutfitterError::Conflict(_)), "{:?}", err);
    }

    #[tokio::test]
    async fn test_delete_missing_object_is_not_found() {
        let api = ClusterApi::new(FakeApiServer::new().into_client());
        let err = api
            .delete(&Identity::new("", "v1", "Service", "shop", "web"))
            .await
            .unwrap_err();
        assert!(err.is_gone());
    }

    #[tokio::test]
    async fn test_discovery_places_unnamespaced_object_in_default() {
        let client = discovery_service()
            .on_get(
                "/api/v1/namespaces/default/services/web",
                200,
                &json!({"apiVersion": "v1", "kind": "Service", "metadata": {"name": "web", "namespace": "default"}})
                    .to_string(),
            )
            .into_client();
        let discovery = run_discovery(&client).await.unwrap();
        let api = ClusterApi::new(client).with_discovery(discovery);

        let live = api
            .get(&Identity::new("", "v1", "Service", "", "web"))
            .await
            .unwrap();
        assert_eq!(live.metadata.namespace.as_deref(), Some("default"));
    }

    #[tokio::test]
    async fn test_discovery_rejects_unknown_kind() {
        let client = discovery_service().into_client();
        let discovery = run_discovery(&client).await.unwrap();
        let api = ClusterApi::new(client).with_discovery(discovery);

        let err = api
            .get(&Identity::new("apps", "v1", "Deployment", "shop", "worker"))
            .await
            .unwrap_err();
        assert!(matches!(err, OutfitterError::KindUnknown(_)));
    }
}

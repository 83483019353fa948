// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Resource store abstraction and its Kubernetes API implementation

use crate::constants::OPERATOR_NAME;
use crate::error::Result;
use crate::types::{ResourceKind, ResourceRef, SyncObject};
use async_trait::async_trait;
use k8s_openapi::api::core::v1::{ConfigMap, Namespace, Secret};
use k8s_openapi::NamespaceResourceScope;
use kube::{
    api::{DeleteParams, ListParams, PostParams},
    Api, Client, Resource, ResourceExt,
};
use serde::{de::DeserializeOwned, Serialize};
use std::fmt::Debug;
use std::sync::Arc;
use tracing::{debug, instrument};

/// Read and write access to namespaces, ConfigMaps and Secrets
#[async_trait]
pub trait ResourceStore: Send + Sync {
    /// Names of all namespaces in the cluster
    async fn list_namespaces(&self) -> Result<Vec<String>>;

    /// Look up an object; `Ok(None)` when it does not exist
    async fn get(&self, target: &ResourceRef) -> Result<Option<SyncObject>>;

    /// Create a new object in its namespace
    async fn create(&self, object: &SyncObject) -> Result<()>;

    /// Overwrite an existing object
    async fn replace(&self, object: &SyncObject) -> Result<()>;

    async fn delete(&self, target: &ResourceRef) -> Result<()>;

    /// All objects of `kind` in any namespace matching `selector`
    async fn list_labelled(&self, kind: ResourceKind, selector: &str) -> Result<Vec<SyncObject>>;
}

#[async_trait]
impl<T: ResourceStore + ?Sized> ResourceStore for Arc<T> {
    async fn list_namespaces(&self) -> Result<Vec<String>> {
        (**self).list_namespaces().await
    }

    async fn get(&self, target: &ResourceRef) -> Result<Option<SyncObject>> {
        (**self).get(target).await
    }

    async fn create(&self, object: &SyncObject) -> Result<()> {
        (**self).create(object).await
    }

    async fn replace(&self, object: &SyncObject) -> Result<()> {
        (**self).replace(object).await
    }

    async fn delete(&self, target: &ResourceRef) -> Result<()> {
        (**self).delete(target).await
    }

    async fn list_labelled(&self, kind: ResourceKind, selector: &str) -> Result<Vec<SyncObject>> {
        (**self).list_labelled(kind, selector).await
    }
}

/// [`ResourceStore`] backed by the Kubernetes API
#[derive(Clone)]
pub struct KubeStore {
    client: Client,
}

impl KubeStore {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    fn post_params() -> PostParams {
        PostParams {
            field_manager: Some(OPERATOR_NAME.to_string()),
            ..Default::default()
        }
    }

    async fn get_as<K>(&self, target: &ResourceRef) -> Result<Option<K>>
    where
        K: Resource<Scope = NamespaceResourceScope, DynamicType = ()>
            + Clone
            + DeserializeOwned
            + Debug,
    {
        let api: Api<K> = Api::namespaced(self.client.clone(), &target.namespace);
        Ok(api.get_opt(&target.name).await?)
    }

    async fn create_as<K>(&self, object: &K) -> Result<()>
    where
        K: Resource<Scope = NamespaceResourceScope, DynamicType = ()>
            + Clone
            + DeserializeOwned
            + Serialize
            + Debug,
    {
        let namespace = object.namespace().unwrap_or_default();
        let api: Api<K> = Api::namespaced(self.client.clone(), &namespace);
        api.create(&Self::post_params(), object).await?;
        Ok(())
    }

    async fn replace_as<K>(&self, object: &K) -> Result<()>
    where
        K: Resource<Scope = NamespaceResourceScope, DynamicType = ()>
            + Clone
            + DeserializeOwned
            + Serialize
            + Debug,
    {
        let namespace = object.namespace().unwrap_or_default();
        let api: Api<K> = Api::namespaced(self.client.clone(), &namespace);
        api.replace(&object.name_any(), &Self::post_params(), object)
            .await?;
        Ok(())
    }

    async fn delete_as<K>(&self, target: &ResourceRef) -> Result<()>
    where
        K: Resource<Scope = NamespaceResourceScope, DynamicType = ()>
            + Clone
            + DeserializeOwned
            + Debug,
    {
        let api: Api<K> = Api::namespaced(self.client.clone(), &target.namespace);
        api.delete(&target.name, &DeleteParams::default()).await?;
        Ok(())
    }

    async fn list_as<K>(&self, selector: &str) -> Result<Vec<SyncObject>>
    where
        K: Resource<Scope = NamespaceResourceScope, DynamicType = ()>
            + Clone
            + DeserializeOwned
            + Debug
            + Into<SyncObject>,
    {
        let api: Api<K> = Api::all(self.client.clone());
        let list = api.list(&ListParams::default().labels(selector)).await?;
        Ok(list.items.into_iter().map(Into::into).collect())
    }
}

#[async_trait]
impl ResourceStore for KubeStore {
    #[instrument(skip(self))]
    async fn list_namespaces(&self) -> Result<Vec<String>> {
        let namespaces: Api<Namespace> = Api::all(self.client.clone());
        let list = namespaces.list(&ListParams::default()).await?;
        debug!("Listed {} namespaces", list.items.len());
        Ok(list.items.iter().map(|ns| ns.name_any()).collect())
    }

    async fn get(&self, target: &ResourceRef) -> Result<Option<SyncObject>> {
        Ok(match target.kind {
            ResourceKind::ConfigMap => self.get_as::<ConfigMap>(target).await?.map(Into::into),
            ResourceKind::Secret => self.get_as::<Secret>(target).await?.map(Into::into),
        })
    }

    async fn create(&self, object: &SyncObject) -> Result<()> {
        object.resource_ref()?;
        match object {
            SyncObject::ConfigMap(cm) => self.create_as(cm).await,
            SyncObject::Secret(s) => self.create_as(s).await,
        }
    }

    async fn replace(&self, object: &SyncObject) -> Result<()> {
        object.resource_ref()?;
        match object {
            SyncObject::ConfigMap(cm) => self.replace_as(cm).await,
            SyncObject::Secret(s) => self.replace_as(s).await,
        }
    }

    async fn delete(&self, target: &ResourceRef) -> Result<()> {
        match target.kind {
            ResourceKind::ConfigMap => self.delete_as::<ConfigMap>(target).await,
            ResourceKind::Secret => self.delete_as::<Secret>(target).await,
        }
    }

    #[instrument(skip(self))]
    async fn list_labelled(&self, kind: ResourceKind, selector: &str) -> Result<Vec<SyncObject>> {
        match kind {
            ResourceKind::ConfigMap => self.list_as::<ConfigMap>(selector).await,
            ResourceKind::Secret => self.list_as::<Secret>(selector).await,
        }
    }
}

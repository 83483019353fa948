// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Mirrorable resources and their metadata.

use crate::constants::{labels, FINALIZER, OPERATOR_NAME};
use crate::error::{Result, SynatorError};
use k8s_openapi::api::core::v1::{ConfigMap, Secret};
use kube::{api::ObjectMeta, ResourceExt};
use std::collections::BTreeMap;
use std::fmt;

/// The two kinds of resources that can be mirrored
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ResourceKind {
    ConfigMap,
    Secret,
}

impl ResourceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceKind::ConfigMap => "ConfigMap",
            ResourceKind::Secret => "Secret",
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Identifies a resource by kind, namespace and name
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ResourceRef {
    pub kind: ResourceKind,
    pub namespace: String,
    pub name: String,
}

impl ResourceRef {
    pub fn new(kind: ResourceKind, namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            kind,
            namespace: namespace.into(),
            name: name.into(),
        }
    }

    /// The same resource, moved to another namespace
    pub fn in_namespace(&self, namespace: &str) -> Self {
        Self::new(self.kind, namespace, self.name.clone())
    }
}

impl fmt::Display for ResourceRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}/{}", self.kind, self.namespace, self.name)
    }
}

/// Labels and annotations of a resource. Both maps are always present.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResourceMetadata {
    pub labels: BTreeMap<String, String>,
    pub annotations: BTreeMap<String, String>,
}

/// A ConfigMap or a Secret as handled by the sync engine
#[derive(Debug, Clone, PartialEq)]
pub enum SyncObject {
    ConfigMap(ConfigMap),
    Secret(Secret),
}

impl From<ConfigMap> for SyncObject {
    fn from(config_map: ConfigMap) -> Self {
        SyncObject::ConfigMap(config_map)
    }
}

impl From<Secret> for SyncObject {
    fn from(secret: Secret) -> Self {
        SyncObject::Secret(secret)
    }
}

impl SyncObject {
    pub fn kind(&self) -> ResourceKind {
        match self {
            SyncObject::ConfigMap(_) => ResourceKind::ConfigMap,
            SyncObject::Secret(_) => ResourceKind::Secret,
        }
    }

    pub fn meta(&self) -> &ObjectMeta {
        match self {
            SyncObject::ConfigMap(cm) => &cm.metadata,
            SyncObject::Secret(s) => &s.metadata,
        }
    }

    fn meta_mut(&mut self) -> &mut ObjectMeta {
        match self {
            SyncObject::ConfigMap(cm) => &mut cm.metadata,
            SyncObject::Secret(s) => &mut s.metadata,
        }
    }

    pub fn name(&self) -> String {
        match self {
            SyncObject::ConfigMap(cm) => cm.name_any(),
            SyncObject::Secret(s) => s.name_any(),
        }
    }

    pub fn namespace(&self) -> Option<String> {
        self.meta().namespace.clone()
    }

    pub fn labels(&self) -> &BTreeMap<String, String> {
        match self {
            SyncObject::ConfigMap(cm) => cm.labels(),
            SyncObject::Secret(s) => s.labels(),
        }
    }

    pub fn annotations(&self) -> &BTreeMap<String, String> {
        match self {
            SyncObject::ConfigMap(cm) => cm.annotations(),
            SyncObject::Secret(s) => s.annotations(),
        }
    }

    pub fn metadata(&self) -> ResourceMetadata {
        ResourceMetadata {
            labels: self.labels().clone(),
            annotations: self.annotations().clone(),
        }
    }

    /// Reference to this object; fails when name or namespace is missing
    pub fn resource_ref(&self) -> Result<ResourceRef> {
        let meta = self.meta();
        let (Some(name), Some(namespace)) = (meta.name.as_ref(), meta.namespace.as_ref()) else {
            return Err(SynatorError::InvalidResource(format!(
                "{} without name or namespace",
                self.kind()
            )));
        };
        Ok(ResourceRef::new(self.kind(), namespace.clone(), name.clone()))
    }

    /// Whether this object carries the ownership label
    pub fn is_managed(&self) -> bool {
        self.labels()
            .get(labels::MANAGED_BY)
            .is_some_and(|v| v == OPERATOR_NAME)
    }

    /// Whether the API server is waiting for finalizers before removing it
    pub fn is_terminating(&self) -> bool {
        self.meta().deletion_timestamp.is_some()
    }

    pub fn has_finalizer(&self) -> bool {
        self.meta()
            .finalizers
            .as_ref()
            .is_some_and(|f| f.iter().any(|name| name == FINALIZER))
    }

    /// This object with the cleanup finalizer added
    pub fn with_finalizer(&self) -> SyncObject {
        let mut claimed = self.clone();
        let finalizers = claimed.meta_mut().finalizers.get_or_insert_with(Vec::new);
        if !finalizers.iter().any(|name| name == FINALIZER) {
            finalizers.push(FINALIZER.to_string());
        }
        claimed
    }

    /// This object with the cleanup finalizer removed
    pub fn without_finalizer(&self) -> SyncObject {
        let mut released = self.clone();
        if let Some(finalizers) = released.meta_mut().finalizers.as_mut() {
            finalizers.retain(|name| name != FINALIZER);
        }
        released
    }

    /// A fresh object holding only the payload of this one and the given
    /// labels and annotations. Name, namespace and system fields are left
    /// unset.
    pub fn duplicate(&self, metadata: ResourceMetadata) -> SyncObject {
        let meta = ObjectMeta {
            labels: Some(metadata.labels),
            annotations: Some(metadata.annotations),
            ..Default::default()
        };

        match self {
            SyncObject::ConfigMap(cm) => SyncObject::ConfigMap(ConfigMap {
                metadata: meta,
                data: cm.data.clone(),
                binary_data: cm.binary_data.clone(),
                immutable: cm.immutable,
            }),
            SyncObject::Secret(s) => SyncObject::Secret(Secret {
                metadata: meta,
                data: s.data.clone(),
                string_data: s.string_data.clone(),
                type_: s.type_.clone(),
                immutable: s.immutable,
            }),
        }
    }

    /// Address this copy to `target` and mark it as managed
    pub fn place(&mut self, target: &ResourceRef) {
        let meta = self.meta_mut();
        meta.name = Some(target.name.clone());
        meta.namespace = Some(target.namespace.clone());
        meta.labels
            .get_or_insert_with(BTreeMap::new)
            .insert(labels::MANAGED_BY.to_string(), OPERATOR_NAME.to_string());
    }

    /// This existing object with its labels, annotations and payload replaced
    /// by those of `copy`. Identity and system fields of `self` are kept.
    pub fn replaced_with(&self, copy: &SyncObject) -> Result<SyncObject> {
        let mut updated = match (self, copy) {
            (SyncObject::ConfigMap(existing), SyncObject::ConfigMap(new)) => {
                SyncObject::ConfigMap(ConfigMap {
                    metadata: existing.metadata.clone(),
                    data: new.data.clone(),
                    binary_data: new.binary_data.clone(),
                    immutable: new.immutable,
                })
            }
            (SyncObject::Secret(existing), SyncObject::Secret(new)) => SyncObject::Secret(Secret {
                metadata: existing.metadata.clone(),
                data: new.data.clone(),
                string_data: new.string_data.clone(),
                type_: new.type_.clone(),
                immutable: new.immutable,
            }),
            _ => {
                return Err(SynatorError::InvalidResource(format!(
                    "cannot replace {} with {}",
                    self.kind(),
                    copy.kind()
                )))
            }
        };

        let meta = updated.meta_mut();
        meta.labels = Some(copy.labels().clone());
        meta.annotations = Some(copy.annotations().clone());
        Ok(updated)
    }
}

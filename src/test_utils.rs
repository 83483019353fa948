// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Test utilities for mocking the Kubernetes API and the resource store.

use crate::error::{Result, SynatorError};
use crate::kubernetes::ResourceStore;
use crate::types::{ResourceKind, ResourceRef, SyncObject};
use async_trait::async_trait;
use http::{Request, Response};
use k8s_openapi::api::core::v1::{ConfigMap, Secret};
use k8s_openapi::apimachinery::pkg::apis::meta::v1::Time;
use k8s_openapi::ByteString;
use kube::api::ObjectMeta;
use kube::client::Body;
use kube::core::ErrorResponse;
use kube::Client;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::{Arc, Mutex};
use std::task::{Context, Poll};
use tower::Service;

/// A mock HTTP service that returns predefined responses based on request paths.
#[derive(Clone)]
pub struct MockService {
    responses: Arc<Mutex<HashMap<(String, String), (u16, String)>>>,
    requests: Arc<Mutex<Vec<(String, String)>>>,
}

impl MockService {
    pub fn new() -> Self {
        Self {
            responses: Arc::new(Mutex::new(HashMap::new())),
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    fn on(self, method: &str, path: &str, status: u16, body: &str) -> Self {
        self.responses
            .lock()
            .unwrap()
            .insert((method.to_string(), path.to_string()), (status, body.to_string()));
        self
    }

    /// Add a response for GET requests matching the exact path
    pub fn on_get(self, path: &str, status: u16, body: &str) -> Self {
        self.on("GET", path, status, body)
    }

    /// Add a response for POST requests matching the exact path
    pub fn on_post(self, path: &str, status: u16, body: &str) -> Self {
        self.on("POST", path, status, body)
    }

    /// Add a response for PUT requests matching the exact path
    pub fn on_put(self, path: &str, status: u16, body: &str) -> Self {
        self.on("PUT", path, status, body)
    }

    /// Add a response for DELETE requests matching the exact path
    pub fn on_delete(self, path: &str, status: u16, body: &str) -> Self {
        self.on("DELETE", path, status, body)
    }

    /// Build a kube Client from this mock service
    pub fn into_client(self) -> Client {
        Client::new(self, "https://kubernetes.default.svc")
    }

    /// Every (method, path) received so far
    pub fn requests(&self) -> Vec<(String, String)> {
        self.requests.lock().unwrap().clone()
    }

    pub fn was_called(&self, method: &str, path: &str) -> bool {
        self.requests()
            .iter()
            .any(|(m, p)| m == method && p == path)
    }

    fn find_response(&self, method: &str, path: &str) -> Option<(u16, String)> {
        self.responses
            .lock()
            .unwrap()
            .get(&(method.to_string(), path.to_string()))
            .cloned()
    }
}

impl Default for MockService {
    fn default() -> Self {
        Self::new()
    }
}

impl Service<Request<Body>> for MockService {
    type Response = Response<Body>;
    type Error = tower::BoxError;
    type Future = std::pin::Pin<
        Box<dyn std::future::Future<Output = std::result::Result<Self::Response, Self::Error>> + Send>,
    >;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<std::result::Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, req: Request<Body>) -> Self::Future {
        let method = req.method().to_string();
        let path = req.uri().path().to_string();

        let response = self.find_response(&method, &path);
        self.requests.lock().unwrap().push((method, path));

        Box::pin(async move {
            let (status, body) = response.unwrap_or_else(|| (404, not_found_json("resource", "unknown")));
            Ok(Response::builder()
                .status(status)
                .header("content-type", "application/json")
                .body(Body::from(body.into_bytes()))
                .unwrap())
        })
    }
}

/// Create a mock namespace JSON object
pub fn namespace_json(name: &str) -> serde_json::Value {
    serde_json::json!({
        "apiVersion": "v1",
        "kind": "Namespace",
        "metadata": {
            "name": name,
            "uid": "test-uid"
        }
    })
}

/// Wrap items in a list response
pub fn list_json(kind: &str, items: Vec<serde_json::Value>) -> String {
    serde_json::json!({
        "apiVersion": "v1",
        "kind": kind,
        "metadata": { "resourceVersion": "1" },
        "items": items
    })
    .to_string()
}

/// Create a mock ConfigMap JSON response
pub fn config_map_json(namespace: &str, name: &str, labels: &[(&str, &str)]) -> String {
    config_map_value(namespace, name, labels).to_string()
}

/// Create a mock ConfigMap JSON object
pub fn config_map_value(namespace: &str, name: &str, labels: &[(&str, &str)]) -> serde_json::Value {
    let labels: serde_json::Map<String, serde_json::Value> = labels
        .iter()
        .map(|(k, v)| (k.to_string(), serde_json::Value::String(v.to_string())))
        .collect();
    serde_json::json!({
        "apiVersion": "v1",
        "kind": "ConfigMap",
        "metadata": {
            "name": name,
            "namespace": namespace,
            "resourceVersion": "1",
            "labels": labels
        },
        "data": { "key": "value" }
    })
}

/// Create a 404 not found response
pub fn not_found_json(resource: &str, name: &str) -> String {
    serde_json::json!({
        "kind": "Status",
        "apiVersion": "v1",
        "status": "Failure",
        "message": format!("{} \"{}\" not found", resource, name),
        "reason": "NotFound",
        "code": 404
    })
    .to_string()
}

fn string_map(entries: &[(&str, &str)]) -> BTreeMap<String, String> {
    entries
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

fn object_meta(namespace: &str, name: &str, labels: &[(&str, &str)], annotations: &[(&str, &str)]) -> ObjectMeta {
    ObjectMeta {
        name: Some(name.to_string()),
        namespace: Some(namespace.to_string()),
        labels: Some(string_map(labels)),
        annotations: Some(string_map(annotations)),
        ..Default::default()
    }
}

/// A ConfigMap holding `key=value`
pub fn config_map(
    namespace: &str,
    name: &str,
    labels: &[(&str, &str)],
    annotations: &[(&str, &str)],
) -> SyncObject {
    SyncObject::ConfigMap(ConfigMap {
        metadata: object_meta(namespace, name, labels, annotations),
        data: Some(string_map(&[("key", "value")])),
        ..Default::default()
    })
}

/// An Opaque Secret holding `password=secret123`
pub fn secret(
    namespace: &str,
    name: &str,
    labels: &[(&str, &str)],
    annotations: &[(&str, &str)],
) -> SyncObject {
    SyncObject::Secret(Secret {
        metadata: object_meta(namespace, name, labels, annotations),
        data: Some(BTreeMap::from([(
            "password".to_string(),
            ByteString(b"secret123".to_vec()),
        )])),
        type_: Some("Opaque".to_string()),
        ..Default::default()
    })
}

/// The same object with a deletion timestamp, as seen while finalizers block
/// its removal
pub fn terminating(object: SyncObject) -> SyncObject {
    let mut object = object;
    let meta = match &mut object {
        SyncObject::ConfigMap(cm) => &mut cm.metadata,
        SyncObject::Secret(s) => &mut s.metadata,
    };
    meta.deletion_timestamp = Some(Time(k8s_openapi::chrono::Utc::now()));
    object
}

fn api_error(code: u16, reason: &str, message: String) -> SynatorError {
    SynatorError::KubeError(kube::Error::Api(ErrorResponse {
        status: "Failure".to_string(),
        message,
        reason: reason.to_string(),
        code,
    }))
}

/// In-memory [`ResourceStore`] recording every write
#[derive(Default)]
pub struct MemoryStore {
    namespaces: Mutex<Vec<String>>,
    objects: Mutex<BTreeMap<ResourceRef, SyncObject>>,
    failing_namespaces: Mutex<BTreeSet<String>>,
    failing_lists: Mutex<BTreeSet<ResourceKind>>,
    operations: Mutex<Vec<String>>,
}

impl MemoryStore {
    pub fn with_namespaces(names: &[&str]) -> Self {
        let store = Self::default();
        for name in names {
            store.add_namespace(name);
        }
        store
    }

    pub fn add_namespace(&self, name: &str) {
        self.namespaces.lock().unwrap().push(name.to_string());
    }

    /// Seed an object without recording an operation
    pub fn insert(&self, object: SyncObject) {
        let target = object.resource_ref().unwrap();
        self.objects.lock().unwrap().insert(target, object);
    }

    pub fn object(&self, kind: ResourceKind, namespace: &str, name: &str) -> Option<SyncObject> {
        self.objects
            .lock()
            .unwrap()
            .get(&ResourceRef::new(kind, namespace, name))
            .cloned()
    }

    pub fn object_count(&self) -> usize {
        self.objects.lock().unwrap().len()
    }

    /// Make every read and write in `namespace` fail
    pub fn fail_namespace(&self, namespace: &str) {
        self.failing_namespaces
            .lock()
            .unwrap()
            .insert(namespace.to_string());
    }

    pub fn fail_list(&self, kind: ResourceKind) {
        self.failing_lists.lock().unwrap().insert(kind);
    }

    /// Writes performed so far, e.g. `create ConfigMap b/cfg`
    pub fn operations(&self) -> Vec<String> {
        self.operations.lock().unwrap().clone()
    }

    fn check(&self, target: &ResourceRef) -> Result<()> {
        if self.failing_namespaces.lock().unwrap().contains(&target.namespace) {
            return Err(api_error(403, "Forbidden", format!("{} is forbidden", target)));
        }
        Ok(())
    }

    fn record(&self, operation: &str, target: &ResourceRef) {
        self.operations
            .lock()
            .unwrap()
            .push(format!("{} {}", operation, target));
    }
}

#[async_trait]
impl ResourceStore for MemoryStore {
    async fn list_namespaces(&self) -> Result<Vec<String>> {
        Ok(self.namespaces.lock().unwrap().clone())
    }

    async fn get(&self, target: &ResourceRef) -> Result<Option<SyncObject>> {
        self.check(target)?;
        Ok(self.objects.lock().unwrap().get(target).cloned())
    }

    async fn create(&self, object: &SyncObject) -> Result<()> {
        let target = object.resource_ref()?;
        self.check(&target)?;
        let mut objects = self.objects.lock().unwrap();
        if objects.contains_key(&target) {
            return Err(api_error(409, "AlreadyExists", format!("{} already exists", target)));
        }
        objects.insert(target.clone(), object.clone());
        self.record("create", &target);
        Ok(())
    }

    async fn replace(&self, object: &SyncObject) -> Result<()> {
        let target = object.resource_ref()?;
        self.check(&target)?;
        let mut objects = self.objects.lock().unwrap();
        if !objects.contains_key(&target) {
            return Err(api_error(404, "NotFound", format!("{} not found", target)));
        }
        objects.insert(target.clone(), object.clone());
        self.record("replace", &target);
        Ok(())
    }

    async fn delete(&self, target: &ResourceRef) -> Result<()> {
        self.check(target)?;
        if self.objects.lock().unwrap().remove(target).is_none() {
            return Err(api_error(404, "NotFound", format!("{} not found", target)));
        }
        self.record("delete", target);
        Ok(())
    }

    async fn list_labelled(&self, kind: ResourceKind, selector: &str) -> Result<Vec<SyncObject>> {
        if self.failing_lists.lock().unwrap().contains(&kind) {
            return Err(api_error(500, "InternalError", format!("cannot list {}", kind)));
        }
        let (key, value) = selector.split_once('=').unwrap_or((selector, ""));
        Ok(self
            .objects
            .lock()
            .unwrap()
            .values()
            .filter(|o| o.kind() == kind)
            .filter(|o| o.labels().get(key).is_some_and(|v| v == value))
            .cloned()
            .collect())
    }
}

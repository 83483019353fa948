// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Resource reconciler - watches sync-enabled ConfigMaps or Secrets and
//! notifies the sync manager.

use crate::constants::sync_label_selector;
use crate::sync::{SyncEvent, SyncManagerHandle};
use crate::types::SyncObject;
use futures::{pin_mut, StreamExt};
use k8s_openapi::NamespaceResourceScope;
use kube::{Api, Client, Resource};
use kube_runtime::{watcher, WatchStreamExt};
use serde::de::DeserializeOwned;
use std::fmt::Debug;
use std::marker::PhantomData;
use tracing::{debug, info, warn};

pub struct ResourceReconciler<K> {
    client: Client,
    sync_handle: SyncManagerHandle,
    _kind: PhantomData<fn() -> K>,
}

impl<K> ResourceReconciler<K>
where
    K: Resource<Scope = NamespaceResourceScope, DynamicType = ()>
        + Clone
        + DeserializeOwned
        + Debug
        + Send
        + 'static
        + Into<SyncObject>,
{
    pub fn new(client: Client, sync_handle: SyncManagerHandle) -> Self {
        Self {
            client,
            sync_handle,
            _kind: PhantomData,
        }
    }

    pub async fn run(self) -> anyhow::Result<()> {
        let kind = K::kind(&());
        let resources: Api<K> = Api::all(self.client.clone());
        let watcher_config = watcher::Config::default().labels(&sync_label_selector());

        let stream = watcher(resources, watcher_config).default_backoff();
        pin_mut!(stream);

        info!("Watching {} resources labelled {}", kind, sync_label_selector());

        while let Some(event) = stream.next().await {
            match event {
                Ok(event) => {
                    if let Some(sync_event) = to_sync_event(event) {
                        self.sync_handle.send(sync_event).await;
                    }
                }
                Err(e) => {
                    warn!("Error watching {} resources: {}", kind, e);
                }
            }
        }

        warn!("{} watch stream ended", kind);
        Ok(())
    }
}

/// Translate a watch event into the event the sync manager acts on.
/// Objects listed at (re)start are treated like updates. A `Delete` only
/// means the object left the labelled set; the manager checks whether the
/// source is actually gone.
fn to_sync_event<K: Into<SyncObject>>(event: watcher::Event<K>) -> Option<SyncEvent> {
    match event {
        watcher::Event::Apply(object) | watcher::Event::InitApply(object) => {
            Some(SyncEvent::ResourceChanged {
                object: object.into(),
            })
        }
        watcher::Event::Delete(object) => Some(SyncEvent::ResourceDeleted {
            object: object.into(),
        }),
        watcher::Event::Init | watcher::Event::InitDone => {
            debug!("Initial listing boundary");
            None
        }
    }
}

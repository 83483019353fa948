// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Namespace reconciler - watches Namespaces and notifies the sync manager
//! of namespaces that were not seen before.

use crate::sync::{SyncEvent, SyncManagerHandle};
use futures::{pin_mut, StreamExt};
use k8s_openapi::api::core::v1::Namespace;
use kube::{Api, Client, ResourceExt};
use kube_runtime::{watcher, WatchStreamExt};
use std::collections::BTreeSet;
use tracing::{debug, info, warn};

/// Tracks known namespaces across watch (re)listings
#[derive(Debug, Default)]
pub struct NamespaceTracker {
    known: BTreeSet<String>,
    listing: BTreeSet<String>,
    initialised: bool,
}

impl NamespaceTracker {
    pub fn begin_listing(&mut self) {
        self.listing.clear();
    }

    pub fn listed(&mut self, name: String) {
        self.listing.insert(name);
    }

    /// Complete a listing and return the namespaces that appeared since the
    /// previous one. The first listing only seeds the known set.
    pub fn finish_listing(&mut self) -> Vec<String> {
        let listing = std::mem::take(&mut self.listing);
        let created = if self.initialised {
            listing.difference(&self.known).cloned().collect()
        } else {
            Vec::new()
        };
        self.known = listing;
        self.initialised = true;
        created
    }

    /// Record an applied namespace; true when it was not known yet
    pub fn applied(&mut self, name: String) -> bool {
        self.known.insert(name)
    }

    pub fn deleted(&mut self, name: &str) {
        self.known.remove(name);
    }
}

pub struct NamespaceReconciler {
    client: Client,
    sync_handle: SyncManagerHandle,
}

impl NamespaceReconciler {
    pub fn new(client: Client, sync_handle: SyncManagerHandle) -> Self {
        Self { client, sync_handle }
    }

    pub async fn run(self) -> anyhow::Result<()> {
        let namespaces: Api<Namespace> = Api::all(self.client.clone());
        let stream = watcher(namespaces, watcher::Config::default()).default_backoff();
        pin_mut!(stream);

        info!("Watching namespaces");
        let mut tracker = NamespaceTracker::default();

        while let Some(event) = stream.next().await {
            let created = match event {
                Ok(watcher::Event::Init) => {
                    tracker.begin_listing();
                    Vec::new()
                }
                Ok(watcher::Event::InitApply(ns)) => {
                    tracker.listed(ns.name_any());
                    Vec::new()
                }
                Ok(watcher::Event::InitDone) => tracker.finish_listing(),
                Ok(watcher::Event::Apply(ns)) => {
                    let name = ns.name_any();
                    if tracker.applied(name.clone()) {
                        vec![name]
                    } else {
                        Vec::new()
                    }
                }
                Ok(watcher::Event::Delete(ns)) => {
                    debug!("Namespace {} deleted", ns.name_any());
                    tracker.deleted(&ns.name_any());
                    Vec::new()
                }
                Err(e) => {
                    warn!("Error watching namespaces: {}", e);
                    Vec::new()
                }
            };

            for name in created {
                self.sync_handle
                    .send(SyncEvent::NamespaceCreated { name })
                    .await;
            }
        }

        warn!("Namespace watch stream ended");
        Ok(())
    }
}

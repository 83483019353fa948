// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Central coordinator feeding watch events into the sync engine.

use crate::constants::{sync_label_selector, EVENT_CHANNEL_CAPACITY};
use crate::kubernetes::ResourceStore;
use crate::sync::engine::SyncEngine;
use crate::types::SyncObject;
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

/// Events that reconcilers send to the SyncManager
#[derive(Debug, Clone)]
pub enum SyncEvent {
    /// A sync-enabled ConfigMap or Secret was created or updated
    ResourceChanged { object: SyncObject },
    /// A sync-enabled ConfigMap or Secret was deleted
    ResourceDeleted { object: SyncObject },
    /// A namespace appeared in the cluster
    NamespaceCreated { name: String },
}

/// Central coordinator for mirroring resources.
/// Receives events from reconcilers and runs them through the engine one at a time.
pub struct SyncManager<S> {
    engine: SyncEngine<S>,
    event_rx: mpsc::Receiver<SyncEvent>,
}

/// Handle to send events to the SyncManager
#[derive(Clone)]
pub struct SyncManagerHandle {
    event_tx: mpsc::Sender<SyncEvent>,
}

impl SyncManagerHandle {
    pub async fn send(&self, event: SyncEvent) {
        if let Err(e) = self.event_tx.send(event).await {
            error!("Failed to send event to SyncManager: {}", e);
        }
    }
}

impl<S: ResourceStore> SyncManager<S> {
    pub fn new(engine: SyncEngine<S>) -> (Self, SyncManagerHandle) {
        let (event_tx, event_rx) = mpsc::channel(EVENT_CHANNEL_CAPACITY);

        let manager = Self { engine, event_rx };
        let handle = SyncManagerHandle { event_tx };
        (manager, handle)
    }

    /// Process events until every handle has been dropped
    pub async fn run(mut self) -> anyhow::Result<()> {
        info!("SyncManager started, listening for events...");

        while let Some(event) = self.event_rx.recv().await {
            self.handle_event(event).await;
        }

        info!("SyncManager stopped, all event sources closed");
        Ok(())
    }

    async fn handle_event(&self, event: SyncEvent) {
        match event {
            SyncEvent::ResourceChanged { object } => {
                if !self.is_watched(&object) {
                    if object.is_terminating() {
                        self.release(&object).await;
                    }
                    return;
                }
                if object.is_terminating() {
                    self.finalize(&object).await;
                    return;
                }
                if let Err(e) = self.engine.claim_source(&object).await {
                    warn!(
                        "Could not add finalizer to {} {}/{}: {}",
                        object.kind(),
                        object.namespace().unwrap_or_default(),
                        object.name(),
                        e
                    );
                }
                if let Err(e) = self.engine.sync_resource(&object).await {
                    error!(
                        "Failed to sync {} {}/{}: {}",
                        object.kind(),
                        object.namespace().unwrap_or_default(),
                        object.name(),
                        e
                    );
                }
            }
            SyncEvent::ResourceDeleted { object } => {
                if !self.is_watched(&object) {
                    return;
                }
                match self.engine.is_source_deleted(&object).await {
                    Ok(true) => self.finalize(&object).await,
                    Ok(false) => {
                        info!(
                            "{} {}/{} is no longer labelled {}, keeping its copies",
                            object.kind(),
                            object.namespace().unwrap_or_default(),
                            object.name(),
                            sync_label_selector()
                        );
                        self.release(&object).await;
                    }
                    Err(e) => {
                        error!(
                            "Could not check whether {} {}/{} was deleted, keeping its copies: {}",
                            object.kind(),
                            object.namespace().unwrap_or_default(),
                            object.name(),
                            e
                        );
                    }
                }
            }
            SyncEvent::NamespaceCreated { name } => {
                info!("Namespace {} created, backfilling sync-enabled resources", name);
                self.engine.backfill_namespace(&name).await;
            }
        }
    }

    async fn finalize(&self, object: &SyncObject) {
        if let Err(e) = self.engine.finalize_source(object).await {
            error!(
                "Failed to delete copies of {} {}/{}: {}",
                object.kind(),
                object.namespace().unwrap_or_default(),
                object.name(),
                e
            );
        }
    }

    async fn release(&self, object: &SyncObject) {
        let result = match object.resource_ref() {
            Ok(source_ref) => self.engine.release_source(&source_ref).await,
            Err(e) => Err(e),
        };
        if let Err(e) = result {
            warn!(
                "Could not remove finalizer from {} {}/{}: {}",
                object.kind(),
                object.namespace().unwrap_or_default(),
                object.name(),
                e
            );
        }
    }

    fn is_watched(&self, object: &SyncObject) -> bool {
        let namespace = object.namespace().unwrap_or_default();
        let watched = self.engine.config().watches(&namespace);
        if !watched {
            debug!(
                "Ignoring {} {}/{}, namespace is not watched",
                object.kind(),
                namespace,
                object.name()
            );
        }
        watched
    }
}

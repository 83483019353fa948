// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Propagation of sources into target namespaces, guarded deletion of
//! copies and backfill of new namespaces.

use crate::config::Config;
use crate::constants::{labels, sync_label_selector, FINALIZER, OPERATOR_NAME};
use crate::error::Result;
use crate::kubernetes::ResourceStore;
use crate::sync::directive::SyncDirective;
use crate::sync::sanitize::sanitize;
use crate::sync::targets::{restrict_targets, select_targets};
use crate::types::{ResourceKind, ResourceRef, SyncObject};
use tracing::{debug, error, info, instrument, warn};

/// Counts of what a single invocation did
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Summary {
    pub created: usize,
    pub updated: usize,
    pub deleted: usize,
    pub skipped: usize,
    pub failed: usize,
}

enum Upserted {
    Created,
    Updated,
}

enum Removal {
    Deleted,
    Absent,
    NotManaged,
}

/// Mirrors sources into target namespaces through a [`ResourceStore`]
pub struct SyncEngine<S> {
    store: S,
    config: Config,
}

impl<S: ResourceStore> SyncEngine<S> {
    pub fn new(store: S, config: Config) -> Self {
        Self { store, config }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Create or update a copy of `source` in every target namespace
    #[instrument(skip(self, source), fields(kind = %source.kind(), name = %source.name()))]
    pub async fn sync_resource(&self, source: &SyncObject) -> Result<Summary> {
        let source_ref = source.resource_ref()?;
        let directive = SyncDirective::from_annotations(source.annotations());
        let targets = self.target_namespaces(&source_ref, &directive).await?;
        let copy = mirror_copy(source);

        let mut summary = Summary::default();
        for namespace in &targets {
            let target = source_ref.in_namespace(namespace);
            let result = self.upsert(&copy, &target).await;
            record_upsert(&mut summary, &target, result);
        }

        info!(
            "Synced {} to {} namespaces ({} created, {} updated, {} failed)",
            source_ref,
            targets.len(),
            summary.created,
            summary.updated,
            summary.failed
        );
        Ok(summary)
    }

    /// Remove the copies of a deleted source, leaving unmanaged objects alone
    #[instrument(skip(self, source), fields(kind = %source.kind(), name = %source.name()))]
    pub async fn delete_resource(&self, source: &SyncObject) -> Result<Summary> {
        let source_ref = source.resource_ref()?;
        let directive = SyncDirective::from_annotations(source.annotations());
        let targets = self.target_namespaces(&source_ref, &directive).await?;

        let mut summary = Summary::default();
        for namespace in &targets {
            let target = source_ref.in_namespace(namespace);
            match self.remove(&target).await {
                Ok(Removal::Deleted) => {
                    info!("Deleted {}", target);
                    summary.deleted += 1;
                }
                Ok(Removal::Absent) => {
                    debug!("{} does not exist, nothing to delete", target);
                }
                Ok(Removal::NotManaged) => {
                    info!(
                        "Not deleting {} because label '{}={}' is missing",
                        target,
                        labels::MANAGED_BY,
                        OPERATOR_NAME
                    );
                    summary.skipped += 1;
                }
                Err(e) => {
                    error!("Could not delete {}: {}", target, e);
                    summary.failed += 1;
                }
            }
        }

        Ok(summary)
    }

    /// Put the cleanup finalizer on a live source. Returns false when there was
    /// nothing to do.
    pub async fn claim_source(&self, source: &SyncObject) -> Result<bool> {
        if source.has_finalizer() || source.is_terminating() {
            return Ok(false);
        }
        self.store.replace(&source.with_finalizer()).await?;
        debug!("Added finalizer '{}' to {}", FINALIZER, source.resource_ref()?);
        Ok(true)
    }

    /// Take the cleanup finalizer off the current version of a source, if it
    /// still exists and carries it
    pub async fn release_source(&self, source_ref: &ResourceRef) -> Result<()> {
        match self.store.get(source_ref).await? {
            Some(live) if live.has_finalizer() => {
                self.store.replace(&live.without_finalizer()).await?;
                debug!("Removed finalizer '{}' from {}", FINALIZER, source_ref);
            }
            _ => {}
        }
        Ok(())
    }

    /// Whether a source reported as gone by the watch was really deleted, as
    /// opposed to no longer carrying the sync label
    pub async fn is_source_deleted(&self, source: &SyncObject) -> Result<bool> {
        if source.is_terminating() {
            return Ok(true);
        }
        let source_ref = source.resource_ref()?;
        Ok(match self.store.get(&source_ref).await? {
            None => true,
            Some(live) => live.is_terminating(),
        })
    }

    /// Delete the copies of a source that is going away, then let the API
    /// server finish removing it. The finalizer stays while any copy could
    /// not be handled, so the next event for the source retries.
    #[instrument(skip(self, source), fields(kind = %source.kind(), name = %source.name()))]
    pub async fn finalize_source(&self, source: &SyncObject) -> Result<Summary> {
        let source_ref = source.resource_ref()?;
        let summary = self.delete_resource(source).await?;

        if summary.failed > 0 {
            warn!(
                "Keeping finalizer on {}, {} copies could not be deleted",
                source_ref, summary.failed
            );
        } else {
            self.release_source(&source_ref).await?;
        }
        Ok(summary)
    }

    /// Propagate every sync-enabled source into a newly created namespace
    #[instrument(skip(self))]
    pub async fn backfill_namespace(&self, namespace: &str) -> Summary {
        let mut summary = Summary::default();

        for kind in [ResourceKind::Secret, ResourceKind::ConfigMap] {
            let sources = match self
                .store
                .list_labelled(kind, &sync_label_selector())
                .await
            {
                Ok(sources) => sources,
                Err(e) => {
                    error!(
                        "Failed to list {} resources to backfill namespace {}: {}",
                        kind, namespace, e
                    );
                    summary.failed += 1;
                    continue;
                }
            };

            debug!("Found {} sync-enabled {} resources", sources.len(), kind);

            for source in &sources {
                self.backfill_source(source, namespace, &mut summary).await;
            }
        }

        info!(
            "Backfilled namespace {} ({} created, {} updated, {} failed)",
            namespace, summary.created, summary.updated, summary.failed
        );
        summary
    }

    async fn backfill_source(&self, source: &SyncObject, namespace: &str, summary: &mut Summary) {
        let source_ref = match source.resource_ref() {
            Ok(r) => r,
            Err(e) => {
                warn!("Skipping source during backfill: {}", e);
                return;
            }
        };

        if source_ref.namespace == namespace {
            return;
        }

        if !self.config.watches(&source_ref.namespace) {
            debug!("{} is not in a watched namespace, skipping", source_ref);
            return;
        }

        let directive = SyncDirective::from_annotations(source.annotations());
        if restrict_targets(&directive, [namespace]).is_empty() {
            debug!("{} does not target namespace {}", source_ref, namespace);
            return;
        }

        let target = source_ref.in_namespace(namespace);
        let result = self.upsert(&mirror_copy(source), &target).await;
        record_upsert(summary, &target, result);
    }

    async fn target_namespaces(
        &self,
        source: &ResourceRef,
        directive: &SyncDirective,
    ) -> Result<Vec<String>> {
        for key in &directive.blank {
            warn!("{} has annotation '{}' without any usable entry", source, key);
        }

        let cluster_namespaces = self.store.list_namespaces().await?;
        let selection = select_targets(directive, &source.namespace, &cluster_namespaces);

        for namespace in &selection.unknown_includes {
            warn!(
                "{} includes namespace '{}' which does not exist, skipping",
                source, namespace
            );
        }
        for namespace in &selection.unknown_excludes {
            warn!(
                "{} excludes namespace '{}' which does not exist",
                source, namespace
            );
        }

        debug!("Target namespaces for {}: {:?}", source, selection.namespaces);
        Ok(selection.namespaces)
    }

    async fn upsert(&self, copy: &SyncObject, target: &ResourceRef) -> Result<Upserted> {
        let mut placed = copy.clone();
        placed.place(target);

        match self.store.get(target).await? {
            None => {
                self.store.create(&placed).await?;
                Ok(Upserted::Created)
            }
            Some(existing) => {
                self.store.replace(&existing.replaced_with(&placed)?).await?;
                Ok(Upserted::Updated)
            }
        }
    }

    async fn remove(&self, target: &ResourceRef) -> Result<Removal> {
        match self.store.get(target).await? {
            None => Ok(Removal::Absent),
            Some(existing) if existing.is_managed() => {
                self.store.delete(target).await?;
                Ok(Removal::Deleted)
            }
            Some(_) => Ok(Removal::NotManaged),
        }
    }
}

/// The sanitized, identity-free copy of a source
fn mirror_copy(source: &SyncObject) -> SyncObject {
    source.duplicate(sanitize(&source.metadata()))
}

fn record_upsert(summary: &mut Summary, target: &ResourceRef, result: Result<Upserted>) {
    match result {
        Ok(Upserted::Created) => {
            info!("Created {}", target);
            summary.created += 1;
        }
        Ok(Upserted::Updated) => {
            info!("Updated {}", target);
            summary.updated += 1;
        }
        Err(e) => {
            error!("Could not create or update {}: {}", target, e);
            summary.failed += 1;
        }
    }
}

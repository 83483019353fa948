// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use anyhow::Result;
use k8s_openapi::api::core::v1::{ConfigMap, Secret};
use kube::Client;
use tracing::{info, warn};

use synator::config::Config;
use synator::kubernetes::KubeStore;
use synator::reconcilers::{NamespaceReconciler, ResourceReconciler};
use synator::sync::{SyncEngine, SyncManager};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    info!("Starting Synator operator");

    // Load configuration
    let config = Config::from_env()?;
    info!("Watching namespaces: {}", config.describe_watched());

    // Create Kubernetes client
    let client = Client::try_default().await?;
    info!("Connected to Kubernetes cluster");

    // Create the sync manager and get a handle for reconcilers
    let engine = SyncEngine::new(KubeStore::new(client.clone()), config);
    let (sync_manager, sync_handle) = SyncManager::new(engine);

    let config_map_reconciler =
        ResourceReconciler::<ConfigMap>::new(client.clone(), sync_handle.clone());
    let secret_reconciler = ResourceReconciler::<Secret>::new(client.clone(), sync_handle.clone());
    let namespace_reconciler = NamespaceReconciler::new(client, sync_handle);

    info!("Starting reconcilers...");

    tokio::try_join!(
        sync_manager.run(),
        config_map_reconciler.run(),
        secret_reconciler.run(),
        namespace_reconciler.run()
    )?;

    // This should never be reached as reconcilers run forever
    warn!("All reconcilers stopped unexpectedly");
    Ok(())
}

// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Kubernetes access for the sync engine.

pub mod store;

pub use store::{KubeStore, ResourceStore};

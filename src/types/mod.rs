// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Domain types shared by the engine, the store and the watchers.

pub mod resource;

pub use resource::{ResourceKind, ResourceMetadata, ResourceRef, SyncObject};

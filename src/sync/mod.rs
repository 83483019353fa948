// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Mirroring logic: target selection, metadata sanitizing and propagation.

pub mod directive;
pub mod engine;
pub mod filter;
pub mod manager;
pub mod sanitize;
pub mod targets;

pub use directive::SyncDirective;
pub use engine::{Summary, SyncEngine};
pub use filter::{filter, filter_keys, MatchMode, Patterns};
pub use manager::{SyncEvent, SyncManager, SyncManagerHandle};
pub use sanitize::sanitize;
pub use targets::{restrict_targets, select_targets, TargetSelection};

// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

/// Prefix shared by every control label and annotation. Keys under it are
/// never propagated onto copies.
pub const CONTROL_PREFIX: &str = "synator/";

/// The operator name, used as field manager and ownership marker
pub const OPERATOR_NAME: &str = "synator";

/// Finalizer placed on sources so their copies are cleaned up even when the
/// deletion happens while Synator is not running
pub const FINALIZER: &str = "synator/cleanup";

/// Kubernetes label keys used by Synator
pub mod labels {
    /// When set to "yes", marks a ConfigMap or Secret for mirroring
    pub const SYNC: &str = "synator/sync";
    /// Value of [`SYNC`] that enables mirroring
    pub const SYNC_ENABLED: &str = "yes";
    /// Ownership label written on every copy
    pub const MANAGED_BY: &str = "app.kubernetes.io/managed-by";
}

/// Kubernetes annotation keys used by Synator
pub mod annotations {
    /// Comma-separated namespace names; authoritative target list when present
    pub const INCLUDE_NAMESPACES: &str = "synator/include-namespaces";
    /// Comma-separated namespace names removed from the default target list
    pub const EXCLUDE_NAMESPACES: &str = "synator/exclude-namespaces";
    /// Comma-separated label key prefixes to keep on copies
    pub const INCLUDE_LABELS: &str = "synator/include-labels";
    /// Comma-separated label key prefixes to drop from copies
    pub const EXCLUDE_LABELS: &str = "synator/exclude-labels";
    /// Comma-separated annotation key prefixes to keep on copies
    pub const INCLUDE_ANNOTATIONS: &str = "synator/include-annotations";
    /// Comma-separated annotation key prefixes to drop from copies
    pub const EXCLUDE_ANNOTATIONS: &str = "synator/exclude-annotations";
}

/// Label selector matching every source marked for mirroring
pub fn sync_label_selector() -> String {
    format!("{}={}", labels::SYNC, labels::SYNC_ENABLED)
}

/// Capacity of the channel between watchers and the sync manager
pub const EVENT_CHANNEL_CAPACITY: usize = 256;

// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Target namespace selection for a source resource.

use crate::sync::directive::SyncDirective;
use crate::sync::filter::{filter, MatchMode};

/// Namespaces selected for a source, plus directive entries that matched
/// nothing in the cluster.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TargetSelection {
    pub namespaces: Vec<String>,
    pub unknown_includes: Vec<String>,
    pub unknown_excludes: Vec<String>,
}

/// Select target namespaces among all `cluster_namespaces`. The source
/// namespace is never selected.
pub fn select_targets(
    directive: &SyncDirective,
    source_namespace: &str,
    cluster_namespaces: &[String],
) -> TargetSelection {
    let candidates: Vec<&String> = cluster_namespaces
        .iter()
        .filter(|ns| *ns != source_namespace)
        .collect();

    let unknown_includes = directive
        .include_namespaces
        .iter()
        .filter(|ns| !cluster_namespaces.iter().any(|c| c == ns))
        .map(str::to_string)
        .collect();

    let unknown_excludes = if directive.include_namespaces.is_empty() {
        directive
            .exclude_namespaces
            .iter()
            .filter(|ns| *ns != source_namespace && !candidates.iter().any(|c| c == ns))
            .map(str::to_string)
            .collect()
    } else {
        Vec::new()
    };

    TargetSelection {
        namespaces: restrict_targets(directive, candidates),
        unknown_includes,
        unknown_excludes,
    }
}

/// Apply the namespace directives to an explicit candidate pool
pub fn restrict_targets<T: AsRef<str>>(
    directive: &SyncDirective,
    candidates: impl IntoIterator<Item = T>,
) -> Vec<String> {
    filter(
        &directive.include_namespaces,
        &directive.exclude_namespaces,
        candidates,
        MatchMode::Exact,
    )
    .into_iter()
    .map(|ns| ns.as_ref().to_string())
    .collect()
}

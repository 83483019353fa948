// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Sync directives parsed from the control annotations of a source resource.

use crate::constants::annotations;
use crate::sync::filter::Patterns;
use std::collections::BTreeMap;

/// Include/exclude pattern lists controlling where and how a resource is
/// mirrored. An empty list means the annotation was absent or blank.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncDirective {
    pub include_namespaces: Patterns,
    pub exclude_namespaces: Patterns,
    pub include_labels: Patterns,
    pub exclude_labels: Patterns,
    pub include_annotations: Patterns,
    pub exclude_annotations: Patterns,
    /// Directive annotations that were set but held no usable pattern
    pub blank: Vec<&'static str>,
}

impl SyncDirective {
    pub fn from_annotations(source: &BTreeMap<String, String>) -> Self {
        let mut blank = Vec::new();
        let mut read = |key: &'static str| {
            let Some(raw) = source.get(key) else {
                return Patterns::default();
            };
            let patterns = Patterns::parse(raw);
            if patterns.is_empty() && !raw.is_empty() {
                blank.push(key);
            }
            patterns
        };

        let include_namespaces = read(annotations::INCLUDE_NAMESPACES);
        let exclude_namespaces = read(annotations::EXCLUDE_NAMESPACES);
        let include_labels = read(annotations::INCLUDE_LABELS);
        let exclude_labels = read(annotations::EXCLUDE_LABELS);
        let include_annotations = read(annotations::INCLUDE_ANNOTATIONS);
        let exclude_annotations = read(annotations::EXCLUDE_ANNOTATIONS);

        SyncDirective {
            include_namespaces,
            exclude_namespaces,
            include_labels,
            exclude_labels,
            include_annotations,
            exclude_annotations,
            blank,
        }
    }
}

// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Label and annotation filtering applied before a resource is mirrored.

use crate::constants::CONTROL_PREFIX;
use crate::sync::directive::SyncDirective;
use crate::sync::filter::{filter_keys, MatchMode};
use crate::types::ResourceMetadata;

/// Strip control keys and apply the label/annotation directives found in the
/// metadata's own annotations.
pub fn sanitize(metadata: &ResourceMetadata) -> ResourceMetadata {
    let directive = SyncDirective::from_annotations(&metadata.annotations);

    let label_excludes = directive.exclude_labels.with(CONTROL_PREFIX);
    let annotation_excludes = directive.exclude_annotations.with(CONTROL_PREFIX);

    ResourceMetadata {
        labels: filter_keys(
            &directive.include_labels,
            &label_excludes,
            &metadata.labels,
            MatchMode::Prefix,
        ),
        annotations: filter_keys(
            &directive.include_annotations,
            &annotation_excludes,
            &metadata.annotations,
            MatchMode::Prefix,
        ),
    }
}

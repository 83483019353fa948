// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Include/exclude pattern filtering for namespaces and metadata keys.

use std::collections::BTreeMap;

/// How a pattern is compared against a candidate
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchMode {
    /// Pattern equals candidate (namespace names)
    Exact,
    /// Candidate starts with pattern (label and annotation keys)
    Prefix,
}

/// A parsed comma-separated pattern list. Empty means "no constraint".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Patterns(Vec<String>);

impl Patterns {
    /// Split on commas, trim whitespace and drop empty tokens
    pub fn parse(raw: &str) -> Self {
        Patterns(
            raw.split(',')
                .map(str::trim)
                .filter(|p| !p.is_empty())
                .map(str::to_string)
                .collect(),
        )
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    /// This list with `pattern` appended
    pub fn with(mut self, pattern: &str) -> Self {
        self.0.push(pattern.to_string());
        self
    }

    /// Whether any pattern matches `candidate`
    pub fn matches(&self, candidate: &str, mode: MatchMode) -> bool {
        self.iter().any(|pattern| match mode {
            MatchMode::Exact => candidate == pattern,
            MatchMode::Prefix => candidate.starts_with(pattern),
        })
    }
}

impl<S: Into<String>> FromIterator<S> for Patterns {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Patterns(iter.into_iter().map(Into::into).collect())
    }
}

/// Whether `candidate` survives the include and exclude lists. Exclude wins.
pub fn retains(include: &Patterns, exclude: &Patterns, candidate: &str, mode: MatchMode) -> bool {
    if !include.is_empty() && !include.matches(candidate, mode) {
        return false;
    }
    exclude.is_empty() || !exclude.matches(candidate, mode)
}

/// Keep the candidates that survive the include and exclude lists, in order
pub fn filter<T: AsRef<str>>(
    include: &Patterns,
    exclude: &Patterns,
    candidates: impl IntoIterator<Item = T>,
    mode: MatchMode,
) -> Vec<T> {
    candidates
        .into_iter()
        .filter(|c| retains(include, exclude, c.as_ref(), mode))
        .collect()
}

/// Keep the map entries whose key survives the include and exclude lists
pub fn filter_keys(
    include: &Patterns,
    exclude: &Patterns,
    entries: &BTreeMap<String, String>,
    mode: MatchMode,
) -> BTreeMap<String, String> {
    entries
        .iter()
        .filter(|(key, _)| retains(include, exclude, key, mode))
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect()
}

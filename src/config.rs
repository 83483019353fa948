// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use anyhow::{Context, Result};
use std::env;

/// Operator configuration loaded from environment variables
#[derive(Debug, Clone, Default)]
pub struct Config {
    /// Source namespaces whose resources are mirrored. Empty means all.
    pub watched_namespaces: Vec<String>,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        let raw = match env::var("WATCHED_NAMESPACES") {
            Ok(value) => value,
            Err(env::VarError::NotPresent) => String::new(),
            Err(e) => {
                return Err(e).context("WATCHED_NAMESPACES environment variable is not valid unicode")
            }
        };

        Ok(Config {
            watched_namespaces: parse_namespace_list(&raw),
        })
    }

    /// Whether events for resources in `namespace` should be processed
    pub fn watches(&self, namespace: &str) -> bool {
        self.watched_namespaces.is_empty() || self.watched_namespaces.iter().any(|ns| ns == namespace)
    }

    /// Human readable form of the allow-list for logging
    pub fn describe_watched(&self) -> String {
        if self.watched_namespaces.is_empty() {
            "ALL".to_string()
        } else {
            self.watched_namespaces.join(",")
        }
    }
}

fn parse_namespace_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|ns| !ns.is_empty())
        .map(str::to_string)
        .collect()
}

// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use crate::cluster::ReconcileOptions;
use crate::constants::readiness::{
    CREATE_TIMEOUT_SECS, DELETE_TIMEOUT_SECS, POLL_INTERVAL_SECS, UPDATE_TIMEOUT_SECS,
};
use crate::resource::HashOptions;
use crate::template::RenderPolicy;
use anyhow::{bail, Context, Result};
use std::env;
use std::time::Duration;

/// Engine configuration loaded from environment variables
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub poll_interval: Duration,
    pub create_timeout: Duration,
    pub update_timeout: Duration,
    pub delete_timeout: Duration,
    /// Render undefined placeholders as empty strings instead of failing
    pub lenient_templates: bool,
    /// Ignore list order when hashing specs
    pub unordered_list_hash: bool,
    /// Resolve kinds and scopes through API discovery
    pub use_discovery: bool,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration from any key lookup; unset keys take their defaults
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let secs = |key: &str, default: u64| -> Result<Duration> {
            let value = match lookup(key) {
                Some(raw) => raw
                    .trim()
                    .parse::<u64>()
                    .with_context(|| format!("{} must be a whole number of seconds, got '{}'", key, raw))?,
                None => default,
            };
            Ok(Duration::from_secs(value))
        };
        let flag = |key: &str, default: bool| -> Result<bool> {
            match lookup(key) {
                Some(raw) => raw
                    .trim()
                    .to_ascii_lowercase()
                    .parse::<bool>()
                    .with_context(|| format!("{} must be true or false, got '{}'", key, raw)),
                None => Ok(default),
            }
        };

        let poll_interval = secs("OUTFITTER_POLL_INTERVAL_SECS", POLL_INTERVAL_SECS)?;
        if poll_interval.is_zero() {
            bail!("OUTFITTER_POLL_INTERVAL_SECS must be greater than zero");
        }

        Ok(Config {
            poll_interval,
            create_timeout: secs("OUTFITTER_CREATE_TIMEOUT_SECS", CREATE_TIMEOUT_SECS)?,
            update_timeout: secs("OUTFITTER_UPDATE_TIMEOUT_SECS", UPDATE_TIMEOUT_SECS)?,
            delete_timeout: secs("OUTFITTER_DELETE_TIMEOUT_SECS", DELETE_TIMEOUT_SECS)?,
            lenient_templates: flag("OUTFITTER_LENIENT_TEMPLATES", false)?,
            unordered_list_hash: flag("OUTFITTER_UNORDERED_LIST_HASH", false)?,
            use_discovery: flag("OUTFITTER_USE_DISCOVERY", true)?,
        })
    }

    pub fn reconcile_options(&self) -> ReconcileOptions {
        ReconcileOptions {
            poll_interval: self.poll_interval,
            create_timeout: self.create_timeout,
            update_timeout: self.update_timeout,
            delete_timeout: self.delete_timeout,
        }
    }

    pub fn render_policy(&self) -> RenderPolicy {
        if self.lenient_templates {
            RenderPolicy::Lenient
        } else {
            RenderPolicy::Strict
        }
    }

    pub fn hash_options(&self) -> HashOptions {
        HashOptions {
            unordered_lists: self.unordered_list_hash,
        }
    }
}

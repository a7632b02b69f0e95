// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

/// Value of the managed-by label on objects outfitter bootstraps
pub const OPERATOR_NAME: &str = "outfitter";

/// Label key marking bootstrapped namespaces
pub const MANAGED_BY_LABEL: &str = "app.kubernetes.io/managed-by";

/// Separator between identity segments. Names, namespaces, kinds and apiVersions never contain it.
pub const IDENTITY_SEPARATOR: &str = "::";

/// Namespace used for namespaced objects whose manifest does not name one
pub const DEFAULT_NAMESPACE: &str = "default";

/// Implicit top-level configuration key carrying the component namespace
pub const NAMESPACE_KEY: &str = "namespace";

/// Suffix of the flattened entry recording a list's length
pub const LIST_SIZE_SUFFIX: &str = "size";

/// Nesting depth beyond which configuration is rejected
pub const MAX_CONFIG_DEPTH: usize = 64;

/// Status phases considered healthy by the readiness checks
pub const HEALTHY_PHASES: &[&str] = &["Active", "Bound", "Running", "Ready", "Online", "Healthy"];

/// Readiness polling defaults
pub mod readiness {
    /// Fixed delay between polls in seconds
    pub const POLL_INTERVAL_SECS: u64 = 5;
    /// Create readiness timeout in seconds
    pub const CREATE_TIMEOUT_SECS: u64 = 20 * 60;
    /// Update readiness timeout in seconds
    pub const UPDATE_TIMEOUT_SECS: u64 = 20 * 60;
    /// Delete confirmation timeout in seconds
    pub const DELETE_TIMEOUT_SECS: u64 = 5 * 60;
}

/// API discovery retry configuration
pub mod discovery {
    /// Initial retry interval in seconds
    pub const RETRY_INTERVAL_SECS: u64 = 2;
    /// Maximum retry interval in seconds (exponential backoff cap)
    pub const RETRY_MAX_INTERVAL_SECS: u64 = 30;
    /// Attempts before giving up
    pub const MAX_ATTEMPTS: u32 = 5;
}

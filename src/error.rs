// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use crate::resource::Identity;
use std::fmt;
use std::time::Duration;
use thiserror::Error;

/// Lifecycle call in progress when an object failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verb {
    Create,
    Read,
    Update,
    Delete,
}

impl fmt::Display for Verb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Verb::Create => "create",
            Verb::Read => "read",
            Verb::Update => "update",
            Verb::Delete => "delete",
        };
        f.write_str(s)
    }
}

#[derive(Error, Debug)]
pub enum OutfitterError {
    #[error("Template error in {template}: {message}")]
    Template { template: String, message: String },

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Failed to parse manifest: {0}")]
    Parse(String),

    #[error("Kubernetes API error: {0}")]
    Transport(#[from] kube::Error),

    #[error("Object not found: {0}")]
    NotFound(String),

    #[error("Kind not served by the cluster: {0}")]
    KindUnknown(String),

    #[error("Timed out after {elapsed:?} waiting for {object} to become {target}")]
    Timeout {
        object: String,
        target: String,
        elapsed: Duration,
    },

    #[error("Resource version conflict: {0}")]
    Conflict(String),

    #[error("Cancelled while waiting for {0}")]
    Cancelled(String),

    #[error("Failed to load kubeconfig: {0}")]
    Kubeconfig(String),

    #[error("Namespace creation failed: {0}")]
    Namespace(String),

    #[error("State file error: {0}")]
    State(String),

    #[error("I/O error on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to {verb} {identity}: {source}")]
    Lifecycle {
        verb: Verb,
        identity: Identity,
        /// Objects this call already applied its verb to, including the failing one
        /// when its API call went through.
        applied: Vec<Identity>,
        #[source]
        source: Box<OutfitterError>,
    },
}

impl OutfitterError {
    /// Innermost cause, looking through lifecycle context
    pub fn root(&self) -> &OutfitterError {
        match self {
            OutfitterError::Lifecycle { source, .. } => source.root(),
            other => other,
        }
    }

    /// Not-found and unserved-kind results are soft conditions during read and delete
    pub fn is_gone(&self) -> bool {
        matches!(
            self.root(),
            OutfitterError::NotFound(_) | OutfitterError::KindUnknown(_)
        )
    }

    /// Classify a kube client error against the object it was issued for
    pub fn from_kube(err: kube::Error, object: &Identity) -> Self {
        match &err {
            kube::Error::Api(resp) if resp.code == 404 && resp.reason == "NotFound" => {
                OutfitterError::NotFound(object.to_string())
            }
            kube::Error::Api(resp) if resp.code == 404 => {
                OutfitterError::KindUnknown(format!("{} ({})", object.api_version_kind(), resp.message))
            }
            kube::Error::Api(resp) if resp.code == 409 && resp.reason == "Conflict" => {
                OutfitterError::Conflict(format!("{}: {}", object, resp.message))
            }
            _ => OutfitterError::Transport(err),
        }
    }

    pub(crate) fn io(path: impl AsRef<std::path::Path>, source: std::io::Error) -> Self {
        OutfitterError::Io {
            path: path.as_ref().display().to_string(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, OutfitterError>;

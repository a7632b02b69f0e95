// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Lifecycle calls against the cluster and the readiness state machine that follows them.

pub mod api;
pub mod readiness;
pub mod reconciler;
pub mod wait;

pub use api::ClusterApi;
pub use readiness::{conditions_ready, ReadinessCheck, ReadinessRegistry, ReadinessStatus};
pub use reconciler::{ReconcileOptions, Reconciler};
pub use wait::{observe, wait_for, WaitSettings, WaitTarget};

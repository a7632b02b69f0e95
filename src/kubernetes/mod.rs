// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Kubernetes utilities for client creation, API discovery, and namespace bootstrap.

pub mod client;
pub mod discovery;
pub mod namespaces;

pub use client::create_client;
pub use discovery::run_discovery;
pub use namespaces::ensure_namespace_exists;

// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
pub mod cluster;
pub mod component;
pub mod config;
pub mod constants;
pub mod error;
pub mod flatten;
pub mod kubernetes;
pub mod resource;
pub mod state;
pub mod template;

#[cfg(test)]
mod test_utils;

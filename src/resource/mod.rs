// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Parsed manifests, their identities and spec digests.

pub mod document;
pub mod hash;
pub mod identity;
pub mod object;
pub mod record;

pub use document::DocumentExt;
pub use hash::{spec_hash, HashOptions};
pub use identity::Identity;
pub use object::ResourceObject;
pub use record::ObjectRecord;

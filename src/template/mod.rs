// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Manifest template rendering against a flattened configuration.
//!
//! Templates use minijinja syntax. Placeholders address flattened keys either
//! directly or through attribute access, so `{{ image.tag }}` and
//! `{{ args[0] }}` both resolve against the `image.tag` / `args.0` entries.
//! Hyphenated keys can be written with underscores (`{{ service_account }}`
//! finds `service-account`).

mod renderer;
mod scope;

pub use renderer::{RenderPolicy, TemplateRenderer};

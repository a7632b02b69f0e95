// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use super::scope::FlatScope;
use crate::error::{OutfitterError, Result};
use crate::flatten::FlatConfig;
use minijinja::{Environment, ErrorKind, UndefinedBehavior};

/// How placeholders without a configuration entry are handled
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RenderPolicy {
    /// Undefined placeholders fail the render
    #[default]
    Strict,
    /// Undefined placeholders (and lookups below them) render as empty strings
    Lenient,
}

/// Renders manifest templates. Holds no per-render state, so one renderer can
/// be shared across threads and components.
pub struct TemplateRenderer {
    env: Environment<'static>,
}

impl Default for TemplateRenderer {
    fn default() -> Self {
        Self::new(RenderPolicy::default())
    }
}

impl TemplateRenderer {
    pub fn new(policy: RenderPolicy) -> Self {
        let mut env = Environment::new();
        env.set_keep_trailing_newline(true);
        env.set_undefined_behavior(match policy {
            RenderPolicy::Strict => UndefinedBehavior::Strict,
            RenderPolicy::Lenient => UndefinedBehavior::Chainable,
        });
        Self { env }
    }

    /// Render an anonymous template
    pub fn render(&self, template: &str, config: &FlatConfig) -> Result<String> {
        self.render_named("<inline>", template, config)
    }

    /// Render a template; `name` only appears in error messages
    pub fn render_named(&self, name: &str, template: &str, config: &FlatConfig) -> Result<String> {
        self.env
            .render_named_str(name, template, FlatScope::root(config.clone()))
            .map_err(|err| {
                let message = match err.kind() {
                    ErrorKind::UndefinedError => format!("undefined placeholder: {}", err),
                    ErrorKind::SyntaxError => format!("syntax error: {}", err),
                    _ => err.to_string(),
                };
                OutfitterError::Template {
                    template: name.to_string(),
                    message,
                }
            })
    }
}

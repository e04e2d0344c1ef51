//! Renderer that turns template source into output bytes.
//!
//! Wraps the parse and execute phases of [`Template`] with a configuration,
//! a helper registry and an environment. Rendering is all-or-nothing: the
//! caller gets either the complete output or an error naming the phase that
//! failed, never partial text.
//!
//! Source text outside actions is copied byte for byte, so Latin-1 or other
//! non-UTF-8 files render unchanged. Only the inside of an action must be
//! valid UTF-8.
//!
//! ## Usage
//!
//! ```ignore
//! use envtmpl_core::templates::renderer::TemplateRenderer;
//!
//! let renderer = TemplateRenderer::new();
//! let output = renderer.generate_template(b"Hello {{env \"NAME\" | default \"World\"}}!")?;
//! ```

use std::sync::Arc;

use crate::config::RenderConfig;
use crate::environment::{Environment, ProcessEnv};
use crate::error::Result;
use crate::funcs::{CallContext, FuncRegistry};
use crate::templates::template::Template;

/// Template renderer with its helpers and environment injected.
///
/// Holds no mutable state, so one renderer can serve concurrent renders.
#[derive(Clone)]
pub struct TemplateRenderer {
    config: RenderConfig,
    funcs: FuncRegistry,
    environment: Arc<dyn Environment>,
}

impl TemplateRenderer {
    /// Default configuration, built-in helpers, process environment.
    pub fn new() -> Self {
        Self {
            config: RenderConfig::default(),
            funcs: FuncRegistry::BUILTIN,
            environment: Arc::new(ProcessEnv),
        }
    }

    /// Replace the configuration after validating it.
    pub fn with_config(mut self, config: RenderConfig) -> Result<Self> {
        config.validate()?;
        self.config = config;
        Ok(self)
    }

    pub fn with_environment(mut self, environment: impl Environment + 'static) -> Self {
        self.environment = Arc::new(environment);
        self
    }

    pub fn with_funcs(mut self, funcs: FuncRegistry) -> Self {
        self.funcs = funcs;
        self
    }

    pub fn config(&self) -> &RenderConfig {
        &self.config
    }

    /// Parse phase only.
    pub fn parse(&self, source: &[u8]) -> Result<Template> {
        let template = Template::parse(source, &self.funcs, &self.config)?;
        tracing::debug!(
            name = %self.config.name,
            actions = template.action_count(),
            "template parsed"
        );
        Ok(template)
    }

    /// Check `source` for syntax errors without executing it.
    pub fn check(&self, source: &[u8]) -> Result<()> {
        self.parse(source).map(|_| ())
    }

    /// Parse and execute `source`, returning the rendered text.
    pub fn render_str(&self, source: &str) -> Result<String> {
        let output = self.render(self.parse(source.as_bytes())?)?;
        // Text runs come from `source` and helpers only produce UTF-8.
        Ok(String::from_utf8_lossy(&output).into_owned())
    }

    /// Parse and execute `source`, returning the rendered bytes.
    pub fn generate_template(&self, source: &[u8]) -> Result<Vec<u8>> {
        self.render(self.parse(source)?)
    }

    fn render(&self, template: Template) -> Result<Vec<u8>> {
        let ctx = CallContext {
            environment: self.environment.as_ref(),
            strict_required: self.config.strict_required,
        };
        let output = template.execute(&ctx)?;
        tracing::debug!(name = %template.name(), bytes = output.len(), "template rendered");
        Ok(output)
    }
}

impl Default for TemplateRenderer {
    fn default() -> Self {
        Self::new()
    }
}

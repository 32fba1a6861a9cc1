//! MiniJinja-backed renderer

use minijinja::syntax::SyntaxConfig;
use minijinja::{AutoEscape, Environment, Value};

use super::{RenderError, Renderer, RendererSettings};
use crate::merge::Data;

/// Renderer using MiniJinja with configurable delimiters
///
/// Output is not auto-escaped and a trailing newline in the layout is kept.
pub struct MiniJinjaRenderer {
    env: Environment<'static>,
    settings: RendererSettings,
}

impl MiniJinjaRenderer {
    /// Create a renderer with default delimiters
    pub fn new() -> Result<Self, RenderError> {
        Self::with_settings(RendererSettings::default())
    }

    /// Create a renderer with the given delimiters
    pub fn with_settings(settings: RendererSettings) -> Result<Self, RenderError> {
        let syntax = SyntaxConfig::builder()
            .block_delimiters(settings.block.0.clone(), settings.block.1.clone())
            .variable_delimiters(settings.variable.0.clone(), settings.variable.1.clone())
            .comment_delimiters(settings.comment.0.clone(), settings.comment.1.clone())
            .build()
            .map_err(RenderError::Syntax)?;

        let mut env = Environment::new();
        env.set_syntax(syntax);
        env.set_keep_trailing_newline(true);
        env.set_auto_escape_callback(|_| AutoEscape::None);

        Ok(Self { env, settings })
    }

    /// The delimiter settings in use
    pub fn settings(&self) -> &RendererSettings {
        &self.settings
    }

    /// The underlying environment, for registering filters and functions
    pub fn environment_mut(&mut self) -> &mut Environment<'static> {
        &mut self.env
    }
}

impl std::fmt::Debug for MiniJinjaRenderer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MiniJinjaRenderer")
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}

impl Renderer for MiniJinjaRenderer {
    fn expand(&self, template: &str, context: &Data) -> Result<String, RenderError> {
        let ctx = Value::from_serialize(context);
        self.env
            .render_str(template, ctx)
            .map_err(RenderError::Expand)
    }
}

//! Renderers that expand layout content against the merged context
//!
//! The fold hands each layout's content, with inner content already
//! substituted, to a [`Renderer`] along with the data merged so far. Any
//! implementation can be plugged in; [`MiniJinjaRenderer`] is the default
//! and [`PassthroughRenderer`] leaves content untouched.

pub mod config;
mod jinja;

pub use config::RendererSettings;
pub use jinja::MiniJinjaRenderer;

use thiserror::Error;

use crate::merge::Data;

/// Errors that can occur while setting up or running a renderer
#[derive(Debug, Error)]
pub enum RenderError {
    /// The delimiter settings were rejected
    #[error("invalid renderer syntax: {0}")]
    Syntax(#[source] minijinja::Error),

    /// A template failed to expand
    #[error("{0}")]
    Expand(#[source] minijinja::Error),

    /// Failure reported by a custom renderer
    #[error("{message}")]
    Custom { message: String },
}

impl RenderError {
    /// Create an error for a custom renderer
    pub fn custom(message: impl Into<String>) -> Self {
        Self::Custom {
            message: message.into(),
        }
    }
}

/// Expands renderer-specific syntax inside a template string
pub trait Renderer: Send + Sync {
    /// Expand `template` with `context` as the variable scope
    fn expand(&self, template: &str, context: &Data) -> Result<String, RenderError>;
}

/// A renderer that returns content unchanged
#[derive(Debug, Clone, Copy, Default)]
pub struct PassthroughRenderer;

impl Renderer for PassthroughRenderer {
    fn expand(&self, template: &str, _context: &Data) -> Result<String, RenderError> {
        Ok(template.to_string())
    }
}

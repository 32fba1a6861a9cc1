//! Error types for resolving and rendering layout stacks

use thiserror::Error;

use crate::config::ConfigError;
use crate::renderer::RenderError;
use crate::tag::TagError;
use crate::template::LoadError;

/// Errors that can occur while resolving, folding or rendering a stack
///
/// Missing layouts are not errors: the stack is truncated where the chain
/// breaks.
#[derive(Debug, Error)]
pub enum LayoutError {
    /// Registration input could not be normalized
    #[error("invalid template input: {0}")]
    Load(#[from] LoadError),

    /// A layout file could not be loaded
    #[error("{0}")]
    Config(#[from] ConfigError),

    /// The body tag could not be built
    #[error("invalid body tag: {0}")]
    Tag(#[from] TagError),

    /// The renderer failed while expanding a layout
    #[error("failed to render layout '{layout}': {source}")]
    Render {
        layout: String,
        #[source]
        source: RenderError,
    },

    /// The renderer could not be constructed
    #[error("renderer setup failed: {0}")]
    Renderer(#[source] RenderError),

    /// A layout chain loops back on itself
    #[error("circular layout reference: {}", chain.join(" -> "))]
    CircularLayout { chain: Vec<String> },

    /// A template requested by name is not registered
    #[error("template not found: {name}")]
    TemplateNotFound { name: String },
}

impl LayoutError {
    /// Create a render error for a layout
    pub fn render(layout: impl Into<String>, source: RenderError) -> Self {
        Self::Render {
            layout: layout.into(),
            source,
        }
    }

    /// Create a circular layout error
    pub fn circular(chain: Vec<String>) -> Self {
        Self::CircularLayout { chain }
    }

    /// Create a template not found error
    pub fn not_found(name: impl Into<String>) -> Self {
        Self::TemplateNotFound { name: name.into() }
    }

    /// The layout chain, for circular reference errors
    pub fn chain(&self) -> Option<&[String]> {
        match self {
            Self::CircularLayout { chain } => Some(chain),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_circular_layout_display() {
        let err = LayoutError::circular(vec!["a".to_string(), "b".to_string(), "a".to_string()]);
        assert!(err.to_string().contains("a -> b -> a"));
        assert_eq!(err.chain().map(<[String]>::len), Some(3));
    }

    #[test]
    fn test_not_found_display() {
        let err = LayoutError::not_found("missing");
        assert_eq!(err.to_string(), "template not found: missing");
        assert!(err.chain().is_none());
    }

    #[test]
    fn test_load_error_converts() {
        let err: LayoutError = LoadError::EmptyName.into();
        assert!(matches!(err, LayoutError::Load(_)));
    }
}

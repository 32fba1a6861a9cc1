//! Configuration for the renderer

/// Delimiter settings handed to the renderer
///
/// Block delimiters default to the same `{%`/`%}` pair as the body tag; the
/// fold shields body tags from the renderer, so sharing is safe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RendererSettings {
    /// Delimiters around statements (`{% if x %}`)
    pub block: (String, String),

    /// Delimiters around interpolated expressions (`{{ title }}`)
    pub variable: (String, String),

    /// Delimiters around comments (`{# note #}`)
    pub comment: (String, String),
}

impl Default for RendererSettings {
    fn default() -> Self {
        Self {
            block: ("{%".to_string(), "%}".to_string()),
            variable: ("{{".to_string(), "}}".to_string()),
            comment: ("{#".to_string(), "#}".to_string()),
        }
    }
}

impl RendererSettings {
    /// Create settings with default delimiters
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the block delimiters
    pub fn with_block_delims(mut self, open: impl Into<String>, close: impl Into<String>) -> Self {
        self.block = (open.into(), close.into());
        self
    }

    /// Set the variable delimiters
    pub fn with_variable_delims(mut self, open: impl Into<String>, close: impl Into<String>) -> Self {
        self.variable = (open.into(), close.into());
        self
    }

    /// Set the comment delimiters
    pub fn with_comment_delims(mut self, open: impl Into<String>, close: impl Into<String>) -> Self {
        self.comment = (open.into(), close.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings() {
        let settings = RendererSettings::default();
        assert_eq!(settings.block, ("{%".to_string(), "%}".to_string()));
        assert_eq!(settings.variable, ("{{".to_string(), "}}".to_string()));
        assert_eq!(settings.comment, ("{#".to_string(), "#}".to_string()));
    }

    #[test]
    fn test_builder_pattern() {
        let settings = RendererSettings::new()
            .with_block_delims("<%", "%>")
            .with_variable_delims("${", "}");

        assert_eq!(settings.block, ("<%".to_string(), "%>".to_string()));
        assert_eq!(settings.variable, ("${".to_string(), "}".to_string()));
    }
}

//! Configuration for layout resolution and rendering
//!
//! [`LayoutConfig`] is built once and shared by every call on a
//! [`Layouts`](crate::Layouts) instance. It can be assembled with the
//! builder methods or loaded from a TOML file together with layout
//! definitions.
//!
//! ```toml
//! [config]
//! default_layout = "base"
//! cycle_policy = "error"
//!
//! [locals]
//! site = "Example"
//!
//! [layouts.base]
//! content = "<html>{% body %}</html>"
//! layout = false
//! ```

use std::collections::HashMap;
use std::path::Path;

use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

use crate::merge::{Data, MergeStrategy};
use crate::renderer::RendererSettings;
use crate::stack::CyclePolicy;
use crate::tag::TagOptions;
use crate::template::Falsey;

/// Keys stripped from a template's data before it joins the context
pub const DEFAULT_OMIT_KEYS: &[&str] = &["mergeFn", "content", "delims", "layout"];

/// Errors that can occur when loading configuration files
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read layout file: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Failed to parse layout TOML: {0}")]
    ParseError(#[from] toml::de::Error),
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Configuration options for resolving and folding layouts
#[derive(Debug, Clone)]
pub struct LayoutConfig {
    /// Initial render context
    pub locals: Data,

    /// Keys removed from template data before merging
    pub omit_keys: Vec<String>,

    /// How template data merges into the context
    pub merge: MergeStrategy,

    /// Block delimiters handed to the renderer
    pub layout_delims: (String, String),

    /// Shape of the body tag
    pub default_tag: TagOptions,

    /// Layout used when a reference inherits
    pub default_layout: Option<String>,

    /// Behavior on circular layout chains
    pub cycle_policy: CyclePolicy,

    /// Values that disable a layout reference
    pub falsey: Falsey,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            locals: Data::new(),
            omit_keys: DEFAULT_OMIT_KEYS.iter().map(|k| k.to_string()).collect(),
            merge: MergeStrategy::default(),
            layout_delims: ("{%".to_string(), "%}".to_string()),
            default_tag: TagOptions::default(),
            default_layout: None,
            cycle_policy: CyclePolicy::default(),
            falsey: Falsey::default(),
        }
    }
}

impl LayoutConfig {
    /// Create a new configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the initial context
    pub fn with_locals(mut self, locals: Data) -> Self {
        self.locals = locals;
        self
    }

    /// Set the keys omitted from template data
    pub fn with_omit_keys<I, S>(mut self, keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.omit_keys = keys.into_iter().map(Into::into).collect();
        self
    }

    /// Set the merge strategy
    pub fn with_merge(mut self, merge: MergeStrategy) -> Self {
        self.merge = merge;
        self
    }

    /// Set the renderer's block delimiters
    pub fn with_layout_delims(mut self, open: impl Into<String>, close: impl Into<String>) -> Self {
        self.layout_delims = (open.into(), close.into());
        self
    }

    /// Set the body tag options
    pub fn with_default_tag(mut self, tag: TagOptions) -> Self {
        self.default_tag = tag;
        self
    }

    /// Set the default layout
    pub fn with_default_layout(mut self, name: impl Into<String>) -> Self {
        self.default_layout = Some(name.into());
        self
    }

    /// Set the cycle policy
    pub fn with_cycle_policy(mut self, policy: CyclePolicy) -> Self {
        self.cycle_policy = policy;
        self
    }

    /// Set the falsey words
    pub fn with_falsey(mut self, falsey: Falsey) -> Self {
        self.falsey = falsey;
        self
    }

    /// Renderer settings derived from this configuration
    pub fn renderer_settings(&self) -> RendererSettings {
        RendererSettings::default()
            .with_block_delims(self.layout_delims.0.clone(), self.layout_delims.1.clone())
    }

    /// Load configuration from a TOML file, ignoring any layouts in it
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        Ok(LayoutFile::from_file(path)?.config)
    }

    /// Load configuration from a TOML string, ignoring any layouts in it
    pub fn from_str(content: &str) -> Result<Self, ConfigError> {
        Ok(LayoutFile::from_str(content)?.config)
    }
}

/// A TOML file holding configuration and layout definitions
#[derive(Debug, Clone)]
pub struct LayoutFile {
    /// Configuration from `[config]` and `[locals]`
    pub config: LayoutConfig,
    /// Layout records from `[layouts.*]`, as an object of `name -> record`
    pub layouts: Value,
}

impl LayoutFile {
    /// Load from a TOML file
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_str(&content)
    }

    /// Load from a TOML string
    pub fn from_str(content: &str) -> Result<Self, ConfigError> {
        let parsed: TomlLayoutFile = toml::from_str(content)?;

        let mut config = LayoutConfig::default();
        if let Some(section) = parsed.config {
            section.apply(&mut config)?;
        }
        config.locals = to_data(parsed.locals, "locals")?;

        let layouts = serde_json::to_value(parsed.layouts)
            .map_err(|e| ConfigError::Invalid(format!("layouts: {e}")))?;

        Ok(Self { config, layouts })
    }
}

/// TOML structure for deserializing layout files
#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct TomlLayoutFile {
    config: Option<TomlConfig>,
    #[serde(default)]
    locals: toml::Table,
    #[serde(default)]
    layouts: HashMap<String, toml::Value>,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct TomlConfig {
    default_layout: Option<String>,
    layout_delims: Option<[String; 2]>,
    tag: Option<String>,
    tag_delims: Option<[String; 2]>,
    tag_separator: Option<String>,
    omit_keys: Option<Vec<String>>,
    falsey: Option<Vec<String>>,
    cycle_policy: Option<CyclePolicy>,
    merge: Option<TomlMerge>,
}

#[derive(Deserialize)]
#[serde(rename_all = "kebab-case")]
enum TomlMerge {
    Deep,
    Shallow,
    KeepExisting,
}

impl TomlConfig {
    fn apply(self, config: &mut LayoutConfig) -> Result<(), ConfigError> {
        if let Some(name) = self.default_layout {
            if name.is_empty() {
                return Err(ConfigError::Invalid("default_layout must not be empty".into()));
            }
            config.default_layout = Some(name);
        }
        if let Some([open, close]) = self.layout_delims {
            config.layout_delims = (open, close);
        }
        if let Some(tag) = self.tag {
            config.default_tag.tag = tag;
        }
        if let Some([open, close]) = self.tag_delims {
            config.default_tag.delims = (open, close);
        }
        if let Some(sep) = self.tag_separator {
            config.default_tag.sep = sep;
        }
        if let Some(keys) = self.omit_keys {
            config.omit_keys = keys;
        }
        if let Some(words) = self.falsey {
            config.falsey = Falsey::new(words);
        }
        if let Some(policy) = self.cycle_policy {
            config.cycle_policy = policy;
        }
        if let Some(merge) = self.merge {
            config.merge = match merge {
                TomlMerge::Deep => MergeStrategy::Deep,
                TomlMerge::Shallow => MergeStrategy::Shallow,
                TomlMerge::KeepExisting => MergeStrategy::KeepExisting,
            };
        }
        Ok(())
    }
}

fn to_data(table: toml::Table, section: &str) -> Result<Data, ConfigError> {
    match serde_json::to_value(table) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(_) => Err(ConfigError::Invalid(format!("{section} must be a table"))),
        Err(e) => Err(ConfigError::Invalid(format!("{section}: {e}"))),
    }
}

//! Layout Stack - nested layout resolution for templates
//!
//! Layouts are named templates that wrap other content through a body tag
//! (`{% body %}` by default). A layout can itself use a layout, forming a
//! stack. This library resolves that stack, nests the layouts into each
//! other, merges their data, and wraps page content in the result.
//!
//! # Example
//!
//! ```rust
//! use layout_stack::{LayoutConfig, Layouts};
//!
//! let mut layouts = Layouts::new(LayoutConfig::default()).unwrap();
//! layouts.put("base", false, "<html>{% body %}</html>").unwrap();
//! layouts.put("post", "base", "<article>{% body %}</article>").unwrap();
//!
//! let rendered = layouts.render("Hello", "post").unwrap();
//! assert_eq!(rendered.content, "<html><article>Hello</article></html>");
//! ```

pub mod config;
pub mod error;
pub mod merge;
pub mod renderer;
pub mod stack;
pub mod tag;
pub mod template;

pub use config::{ConfigError, LayoutConfig, LayoutFile};
pub use error::LayoutError;
pub use merge::{Data, MergeStrategy};
pub use renderer::{MiniJinjaRenderer, PassthroughRenderer, RenderError, Renderer};
pub use stack::{CyclePolicy, Folded};
pub use tag::{make_regex, make_tag, replace_tag, BodyTag, TagOptions};
pub use template::{assert_layout, LayoutRef, Template, TemplateRegistry};

use std::borrow::Cow;
use std::path::Path;

use serde_json::Value;
use tracing::debug;

use merge::deep_merge;
use stack::{resolve_stack, Folder};
use template::LoadError;

/// Per-call overrides for [`Layouts::render_with`]
#[derive(Debug, Clone, Default)]
pub struct RenderOptions {
    /// Delimiters for the body tag in this call
    pub delims: Option<(String, String)>,
    /// Default layout for this call
    pub default_layout: Option<String>,
    /// Extra locals deep-merged over the configured ones; these win
    /// regardless of the configured merge strategy
    pub locals: Data,
}

impl RenderOptions {
    /// Create options with no overrides
    pub fn new() -> Self {
        Self::default()
    }

    /// Override the body tag delimiters
    pub fn with_delims(mut self, open: impl Into<String>, close: impl Into<String>) -> Self {
        self.delims = Some((open.into(), close.into()));
        self
    }

    /// Override the default layout
    pub fn with_default_layout(mut self, name: impl Into<String>) -> Self {
        self.default_layout = Some(name.into());
        self
    }

    /// Add locals for this call
    pub fn with_locals(mut self, locals: Data) -> Self {
        self.locals = locals;
        self
    }
}

/// Final output of a render
#[derive(Debug, Clone, PartialEq)]
pub struct Rendered {
    /// Page content wrapped in every layout of the stack
    pub content: String,
    /// Data merged from the configured locals and every layout
    pub data: Data,
}

/// A store of layouts together with the configuration and renderer used to
/// apply them
pub struct Layouts {
    config: LayoutConfig,
    registry: TemplateRegistry,
    renderer: Box<dyn Renderer>,
    tag: BodyTag,
}

impl std::fmt::Debug for Layouts {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Layouts")
            .field("config", &self.config)
            .field("templates", &self.registry.names())
            .field("tag", &self.tag.literal())
            .finish_non_exhaustive()
    }
}

impl Layouts {
    /// Create an empty store using the MiniJinja renderer
    pub fn new(config: LayoutConfig) -> Result<Self, LayoutError> {
        let renderer = MiniJinjaRenderer::with_settings(config.renderer_settings())
            .map_err(LayoutError::Renderer)?;
        Self::with_renderer(config, renderer)
    }

    /// Create an empty store using a custom renderer
    pub fn with_renderer(
        config: LayoutConfig,
        renderer: impl Renderer + 'static,
    ) -> Result<Self, LayoutError> {
        let tag = BodyTag::new(&config.default_tag)?;
        Ok(Self {
            registry: TemplateRegistry::with_falsey(config.falsey.clone()),
            renderer: Box::new(renderer),
            config,
            tag,
        })
    }

    /// Load configuration and layouts from a TOML layout file
    pub fn from_file(path: &Path) -> Result<Self, LayoutError> {
        Self::from_layout_file(LayoutFile::from_file(path)?)
    }

    /// Build a store from an already parsed layout file
    pub fn from_layout_file(file: LayoutFile) -> Result<Self, LayoutError> {
        let mut layouts = Self::new(file.config)?;
        layouts.put_all(file.layouts)?;
        Ok(layouts)
    }

    /// The configuration
    pub fn config(&self) -> &LayoutConfig {
        &self.config
    }

    /// The template store
    pub fn templates(&self) -> &TemplateRegistry {
        &self.registry
    }

    /// The compiled body tag
    pub fn tag(&self) -> &BodyTag {
        &self.tag
    }

    /// Register a template as `(name, layout, content)`
    pub fn put(
        &mut self,
        name: impl Into<String>,
        layout: impl Into<Value>,
        content: impl Into<String>,
    ) -> Result<(), LayoutError> {
        Ok(self.registry.put(name, layout, content)?)
    }

    /// Register a template from a record object
    pub fn put_template(&mut self, name: impl Into<String>, record: Value) -> Result<(), LayoutError> {
        Ok(self.registry.put_template(name, record)?)
    }

    /// Register every template in an object of `name -> record`
    pub fn put_all(&mut self, templates: Value) -> Result<(), LayoutError> {
        Ok(self.registry.put_all(templates)?)
    }

    /// Get a template by name
    pub fn get(&self, name: &str) -> Option<&Template> {
        self.registry.get(name)
    }

    /// Apply the falsey/default rule to a raw reference
    ///
    /// Uses the configured falsey words and default layout. Unlike the free
    /// [`assert_layout`], arrays and objects are an error rather than "no
    /// layout".
    pub fn assert_layout(&self, value: impl Into<Value>) -> Result<Option<String>, LayoutError> {
        let reference = self.reference(value.into())?;
        Ok(reference
            .resolve(self.config.default_layout.as_deref())
            .map(str::to_string))
    }

    /// Resolve the stack for a starting layout (outermost layout first)
    pub fn resolve(&self, start: impl Into<Value>) -> Result<Vec<String>, LayoutError> {
        let start = self.reference(start.into())?;
        self.resolve_ref(&start, self.config.default_layout.as_deref())
    }

    /// Resolve the stack a registered template is wrapped in
    pub fn stack_for(&self, name: &str) -> Result<Vec<String>, LayoutError> {
        let template = self.get(name).ok_or_else(|| LayoutError::not_found(name))?;
        self.resolve_ref(&template.layout, self.config.default_layout.as_deref())
    }

    /// Fold a stack into nested layout content and merged data
    pub fn fold(&self, stack: &[String]) -> Result<Folded, LayoutError> {
        self.folder(&self.tag).fold(stack, self.config.locals.clone())
    }

    /// Wrap `page` in the stack for `start`
    pub fn render(&self, page: &str, start: impl Into<Value>) -> Result<Rendered, LayoutError> {
        self.render_with(page, start, &RenderOptions::default())
    }

    /// Wrap `page` in the stack for `start`, with per-call overrides
    ///
    /// An empty stack returns `page` unchanged.
    pub fn render_with(
        &self,
        page: &str,
        start: impl Into<Value>,
        options: &RenderOptions,
    ) -> Result<Rendered, LayoutError> {
        let tag = match &options.delims {
            Some((open, close)) => {
                let opts = self.config.default_tag.clone().with_delims(open, close);
                Cow::Owned(BodyTag::new(&opts)?)
            }
            None => Cow::Borrowed(&self.tag),
        };

        let default_layout = options
            .default_layout
            .as_deref()
            .or(self.config.default_layout.as_deref());
        let start = self.reference(start.into())?;
        let stack = self.resolve_ref(&start, default_layout)?;

        let mut locals = self.config.locals.clone();
        deep_merge(&mut locals, &options.locals);

        let folded = self.folder(&tag).fold(&stack, locals)?;
        let content = match folded.content {
            None => page.to_string(),
            Some(layout) if tag.is_match(&layout) => tag.replace(&layout, page),
            Some(layout) => {
                debug!(stack = ?stack, "folded layout has no body tag, page content dropped");
                layout
            }
        };

        Ok(Rendered {
            content,
            data: folded.data,
        })
    }

    /// Render a registered template's own content in its layout stack
    pub fn render_template(&self, name: &str) -> Result<Rendered, LayoutError> {
        let template = self.get(name).ok_or_else(|| LayoutError::not_found(name))?;
        let stack = self.resolve_ref(&template.layout, self.config.default_layout.as_deref())?;

        let folded = self.folder(&self.tag).fold(&stack, self.config.locals.clone())?;
        let mut data = folded.data;
        self.config
            .merge
            .merge(&mut data, &template.context(&self.config.omit_keys));

        let content = match folded.content {
            Some(layout) => self.tag.replace(&layout, &template.content),
            None => template.content.clone(),
        };
        Ok(Rendered { content, data })
    }

    fn resolve_ref(
        &self,
        start: &LayoutRef,
        default_layout: Option<&str>,
    ) -> Result<Vec<String>, LayoutError> {
        let stack = resolve_stack(start, &self.registry, default_layout, self.config.cycle_policy)?;
        debug!(start = ?start, stack = ?stack, "resolved layout stack");
        Ok(stack)
    }

    fn reference(&self, value: Value) -> Result<LayoutRef, LayoutError> {
        LayoutRef::from_value(&value, &self.config.falsey).ok_or_else(|| {
            LayoutError::Load(LoadError::InvalidLayout {
                name: "<start>".to_string(),
                field: "layout",
                found: if value.is_array() { "an array" } else { "an object" },
            })
        })
    }

    fn folder<'a>(&'a self, tag: &'a BodyTag) -> Folder<'a> {
        Folder {
            registry: &self.registry,
            config: &self.config,
            tag,
            renderer: self.renderer.as_ref(),
        }
    }
}

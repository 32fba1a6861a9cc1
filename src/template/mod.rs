//! Templates and the template store
//!
//! A template is a named piece of content that may point at a layout. The
//! [`TemplateRegistry`] holds every template by name; the [`loader`]
//! normalizes loosely shaped registration input into typed [`Template`]
//! records before they reach the store.
//!
//! # Example
//!
//! ```rust
//! use layout_stack::template::TemplateRegistry;
//!
//! let mut registry = TemplateRegistry::new();
//! registry.put("base", false, "<html>{% body %}</html>").unwrap();
//! registry.put("post", "base", "<article>{% body %}</article>").unwrap();
//!
//! assert!(registry.contains("post"));
//! ```

pub mod loader;
mod reference;
mod registry;

pub use loader::{LoadError, TemplateInput};
pub use reference::{assert_layout, locate_reference, Falsey, LayoutRef, DEFAULT_FALSEY};
pub use registry::TemplateRegistry;

use crate::merge::{deep_merge, Data};

/// A stored template record
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Template {
    /// Raw content, possibly containing the body tag and renderer syntax
    pub content: String,
    /// Effective layout reference, decided once at insertion
    pub layout: LayoutRef,
    /// Data merged into the render context
    pub data: Data,
    /// Locals merged into the render context before `data`
    pub locals: Data,
    /// Options carried with the template
    pub options: Data,
    /// Unrecognized keys, kept as given
    pub extra: Data,
}

impl Template {
    /// Create a template with content and no layout preference
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            ..Self::default()
        }
    }

    /// Set the layout reference
    pub fn with_layout(mut self, layout: LayoutRef) -> Self {
        self.layout = layout;
        self
    }

    /// Set the data
    pub fn with_data(mut self, data: Data) -> Self {
        self.data = data;
        self
    }

    /// Set the locals
    pub fn with_locals(mut self, locals: Data) -> Self {
        self.locals = locals;
        self
    }

    /// Merge a newer record for the same name into this one
    ///
    /// Non-empty content replaces ours; maps are deep-merged; an explicit
    /// layout reference replaces ours.
    pub fn merge_from(&mut self, other: Template) {
        if !other.content.is_empty() {
            self.content = other.content;
        }
        if other.layout.is_explicit() {
            self.layout = other.layout;
        }
        deep_merge(&mut self.data, &other.data);
        deep_merge(&mut self.locals, &other.locals);
        deep_merge(&mut self.options, &other.options);
        deep_merge(&mut self.extra, &other.extra);
    }

    /// The data this template contributes to a render context
    ///
    /// `locals` first, then `data` on top, minus `omit_keys`.
    pub fn context(&self, omit_keys: &[String]) -> Data {
        let mut context = self.locals.clone();
        deep_merge(&mut context, &self.data);
        context.retain(|key, _| !omit_keys.iter().any(|k| k == key));
        context
    }
}

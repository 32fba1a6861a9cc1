//! Template registry for storing and retrieving templates by name

use std::collections::HashMap;

use serde_json::Value;
use tracing::trace;

use super::loader::{effective_layout, normalize, LoadError, TemplateInput};
use super::reference::{Falsey, LayoutRef};
use super::Template;

/// Registry for storing templates
///
/// Registering a name that already exists merges the new record into the
/// old one instead of replacing it.
#[derive(Debug, Clone, Default)]
pub struct TemplateRegistry {
    templates: HashMap<String, Template>,
    /// Values that disable a layout reference
    falsey: Falsey,
}

impl TemplateRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a new registry with a custom falsey set
    pub fn with_falsey(falsey: Falsey) -> Self {
        Self {
            templates: HashMap::new(),
            falsey,
        }
    }

    /// Register a template as `(name, layout, content)`
    ///
    /// `layout` may be a name, `false`/`true`, or `None`.
    pub fn put(
        &mut self,
        name: impl Into<String>,
        layout: impl Into<Value>,
        content: impl Into<String>,
    ) -> Result<(), LoadError> {
        self.load(TemplateInput::Layout {
            name: name.into(),
            layout: layout.into(),
            content: content.into(),
        })
    }

    /// Register a template from a record object
    pub fn put_template(&mut self, name: impl Into<String>, record: Value) -> Result<(), LoadError> {
        self.load(TemplateInput::Record {
            name: name.into(),
            record,
        })
    }

    /// Register every template in an object of `name -> record`
    pub fn put_all(&mut self, templates: Value) -> Result<(), LoadError> {
        self.load(TemplateInput::Many(templates))
    }

    /// Normalize input and merge the resulting templates
    ///
    /// Input is validated in full before anything is stored.
    pub fn load(&mut self, input: TemplateInput) -> Result<(), LoadError> {
        for (name, template) in normalize(input, &self.falsey)? {
            self.insert(name, template)?;
        }
        Ok(())
    }

    /// Insert an already typed template, merging with any existing entry
    ///
    /// A template whose layout is `Inherit` picks up a reference from its
    /// `options`, `locals` or `data`, the same way loaded records do.
    pub fn insert(
        &mut self,
        name: impl Into<String>,
        mut template: Template,
    ) -> Result<(), LoadError> {
        let name = name.into();
        if template.layout == LayoutRef::Inherit {
            template.layout = effective_layout(
                &name,
                None,
                &template.options,
                &template.locals,
                &template.data,
                &self.falsey,
            )?;
        }
        trace!(template = %name, layout = ?template.layout, "registering template");
        match self.templates.get_mut(&name) {
            Some(existing) => existing.merge_from(template),
            None => {
                self.templates.insert(name, template);
            }
        }
        Ok(())
    }

    /// Get a template by name
    pub fn get(&self, name: &str) -> Option<&Template> {
        self.templates.get(name)
    }

    /// Get every template
    pub fn all(&self) -> &HashMap<String, Template> {
        &self.templates
    }

    /// Check if a template exists
    pub fn contains(&self, name: &str) -> bool {
        self.templates.contains_key(name)
    }

    /// Get all template names, sorted
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.templates.keys().map(|s| s.as_str()).collect();
        names.sort_unstable();
        names
    }

    /// Number of stored templates
    pub fn len(&self) -> usize {
        self.templates.len()
    }

    /// Check if the registry is empty
    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }

    /// The falsey set used to classify layout references
    pub fn falsey(&self) -> &Falsey {
        &self.falsey
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::merge::Data;
    use serde_json::json;

    #[test]
    fn test_registry_put_and_get() {
        let mut registry = TemplateRegistry::new();
        registry
            .put("base", false, "<html>{% body %}</html>")
            .expect("Should register");

        assert!(registry.contains("base"));
        let template = registry.get("base").unwrap();
        assert_eq!(template.layout, LayoutRef::Disabled);
        assert_eq!(template.content, "<html>{% body %}</html>");
    }

    #[test]
    fn test_registry_put_without_layout() {
        let mut registry = TemplateRegistry::new();
        registry.put("page", None::<&str>, "hi").unwrap();
        assert_eq!(registry.get("page").unwrap().layout, LayoutRef::Inherit);
    }

    #[test]
    fn test_registry_merges_existing() {
        let mut registry = TemplateRegistry::new();
        registry
            .put_template("a", json!({"content": "A", "data": {"title": "A", "tags": {"x": 1}}}))
            .unwrap();
        registry
            .put_template("a", json!({"data": {"tags": {"y": 2}}, "layout": "base"}))
            .unwrap();

        let template = registry.get("a").unwrap();
        assert_eq!(template.content, "A");
        assert_eq!(template.layout, LayoutRef::Named("base".into()));
        assert_eq!(
            Value::Object(template.data.clone()),
            json!({"title": "A", "tags": {"x": 1, "y": 2}})
        );
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_registry_put_all() {
        let mut registry = TemplateRegistry::new();
        registry
            .put_all(json!({
                "b": {"content": "B"},
                "a": {"content": "A"},
            }))
            .unwrap();
        assert_eq!(registry.names(), vec!["a", "b"]);
        assert_eq!(registry.all().len(), 2);
    }

    #[test]
    fn test_registry_rejects_malformed_input_atomically() {
        let mut registry = TemplateRegistry::new();
        let result = registry.put_all(json!({
            "good": {"content": "ok"},
            "bad": {"content": 12},
        }));
        assert!(matches!(result, Err(LoadError::InvalidField { .. })));
        assert!(registry.is_empty());
    }

    #[test]
    fn test_registry_custom_falsey() {
        let mut registry = TemplateRegistry::with_falsey(Falsey::new(["off"]));
        registry.put("a", "off", "A").unwrap();
        registry.put("b", "no", "B").unwrap();
        assert_eq!(registry.get("a").unwrap().layout, LayoutRef::Disabled);
        assert_eq!(registry.get("b").unwrap().layout, LayoutRef::Named("no".into()));
    }

    #[test]
    fn test_registry_insert_uses_data_layout() {
        let data: Data = json!({"layout": "base"}).as_object().cloned().unwrap();
        let mut inserted = TemplateRegistry::new();
        inserted
            .insert("page", Template::new("{% body %}").with_data(data.clone()))
            .unwrap();

        let mut loaded = TemplateRegistry::new();
        loaded
            .put_template("page", json!({"content": "{% body %}", "data": {"layout": "base"}}))
            .unwrap();

        assert_eq!(inserted.get("page").unwrap().layout, LayoutRef::Named("base".into()));
        assert_eq!(inserted.get("page"), loaded.get("page"));
    }

    #[test]
    fn test_registry_insert_keeps_explicit_layout() {
        let data: Data = json!({"layout": "base"}).as_object().cloned().unwrap();
        let mut registry = TemplateRegistry::new();
        registry
            .insert(
                "page",
                Template::new("x").with_data(data).with_layout(LayoutRef::Disabled),
            )
            .unwrap();
        assert_eq!(registry.get("page").unwrap().layout, LayoutRef::Disabled);

        let bad: Data = json!({"layout": ["a"]}).as_object().cloned().unwrap();
        let result = registry.insert("other", Template::new("x").with_data(bad));
        assert!(matches!(result, Err(LoadError::InvalidLayout { .. })));
        assert!(!registry.contains("other"));
    }
}

//! Folding a resolved stack into one string

use tracing::{debug, trace};

use crate::config::LayoutConfig;
use crate::error::LayoutError;
use crate::merge::Data;
use crate::renderer::Renderer;
use crate::tag::BodyTag;
use crate::template::TemplateRegistry;

/// Stands in for body tags while the renderer runs, so the renderer never
/// sees them even when it shares their delimiters.
const BODY_SHIELD: &str = "\u{E000}layout-stack:body\u{E000}";

/// Result of folding a stack
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Folded {
    /// The nested layouts, with one body tag left for the page; `None` for
    /// an empty stack
    pub content: Option<String>,
    /// Data merged from every layout in the stack
    pub data: Data,
}

/// Everything a fold reads from
pub struct Folder<'a> {
    pub registry: &'a TemplateRegistry,
    pub config: &'a LayoutConfig,
    pub tag: &'a BodyTag,
    pub renderer: &'a dyn Renderer,
}

impl<'a> Folder<'a> {
    /// Fold `stack` (outermost layout first) starting from `locals`
    ///
    /// Each step merges the next layout's data into the context, expands
    /// that layout's content with the renderer, and substitutes the result
    /// for the body tag in the accumulated content.
    pub fn fold(&self, stack: &[String], locals: Data) -> Result<Folded, LayoutError> {
        let mut data = locals;
        let mut content: Option<String> = None;

        for name in stack {
            let Some(template) = self.registry.get(name) else {
                debug!(layout = %name, "layout not registered, skipping");
                continue;
            };
            trace!(layout = %name, "folding layout");

            let accumulated = content.take().unwrap_or_else(|| self.tag.literal().to_string());
            self.config
                .merge
                .merge(&mut data, &template.context(&self.config.omit_keys));

            // Only this layout's own content goes through the renderer;
            // outer layouts were expanded in earlier steps.
            let shielded = self.tag.replace(&template.content, BODY_SHIELD);
            let expanded = self
                .renderer
                .expand(&shielded, &data)
                .map_err(|source| LayoutError::render(name, source))?
                .replace(BODY_SHIELD, self.tag.literal());

            content = Some(self.tag.replace(&accumulated, &expanded));
        }

        Ok(Folded { content, data })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::merge::MergeStrategy;
    use crate::renderer::{MiniJinjaRenderer, PassthroughRenderer};
    use serde_json::json;

    fn stack(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_empty_stack() {
        let registry = TemplateRegistry::new();
        let config = LayoutConfig::default();
        let tag = BodyTag::default();
        let folder = Folder {
            registry: &registry,
            config: &config,
            tag: &tag,
            renderer: &PassthroughRenderer,
        };
        let locals = json!({"site": "x"}).as_object().cloned().unwrap();
        let folded = folder.fold(&[], locals.clone()).unwrap();
        assert_eq!(folded.content, None);
        assert_eq!(folded.data, locals);
    }

    #[test]
    fn test_tag_only_layout_is_identity() {
        let mut registry = TemplateRegistry::new();
        registry.put("plain", false, "{% body %}").unwrap();
        let config = LayoutConfig::default();
        let tag = BodyTag::default();
        let renderer = MiniJinjaRenderer::new().unwrap();
        let folder = Folder {
            registry: &registry,
            config: &config,
            tag: &tag,
            renderer: &renderer,
        };
        let folded = folder.fold(&stack(&["plain"]), Data::new()).unwrap();
        assert_eq!(folded.content.as_deref(), Some("{% body %}"));
    }

    #[test]
    fn test_outer_layout_wraps_inner() {
        let mut registry = TemplateRegistry::new();
        registry.put("outer", false, "<html>{% body %}</html>").unwrap();
        registry.put("inner", "outer", "<main>{% body %}</main>").unwrap();
        let config = LayoutConfig::default();
        let tag = BodyTag::default();
        let folder = Folder {
            registry: &registry,
            config: &config,
            tag: &tag,
            renderer: &PassthroughRenderer,
        };
        let folded = folder.fold(&stack(&["outer", "inner"]), Data::new()).unwrap();
        assert_eq!(
            folded.content.as_deref(),
            Some("<html><main>{% body %}</main></html>")
        );
    }

    #[test]
    fn test_data_merges_in_fold_order() {
        let mut registry = TemplateRegistry::new();
        registry
            .put_template("a", json!({"content": "{% body %}", "data": {"title": "A"}}))
            .unwrap();
        registry
            .put_template(
                "b",
                json!({"content": "{% body %}", "layout": "a", "data": {"title": "B"}}),
            )
            .unwrap();
        let tag = BodyTag::default();

        let config = LayoutConfig::default();
        let folder = Folder {
            registry: &registry,
            config: &config,
            tag: &tag,
            renderer: &PassthroughRenderer,
        };
        let folded = folder.fold(&stack(&["a", "b"]), Data::new()).unwrap();
        assert_eq!(folded.data.get("title"), Some(&json!("B")));

        let config = LayoutConfig::default().with_merge(MergeStrategy::KeepExisting);
        let folder = Folder {
            config: &config,
            ..folder
        };
        let folded = folder.fold(&stack(&["a", "b"]), Data::new()).unwrap();
        assert_eq!(folded.data.get("title"), Some(&json!("A")));
    }

    #[test]
    fn test_renderer_sees_merged_data_but_not_body_tag() {
        let mut registry = TemplateRegistry::new();
        registry
            .put_template(
                "base",
                json!({
                    "content": "<h1>{{ title }}</h1>{%body%}{% if footer %}<footer/>{% endif %}",
                    "data": {"title": "Site", "footer": true},
                }),
            )
            .unwrap();
        let config = LayoutConfig::default();
        let tag = BodyTag::default();
        let renderer = MiniJinjaRenderer::new().unwrap();
        let folder = Folder {
            registry: &registry,
            config: &config,
            tag: &tag,
            renderer: &renderer,
        };
        let folded = folder.fold(&stack(&["base"]), Data::new()).unwrap();
        assert_eq!(
            folded.content.as_deref(),
            Some("<h1>Site</h1>{% body %}<footer/>")
        );
    }

    #[test]
    fn test_expanded_output_is_not_expanded_again() {
        let mut registry = TemplateRegistry::new();
        registry
            .put_template(
                "outer",
                json!({"content": "<t>{{ title }}</t>{% body %}", "layout": false}),
            )
            .unwrap();
        registry
            .put("inner", "outer", "<i>{% body %}</i>")
            .unwrap();
        let config = LayoutConfig::default();
        let tag = BodyTag::default();
        let renderer = MiniJinjaRenderer::new().unwrap();
        let folder = Folder {
            registry: &registry,
            config: &config,
            tag: &tag,
            renderer: &renderer,
        };

        let locals = json!({"title": "{{ 7 * 6 }}"}).as_object().cloned().unwrap();
        let alone = folder.fold(&stack(&["outer"]), locals.clone()).unwrap();
        assert_eq!(alone.content.as_deref(), Some("<t>{{ 7 * 6 }}</t>{% body %}"));
        let nested = folder.fold(&stack(&["outer", "inner"]), locals).unwrap();
        assert_eq!(
            nested.content.as_deref(),
            Some("<t>{{ 7 * 6 }}</t><i>{% body %}</i>")
        );

        let locals = json!({"title": "50% {% off"}).as_object().cloned().unwrap();
        let nested = folder.fold(&stack(&["outer", "inner"]), locals).unwrap();
        assert_eq!(
            nested.content.as_deref(),
            Some("<t>50% {% off</t><i>{% body %}</i>")
        );
    }

    #[test]
    fn test_render_error_names_layout() {
        let mut registry = TemplateRegistry::new();
        registry.put("broken", false, "{% if %}{% body %}").unwrap();
        let config = LayoutConfig::default();
        let tag = BodyTag::default();
        let renderer = MiniJinjaRenderer::new().unwrap();
        let folder = Folder {
            registry: &registry,
            config: &config,
            tag: &tag,
            renderer: &renderer,
        };
        let err = folder.fold(&stack(&["broken"]), Data::new()).unwrap_err();
        assert!(matches!(err, LayoutError::Render { ref layout, .. } if layout == "broken"));
    }
}

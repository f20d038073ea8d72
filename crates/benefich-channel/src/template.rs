//! Handlebars rendering of message parts.

use handlebars::Handlebars;
use serde::Serialize;

use benefich_core::error::AppError;

use crate::error::DeliveryError;

/// A set of named templates.
///
/// HTML renderers escape interpolated values; plain renderers (push titles,
/// topics) emit them verbatim. Both run in strict mode: a placeholder that
/// names no context field fails the render instead of expanding to nothing.
#[derive(Debug, Clone)]
pub struct TemplateRenderer {
    registry: Handlebars<'static>,
}

impl TemplateRenderer {
    /// A renderer that HTML-escapes `{{value}}` interpolations.
    pub fn html() -> Self {
        let mut registry = Handlebars::new();
        registry.set_strict_mode(true);
        Self { registry }
    }

    /// A renderer that never escapes.
    pub fn plain() -> Self {
        let mut registry = Handlebars::new();
        registry.set_strict_mode(true);
        registry.register_escape_fn(handlebars::no_escape);
        Self { registry }
    }

    /// Compile and register `source` under `name`.
    pub fn register(&mut self, name: &str, source: &str) -> Result<(), AppError> {
        self.registry
            .register_template_string(name, source)
            .map_err(|e| AppError::template(format!("Template '{name}' does not compile: {e}")))
    }

    /// Whether a template is registered under `name`.
    pub fn has(&self, name: &str) -> bool {
        self.registry.has_template(name)
    }

    /// Render the template `name` with `context`.
    pub fn render<T: Serialize>(&self, name: &str, context: &T) -> Result<String, DeliveryError> {
        self.registry
            .render(name, context)
            .map_err(|e| DeliveryError::Template(format!("{name}: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_plain_topic_renders_place() {
        let mut renderer = TemplateRenderer::plain();
        renderer.register("topic", "eventsAt{{place_id}}").unwrap();

        let topic = renderer.render("topic", &json!({ "place_id": 42 })).unwrap();
        assert_eq!(topic, "eventsAt42");
    }

    #[test]
    fn test_html_escapes_but_plain_does_not() {
        let mut html = TemplateRenderer::html();
        let mut plain = TemplateRenderer::plain();
        html.register("t", "{{title}}").unwrap();
        plain.register("t", "{{title}}").unwrap();

        let context = json!({ "title": "Cine & Debate" });
        assert_eq!(html.render("t", &context).unwrap(), "Cine &amp; Debate");
        assert_eq!(plain.render("t", &context).unwrap(), "Cine & Debate");
    }

    #[test]
    fn test_broken_template_is_a_configuration_time_error() {
        let mut renderer = TemplateRenderer::plain();
        let err = renderer.register("broken", "{{#if title}}never closed").unwrap_err();
        assert_eq!(err.kind, benefich_core::error::ErrorKind::Template);
        assert!(!renderer.has("broken"));
    }

    #[test]
    fn test_unknown_placeholder_fails_the_render() {
        let mut plain = TemplateRenderer::plain();
        let mut html = TemplateRenderer::html();
        plain.register("topic", "eventsAt{{placeid}}").unwrap();
        html.register("topic", "eventsAt{{placeid}}").unwrap();

        let context = json!({ "place_id": 42 });
        assert!(matches!(
            plain.render("topic", &context),
            Err(DeliveryError::Template(_))
        ));
        assert!(matches!(
            html.render("topic", &context),
            Err(DeliveryError::Template(_))
        ));
    }

    #[test]
    fn test_null_field_renders_empty() {
        let mut renderer = TemplateRenderer::html();
        renderer
            .register("dates", "{{start}}{{#if end}} - {{end}}{{/if}}|{{place_name}}")
            .unwrap();

        let context = json!({ "start": "2019-10-03", "end": null, "place_name": null });
        assert_eq!(renderer.render("dates", &context).unwrap(), "2019-10-03|");
    }
}

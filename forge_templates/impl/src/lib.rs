use std::sync::Arc;

use anyhow::Context;
use forge_templates_contracts::{
    RenderedTemplate, Template, TemplateService, BASE_TEMPLATE, TEMPLATES,
};
use tera::Tera;
use tracing::trace;

#[derive(Debug, Clone)]
pub struct TemplateServiceImpl {
    state: State,
}

#[derive(Debug, Clone)]
struct State(Arc<Tera>);

impl TemplateServiceImpl {
    pub fn new() -> anyhow::Result<Self> {
        let templates = TEMPLATES.iter().flat_map(|&(name, html, text)| {
            [(format!("{name}.html"), html), (format!("{name}.txt"), text)]
        });

        let mut tera = Tera::default();
        tera.add_raw_templates(
            std::iter::once(("base.html".to_owned(), BASE_TEMPLATE)).chain(templates),
        )
        .context("Failed to load email templates")?;

        Ok(Self {
            state: State(tera.into()),
        })
    }
}

impl TemplateService for TemplateServiceImpl {
    fn render<T: Template>(&self, template: &T) -> anyhow::Result<RenderedTemplate> {
        trace!(template = T::NAME, "rendering template");
        let context = tera::Context::from_serialize(template)?;
        let html = self
            .state
            .0
            .render(&format!("{}.html", T::NAME), &context)?;
        let text = self.state.0.render(&format!("{}.txt", T::NAME), &context)?;
        Ok(RenderedTemplate { html, text })
    }
}

#[cfg(test)]
mod tests {
    use forge_templates_contracts::ContactNotificationTemplate;
    use pretty_assertions::assert_eq;

    use super::*;

    fn template(message: &str) -> ContactNotificationTemplate {
        ContactNotificationTemplate {
            name: "Max Mustermann".into(),
            email: "max.mustermann@example.de".into(),
            subject: "Hello there".into(),
            message: message.into(),
        }
    }

    #[test]
    fn contact_notification() {
        // Arrange
        let sut = TemplateServiceImpl::new().unwrap();

        // Act
        let result = sut.render(&template("Hello World!"));

        // Assert
        let result = result.unwrap();
        for view in [&result.html, &result.text] {
            assert!(view.contains("Max Mustermann"));
            assert!(view.contains("max.mustermann@example.de"));
            assert!(view.contains("Hello there"));
            assert!(view.contains("Hello World!"));
            assert!(view.contains("STEM FORGE AFRICA"));
        }
        assert!(result.html.starts_with("<!DOCTYPE html>"));
        assert!(!result.text.contains('<'));
    }

    #[test]
    fn deterministic() {
        let sut = TemplateServiceImpl::new().unwrap();
        let template = template("line1\nline2");

        let first = sut.render(&template).unwrap();
        let second = sut.render(&template).unwrap();

        assert_eq!(first, second);
    }

    #[test]
    fn line_breaks() {
        // Arrange
        let sut = TemplateServiceImpl::new().unwrap();

        // Act
        let result = sut.render(&template("line1\nline2")).unwrap();

        // Assert
        assert!(result.html.contains("line1<br>line2"));
        assert!(result.text.contains("line1\nline2"));
    }

    #[test]
    fn user_input_is_escaped_in_html() {
        // Arrange
        let sut = TemplateServiceImpl::new().unwrap();
        let template = ContactNotificationTemplate {
            name: "<b>Jo</b>".into(),
            email: "jo@x.com".into(),
            subject: "Tom & Jerry <3".into(),
            message: "<script>alert(1)</script>\n&amp;".into(),
        };

        // Act
        let result = sut.render(&template).unwrap();

        // Assert
        assert!(!result.html.contains("<b>"));
        assert!(!result.html.contains("<script>"));
        assert!(!result.html.contains("Tom & Jerry"));
        assert!(!result.html.contains("<3"));
        assert!(result.html.contains("&lt;b&gt;Jo&lt;&#x2F;b&gt;"));
        assert!(result.html.contains("Tom &amp; Jerry &lt;3"));
        assert!(result.html.contains("&lt;script&gt;alert(1)&lt;&#x2F;script&gt;<br>&amp;amp;"));

        assert!(result.text.contains("From: <b>Jo</b>"));
        assert!(result.text.contains("Subject: Tom & Jerry <3"));
        assert!(result.text.contains("<script>alert(1)</script>\n&amp;"));
    }
}

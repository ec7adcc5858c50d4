use serde::Serialize;
use serde_json::Value;

pub const DATASET_TEMPLATE: &str = include_str!("../../templates/dataset.html");
pub const INFERENCE_TEMPLATE: &str = include_str!("../../templates/inference.html");

#[derive(Debug, thiserror::Error)]
pub enum TemplateError {
    #[error("Template context must serialize to an object: {0}")]
    Context(String),
}

/// Substitutes `{{ key }}` placeholders with HTML-escaped context values.
/// Placeholders without a matching key render as empty strings.
pub fn render<C: Serialize>(template: &str, context: &C) -> Result<String, TemplateError> {
    let context = match serde_json::to_value(context) {
        Ok(Value::Object(map)) => map,
        Ok(_) => return Err(TemplateError::Context("not an object".to_string())),
        Err(e) => return Err(TemplateError::Context(e.to_string())),
    };

    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(start) = rest.find("{{") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        let Some(end) = after.find("}}") else {
            out.push_str(&rest[start..]);
            return Ok(out);
        };
        let key = after[..end].trim();
        match context.get(key) {
            Some(Value::String(s)) => out.push_str(&escape_html(s)),
            Some(Value::Null) | None => {}
            Some(other) => out.push_str(&escape_html(&other.to_string())),
        }
        rest = &after[end + 2..];
    }
    out.push_str(rest);
    Ok(out)
}

pub fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn substitutes_and_escapes() {
        let html = render(
            "<h1>{{ title }}</h1><p>{{missing}}</p><i>{{ n }}</i>",
            &json!({"title": "<b>Train</b> & Val", "n": 3}),
        )
        .unwrap();
        assert_eq!(
            html,
            "<h1>&lt;b&gt;Train&lt;/b&gt; &amp; Val</h1><p></p><i>3</i>"
        );
    }

    #[test]
    fn leaves_unclosed_placeholder() {
        assert_eq!(render("a {{ b", &json!({})).unwrap(), "a {{ b");
    }

    #[test]
    fn rejects_non_object_context() {
        assert!(render("x", &json!([1, 2])).is_err());
    }

    #[test]
    fn bundled_templates_reference_their_scripts() {
        assert!(DATASET_TEMPLATE.contains("/static/annotation/workspace.js"));
        assert!(INFERENCE_TEMPLATE.contains("/static/annotation/inference.js"));
    }

    #[test]
    fn dataset_template_has_workspace_controls() {
        for id in [
            "dropZone",
            "classForm",
            "stageNotice",
            "stagePlaceholder",
            "stageWrapper",
            "drawingGuide",
            "annotationList",
            "exportButton",
            "exportDialog",
        ] {
            assert!(
                DATASET_TEMPLATE.contains(&format!(r#"id="{}""#, id)),
                "missing #{}",
                id
            );
        }
        assert!(DATASET_TEMPLATE.contains(r#"name="classColor" type="color""#));
        assert!(DATASET_TEMPLATE.contains(r#"<button value="export">"#));
    }
}

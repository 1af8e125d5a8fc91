//! Inline rendering of rich text spans

use crate::cms::{Annotations, RichTextSpan};
use crate::helpers::{html_escape, is_safe_href, link_to};

/// Render a sequence of spans to inline HTML
pub fn render_rich_text(spans: &[RichTextSpan]) -> String {
    spans.iter().map(render_span).collect()
}

/// Render one span
///
/// Wrappers are applied in a fixed order, innermost first: bold, italic,
/// strikethrough, underline, code, then the link. Links with a disallowed
/// scheme are dropped and the text is rendered on its own.
pub fn render_span(span: &RichTextSpan) -> String {
    let mut html = html_escape(&span.text).replace('\n', "<br>");
    html = apply_annotations(html, &span.annotations);

    match span.href.as_deref().map(str::trim) {
        Some(href) if !href.is_empty() && is_safe_href(href) => link_to(href, &html),
        Some(href) if !href.is_empty() => {
            tracing::debug!("Dropping link with disallowed scheme: {:?}", href);
            html
        }
        _ => html,
    }
}

fn apply_annotations(mut html: String, annotations: &Annotations) -> String {
    let wrappers = [
        (annotations.bold, "<strong>", "</strong>"),
        (annotations.italic, "<em>", "</em>"),
        (annotations.strikethrough, "<s>", "</s>"),
        (annotations.underline, "<u>", "</u>"),
        (annotations.code, r#"<code class="inline-code">"#, "</code>"),
    ];

    for (enabled, open, close) in wrappers {
        if enabled {
            html = format!("{}{}{}", open, html, close);
        }
    }
    html
}

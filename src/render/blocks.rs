//! Block-to-HTML rendering

use super::rich_text::render_rich_text;
use crate::cms::{plain_text, ContentBlock};
use crate::helpers::html_escape;

/// Rendered in place of an empty document
pub const EMPTY_STATE: &str = r#"<div class="content-empty"><p>Content coming soon. Check back later!</p></div>"#;

const TOGGLE_PLACEHOLDER: &str = "Nested content is not displayed here.";

/// Render a document
///
/// Produces exactly one top-level element per block, in order, joined by
/// newlines. An empty document renders [`EMPTY_STATE`].
pub fn render_blocks(blocks: &[ContentBlock]) -> String {
    if blocks.is_empty() {
        return EMPTY_STATE.to_string();
    }

    let mut rendered = Vec::with_capacity(blocks.len());
    let mut list_number = 0;
    for block in blocks {
        list_number = match block {
            ContentBlock::NumberedListItem { .. } => list_number + 1,
            _ => 0,
        };
        rendered.push(render_block_numbered(block, list_number.max(1)));
    }
    rendered.join("\n")
}

/// `number` is the position of a numbered list item within its run
fn render_block_numbered(block: &ContentBlock, number: usize) -> String {
    match block {
        ContentBlock::Paragraph { text } => format!("<p>{}</p>", render_rich_text(text)),
        ContentBlock::Heading { level, text } => {
            let level = (*level).clamp(1, 3);
            format!("<h{0}>{1}</h{0}>", level, render_rich_text(text))
        }
        ContentBlock::BulletedListItem { text } => {
            format!("<ul><li>{}</li></ul>", render_rich_text(text))
        }
        ContentBlock::NumberedListItem { text } => {
            if number > 1 {
                format!(
                    r#"<ol start="{}"><li>{}</li></ol>"#,
                    number,
                    render_rich_text(text)
                )
            } else {
                format!("<ol><li>{}</li></ol>", render_rich_text(text))
            }
        }
        ContentBlock::Quote { text } => {
            format!("<blockquote>{}</blockquote>", render_rich_text(text))
        }
        ContentBlock::Code { text, language } => match language {
            Some(lang) => format!(
                r#"<pre class="block-code" data-language="{0}"><code class="language-{0}">{1}</code></pre>"#,
                html_escape(lang),
                html_escape(text)
            ),
            None => format!(
                r#"<pre class="block-code"><code>{}</code></pre>"#,
                html_escape(text)
            ),
        },
        ContentBlock::Image { url, caption } => render_image(url, caption),
        ContentBlock::Divider => "<hr>".to_string(),
        ContentBlock::Callout { icon, text } => {
            let icon = icon
                .as_deref()
                .map(|i| format!(r#"<span class="callout-icon">{}</span>"#, html_escape(i)))
                .unwrap_or_default();
            format!(
                r#"<div class="callout">{}<div class="callout-body">{}</div></div>"#,
                icon,
                render_rich_text(text)
            )
        }
        ContentBlock::Toggle { text } => format!(
            r#"<details class="toggle"><summary>{}</summary><p class="toggle-placeholder">{}</p></details>"#,
            render_rich_text(text),
            TOGGLE_PLACEHOLDER
        ),
        ContentBlock::Unsupported { kind } => format!(
            r#"<div class="unsupported-block">Unsupported block type: {}</div>"#,
            html_escape(kind)
        ),
    }
}

fn render_image(url: &str, caption: &[crate::cms::RichTextSpan]) -> String {
    let figcaption = if caption.is_empty() {
        String::new()
    } else {
        format!("<figcaption>{}</figcaption>", render_rich_text(caption))
    };

    if url.trim().is_empty() {
        return format!(
            r#"<figure class="block-image"><div class="image-missing">Image unavailable</div>{}</figure>"#,
            figcaption
        );
    }

    format!(
        r#"<figure class="block-image"><img src="{}" alt="{}" loading="lazy">{}</figure>"#,
        html_escape(url),
        html_escape(&plain_text(caption)),
        figcaption
    )
}

//! Content blocks
//!
//! A CMS document is an ordered list of typed blocks. Blocks arrive as JSON
//! objects tagged by `type`, with the payload stored under a key named after
//! the type. [`ContentBlock::from_value`] turns one of those objects into a
//! stable variant, falling back to [`ContentBlock::Unsupported`] for kinds the
//! renderer does not know.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::rich_text::{lenient_rich_text, plain_text, RichText};

/// One normalized block of a document
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentBlock {
    Paragraph { text: RichText },
    Heading { level: u8, text: RichText },
    BulletedListItem { text: RichText },
    NumberedListItem { text: RichText },
    Quote { text: RichText },
    Code { text: String, language: Option<String> },
    Image { url: String, caption: RichText },
    Divider,
    Callout { icon: Option<String>, text: RichText },
    Toggle { text: RichText },
    Unsupported { kind: String },
}

/// Block payload as sent by the CMS
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum RawBlock {
    Paragraph { paragraph: TextPayload },
    #[serde(rename = "heading_1")]
    Heading1 { heading_1: TextPayload },
    #[serde(rename = "heading_2")]
    Heading2 { heading_2: TextPayload },
    #[serde(rename = "heading_3")]
    Heading3 { heading_3: TextPayload },
    BulletedListItem { bulleted_list_item: TextPayload },
    NumberedListItem { numbered_list_item: TextPayload },
    Quote { quote: TextPayload },
    Code { code: CodePayload },
    Image { image: ImagePayload },
    Divider,
    Callout { callout: CalloutPayload },
    Toggle { toggle: TextPayload },
    #[serde(other)]
    Other,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct TextPayload {
    #[serde(deserialize_with = "lenient_rich_text")]
    rich_text: RichText,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct CodePayload {
    #[serde(deserialize_with = "lenient_rich_text")]
    rich_text: RichText,
    language: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ImagePayload {
    file: Option<HostedUrl>,
    external: Option<HostedUrl>,
    #[serde(deserialize_with = "lenient_rich_text")]
    caption: RichText,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct HostedUrl {
    url: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct CalloutPayload {
    #[serde(deserialize_with = "lenient_rich_text")]
    rich_text: RichText,
    icon: Option<Icon>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Icon {
    emoji: Option<String>,
}

impl ContentBlock {
    /// Normalize one block object
    ///
    /// Never fails: an unknown or malformed block becomes `Unsupported`.
    pub fn from_value(value: &Value) -> Self {
        let kind = value
            .get("type")
            .and_then(Value::as_str)
            .unwrap_or("unknown")
            .to_string();

        let raw = match serde_json::from_value::<RawBlock>(value.clone()) {
            Ok(raw) => raw,
            Err(e) => {
                tracing::debug!("Malformed {} block: {}", kind, e);
                return ContentBlock::Unsupported { kind };
            }
        };

        match raw {
            RawBlock::Paragraph { paragraph } => ContentBlock::Paragraph {
                text: paragraph.rich_text,
            },
            RawBlock::Heading1 { heading_1 } => ContentBlock::Heading {
                level: 1,
                text: heading_1.rich_text,
            },
            RawBlock::Heading2 { heading_2 } => ContentBlock::Heading {
                level: 2,
                text: heading_2.rich_text,
            },
            RawBlock::Heading3 { heading_3 } => ContentBlock::Heading {
                level: 3,
                text: heading_3.rich_text,
            },
            RawBlock::BulletedListItem { bulleted_list_item } => ContentBlock::BulletedListItem {
                text: bulleted_list_item.rich_text,
            },
            RawBlock::NumberedListItem { numbered_list_item } => ContentBlock::NumberedListItem {
                text: numbered_list_item.rich_text,
            },
            RawBlock::Quote { quote } => ContentBlock::Quote {
                text: quote.rich_text,
            },
            RawBlock::Code { code } => ContentBlock::Code {
                text: plain_text(&code.rich_text),
                language: code.language.filter(|l| !l.is_empty()),
            },
            RawBlock::Image { image } => ContentBlock::Image {
                url: image
                    .file
                    .or(image.external)
                    .map(|f| f.url)
                    .unwrap_or_default(),
                caption: image.caption,
            },
            RawBlock::Divider => ContentBlock::Divider,
            RawBlock::Callout { callout } => ContentBlock::Callout {
                icon: callout.icon.and_then(|i| i.emoji),
                text: callout.rich_text,
            },
            RawBlock::Toggle { toggle } => ContentBlock::Toggle {
                text: toggle.rich_text,
            },
            RawBlock::Other => ContentBlock::Unsupported { kind },
        }
    }

    /// Plain text carried by the block, used for word counts
    pub fn plain_text(&self) -> String {
        match self {
            ContentBlock::Paragraph { text }
            | ContentBlock::Heading { text, .. }
            | ContentBlock::BulletedListItem { text }
            | ContentBlock::NumberedListItem { text }
            | ContentBlock::Quote { text }
            | ContentBlock::Callout { text, .. }
            | ContentBlock::Toggle { text } => plain_text(text),
            ContentBlock::Code { text, .. } => text.clone(),
            ContentBlock::Image { caption, .. } => plain_text(caption),
            ContentBlock::Divider | ContentBlock::Unsupported { .. } => String::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cms::rich_text::RichTextSpan;
    use serde_json::json;

    fn text(s: &str) -> Value {
        json!([{ "type": "text", "plain_text": s, "annotations": {}, "href": null }])
    }

    #[test]
    fn test_paragraph_and_headings() {
        let p = json!({ "object": "block", "id": "b1", "type": "paragraph",
                        "has_children": false, "paragraph": { "rich_text": text("Hi"), "color": "default" } });
        assert_eq!(
            ContentBlock::from_value(&p),
            ContentBlock::Paragraph { text: vec![RichTextSpan::plain("Hi")] }
        );

        let headings = [
            (json!({ "type": "heading_1", "heading_1": { "rich_text": text("Title") } }), 1),
            (json!({ "type": "heading_2", "heading_2": { "rich_text": text("Title") } }), 2),
            (json!({ "type": "heading_3", "heading_3": { "rich_text": text("Title") } }), 3),
        ];
        for (h, level) in headings {
            match ContentBlock::from_value(&h) {
                ContentBlock::Heading { level: l, text } => {
                    assert_eq!(l, level);
                    assert_eq!(plain_text(&text), "Title");
                }
                other => panic!("expected heading, got {:?}", other),
            }
        }
    }

    #[test]
    fn test_code_block() {
        let code = json!({ "type": "code", "code": {
            "rich_text": [
                { "plain_text": "fn main() {\n", "annotations": {} },
                { "plain_text": "}", "annotations": {} }
            ],
            "language": "rust",
            "caption": []
        }});
        assert_eq!(
            ContentBlock::from_value(&code),
            ContentBlock::Code { text: "fn main() {\n}".into(), language: Some("rust".into()) }
        );
    }

    #[test]
    fn test_image_file_and_external() {
        let hosted = json!({ "type": "image", "image": {
            "type": "file", "file": { "url": "https://s3/img.png", "expiry_time": "x" },
            "caption": text("A cat")
        }});
        match ContentBlock::from_value(&hosted) {
            ContentBlock::Image { url, caption } => {
                assert_eq!(url, "https://s3/img.png");
                assert_eq!(plain_text(&caption), "A cat");
            }
            other => panic!("expected image, got {:?}", other),
        }

        let external = json!({ "type": "image", "image": {
            "type": "external", "external": { "url": "https://cdn/pic.jpg" }
        }});
        match ContentBlock::from_value(&external) {
            ContentBlock::Image { url, caption } => {
                assert_eq!(url, "https://cdn/pic.jpg");
                assert!(caption.is_empty());
            }
            other => panic!("expected image, got {:?}", other),
        }
    }

    #[test]
    fn test_divider_callout_toggle() {
        assert_eq!(
            ContentBlock::from_value(&json!({ "type": "divider", "divider": {} })),
            ContentBlock::Divider
        );

        let callout = json!({ "type": "callout", "callout": {
            "rich_text": text("Heads up"), "icon": { "type": "emoji", "emoji": "💡" }
        }});
        assert_eq!(
            ContentBlock::from_value(&callout),
            ContentBlock::Callout { icon: Some("💡".into()), text: vec![RichTextSpan::plain("Heads up")] }
        );

        let toggle = json!({ "type": "toggle", "has_children": true, "toggle": { "rich_text": text("More") } });
        assert!(matches!(ContentBlock::from_value(&toggle), ContentBlock::Toggle { .. }));
    }

    #[test]
    fn test_unknown_and_malformed_blocks() {
        let table = json!({ "type": "table", "table": { "table_width": 2 } });
        assert_eq!(
            ContentBlock::from_value(&table),
            ContentBlock::Unsupported { kind: "table".into() }
        );

        let broken = json!({ "type": "paragraph", "paragraph": "not an object" });
        assert_eq!(
            ContentBlock::from_value(&broken),
            ContentBlock::Unsupported { kind: "paragraph".into() }
        );

        assert_eq!(
            ContentBlock::from_value(&json!({})),
            ContentBlock::Unsupported { kind: "unknown".into() }
        );
    }

    #[test]
    fn test_payload_key_is_required() {
        let bare = json!({ "type": "quote" });
        // The payload key is required by the variant; without it the block is unsupported
        assert_eq!(
            ContentBlock::from_value(&bare),
            ContentBlock::Unsupported { kind: "quote".into() }
        );

        let empty = json!({ "type": "quote", "quote": {} });
        assert_eq!(ContentBlock::from_value(&empty), ContentBlock::Quote { text: Vec::new() });
    }
}

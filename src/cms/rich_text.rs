//! Rich text spans as delivered by the CMS

use serde::{Deserialize, Deserializer, Serialize};

/// Formatting flags carried by a span
///
/// Each flag is independent; any combination is valid.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Annotations {
    pub bold: bool,
    pub italic: bool,
    pub strikethrough: bool,
    pub underline: bool,
    pub code: bool,
}

/// A run of text with its annotations and optional link target
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RichTextSpan {
    #[serde(rename = "plain_text")]
    pub text: String,
    pub annotations: Annotations,
    pub href: Option<String>,
}

impl RichTextSpan {
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Default::default()
        }
    }

    pub fn with_annotations(mut self, annotations: Annotations) -> Self {
        self.annotations = annotations;
        self
    }

    pub fn with_href(mut self, href: impl Into<String>) -> Self {
        self.href = Some(href.into());
        self
    }
}

pub type RichText = Vec<RichTextSpan>;

/// Concatenate the plain text of every span
pub fn plain_text(spans: &[RichTextSpan]) -> String {
    spans.iter().map(|s| s.text.as_str()).collect()
}

/// Deserialize a rich text array, dropping spans that fail to parse
///
/// A `null` or non-array value yields an empty sequence.
pub(crate) fn lenient_rich_text<'de, D>(deserializer: D) -> Result<RichText, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(rich_text_from_value(&value))
}

pub(crate) fn rich_text_from_value(value: &serde_json::Value) -> RichText {
    match value.as_array() {
        Some(items) => items
            .iter()
            .filter_map(|item| serde_json::from_value::<RichTextSpan>(item.clone()).ok())
            .collect(),
        None => Vec::new(),
    }
}

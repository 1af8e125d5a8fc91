//! Property normalization
//!
//! CMS pages carry a map of typed properties, each tagged by a `type` field.
//! This module flattens them into plain values. Normalization is total:
//! anything missing, unknown or malformed degrades to an empty value and the
//! accessors on [`PropertyValue`] pick the type-appropriate default.

use serde::Deserialize;
use serde_json::{Map, Value};

use super::rich_text::{lenient_rich_text, plain_text, RichText};

/// A property as sent by the CMS
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum Property {
    Title {
        #[serde(default, deserialize_with = "lenient_rich_text")]
        title: RichText,
    },
    RichText {
        #[serde(default, deserialize_with = "lenient_rich_text")]
        rich_text: RichText,
    },
    Select {
        #[serde(default)]
        select: Option<NamedOption>,
    },
    MultiSelect {
        #[serde(default)]
        multi_select: Vec<NamedOption>,
    },
    Date {
        #[serde(default)]
        date: Option<DateRange>,
    },
    Checkbox {
        #[serde(default)]
        checkbox: bool,
    },
    Number {
        #[serde(default)]
        number: Option<f64>,
    },
    Url {
        #[serde(default)]
        url: Option<String>,
    },
    Files {
        #[serde(default)]
        files: Vec<FileRef>,
    },
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, Deserialize)]
struct NamedOption {
    #[serde(default)]
    name: String,
}

#[derive(Debug, Clone, Deserialize)]
struct DateRange {
    #[serde(default)]
    start: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
struct FileRef {
    #[serde(default)]
    file: Option<HostedUrl>,
    #[serde(default)]
    external: Option<HostedUrl>,
}

#[derive(Debug, Clone, Deserialize)]
struct HostedUrl {
    #[serde(default)]
    url: String,
}

impl FileRef {
    fn url(&self) -> Option<&str> {
        self.file
            .as_ref()
            .or(self.external.as_ref())
            .map(|f| f.url.as_str())
            .filter(|u| !u.is_empty())
    }
}

/// A normalized property value
#[derive(Debug, Clone, PartialEq)]
pub enum PropertyValue {
    Text(String),
    List(Vec<String>),
    Flag(bool),
    Number(f64),
    Empty,
}

impl PropertyValue {
    /// Text content, or `""`
    pub fn as_text(&self) -> String {
        match self {
            PropertyValue::Text(s) => s.clone(),
            PropertyValue::List(items) => items.join(", "),
            _ => String::new(),
        }
    }

    /// List content, or `[]`; a single text value becomes a one-item list
    pub fn as_list(&self) -> Vec<String> {
        match self {
            PropertyValue::List(items) => items.clone(),
            PropertyValue::Text(s) if !s.is_empty() => vec![s.clone()],
            _ => Vec::new(),
        }
    }

    /// Boolean content, or `false`
    pub fn as_flag(&self) -> bool {
        matches!(self, PropertyValue::Flag(true))
    }

    /// Numeric content, or `0`
    pub fn as_number(&self) -> f64 {
        match self {
            PropertyValue::Number(n) => *n,
            _ => 0.0,
        }
    }
}

/// Normalize one property object
pub fn normalize_property(value: &Value) -> PropertyValue {
    let property = match serde_json::from_value::<Property>(value.clone()) {
        Ok(p) => p,
        Err(e) => {
            tracing::debug!("Unreadable property {}: {}", value, e);
            return PropertyValue::Empty;
        }
    };

    match property {
        Property::Title { title } => PropertyValue::Text(plain_text(&title)),
        Property::RichText { rich_text } => PropertyValue::Text(plain_text(&rich_text)),
        Property::Select { select } => {
            PropertyValue::Text(select.map(|s| s.name).unwrap_or_default())
        }
        Property::MultiSelect { multi_select } => PropertyValue::List(
            multi_select
                .into_iter()
                .map(|o| o.name)
                .filter(|n| !n.is_empty())
                .collect(),
        ),
        Property::Date { date } => {
            PropertyValue::Text(date.and_then(|d| d.start).unwrap_or_default())
        }
        Property::Checkbox { checkbox } => PropertyValue::Flag(checkbox),
        Property::Number { number } => PropertyValue::Number(number.unwrap_or(0.0)),
        Property::Url { url } => PropertyValue::Text(url.unwrap_or_default()),
        Property::Files { files } => PropertyValue::Text(
            files
                .first()
                .and_then(|f| f.url())
                .unwrap_or_default()
                .to_string(),
        ),
        Property::Unknown => {
            tracing::debug!(
                "Unsupported property type {:?}",
                value.get("type").and_then(serde_json::Value::as_str).unwrap_or("")
            );
            PropertyValue::Empty
        }
    }
}

/// The property map of one CMS page
#[derive(Debug, Clone, Default)]
pub struct Properties {
    map: Map<String, Value>,
}

impl Properties {
    /// Build from a page object's `properties` field
    pub fn from_page(page: &Value) -> Self {
        let map = page
            .get("properties")
            .and_then(Value::as_object)
            .cloned()
            .unwrap_or_default();
        Self { map }
    }

    pub fn get(&self, name: &str) -> PropertyValue {
        self.map
            .get(name)
            .map(normalize_property)
            .unwrap_or(PropertyValue::Empty)
    }

    pub fn text(&self, name: &str) -> String {
        self.get(name).as_text().trim().to_string()
    }

    /// First non-empty text among several candidate properties
    pub fn first_text(&self, names: &[&str]) -> String {
        names
            .iter()
            .map(|n| self.text(n))
            .find(|s| !s.is_empty())
            .unwrap_or_default()
    }

    /// Text of the page's title-typed property, whatever it is named
    pub fn title(&self) -> String {
        self.map
            .values()
            .find(|v| v.get("type").and_then(Value::as_str) == Some("title"))
            .map(|v| normalize_property(v).as_text().trim().to_string())
            .unwrap_or_default()
    }

    pub fn list(&self, name: &str) -> Vec<String> {
        self.get(name).as_list()
    }

    pub fn flag(&self, name: &str) -> bool {
        self.get(name).as_flag()
    }

    pub fn number(&self, name: &str) -> f64 {
        self.get(name).as_number()
    }
}

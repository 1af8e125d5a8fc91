//! Built-in site templates using the Tera template engine
//!
//! All templates are embedded in the binary.

use anyhow::Result;
use serde::Serialize;
use std::collections::HashMap;
use tera::{Context, Tera};

use crate::config::{SiteConfig, SocialLink};
use crate::content::ContentItem;
use crate::helpers::{display_date, moment_to_chrono_format, strip_html, truncate};

/// Template renderer with the embedded site theme
pub struct TemplateRenderer {
    tera: Tera,
}

impl TemplateRenderer {
    /// Create a new renderer with all templates loaded
    pub fn new() -> Result<Self> {
        let mut tera = Tera::default();

        tera.add_raw_templates(vec![
            ("layout.html", include_str!("site/layout.html")),
            ("macros.html", include_str!("site/macros.html")),
            ("home.html", include_str!("site/home.html")),
            ("about.html", include_str!("site/about.html")),
            ("contact.html", include_str!("site/contact.html")),
            ("projects.html", include_str!("site/projects.html")),
            ("project.html", include_str!("site/project.html")),
            ("blog.html", include_str!("site/blog.html")),
            ("post.html", include_str!("site/post.html")),
            ("not_found.html", include_str!("site/not_found.html")),
        ])?;

        tera.register_filter("strip_html", strip_html_filter);
        tera.register_filter("truncate_chars", truncate_chars_filter);
        tera.register_filter("date_format", date_format_filter);

        Ok(Self { tera })
    }

    /// Render a template with given context
    pub fn render(&self, template_name: &str, context: &Context) -> Result<String> {
        Ok(self.tera.render(template_name, context)?)
    }
}

/// Tera filter: strip HTML tags
fn strip_html_filter(
    value: &tera::Value,
    _args: &HashMap<String, tera::Value>,
) -> tera::Result<tera::Value> {
    let s = tera::try_get_value!("strip_html", "value", String, value);
    Ok(tera::Value::String(strip_html(&s)))
}

/// Tera filter: truncate by character count
fn truncate_chars_filter(
    value: &tera::Value,
    args: &HashMap<String, tera::Value>,
) -> tera::Result<tera::Value> {
    let s = tera::try_get_value!("truncate_chars", "value", String, value);
    let length = match args.get("length") {
        Some(val) => tera::try_get_value!("truncate_chars", "length", usize, val),
        None => 160,
    };

    Ok(tera::Value::String(truncate(&s, length, Some("…"))))
}

/// Tera filter: format an ISO date string, "Recently" when missing
fn date_format_filter(
    value: &tera::Value,
    args: &HashMap<String, tera::Value>,
) -> tera::Result<tera::Value> {
    let s = match value {
        tera::Value::Null => String::new(),
        other => tera::try_get_value!("date_format", "value", String, other),
    };
    let format = match args.get("format") {
        Some(val) => tera::try_get_value!("date_format", "format", String, val),
        None => "MMMM DD, YYYY".to_string(),
    };

    Ok(tera::Value::String(display_date(
        &s,
        &moment_to_chrono_format(&format),
    )))
}

/// Site-wide values available to every template as `site`
#[derive(Debug, Clone, Serialize)]
pub struct SiteData {
    pub title: String,
    pub tagline: String,
    pub description: String,
    pub author: String,
    pub email: String,
    pub language: String,
    pub url: String,
    pub social: Vec<SocialLink>,
    pub menu: Vec<MenuItem>,
    pub year: i32,
}

impl SiteData {
    pub fn from_config(config: &SiteConfig) -> Self {
        use chrono::Datelike;

        Self {
            title: config.title.clone(),
            tagline: config.tagline.clone(),
            description: config.description.clone(),
            author: config.author.clone(),
            email: config.email.clone(),
            language: config.language.clone(),
            url: config.url.clone(),
            social: config.social.clone(),
            menu: MenuItem::defaults(),
            year: chrono::Local::now().year(),
        }
    }
}

/// A content item as seen by templates
#[derive(Debug, Clone, Serialize)]
pub struct ItemData<'a> {
    #[serde(flatten)]
    pub item: &'a ContentItem,
    pub path: String,
}

impl<'a> ItemData<'a> {
    pub fn new(item: &'a ContentItem) -> Self {
        Self {
            item,
            path: item.path(),
        }
    }

    pub fn list(items: &'a [ContentItem]) -> Vec<Self> {
        items.iter().map(Self::new).collect()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct MenuItem {
    pub name: String,
    pub path: String,
}

impl MenuItem {
    fn defaults() -> Vec<Self> {
        [
            ("Home", "/"),
            ("About", "/about"),
            ("Projects", "/projects"),
            ("Blog", "/blog"),
            ("Contact", "/contact"),
        ]
        .into_iter()
        .map(|(name, path)| MenuItem {
            name: name.to_string(),
            path: path.to_string(),
        })
        .collect()
    }
}

//! Blog posts and projects

use chrono::NaiveDate;
use serde::Serialize;
use std::cmp::Ordering;

use crate::cms::ContentBlock;
use crate::config::ProjectRecord;

/// Which collection an item belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Collection {
    Posts,
    Projects,
}

impl Collection {
    /// Title used when an item has none
    pub fn untitled(&self) -> &'static str {
        match self {
            Collection::Posts => "Untitled Post",
            Collection::Projects => "Untitled Project",
        }
    }

    /// URL prefix for item pages
    pub fn route(&self) -> &'static str {
        match self {
            Collection::Posts => "/blog",
            Collection::Projects => "/projects",
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Collection::Posts => "posts",
            Collection::Projects => "projects",
        }
    }
}

/// Body of an item
#[derive(Debug, Clone, Default, PartialEq)]
pub enum ItemContent {
    /// Only the CMS page id is known; the document has not been fetched
    #[default]
    Unfetched,
    /// Document blocks fetched from the CMS
    Blocks(Vec<ContentBlock>),
    /// Local markdown, already rendered
    Html(String),
}

/// A blog post or project
#[derive(Debug, Clone, Serialize)]
pub struct ContentItem {
    /// CMS page id, or the slug for local items
    pub id: String,
    pub slug: String,
    pub title: String,
    pub excerpt: String,
    /// ISO date string, or empty
    pub date: String,
    pub tags: Vec<String>,
    pub category: String,
    pub cover_image: String,
    pub author: String,
    pub read_time: String,
    pub client: String,
    pub featured: bool,
    pub published: bool,
    pub collection: Collection,
    #[serde(skip)]
    pub content: ItemContent,
}

impl ContentItem {
    pub fn new(collection: Collection, id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            slug: String::new(),
            title: collection.untitled().to_string(),
            excerpt: String::new(),
            date: String::new(),
            tags: Vec::new(),
            category: String::new(),
            cover_image: String::new(),
            author: String::new(),
            read_time: String::new(),
            client: String::new(),
            featured: false,
            published: true,
            collection,
            content: ItemContent::Unfetched,
        }
    }

    /// Build a project from a local catalog record
    pub fn from_record(record: &ProjectRecord) -> Self {
        let mut item = Self::new(Collection::Projects, record.slug.clone());
        item.slug = record.slug.clone();
        if !record.title.trim().is_empty() {
            item.title = record.title.clone();
        }
        item.excerpt = record.description.clone();
        item.client = record.client.clone();
        item.date = record.date.clone();
        item.category = record.category.clone();
        item.tags = record.technologies.clone();
        item.cover_image = record.cover_image.clone();
        item.featured = record.featured;
        item
    }

    /// Path of the item's page
    pub fn path(&self) -> String {
        format!("{}/{}", self.collection.route(), self.slug)
    }

    /// Parsed date, if any
    pub fn parsed_date(&self) -> Option<NaiveDate> {
        parse_iso_date(&self.date)
    }

    /// Blocks of the document, empty when none were fetched
    pub fn blocks(&self) -> &[ContentBlock] {
        match &self.content {
            ItemContent::Blocks(blocks) => blocks,
            _ => &[],
        }
    }

    /// Word count of the document body
    pub fn word_count(&self) -> usize {
        match &self.content {
            ItemContent::Blocks(blocks) => blocks
                .iter()
                .map(|b| b.plain_text().split_whitespace().count())
                .sum(),
            ItemContent::Html(html) => crate::helpers::strip_html(html).split_whitespace().count(),
            ItemContent::Unfetched => 0,
        }
    }

    /// Fill `read_time` from the body when the CMS left it blank
    pub fn estimate_read_time(&mut self) {
        if !self.read_time.trim().is_empty() {
            return;
        }
        let words = self.word_count();
        if words > 0 {
            let minutes = words.div_ceil(WORDS_PER_MINUTE).max(1);
            self.read_time = format!("{} min read", minutes);
        }
    }
}

const WORDS_PER_MINUTE: usize = 200;

/// Parse the date part of an ISO date or date-time string
pub fn parse_iso_date(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    let date_part = s.get(..10).unwrap_or(s);
    NaiveDate::parse_from_str(date_part, "%Y-%m-%d").ok()
}

/// Newest first; items without a usable date go last, keeping their order
pub fn sort_newest_first(items: &mut [ContentItem]) {
    items.sort_by(|a, b| match (a.parsed_date(), b.parsed_date()) {
        (Some(a), Some(b)) => b.cmp(&a),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    });
}

//! Local project catalog
//!
//! Projects listed in `_config.yml`, each optionally backed by a markdown file
//! `<projects_dir>/<slug>.md`. Files are read at request time; a missing file
//! leaves the record with an empty body.

use std::fs;
use std::path::{Path, PathBuf};

use super::item::{sort_newest_first, ContentItem, ItemContent};
use super::{FrontMatter, MarkdownRenderer};
use crate::config::ProjectRecord;

pub struct ProjectCatalog {
    records: Vec<ProjectRecord>,
    dir: PathBuf,
    renderer: MarkdownRenderer,
}

impl ProjectCatalog {
    pub fn new(records: Vec<ProjectRecord>, dir: impl Into<PathBuf>) -> Self {
        Self {
            records,
            dir: dir.into(),
            renderer: MarkdownRenderer::new(),
        }
    }

    /// All local projects, newest first, without bodies
    pub fn list(&self) -> Vec<ContentItem> {
        let mut items: Vec<ContentItem> = self
            .records
            .iter()
            .map(|record| {
                let mut record = record.clone();
                if let Some((fm, _)) = self.read_file(&record.slug) {
                    fm.apply_to(&mut record);
                }
                ContentItem::from_record(&record)
            })
            .collect();

        // Files without a catalog entry are projects too
        for slug in self.file_slugs() {
            if self.records.iter().any(|r| r.slug == slug) {
                continue;
            }
            if let Some(item) = self.find_file_only(&slug, false) {
                items.push(item);
            }
        }

        sort_newest_first(&mut items);
        items
    }

    /// One project with its rendered body
    pub fn find(&self, slug: &str) -> Option<ContentItem> {
        let Some(record) = self.records.iter().find(|r| r.slug == slug) else {
            return self.find_file_only(slug, true);
        };

        let mut record = record.clone();
        let body = match self.read_file(slug) {
            Some((fm, body)) => {
                fm.apply_to(&mut record);
                self.renderer.render(&body)
            }
            None => String::new(),
        };

        let mut item = ContentItem::from_record(&record);
        item.slug = slug.to_string();
        item.content = ItemContent::Html(body);
        Some(item)
    }

    fn find_file_only(&self, slug: &str, with_body: bool) -> Option<ContentItem> {
        let (fm, body) = self.read_file(slug)?;
        let mut record = ProjectRecord {
            slug: slug.to_string(),
            ..Default::default()
        };
        fm.apply_to(&mut record);

        let mut item = ContentItem::from_record(&record);
        item.slug = slug.to_string();
        if with_body {
            item.content = ItemContent::Html(self.renderer.render(&body));
        }
        Some(item)
    }

    fn file_path(&self, slug: &str) -> Option<PathBuf> {
        // Slugs come from URLs; refuse anything that could leave the directory
        if slug.is_empty() || slug.contains(['/', '\\']) || slug.starts_with('.') {
            return None;
        }
        Some(self.dir.join(format!("{}.md", slug)))
    }

    fn read_file(&self, slug: &str) -> Option<(FrontMatter, String)> {
        let path = self.file_path(slug)?;
        match fs::read_to_string(&path) {
            Ok(content) => {
                let (fm, body) = FrontMatter::parse(&content);
                Some((fm, body.to_string()))
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => None,
            Err(e) => {
                tracing::warn!("Failed to read project file {:?}: {}", path, e);
                None
            }
        }
    }

    fn file_slugs(&self) -> Vec<String> {
        let Ok(entries) = fs::read_dir(&self.dir) else {
            return Vec::new();
        };

        let mut slugs: Vec<String> = entries
            .filter_map(|e| e.ok())
            .map(|e| e.path())
            .filter(|p| p.is_file() && is_markdown_file(p))
            .filter_map(|p| p.file_stem().and_then(|s| s.to_str()).map(String::from))
            .collect();
        slugs.sort();
        slugs
    }
}

fn is_markdown_file(path: &Path) -> bool {
    path.extension().and_then(|e| e.to_str()) == Some("md")
}

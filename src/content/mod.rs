//! Content module - posts, projects and local project files

mod frontmatter;
mod item;
mod markdown;
mod projects;

pub use frontmatter::FrontMatter;
pub use item::{parse_iso_date, sort_newest_first, Collection, ContentItem, ItemContent};
pub use markdown::MarkdownRenderer;
pub use projects::ProjectCatalog;

//! List site content

use anyhow::Result;
use std::collections::HashMap;

use crate::cms::ContentService;
use crate::content::{Collection, ContentItem};
use crate::Folio;

/// List site content by type
pub async fn run(folio: &Folio, content_type: &str) -> Result<()> {
    let content = folio.content_service();

    match content_type {
        "post" | "posts" => {
            let posts = fetch(content.as_ref(), Collection::Posts).await?;
            println!("Posts ({}):", posts.len());
            for post in posts {
                println!("  {} - {} [{}]", date_column(&post), post.title, post.slug);
            }
        }
        "project" | "projects" => {
            let projects = projects(folio, content.as_ref()).await?;
            println!("Projects ({}):", projects.len());
            for project in projects {
                let featured = if project.featured { " *" } else { "" };
                println!(
                    "  {} - {} [{}]{}",
                    date_column(&project),
                    project.title,
                    project.slug,
                    featured
                );
            }
        }
        "tag" | "tags" => {
            let mut items = fetch(content.as_ref(), Collection::Posts).await?;
            items.extend(projects(folio, content.as_ref()).await?);

            let tags = tag_counts(&items);
            println!("Tags ({}):", tags.len());
            for (tag, count) in tags {
                println!("  {} ({})", tag, count);
            }
        }
        _ => {
            anyhow::bail!(
                "Unknown type: {}. Available: posts, projects, tags",
                content_type
            );
        }
    }

    Ok(())
}

async fn fetch(
    content: Option<&ContentService>,
    collection: Collection,
) -> Result<Vec<ContentItem>> {
    let Some(content) = content else {
        anyhow::bail!("The CMS is not configured; cannot list {}", collection.name());
    };
    Ok(content.collection(collection).await?)
}

/// CMS projects when any exist, otherwise the local catalog
async fn projects(folio: &Folio, content: Option<&ContentService>) -> Result<Vec<ContentItem>> {
    if let Some(content) = content {
        if content.has_collection(Collection::Projects) {
            let projects = content.projects().await?;
            if !projects.is_empty() {
                return Ok(projects);
            }
        }
    }
    Ok(folio.project_catalog().list())
}

fn date_column(item: &ContentItem) -> String {
    item.parsed_date()
        .map(|d| d.format("%Y-%m-%d").to_string())
        .unwrap_or_else(|| "----------".to_string())
}

/// Tags with their use counts, most used first, then by name
fn tag_counts(items: &[ContentItem]) -> Vec<(String, usize)> {
    let mut tags: HashMap<String, usize> = HashMap::new();
    for item in items {
        for tag in &item.tags {
            *tags.entry(tag.clone()).or_insert(0) += 1;
        }
    }

    let mut tags: Vec<_> = tags.into_iter().collect();
    tags.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    tags
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tagged(tags: &[&str]) -> ContentItem {
        let mut item = ContentItem::new(Collection::Posts, "id");
        item.tags = tags.iter().map(|t| t.to_string()).collect();
        item
    }

    #[test]
    fn test_tag_counts() {
        let items = vec![tagged(&["rust", "web"]), tagged(&["rust"]), tagged(&["cli"])];
        let counts = tag_counts(&items);
        assert_eq!(
            counts,
            vec![
                ("rust".to_string(), 2),
                ("cli".to_string(), 1),
                ("web".to_string(), 1)
            ]
        );
    }

    #[test]
    fn test_date_column() {
        let mut item = ContentItem::new(Collection::Posts, "id");
        assert_eq!(date_column(&item), "----------");
        item.date = "2024-06-01T10:00:00.000Z".into();
        assert_eq!(date_column(&item), "2024-06-01");
    }

    #[tokio::test]
    async fn test_unknown_type_is_an_error() {
        let dir = tempfile::TempDir::new().unwrap();
        let folio = Folio::with_config(dir.path().to_path_buf(), Default::default());
        assert!(run(&folio, "pages").await.is_err());
    }

    #[tokio::test]
    async fn test_projects_without_cms_use_local_catalog() {
        let dir = tempfile::TempDir::new().unwrap();
        let mut config = crate::config::SiteConfig::default();
        config.projects.push(crate::config::ProjectRecord {
            slug: "kiosk".into(),
            title: "Kiosk".into(),
            ..Default::default()
        });
        let folio = Folio::with_config(dir.path().to_path_buf(), config);

        let items = projects(&folio, None).await.unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].slug, "kiosk");
    }
}

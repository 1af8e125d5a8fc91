//! Collection, item and block-tree fetching
//!
//! All fetchers return `Result`; choosing to degrade a failure into an empty
//! page is left to the caller.

use serde_json::Value;
use std::collections::HashSet;
use std::sync::Arc;

use super::block::ContentBlock;
use super::client::{CmsClient, CollectionQuery};
use super::error::{CmsError, CmsResult, PartialBlocks};
use super::property::Properties;
use crate::config::CmsConfig;
use crate::content::{sort_newest_first, Collection, ContentItem, ItemContent};

/// Blocks requested per block-children call
pub const BLOCK_PAGE_SIZE: usize = 100;

/// Property names used by one collection
struct Schema {
    title_override: &'static str,
    excerpt: &'static [&'static str],
    tags: &'static [&'static str],
}

const POST_SCHEMA: Schema = Schema {
    title_override: "Content Title",
    excerpt: &["Excerpt", "Description"],
    tags: &["Tags"],
};

const PROJECT_SCHEMA: Schema = Schema {
    title_override: "Content Title",
    excerpt: &["Description", "Excerpt"],
    tags: &["Technologies", "Tags"],
};

impl Collection {
    fn schema(&self) -> &'static Schema {
        match self {
            Collection::Posts => &POST_SCHEMA,
            Collection::Projects => &PROJECT_SCHEMA,
        }
    }
}

/// Read-only access to the site's CMS collections
pub struct ContentService {
    client: Arc<dyn CmsClient>,
    posts_collection: String,
    projects_collection: String,
    page_size: usize,
}

impl ContentService {
    pub fn new(client: Arc<dyn CmsClient>, config: &CmsConfig) -> Self {
        Self {
            client,
            posts_collection: config.posts_collection.trim().to_string(),
            projects_collection: config.projects_collection.trim().to_string(),
            page_size: config.page_size.clamp(1, 100),
        }
    }

    fn collection_id(&self, collection: Collection) -> CmsResult<&str> {
        let id = match collection {
            Collection::Posts => &self.posts_collection,
            Collection::Projects => &self.projects_collection,
        };
        if id.is_empty() {
            return Err(CmsError::MissingCollection(collection.name()));
        }
        Ok(id.as_str())
    }

    /// Whether a collection id is configured
    pub fn has_collection(&self, collection: Collection) -> bool {
        self.collection_id(collection).is_ok()
    }

    /// Published items of a collection, newest first
    pub async fn collection(&self, collection: Collection) -> CmsResult<Vec<ContentItem>> {
        let id = self.collection_id(collection)?;
        let pages = self
            .query_all(id, CollectionQuery::published(self.page_size))
            .await?;

        let mut items: Vec<ContentItem> = pages
            .iter()
            .map(|page| item_from_page(collection, page))
            .filter(|item| item.published)
            .collect();
        sort_newest_first(&mut items);

        tracing::debug!("Fetched {} {}", items.len(), collection.name());
        Ok(items)
    }

    pub async fn posts(&self) -> CmsResult<Vec<ContentItem>> {
        self.collection(Collection::Posts).await
    }

    pub async fn projects(&self) -> CmsResult<Vec<ContentItem>> {
        self.collection(Collection::Projects).await
    }

    /// One published item with its document blocks
    ///
    /// When several pages share the slug, the first query result is used.
    /// Items listed under a derived slug (empty `Slug` property) are found by
    /// scanning the published collection.
    pub async fn item_by_slug(
        &self,
        collection: Collection,
        slug: &str,
    ) -> CmsResult<Option<ContentItem>> {
        let id = self.collection_id(collection)?;
        let query = CollectionQuery::by_slug(slug, self.page_size);
        let page = self.client.query_collection(id, &query).await?;

        if page.results.len() > 1 {
            tracing::warn!(
                "{} {} pages share slug {:?}; using the first",
                page.results.len(),
                collection.name(),
                slug
            );
        }

        let found = page
            .results
            .iter()
            .map(|p| item_from_page(collection, p))
            .find(|item| item.published);

        let mut item = match found {
            Some(item) => item,
            None => match self.item_by_derived_slug(collection, id, slug).await? {
                Some(item) => item,
                None => return Ok(None),
            },
        };

        let blocks = match self.block_tree(&item.id).await {
            Ok(blocks) => blocks,
            Err(partial) => {
                tracing::warn!("Document {} is incomplete: {}", item.id, partial);
                partial.blocks
            }
        };
        item.content = ItemContent::Blocks(blocks);
        item.estimate_read_time();

        Ok(Some(item))
    }

    /// Every top-level block of a page, in document order
    ///
    /// Children of container blocks are not fetched.
    pub async fn block_tree(&self, page_id: &str) -> Result<Vec<ContentBlock>, PartialBlocks> {
        let mut blocks = Vec::new();
        let mut cursor: Option<String> = None;
        let mut seen = HashSet::new();

        loop {
            let page = match self
                .client
                .list_block_children(page_id, cursor.as_deref(), BLOCK_PAGE_SIZE)
                .await
            {
                Ok(page) => page,
                Err(source) => return Err(PartialBlocks { blocks, source }),
            };

            blocks.extend(page.results.iter().map(ContentBlock::from_value));

            match next_cursor(page.has_more, page.next_cursor, &mut seen) {
                Some(next) => cursor = Some(next),
                None => break,
            }
        }

        Ok(blocks)
    }

    /// Run a collection query across all result pages
    async fn query_all(&self, collection_id: &str, query: CollectionQuery) -> CmsResult<Vec<Value>> {
        let mut results = Vec::new();
        let mut cursor: Option<String> = None;
        let mut seen = HashSet::new();

        loop {
            let page = self
                .client
                .query_collection(collection_id, &query.after(cursor.clone()))
                .await?;
            results.extend(page.results);

            match next_cursor(page.has_more, page.next_cursor, &mut seen) {
                Some(next) => cursor = Some(next),
                None => break,
            }
        }

        Ok(results)
    }

    /// Find a published item whose slug was derived from its title or id
    async fn item_by_derived_slug(
        &self,
        collection: Collection,
        collection_id: &str,
        slug: &str,
    ) -> CmsResult<Option<ContentItem>> {
        let pages = self
            .query_all(collection_id, CollectionQuery::published(self.page_size))
            .await?;

        Ok(pages
            .iter()
            .filter(|page| Properties::from_page(page).text("Slug").is_empty())
            .map(|page| item_from_page(collection, page))
            .find(|item| item.published && item.slug == slug))
    }
}

/// The cursor to follow, or `None` when listing should stop
///
/// Stops when the server reports no more results, omits the cursor, or hands
/// back any cursor already followed.
fn next_cursor(
    has_more: bool,
    next: Option<String>,
    seen: &mut HashSet<String>,
) -> Option<String> {
    let next = next.filter(|_| has_more)?;
    if !seen.insert(next.clone()) {
        tracing::warn!("CMS repeated cursor {:?}; stopping pagination", next);
        return None;
    }
    Some(next)
}

/// Map one CMS page object to a content item
pub fn item_from_page(collection: Collection, page: &Value) -> ContentItem {
    let schema = collection.schema();
    let props = Properties::from_page(page);
    let id = page
        .get("id")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();

    let mut item = ContentItem::new(collection, id);

    let title = props.first_text(&[schema.title_override, "Title"]);
    let title = if title.is_empty() { props.title() } else { title };
    if !title.is_empty() {
        item.title = title;
    }

    item.slug = props.text("Slug");
    if item.slug.is_empty() {
        item.slug = if props.title().is_empty() {
            item.id.clone()
        } else {
            slug::slugify(&item.title)
        };
    }

    item.excerpt = props.first_text(schema.excerpt);
    item.date = props.text("Date");
    item.tags = schema
        .tags
        .iter()
        .map(|name| props.list(name))
        .find(|tags| !tags.is_empty())
        .unwrap_or_default();
    item.category = props.text("Category");
    item.cover_image = props.text("Cover Image");
    if item.cover_image.is_empty() {
        item.cover_image = page_cover(page);
    }
    item.author = props.text("Author");
    item.read_time = props.text("Read Time");
    item.client = props.text("Client");
    item.featured = props.flag("Featured");
    item.published = props.flag("Published");

    item
}

/// URL of the page-level cover image, if any
fn page_cover(page: &Value) -> String {
    let Some(cover) = page.get("cover") else {
        return String::new();
    };
    ["external", "file"]
        .iter()
        .find_map(|kind| cover.get(kind)?.get("url")?.as_str())
        .unwrap_or_default()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cms::client::ListPage;
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::Mutex;

    fn text(s: &str) -> Value {
        json!([{ "type": "text", "plain_text": s, "annotations": {}, "href": null }])
    }

    fn page(id: &str, title: &str, slug: &str, date: Option<&str>, published: bool) -> Value {
        json!({
            "object": "page",
            "id": id,
            "properties": {
                "Title": { "type": "title", "title": text(title) },
                "Slug": { "type": "rich_text", "rich_text": text(slug) },
                "Date": { "type": "date", "date": date.map(|d| json!({ "start": d })) },
                "Published": { "type": "checkbox", "checkbox": published },
                "Tags": { "type": "multi_select", "multi_select": [{ "name": "rust" }] }
            }
        })
    }

    fn paragraph(i: usize) -> Value {
        json!({ "type": "paragraph", "paragraph": { "rich_text": text(&format!("block {}", i)) } })
    }

    /// In-memory CMS returning canned responses
    #[derive(Default)]
    struct FakeCms {
        pages: Vec<Value>,
        block_pages: Vec<ListPage>,
        fail_queries: bool,
        fail_block_page: Option<usize>,
        query_page_size: Option<usize>,
        block_calls: Mutex<Vec<Option<String>>>,
    }

    #[async_trait]
    impl CmsClient for FakeCms {
        async fn query_collection(
            &self,
            _collection_id: &str,
            query: &CollectionQuery,
        ) -> CmsResult<ListPage> {
            if self.fail_queries {
                return Err(CmsError::Status {
                    status: 502,
                    body: "bad gateway".into(),
                });
            }

            let slug = query.filter["and"][0]["rich_text"]["equals"].as_str();
            let matching: Vec<Value> = self
                .pages
                .iter()
                .filter(|p| match slug {
                    Some(slug) => Properties::from_page(p).text("Slug") == slug,
                    None => true,
                })
                .cloned()
                .collect();

            // Optional server-side paging of query results
            let Some(size) = self.query_page_size else {
                return Ok(ListPage {
                    results: matching,
                    has_more: false,
                    next_cursor: None,
                });
            };
            let start: usize = query
                .start_cursor
                .as_deref()
                .and_then(|c| c.parse().ok())
                .unwrap_or(0);
            let end = (start + size).min(matching.len());
            Ok(ListPage {
                results: matching[start..end].to_vec(),
                has_more: end < matching.len(),
                next_cursor: (end < matching.len()).then(|| end.to_string()),
            })
        }

        async fn list_block_children(
            &self,
            _block_id: &str,
            start_cursor: Option<&str>,
            page_size: usize,
        ) -> CmsResult<ListPage> {
            assert_eq!(page_size, BLOCK_PAGE_SIZE);
            let mut calls = self.block_calls.lock().unwrap();
            let index = calls.len();
            calls.push(start_cursor.map(String::from));

            if self.fail_block_page == Some(index) {
                return Err(CmsError::Status {
                    status: 500,
                    body: "boom".into(),
                });
            }
            Ok(self.block_pages.get(index).cloned().unwrap_or_default())
        }
    }

    fn service(fake: FakeCms) -> ContentService {
        let config = CmsConfig {
            posts_collection: "posts-db".into(),
            projects_collection: "projects-db".into(),
            ..Default::default()
        };
        ContentService::new(Arc::new(fake), &config)
    }

    fn block_page(range: std::ops::Range<usize>, next: Option<&str>) -> ListPage {
        ListPage {
            results: range.map(paragraph).collect(),
            has_more: next.is_some(),
            next_cursor: next.map(String::from),
        }
    }

    #[tokio::test]
    async fn test_unpublished_items_are_dropped() {
        let svc = service(FakeCms {
            pages: vec![
                page("1", "Visible", "visible", Some("2024-01-01"), true),
                page("2", "Draft", "draft", Some("2024-02-01"), false),
            ],
            ..Default::default()
        });

        let posts = svc.posts().await.unwrap();
        assert_eq!(posts.len(), 1);
        assert_eq!(posts[0].slug, "visible");
    }

    #[tokio::test]
    async fn test_collection_sorted_newest_first() {
        let svc = service(FakeCms {
            pages: vec![
                page("1", "Undated", "undated", None, true),
                page("2", "Old", "old", Some("2021-05-01"), true),
                page("3", "New", "new", Some("2024-05-01"), true),
            ],
            ..Default::default()
        });

        let posts = svc.posts().await.unwrap();
        let slugs: Vec<_> = posts.iter().map(|p| p.slug.as_str()).collect();
        assert_eq!(slugs, vec!["new", "old", "undated"]);
    }

    #[tokio::test]
    async fn test_collection_follows_query_cursor() {
        let pages = (0..5)
            .map(|i| page(&i.to_string(), "T", &format!("s{}", i), Some("2024-01-01"), true))
            .collect();
        let svc = service(FakeCms {
            pages,
            query_page_size: Some(2),
            ..Default::default()
        });

        assert_eq!(svc.projects().await.unwrap().len(), 5);
    }

    #[tokio::test]
    async fn test_collection_error_is_returned() {
        let svc = service(FakeCms {
            fail_queries: true,
            ..Default::default()
        });
        assert!(matches!(svc.posts().await, Err(CmsError::Status { status: 502, .. })));
    }

    #[tokio::test]
    async fn test_missing_collection_id() {
        let svc = ContentService::new(Arc::new(FakeCms::default()), &CmsConfig::default());
        assert!(!svc.has_collection(Collection::Posts));
        assert!(matches!(
            svc.posts().await,
            Err(CmsError::MissingCollection("posts"))
        ));
    }

    #[tokio::test]
    async fn test_block_tree_single_full_page() {
        let svc = service(FakeCms {
            block_pages: vec![block_page(0..100, Some("c1")), block_page(0..0, None)],
            ..Default::default()
        });

        let blocks = svc.block_tree("page").await.unwrap();
        assert_eq!(blocks.len(), 100);
    }

    #[tokio::test]
    async fn test_block_tree_preserves_order_across_pages() {
        let fake = FakeCms {
            block_pages: vec![
                block_page(0..100, Some("c1")),
                block_page(100..200, Some("c2")),
                block_page(200..230, None),
            ],
            ..Default::default()
        };
        let svc = service(fake);

        let blocks = svc.block_tree("page").await.unwrap();
        assert_eq!(blocks.len(), 230);
        assert_eq!(blocks[0].plain_text(), "block 0");
        assert_eq!(blocks[150].plain_text(), "block 150");
        assert_eq!(blocks[229].plain_text(), "block 229");
    }

    #[tokio::test]
    async fn test_block_tree_sends_cursors_in_sequence() {
        let fake = Arc::new(FakeCms {
            block_pages: vec![block_page(0..1, Some("c1")), block_page(1..2, None)],
            ..Default::default()
        });
        let config = CmsConfig {
            posts_collection: "posts-db".into(),
            ..Default::default()
        };
        let svc = ContentService::new(fake.clone(), &config);

        svc.block_tree("page").await.unwrap();
        let calls = fake.block_calls.lock().unwrap().clone();
        assert_eq!(calls, vec![None, Some("c1".to_string())]);
    }

    #[tokio::test]
    async fn test_block_tree_failure_keeps_partial_blocks() {
        let svc = service(FakeCms {
            block_pages: vec![block_page(0..100, Some("c1"))],
            fail_block_page: Some(1),
            ..Default::default()
        });

        let partial = svc.block_tree("page").await.unwrap_err();
        assert_eq!(partial.blocks.len(), 100);

        let svc = service(FakeCms {
            fail_block_page: Some(0),
            ..Default::default()
        });
        assert!(svc.block_tree("page").await.unwrap_err().blocks.is_empty());
    }

    #[tokio::test]
    async fn test_item_by_slug() {
        let svc = service(FakeCms {
            pages: vec![
                page("p1", "Hello", "hello", Some("2024-01-01"), true),
                page("p2", "Hidden", "hidden", Some("2024-01-01"), false),
            ],
            block_pages: vec![block_page(0..3, None)],
            ..Default::default()
        });

        let item = svc
            .item_by_slug(Collection::Posts, "hello")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(item.title, "Hello");
        assert_eq!(item.blocks().len(), 3);
        assert_eq!(item.read_time, "1 min read");

        assert!(svc
            .item_by_slug(Collection::Posts, "missing")
            .await
            .unwrap()
            .is_none());
        assert!(svc
            .item_by_slug(Collection::Posts, "hidden")
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_item_by_slug_uses_first_duplicate() {
        let svc = service(FakeCms {
            pages: vec![
                page("first", "First", "dup", Some("2024-03-01"), true),
                page("second", "Second", "dup", Some("2024-01-01"), true),
            ],
            ..Default::default()
        });

        let item = svc.item_by_slug(Collection::Posts, "dup").await.unwrap().unwrap();
        assert_eq!(item.id, "first");
    }

    #[tokio::test]
    async fn test_item_listed_under_derived_slug_can_be_opened() {
        let svc = service(FakeCms {
            pages: vec![
                page("p1", "Hello World", "", Some("2024-01-01"), true),
                page("p2", "Other", "other", Some("2024-01-02"), true),
            ],
            block_pages: vec![block_page(0..2, None)],
            ..Default::default()
        });

        let listed = svc.posts().await.unwrap();
        let derived = listed.iter().find(|p| p.id == "p1").unwrap();
        assert_eq!(derived.slug, "hello-world");

        let item = svc
            .item_by_slug(Collection::Posts, &derived.slug)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(item.id, "p1");
        assert_eq!(item.blocks().len(), 2);
    }

    #[tokio::test]
    async fn test_derived_slug_does_not_shadow_explicit_slug() {
        // "other" is p2's explicit slug; p1 has no Slug and is titled "Other"
        let svc = service(FakeCms {
            pages: vec![
                page("p1", "Other", "", Some("2024-03-01"), true),
                page("p2", "Second", "other", Some("2024-01-01"), true),
            ],
            ..Default::default()
        });

        let item = svc.item_by_slug(Collection::Posts, "other").await.unwrap().unwrap();
        assert_eq!(item.id, "p2");
    }

    #[tokio::test]
    async fn test_block_tree_stops_on_cursor_cycle() {
        let fake = Arc::new(FakeCms {
            block_pages: vec![
                block_page(0..1, Some("a")),
                block_page(1..2, Some("b")),
                block_page(2..3, Some("a")),
                block_page(3..4, Some("b")),
            ],
            ..Default::default()
        });
        let svc = ContentService::new(fake.clone(), &CmsConfig::default());

        let blocks = svc.block_tree("page").await.unwrap();
        assert_eq!(blocks.len(), 3);
        assert_eq!(fake.block_calls.lock().unwrap().len(), 3);
    }

    #[test]
    fn test_next_cursor() {
        let mut seen = HashSet::new();
        assert_eq!(next_cursor(true, Some("a".into()), &mut seen), Some("a".into()));
        assert_eq!(next_cursor(true, Some("b".into()), &mut seen), Some("b".into()));
        assert_eq!(next_cursor(true, Some("a".into()), &mut seen), None);
        assert_eq!(next_cursor(false, Some("c".into()), &mut seen), None);
        assert_eq!(next_cursor(true, None, &mut seen), None);
    }

    #[test]
    fn test_item_from_page_title_policy() {
        let mut p = page("1", "Primary", "", None, true);
        p["properties"]["Content Title"] = json!({ "type": "rich_text", "rich_text": text("Override") });
        let item = item_from_page(Collection::Posts, &p);
        assert_eq!(item.title, "Override");
        // Empty Slug falls back to the slugified title
        assert_eq!(item.slug, "override");

        let bare = json!({ "id": "abc", "properties": {} });
        let item = item_from_page(Collection::Projects, &bare);
        assert_eq!(item.title, "Untitled Project");
        assert_eq!(item.slug, "abc");
        assert!(!item.published);

        let item = item_from_page(Collection::Posts, &json!({ "id": "x" }));
        assert_eq!(item.title, "Untitled Post");
    }

    #[test]
    fn test_item_from_page_project_fields() {
        let p = json!({
            "id": "proj",
            "cover": { "type": "external", "external": { "url": "https://img/cover.png" } },
            "properties": {
                "Name": { "type": "title", "title": text("Renamed title column") },
                "Slug": { "type": "rich_text", "rich_text": text("proj") },
                "Description": { "type": "rich_text", "rich_text": text("Does things") },
                "Technologies": { "type": "multi_select", "multi_select": [{ "name": "Rust" }, { "name": "Tera" }] },
                "Client": { "type": "rich_text", "rich_text": text("Acme") },
                "Featured": { "type": "checkbox", "checkbox": true },
                "Published": { "type": "checkbox", "checkbox": true }
            }
        });
        let item = item_from_page(Collection::Projects, &p);
        assert_eq!(item.title, "Renamed title column");
        assert_eq!(item.excerpt, "Does things");
        assert_eq!(item.tags, vec!["Rust", "Tera"]);
        assert_eq!(item.client, "Acme");
        assert_eq!(item.cover_image, "https://img/cover.png");
        assert!(item.featured);
    }
}

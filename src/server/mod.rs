//! HTTP server rendering the site on every request

use anyhow::Result;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::get,
    Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tera::Context;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::cms::{CmsError, ContentService};
use crate::config::SiteConfig;
use crate::content::{Collection, ContentItem, ItemContent, ProjectCatalog};
use crate::render::{render_blocks, EMPTY_STATE};
use crate::templates::{ItemData, SiteData, TemplateRenderer};
use crate::Folio;

/// Shared, read-only server state
pub struct AppState {
    config: SiteConfig,
    site: SiteData,
    renderer: TemplateRenderer,
    content: Option<ContentService>,
    projects: ProjectCatalog,
}

impl AppState {
    pub fn new(folio: &Folio) -> Result<Self> {
        Self::with_content(folio, folio.content_service())
    }

    /// Build state around an explicit content service, `None` disables the CMS
    pub fn with_content(folio: &Folio, content: Option<ContentService>) -> Result<Self> {
        Ok(Self {
            config: folio.config.clone(),
            site: SiteData::from_config(&folio.config),
            renderer: TemplateRenderer::new()?,
            content,
            projects: folio.project_catalog(),
        })
    }

    fn context(&self, active: &str, page_title: &str) -> Context {
        let mut context = Context::new();
        context.insert("site", &self.site);
        context.insert("active", active);
        context.insert("page_title", page_title);
        context
    }

    fn render(&self, template: &str, context: &Context) -> Response {
        match self.renderer.render(template, context) {
            Ok(html) => Html(html).into_response(),
            Err(e) => {
                tracing::error!("Failed to render {}: {:?}", template, e);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error").into_response()
            }
        }
    }

    fn not_found(&self, message: &str, back_path: &str, back_label: &str) -> Response {
        let mut context = self.context("", "Not found");
        context.insert("message", message);
        context.insert("back_path", back_path);
        context.insert("back_label", back_label);

        let mut response = self.render("not_found.html", &context);
        if response.status() == StatusCode::OK {
            *response.status_mut() = StatusCode::NOT_FOUND;
        }
        response
    }

    /// Published items of a collection; failures degrade to an empty list
    async fn collection_or_empty(&self, collection: Collection) -> Vec<ContentItem> {
        let Some(content) = &self.content else {
            return Vec::new();
        };
        match content.collection(collection).await {
            Ok(items) => items,
            Err(CmsError::MissingCollection(name)) => {
                tracing::debug!("No {} collection configured", name);
                Vec::new()
            }
            Err(e) => {
                tracing::warn!("Failed to fetch {}: {}", collection.name(), e);
                Vec::new()
            }
        }
    }

    /// CMS projects, or the local catalog when the CMS has none
    async fn project_list(&self) -> Vec<ContentItem> {
        let projects = self.collection_or_empty(Collection::Projects).await;
        if projects.is_empty() {
            self.projects.list()
        } else {
            projects
        }
    }

    /// One CMS item; failures and misses are both `None`
    async fn cms_item(&self, collection: Collection, slug: &str) -> Option<ContentItem> {
        let content = self.content.as_ref()?;
        match content.item_by_slug(collection, slug).await {
            Ok(item) => item,
            Err(CmsError::MissingCollection(_)) => None,
            Err(e) => {
                tracing::warn!("Failed to fetch {} {:?}: {}", collection.name(), slug, e);
                None
            }
        }
    }

    fn render_item(&self, template: &str, item: &ContentItem) -> Response {
        let content_html = match &item.content {
            ItemContent::Blocks(blocks) => render_blocks(blocks),
            ItemContent::Html(html) if !html.trim().is_empty() => html.clone(),
            ItemContent::Html(_) | ItemContent::Unfetched => EMPTY_STATE.to_string(),
        };

        let mut context = self.context(item.collection.route(), &item.title);
        context.insert("item", &ItemData::new(item));
        context.insert("content_html", &content_html);
        self.render(template, &context)
    }
}

/// Build the application router
pub fn router(state: Arc<AppState>, static_dir: impl AsRef<std::path::Path>) -> Router {
    Router::new()
        .route("/", get(home))
        .route("/about", get(about))
        .route("/contact", get(contact))
        .route("/projects", get(projects))
        .route("/projects/:slug", get(project_detail))
        .route("/blog", get(blog))
        .route("/blog/:slug", get(post_detail))
        .nest_service("/static", ServeDir::new(static_dir.as_ref()))
        .fallback(fallback)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Start the server
pub async fn start(folio: &Folio, ip: &str, port: u16, open: bool) -> Result<()> {
    let state = Arc::new(AppState::new(folio)?);
    let app = router(state, &folio.static_dir);

    // Parse address - handle "localhost" specially
    let bind_ip = if ip == "localhost" { "127.0.0.1" } else { ip };
    let addr: SocketAddr = format!("{}:{}", bind_ip, port).parse()?;

    let url = format!("http://{}:{}", ip, port);
    println!("Server running at {}", url);
    println!("Press Ctrl+C to stop.");

    if open {
        if let Err(e) = open_browser(&url) {
            tracing::warn!("Failed to open browser: {}", e);
        }
    }

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

async fn home(State(state): State<Arc<AppState>>) -> Response {
    // The two collections degrade independently
    let (mut posts, projects) = tokio::join!(
        state.collection_or_empty(Collection::Posts),
        state.project_list()
    );
    posts.truncate(state.config.home_posts);
    let projects = featured_first(projects, state.config.home_projects);

    let mut context = state.context("/", "");
    context.insert("posts", &ItemData::list(&posts));
    context.insert("projects", &ItemData::list(&projects));
    state.render("home.html", &context)
}

async fn about(State(state): State<Arc<AppState>>) -> Response {
    let mut context = state.context("/about", "About");
    context.insert("about", &state.config.about);
    state.render("about.html", &context)
}

async fn contact(State(state): State<Arc<AppState>>) -> Response {
    let mut context = state.context("/contact", "Contact");
    context.insert("contact", &state.config.contact);
    state.render("contact.html", &context)
}

async fn projects(State(state): State<Arc<AppState>>) -> Response {
    let projects = state.project_list().await;
    let mut context = state.context("/projects", "Projects");
    context.insert("projects", &ItemData::list(&projects));
    state.render("projects.html", &context)
}

async fn project_detail(
    State(state): State<Arc<AppState>>,
    Path(slug): Path<String>,
) -> Response {
    let item = match state.cms_item(Collection::Projects, &slug).await {
        Some(item) => Some(item),
        None => state.projects.find(&slug),
    };

    match item {
        Some(item) => state.render_item("project.html", &item),
        None => state.not_found(
            "This project could not be found.",
            "/projects",
            "All projects",
        ),
    }
}

async fn blog(State(state): State<Arc<AppState>>) -> Response {
    let posts = state.collection_or_empty(Collection::Posts).await;
    let mut context = state.context("/blog", "Blog");
    context.insert("posts", &ItemData::list(&posts));
    state.render("blog.html", &context)
}

async fn post_detail(State(state): State<Arc<AppState>>, Path(slug): Path<String>) -> Response {
    match state.cms_item(Collection::Posts, &slug).await {
        Some(item) => state.render_item("post.html", &item),
        None => state.not_found("This post could not be found.", "/blog", "Back to the blog"),
    }
}

async fn fallback(State(state): State<Arc<AppState>>) -> Response {
    state.not_found("There is nothing at this address.", "/", "Home")
}

/// Featured items first, keeping order otherwise
fn featured_first(mut items: Vec<ContentItem>, limit: usize) -> Vec<ContentItem> {
    items.sort_by_key(|item| !item.featured);
    items.truncate(limit);
    items
}

/// Open a URL in the default browser
fn open_browser(url: &str) -> Result<()> {
    #[cfg(target_os = "macos")]
    {
        std::process::Command::new("open").arg(url).spawn()?;
    }

    #[cfg(target_os = "linux")]
    {
        std::process::Command::new("xdg-open").arg(url).spawn()?;
    }

    #[cfg(target_os = "windows")]
    {
        std::process::Command::new("cmd")
            .args(["/c", "start", url])
            .spawn()?;
    }

    Ok(())
}

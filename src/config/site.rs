//! Site configuration (_config.yml)

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Main site configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    // Site
    pub title: String,
    pub tagline: String,
    pub description: String,
    pub author: String,
    pub email: String,
    pub language: String,
    pub url: String,

    // About page
    pub about: AboutConfig,

    // Navigation and footer links
    #[serde(default)]
    pub social: Vec<SocialLink>,

    // Directory
    pub projects_dir: String,
    pub static_dir: String,

    // Home page
    pub home_posts: usize,
    pub home_projects: usize,

    // Content sources
    #[serde(default)]
    pub cms: CmsConfig,
    #[serde(default)]
    pub contact: ContactConfig,

    /// Local project catalog, rendered when the CMS has no projects
    #[serde(default)]
    pub projects: Vec<ProjectRecord>,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            title: "Folio".to_string(),
            tagline: "Notes, projects and experiments".to_string(),
            description: String::new(),
            author: "John Doe".to_string(),
            email: String::new(),
            language: "en".to_string(),
            url: "http://localhost:4000".to_string(),

            about: AboutConfig::default(),
            social: Vec::new(),

            projects_dir: "content/projects".to_string(),
            static_dir: "static".to_string(),

            home_posts: 3,
            home_projects: 3,

            cms: CmsConfig::default(),
            contact: ContactConfig::default(),
            projects: Vec::new(),
        }
    }
}

impl SiteConfig {
    /// Load configuration from a file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref())?;
        let mut config: SiteConfig = serde_yaml::from_str(&content)?;
        config.cms.apply_env_overrides();
        Ok(config)
    }
}

/// Headless CMS connection settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CmsConfig {
    pub base_url: String,
    pub api_version: String,
    /// Name of the environment variable holding the integration token
    pub token_env: String,
    pub posts_collection: String,
    pub projects_collection: String,
    pub page_size: usize,
    pub timeout_secs: u64,
}

impl Default for CmsConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.notion.com/v1".to_string(),
            api_version: "2022-06-28".to_string(),
            token_env: "NOTION_TOKEN".to_string(),
            posts_collection: String::new(),
            projects_collection: String::new(),
            page_size: 100,
            timeout_secs: 10,
        }
    }
}

impl CmsConfig {
    /// Collection ids may be supplied through the environment instead of the file
    pub fn apply_env_overrides(&mut self) {
        if let Ok(id) = std::env::var("FOLIO_POSTS_COLLECTION") {
            if !id.trim().is_empty() {
                self.posts_collection = id.trim().to_string();
            }
        }
        if let Ok(id) = std::env::var("FOLIO_PROJECTS_COLLECTION") {
            if !id.trim().is_empty() {
                self.projects_collection = id.trim().to_string();
            }
        }
    }

    /// Read the integration token from the configured environment variable
    pub fn token(&self) -> Option<String> {
        std::env::var(&self.token_env)
            .ok()
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
    }
}

/// Contact form relay
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct ContactConfig {
    /// Third-party endpoint the contact form posts JSON to
    pub endpoint: String,
    pub intro: String,
}

/// About page content
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct AboutConfig {
    pub headline: String,
    pub bio: Vec<String>,
    pub skills: Vec<String>,
    pub avatar: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct SocialLink {
    pub name: String,
    pub url: String,
}

/// A project listed in the local catalog
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct ProjectRecord {
    pub slug: String,
    pub title: String,
    pub description: String,
    pub client: String,
    pub date: String,
    pub category: String,
    pub technologies: Vec<String>,
    pub cover_image: String,
    pub featured: bool,
}

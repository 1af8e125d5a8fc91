//! folio: a portfolio and blog server backed by a headless CMS
//!
//! Posts and projects are read from a Notion-compatible CMS on every request,
//! normalized into flat content items, and rendered with embedded Tera
//! templates. Projects can also come from local markdown files.

pub mod cms;
pub mod commands;
pub mod config;
pub mod content;
pub mod helpers;
pub mod render;
pub mod server;
pub mod templates;

use anyhow::Result;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// The main application
#[derive(Clone)]
pub struct Folio {
    /// Site configuration
    pub config: config::SiteConfig,
    /// Base directory
    pub base_dir: PathBuf,
    /// Local project files
    pub projects_dir: PathBuf,
    /// Static assets served under /static
    pub static_dir: PathBuf,
}

impl Folio {
    /// Create a new instance from a directory
    pub fn new<P: AsRef<Path>>(base_dir: P) -> Result<Self> {
        let base_dir = base_dir.as_ref().to_path_buf();
        let config_path = base_dir.join("_config.yml");

        let config = if config_path.exists() {
            config::SiteConfig::load(&config_path)?
        } else {
            tracing::debug!("No _config.yml in {:?}, using defaults", base_dir);
            let mut config = config::SiteConfig::default();
            config.cms.apply_env_overrides();
            config
        };

        Ok(Self::with_config(base_dir, config))
    }

    pub fn with_config(base_dir: PathBuf, config: config::SiteConfig) -> Self {
        let projects_dir = base_dir.join(&config.projects_dir);
        let static_dir = base_dir.join(&config.static_dir);
        Self {
            config,
            base_dir,
            projects_dir,
            static_dir,
        }
    }

    /// Build the CMS content service, if a token is available
    pub fn content_service(&self) -> Option<cms::ContentService> {
        match cms::HttpCmsClient::new(&self.config.cms) {
            Ok(client) => Some(cms::ContentService::new(
                Arc::new(client),
                &self.config.cms,
            )),
            Err(e) => {
                tracing::warn!("CMS disabled: {}", e);
                None
            }
        }
    }

    /// Local project catalog
    pub fn project_catalog(&self) -> content::ProjectCatalog {
        content::ProjectCatalog::new(self.config.projects.clone(), &self.projects_dir)
    }
}

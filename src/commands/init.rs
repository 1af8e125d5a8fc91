//! Initialize a new site

use anyhow::Result;
use std::fs;
use std::path::Path;

const CONFIG: &str = r#"# Site
title: My Portfolio
tagline: Notes, projects and experiments
description: ''
author: John Doe
email: ''
language: en
url: http://localhost:4000

# About page
about:
  headline: ''
  bio:
    - Write a few sentences about yourself here.
  skills: []
  avatar: ''

social: []

# Directory
projects_dir: content/projects
static_dir: static

# Home page
home_posts: 3
home_projects: 3

# Headless CMS
## The token is read from the environment variable named by token_env.
## Collection ids can also be set with FOLIO_POSTS_COLLECTION and
## FOLIO_PROJECTS_COLLECTION.
cms:
  base_url: https://api.notion.com/v1
  api_version: '2022-06-28'
  token_env: NOTION_TOKEN
  posts_collection: ''
  projects_collection: ''
  timeout_secs: 10

# Contact form relay
contact:
  endpoint: ''
  intro: ''

# Local projects, shown when the CMS has none
projects:
  - slug: sample
    title: Sample Project
    description: A project described in content/projects/sample.md
    technologies: [Rust]
    featured: true
"#;

const STYLESHEET: &str = include_str!("site.css");

/// Initialize a new site in the given directory
pub fn init_site(target_dir: &Path) -> Result<()> {
    // Create directory structure
    fs::create_dir_all(target_dir)?;
    fs::create_dir_all(target_dir.join("content/projects"))?;
    fs::create_dir_all(target_dir.join("static/css"))?;

    let config_path = target_dir.join("_config.yml");
    if config_path.exists() {
        anyhow::bail!("{:?} already exists", config_path);
    }
    fs::write(&config_path, CONFIG)?;
    fs::write(target_dir.join("static/css/site.css"), STYLESHEET)?;

    // Create a sample project
    let today = chrono::Local::now();
    let sample_project = format!(
        r#"---
client: Personal
date: {}
category: Open source
technologies: Rust, axum
---

This is a local project page. Front-matter fields override the catalog entry
in `_config.yml`.

## Highlights

- Served straight from markdown
- Code blocks are highlighted

```rust
fn main() {{
    println!("Hello, world!");
}}
```
"#,
        today.format("%Y-%m-%d")
    );

    fs::write(target_dir.join("content/projects/sample.md"), sample_project)?;

    Ok(())
}

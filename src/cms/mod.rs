//! Headless CMS adapter
//!
//! Talks to a Notion-compatible API and normalizes its page/property/block
//! object model into [`ContentItem`](crate::content::ContentItem)s and
//! [`ContentBlock`]s.

mod block;
mod client;
mod error;
mod fetch;
mod property;
mod rich_text;

pub use block::ContentBlock;
pub use client::{CmsClient, CollectionQuery, HttpCmsClient, ListPage};
pub use error::{CmsError, CmsResult, PartialBlocks};
pub use fetch::{ContentService, BLOCK_PAGE_SIZE};
pub use property::{normalize_property, Properties, PropertyValue};
pub use rich_text::{plain_text, Annotations, RichText, RichTextSpan};

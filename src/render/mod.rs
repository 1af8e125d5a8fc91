//! HTML rendering of CMS documents

mod blocks;
mod rich_text;

pub use blocks::{render_blocks, EMPTY_STATE};
pub use rich_text::{render_rich_text, render_span};

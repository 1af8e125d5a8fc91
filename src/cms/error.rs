//! Errors raised while talking to the CMS

use thiserror::Error;

use super::block::ContentBlock;

#[derive(Debug, Error)]
pub enum CmsError {
    #[error("CMS token not set (expected in ${0})")]
    MissingToken(String),

    #[error("no collection id configured for {0}")]
    MissingCollection(&'static str),

    #[error("CMS request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("CMS returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("failed to decode CMS response: {0}")]
    Decode(#[from] serde_json::Error),
}

/// A block listing that stopped early
///
/// Holds every block received before the failing request.
#[derive(Debug, Error)]
#[error("block listing stopped after {} blocks: {source}", .blocks.len())]
pub struct PartialBlocks {
    pub blocks: Vec<ContentBlock>,
    #[source]
    pub source: CmsError,
}

pub type CmsResult<T> = std::result::Result<T, CmsError>;

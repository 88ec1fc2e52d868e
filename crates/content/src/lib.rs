//! Read-only view of repository content.
//!
//! Repositories hold [`AssetRecord`]s (metadata for one stored artifact,
//! pointing at a blob) and expose them as a folder tree of [`BrowseNode`]s.
//! This crate defines those records and the paginated [`ContentBrowser`]
//! contract used to walk them.

mod browser;
pub mod error;
#[cfg(feature = "mock")]
mod mock;
mod models;

pub use crate::browser::{ContentBrowser, Continuation};
#[cfg(feature = "mock")]
pub use crate::mock::MockContent;
pub use crate::models::{AssetBlob, AssetId, AssetRecord, BrowseNode, Repository};
use std::sync::Arc;

pub type ContentHandle = Arc<dyn ContentBrowser + Send + Sync>;

pub mod attributes;
pub mod backend;
pub mod error;
mod id;

pub use crate::attributes::{BlobAttributes, BlobMetrics, HashAlgorithm};
pub use crate::backend::BlobStore;
pub use crate::id::{BlobId, BlobRef};
use std::sync::Arc;

pub type BlobStoreHandle = Arc<dyn BlobStore + Send + Sync>;

//! In-memory content browser for testing.

use crate::browser::{Continuation, ContentBrowser};
use crate::error::{ErrorKind, Result};
use crate::models::AssetRecord;
use async_trait::async_trait;
use depot_paging::{ContinuationToken, TokenEncoder};
use exn::ResultExt;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

/// In-memory [`ContentBrowser`] over a fixed list of assets.
///
/// Pages are cut from the list in insertion order and the continuation
/// tokens are real [`TokenEncoder`] tokens bound to the repository name, so a
/// token from one `MockContent` is rejected by another with a different
/// name. Individual pages can be made to fail, and every call is counted.
pub struct MockContent {
    repository: String,
    assets: Vec<AssetRecord>,
    faults: HashMap<usize, ErrorKind>,
    calls: AtomicUsize,
}

impl MockContent {
    pub fn new(repository: impl Into<String>) -> Self {
        Self {
            repository: repository.into(),
            assets: Vec::new(),
            faults: HashMap::new(),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn with_asset(mut self, asset: AssetRecord) -> Self {
        self.assets.push(asset);
        self
    }

    pub fn with_assets(mut self, assets: impl IntoIterator<Item = AssetRecord>) -> Self {
        self.assets.extend(assets);
        self
    }

    /// Make the `call`-th call to `browse` (zero-based) fail with `kind`.
    pub fn fail_call(mut self, call: usize, kind: ErrorKind) -> Self {
        self.faults.insert(call, kind);
        self
    }

    /// Number of `browse` calls so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn query(&self) -> String {
        format!("repository={}", self.repository)
    }
}

#[async_trait]
impl ContentBrowser for MockContent {
    async fn browse(&self, limit: usize, token: Option<&ContinuationToken>) -> Result<Continuation<AssetRecord>> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(kind) = self.faults.get(&call) {
            exn::bail!(*kind);
        }
        let query = self.query();
        let offset = TokenEncoder.decode(token, &query).or_raise(|| ErrorKind::Token)?;
        let start = usize::try_from(offset).unwrap_or(usize::MAX).min(self.assets.len());
        let end = start.saturating_add(limit).min(self.assets.len());
        let items = self.assets[start..end].to_vec();
        if items.is_empty() {
            return Ok(Continuation::empty());
        }
        let next = TokenEncoder.encode(start as u64, items.len() as u64, &query);
        Ok(Continuation::new(items, Some(next)))
    }
}

use crate::error::Result;
use crate::filter::{AccessFilter, Decision};
use crate::selector::FilterParameters;
use async_trait::async_trait;
use depot_content::{BrowseNode, Repository};
use std::sync::Arc;

/// Store-side lookup of browse tree nodes.
#[async_trait]
pub trait BrowseSource: Send + Sync {
    /// Children of the node at `path` (one entry per segment), at most
    /// `max_nodes` of them. When `filter` is given, only nodes it matches are
    /// returned; `params` carries the values it refers to.
    async fn get_by_display_path(
        &self,
        repository: &Repository,
        path: &[String],
        max_nodes: usize,
        filter: Option<&str>,
        params: &FilterParameters,
    ) -> Result<Vec<BrowseNode>>;
}

/// Browse tree lookups with the current user's content selectors applied.
pub struct BrowseNodeQuery {
    access: AccessFilter,
    source: Arc<dyn BrowseSource>,
}

impl BrowseNodeQuery {
    pub fn new(access: AccessFilter, source: Arc<dyn BrowseSource>) -> Self {
        Self { access, source }
    }

    /// Children of `path` in `repository` that the current user may see, in
    /// the order the browse source returned them.
    ///
    /// # Errors
    /// - [`ErrorKind::Browse`](crate::error::ErrorKind::Browse) if the browse
    ///   source fails.
    pub async fn get_by_path(&self, repository: &Repository, path: &[String], max_nodes: usize) -> Result<Vec<BrowseNode>> {
        let decision = self.access.decide(repository, true).await;
        tracing::debug!(repository = %repository.name, ?decision, "Browse access decision");
        let (filter, params) = match &decision {
            Decision::Nothing => return Ok(Vec::new()),
            Decision::Pushdown { filter, params } => (Some(filter.as_str()), params.clone()),
            Decision::All | Decision::PerNode(_) => (None, FilterParameters::new()),
        };
        let nodes = self.source.get_by_display_path(repository, path, max_nodes, filter, &params).await?;

        let mut visible = Vec::with_capacity(nodes.len());
        for node in nodes {
            if self.access.admits(&decision, repository, &node.path).await {
                visible.push(node);
            }
        }
        Ok(visible)
    }
}

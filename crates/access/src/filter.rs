use crate::selector::{FilterParameters, SelectorFilterBuilder, SelectorKind, SelectorManager};
use async_trait::async_trait;
use depot_content::Repository;
use std::sync::Arc;

/// Repository-level permission checks for the current user.
#[async_trait]
pub trait Authorizer: Send + Sync {
    /// Whether the user may view everything in `repository`.
    async fn has_blanket_view(&self, repository: &Repository) -> bool;
}

/// Per-path content selector evaluation for the current user.
#[async_trait]
pub trait ContentAuth: Send + Sync {
    /// Evaluate every active selector against `path`.
    async fn check_path_permissions(&self, path: &str, format: &str, repository_name: &str) -> bool;

    /// Evaluate only the path-expression selectors against `path`.
    async fn check_path_permissions_path_only(&self, path: &str, format: &str, repository_name: &str) -> bool;
}

/// How candidates must be evaluated one at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Predicate {
    /// [`ContentAuth::check_path_permissions`].
    Full,
    /// [`ContentAuth::check_path_permissions_path_only`].
    PathOnly,
}

/// What the current user may see in one repository.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    /// Blanket view permission: everything is visible.
    All,
    /// No usable permission: nothing is visible, don't bother fetching.
    Nothing,
    /// Apply `filter` in the store; everything it returns is visible.
    Pushdown { filter: String, params: FilterParameters },
    /// Fetch unfiltered, then evaluate each candidate's path.
    PerNode(Predicate),
}

/// Shared access decision procedure for browse and search.
///
/// Holds no mutable state; clone it freely.
#[derive(Clone)]
pub struct AccessFilter {
    authorizer: Arc<dyn Authorizer>,
    selectors: Arc<dyn SelectorManager>,
    filter_builder: Arc<dyn SelectorFilterBuilder>,
    content_auth: Arc<dyn ContentAuth>,
}

impl AccessFilter {
    pub fn new(
        authorizer: Arc<dyn Authorizer>,
        selectors: Arc<dyn SelectorManager>,
        filter_builder: Arc<dyn SelectorFilterBuilder>,
        content_auth: Arc<dyn ContentAuth>,
    ) -> Self {
        Self {
            authorizer,
            selectors,
            filter_builder,
            content_auth,
        }
    }

    /// Work out what the current user may see in `repository`.
    ///
    /// Active selectors are always fetched, even with blanket permission, so
    /// that they stay available for enforcement further down. With
    /// `allow_pushdown` off (results can't be filtered at the source)
    /// content-expression selectors are evaluated per candidate instead.
    pub async fn decide(&self, repository: &Repository, allow_pushdown: bool) -> Decision {
        let blanket = self.authorizer.has_blanket_view(repository).await;
        let names = [repository.name.clone()];
        let formats = [repository.format.clone()];
        let selectors = match self.selectors.browse_active(&names, &formats).await {
            Ok(selectors) => selectors,
            Err(err) => {
                tracing::warn!(repository = %repository.name, blanket, error = ?err, "Failed to fetch active content selectors");
                return if blanket { Decision::All } else { Decision::Nothing };
            },
        };
        if blanket {
            return Decision::All;
        }
        if selectors.is_empty() {
            tracing::debug!(repository = %repository.name, "No content selectors and no browse permission");
            return Decision::Nothing;
        }

        if !selectors.iter().any(|s| s.kind == SelectorKind::ContentExpression) {
            return Decision::PerNode(Predicate::PathOnly);
        }
        if allow_pushdown {
            let mut params = FilterParameters::new();
            if let Some(filter) =
                self.filter_builder.build_filter(&repository.format, &repository.name, &selectors, &mut params)
            {
                return Decision::Pushdown { filter, params };
            }
        }
        Decision::PerNode(Predicate::Full)
    }

    /// Whether `path` is visible under `decision`.
    ///
    /// A [`Decision::Pushdown`] admits everything, since whatever reaches
    /// this point has already passed the store-side filter.
    pub async fn admits(&self, decision: &Decision, repository: &Repository, path: &str) -> bool {
        match decision {
            Decision::All | Decision::Pushdown { .. } => true,
            Decision::Nothing => false,
            Decision::PerNode(Predicate::Full) => {
                self.content_auth.check_path_permissions(path, &repository.format, &repository.name).await
            },
            Decision::PerNode(Predicate::PathOnly) => {
                self.content_auth
                    .check_path_permissions_path_only(path, &repository.format, &repository.name)
                    .await
            },
        }
    }
}

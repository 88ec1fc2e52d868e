//! Access-filtered, token-paginated search.

use crate::error::{ErrorKind, Result};
use crate::filter::{AccessFilter, Decision};
use async_trait::async_trait;
use depot_config::PagingConfig;
use depot_content::{AssetId, Repository};
use depot_paging::{ContinuationToken, QueryFingerprint, TokenEncoder};
use exn::ResultExt;
use std::borrow::Cow;
use std::collections::HashMap;
use std::sync::Arc;

/// One `property = value` criterion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchFilter {
    pub property: String,
    pub value: String,
}

/// A search for assets matching every filter.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchRequest {
    pub filters: Vec<SearchFilter>,
    pub continuation_token: Option<ContinuationToken>,
    pub page_size: Option<usize>,
}
impl SearchRequest {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn filter(mut self, property: impl Into<String>, value: impl Into<String>) -> Self {
        self.filters.push(SearchFilter {
            property: property.into(),
            value: value.into(),
        });
        self
    }

    pub fn continuation_token(mut self, token: ContinuationToken) -> Self {
        self.continuation_token = Some(token);
        self
    }

    pub fn page_size(mut self, page_size: usize) -> Self {
        self.page_size = Some(page_size);
        self
    }

    /// `property=value` pairs joined with `&`, in request order.
    pub fn query_text(&self) -> String {
        self.filters
            .iter()
            .map(|f| format!("{}={}", f.property, f.value))
            .collect::<Vec<_>>()
            .join("&")
    }
}
impl QueryFingerprint for SearchRequest {
    fn fingerprint_source(&self) -> Cow<'_, str> {
        Cow::Owned(self.query_text())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchHit {
    pub repository: Repository,
    pub path: String,
    pub asset_id: AssetId,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchResponse {
    pub hits: Vec<SearchHit>,
    /// Present iff the backend filled the page, so another may follow.
    pub continuation_token: Option<ContinuationToken>,
}

/// Executes raw, unfiltered searches.
#[async_trait]
pub trait SearchBackend: Send + Sync {
    /// Up to `limit` hits for `query`, skipping the first `offset`.
    ///
    /// # Errors
    /// - [`ErrorKind::Search`] if the query could not be executed.
    async fn search(&self, query: &str, offset: u64, limit: usize) -> Result<Vec<SearchHit>>;
}

/// Search with the current user's content selectors applied to every hit.
pub struct SecureSearch {
    access: AccessFilter,
    backend: Arc<dyn SearchBackend>,
    default_page_size: usize,
    max_page_size: usize,
}

impl SecureSearch {
    /// Pages sized by [`PagingConfig::default`] until
    /// [`with_config`](Self::with_config) says otherwise.
    pub fn new(access: AccessFilter, backend: Arc<dyn SearchBackend>) -> Self {
        let defaults = PagingConfig::default();
        Self {
            access,
            backend,
            default_page_size: defaults.default_page_size,
            max_page_size: defaults.max_page_size,
        }
    }

    pub fn with_page_sizes(mut self, default_page_size: usize, max_page_size: usize) -> Self {
        self.max_page_size = max_page_size.max(1);
        self.default_page_size = default_page_size.clamp(1, self.max_page_size);
        self
    }

    pub fn with_config(self, config: &PagingConfig) -> Self {
        self.with_page_sizes(config.default_page_size, config.max_page_size)
    }

    fn page_size(&self, requested: Option<usize>) -> usize {
        requested.unwrap_or(self.default_page_size).clamp(1, self.max_page_size)
    }

    /// Run one page of `request`.
    ///
    /// Pagination follows the raw result set: a page from which hits were
    /// filtered out still yields a continuation token if the backend filled
    /// it.
    ///
    /// # Errors
    /// - [`ErrorKind::Token`] if the request's continuation token is invalid
    ///   or belongs to a different query.
    /// - [`ErrorKind::Search`] if the backend fails.
    pub async fn search(&self, request: &SearchRequest) -> Result<SearchResponse> {
        let offset = TokenEncoder
            .decode(request.continuation_token.as_ref(), request)
            .or_raise(|| ErrorKind::Token)?;
        let page_size = self.page_size(request.page_size);
        let query = request.query_text();
        let raw = self.backend.search(&query, offset, page_size).await?;
        let full_page = raw.len() == page_size;

        let mut decisions: HashMap<String, Decision> = HashMap::new();
        let mut hits = Vec::with_capacity(raw.len());
        for hit in raw {
            if !decisions.contains_key(&hit.repository.name) {
                let decision = self.access.decide(&hit.repository, false).await;
                decisions.insert(hit.repository.name.clone(), decision);
            }
            let decision = &decisions[&hit.repository.name];
            if self.access.admits(decision, &hit.repository, &hit.path).await {
                hits.push(hit);
            }
        }
        tracing::debug!(query = %query, offset, page_size, visible = hits.len(), full_page, "Search page filtered");

        let continuation_token = full_page.then(|| TokenEncoder.encode(offset, page_size as u64, request));
        Ok(SearchResponse { hits, continuation_token })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fake::Fixture;
    use crate::selector::SelectorConfiguration;
    use rstest::rstest;
    use std::sync::Mutex;

    #[derive(Default)]
    struct FakeBackend {
        hits: Vec<SearchHit>,
        failing: bool,
        requests: Mutex<Vec<(String, u64, usize)>>,
    }
    #[async_trait]
    impl SearchBackend for FakeBackend {
        async fn search(&self, query: &str, offset: u64, limit: usize) -> Result<Vec<SearchHit>> {
            self.requests.lock().unwrap().push((query.to_string(), offset, limit));
            if self.failing {
                exn::bail!(ErrorKind::Search);
            }
            let start = usize::try_from(offset).unwrap().min(self.hits.len());
            let end = (start + limit).min(self.hits.len());
            Ok(self.hits[start..end].to_vec())
        }
    }

    fn hits(repository: &Repository, n: u64) -> Vec<SearchHit> {
        (0..n)
            .map(|i| SearchHit {
                repository: repository.clone(),
                path: format!("/org/example/{i}.jar"),
                asset_id: AssetId(i),
            })
            .collect()
    }

    fn search(fixture: &Fixture, backend: Arc<FakeBackend>) -> SecureSearch {
        SecureSearch::new(fixture.filter(), backend)
    }

    #[test]
    fn test_query_text() {
        let request = SearchRequest::new().filter("format", "maven2").filter("name", "Guava");
        assert_eq!(request.query_text(), "format=maven2&name=Guava");
    }

    #[rstest]
    #[case(None, 50)]
    #[case(Some(10), 10)]
    #[case(Some(1000), 300)]
    #[case(Some(0), 1)]
    fn test_page_size_clamped(#[case] requested: Option<usize>, #[case] expected: usize) {
        let fixture = Fixture::new();
        let search = search(&fixture, Arc::default());
        assert_eq!(search.page_size(requested), expected);
    }

    #[test]
    fn test_page_sizes_follow_config_defaults() {
        let fixture = Fixture::new();
        let defaults = PagingConfig::default();
        let search = search(&fixture, Arc::default());
        assert_eq!(search.page_size(None), defaults.default_page_size);
        assert_eq!(search.page_size(Some(usize::MAX)), defaults.max_page_size);
    }

    #[test]
    fn test_page_sizes_from_config() {
        let fixture = Fixture::new();
        let config = PagingConfig { default_page_size: 20, max_page_size: 40 };
        let search = search(&fixture, Arc::default()).with_config(&config);
        assert_eq!(search.page_size(None), 20);
        assert_eq!(search.page_size(Some(100)), 40);
    }

    #[tokio::test]
    async fn test_full_page_issues_token() {
        let fixture = Fixture::new().blanket(true);
        let backend = Arc::new(FakeBackend {
            hits: hits(&fixture.repository, 5),
            ..Default::default()
        });
        let search = search(&fixture, backend.clone());
        let request = SearchRequest::new().filter("format", "maven2").page_size(2);

        let first = search.search(&request).await.unwrap();
        assert_eq!(first.hits.len(), 2);
        let token = first.continuation_token.unwrap();

        let second = search.search(&request.clone().continuation_token(token)).await.unwrap();
        assert_eq!(second.hits[0].asset_id, AssetId(2));
        let token = second.continuation_token.unwrap();

        let third = search.search(&request.clone().continuation_token(token)).await.unwrap();
        assert_eq!(third.hits.len(), 1);
        assert!(third.continuation_token.is_none());

        let offsets: Vec<u64> = backend.requests.lock().unwrap().iter().map(|r| r.1).collect();
        assert_eq!(offsets, vec![0, 2, 4]);
    }

    #[tokio::test]
    async fn test_filtered_hits_do_not_shorten_pagination() {
        let fixture = Fixture::new()
            .selectors(vec![SelectorConfiguration::new("j", "jexl", "path =^ \"/org\"")])
            .path_only(true)
            .deny_path("/org/example/1.jar");
        let backend = Arc::new(FakeBackend {
            hits: hits(&fixture.repository, 4),
            ..Default::default()
        });
        let response = search(&fixture, backend)
            .search(&SearchRequest::new().filter("format", "maven2").page_size(2))
            .await
            .unwrap();
        assert_eq!(response.hits.len(), 1);
        assert!(response.continuation_token.is_some());
    }

    #[tokio::test]
    async fn test_token_from_other_query_rejected() {
        let fixture = Fixture::new().blanket(true);
        let backend = Arc::new(FakeBackend {
            hits: hits(&fixture.repository, 4),
            ..Default::default()
        });
        let search = search(&fixture, backend.clone());
        let maven = SearchRequest::new().filter("format", "maven2").page_size(2);
        let token = search.search(&maven).await.unwrap().continuation_token.unwrap();

        let npm = SearchRequest::new().filter("format", "npm").continuation_token(token);
        let err = search.search(&npm).await.unwrap_err();
        assert_eq!(*err, ErrorKind::Token);
        assert_eq!(backend.requests.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_decisions_memoized_per_repository() {
        let releases = Repository::new("releases", "maven2", "default");
        let snapshots = Repository::new("snapshots", "maven2", "default");
        let fixture = Fixture::new().blanket_for("releases", true).blanket_for("snapshots", false);
        let mut all = hits(&releases, 3);
        all.extend(hits(&snapshots, 3));
        let backend = Arc::new(FakeBackend { hits: all, ..Default::default() });

        let response = search(&fixture, backend).search(&SearchRequest::new().page_size(10)).await.unwrap();
        assert_eq!(response.hits.len(), 3);
        assert!(response.hits.iter().all(|h| h.repository == releases));
        assert!(response.continuation_token.is_none());
        assert_eq!(fixture.selectors.calls(), 2);
    }

    #[tokio::test]
    async fn test_backend_failure() {
        let fixture = Fixture::new().blanket(true);
        let backend = Arc::new(FakeBackend { failing: true, ..Default::default() });
        let err = search(&fixture, backend).search(&SearchRequest::new()).await.unwrap_err();
        assert_eq!(*err, ErrorKind::Search);
    }
}

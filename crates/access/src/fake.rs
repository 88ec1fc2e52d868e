//! Recording collaborators for unit tests.

use crate::browse::BrowseSource;
use crate::error::{ErrorKind, Result};
use crate::filter::{AccessFilter, Authorizer, ContentAuth};
use crate::selector::{FilterParameters, SelectorConfiguration, SelectorFilterBuilder, SelectorManager};
use async_trait::async_trait;
use depot_content::{BrowseNode, Repository};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

#[derive(Default)]
pub struct FakeAuthorizer {
    blanket: AtomicBool,
    per_repository: Mutex<HashMap<String, bool>>,
}
#[async_trait]
impl Authorizer for FakeAuthorizer {
    async fn has_blanket_view(&self, repository: &Repository) -> bool {
        let overrides = self.per_repository.lock().unwrap();
        overrides.get(&repository.name).copied().unwrap_or_else(|| self.blanket.load(Ordering::SeqCst))
    }
}

#[derive(Default)]
pub struct FakeSelectors {
    selectors: Mutex<Vec<SelectorConfiguration>>,
    failing: AtomicBool,
    calls: AtomicUsize,
}
impl FakeSelectors {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}
#[async_trait]
impl SelectorManager for FakeSelectors {
    async fn browse_active(&self, _: &[String], _: &[String]) -> Result<Vec<SelectorConfiguration>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.failing.load(Ordering::SeqCst) {
            exn::bail!(ErrorKind::SelectorUnavailable);
        }
        Ok(self.selectors.lock().unwrap().clone())
    }
}

#[derive(Default)]
pub struct FakeBuilder {
    filter: Mutex<Option<String>>,
    calls: AtomicUsize,
    last_selector_count: AtomicUsize,
}
impl FakeBuilder {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_selector_count(&self) -> usize {
        self.last_selector_count.load(Ordering::SeqCst)
    }
}
impl SelectorFilterBuilder for FakeBuilder {
    fn build_filter(
        &self,
        _: &str,
        repository_name: &str,
        selectors: &[SelectorConfiguration],
        params: &mut FilterParameters,
    ) -> Option<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.last_selector_count.store(selectors.len(), Ordering::SeqCst);
        params.insert("repository".into(), repository_name.into());
        self.filter.lock().unwrap().clone()
    }
}

#[derive(Default)]
pub struct FakeContentAuth {
    full: AtomicBool,
    path_only: AtomicBool,
    denied: Mutex<Vec<String>>,
    calls: AtomicUsize,
}
impl FakeContentAuth {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn check(&self, flag: &AtomicBool, path: &str) -> bool {
        self.calls.fetch_add(1, Ordering::SeqCst);
        flag.load(Ordering::SeqCst) && !self.denied.lock().unwrap().iter().any(|d| d == path)
    }
}
#[async_trait]
impl ContentAuth for FakeContentAuth {
    async fn check_path_permissions(&self, path: &str, _: &str, _: &str) -> bool {
        self.check(&self.full, path)
    }

    async fn check_path_permissions_path_only(&self, path: &str, _: &str, _: &str) -> bool {
        self.check(&self.path_only, path)
    }
}

#[derive(Default)]
pub struct FakeBrowse {
    nodes: Mutex<Vec<BrowseNode>>,
    failing: AtomicBool,
    calls: AtomicUsize,
    last_filter: Mutex<Option<String>>,
}
impl FakeBrowse {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_filter(&self) -> Option<String> {
        self.last_filter.lock().unwrap().clone()
    }
}
#[async_trait]
impl BrowseSource for FakeBrowse {
    async fn get_by_display_path(
        &self,
        repository: &Repository,
        _: &[String],
        max_nodes: usize,
        filter: Option<&str>,
        _: &FilterParameters,
    ) -> Result<Vec<BrowseNode>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_filter.lock().unwrap() = filter.map(str::to_string);
        if self.failing.load(Ordering::SeqCst) {
            exn::bail!(ErrorKind::Browse(repository.name.clone()));
        }
        Ok(self.nodes.lock().unwrap().iter().take(max_nodes).cloned().collect())
    }
}

/// A `test-repo` maven2 repository and one of each collaborator, everything
/// denied by default.
pub struct Fixture {
    pub repository: Repository,
    pub authorizer: Arc<FakeAuthorizer>,
    pub selectors: Arc<FakeSelectors>,
    pub builder: Arc<FakeBuilder>,
    pub content_auth: Arc<FakeContentAuth>,
    pub browse: Arc<FakeBrowse>,
}
impl Fixture {
    pub fn new() -> Self {
        Self {
            repository: Repository::new("test-repo", "maven2", "default"),
            authorizer: Arc::default(),
            selectors: Arc::default(),
            builder: Arc::default(),
            content_auth: Arc::default(),
            browse: Arc::default(),
        }
    }

    pub fn blanket(self, blanket: bool) -> Self {
        self.authorizer.blanket.store(blanket, Ordering::SeqCst);
        self
    }

    pub fn blanket_for(self, repository: &str, blanket: bool) -> Self {
        self.authorizer.per_repository.lock().unwrap().insert(repository.into(), blanket);
        self
    }

    pub fn selectors(self, selectors: Vec<SelectorConfiguration>) -> Self {
        *self.selectors.selectors.lock().unwrap() = selectors;
        self
    }

    pub fn selectors_unavailable(self) -> Self {
        self.selectors.failing.store(true, Ordering::SeqCst);
        self
    }

    pub fn build_filter(self, filter: &str) -> Self {
        *self.builder.filter.lock().unwrap() = Some(filter.into());
        self
    }

    pub fn full(self, allowed: bool) -> Self {
        self.content_auth.full.store(allowed, Ordering::SeqCst);
        self
    }

    pub fn path_only(self, allowed: bool) -> Self {
        self.content_auth.path_only.store(allowed, Ordering::SeqCst);
        self
    }

    pub fn deny_path(self, path: &str) -> Self {
        self.content_auth.denied.lock().unwrap().push(path.into());
        self
    }

    pub fn nodes(self, nodes: Vec<BrowseNode>) -> Self {
        *self.browse.nodes.lock().unwrap() = nodes;
        self
    }

    pub fn browse_failing(self) -> Self {
        self.browse.failing.store(true, Ordering::SeqCst);
        self
    }

    pub fn filter(&self) -> AccessFilter {
        AccessFilter::new(
            self.authorizer.clone(),
            self.selectors.clone(),
            self.builder.clone(),
            self.content_auth.clone(),
        )
    }
}

//! Content-selector access filtering.
//!
//! A user who lacks blanket "view" permission on a repository only sees the
//! parts of it their content selectors grant. [`AccessFilter`] makes that
//! decision once per repository; [`BrowseNodeQuery`] applies it to browse
//! tree listings (pushing it down into the store where possible) and
//! [`search::SecureSearch`] applies it to paginated search hits.

mod browse;
pub mod error;
#[cfg(test)]
mod fake;
mod filter;
pub mod search;
mod selector;

pub use crate::browse::{BrowseNodeQuery, BrowseSource};
pub use crate::filter::{AccessFilter, Authorizer, ContentAuth, Decision, Predicate};
pub use crate::selector::{FilterParameters, SelectorConfiguration, SelectorFilterBuilder, SelectorKind, SelectorManager};

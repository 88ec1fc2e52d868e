use crate::error::Result;
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::fmt;

/// Named parameters bound into a pushed-down selector filter.
pub type FilterParameters = BTreeMap<String, String>;

/// Expression language of a content selector.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum SelectorKind {
    /// `csel`: content-selector expression; can be compiled into a store-side
    /// filter.
    ContentExpression,
    /// `jexl`: path expression, only evaluable one path at a time.
    PathExpression,
    /// Any other type tag, kept verbatim. Never grants access on its own.
    Other(String),
}
impl SelectorKind {
    pub const CONTENT_EXPRESSION: &'static str = "csel";
    pub const PATH_EXPRESSION: &'static str = "jexl";

    pub fn parse(tag: &str) -> Self {
        match tag {
            Self::CONTENT_EXPRESSION => Self::ContentExpression,
            Self::PATH_EXPRESSION => Self::PathExpression,
            other => Self::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::ContentExpression => Self::CONTENT_EXPRESSION,
            Self::PathExpression => Self::PATH_EXPRESSION,
            Self::Other(tag) => tag,
        }
    }
}
impl fmt::Display for SelectorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A content selector granted to the current user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectorConfiguration {
    pub name: String,
    pub kind: SelectorKind,
    pub expression: String,
}
impl SelectorConfiguration {
    pub fn new(name: impl Into<String>, kind: &str, expression: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: SelectorKind::parse(kind),
            expression: expression.into(),
        }
    }
}

/// Source of the content selectors that apply to the current user.
#[async_trait]
pub trait SelectorManager: Send + Sync {
    /// Selectors active for any of `repository_names` and `formats`.
    ///
    /// # Errors
    /// - [`ErrorKind::SelectorUnavailable`](crate::error::ErrorKind::SelectorUnavailable)
    ///   if the selector store could not be read.
    async fn browse_active(&self, repository_names: &[String], formats: &[String]) -> Result<Vec<SelectorConfiguration>>;
}

/// Compiles selectors into a filter the browse store can apply itself.
pub trait SelectorFilterBuilder: Send + Sync {
    /// Returns `None` if the selectors can't be expressed as a store-side
    /// filter. Any values the filter refers to are added to `params`.
    fn build_filter(
        &self,
        format: &str,
        repository_name: &str,
        selectors: &[SelectorConfiguration],
        params: &mut FilterParameters,
    ) -> Option<String>;
}

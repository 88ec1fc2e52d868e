use crate::error::Result;
use crate::models::AssetRecord;
use async_trait::async_trait;
use depot_paging::ContinuationToken;

/// One page of results plus the cursor for the page after it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Continuation<T> {
    items: Vec<T>,
    next: Option<ContinuationToken>,
}
impl<T> Continuation<T> {
    pub fn new(items: Vec<T>, next: Option<ContinuationToken>) -> Self {
        Self { items, next }
    }

    /// Terminal page with nothing in it.
    pub fn empty() -> Self {
        Self { items: Vec::new(), next: None }
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.items.iter()
    }

    /// Cursor to pass back to fetch the following page. May be present even
    /// when the following page turns out to be empty.
    pub fn next_continuation_token(&self) -> Option<&ContinuationToken> {
        self.next.as_ref()
    }

    pub fn into_parts(self) -> (Vec<T>, Option<ContinuationToken>) {
        (self.items, self.next)
    }
}
impl<T> IntoIterator for Continuation<T> {
    type Item = T;
    type IntoIter = std::vec::IntoIter<T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}
impl<'a, T> IntoIterator for &'a Continuation<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

/// Paginated, read-only view over the assets of one repository.
///
/// Walking every page from `None` until an empty page yields each asset
/// present for the whole walk exactly once, in a stable order.
///
/// # Examples
///
/// ```ignore
/// let mut token = None;
/// loop {
///     let page = content.browse(1000, token.as_ref()).await?;
///     if page.is_empty() {
///         break;
///     }
///     token = page.next_continuation_token().cloned();
///     for asset in page {
///         println!("{}", asset.path);
///     }
/// }
/// ```
#[async_trait]
pub trait ContentBrowser: Send + Sync {
    /// Fetch up to `limit` assets, starting where `token` left off (or from
    /// the beginning if `None`).
    ///
    /// # Errors
    /// - [`ErrorKind::Token`](crate::error::ErrorKind::Token) if `token` was not
    ///   issued by this browser.
    /// - [`ErrorKind::Store`](crate::error::ErrorKind::Store) if the content
    ///   store could not be read.
    async fn browse(&self, limit: usize, token: Option<&ContinuationToken>) -> Result<Continuation<AssetRecord>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_continuation() {
        let page: Continuation<u32> = Continuation::empty();
        assert!(page.is_empty());
        assert_eq!(page.len(), 0);
        assert!(page.next_continuation_token().is_none());
    }

    #[test]
    fn test_continuation_iterates_in_order() {
        let token = ContinuationToken::from_wire("abc");
        let page = Continuation::new(vec![3, 1, 2], Some(token.clone()));
        assert_eq!(page.iter().copied().collect::<Vec<_>>(), vec![3, 1, 2]);
        assert_eq!(page.next_continuation_token(), Some(&token));
        let (items, next) = page.into_parts();
        assert_eq!(items, vec![3, 1, 2]);
        assert_eq!(next, Some(token));
    }
}

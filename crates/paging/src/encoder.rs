use crate::error::{ErrorKind, Result};
use crate::token::ContinuationToken;
use exn::ResultExt;
use std::borrow::Cow;

const SEPARATOR: char = ':';

/// Anything that can identify the query a page of results came from.
///
/// The returned text must be canonical: two queries that select the same
/// results in the same order must produce the same text, and any difference
/// in filter criteria must show up in it.
pub trait QueryFingerprint {
    fn fingerprint_source(&self) -> Cow<'_, str>;
}
impl QueryFingerprint for str {
    fn fingerprint_source(&self) -> Cow<'_, str> {
        Cow::Borrowed(self)
    }
}
impl QueryFingerprint for String {
    fn fingerprint_source(&self) -> Cow<'_, str> {
        Cow::Borrowed(self.as_str())
    }
}
impl<T: QueryFingerprint + ?Sized> QueryFingerprint for &T {
    fn fingerprint_source(&self) -> Cow<'_, str> {
        (**self).fingerprint_source()
    }
}

/// Encodes and decodes [`ContinuationToken`]s.
///
/// A token is the hex encoding of `"<offset>:<fingerprint>"`, where the
/// fingerprint is the CRC32 of the query's canonical text. Decoding a token
/// against any other query fails, so a cursor cannot be replayed against a
/// different filter.
///
/// Stateless; share it freely between threads.
///
/// # Examples
///
/// ```
/// use depot_paging::TokenEncoder;
///
/// let encoder = TokenEncoder;
/// let query = "format=maven2";
///
/// // First page.
/// assert_eq!(encoder.decode(None, query).unwrap(), 0);
///
/// // Next page after fetching 50 results from offset 100.
/// let token = encoder.encode(100, 50, query);
/// assert_eq!(encoder.decode(Some(&token), query).unwrap(), 150);
///
/// // Same token, different query.
/// assert!(encoder.decode(Some(&token), "format=npm").is_err());
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct TokenEncoder;

impl TokenEncoder {
    /// Mint the token for the page that follows the one starting at `offset`.
    pub fn encode<Q: QueryFingerprint + ?Sized>(&self, offset: u64, page_size: u64, query: &Q) -> ContinuationToken {
        let next = offset.saturating_add(page_size);
        let plain = format!("{next}{SEPARATOR}{}", self.fingerprint(query));
        ContinuationToken::new(hex::encode(plain))
    }

    /// Recover the offset a token points at.
    ///
    /// No token means "start from the beginning".
    ///
    /// # Errors
    /// - [`ErrorKind::Malformed`] if the token is not hex-encoded UTF-8.
    /// - [`ErrorKind::Unparseable`] if it doesn't hold exactly two parts.
    /// - [`ErrorKind::IndexInvalid`] if the offset is not a non-negative integer.
    /// - [`ErrorKind::Mismatch`] if the token was issued for another query.
    pub fn decode<Q: QueryFingerprint + ?Sized>(&self, token: Option<&ContinuationToken>, query: &Q) -> Result<u64> {
        let Some(token) = token else {
            return Ok(0);
        };
        let raw = token.as_str();
        let bytes = hex::decode(raw).or_raise(|| ErrorKind::Malformed(raw.to_string()))?;
        let plain = String::from_utf8(bytes).or_raise(|| ErrorKind::Malformed(raw.to_string()))?;
        let parts: Vec<&str> = plain.split(SEPARATOR).collect();
        let [offset, fingerprint] = parts.as_slice() else {
            exn::bail!(ErrorKind::Unparseable(raw.to_string()));
        };
        let offset = offset.parse::<u64>().or_raise(|| ErrorKind::IndexInvalid(raw.to_string()))?;
        if *fingerprint != self.fingerprint(query) {
            tracing::debug!(token = raw, "Continuation token replayed against a different query");
            exn::bail!(ErrorKind::Mismatch(raw.to_string()));
        }
        Ok(offset)
    }

    /// Short, deterministic hash of the query's canonical text: eight
    /// lowercase hex digits.
    pub fn fingerprint<Q: QueryFingerprint + ?Sized>(&self, query: &Q) -> String {
        format!("{:08x}", crc32fast::hash(query.fingerprint_source().as_bytes()))
    }
}

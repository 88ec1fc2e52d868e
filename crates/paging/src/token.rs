use std::fmt;

/// Opaque cursor into a paginated result set.
///
/// Tokens are only ever minted by [`TokenEncoder::encode`](crate::TokenEncoder::encode)
/// or received back from a client with [`from_wire`](Self::from_wire). There
/// is deliberately no way to build one from an offset, or to read the offset
/// back out without going through [`TokenEncoder::decode`](crate::TokenEncoder::decode)
/// and the query it was issued for.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize), serde(transparent))]
pub struct ContinuationToken(String);

impl ContinuationToken {
    pub(crate) fn new(encoded: String) -> Self {
        Self(encoded)
    }

    /// Wrap a token string exactly as a client sent it. No validation happens
    /// here; a bad token is rejected when it is decoded.
    pub fn from_wire(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// The string to hand back to a client.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}
impl fmt::Display for ContinuationToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

//! Tamper-detecting continuation tokens.
//!
//! Large result sets (asset browsing, search) are handed out one page at a
//! time. The cursor for the next page is a [`ContinuationToken`]: an opaque
//! string binding an offset to a fingerprint of the query that produced it,
//! so that a token can't be replayed against a different query.

mod encoder;
pub mod error;
mod token;

pub use crate::encoder::{QueryFingerprint, TokenEncoder};
pub use crate::token::ContinuationToken;

//! Token - opaque, dispatcher-scoped handler identifier
//!
//! A token is only meaningful to the dispatcher that minted it; the
//! `DispatcherId` half exists so tokens from different instances never
//! compare equal even when their indices coincide.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_INSTANCE: AtomicU64 = AtomicU64::new(0);

/// Process-unique dispatcher instance identity.
///
/// Assigned once at dispatcher construction from a process-wide counter.
/// Its only job is to scope tokens to their minting dispatcher; it carries
/// no other meaning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DispatcherId(u64);

impl DispatcherId {
    /// Allocate the next process-unique id.
    pub fn next() -> Self {
        Self(NEXT_INSTANCE.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for DispatcherId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "d{}", self.0)
    }
}

/// Opaque handle to a registered handler.
///
/// Two tokens are equal iff both the owning dispatcher and the index match.
/// Ordering is `(dispatcher, index)`, so tokens minted by one dispatcher
/// sort in registration order.
///
/// # Examples
/// ```
/// use contracts::{DispatcherId, TokenStream};
///
/// let mut stream = TokenStream::new(DispatcherId::next());
/// let a = stream.next().unwrap();
/// let b = stream.next().unwrap();
/// assert_ne!(a, b);
/// assert!(a < b);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Token {
    dispatcher: DispatcherId,
    index: u64,
}

impl Token {
    pub(crate) fn new(dispatcher: DispatcherId, index: u64) -> Self {
        Self { dispatcher, index }
    }

    /// The dispatcher instance that minted this token.
    #[inline]
    pub fn dispatcher(&self) -> DispatcherId {
        self.dispatcher
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.dispatcher, self.index)
    }
}

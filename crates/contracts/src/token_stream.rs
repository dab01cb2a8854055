//! TokenStream - per-dispatcher token allocator
//!
//! Conceptually an infinite, strictly increasing sequence of tokens sharing
//! one dispatcher prefix. Indices are never reused, not even after the
//! corresponding handler is unregistered.

use crate::error::DispatchError;
use crate::token::{DispatcherId, Token};

/// Allocator producing the token sequence for a single dispatcher.
#[derive(Debug)]
pub struct TokenStream {
    dispatcher: DispatcherId,
    next_index: u64,
}

impl TokenStream {
    /// Create a stream scoped to the given dispatcher, starting at index 0.
    pub fn new(dispatcher: DispatcherId) -> Self {
        Self {
            dispatcher,
            next_index: 0,
        }
    }

    /// Mint the next token.
    ///
    /// Fails only when the index space is exhausted, which callers treat as
    /// an unrecoverable environment error.
    pub fn next(&mut self) -> Result<Token, DispatchError> {
        let index = self.next_index;
        self.next_index =
            index
                .checked_add(1)
                .ok_or(DispatchError::TokenStreamExhausted {
                    dispatcher: self.dispatcher,
                })?;
        Ok(Token::new(self.dispatcher, index))
    }
}

//! Dispatch invariant diagnostics
//!
//! Every condition here is a programmer error, not a data error: the engine
//! never returns these to callers, it logs them and halts. The enum exists
//! so panic messages stay structured and matchable in tests.

use thiserror::Error;

use crate::token::{DispatcherId, Token};

/// Diagnostic for a violated dispatch invariant.
#[derive(Debug, Error)]
pub enum DispatchError {
    /// `dispatch` was called while a cycle was already in progress
    #[error("cannot dispatch in the middle of a dispatch")]
    ReentrantDispatch,

    /// `wait_for` was called with no cycle in progress
    #[error("wait_for must be invoked while dispatching")]
    WaitOutsideDispatch,

    /// A `wait_for` target is still mid-execution on the active call path
    #[error("circular dependency detected while waiting for {token}")]
    CircularDependency { token: Token },

    /// `unregister` was given a token with no registered callback
    #[error("token {token} does not map to a registered callback")]
    UnknownToken { token: Token },

    /// The token allocator ran out of index space
    #[error("token stream exhausted for dispatcher {dispatcher}")]
    TokenStreamExhausted { dispatcher: DispatcherId },
}

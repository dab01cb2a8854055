//! # Contracts
//!
//! Frozen interface contracts, defining inter-module data structures shared
//! across the workspace. All business crates can only depend on this crate,
//! reverse dependencies are prohibited.
//!
//! ## Identity Model
//! - Every `Dispatcher` instance gets a process-unique `DispatcherId`
//! - Handler handles are `Token`s: the minting dispatcher's id plus a
//!   monotonically increasing index, never reused

mod error;
mod token;
mod token_stream;

pub use error::DispatchError;
pub use token::{DispatcherId, Token};
pub use token_stream::TokenStream;

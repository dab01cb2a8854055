//! # Dispatcher
//!
//! Synchronous event-fan-out engine.
//!
//! Responsibilities:
//! - Deliver one payload to every registered handler per `dispatch` call
//! - Resolve `wait_for` ordering dependencies between handlers at dispatch
//!   time, detecting circular waits
//! - Keep handlers single-threaded and re-entrancy-safe (no nested dispatch)

pub mod cycle;
pub mod dispatcher;
pub mod metrics;

pub use contracts::{DispatchError, DispatcherId, Token, TokenStream};
pub use cycle::CycleState;
pub use dispatcher::Dispatcher;
pub use metrics::{DispatchMetrics, MetricsSnapshot};

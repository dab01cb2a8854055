//! Dispatcher - synchronous fan-out with runtime dependency resolution
//!
//! Registration maps tokens to callbacks; `dispatch` walks the registered
//! handlers in registration order and runs each exactly once per cycle. A
//! handler may call `wait_for` to force other handlers to complete before it
//! proceeds, which turns declared dependencies into a depth-first topological
//! execution order. A wait that reaches back into a handler still on the
//! call path is a circular dependency and is fatal.
//!
//! Invariant violations do not produce recoverable errors: they are logged
//! and the process panics with the diagnostic (see `contracts::DispatchError`).

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

use tracing::{debug, error, instrument};

use contracts::{DispatchError, DispatcherId, Token, TokenStream};

use crate::cycle::CycleState;
use crate::metrics::{DispatchMetrics, MetricsSnapshot};

type Callback<P> = Rc<RefCell<dyn FnMut(&P)>>;

/// Log the violated invariant, then halt.
fn fatal(error: DispatchError) -> ! {
    error!(%error, "Dispatch invariant violated");
    panic!("{error}");
}

/// Synchronous event-fan-out dispatcher, generic over the payload type.
///
/// All methods take `&self`; interior mutability keeps `wait_for` callable
/// from inside handler bodies. The type is deliberately neither `Send` nor
/// `Sync`: one logical thread of control drives one dispatcher.
///
/// # Examples
/// ```
/// use std::cell::RefCell;
/// use std::rc::Rc;
/// use dispatcher::Dispatcher;
///
/// let dispatcher = Dispatcher::new();
/// let seen = Rc::new(RefCell::new(Vec::new()));
///
/// let sink = Rc::clone(&seen);
/// dispatcher.register(move |payload: &u32| sink.borrow_mut().push(*payload));
///
/// dispatcher.dispatch(7);
/// assert_eq!(*seen.borrow(), vec![7]);
/// ```
pub struct Dispatcher<P: 'static> {
    id: DispatcherId,
    tokens: RefCell<TokenStream>,
    /// Keys all share `id`, so BTreeMap order equals registration order.
    callbacks: RefCell<BTreeMap<Token, Callback<P>>>,
    cycle: RefCell<CycleState>,
    /// Lives outside `cycle` so nested invocations can share it immutably
    /// while the flag state is borrowed mutably.
    payload: RefCell<Option<P>>,
    metrics: DispatchMetrics,
}

impl<P: 'static> Default for Dispatcher<P> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P: 'static> Dispatcher<P> {
    /// Create an empty dispatcher with a fresh instance identity.
    pub fn new() -> Self {
        let id = DispatcherId::next();
        Self {
            id,
            tokens: RefCell::new(TokenStream::new(id)),
            callbacks: RefCell::new(BTreeMap::new()),
            cycle: RefCell::new(CycleState::new()),
            payload: RefCell::new(None),
            metrics: DispatchMetrics::new(),
        }
    }

    /// This dispatcher's instance identity.
    pub fn id(&self) -> DispatcherId {
        self.id
    }

    /// Number of currently registered handlers.
    pub fn handler_count(&self) -> usize {
        self.callbacks.borrow().len()
    }

    /// Get current metrics
    pub fn metrics(&self) -> MetricsSnapshot {
        self.metrics.snapshot()
    }

    /// Register a handler, returning its token.
    ///
    /// May be called before, between, or during dispatch cycles. A handler
    /// registered during an active cycle is first visited by the *next*
    /// cycle's walk, though `wait_for` can already reach it.
    pub fn register<F>(&self, callback: F) -> Token
    where
        F: FnMut(&P) + 'static,
    {
        let token = match self.tokens.borrow_mut().next() {
            Ok(token) => token,
            Err(e) => fatal(e),
        };
        self.callbacks
            .borrow_mut()
            .insert(token, Rc::new(RefCell::new(callback)));

        debug!(
            token = %token,
            handlers = self.handler_count(),
            "Handler registered"
        );
        token
    }

    /// Remove a handler.
    ///
    /// After return the token maps to nothing and the handler is never
    /// invoked again, even within a cycle in progress that has not yet
    /// reached it. Unknown (or already removed) tokens are fatal.
    pub fn unregister(&self, token: Token) {
        debug_assert_eq!(
            token.dispatcher(),
            self.id,
            "token {token} is owned by a different dispatcher"
        );

        if self.callbacks.borrow_mut().remove(&token).is_none() {
            fatal(DispatchError::UnknownToken { token });
        }
        debug!(token = %token, handlers = self.handler_count(), "Handler unregistered");
    }

    /// Broadcast `payload` to every registered handler.
    ///
    /// Handlers run exactly once each, in registration order except where
    /// `wait_for` forces earlier completion. Re-entrant dispatch is fatal.
    #[instrument(name = "dispatch", skip(self, payload), fields(dispatcher = %self.id))]
    pub fn dispatch(&self, payload: P) {
        if self.cycle.borrow().is_in_progress() {
            fatal(DispatchError::ReentrantDispatch);
        }

        self.start_dispatching(payload);

        // Snapshot the walk order up front: handlers registered while the
        // cycle runs are deferred to the next dispatch, and handlers
        // unregistered mid-cycle are skipped at invocation time.
        let order: Vec<Token> = self.callbacks.borrow().keys().copied().collect();
        debug!(handlers = order.len(), "Dispatch cycle started");

        for token in order {
            if self.cycle.borrow().is_pending(token) {
                continue;
            }
            self.invoke(token);
        }

        self.stop_dispatching();
        self.metrics.inc_cycle_count();
        debug!("Dispatch cycle complete");
    }

    /// Block until the handlers behind `tokens` have completed this cycle.
    ///
    /// "Block" is an ordinary nested call: targets that have not started yet
    /// run to completion before this returns; targets that already finished
    /// are skipped. A target still mid-execution is, transitively, waiting
    /// on the caller; that circular dependency is fatal. Calling this with
    /// no cycle in progress is fatal.
    #[instrument(name = "wait_for", skip(self), fields(dispatcher = %self.id, waiting = tokens.len()))]
    pub fn wait_for(&self, tokens: &[Token]) {
        if !self.cycle.borrow().is_in_progress() {
            fatal(DispatchError::WaitOutsideDispatch);
        }

        for &token in tokens {
            debug_assert_eq!(
                token.dispatcher(),
                self.id,
                "token {token} is owned by a different dispatcher"
            );

            let (pending, handled) = {
                let cycle = self.cycle.borrow();
                (cycle.is_pending(token), cycle.is_handled(token))
            };
            if pending {
                if !handled {
                    fatal(DispatchError::CircularDependency { token });
                }
                // Already ran earlier in this cycle.
                continue;
            }

            debug!(token = %token, "Forcing early handler execution");
            self.metrics.inc_forced_count();
            self.invoke(token);
        }
    }

    /// Run a single handler: mark pending, call with the cycle payload,
    /// mark handled. Tokens without a live callback (unregistered
    /// mid-cycle, or never registered here) are skipped.
    fn invoke(&self, token: Token) {
        let callback = self.callbacks.borrow().get(&token).map(Rc::clone);
        let Some(callback) = callback else {
            debug!(token = %token, "No callback for token, skipping");
            return;
        };

        self.cycle.borrow_mut().mark_pending(token);
        {
            let payload = self.payload.borrow();
            if let Some(payload) = payload.as_ref() {
                (&mut *callback.borrow_mut())(payload);
            }
        }
        self.cycle.borrow_mut().mark_handled(token);
        self.metrics.inc_invocation_count();
    }

    fn start_dispatching(&self, payload: P) {
        self.cycle.borrow_mut().begin();
        *self.payload.borrow_mut() = Some(payload);
    }

    fn stop_dispatching(&self) {
        *self.payload.borrow_mut() = None;
        self.cycle.borrow_mut().finish();
    }
}

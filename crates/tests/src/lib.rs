//! # Integration Tests
//!
//! End-to-end coverage of the dispatch engine:
//! - Flux-style store wiring over JSON action payloads
//! - `wait_for` ordering guarantees across dispatch cycles
//! - Fatal-path behavior observed from outside (`catch_unwind`)

#[cfg(test)]
mod contract_tests {
    use contracts::{DispatcherId, TokenStream};

    #[test]
    fn test_tokens_never_collide_across_instances() {
        // Walk both streams in lockstep; equal indices, distinct prefixes.
        let mut s1 = TokenStream::new(DispatcherId::next());
        let mut s2 = TokenStream::new(DispatcherId::next());

        for _ in 0..100 {
            assert_ne!(s1.next().unwrap(), s2.next().unwrap());
        }
    }
}

#[cfg(test)]
mod e2e_tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use dispatcher::Dispatcher;
    use serde_json::{json, Value};

    /// Flux-style wiring: a cart store that must observe inventory updates
    /// before validating, regardless of registration order.
    ///
    /// Walk order reaches the cart store first; its `wait_for` pulls the
    /// stock store forward, so the cart always sees up-to-date inventory.
    #[test]
    fn test_dependent_stores_see_consistent_state() {
        let dispatcher: Rc<Dispatcher<Value>> = Rc::new(Dispatcher::new());
        let inventory = Rc::new(RefCell::new(0_i64));
        let cart_accepted = Rc::new(RefCell::new(Vec::new()));

        let stock_slot = Rc::new(RefCell::new(None));
        dispatcher.register({
            let dispatcher = Rc::clone(&dispatcher);
            let stock_slot = Rc::clone(&stock_slot);
            let inventory = Rc::clone(&inventory);
            let cart_accepted = Rc::clone(&cart_accepted);
            move |action: &Value| {
                let stock = stock_slot.borrow().unwrap();
                dispatcher.wait_for(&[stock]);
                if action["type"] == "add_to_cart" {
                    let qty = action["qty"].as_i64().unwrap_or(0);
                    cart_accepted.borrow_mut().push(qty <= *inventory.borrow());
                }
            }
        });
        *stock_slot.borrow_mut() = Some(dispatcher.register({
            let inventory = Rc::clone(&inventory);
            move |action: &Value| {
                if action["type"] == "restock" {
                    *inventory.borrow_mut() += action["qty"].as_i64().unwrap_or(0);
                }
            }
        }));

        dispatcher.dispatch(json!({"type": "restock", "sku": "widget", "qty": 3}));
        dispatcher.dispatch(json!({"type": "add_to_cart", "sku": "widget", "qty": 2}));
        dispatcher.dispatch(json!({"type": "add_to_cart", "sku": "widget", "qty": 9}));

        assert_eq!(*cart_accepted.borrow(), vec![true, false]);
    }

    #[test]
    fn test_every_handler_receives_the_exact_payload() {
        let dispatcher: Rc<Dispatcher<Value>> = Rc::new(Dispatcher::new());
        let seen = Rc::new(RefCell::new(Vec::new()));

        for _ in 0..4 {
            let seen = Rc::clone(&seen);
            dispatcher.register(move |action: &Value| seen.borrow_mut().push(action.clone()));
        }

        let action = json!({"type": "ping", "nested": {"k": [1, 2, 3]}});
        dispatcher.dispatch(action.clone());

        assert_eq!(seen.borrow().len(), 4);
        assert!(seen.borrow().iter().all(|a| *a == action));
    }

    #[test]
    fn test_chained_waits_resolve_depth_first() {
        // c waits on b, b waits on a; registration order c, b, a.
        let dispatcher: Rc<Dispatcher<Value>> = Rc::new(Dispatcher::new());
        let log = Rc::new(RefCell::new(String::new()));
        let slots = Rc::new(RefCell::new(Vec::new()));

        for (tag, depends_on) in [('c', Some(1)), ('b', Some(2)), ('a', None)] {
            let token = dispatcher.register({
                let dispatcher = Rc::clone(&dispatcher);
                let log = Rc::clone(&log);
                let slots = Rc::clone(&slots);
                move |_: &Value| {
                    if let Some(slot) = depends_on {
                        let target = slots.borrow()[slot];
                        dispatcher.wait_for(&[target]);
                    }
                    log.borrow_mut().push(tag);
                }
            });
            slots.borrow_mut().push(token);
        }

        dispatcher.dispatch(json!({}));
        assert_eq!(*log.borrow(), "abc");

        // Order is stable across cycles.
        dispatcher.dispatch(json!({}));
        assert_eq!(*log.borrow(), "abcabc");
    }

    #[test]
    fn test_cycle_aborts_before_completion_side_effects() {
        let dispatcher: Rc<Dispatcher<Value>> = Rc::new(Dispatcher::new());
        let completed = Rc::new(RefCell::new(0_u32));

        let second_slot = Rc::new(RefCell::new(None));
        let first = dispatcher.register({
            let dispatcher = Rc::clone(&dispatcher);
            let second_slot = Rc::clone(&second_slot);
            let completed = Rc::clone(&completed);
            move |_: &Value| {
                let second = second_slot.borrow().unwrap();
                dispatcher.wait_for(&[second]);
                *completed.borrow_mut() += 1;
            }
        });
        *second_slot.borrow_mut() = Some(dispatcher.register({
            let dispatcher = Rc::clone(&dispatcher);
            let completed = Rc::clone(&completed);
            move |_: &Value| {
                dispatcher.wait_for(&[first]);
                *completed.borrow_mut() += 1;
            }
        }));

        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            dispatcher.dispatch(json!({"type": "noop"}));
        }));

        assert!(result.is_err(), "mutual wait must be fatal");
        // Both handlers were interrupted mid-execution; neither completed.
        assert_eq!(*completed.borrow(), 0);
    }

    #[test]
    fn test_unregistered_store_drops_out_of_fan_out() {
        let dispatcher: Rc<Dispatcher<Value>> = Rc::new(Dispatcher::new());
        let counts = Rc::new(RefCell::new([0_u32; 2]));

        let transient = dispatcher.register({
            let counts = Rc::clone(&counts);
            move |_: &Value| counts.borrow_mut()[0] += 1
        });
        dispatcher.register({
            let counts = Rc::clone(&counts);
            move |_: &Value| counts.borrow_mut()[1] += 1
        });

        dispatcher.dispatch(json!({}));
        dispatcher.unregister(transient);
        dispatcher.dispatch(json!({}));
        dispatcher.dispatch(json!({}));

        assert_eq!(*counts.borrow(), [1, 3]);
        assert_eq!(dispatcher.handler_count(), 1);
    }

    #[test]
    fn test_metrics_track_fan_out_volume() {
        let dispatcher: Rc<Dispatcher<Value>> = Rc::new(Dispatcher::new());
        for _ in 0..3 {
            dispatcher.register(|_: &Value| {});
        }

        dispatcher.dispatch(json!({}));
        dispatcher.dispatch(json!({}));

        let snapshot = dispatcher.metrics();
        assert_eq!(snapshot.cycle_count, 2);
        assert_eq!(snapshot.invocation_count, 6);
        assert_eq!(snapshot.forced_count, 0);
    }
}

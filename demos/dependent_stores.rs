//! Flux-style store wiring demo
//!
//! Three stores subscribe to one dispatcher:
//! - `stock` applies restock actions to an inventory count
//! - `cart` validates add-to-cart actions, waiting for `stock` first so it
//!   always sees inventory updated by the current action
//! - `audit` records every action after the cart has decided
//!
//! Run with `RUST_LOG=debug` to watch the forced early executions.

use std::cell::RefCell;
use std::rc::Rc;

use anyhow::Result;
use dispatcher::Dispatcher;
use observability::{LogFormat, ObservabilityConfig};
use serde_json::{json, Value};
use tracing::info;

fn main() -> Result<()> {
    observability::init_with_config(ObservabilityConfig {
        log_format: LogFormat::Pretty,
        default_log_level: "debug".to_string(),
    })?;

    let dispatcher: Rc<Dispatcher<Value>> = Rc::new(Dispatcher::new());
    let inventory = Rc::new(RefCell::new(0_i64));

    // Cart registers first, so on every dispatch the walk reaches it before
    // the stock store; its wait_for pulls stock forward.
    let stock_slot = Rc::new(RefCell::new(None));
    let cart = dispatcher.register({
        let dispatcher = Rc::clone(&dispatcher);
        let stock_slot = Rc::clone(&stock_slot);
        let inventory = Rc::clone(&inventory);
        move |action: &Value| {
            let stock = stock_slot.borrow().unwrap();
            dispatcher.wait_for(&[stock]);
            if action["type"] == "add_to_cart" {
                let qty = action["qty"].as_i64().unwrap_or(0);
                let available = *inventory.borrow();
                if qty <= available {
                    info!(qty, available, "Cart accepted");
                } else {
                    info!(qty, available, "Cart rejected, insufficient stock");
                }
            }
        }
    });

    let stock = dispatcher.register({
        let inventory = Rc::clone(&inventory);
        move |action: &Value| {
            if action["type"] == "restock" {
                *inventory.borrow_mut() += action["qty"].as_i64().unwrap_or(0);
                info!(inventory = *inventory.borrow(), "Stock updated");
            }
        }
    });
    *stock_slot.borrow_mut() = Some(stock);

    let audit = dispatcher.register({
        let dispatcher = Rc::clone(&dispatcher);
        move |action: &Value| {
            // The audit trail must reflect the cart's decision, so it waits
            // on both upstream stores even when walk order already suffices.
            dispatcher.wait_for(&[stock, cart]);
            info!(action = %action, "Audit entry");
        }
    });

    info!(
        dispatcher = %dispatcher.id(),
        cart = %cart,
        stock = %stock,
        audit = %audit,
        "Stores registered"
    );

    dispatcher.dispatch(json!({"type": "restock", "sku": "widget", "qty": 3}));
    dispatcher.dispatch(json!({"type": "add_to_cart", "sku": "widget", "qty": 2}));
    dispatcher.dispatch(json!({"type": "add_to_cart", "sku": "widget", "qty": 9}));

    let metrics = dispatcher.metrics();
    info!(
        cycles = metrics.cycle_count,
        invocations = metrics.invocation_count,
        forced = metrics.forced_count,
        "Demo complete"
    );

    Ok(())
}

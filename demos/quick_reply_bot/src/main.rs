//! Quick Reply Bot Demo
//!
//! Receives Messenger webhook deliveries and routes quick-reply and postback
//! payloads to handlers.
//!
//! In `dynamic` mode (the default) payloads are `module:function` references:
//!
//! ```text
//! "menu:start"        → on_menu_start
//! "order.size:large"  → on_size
//! ```
//!
//! In `pattern` mode every handler whose regex matches the whole payload runs:
//!
//! ```text
//! "COLOR_RED"  → on_color, on_red
//! ```
//!
//! # Usage
//!
//! ```bash
//! COURIER_WEBHOOK__PORT=9000 cargo run --package quick-reply-bot
//! COURIER_DISPATCH__MODE=pattern cargo run --package quick-reply-bot
//! ```

use anyhow::Result;
use courier::prelude::*;
use tracing::{debug, info, warn};

// ============================================================================
// Static handlers
// ============================================================================

async fn log_message(event: Arc<Event>) {
    if let Some(message) = event.as_message() {
        if message.message.is_echo {
            return;
        }
        info!(
            sender = event.sender_id(),
            text = message.text_content(),
            quick_reply = message.is_quick_reply(),
            "Message received"
        );
    }
}

async fn log_postback(event: Arc<Event>) {
    if let Some(postback) = event.as_postback() {
        info!(
            sender = event.sender_id(),
            title = postback.postback.title.as_deref().unwrap_or(""),
            "Button tapped"
        );
    }
}

async fn mark_seen(event: Arc<Event>) {
    debug!(sender = event.sender_id(), "Marking conversation as seen");
}

async fn track_tap(event: Arc<Event>) {
    debug!(payload = ?event.payload(), "Tap handled");
}

async fn log_receipt(event: Arc<Event>) {
    info!(kind = %event.kind(), sender = event.sender_id(), "Receipt");
}

// ============================================================================
// Routed handlers
// ============================================================================

async fn on_menu_start(event: Arc<Event>) {
    info!(sender = event.sender_id(), "Starting conversation");
}

async fn on_size(event: Arc<Event>) -> Result<(), HandlerError> {
    match event.payload() {
        Some(payload) => {
            info!(sender = event.sender_id(), payload, "Size picked");
            Ok(())
        }
        None => Err(HandlerError::msg("size handler called without payload")),
    }
}

async fn on_color(event: Arc<Event>) {
    info!(payload = ?event.payload(), "Some color picked");
}

async fn on_red() {
    info!("Red, a bold choice");
}

async fn unresolved(event: Arc<Event>) {
    warn!(
        sender = event.sender_id(),
        payload = ?event.payload(),
        "No route for payload"
    );
}

fn build_dispatcher(config: &CourierConfig) -> Result<Dispatcher> {
    let mut dispatcher = config.dispatch.dispatcher();

    dispatcher
        .on(EventKind::Message, log_message)
        .on(EventKind::Postback, log_postback)
        .on(EventKind::Delivery, log_receipt)
        .on(EventKind::Read, log_receipt)
        .on_pre(EventKind::Message, mark_seen)
        .on_post(EventKind::Postback, track_tap)
        .on_unresolved(unresolved);

    match dispatcher.mode() {
        DispatchMode::Dynamic => {
            dispatcher
                .route("menu", "start", on_menu_start)?
                .route("order.size", "small", on_size)?
                .route("order.size", "large", on_size)?;
        }
        DispatchMode::Pattern => {
            dispatcher
                .on_pattern(["COLOR_.*"], PatternTargets::ALL, on_color)?
                .on_pattern(["COLOR_RED"], PatternTargets::QUICK_REPLY, on_red)?
                .on_pattern(["SIZE_(SMALL|LARGE)"], PatternTargets::BUTTON, on_size)?;
        }
    }

    Ok(dispatcher)
}

#[tokio::main]
async fn main() -> Result<()> {
    let config = ConfigLoader::new().load()?;
    let dispatcher = build_dispatcher(&config)?;

    let runtime = CourierRuntime::from_config(config, dispatcher)?;
    info!(dispatcher = ?runtime.dispatcher(), "Handlers registered");

    runtime.run().await?;
    Ok(())
}

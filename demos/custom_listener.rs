//! # Example: Custom Listener
//!
//! Shows how to implement [`Listener`] by hand and what happens when it fails.
//!
//! - `Audit` keeps every `audit` event in memory and rejects empty messages.
//! - A text writer registered under `all` prints everything, including the
//!   `fatal` events the logger emits when `Audit` fails or panics.
//!
//! ## Run
//! ```bash
//! RUST_LOG=fanlog=debug cargo run --example custom_listener
//! ```

use std::sync::Arc;

use async_trait::async_trait;
use fanlog::{
    EventRef, Flag, FlagSet, Listener, ListenerError, Logger, MessageEvent, TextWriter,
};
use parking_lot::Mutex;

#[derive(Default)]
struct Audit {
    trail: Mutex<Vec<String>>,
}

#[async_trait]
impl Listener for Audit {
    async fn on_event(&self, event: &EventRef) -> Result<(), ListenerError> {
        let Some(body) = event.as_display().map(|d| d.to_string()) else {
            return Err(ListenerError::failed("audit events must be displayable"));
        };
        if body.is_empty() {
            return Err(ListenerError::failed("empty audit message"));
        }
        if body == "explode" {
            panic!("audit store corrupted");
        }
        self.trail.lock().push(format!("{} {body}", event.timestamp().to_rfc3339()));
        Ok(())
    }

    fn name(&self) -> &'static str {
        "audit"
    }

    fn queue_capacity(&self) -> usize {
        1024
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let log = Logger::new(FlagSet::all())
        .with_writer(TextWriter::from_env().with_label("custom"))
        .await?;

    let audit = Arc::new(Audit::default());
    log.listen(Flag::AUDIT, "audit", audit.clone()).await?;

    for text in ["user alice logged in", "", "explode", "user alice logged out"] {
        log.trigger(Arc::new(MessageEvent::new(Flag::AUDIT, text)));
    }
    log.info("audit events submitted");

    log.close().await;

    println!("--- audit trail ---");
    for line in audit.trail.lock().iter() {
        println!("{line}");
    }
    Ok(())
}

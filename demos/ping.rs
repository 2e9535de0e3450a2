//! # Example: Ping Monitor
//!
//! Simulates a handful of pollers reporting HTTP status codes as `ping` events.
//!
//! Each poller triggers events from its own task; the logger fans them out to a
//! text writer on stdout (configured from `LOG_*`) and to a failure counter
//! registered only for the `ping` flag.
//!
//! ## Flow
//! ```text
//! poller(url) ─► Logger::trigger(Ping) ─┬─► writer   (all)  ─► stdout
//!                                       └─► failures (ping) ─► counter
//! ```
//!
//! ## Run
//! ```bash
//! LOG_EVENTS=all LOG_LABEL=pinger cargo run --example ping
//! ```

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use chrono::{DateTime, FixedOffset, Local};
use fanlog::{
    AnsiColor, Event, EventRef, Flag, FlagTextColorProvider, ListenerFn, Logger, TextFormatter,
    TextWritable,
};

const PING: Flag = Flag::from_static("ping");

/// One poll result.
struct Ping {
    at: DateTime<FixedOffset>,
    url: String,
    status: u16,
    elapsed: Duration,
}

impl TextWritable for Ping {
    fn write_text(&self, formatter: &dyn TextFormatter, buf: &mut String) {
        buf.push_str(&formatter.colorize_status_code(self.status));
        buf.push(' ');
        buf.push_str(&formatter.colorize_by_status_code(self.status, &self.url));
        buf.push(' ');
        buf.push_str(&formatter.colorize(&format!("{:?}", self.elapsed), AnsiColor::GRAY));
    }
}

impl FlagTextColorProvider for Ping {
    fn flag_text_color(&self) -> Option<AnsiColor> {
        Some(AnsiColor::CYAN)
    }
}

impl fmt::Display for Ping {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {:?}", self.status, self.url, self.elapsed)
    }
}

impl Event for Ping {
    fn flag(&self) -> Flag {
        PING
    }

    fn timestamp(&self) -> DateTime<FixedOffset> {
        self.at
    }

    fn as_text_writable(&self) -> Option<&dyn TextWritable> {
        Some(self)
    }

    fn as_color_provider(&self) -> Option<&dyn FlagTextColorProvider> {
        Some(self)
    }

    fn as_display(&self) -> Option<&dyn fmt::Display> {
        Some(self)
    }
}

/// Deterministic stand-in for an HTTP GET.
fn fake_status(url: &str, round: u64) -> u16 {
    match (url.len() as u64 + round) % 7 {
        0 => 500,
        1 => 404,
        _ => 200,
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let log = Logger::from_env().await?;
    log.enable(PING);

    let failures = Arc::new(AtomicUsize::new(0));
    {
        let failures = Arc::clone(&failures);
        log.listen(
            PING,
            "failures",
            ListenerFn::arc("failures", move |ev: &EventRef| {
                let failed = ev
                    .as_display()
                    .is_some_and(|d| !d.to_string().starts_with('2'));
                if failed {
                    failures.fetch_add(1, Ordering::Relaxed);
                }
                Ok(())
            }),
        )
        .await?;
    }

    let urls = ["https://example.com", "https://example.org/health", "https://example.net/api"];
    let pollers: Vec<_> = urls
        .into_iter()
        .map(|url| {
            let log = Arc::clone(&log);
            tokio::spawn(async move {
                for round in 0..5 {
                    let started = tokio::time::Instant::now();
                    tokio::time::sleep(Duration::from_millis(20 + round * 10)).await;
                    log.write(Ping {
                        at: Local::now().fixed_offset(),
                        url: url.to_string(),
                        status: fake_status(url, round),
                        elapsed: started.elapsed(),
                    });
                }
            })
        })
        .collect();

    for poller in pollers {
        poller.await?;
    }

    log.close().await;
    println!("failed polls: {}", failures.load(Ordering::Relaxed));
    Ok(())
}

//! Tracing Setup
//!
//! Structured logging via `tracing-subscriber` with an environment filter.
//!
//! # Environment Variables
//!
//! - `RUST_LOG`: Log filter (default: `info` for this crate, `warn` for
//!   the HTTP internals)

use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Default filter directives when `RUST_LOG` is unset.
const DEFAULT_DIRECTIVES: &str = "info,location_api=info,hyper=warn,h2=warn";

/// Initialize the global tracing subscriber.
///
/// Call once at startup, before anything logs.
pub fn init() {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_DIRECTIVES));

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_target(true)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .init();
}

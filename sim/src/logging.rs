//! Tracing setup for hosts, demos and benches.
//!
//! The library only emits `tracing` events. Installing a subscriber is the
//! host's decision; these helpers cover the common case.

use std::sync::Once;
use tracing_subscriber::EnvFilter;

/// Filter used by [`init_tracing_default`].
pub const DEFAULT_FILTER: &str = "info,mma_sim=info";

static TRACING_INIT: Once = Once::new();

/// Install a compact fmt subscriber (idempotent, first call wins).
///
/// `RUST_LOG` overrides `filter` when set. If another global subscriber is
/// already installed this does nothing.
pub fn init_tracing(filter: &str) {
    let filter = filter.to_string();
    TRACING_INIT.call_once(move || {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&filter));

        let subscriber = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .with_thread_ids(false)
            .compact();

        let _ = subscriber.try_init();
    });
}

pub fn init_tracing_default() {
    init_tracing(DEFAULT_FILTER);
}

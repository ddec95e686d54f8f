//! Subscriber setup for braid binaries.
//!
//! Only available with the `logging` feature. The propagation passes emit
//! `tracing` events on two levels: warnings for problems in the user's
//! graph (ambiguous namespace re-exports) and debug counters for each
//! pass. Libraries embedding braid should install their own subscriber;
//! this helper is for binaries and tests that just want those events on
//! stderr.

use std::sync::Once;

use tracing_subscriber::EnvFilter;

static INIT: Once = Once::new();

fn default_directive(verbose: bool) -> &'static str {
    if verbose {
        // Warnings plus the per-pass propagation counters.
        "warn,braid_asset_graph=debug,braid_graph=debug"
    } else {
        "warn"
    }
}

/// Install a global stderr subscriber for braid's events.
///
/// Without `verbose` only warnings surface; with it the propagation
/// passes also log their bookkeeping. A `RUST_LOG` value overrides both.
/// Only the first call in a process takes effect.
pub fn init_logging(verbose: bool) {
    INIT.call_once(|| {
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(default_directive(verbose)));

        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    });
}

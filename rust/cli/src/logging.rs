//! Diagnostic logging for the CLI.
//!
//! Engine and bot code emit `tracing` events; the CLI installs a `fmt`
//! subscriber that writes them to stderr. `RUST_LOG` selects what is shown
//! (default `warn`); `--verbose` raises the default to `debug`.

use tracing_subscriber::EnvFilter;

/// Filter used when `RUST_LOG` is unset or unparsable.
pub fn default_directive(verbose: bool) -> &'static str {
    if verbose { "debug" } else { "warn" }
}

/// Installs the global subscriber. Returns `false` when one is already set,
/// which happens when `run` is called more than once in a process.
pub fn init_logging(verbose: bool) -> bool {
    let filter = if verbose {
        EnvFilter::new(default_directive(true))
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive(false)))
    };

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber).is_ok()
}

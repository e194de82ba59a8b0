//! Tracing subscriber installation.

use tracing_subscriber::{EnvFilter, fmt};

/// Installs the global `fmt` subscriber.
///
/// `RUST_LOG` takes precedence over `default_filter`; an unparsable
/// `default_filter` falls back to `info`. Installing twice is a no-op, which
/// keeps tests and embedding binaries free to call this repeatedly.
pub fn init_tracing(default_filter: &str,)
{
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_filter,),)
        .unwrap_or_else(|_| EnvFilter::new("info",),);

    let _ = fmt().with_env_filter(filter,).with_target(false,).try_init();
}

//! Log subscriber setup shared by the binaries.

use std::time::Instant;

use tracing::subscriber::SetGlobalDefaultError;
use tracing_subscriber::fmt::format::Writer;
use tracing_subscriber::fmt::time::FormatTime;
use tracing_subscriber::{fmt, prelude::*, EnvFilter, Registry};

/// Timestamps as seconds since startup.
#[derive(Debug, Clone)]
struct Uptime(Instant);

impl FormatTime for Uptime {
    fn format_time(&self, w: &mut Writer<'_>) -> std::fmt::Result {
        write!(w, "{:.3}s", self.0.elapsed().as_millis() as f32 / 1000.0)
    }
}

/// Install a compact stdout subscriber. `RUST_LOG` overrides the default
/// `info` filter; `verbose` lowers it to `debug`.
pub fn init_logging(verbose: bool) -> Result<(), SetGlobalDefaultError> {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    let format = fmt::format()
        .compact()
        .with_timer(Uptime(Instant::now()))
        .with_line_number(true);
    let stdout_log = fmt::layer().event_format(format);

    let subscriber = Registry::default().with(filter).with(stdout_log);
    tracing::subscriber::set_global_default(subscriber)
}

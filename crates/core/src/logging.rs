//! Tracing init, grounded on `vertex-node-core::logging::init_logging`'s
//! verbosity-to-filter mapping (spec §6: `RUST_LOG`-driven `EnvFilter`,
//! default `info`, `-v`/`-vv` raise it).

use tracing_subscriber::EnvFilter;

use crate::config::LogConfig;

/// Initialize the process-wide tracing subscriber from the resolved log
/// config. Idempotent in the sense that a second call is harmless — it
/// just fails quietly, since a demo binary or test harness may have
/// already installed a subscriber.
pub fn init_logging(config: &LogConfig) {
    let filter = if config.quiet {
        EnvFilter::new("error")
    } else {
        let base_level = match config.verbosity {
            0 => "info",
            1 => "debug",
            _ => "trace",
        };
        let mut filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(base_level));
        if let Some(custom) = &config.filter {
            for directive in custom.split(',') {
                if let Ok(d) = directive.parse() {
                    filter = filter.add_directive(d);
                }
            }
        }
        filter
    };

    let subscriber = tracing_subscriber::fmt().with_env_filter(filter).without_time();
    if config.json {
        let _ = subscriber.json().try_init();
    } else {
        let _ = subscriber.try_init();
    }
}

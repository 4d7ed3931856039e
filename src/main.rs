// SPDX-License-Identifier: GPL-3.0-only
use std::panic::{self, AssertUnwindSafe};

use crate::config::Config;
use crate::envelope::Envelope;
use crate::monitor::MonitorManager;
use crate::protocols::ddc_ci::DdcCiSource;

#[macro_use]
extern crate tracing;

mod app;
mod capabilities;
mod cli;
mod config;
mod envelope;
mod error;
#[cfg(test)]
mod fake;
mod monitor;
mod names;
mod protocols;
mod vcp;

/// Diagnostics go to stderr; stdout is reserved for the result envelope.
fn setup_logs(config: &Config) {
    use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

    let fmt_layer = fmt::layer()
        .with_target(false)
        .with_ansi(false)
        .with_writer(std::io::stderr);
    let default_filter = config
        .log_filter
        .clone()
        .unwrap_or_else(|| format!("warn,{}=warn", env!("CARGO_CRATE_NAME")));
    let filter_layer =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::registry()
        .with(filter_layer)
        .with(fmt_layer)
        .init();
}

fn panic_reason(payload: &(dyn std::any::Any + Send)) -> String {
    payload
        .downcast_ref::<&str>()
        .map(|s| s.to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unknown panic".to_string())
}

fn main() {
    let (config, config_error) = match Config::load() {
        Ok(config) => (config, None),
        Err((err, config)) => (config, Some(err)),
    };
    setup_logs(&config);
    if let Some(err) = config_error {
        warn!("{err}; using default configuration");
    }

    let invocation = cli::parse(std::env::args_os());
    let name_source = names::system_names(&config);
    let manager = MonitorManager::new(DdcCiSource, name_source, config.fallback_probe_codes);

    let envelope = panic::catch_unwind(AssertUnwindSafe(|| app::handle(&manager, invocation)))
        .unwrap_or_else(|payload| {
            let reason = panic_reason(payload.as_ref());
            error!("Internal error: {reason}");
            Envelope::error(format!("internal error: {reason}"))
        });

    println!("{}", envelope.to_line());
}

// This file is part of Ferry.
//
// Ferry is free software: you can redistribute it and/or modify it under the
// terms of the GNU Lesser General Public License as published by the Free Software
// Foundation, either version 3 of the License, or (at your option) any later version.
//
// Ferry is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.
// See the GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License along with Ferry.
// If not, see https://www.gnu.org/licenses/.


use std::io;

pub use tracing::*;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_log::LogTracer;
use tracing_subscriber::{filter::filter_fn, fmt, layer::SubscriberExt, EnvFilter, Layer};

use super::LogsArgs;

const DEFAULT_FILTER: &str = "info";

/// HTTP plumbing under the node and relay clients, too chatty at `info`
const QUIET_TARGETS: &[&str] = &["h2", "hyper", "reqwest", "rustls", "alloy_transport_http"];

/// Install the global subscriber for a run.
///
/// The returned guard flushes buffered lines when dropped, keep it alive until exit.
pub fn configure_logging(config: &LogsArgs) -> anyhow::Result<WorkerGuard> {
    let (writer, guard) = match &config.file {
        Some(log_file) => {
            tracing_appender::non_blocking(tracing_appender::rolling::never(".", log_file))
        }
        None => tracing_appender::non_blocking(io::stdout()),
    };

    let output = fmt::layer().with_writer(writer).with_target(false);
    let output = if config.json {
        output.json().boxed()
    } else {
        output.boxed()
    };

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
    subscriber::set_global_default(
        tracing_subscriber::registry()
            .with(filter)
            .with(output.with_filter(filter_fn(|metadata| !is_quiet(metadata.target())))),
    )?;

    // Route `log` records from dependencies into the subscriber
    LogTracer::init()?;

    Ok(guard)
}

fn is_quiet(target: &str) -> bool {
    QUIET_TARGETS.iter().any(|quiet| target.starts_with(quiet))
}

// SPDX-License-Identifier: GPL-3.0-only

use storage_sys::ExpandConfig;
use tracing_subscriber::EnvFilter;

const DEFAULT_DIRECTIVE: &str = "warn";

/// Directive used when `RUST_LOG` is unset
pub(crate) fn default_directive(config: &ExpandConfig) -> String {
    config
        .log_level
        .clone()
        .filter(|level| !level.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_DIRECTIVE.to_string())
}

/// Log to stderr so stdout carries only the command result
pub(crate) fn init(config: &ExpandConfig) {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_directive(config)))
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_DIRECTIVE));

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(env_filter)
        .init();
}

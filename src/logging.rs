//! `tracing` subscriber setup.
//!
//! `MUSTER_LOG` wins over the `[log] level` config value. The CLI logs to
//! stderr; the TUI owns the terminal, so it logs to a file or not at all.

use std::fs::{self, OpenOptions};
use std::path::Path;
use std::sync::Mutex;

use tracing_subscriber::EnvFilter;

pub const LOG_ENV: &str = "MUSTER_LOG";

/// Build the filter. A bare level such as `debug` applies to this crate
/// only; anything with `=` or `,` is used as a full directive list.
pub fn env_filter(config_level: Option<&str>, fallback: &str) -> EnvFilter {
    if let Ok(spec) = std::env::var(LOG_ENV)
        && let Ok(filter) = EnvFilter::try_new(&spec)
    {
        return filter;
    }
    config_level
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .and_then(|l| EnvFilter::try_new(directive_for(l)).ok())
        .unwrap_or_else(|| EnvFilter::new(fallback))
}

fn directive_for(level: &str) -> String {
    if level.contains('=') || level.contains(',') {
        level.to_string()
    } else {
        format!("muster={}", level)
    }
}

/// Log to stderr. Quiet by default so command output stays readable.
pub fn init_cli(config_level: Option<&str>) {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter(config_level, "muster=warn"))
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

/// Log to `path` (appending). Used by the TUI.
pub fn init_file(path: &Path, config_level: Option<&str>) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let file = OpenOptions::new().create(true).append(true).open(path)?;
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter(config_level, "muster=info"))
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .try_init();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bare_level_is_scoped_to_crate() {
        assert_eq!(directive_for("debug"), "muster=debug");
        assert_eq!(directive_for("muster=trace,notify=warn"), "muster=trace,notify=warn");
    }
}

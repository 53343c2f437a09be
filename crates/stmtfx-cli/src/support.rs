use stmtfx_kernel::{Diagnostics, FxError};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::prelude::*;

const LOG_ENV: &str = "STMTFX_LOG";
const LOG_TARGETS: [&str; 3] = ["stmtfx", "stmtfx_decl", "stmtfx_kernel"];
const DEFAULT_LEVEL: &str = "warn";

/// Install the stderr subscriber.
///
/// `STMTFX_LOG` takes a plain level ("debug", "info", ...) applied to the
/// stmtfx crates, or a full filter directive such as `stmtfx_kernel=trace`.
pub fn init_tracing() {
    let filter = log_filter(std::env::var(LOG_ENV).ok().as_deref());
    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_filter(EnvFilter::new(filter));

    if tracing_subscriber::registry()
        .with(fmt_layer)
        .try_init()
        .is_err()
    {
        eprintln!("Warning: tracing subscriber already initialized");
    }
}

fn log_filter(env: Option<&str>) -> String {
    match env {
        Some(level) if is_plain_level(level) => per_target(level),
        Some(spec) if !spec.trim().is_empty() => spec.to_string(),
        _ => per_target(DEFAULT_LEVEL),
    }
}

fn per_target(level: &str) -> String {
    LOG_TARGETS
        .iter()
        .map(|target| format!("{target}={level}"))
        .collect::<Vec<_>>()
        .join(",")
}

fn is_plain_level(value: &str) -> bool {
    matches!(
        value.to_ascii_lowercase().as_str(),
        "trace" | "debug" | "info" | "warn" | "error" | "off"
    )
}

pub fn flush_notices(diagnostics: &Diagnostics) {
    for notice in diagnostics.notices() {
        eprintln!("[*] Notice: {notice}");
    }
}

pub fn exit_with_error(err: &FxError) -> ! {
    eprintln!("[!] {err}");
    std::process::exit(err.exit_code());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_levels_apply_to_every_stmtfx_crate() {
        assert_eq!(
            log_filter(Some("debug")),
            "stmtfx=debug,stmtfx_decl=debug,stmtfx_kernel=debug"
        );
        assert_eq!(
            log_filter(None),
            "stmtfx=warn,stmtfx_decl=warn,stmtfx_kernel=warn"
        );
    }

    #[test]
    fn directives_pass_through() {
        assert_eq!(log_filter(Some("stmtfx_kernel=trace")), "stmtfx_kernel=trace");
        assert_eq!(log_filter(Some("  ")), log_filter(None));
    }
}

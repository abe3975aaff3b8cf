// 📝 Logging - tracing subscriber setup for the binary
//
// RUST_LOG wins when set; otherwise this crate logs at the configured level
// and everything else at warn.

use tracing_subscriber::fmt::time::SystemTime;
use tracing_subscriber::{fmt, prelude::*, EnvFilter, Registry};

/// Install the global subscriber. Returns false if one was already set
/// (tests and embedding callers may have installed their own).
pub fn init_logging(level: &str, json_output: bool) -> bool {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directives(level)));

    if json_output {
        let fmt_layer = fmt::layer()
            .json()
            .with_timer(SystemTime)
            .with_target(true)
            .with_file(true)
            .with_line_number(true);

        Registry::default().with(env_filter).with(fmt_layer).try_init().is_ok()
    } else {
        let fmt_layer = fmt::layer()
            .with_timer(SystemTime)
            .with_target(true)
            .with_file(false)
            .with_line_number(false);

        Registry::default().with(env_filter).with(fmt_layer).try_init().is_ok()
    }
}

fn default_directives(level: &str) -> String {
    let level = match level.trim().to_ascii_lowercase().as_str() {
        l @ ("trace" | "debug" | "info" | "warn" | "error" | "off") => l.to_string(),
        _ => "info".to_string(),
    };
    format!("ecommerce_analytics={},warn", level)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_directives() {
        assert_eq!(default_directives("debug"), "ecommerce_analytics=debug,warn");
        assert_eq!(default_directives(" WARN "), "ecommerce_analytics=warn,warn");
        assert_eq!(default_directives("loud"), "ecommerce_analytics=info,warn");
    }

    #[test]
    fn test_second_init_is_harmless() {
        init_logging("info", false);
        assert!(!init_logging("info", true));
    }
}

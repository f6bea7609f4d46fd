//! Portal server port resolution.

use tracing::warn;

/// Environment variable overriding the portal port.
pub const PORT_ENV_VAR: &str = "JETCLOCK_PORT";

/// Port used when neither the environment nor the config names one.
pub const DEFAULT_PORT: u16 = 80;

/// Pick the portal port: environment override, then config, then default.
///
/// An unparsable or zero override is logged and ignored.
pub fn resolve_port(env_value: Option<&str>, configured: Option<u16>) -> u16 {
    if let Some(raw) = env_value.map(str::trim).filter(|v| !v.is_empty()) {
        match raw.parse::<u16>() {
            Ok(port) if port != 0 => return port,
            _ => warn!("ignoring invalid {PORT_ENV_VAR}={raw:?}"),
        }
    }
    configured.unwrap_or(DEFAULT_PORT)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn env_override_wins() {
        assert_eq!(resolve_port(Some("8080"), Some(9000)), 8080);
    }

    #[test]
    fn config_used_without_env() {
        assert_eq!(resolve_port(None, Some(9000)), 9000);
    }

    #[test]
    fn default_when_nothing_set() {
        assert_eq!(resolve_port(None, None), DEFAULT_PORT);
        assert_eq!(resolve_port(Some(""), None), DEFAULT_PORT);
    }

    #[test]
    fn invalid_env_falls_through() {
        assert_eq!(resolve_port(Some("eighty"), Some(9000)), 9000);
        assert_eq!(resolve_port(Some("0"), None), DEFAULT_PORT);
        assert_eq!(resolve_port(Some("70000"), None), DEFAULT_PORT);
    }
}

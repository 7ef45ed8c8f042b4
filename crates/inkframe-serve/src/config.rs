//! Application configuration loaded from environment variables.

use std::time::Duration;

use anyhow::Context;
use inkframe_core::DeviceProfile;

/// Browser-like user agent; the album page serves a reduced document to
/// unknown clients.
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 \
     (KHTML, like Gecko) Chrome/124.0 Safari/537.36";

/// Application configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Server bind address (e.g., "0.0.0.0:8082").
    pub bind_addr: String,

    /// Device profile used when a request does not name one.
    pub default_device: DeviceProfile,

    /// Maximum number of album listings held in memory.
    pub cache_capacity: u64,

    /// Upper bound on a single upstream album fetch.
    pub fetch_timeout: Duration,

    /// User agent sent to the album host.
    pub user_agent: String,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Required:
    /// - None (all have defaults for local development)
    ///
    /// Optional:
    /// - `INKFRAME_BIND_ADDR`: Server bind address (default: "0.0.0.0:8082")
    /// - `INKFRAME_DEFAULT_DEVICE`: Device profile name (default: "og")
    /// - `INKFRAME_CACHE_CAPACITY`: Album cache capacity (default: 10000)
    /// - `INKFRAME_FETCH_TIMEOUT_SECS`: Upstream fetch timeout (default: 15)
    /// - `INKFRAME_USER_AGENT`: User agent for upstream requests
    pub fn from_env() -> anyhow::Result<Self> {
        let bind_addr =
            std::env::var("INKFRAME_BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:8082".to_string());

        let device_name =
            std::env::var("INKFRAME_DEFAULT_DEVICE").unwrap_or_else(|_| "og".to_string());
        let default_device = DeviceProfile::by_name(&device_name)
            .with_context(|| format!("unknown device profile '{device_name}'"))?;

        let cache_capacity = match std::env::var("INKFRAME_CACHE_CAPACITY") {
            Ok(raw) => raw
                .trim()
                .parse::<u64>()
                .with_context(|| format!("invalid INKFRAME_CACHE_CAPACITY '{raw}'"))?,
            Err(_) => inkframe_core::cache::DEFAULT_STORE_CAPACITY,
        };

        let fetch_timeout_secs = match std::env::var("INKFRAME_FETCH_TIMEOUT_SECS") {
            Ok(raw) => raw
                .trim()
                .parse::<u64>()
                .ok()
                .filter(|secs| *secs > 0)
                .with_context(|| format!("invalid INKFRAME_FETCH_TIMEOUT_SECS '{raw}'"))?,
            Err(_) => 15,
        };

        let user_agent = std::env::var("INKFRAME_USER_AGENT")
            .ok()
            .map(|ua| ua.trim().to_string())
            .filter(|ua| !ua.is_empty())
            .unwrap_or_else(|| DEFAULT_USER_AGENT.to_string());

        tracing::info!(
            bind_addr = %bind_addr,
            default_device = default_device.name,
            cache_capacity,
            fetch_timeout_secs,
            "inkframe configuration loaded"
        );

        Ok(Self {
            bind_addr,
            default_device,
            cache_capacity,
            fetch_timeout: Duration::from_secs(fetch_timeout_secs),
            user_agent,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    /// Mutex to serialize config tests that manipulate env vars.
    static ENV_MUTEX: Mutex<()> = Mutex::new(());

    const ENV_KEYS: &[&str] = &[
        "INKFRAME_BIND_ADDR",
        "INKFRAME_DEFAULT_DEVICE",
        "INKFRAME_CACHE_CAPACITY",
        "INKFRAME_FETCH_TIMEOUT_SECS",
        "INKFRAME_USER_AGENT",
    ];

    /// Run `f` with only `vars` set among the inkframe env keys.
    fn with_env_vars<F: FnOnce()>(vars: &[(&str, &str)], f: F) {
        let _guard = ENV_MUTEX.lock().unwrap();

        let saved: Vec<_> = ENV_KEYS
            .iter()
            .map(|k| (*k, std::env::var(k).ok()))
            .collect();

        // SAFETY: Serialized by mutex; only test code touches these vars.
        unsafe {
            for k in ENV_KEYS {
                std::env::remove_var(k);
            }
            for (k, v) in vars {
                std::env::set_var(k, v);
            }
        }

        f();

        // SAFETY: Restoring original env state.
        unsafe {
            for (k, v) in &saved {
                match v {
                    Some(val) => std::env::set_var(k, val),
                    None => std::env::remove_var(k),
                }
            }
        }
    }

    #[test]
    fn config_defaults() {
        with_env_vars(&[], || {
            let config = Config::from_env().unwrap();
            assert_eq!(config.bind_addr, "0.0.0.0:8082");
            assert_eq!(config.default_device.name, "og");
            assert_eq!(config.cache_capacity, 10_000);
            assert_eq!(config.fetch_timeout, Duration::from_secs(15));
            assert_eq!(config.user_agent, DEFAULT_USER_AGENT);
        });
    }

    #[test]
    fn config_custom_values() {
        with_env_vars(
            &[
                ("INKFRAME_BIND_ADDR", "127.0.0.1:9090"),
                ("INKFRAME_DEFAULT_DEVICE", "Kindle_2024"),
                ("INKFRAME_CACHE_CAPACITY", "50"),
                ("INKFRAME_FETCH_TIMEOUT_SECS", "3"),
                ("INKFRAME_USER_AGENT", "frame/1.0"),
            ],
            || {
                let config = Config::from_env().unwrap();
                assert_eq!(config.bind_addr, "127.0.0.1:9090");
                assert_eq!(config.default_device.name, "kindle_2024");
                assert_eq!(config.default_device.width, 1448);
                assert_eq!(config.cache_capacity, 50);
                assert_eq!(config.fetch_timeout, Duration::from_secs(3));
                assert_eq!(config.user_agent, "frame/1.0");
            },
        );
    }

    #[test]
    fn config_unknown_device_is_an_error() {
        with_env_vars(&[("INKFRAME_DEFAULT_DEVICE", "toaster")], || {
            let err = Config::from_env().unwrap_err();
            assert!(err.to_string().contains("toaster"));
        });
    }

    #[test]
    fn config_invalid_capacity_is_an_error() {
        with_env_vars(&[("INKFRAME_CACHE_CAPACITY", "lots")], || {
            assert!(Config::from_env().is_err());
        });
    }

    #[test]
    fn config_zero_timeout_is_an_error() {
        with_env_vars(&[("INKFRAME_FETCH_TIMEOUT_SECS", "0")], || {
            assert!(Config::from_env().is_err());
        });
    }

    #[test]
    fn config_blank_user_agent_uses_default() {
        with_env_vars(&[("INKFRAME_USER_AGENT", "  ")], || {
            let config = Config::from_env().unwrap();
            assert_eq!(config.user_agent, DEFAULT_USER_AGENT);
        });
    }
}

//! Configuration management for the Herald service.

use std::{
    net::SocketAddr,
    path::{Path, PathBuf},
    str::FromStr,
    time::Duration,
};

use anyhow::{Context, Result};
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use herald_delivery::ClientConfig;
use serde::{de::IgnoredAny, Deserialize, Deserializer, Serialize};

const CONFIG_FILE: &str = "herald.toml";

/// Complete service configuration with defaults, file, and environment
/// overrides.
///
/// Configuration is loaded in priority order:
/// 1. Environment variables (highest priority)
/// 2. Configuration file (`herald.toml`)
/// 3. Built-in defaults (lowest priority)
///
/// Without a rules file Herald routes with its built-in rule set, so the
/// service runs with nothing but webhook variables exported.
///
/// # Example
///
/// ```no_run
/// use herald_api::Config;
///
/// let config = Config::load().expect("Failed to load configuration");
///
/// println!("Server will bind to {}:{}", config.host, config.port);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    // Server
    /// Server bind address.
    ///
    /// Environment variable: `HOST`
    #[serde(default = "default_host", alias = "HOST")]
    pub host: String,
    /// Server bind port.
    ///
    /// Environment variable: `PORT`
    #[serde(default = "default_port", alias = "PORT")]
    pub port: u16,

    // Delivery
    /// HTTP request timeout for one Discord delivery in seconds.
    ///
    /// Environment variable: `DELIVERY_TIMEOUT_SECONDS`
    #[serde(default = "default_delivery_timeout", alias = "DELIVERY_TIMEOUT_SECONDS")]
    pub delivery_timeout_seconds: u64,

    // Rules
    /// Rules file (`.toml`, `.yaml`, `.yml` or `.json`). Unset means the
    /// built-in rule set.
    ///
    /// Environment variable: `RULES_FILE`
    #[serde(default, alias = "RULES_FILE", skip_serializing_if = "Option::is_none")]
    pub rules_file: Option<PathBuf>,

    // Logging
    /// Log filter used when `RUST_LOG` does not parse.
    ///
    /// Environment variable: `RUST_LOG`
    #[serde(default = "default_log_level", alias = "RUST_LOG")]
    pub rust_log: String,

    // One-shot mode
    /// Replay one event from disk and exit instead of serving. Only `true`
    /// enables it; any other value means server mode.
    ///
    /// Environment variable: `GITHUB_ACTIONS`
    #[serde(default, alias = "GITHUB_ACTIONS", deserialize_with = "deserialize_ci_flag")]
    pub github_actions: bool,
    /// Event kind to replay.
    ///
    /// Environment variable: `GITHUB_EVENT_NAME`
    #[serde(default, alias = "GITHUB_EVENT_NAME", skip_serializing_if = "Option::is_none")]
    pub github_event_name: Option<String>,
    /// Path of the JSON payload to replay.
    ///
    /// Environment variable: `GITHUB_EVENT_PATH`
    #[serde(default, alias = "GITHUB_EVENT_PATH", skip_serializing_if = "Option::is_none")]
    pub github_event_path: Option<PathBuf>,
}

impl Config {
    /// Load configuration from defaults, config file, and environment variable
    /// overrides.
    ///
    /// # Errors
    ///
    /// Fails when a source holds a value of the wrong type or the merged
    /// configuration does not validate.
    pub fn load() -> Result<Self> {
        Self::from_figment(Self::figment(Path::new(CONFIG_FILE)))
    }

    /// Provider stack with the given configuration file.
    pub fn figment(config_file: &Path) -> Figment {
        Figment::new()
            .merge(Serialized::defaults(Self::default()))
            .merge(Toml::file(config_file))
            .merge(Env::prefixed(""))
    }

    /// Extracts and validates configuration from a provider stack.
    ///
    /// # Errors
    ///
    /// Fails on extraction or validation errors.
    pub fn from_figment(figment: Figment) -> Result<Self> {
        let mut config: Self = figment.extract().context("Failed to load configuration")?;

        // An exported but empty variable reads as unset.
        config.rules_file = config.rules_file.filter(|p| !p.as_os_str().is_empty());
        config.github_event_name = config.github_event_name.filter(|n| !n.trim().is_empty());
        config.github_event_path = config.github_event_path.filter(|p| !p.as_os_str().is_empty());

        config.validate()?;
        Ok(config)
    }

    /// Whether to replay one event and exit.
    pub fn is_one_shot(&self) -> bool {
        self.github_actions
    }

    /// Convert to client configuration.
    pub fn to_client_config(&self) -> ClientConfig {
        ClientConfig { timeout: Duration::from_secs(self.delivery_timeout_seconds), ..ClientConfig::default() }
    }

    /// Parse server socket address from host and port configuration.
    ///
    /// # Errors
    ///
    /// Fails when host and port do not form a socket address.
    pub fn parse_server_addr(&self) -> Result<SocketAddr> {
        let addr_str = format!("{}:{}", self.host, self.port);
        SocketAddr::from_str(&addr_str).context("Invalid server address")
    }

    /// Validate configuration values.
    fn validate(&self) -> Result<()> {
        if self.port == 0 {
            anyhow::bail!("port must be greater than 0");
        }

        if self.delivery_timeout_seconds == 0 {
            anyhow::bail!("delivery_timeout_seconds must be greater than 0");
        }

        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            delivery_timeout_seconds: default_delivery_timeout(),
            rules_file: None,
            rust_log: default_log_level(),
            github_actions: false,
            github_event_name: None,
            github_event_path: None,
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    5000
}

fn default_delivery_timeout() -> u64 {
    herald_delivery::DEFAULT_TIMEOUT_SECONDS
}

fn default_log_level() -> String {
    "info,herald=debug,tower_http=debug".to_string()
}

/// Reads `GITHUB_ACTIONS` without ever failing the load.
fn deserialize_ci_flag<'de, D>(deserializer: D) -> std::result::Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Flag {
        Bool(bool),
        Text(String),
        Other(IgnoredAny),
    }

    Ok(match Flag::deserialize(deserializer)? {
        Flag::Bool(enabled) => enabled,
        Flag::Text(text) => text.trim().eq_ignore_ascii_case("true"),
        Flag::Other(_) => false,
    })
}

#[cfg(test)]
mod tests {
    use std::{collections::HashMap, env};

    use serial_test::serial;

    use super::*;

    const VARS: [&str; 8] = [
        "HOST",
        "PORT",
        "DELIVERY_TIMEOUT_SECONDS",
        "RULES_FILE",
        "RUST_LOG",
        "GITHUB_ACTIONS",
        "GITHUB_EVENT_NAME",
        "GITHUB_EVENT_PATH",
    ];

    /// Clears every variable `Config` reads and restores them on drop.
    struct TestEnvGuard {
        originals: HashMap<&'static str, Option<String>>,
    }

    impl TestEnvGuard {
        fn new() -> Self {
            let originals = VARS.iter().map(|&key| (key, env::var(key).ok())).collect();
            for key in VARS {
                env::remove_var(key);
            }
            Self { originals }
        }

        fn set_var(&mut self, key: &str, value: &str) {
            env::set_var(key, value);
        }
    }

    impl Drop for TestEnvGuard {
        fn drop(&mut self) {
            for (key, value) in &self.originals {
                match value {
                    Some(value) => env::set_var(key, value),
                    None => env::remove_var(key),
                }
            }
        }
    }

    fn load_without_file() -> Result<Config> {
        Config::from_figment(Config::figment(Path::new("does-not-exist.toml")))
    }

    #[test]
    fn default_config_snapshot() {
        let config = Config::default();

        assert!(config.validate().is_ok());

        insta::assert_json_snapshot!(config, @r#"
        {
          "host": "0.0.0.0",
          "port": 5000,
          "delivery_timeout_seconds": 10,
          "rust_log": "info,herald=debug,tower_http=debug",
          "github_actions": false
        }
        "#);
    }

    #[test]
    #[serial]
    fn env_overrides_defaults() {
        let mut guard = TestEnvGuard::new();
        guard.set_var("PORT", "9090");
        guard.set_var("DELIVERY_TIMEOUT_SECONDS", "3");
        guard.set_var("RULES_FILE", "/etc/herald/rules.yaml");

        let config = load_without_file().expect("Config should load with env overrides");

        assert_eq!(config.port, 9090);
        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.to_client_config().timeout, Duration::from_secs(3));
        assert_eq!(config.rules_file.as_deref(), Some(Path::new("/etc/herald/rules.yaml")));
        assert!(!config.is_one_shot());
    }

    #[test]
    #[serial]
    fn github_actions_variables_enable_one_shot_mode() {
        let mut guard = TestEnvGuard::new();
        guard.set_var("GITHUB_ACTIONS", "true");
        guard.set_var("GITHUB_EVENT_NAME", "push");
        guard.set_var("GITHUB_EVENT_PATH", "/github/workflow/event.json");

        let config = load_without_file().expect("Config should load in CI");

        assert!(config.is_one_shot());
        assert_eq!(config.github_event_name.as_deref(), Some("push"));
        assert_eq!(config.github_event_path.as_deref(), Some(Path::new("/github/workflow/event.json")));
    }

    #[test]
    #[serial]
    fn ci_flag_other_than_true_means_server_mode() {
        for (value, one_shot) in [("1", false), ("0", false), ("yes", false), ("", false), ("TRUE", true)] {
            let mut guard = TestEnvGuard::new();
            guard.set_var("GITHUB_ACTIONS", value);

            let config = load_without_file().unwrap_or_else(|e| panic!("GITHUB_ACTIONS={value:?} failed: {e:#}"));

            assert_eq!(config.is_one_shot(), one_shot, "GITHUB_ACTIONS={value:?}");
        }
    }

    #[test]
    #[serial]
    fn config_file_sits_between_defaults_and_env() {
        let mut guard = TestEnvGuard::new();
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("herald.toml");
        std::fs::write(&file, "port = 7000\nhost = \"127.0.0.1\"\n").unwrap();
        guard.set_var("PORT", "7001");

        let config = Config::from_figment(Config::figment(&file)).unwrap();

        assert_eq!(config.host, "127.0.0.1");
        assert_eq!(config.port, 7001);
    }

    #[test]
    #[serial]
    fn malformed_env_value_fails_to_load() {
        let mut guard = TestEnvGuard::new();
        guard.set_var("PORT", "not-a-port");

        assert!(load_without_file().is_err());
    }

    #[test]
    fn invalid_config_validation_fails() {
        let mut config = Config::default();

        config.port = 0;
        assert!(config.validate().is_err());

        config = Config::default();
        config.delivery_timeout_seconds = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    #[serial]
    fn empty_variables_read_as_unset() {
        let mut guard = TestEnvGuard::new();
        guard.set_var("RULES_FILE", "");
        guard.set_var("GITHUB_EVENT_NAME", " ");

        let config = load_without_file().unwrap();

        assert_eq!(config.rules_file, None);
        assert_eq!(config.github_event_name, None);
    }

    #[test]
    fn socket_address_parsing() {
        let mut config = Config::default();
        config.host = "127.0.0.1".to_string();
        config.port = 9000;

        let addr = config.parse_server_addr().expect("Should parse socket address");

        assert_eq!(addr.ip().to_string(), "127.0.0.1");
        assert_eq!(addr.port(), 9000);
    }
}

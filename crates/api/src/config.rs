/// Server configuration loaded from environment variables.
///
/// All fields except the rule file have defaults suitable for local
/// development. In production, override via environment variables.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `8480`).
    pub port: u16,
    /// Path to the rule configuration file.
    pub rules_path: String,
    /// Device alias table, parsed from `from=to` pairs.
    pub device_aliases: std::collections::HashMap<String, String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                | Default       |
    /// |------------------------|---------------|
    /// | `HOST`                 | `0.0.0.0`     |
    /// | `PORT`                 | `8480`        |
    /// | `RULES_CONFIG`         | (required)    |
    /// | `DEVICE_ALIASES`       | (empty)       |
    /// | `REQUEST_TIMEOUT_SECS` | `30`          |
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());

        let port: u16 = std::env::var("PORT")
            .unwrap_or_else(|_| "8480".into())
            .parse()
            .expect("PORT must be a valid u16");

        let rules_path = std::env::var("RULES_CONFIG").expect("RULES_CONFIG must be set");

        let device_aliases = std::env::var("DEVICE_ALIASES")
            .map(|spec| domopush_core::parse_device_aliases(&spec))
            .unwrap_or_default();

        let request_timeout_secs: u64 = std::env::var("REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("REQUEST_TIMEOUT_SECS must be a valid u64");

        Self {
            host,
            port,
            rules_path,
            device_aliases,
            request_timeout_secs,
        }
    }
}

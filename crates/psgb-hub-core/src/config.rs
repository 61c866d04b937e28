use serde::{Deserialize, Serialize};

/// Where `tracing` output goes.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LoggingOutput {
    /// Log to stderr only.
    Stderr,
    /// Log to a daily-rotating file only.
    File,
    /// Log to both stderr and file (default).
    #[default]
    Both,
}

impl std::str::FromStr for LoggingOutput {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "stderr" => Ok(LoggingOutput::Stderr),
            "file" => Ok(LoggingOutput::File),
            "both" => Ok(LoggingOutput::Both),
            _ => Err(format!("unknown logging output: {s}. valid options: stderr, file, both")),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct LoggingSettings {
    #[serde(default)]
    pub output: LoggingOutput,
    /// Level for console output (used when `output` is `stderr` or `both`).
    pub console_level: Option<String>,
    /// Level for file output (used when `output` is `file` or `both`).
    pub file_level: Option<String>,
}

/// Top-level hub configuration. Every field has a compile-time default, so
/// the process starts with zero configuration present; an optional
/// `config.toml` plus environment variables (see
/// [`HubSettings::from_env`]) can override any of them.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HubSettings {
    pub listen_host: String,
    pub listen_port: u16,
    /// This hub's own externally-reachable URL, sent as the `rel=hub` Link
    /// on every distributed notification.
    pub hub_url: String,
    pub max_parallel_outgoing_conns: usize,
    pub challenge_size: usize,
    pub default_lease_seconds: u64,
    pub items_in_memory: usize,
    pub max_delivery_attempts: u32,
    pub request_timeout_secs: u64,
    #[serde(default)]
    pub logging: LoggingSettings,
}

impl Default for HubSettings {
    fn default() -> Self {
        HubSettings {
            listen_host: "127.0.0.1".to_string(),
            listen_port: 8080,
            hub_url: "http://localhost:8080".to_string(),
            max_parallel_outgoing_conns: 20,
            challenge_size: 20,
            default_lease_seconds: 600,
            items_in_memory: 10,
            max_delivery_attempts: 5,
            request_timeout_secs: 30,
            logging: LoggingSettings::default(),
        }
    }
}

impl HubSettings {
    /// Loads settings from an optional TOML file layered over the
    /// compile-time defaults, then applies `PSGB_*` environment overrides.
    /// A missing file is not an error; a malformed one is, since it most
    /// likely means the operator intended to configure something and
    /// made a typo doing it.
    pub fn load(config_path: Option<&std::path::Path>) -> crate::error::Result<Self> {
        let default_settings = Self::default();

        let mut builder = config::Config::builder().add_source(
            config::Config::try_from(&default_settings)
                .map_err(|e| crate::error::HubError::Config(e.to_string()))?,
        );

        if let Some(path) = config_path {
            if path.exists() {
                builder = builder.add_source(config::File::from(path));
            }
        }

        builder = builder.add_source(config::Environment::with_prefix("PSGB").separator("__"));

        let config = builder
            .build()
            .map_err(|e| crate::error::HubError::Config(e.to_string()))?;

        config
            .try_deserialize()
            .map_err(|e| crate::error::HubError::Config(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_reference_constants() {
        let settings = HubSettings::default();
        assert_eq!(settings.max_parallel_outgoing_conns, 20);
        assert_eq!(settings.challenge_size, 20);
        assert_eq!(settings.default_lease_seconds, 600);
        assert_eq!(settings.items_in_memory, 10);
        assert_eq!(settings.max_delivery_attempts, 5);
        assert_eq!(settings.hub_url, "http://localhost:8080");
    }

    #[test]
    fn load_with_no_file_falls_back_to_defaults() {
        let settings = HubSettings::load(None).unwrap();
        assert_eq!(settings, HubSettings::default());
    }
}

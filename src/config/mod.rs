use serde::Deserialize;
use std::fmt;

/// Feed engine configuration
#[derive(Debug, Clone, Deserialize)]
pub struct FeedConfig {
    /// Seconds between polls (must be greater than zero)
    #[serde(default = "default_poll_interval")]
    pub poll_interval_secs: u64,

    /// Spread each cycle's change records across the window until the
    /// next poll instead of delivering them all at once
    #[serde(default)]
    pub paced_delivery: bool,

    /// Gauges the diff compares; change magnitudes sum over these
    #[serde(default = "default_primary_gauges")]
    pub primary_gauges: Vec<String>,

    /// Extra gauges counted into capacity telemetry, never diffed
    #[serde(default)]
    pub capacity_gauges: Vec<String>,
}

fn default_poll_interval() -> u64 {
    240
}

fn default_primary_gauges() -> Vec<String> {
    vec!["available".to_string()]
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            poll_interval_secs: default_poll_interval(),
            paced_delivery: false,
            primary_gauges: default_primary_gauges(),
            capacity_gauges: Vec::new(),
        }
    }
}

impl FeedConfig {
    /// Reject configurations the engine cannot run with
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.poll_interval_secs == 0 {
            return Err(ConfigError::InvalidPollInterval);
        }
        if self.primary_gauges.is_empty() {
            return Err(ConfigError::NoPrimaryGauges);
        }
        Ok(())
    }
}

/// Configuration errors, fatal at feed construction
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    InvalidPollInterval,
    NoPrimaryGauges,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPollInterval => {
                write!(f, "poll interval must be greater than zero seconds")
            }
            ConfigError::NoPrimaryGauges => {
                write!(f, "at least one primary gauge is required")
            }
        }
    }
}

impl std::error::Error for ConfigError {}

/// Load configuration from TOML file
pub fn load_config(path: &str) -> Result<FeedConfig, Box<dyn std::error::Error>> {
    let contents = std::fs::read_to_string(path)?;
    let config: FeedConfig = toml::from_str(&contents)?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = FeedConfig::default();
        assert_eq!(config.poll_interval_secs, 240);
        assert_eq!(config.paced_delivery, false);
        assert_eq!(config.primary_gauges, vec!["available".to_string()]);
        assert!(config.capacity_gauges.is_empty());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_deserialization() {
        let toml = r#"
            poll_interval_secs = 60
            paced_delivery = true
            primary_gauges = ["bikes_available", "ebikes_available"]
            capacity_gauges = ["empty_slots"]
        "#;

        let config: FeedConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.poll_interval_secs, 60);
        assert_eq!(config.paced_delivery, true);
        assert_eq!(config.primary_gauges.len(), 2);
        assert_eq!(config.capacity_gauges, vec!["empty_slots".to_string()]);
    }

    #[test]
    fn test_partial_config() {
        // Missing keys use defaults
        let toml = r#"
            paced_delivery = true
        "#;

        let config: FeedConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.paced_delivery, true);
        assert_eq!(config.poll_interval_secs, 240); // Default
        assert_eq!(config.primary_gauges, vec!["available".to_string()]); // Default
    }

    #[test]
    fn test_zero_interval_rejected() {
        let config = FeedConfig {
            poll_interval_secs: 0,
            ..Default::default()
        };
        assert_eq!(config.validate(), Err(ConfigError::InvalidPollInterval));
    }

    #[test]
    fn test_empty_primary_gauges_rejected() {
        let config = FeedConfig {
            primary_gauges: Vec::new(),
            ..Default::default()
        };
        assert_eq!(config.validate(), Err(ConfigError::NoPrimaryGauges));
    }

    #[test]
    fn test_load_config_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "poll_interval_secs = 30").unwrap();
        writeln!(file, "primary_gauges = [\"available\"]").unwrap();

        let config = load_config(file.path().to_str().unwrap()).unwrap();
        assert_eq!(config.poll_interval_secs, 30);
        assert_eq!(config.paced_delivery, false);
    }

    #[test]
    fn test_load_config_missing_file() {
        assert!(load_config("/nonexistent/feed.toml").is_err());
    }
}

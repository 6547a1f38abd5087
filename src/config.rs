use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::Deserialize;

use crate::error::ConfigError;

// A remote junction the operator listed in the config file.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct KnownHost {
	pub name: String,
	pub address: String,
	pub port: u16,
}

// Process configuration, read from a JSON file with camelCase keys.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct JunctionConfig {
	pub host: String,
	pub port: u16,
	pub session_timeout_ms: u64,
	pub sweep_interval_ms: u64,
	pub known_hosts: Vec<KnownHost>,
}

impl Default for JunctionConfig {
	fn default() -> Self {
		JunctionConfig {
			host: "127.0.0.1".to_string(),
			port: 7700,
			session_timeout_ms: 30 * 60 * 1000, // 30 minutes
			sweep_interval_ms: 60 * 1000,       // Check every minute
			known_hosts: Vec::new(),
		}
	}
}

impl JunctionConfig {
	// Load from `path`, or fall back to defaults when no path is given.
	pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
		let config = match path {
			Some(path) => Self::from_json(&fs::read_to_string(path)?)?,
			None => Self::default(),
		};
		config.validate()?;
		Ok(config)
	}

	pub fn from_json(raw: &str) -> Result<Self, ConfigError> {
		Ok(serde_json::from_str(raw)?)
	}

	pub fn validate(&self) -> Result<(), ConfigError> {
		if self.session_timeout_ms == 0 {
			return Err(ConfigError::Invalid(
				"sessionTimeoutMs must be greater than zero".to_string(),
			));
		}
		if self.sweep_interval_ms == 0 {
			return Err(ConfigError::Invalid(
				"sweepIntervalMs must be greater than zero".to_string(),
			));
		}
		if self.port == 0 {
			return Err(ConfigError::Invalid("port must be non-zero".to_string()));
		}
		Ok(())
	}

	pub fn session_timeout(&self) -> Duration {
		Duration::from_millis(self.session_timeout_ms)
	}

	pub fn sweep_interval(&self) -> Duration {
		Duration::from_millis(self.sweep_interval_ms)
	}

	pub fn bind_address(&self) -> String {
		format!("{}:{}", self.host, self.port)
	}
}

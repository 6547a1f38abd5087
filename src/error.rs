// Errors reported by the junction registry and its cipher.
#[derive(thiserror::Error, Debug, Clone, Eq, PartialEq)]
pub enum JunctionError {
	// The session identifier has no live session.
	#[error("Not registered. Call register first.")]
	NotRegistered,

	// The alias does not resolve to a live session.
	#[error("Peer \"{0}\" not found.")]
	PeerNotFound(String),

	// AEAD verification failed while opening a message.
	#[error("Message authentication failed")]
	AuthenticationFailure,

	// Sealing a message failed.
	#[error("Encryption failed")]
	Encryption,

	// The secure random source failed.
	#[error("Random number generation failed")]
	Random,
}

impl From<ring::error::Unspecified> for JunctionError {
	fn from(_: ring::error::Unspecified) -> Self {
		Self::Random
	}
}

// Errors raised while loading process configuration.
#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
	#[error("Failed to read config file: {0}")]
	Io(#[from] std::io::Error),

	#[error("Failed to parse config file: {0}")]
	Parse(#[from] serde_json::Error),

	#[error("Invalid configuration: {0}")]
	Invalid(String),
}

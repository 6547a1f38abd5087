// Export modules
pub mod config;
pub mod error;
pub mod server;

// Re-export main types
pub use config::{JunctionConfig, KnownHost};
pub use error::{ConfigError, JunctionError};
pub use server::facade::Junction;
pub use server::models::{DecodedMessage, PeerInfo, RegisterResult};

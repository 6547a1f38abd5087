// Export server modules
pub mod aliases;
pub mod crypto;
pub mod facade;
pub mod handler;
pub mod models;
pub mod registry;
pub mod session;
pub mod transport;

// Re-export main types
pub use facade::Junction;
pub use models::{DecodedMessage, EncryptedMessage, PeerInfo, RegisterResult};
pub use registry::RegistryState;
pub use session::Session;

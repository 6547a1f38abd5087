use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;

use crate::server::crypto::Sealed;

// Message waiting in a recipient's inbox, sealed under the recipient's key
pub struct EncryptedMessage {
	pub from_alias: String, // Sender's alias when it was sent
	pub sealed: Sealed,
	pub timestamp: DateTime<Utc>,
}

// Returned by register
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterResult {
	pub alias: String,
	pub session_id: String,
	pub peer_count: usize, // Live sessions other than the caller
}

// One entry of a peer listing
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PeerInfo {
	pub alias: String,
	pub connected_at: String, // ISO-8601
}

// One decrypted inbox entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DecodedMessage {
	pub from: String,
	pub message: String,
	pub timestamp: String, // ISO-8601
}

// Render a timestamp the way every reply carries it, e.g.
// `2024-05-01T12:00:00.000Z`.
pub fn iso8601(at: &DateTime<Utc>) -> String {
	at.to_rfc3339_opts(SecondsFormat::Millis, true)
}

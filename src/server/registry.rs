use std::collections::HashMap;
use std::time::{Duration, Instant};

use chrono::Utc;
use log::{debug, error, info};
use rand::thread_rng;

use crate::error::JunctionError;
use crate::server::aliases::generate_alias_with;
use crate::server::crypto::Encryptor;
use crate::server::models::{iso8601, DecodedMessage, EncryptedMessage, PeerInfo, RegisterResult};
use crate::server::session::Session;

// Every live session plus the alias index over them.
// Methods take `&mut self`; callers serialize access (see
// Junction).
pub struct RegistryState {
	sessions: HashMap<String, Session>,
	session_by_alias: HashMap<String, String>,
	encryptor: Encryptor,
	pub session_timeout: Duration,
}

impl RegistryState {
	pub fn new(session_timeout: Duration) -> Self {
		RegistryState {
			sessions: HashMap::new(),
			session_by_alias: HashMap::new(),
			encryptor: Encryptor::new(),
			session_timeout,
		}
	}

	pub fn register(&mut self, session_id: &str) -> Result<RegisterResult, JunctionError> {
		let peer_count = self.sessions.len();

		if let Some(existing) = self.sessions.get_mut(session_id) {
			existing.update_activity();
			return Ok(RegisterResult {
				alias: existing.alias.clone(),
				session_id: session_id.to_string(),
				peer_count: peer_count - 1,
			});
		}

		let alias = generate_alias_with(&mut thread_rng(), |candidate| {
			self.session_by_alias.contains_key(candidate)
		});
		let encryption_key = self.encryptor.generate_key()?;

		let session = Session::new(session_id.to_string(), alias.clone(), encryption_key);
		self.sessions.insert(session_id.to_string(), session);
		self.session_by_alias
			.insert(alias.clone(), session_id.to_string());

		info!("Peer registered: {} ({} other peers)", alias, peer_count);

		Ok(RegisterResult {
			alias,
			session_id: session_id.to_string(),
			peer_count,
		})
	}

	pub fn list_peers(&mut self, session_id: &str) -> Result<Vec<PeerInfo>, JunctionError> {
		self.touch(session_id)?;

		Ok(self
			.sessions
			.iter()
			.filter(|(id, _)| id.as_str() != session_id)
			.map(|(_, peer)| PeerInfo {
				alias: peer.alias.clone(),
				connected_at: iso8601(&peer.connected_at),
			})
			.collect())
	}

	// Seal `message` under the target's key and append it to the target's
	// inbox. Nothing else is touched.
	pub fn send_message(
		&mut self,
		sender_id: &str,
		target_alias: &str,
		message: &str,
	) -> Result<(), JunctionError> {
		let from_alias = self.touch(sender_id)?.alias.clone();

		let target = self
			.session_by_alias
			.get(target_alias)
			.and_then(|target_id| self.sessions.get_mut(target_id))
			.ok_or_else(|| JunctionError::PeerNotFound(target_alias.to_string()))?;

		let sealed = self.encryptor.encrypt(message, &target.encryption_key)?;
		target.inbox.push_back(EncryptedMessage {
			from_alias,
			sealed,
			timestamp: Utc::now(),
		});

		debug!(
			"Queued message for {} ({} pending)",
			target_alias,
			target.inbox.len()
		);
		Ok(())
	}

	// Decrypt and drain the caller's inbox, oldest first.
	// If any entry fails authentication the call errors and the inbox is
	// left as it was.
	pub fn read_messages(&mut self, session_id: &str) -> Result<Vec<DecodedMessage>, JunctionError> {
		let encryptor = &self.encryptor;
		let session = self
			.sessions
			.get_mut(session_id)
			.ok_or(JunctionError::NotRegistered)?;
		session.update_activity();

		let mut messages = Vec::with_capacity(session.inbox.len());
		for entry in &session.inbox {
			let message = encryptor
				.open(&entry.sealed, &session.encryption_key)
				.map_err(|e| {
					error!("Inbox of {} failed to decrypt: {}", session.alias, e);
					e
				})?;
			messages.push(DecodedMessage {
				from: entry.from_alias.clone(),
				message,
				timestamp: iso8601(&entry.timestamp),
			});
		}

		session.inbox.clear();
		Ok(messages)
	}

	// Zero the session's key and drop it from both indexes. Unknown ids are
	// ignored. Returns the removed session with its key already wiped.
	pub fn disconnect(&mut self, session_id: &str) -> Option<Session> {
		let mut session = self.sessions.remove(session_id)?;
		session.wipe_key();
		self.session_by_alias.remove(&session.alias);

		info!(
			"Peer disconnected: {} ({} messages discarded)",
			session.alias,
			session.inbox.len()
		);
		Some(session)
	}

	pub fn active_peer_count(&self) -> usize {
		self.sessions.len()
	}

	#[cfg(test)]
	fn session_for_alias(&self, alias: &str) -> Option<&str> {
		self.session_by_alias.get(alias).map(String::as_str)
	}

	#[cfg(test)]
	fn alias_of(&self, session_id: &str) -> Option<&str> {
		self.sessions.get(session_id).map(|s| s.alias.as_str())
	}

	// Disconnect every session idle longer than the timeout as of `now`.
	// Returns how many were removed.
	pub fn sweep_expired(&mut self, now: Instant) -> usize {
		let timeout = self.session_timeout;
		let expired: Vec<String> = self
			.sessions
			.values()
			.filter(|session| session.is_expired(now, timeout))
			.map(|session| session.id.clone())
			.collect();

		for session_id in &expired {
			if let Some(session) = self.disconnect(session_id) {
				debug!(
					"Expired {} after {:?} idle",
					session.alias,
					session.idle_time()
				);
			}
		}
		expired.len()
	}

	// Zero every key and empty both indexes.
	pub fn clear(&mut self) {
		for session in self.sessions.values_mut() {
			session.wipe_key();
		}
		self.sessions.clear();
		self.session_by_alias.clear();
	}

	fn touch(&mut self, session_id: &str) -> Result<&mut Session, JunctionError> {
		let session = self
			.sessions
			.get_mut(session_id)
			.ok_or(JunctionError::NotRegistered)?;
		session.update_activity();
		Ok(session)
	}
}

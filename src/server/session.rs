use std::collections::VecDeque;
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};

use crate::server::crypto::{zero_key, SessionKey};
use crate::server::models::EncryptedMessage;

// Session information for one connected peer
pub struct Session {
	pub id: String,
	pub alias: String,
	pub connected_at: DateTime<Utc>,
	pub last_activity: Instant,
	pub encryption_key: SessionKey, // AES-256 key, never shared
	pub inbox: VecDeque<EncryptedMessage>,
}

impl Session {
	pub fn new(id: String, alias: String, encryption_key: SessionKey) -> Self {
		Session {
			id,
			alias,
			connected_at: Utc::now(),
			last_activity: Instant::now(),
			encryption_key,
			inbox: VecDeque::new(),
		}
	}

	pub fn update_activity(&mut self) {
		self.last_activity = Instant::now();
	}

	pub fn is_expired(&self, now: Instant, timeout_duration: Duration) -> bool {
		now.saturating_duration_since(self.last_activity) > timeout_duration
	}

	pub fn idle_time(&self) -> Duration {
		Instant::now().duration_since(self.last_activity)
	}

	pub fn wipe_key(&mut self) {
		zero_key(&mut self.encryption_key);
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::server::crypto::KEY_LEN;

	fn session() -> Session {
		Session::new(
			"conn-1".to_string(),
			"azure-falcon".to_string(),
			SessionKey::from_bytes([7; KEY_LEN]),
		)
	}

	#[test]
	fn fresh_session_is_not_expired() {
		let s = session();
		assert!(!s.is_expired(Instant::now(), Duration::from_secs(60)));
		assert!(s.inbox.is_empty());
	}

	#[test]
	fn idle_past_timeout_is_expired() {
		let s = session();
		let later = s.last_activity + Duration::from_secs(61);
		assert!(s.is_expired(later, Duration::from_secs(60)));
		assert!(!s.is_expired(later, Duration::from_secs(61)));
	}

	#[test]
	fn activity_moves_forward() {
		let mut s = session();
		let before = s.last_activity;
		std::thread::sleep(Duration::from_millis(2));
		s.update_activity();
		assert!(s.last_activity > before);
	}

	#[test]
	fn wipe_key_zeroes_material() {
		let mut s = session();
		s.wipe_key();
		assert!(s.encryption_key.is_zeroed());
	}
}

use log::debug;
use serde::Serialize;
use serde_json::{json, Value};

use crate::server::facade::Junction;

// One reply line for the transport, plus whether to close afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct Reply {
	pub body: Value,
	pub close: bool,
}

impl Reply {
	fn ok<T: Serialize>(value: &T) -> Self {
		match serde_json::to_value(value) {
			Ok(body) => Reply { body, close: false },
			Err(e) => Reply::error(&format!("Failed to encode reply: {}", e)),
		}
	}

	pub fn error(message: &str) -> Self {
		Reply {
			body: json!({ "error": message }),
			close: false,
		}
	}

	pub fn to_line(&self) -> String {
		format!("{}\n", self.body)
	}
}

// Maps command lines from one connection onto junction calls.
pub struct MessageHandler {
	session_id: String,
	junction: Junction,
}

impl MessageHandler {
	pub fn new(session_id: String, junction: Junction) -> Self {
		MessageHandler {
			session_id,
			junction,
		}
	}

	pub fn session_id(&self) -> &str {
		&self.session_id
	}

	pub fn handle_message(&mut self, command: &str) -> Reply {
		let parts: Vec<&str> = command.trim().splitn(3, ' ').collect();
		let verb = parts[0].to_uppercase();
		debug!("{} -> {}", self.session_id, verb);

		match verb.as_str() {
			"REGISTER" => self.handle_register(),
			"PEERS" => self.handle_peers(),
			"SEND" => self.handle_send(&parts),
			"READ" => self.handle_read(),
			"COUNT" => Reply::ok(&json!({ "activePeers": self.junction.active_peer_count() })),
			"QUIT" => self.handle_quit(),
			"" => Reply::error("Empty command"),
			_ => Reply::error(&format!("Unknown command: {}", parts[0])),
		}
	}

	fn handle_register(&mut self) -> Reply {
		match self.junction.register(&self.session_id) {
			Ok(result) => Reply::ok(&result),
			Err(e) => Reply::error(&e.to_string()),
		}
	}

	fn handle_peers(&mut self) -> Reply {
		match self.junction.list_peers(&self.session_id) {
			Ok(peers) => Reply::ok(&peers),
			Err(e) => Reply::error(&e.to_string()),
		}
	}

	fn handle_send(&mut self, parts: &[&str]) -> Reply {
		if parts.len() < 3 || parts[2].is_empty() {
			return Reply::error("Usage: SEND <alias> <message>");
		}

		match self
			.junction
			.send_message(&self.session_id, parts[1], parts[2])
		{
			Ok(()) => Reply::ok(&json!({ "ok": true })),
			Err(e) => Reply::error(&e.to_string()),
		}
	}

	fn handle_read(&mut self) -> Reply {
		match self.junction.read_messages(&self.session_id) {
			Ok(messages) => Reply::ok(&messages),
			Err(e) => Reply::error(&e.to_string()),
		}
	}

	fn handle_quit(&mut self) -> Reply {
		self.junction.disconnect(&self.session_id);
		Reply {
			body: json!({ "ok": true }),
			close: true,
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::config::JunctionConfig;

	fn handlers() -> (Junction, MessageHandler, MessageHandler) {
		let junction = Junction::new(&JunctionConfig::default()).unwrap();
		let a = MessageHandler::new("conn-1".to_string(), junction.clone());
		let b = MessageHandler::new("conn-2".to_string(), junction.clone());
		(junction, a, b)
	}

	#[test]
	fn register_reply_carries_alias_and_count() {
		let (junction, mut a, mut b) = handlers();
		let first = a.handle_message("REGISTER");
		let second = b.handle_message("register");

		assert_eq!(first.body["sessionId"], "conn-1");
		assert_eq!(first.body["peerCount"], 0);
		assert_eq!(second.body["peerCount"], 1);
		assert!(!first.close);
		junction.shutdown();
	}

	#[test]
	fn send_and_read_through_commands() {
		let (junction, mut a, mut b) = handlers();
		let alias_a = a.handle_message("REGISTER").body["alias"].clone();
		let alias_b = b.handle_message("REGISTER").body["alias"].clone();
		let alias_b = alias_b.as_str().unwrap();

		let sent = a.handle_message(&format!("SEND {} hello there", alias_b));
		assert_eq!(sent.body["ok"], true);

		let read = b.handle_message("READ");
		assert_eq!(read.body[0]["from"], alias_a);
		assert_eq!(read.body[0]["message"], "hello there");
		assert_eq!(b.handle_message("READ").body, json!([]));
		junction.shutdown();
	}

	#[test]
	fn errors_become_error_replies() {
		let (junction, mut a, _) = handlers();

		assert_eq!(
			a.handle_message("PEERS").body["error"],
			"Not registered. Call register first."
		);
		a.handle_message("REGISTER");
		assert_eq!(
			a.handle_message("SEND nobody-here hi").body["error"],
			"Peer \"nobody-here\" not found."
		);
		assert!(a.handle_message("SEND lonely").body["error"]
			.as_str()
			.unwrap()
			.starts_with("Usage"));
		assert!(a.handle_message("FLY").body["error"]
			.as_str()
			.unwrap()
			.contains("Unknown command"));
		junction.shutdown();
	}

	#[test]
	fn quit_disconnects_and_closes() {
		let (junction, mut a, mut b) = handlers();
		a.handle_message("REGISTER");
		b.handle_message("REGISTER");

		let reply = a.handle_message("QUIT");
		assert!(reply.close);
		assert_eq!(b.handle_message("COUNT").body["activePeers"], 1);
		assert_eq!(b.handle_message("PEERS").body, json!([]));
		junction.shutdown();
	}

	#[test]
	fn reply_line_is_newline_terminated_json() {
		let reply = Reply::error("boom");
		assert_eq!(reply.to_line(), "{\"error\":\"boom\"}\n");
	}
}

use std::collections::HashSet;
use std::thread;
use std::time::Duration;

use junction::{Junction, JunctionConfig, JunctionError};

fn junction() -> Junction {
	Junction::new(&JunctionConfig::default()).unwrap()
}

#[test]
fn two_peers_exchange_one_message() {
	let junction = junction();

	let a = junction.register("conn-1").unwrap();
	let b = junction.register("conn-2").unwrap();
	assert_eq!(a.peer_count, 0);
	assert_eq!(b.peer_count, 1);

	junction.send_message("conn-1", &b.alias, "hello").unwrap();

	let inbox = junction.read_messages("conn-2").unwrap();
	assert_eq!(inbox.len(), 1);
	assert_eq!(inbox[0].from, a.alias);
	assert_eq!(inbox[0].message, "hello");
	assert!(inbox[0].timestamp.ends_with('Z'));

	assert!(junction.read_messages("conn-2").unwrap().is_empty());
	junction.shutdown();
}

#[test]
fn register_twice_keeps_alias() {
	let junction = junction();
	let first = junction.register("conn-1").unwrap();
	let second = junction.register("conn-1").unwrap();

	assert_eq!(first, second);
	assert_eq!(junction.active_peer_count(), 1);
	junction.shutdown();
}

#[test]
fn peers_list_others_only() {
	let junction = junction();
	let a = junction.register("conn-1").unwrap();
	let b = junction.register("conn-2").unwrap();

	let peers = junction.list_peers("conn-1").unwrap();
	assert_eq!(peers.len(), 1);
	assert_eq!(peers[0].alias, b.alias);
	assert!(peers.iter().all(|p| p.alias != a.alias));
	junction.shutdown();
}

#[test]
fn messages_reach_only_their_target() {
	let junction = junction();
	junction.register("conn-1").unwrap();
	let b = junction.register("conn-2").unwrap();
	junction.register("conn-3").unwrap();

	junction.send_message("conn-1", &b.alias, "just for b").unwrap();

	assert!(junction.read_messages("conn-1").unwrap().is_empty());
	assert!(junction.read_messages("conn-3").unwrap().is_empty());
	assert_eq!(junction.read_messages("conn-2").unwrap().len(), 1);
	junction.shutdown();
}

#[test]
fn disconnected_peer_is_gone_for_good() {
	let junction = junction();
	junction.register("conn-1").unwrap();
	let b = junction.register("conn-2").unwrap();
	junction.send_message("conn-1", &b.alias, "unread").unwrap();

	junction.disconnect("conn-2");
	junction.disconnect("conn-2");

	assert_eq!(
		junction.send_message("conn-1", &b.alias, "too late"),
		Err(JunctionError::PeerNotFound(b.alias.clone()))
	);
	assert_eq!(
		junction.read_messages("conn-2"),
		Err(JunctionError::NotRegistered)
	);
	assert_eq!(
		junction.list_peers("conn-2"),
		Err(JunctionError::NotRegistered)
	);
	assert_eq!(junction.active_peer_count(), 1);

	// Coming back is a fresh session with an empty inbox
	junction.register("conn-2").unwrap();
	assert!(junction.read_messages("conn-2").unwrap().is_empty());
	junction.shutdown();
}

#[test]
fn concurrent_senders_all_deliver() {
	let junction = junction();
	let target = junction.register("target").unwrap();

	let handles: Vec<_> = (0..8)
		.map(|i| {
			let junction = junction.clone();
			let alias = target.alias.clone();
			thread::spawn(move || {
				let id = format!("sender-{}", i);
				junction.register(&id).unwrap();
				for n in 0..25 {
					junction
						.send_message(&id, &alias, &format!("{}:{}", i, n))
						.unwrap();
				}
			})
		})
		.collect();
	for handle in handles {
		handle.join().unwrap();
	}

	let inbox = junction.read_messages("target").unwrap();
	assert_eq!(inbox.len(), 200);

	let aliases: HashSet<_> = inbox.iter().map(|m| m.from.clone()).collect();
	assert_eq!(aliases.len(), 8);
	junction.shutdown();
}

#[test]
fn idle_sessions_are_swept_active_ones_survive() {
	let junction = Junction::new(&JunctionConfig {
		session_timeout_ms: 250,
		sweep_interval_ms: 20,
		..JunctionConfig::default()
	})
	.unwrap();
	let idle = junction.register("idle").unwrap();
	let busy = junction.register("busy").unwrap();

	for _ in 0..15 {
		thread::sleep(Duration::from_millis(40));
		junction.list_peers("busy").unwrap();
	}

	assert_eq!(
		junction.read_messages("idle"),
		Err(JunctionError::NotRegistered)
	);
	assert_eq!(
		junction.send_message("busy", &idle.alias, "anyone?"),
		Err(JunctionError::PeerNotFound(idle.alias.clone()))
	);
	assert_eq!(junction.register("busy").unwrap().alias, busy.alias);
	junction.shutdown();
}

#[test]
fn shutdown_wipes_everything() {
	let junction = junction();
	junction.register("conn-1").unwrap();
	junction.register("conn-2").unwrap();

	junction.shutdown();
	assert_eq!(junction.active_peer_count(), 0);
	assert_eq!(
		junction.list_peers("conn-1"),
		Err(JunctionError::NotRegistered)
	);
	junction.shutdown();
}

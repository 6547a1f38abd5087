use std::sync::mpsc::{self, RecvTimeoutError, Sender};
use std::sync::{Arc, Mutex, MutexGuard};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use log::{debug, info, warn};

use crate::config::JunctionConfig;
use crate::error::{ConfigError, JunctionError};
use crate::server::models::{DecodedMessage, PeerInfo, RegisterResult};
use crate::server::registry::RegistryState;

// Handle on the background sweep thread
struct Sweeper {
	stop: Sender<()>,
	handle: JoinHandle<()>,
}

// Junction facade - the interface the transport talks to.
// Cheap to clone; every clone shares one registry behind one lock, and the
// sweep thread takes that same lock for each pass.
#[derive(Clone)]
pub struct Junction {
	state: Arc<Mutex<RegistryState>>,
	sweeper: Arc<Mutex<Option<Sweeper>>>,
}

impl Junction {
	// Build an empty registry and start the expiry sweep. The config is
	// validated first so a zero sweep interval can never spin the thread.
	pub fn new(config: &JunctionConfig) -> Result<Self, ConfigError> {
		config.validate()?;

		let state = Arc::new(Mutex::new(RegistryState::new(config.session_timeout())));

		let (stop, stop_rx) = mpsc::channel();
		let sweep_state = state.clone();
		let interval = config.sweep_interval();
		let handle = thread::spawn(move || {
			Self::sweep_thread(sweep_state, stop_rx, interval);
		});

		info!(
			"Junction started: session timeout {:?}, sweep every {:?}",
			config.session_timeout(),
			interval
		);

		Ok(Junction {
			state,
			sweeper: Arc::new(Mutex::new(Some(Sweeper { stop, handle }))),
		})
	}

	pub fn register(&self, session_id: &str) -> Result<RegisterResult, JunctionError> {
		self.lock_state().register(session_id)
	}

	pub fn list_peers(&self, session_id: &str) -> Result<Vec<PeerInfo>, JunctionError> {
		self.lock_state().list_peers(session_id)
	}

	pub fn send_message(
		&self,
		session_id: &str,
		target_alias: &str,
		message: &str,
	) -> Result<(), JunctionError> {
		self.lock_state()
			.send_message(session_id, target_alias, message)
	}

	pub fn read_messages(&self, session_id: &str) -> Result<Vec<DecodedMessage>, JunctionError> {
		self.lock_state().read_messages(session_id)
	}

	pub fn disconnect(&self, session_id: &str) {
		self.lock_state().disconnect(session_id);
	}

	pub fn active_peer_count(&self) -> usize {
		self.lock_state().active_peer_count()
	}

	// Run one sweep pass now, outside the timer.
	pub fn sweep_now(&self) -> usize {
		self.lock_state().sweep_expired(Instant::now())
	}

	// Stop the sweep, wipe every key and drop all sessions.
	// Once this returns no further sweep pass runs. Calling it again is
	// harmless.
	pub fn shutdown(&self) {
		let sweeper = self
			.sweeper
			.lock()
			.unwrap_or_else(|poisoned| poisoned.into_inner())
			.take();

		if let Some(sweeper) = sweeper {
			// A send error means the thread is already gone
			let _ = sweeper.stop.send(());
			if sweeper.handle.join().is_err() {
				warn!("Sweep thread panicked before shutdown");
			}
			debug!("Sweep thread stopped");
		}

		let mut state = self.lock_state();
		let remaining = state.active_peer_count();
		state.clear();
		info!("Junction shut down, {} session(s) wiped", remaining);
	}

	// No operation panics while holding the lock, so a poisoned registry is
	// still consistent.
	fn lock_state(&self) -> MutexGuard<'_, RegistryState> {
		self.state
			.lock()
			.unwrap_or_else(|poisoned| poisoned.into_inner())
	}

	// Periodically evict idle sessions until told to stop
	fn sweep_thread(
		state: Arc<Mutex<RegistryState>>,
		stop: mpsc::Receiver<()>,
		interval: Duration,
	) {
		loop {
			match stop.recv_timeout(interval) {
				Err(RecvTimeoutError::Timeout) => {}
				Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
			}

			let mut state = state.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
			let swept = state.sweep_expired(Instant::now());
			if swept > 0 {
				info!("Swept {} expired session(s)", swept);
			}
		}
	}
}

use std::env;
use std::path::Path;

use junction::server::transport;
use junction::{Junction, JunctionConfig};
use log::{error, info};
use tokio::net::TcpListener;

#[tokio::main]
async fn main() {
	env_logger::init();

	// Optional path to a JSON config file
	let args: Vec<String> = env::args().collect();
	let config = match JunctionConfig::load(args.get(1).map(Path::new)) {
		Ok(config) => config,
		Err(e) => {
			error!("Failed to load configuration: {}", e);
			return;
		}
	};

	for host in &config.known_hosts {
		info!(
			"Known host {} at {}:{} (discovery not enabled)",
			host.name, host.address, host.port
		);
	}

	let listener = match TcpListener::bind(config.bind_address()).await {
		Ok(l) => l,
		Err(e) => {
			error!("Failed to bind to {}: {}", config.bind_address(), e);
			return;
		}
	};

	let junction = match Junction::new(&config) {
		Ok(junction) => junction,
		Err(e) => {
			error!("Failed to start junction: {}", e);
			return;
		}
	};

	tokio::select! {
		result = transport::serve(listener, junction.clone()) => {
			if let Err(e) = result {
				error!("Transport stopped: {}", e);
			}
		}
		_ = tokio::signal::ctrl_c() => {
			info!("Interrupt received, shutting down");
		}
	}

	junction.shutdown();
}

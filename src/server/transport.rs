use log::{debug, info, warn};
use rand::distributions::Alphanumeric;
use rand::{thread_rng, Rng};
use tokio::io::{AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader};
use tokio::net::tcp::OwnedWriteHalf;
use tokio::net::{TcpListener, TcpStream};

use crate::server::facade::Junction;
use crate::server::handler::{MessageHandler, Reply};

// Longest command line accepted, newline excluded
pub const MAX_LINE_LEN: usize = 4096;

// Accept connections forever, one task per connection
pub async fn serve(listener: TcpListener, junction: Junction) -> std::io::Result<()> {
	info!("Junction listening on {}", listener.local_addr()?);

	loop {
		let (stream, peer_addr) = match listener.accept().await {
			Ok(accepted) => accepted,
			Err(e) => {
				warn!("Connection failed: {}", e);
				continue;
			}
		};

		let junction = junction.clone();
		tokio::spawn(async move {
			let session_id = new_session_id();
			debug!("Connection from {} as {}", peer_addr, session_id);
			if let Err(e) = handle_connection(stream, junction.clone(), session_id.clone()).await {
				warn!("Connection error for {}: {}", peer_addr, e);
			}
			junction.disconnect(&session_id);
		});
	}
}

// Serve one connection line by line until EOF or QUIT.
// Lines are read in chunks of at most MAX_LINE_LEN + 1 bytes; a longer line
// gets one error reply and its tail is skipped up to the next newline.
async fn handle_connection(
	stream: TcpStream,
	junction: Junction,
	session_id: String,
) -> std::io::Result<()> {
	let (reader, mut writer) = stream.into_split();
	let mut reader = BufReader::new(reader);
	let mut handler = MessageHandler::new(session_id, junction);
	let mut line = Vec::with_capacity(256);
	let mut oversized = false;

	loop {
		line.clear();
		let read = (&mut reader)
			.take(MAX_LINE_LEN as u64 + 1)
			.read_until(b'\n', &mut line)
			.await?;
		if read == 0 {
			break;
		}

		let complete = line.last() == Some(&b'\n');
		if oversized {
			oversized = !complete;
			continue;
		}
		if !complete && line.len() > MAX_LINE_LEN {
			warn!("Session {} sent an over-long line", handler.session_id());
			oversized = true;
			let reply = Reply::error(&format!("Line exceeds {} bytes", MAX_LINE_LEN));
			write_reply(&mut writer, &reply).await?;
			continue;
		}

		let command = match std::str::from_utf8(&line) {
			Ok(text) => text.trim(),
			Err(_) => {
				write_reply(&mut writer, &Reply::error("Invalid UTF-8")).await?;
				continue;
			}
		};
		if command.is_empty() {
			continue;
		}

		let reply = handler.handle_message(command);
		write_reply(&mut writer, &reply).await?;

		if reply.close {
			debug!("Session {} quit", handler.session_id());
			break;
		}
	}

	writer.shutdown().await
}

async fn write_reply(writer: &mut OwnedWriteHalf, reply: &Reply) -> std::io::Result<()> {
	writer.write_all(reply.to_line().as_bytes()).await
}

fn new_session_id() -> String {
	thread_rng()
		.sample_iter(&Alphanumeric)
		.take(32)
		.map(char::from)
		.collect()
}

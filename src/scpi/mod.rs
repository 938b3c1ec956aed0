//! SCPI commands and queries over a [`Transport`].
//!
//! [`ScpiSession`] owns the transport exclusively, so one caller at a time
//! drives the instrument. Share it across threads behind a `Mutex` if you
//! must; interleaved commands would scramble replies.

use std::str;
use std::time::Duration;

use log::{debug, trace};

use crate::error::{Error, Result};
use crate::transport::Transport;

pub mod block;
pub mod errors;

pub use self::block::parse_definite_block;
pub use self::errors::{ErrorPolicy, ErrorRecord};

/// Parses a reply that must be exactly one floating-point literal.
pub fn parse_number(reply:&str) -> Result<f64> {
	let text = reply.trim();
	let x:f64 = text.parse().map_err(|_| Error::Parse(format!("{:?} is not a number", text)))?;
	if !x.is_finite() {
		return Err(Error::Parse(format!("{:?} is not a finite number", text)));
	}
	Ok(x)
}

/// Parses the first element of a comma-separated numeric reply.
pub fn parse_ascii_first(reply:&str) -> Result<f64> {
	let first = reply.trim().split(',').next().unwrap_or("");
	if first.trim().is_empty() {
		return Err(Error::Parse(format!("{:?} is not a comma-separated number list", reply.trim())));
	}
	parse_number(first)
}

pub struct ScpiSession<T: Transport> {
	transport: T,
}

impl<T: Transport> ScpiSession<T> {

	pub fn new(transport:T) -> Self { ScpiSession{ transport } }

	pub fn transport(&self) -> &T { &self.transport }

	pub fn transport_mut(&mut self) -> &mut T { &mut self.transport }

	pub fn into_inner(self) -> T { self.transport }

	pub fn timeout(&self) -> Duration { self.transport.timeout() }

	pub fn set_timeout(&mut self, timeout:Duration) -> Result<()> { self.transport.set_timeout(timeout) }

	/// Device clear at the transport level, like VISA `viClear`.
	pub fn clear(&mut self) -> Result<()> {
		debug!("device clear");
		self.transport.clear()
	}

	/// Writes a command and returns without waiting for anything.
	pub fn send(&mut self, command:&str) -> Result<()> {
		debug!("> {}", command);
		let mut msg = Vec::with_capacity(command.len() + 1);
		msg.extend_from_slice(command.as_bytes());
		msg.push(b'\n');
		self.transport.write(&msg)
	}

	/// Writes a query and returns the raw reply bytes.
	pub fn query_raw(&mut self, command:&str) -> Result<Vec<u8>> {
		self.send(command)?;
		let reply = self.transport.read()?;
		trace!("< {} bytes", reply.len());
		Ok(reply)
	}

	pub fn query_text(&mut self, command:&str) -> Result<String> {
		let reply = self.query_raw(command)?;
		let text = str::from_utf8(&reply)
			.map_err(|_| Error::Parse(format!("reply to `{}` is not UTF-8", command)))?;
		let text = text.trim_end_matches(|c| c == '\n' || c == '\r');
		debug!("< {}", text);
		Ok(text.to_owned())
	}

	pub fn query_number(&mut self, command:&str) -> Result<f64> {
		let reply = self.query_text(command)?;
		parse_number(&reply)
	}

	pub fn query_ascii(&mut self, command:&str) -> Result<f64> {
		let reply = self.query_text(command)?;
		parse_ascii_first(&reply)
	}

	pub fn query_binary_block(&mut self, command:&str) -> Result<Vec<u8>> {
		let reply = self.query_raw(command)?;
		let payload = parse_definite_block(&reply)?;
		debug!("< block of {} bytes", payload.len());
		Ok(payload.to_vec())
	}

}

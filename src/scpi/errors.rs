//! Error-queue draining after every command.
//!
//! SCPI instruments queue faults until somebody reads them, so a stale entry
//! would be blamed on whatever command happens to check next. Every checked
//! transaction reads `:SYSTem:ERRor? STRing` until the instrument reports code
//! 0, which keeps each fault attached to the command that caused it.

use log::{error, warn};
use serde::{Serialize, Deserialize};

use crate::error::{Error, Result};
use crate::transport::Transport;
use super::ScpiSession;

pub const ERROR_QUERY:&str = ":SYSTem:ERRor? STRing";

/// Upper bound on error-queue reads for one command; the instrument's queue is far shorter.
pub const MAX_DRAIN:usize = 64;

/// What a checked transaction does with faults found in the error queue.
///
/// `Abort` is for configuration and state changes: carrying on after a rejected
/// setting would capture with an unknown setup. `Warn` is for bulk data reads,
/// where a transient complaint is logged and the data is still returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorPolicy {
	Abort,
	Warn,
}

impl From<bool> for ErrorPolicy {
	/// Maps an `exit_on_error` flag onto a policy.
	fn from(exit_on_error:bool) -> Self {
		if exit_on_error { ErrorPolicy::Abort } else { ErrorPolicy::Warn }
	}
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorRecord {
	pub code: i32,
	pub message: String,
}

impl ErrorRecord {

	/// Parses `<code>,"<message>"`; a bare `<code>` is accepted too.
	pub fn parse(reply:&str) -> Result<Self> {
		let reply = reply.trim();
		if reply.is_empty() {
			return Err(Error::Protocol("empty reply to the error query".into()));
		}

		let (code_str, message) = match reply.find(',') {
			Some(idx) => (&reply[..idx], reply[idx + 1..].trim()),
			None      => (reply, ""),
		};

		let code:i32 = code_str.trim().parse()
			.map_err(|_| Error::Protocol(format!("error query reply {:?} does not start with a code", reply)))?;
		let message = message.trim_matches('"').to_owned();

		Ok(ErrorRecord{ code, message })
	}

	pub fn is_no_error(&self) -> bool { self.code == 0 }

	pub fn into_device_error(self, command:&str) -> Error {
		Error::Device{ command: command.to_owned(), code: self.code, message: self.message }
	}

}

impl<T: Transport> ScpiSession<T> {

	/// Reads the error queue until it reports code 0 and returns what was drained.
	///
	/// Every queued fault is drained whatever the policy. Under `Abort` the first one
	/// is then returned as [`Error::Device`] naming `command`. An empty reply is always fatal.
	pub fn drain_errors(&mut self, command:&str, policy:ErrorPolicy) -> Result<Vec<ErrorRecord>> {
		let mut drained:Vec<ErrorRecord> = vec![];

		for _ in 0..MAX_DRAIN {
			let reply = self.query_text(ERROR_QUERY)?;
			if reply.trim().is_empty() {
				return Err(Error::Protocol(format!("instrument gave an empty reply to the error query after `{}`", command)));
			}

			let record = ErrorRecord::parse(&reply)?;
			if record.is_no_error() {
				return match policy {
					ErrorPolicy::Abort if !drained.is_empty() => Err(drained.swap_remove(0).into_device_error(command)),
					_ => Ok(drained),
				};
			}

			match policy {
				ErrorPolicy::Abort => error!("`{}` -> {},\"{}\"", command, record.code, record.message),
				ErrorPolicy::Warn  => warn!("`{}` -> {},\"{}\"", command, record.code, record.message),
			}
			drained.push(record);
		}

		Err(Error::Protocol(format!("error queue still reporting faults after {} reads following `{}`", MAX_DRAIN, command)))
	}

	// Runs one transaction and drains the queue behind it. A query the instrument
	// rejected never answers, so a timeout is followed by a clear and a drain that
	// names the real cause when there is one. A malformed reply is drained too, so
	// its fault is never reported against the next command.
	fn checked<R, F>(&mut self, command:&str, policy:ErrorPolicy, f:F) -> Result<R>
		where F: FnOnce(&mut Self) -> Result<R>
	{
		match f(self) {
			Ok(r) => {
				self.drain_errors(command, policy)?;
				Ok(r)
			},
			Err(Error::Timeout) => {
				self.clear()?;
				let drained = self.drain_errors(command, ErrorPolicy::Warn)?;
				match drained.into_iter().next() {
					Some(record) => Err(record.into_device_error(command)),
					None         => Err(Error::Timeout),
				}
			},
			Err(e) if e.is_transport() => Err(e),
			Err(e) => {
				match self.drain_errors(command, ErrorPolicy::Warn) {
					Ok(drained) => match drained.into_iter().next() {
						Some(record) => Err(record.into_device_error(command)),
						None         => Err(e),
					},
					Err(drain_err) => {
						warn!("error queue unreadable after `{}`: {}", command, drain_err);
						Err(e)
					},
				}
			},
		}
	}

	pub fn checked_send(&mut self, command:&str, policy:ErrorPolicy) -> Result<()> {
		self.checked(command, policy, |s| s.send(command))
	}

	pub fn checked_query_text(&mut self, command:&str, policy:ErrorPolicy) -> Result<String> {
		self.checked(command, policy, |s| s.query_text(command))
	}

	pub fn checked_query_number(&mut self, command:&str, policy:ErrorPolicy) -> Result<f64> {
		self.checked(command, policy, |s| s.query_number(command))
	}

	pub fn checked_query_ascii(&mut self, command:&str, policy:ErrorPolicy) -> Result<f64> {
		self.checked(command, policy, |s| s.query_ascii(command))
	}

	pub fn checked_query_binary_block(&mut self, command:&str, policy:ErrorPolicy) -> Result<Vec<u8>> {
		self.checked(command, policy, |s| s.query_binary_block(command))
	}

}

// Device core
pub const DEVICE_CORE_PROG:u32  = 0x0607af;
pub const DEVICE_CORE_VERS:u32  = 1;
pub const CREATE_LINK:u32       = 10;
pub const DEVICE_WRITE:u32      = 11;
pub const DEVICE_READ:u32       = 12;
pub const DEVICE_CLEAR:u32      = 15;
pub const DESTROY_LINK:u32      = 23;

pub const CLIENT_ID:i32 = 3333;
pub const DEFAULT_DEVICE:&str = "inst0";

// Operation flags
pub const FLAG_WAITLOCK:i32 = 1;
pub const FLAG_END:i32      = 8;

// Reason bits in a device_read reply
pub const REASON_REQCNT:i32 = 1;
pub const REASON_CHR:i32    = 2;
pub const REASON_END:i32    = 4;

// Largest chunk asked for per device_read; the reply loop handles anything longer
pub const READ_CHUNK:u32 = 1 << 20;

use std::time::Duration;

use log::{debug, warn};

use crate::error::{Error, Result};
use crate::rpc::port_mapping::{TcpPortMapperClient, Mapping, Protocol};
use crate::rpc::tcp_clients::TcpClient;

pub mod xdr_pack;

/// Maps a VXI-11 `Device_ErrorCode` to the crate error, `None` for success.
pub fn device_error(code:i32) -> Option<Error> {
	let msg = match code {
		0  => return None,
		15 => return Some(Error::Timeout),
		1  => "syntax error",
		3  => "device not accessible",
		4  => "invalid link identifier",
		5  => "parameter error",
		6  => "channel not established",
		8  => "operation not supported",
		9  => "out of resources",
		11 => "device locked by another link",
		12 => "no lock held by this link",
		17 => "I/O error",
		21 => "invalid address",
		23 => "abort",
		29 => "channel already established",
		_  => return Some(Error::Transport(format!("unknown VXI-11 error code {}", code))),
	};
	Some(Error::Transport(format!("VXI-11 {}", msg)))
}

fn check(code:i32) -> Result<()> {
	match device_error(code) {
		None    => Ok(()),
		Some(e) => Err(e),
	}
}

fn timeout_ms(timeout:Duration) -> u32 {
	timeout.as_millis().min(u32::MAX as u128) as u32
}

pub struct Link {
	pub link_id: i32,
	pub abort_port: u16,
	pub max_recv_size: u32,
}

/// The core channel of one VXI-11 connection, holding at most one link.
pub struct CoreClient {
	client: TcpClient,
	opt_link: Option<Link>,
	timeout: Duration,
}

impl CoreClient {

	fn link(&self) -> Result<&Link> {
		self.opt_link.as_ref().ok_or_else(|| Error::Transport("no VXI-11 link established".into()))
	}

	/// Asks the host's portmapper where the core program lives and connects to it.
	pub fn new(host:&str, timeout:Duration) -> Result<Self> {
		let mut pmap_client = TcpPortMapperClient::new(host, timeout)?;

		let mapping = Mapping {
			program: DEVICE_CORE_PROG,
			version: DEVICE_CORE_VERS,
			protocol: Protocol::TCP,
			port: 0,
		};

		let port = pmap_client.get_port(&mapping)?;
		debug!("VXI-11 core channel for {} on port {}", host, port);

		let client = TcpClient::connect((host, port), DEVICE_CORE_PROG, DEVICE_CORE_VERS, timeout)?;

		Ok(CoreClient { client, opt_link: None, timeout })
	}

	pub fn timeout(&self) -> Duration { self.timeout }

	pub fn set_timeout(&mut self, timeout:Duration) -> Result<()> {
		self.client.set_timeout(timeout)?;
		self.timeout = timeout;
		Ok(())
	}

	pub fn create_link(&mut self, device:&str) -> Result<()> {
		if self.opt_link.is_some() {
			return Err(Error::Transport("already connected to a link".into()));
		}

		let ms = timeout_ms(self.timeout);
		self.client.start_call(CREATE_LINK)?;
		xdr_pack::pack_create_link_parms(&mut self.client.packer, CLIENT_ID, false, ms, device)?;
		self.client.do_call()?;

		let error:i32         = self.client.unpacker.unpack_i32()?;
		let link_id:i32       = self.client.unpacker.unpack_i32()?;
		let abort_port:u32    = self.client.unpacker.unpack_u32()?;
		let max_recv_size:u32 = self.client.unpacker.unpack_u32()?;
		check(error)?;

		debug!("VXI-11 link {} to {} (max_recv_size={})", link_id, device, max_recv_size);
		self.opt_link = Some(Link{ link_id, abort_port: abort_port as u16, max_recv_size });
		Ok(())
	}

	/// Writes one message, split into chunks no larger than the link accepts; END goes on the last chunk.
	pub fn write(&mut self, data:&[u8]) -> Result<()> {
		let (link_id, max_recv_size) = {
			let link = self.link()?;
			(link.link_id, link.max_recv_size.max(1) as usize)
		};
		let ms = timeout_ms(self.timeout);

		if data.is_empty() {
			return Err(Error::InvalidParameter("refusing to write an empty message".into()));
		}

		let mut chunks = data.chunks(max_recv_size).peekable();

		while let Some(chunk) = chunks.next() {
			let flags = if chunks.peek().is_none() { FLAG_END } else { 0 };

			self.client.start_call(DEVICE_WRITE)?;
			xdr_pack::pack_device_write_parms(&mut self.client.packer, link_id, ms, ms, flags, chunk)?;
			self.client.do_call()?;

			let error:i32 = self.client.unpacker.unpack_i32()?;
			let size:u32  = self.client.unpacker.unpack_u32()?;
			check(error)?;

			if size as usize != chunk.len() {
				return Err(Error::Transport(format!("device accepted {} of {} bytes", size, chunk.len())));
			}
		}

		Ok(())
	}

	/// Reads one complete message, looping until the device sets the END reason bit.
	pub fn read(&mut self) -> Result<Vec<u8>> {
		let link_id = self.link()?.link_id;
		let ms = timeout_ms(self.timeout);

		let mut message:Vec<u8> = vec![];
		loop {
			self.client.start_call(DEVICE_READ)?;
			xdr_pack::pack_device_read_parms(&mut self.client.packer, link_id, READ_CHUNK, ms, ms, 0, 0)?;
			self.client.do_call()?;

			let error:i32    = self.client.unpacker.unpack_i32()?;
			let reason:i32   = self.client.unpacker.unpack_i32()?;
			let data:Vec<u8> = self.client.unpacker.unpack_variable_len_opaque()?;
			check(error)?;

			message.extend_from_slice(&data);

			if reason & REASON_END != 0 {
				return Ok(message);
			} else if reason & (REASON_REQCNT | REASON_CHR) != 0 {
				continue;
			} else {
				return Err(Error::Protocol(format!("device_read ended with reason {:#x} and no END", reason)));
			}
		}
	}

	/// Device clear: flushes the instrument's input and output buffers.
	pub fn clear(&mut self) -> Result<()> {
		let link_id = self.link()?.link_id;
		let ms = timeout_ms(self.timeout);

		self.client.start_call(DEVICE_CLEAR)?;
		xdr_pack::pack_device_generic_parms(&mut self.client.packer, link_id, FLAG_WAITLOCK, ms, ms)?;
		self.client.do_call()?;

		check(self.client.unpacker.unpack_i32()?)
	}

	pub fn destroy_link(&mut self) -> Result<()> {
		let link_id = self.link()?.link_id;

		self.client.start_call(DESTROY_LINK)?;
		xdr_pack::pack_device_link(&mut self.client.packer, link_id)?;
		self.client.do_call()?;

		self.opt_link = None;
		check(self.client.unpacker.unpack_i32()?)
	}

}

impl Drop for CoreClient {

	fn drop(&mut self) {
		if self.opt_link.is_some() {
			if let Err(e) = self.destroy_link() {
				warn!("unable to destroy VXI-11 link: {}", e);
			}
		}
	}

}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn full_read_chunk_fits_in_one_record() {
		// device_read reply: xid, reply header, error, reason, opaque length
		let overhead = 4 * 10;
		assert!(READ_CHUNK as usize + overhead < crate::rpc::tcp_clients::MAX_RECORD);
	}

	#[test]
	fn success_code_is_not_an_error() {
		assert!(device_error(0).is_none());
	}

	#[test]
	fn io_timeout_maps_to_timeout() {
		assert!(matches!(device_error(15), Some(Error::Timeout)));
	}

	#[test]
	fn known_and_unknown_codes_are_transport_errors() {
		match device_error(11) {
			Some(Error::Transport(msg)) => assert!(msg.contains("locked")),
			other => panic!("unexpected {:?}", other),
		}
		assert!(matches!(device_error(99), Some(Error::Transport(_))));
	}

	#[test]
	fn timeout_saturates_to_u32_millis() {
		assert_eq!(timeout_ms(Duration::from_secs(10)), 10_000);
		assert_eq!(timeout_ms(Duration::from_secs(u64::MAX / 1000)), u32::MAX);
	}
}

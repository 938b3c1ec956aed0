
use std::io::{self, Read, Write};
use std::net::{TcpStream, ToSocketAddrs};
use std::time::Duration;

use byteorder::{BigEndian, WriteBytesExt, ReadBytesExt};
use log::trace;

use crate::error::{Error, Result};
use crate::xdr::{Packer, Unpacker};
use super::{xdr_pack, xdr_unpack};

const LAST_FRAGMENT:u32 = 0x8000_0000;

/// Largest reply record accepted, fragments joined. A full `device_read` chunk plus its
/// XDR framing fits with room to spare.
pub const MAX_RECORD:usize = 1 << 21;

// Socket timeouts surface as one of two kinds depending on the platform
fn map_io(e:io::Error) -> Error {
	match e.kind() {
		io::ErrorKind::TimedOut | io::ErrorKind::WouldBlock => Error::Timeout,
		io::ErrorKind::UnexpectedEof | io::ErrorKind::ConnectionReset | io::ErrorKind::ConnectionAborted =>
			Error::Transport(format!("connection lost: {}", e)),
		_ => Error::Io(e),
	}
}

/// Writes one call as a single record-marked fragment.
pub fn write_record<W: Write>(w:&mut W, call:&[u8]) -> Result<()> {
	let header:u32 = call.len() as u32 | LAST_FRAGMENT;

	let mut send_bytes:Vec<u8> = Vec::with_capacity(call.len() + 4);
	send_bytes.write_u32::<BigEndian>(header)?;
	send_bytes.extend_from_slice(call);
	w.write_all(&send_bytes).map_err(map_io)
}

/// Reads fragments until the one flagged as last and returns the joined record.
pub fn read_record<R: Read>(r:&mut R) -> Result<Vec<u8>> {
	let mut reply:Vec<u8> = vec![];

	let mut last:bool = false;
	while !last {
		let x:u32 = r.read_u32::<BigEndian>().map_err(map_io)?;

		last = (x & LAST_FRAGMENT) != 0;
		let n = (x & !LAST_FRAGMENT) as usize;

		let start = reply.len();
		if n > MAX_RECORD - start {
			return Err(Error::Protocol(format!("RPC record of at least {} bytes exceeds the {} byte limit", start + n, MAX_RECORD)));
		}
		reply.resize(start + n, 0);
		r.read_exact(&mut reply[start..]).map_err(map_io)?;
	}

	Ok(reply)
}

pub struct TcpClient {
	stream: TcpStream,
	prog: u32,
	vers: u32,
	lastxid: u32,
	pub packer: Packer,
	pub unpacker: Unpacker,
}

impl TcpClient {

	pub fn connect<A: ToSocketAddrs>(addr: A, prog: u32, vers: u32, timeout: Duration) -> Result<Self> {
		let stream = TcpStream::connect(addr).map_err(|e| Error::Transport(format!("unable to connect: {}", e)))?;
		stream.set_nodelay(true)?;
		stream.set_read_timeout(Some(timeout))?;
		stream.set_write_timeout(Some(timeout))?;
		Ok(Self{ stream, prog, vers, lastxid: 0, packer: Packer::new(), unpacker: Unpacker::new() })
	}

	pub fn set_timeout(&mut self, timeout:Duration) -> Result<()> {
		self.stream.set_read_timeout(Some(timeout))?;
		self.stream.set_write_timeout(Some(timeout))?;
		Ok(())
	}

	/// Resets the packer and writes a call header for `prc`; arguments get packed after this.
	pub fn start_call(&mut self, prc:u32) -> Result<()> {
		self.lastxid = self.lastxid.wrapping_add(1);
		self.packer.reset();
		xdr_pack::pack_callheader_no_auth(&mut self.packer, self.lastxid, self.prog, self.vers, prc)
	}

	/// Sends the packed call and leaves the unpacker positioned just after the reply header.
	pub fn do_call(&mut self) -> Result<()> {
		write_record(&mut self.stream, self.packer.as_bytes())?;

		loop {
			let reply = read_record(&mut self.stream)?;
			self.unpacker.reset(&reply);

			let xid = xdr_unpack::unpack_replyheader(&mut self.unpacker)?;
			if xid == self.lastxid {
				return Ok(());
			} else if xid < self.lastxid {
				// Stale reply to an earlier call that timed out on our side
				trace!("discarding stale RPC reply xid={} (waiting for {})", xid, self.lastxid);
				continue;
			} else {
				return Err(Error::Protocol(format!("RPC reply xid {} is ahead of the last call {}", xid, self.lastxid)));
			}
		}
	}

}

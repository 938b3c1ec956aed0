
use crate::error::{Error, Result};
use crate::xdr::Unpacker;
use crate::rpc::{REPLY, MSG_DENIED, RPC_MISMATCH, AUTH_ERROR, MSG_ACCEPTED, PROG_UNAVAIL, PROG_MISMATCH, PROC_UNAVAIL, GARBAGE_ARGS, SYSTEM_ERR, SUCCESS};

fn rejected(msg:&str) -> Error { Error::Transport(format!("RPC reply rejected: {}", msg)) }

pub fn unpack_auth(unpacker:&mut Unpacker) -> Result<(i32, Vec<u8>)> {
	let flavor:i32    = unpacker.unpack_enum()?;
	let stuff:Vec<u8> = unpacker.unpack_variable_len_opaque()?;
	Ok((flavor, stuff))
}

/// Consumes an accepted, successful reply header and returns its xid.
pub fn unpack_replyheader(unpacker:&mut Unpacker) -> Result<u32> {
	let xid:u32 = unpacker.unpack_u32()?;

	let mtype:i32 = unpacker.unpack_enum()?;
	if mtype != REPLY { return Err(Error::Protocol(format!("expected an RPC REPLY but got message type {}", mtype))); }

	match unpacker.unpack_enum()? {
		MSG_DENIED => {
			match unpacker.unpack_enum()? {
				RPC_MISMATCH => {
					let lo = unpacker.unpack_u32()?;
					let hi = unpacker.unpack_u32()?;
					return Err(rejected(&format!("RPC version mismatch, server supports {}..={}", lo, hi)))
				},
				AUTH_ERROR => {
					let stat = unpacker.unpack_u32()?;
					return Err(rejected(&format!("authentication error {}", stat)))
				},
				x => return Err(rejected(&format!("denied with unknown reason {}", x))),
			}
		},
		MSG_ACCEPTED => { },
		x => return Err(Error::Protocol(format!("reply status {} is neither accepted nor denied", x))),
	}

	let _verf = unpack_auth(unpacker)?;

	match unpacker.unpack_enum()? {
		SUCCESS       => Ok(xid),
		PROG_UNAVAIL  => Err(rejected("program unavailable")),
		PROG_MISMATCH => {
			let lo = unpacker.unpack_u32()?;
			let hi = unpacker.unpack_u32()?;
			Err(rejected(&format!("program version mismatch, server supports {}..={}", lo, hi)))
		},
		PROC_UNAVAIL  => Err(rejected("procedure unavailable")),
		GARBAGE_ARGS  => Err(rejected("server could not decode arguments")),
		SYSTEM_ERR    => Err(rejected("system error on server")),
		x             => Err(rejected(&format!("unknown accept status {}", x))),
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::xdr::Packer;

	fn reply(words:&[u32]) -> Unpacker {
		let mut p = Packer::new();
		for w in words { p.pack_u32(*w).unwrap(); }
		let mut u = Unpacker::new();
		u.reset(p.as_bytes());
		u
	}

	#[test]
	fn accepted_success_returns_xid() {
		// xid, REPLY, MSG_ACCEPTED, verf flavor, verf len, SUCCESS, payload
		let mut u = reply(&[42, 1, 0, 0, 0, 0, 99]);
		assert_eq!(unpack_replyheader(&mut u).unwrap(), 42);
		assert_eq!(u.unpack_u32().unwrap(), 99);
	}

	#[test]
	fn prog_unavailable_is_transport_error() {
		let mut u = reply(&[1, 1, 0, 0, 0, 1]);
		assert!(matches!(unpack_replyheader(&mut u), Err(Error::Transport(_))));
	}

	#[test]
	fn denied_mismatch_is_transport_error() {
		let mut u = reply(&[1, 1, 1, 0, 2, 2]);
		assert!(matches!(unpack_replyheader(&mut u), Err(Error::Transport(_))));
	}

	#[test]
	fn call_instead_of_reply_is_protocol_error() {
		let mut u = reply(&[1, 0, 0]);
		assert!(matches!(unpack_replyheader(&mut u), Err(Error::Protocol(_))));
	}
}

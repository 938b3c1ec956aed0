//! IEEE-488.2 definite-length arbitrary blocks: `#<n><n digits of length><payload>`.

use crate::error::{Error, Result};

/// Returns the payload of a definite-length block, honouring the declared length exactly.
///
/// Leading whitespace and a trailing line terminator are tolerated; anything
/// else before the `#` or after the payload is a framing error.
pub fn parse_definite_block(reply:&[u8]) -> Result<&[u8]> {
	let start = reply.iter().position(|b| !b.is_ascii_whitespace())
		.ok_or_else(|| Error::Protocol("empty reply where a binary block was expected".into()))?;
	let block = &reply[start..];

	if block[0] != b'#' {
		return Err(Error::Protocol(format!("binary block starts with {:#04x} instead of '#'", block[0])));
	}

	let n_digits = match block.get(1) {
		Some(b'0') => return Err(Error::Protocol("indefinite-length block (#0) is not supported".into())),
		Some(d) if d.is_ascii_digit() => (d - b'0') as usize,
		Some(d) => return Err(Error::Protocol(format!("invalid block header digit count {:?}", *d as char))),
		None    => return Err(Error::Protocol("block header ends after '#'".into())),
	};

	let digits = block.get(2..2 + n_digits)
		.ok_or_else(|| Error::Protocol("block header shorter than its digit count".into()))?;
	if !digits.iter().all(u8::is_ascii_digit) {
		return Err(Error::Protocol(format!("non-numeric block length {:?}", String::from_utf8_lossy(digits))));
	}
	// Up to nine ASCII digits always fit in a usize
	let len:usize = std::str::from_utf8(digits)
		.map_err(|_| Error::Protocol("block length is not ASCII".into()))?
		.parse()
		.map_err(|_| Error::Protocol("block length is not a number".into()))?;

	let body = &block[2 + n_digits..];
	if body.len() < len {
		return Err(Error::Protocol(format!("truncated block: header declares {} bytes but {} arrived", len, body.len())));
	}

	let (payload, rest) = body.split_at(len);
	if !rest.iter().all(|b| *b == b'\n' || *b == b'\r') {
		return Err(Error::Protocol(format!("{} unexpected bytes after a {}-byte block", rest.len(), len)));
	}

	Ok(payload)
}


use std::io::Cursor;

use byteorder::{BigEndian, WriteBytesExt, ReadBytesExt};

use crate::error::{Error, Result};

fn short(what:&str) -> Error { Error::Protocol(format!("XDR buffer too short while unpacking {}", what)) }

#[derive(Default)]
pub struct Packer{
	buff:Vec<u8>
}

#[derive(Default)]
pub struct Unpacker {
	buff:Vec<u8>,
	pos:usize,
}

impl Packer {

	pub fn new() -> Self { Packer{buff: Vec::new()} }

	pub fn reset(&mut self) { self.buff.clear(); }

	pub fn as_bytes(&self) -> &[u8] { &self.buff }

	// Every item is a multiple of four bytes, so alignment is kept as long as opaque data is padded
	pub fn pack_u32(&mut self, x:u32) -> Result<()> { Ok(self.buff.write_u32::<BigEndian>(x)?) }
	pub fn pack_i32(&mut self, x:i32) -> Result<()> { Ok(self.buff.write_i32::<BigEndian>(x)?) }

	pub fn pack_bool(&mut self, b:bool) -> Result<()> { self.pack_i32(if b { 1 } else { 0 }) }

	pub fn pack_enum(&mut self, x:i32) -> Result<()> { self.pack_i32(x) }

	pub fn pack_variable_len_opaque(&mut self, data:&[u8]) -> Result<()> {
		self.pack_u32(data.len() as u32)?;
		self.buff.extend_from_slice(data);

		while self.buff.len() % 4 != 0 { self.buff.push(0); }
		Ok(())
	}

}

impl Unpacker {

	pub fn new() -> Self { Unpacker{buff: Vec::new(), pos: 0} }

	pub fn reset(&mut self, data:&[u8]) {
		self.buff.clear();
		self.buff.extend_from_slice(data);
		self.pos = 0;
	}

	pub fn remaining(&self) -> usize { self.buff.len() - self.pos }

	pub fn all_data_consumed(&self) -> bool { self.remaining() == 0 }

	fn skip(&mut self, n:usize) -> Result<()> {
		if n > self.remaining() { return Err(short("padding")); }
		self.pos += n;
		Ok(())
	}

	pub fn unpack_u32(&mut self) -> Result<u32> {
		let mut rdr = Cursor::new(&self.buff[self.pos..]);
		let ans:u32 = rdr.read_u32::<BigEndian>().map_err(|_| short("u32"))?;
		self.pos += 4;
		Ok(ans)
	}

	pub fn unpack_i32(&mut self) -> Result<i32> {
		let mut rdr = Cursor::new(&self.buff[self.pos..]);
		let ans:i32 = rdr.read_i32::<BigEndian>().map_err(|_| short("i32"))?;
		self.pos += 4;
		Ok(ans)
	}

	// Range checks for enums belong to whoever knows the enum
	pub fn unpack_enum(&mut self) -> Result<i32> { self.unpack_i32() }

	pub fn unpack_bool(&mut self) -> Result<bool> {
		match self.unpack_i32()? {
			0 => Ok(false),
			1 => Ok(true),
			x => Err(Error::Protocol(format!("expected 0 or 1 for an XDR bool but got {}", x))),
		}
	}

	pub fn unpack_variable_len_opaque(&mut self) -> Result<Vec<u8>> {
		let n = self.unpack_u32()? as usize;
		if n > self.remaining() { return Err(short("opaque data")); }

		let ans:Vec<u8> = self.buff[self.pos..self.pos + n].to_vec();
		self.pos += n;

		let pad = (4 - n % 4) % 4;
		self.skip(pad.min(self.remaining()))?;
		Ok(ans)
	}

}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn opaque_is_padded_to_four_bytes() {
		let mut p = Packer::new();
		p.pack_variable_len_opaque(b"inst0").unwrap();
		assert_eq!(p.as_bytes(), &[0, 0, 0, 5, b'i', b'n', b's', b't', b'0', 0, 0, 0]);
	}

	#[test]
	fn unpacks_what_was_packed() {
		let mut p = Packer::new();
		p.pack_i32(-7).unwrap();
		p.pack_bool(true).unwrap();
		p.pack_variable_len_opaque(b"abc").unwrap();
		p.pack_u32(0xdead_beef).unwrap();

		let mut u = Unpacker::new();
		u.reset(p.as_bytes());
		assert_eq!(u.unpack_i32().unwrap(), -7);
		assert!(u.unpack_bool().unwrap());
		assert_eq!(u.unpack_variable_len_opaque().unwrap(), b"abc".to_vec());
		assert_eq!(u.unpack_u32().unwrap(), 0xdead_beef);
		assert!(u.all_data_consumed());
	}

	#[test]
	fn bad_bool_and_short_buffer_are_protocol_errors() {
		let mut u = Unpacker::new();
		u.reset(&[0, 0, 0, 2, 0, 0]);
		assert!(matches!(u.unpack_bool(), Err(Error::Protocol(_))));
		assert!(matches!(u.unpack_u32(), Err(Error::Protocol(_))));
	}

	#[test]
	fn opaque_longer_than_buffer_is_rejected() {
		let mut u = Unpacker::new();
		u.reset(&[0, 0, 0, 9, 1, 2, 3, 4]);
		assert!(matches!(u.unpack_variable_len_opaque(), Err(Error::Protocol(_))));
	}
}

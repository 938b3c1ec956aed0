
use crate::error::Result;
use crate::xdr::Packer;
use crate::rpc::{CALL, RPCVERSION};

pub fn pack_auth(packer:&mut Packer, flavor:i32, stuff:&[u8]) -> Result<()> {
	packer.pack_enum(flavor)?;
	packer.pack_variable_len_opaque(stuff)
}

pub fn pack_callheader(packer:&mut Packer, xid:u32, prog:u32, vers:u32, prc:u32, cred:(i32, &[u8]), verf:(i32, &[u8])) -> Result<()> {
	packer.pack_u32(xid)?;
	packer.pack_enum(CALL)?;
	packer.pack_u32(RPCVERSION)?;
	packer.pack_u32(prog)?;
	packer.pack_u32(vers)?;
	packer.pack_u32(prc)?;
	pack_auth(packer, cred.0, cred.1)?;
	pack_auth(packer, verf.0, verf.1)
}

// AUTH_NONE for both credentials and verifier
pub fn pack_callheader_no_auth(packer: &mut Packer, xid:u32, prog:u32, vers:u32, prc:u32) -> Result<()> {
	pack_callheader(packer, xid, prog, vers, prc, (0, &[]), (0, &[]))
}

pub fn pack_mapping(packer: &mut Packer, prog:u32, vers:u32, prot:u32, port:u32) -> Result<()> {
	packer.pack_u32(prog)?;
	packer.pack_u32(vers)?;
	packer.pack_u32(prot)?;
	packer.pack_u32(port)
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn callheader_layout() {
		let mut p = Packer::new();
		pack_callheader_no_auth(&mut p, 7, 0x0607af, 1, 10).unwrap();
		let words:Vec<u32> = p.as_bytes().chunks(4)
			.map(|c| u32::from_be_bytes([c[0], c[1], c[2], c[3]]))
			.collect();
		// xid, CALL, rpcvers, prog, vers, proc, cred flavor, cred len, verf flavor, verf len
		assert_eq!(words, vec![7, 0, 2, 0x0607af, 1, 10, 0, 0, 0, 0]);
	}
}

use crate::error::{Error, Result};
use crate::xdr::Packer;

pub fn pack_device_link(packer:&mut Packer, link:i32) -> Result<()> {
	packer.pack_i32(link)
}

pub fn pack_create_link_parms(packer:&mut Packer, id:i32, lock_device:bool, lock_timeout:u32, device:&str) -> Result<()> {
	if !device.is_ascii() {
		return Err(Error::InvalidParameter(format!("VXI-11 device name {:?} is not ASCII", device)));
	}
	packer.pack_i32(id)?;
	packer.pack_bool(lock_device)?;
	packer.pack_u32(lock_timeout)?;
	packer.pack_variable_len_opaque(device.as_bytes())
}

pub fn pack_device_write_parms(packer:&mut Packer, link:i32, timeout:u32, lock_timeout:u32, flags:i32, data:&[u8]) -> Result<()> {
	packer.pack_i32(link)?;
	packer.pack_u32(timeout)?;
	packer.pack_u32(lock_timeout)?;
	packer.pack_i32(flags)?;
	packer.pack_variable_len_opaque(data)
}

pub fn pack_device_read_parms(packer:&mut Packer, link:i32, request_size:u32, timeout:u32, lock_timeout:u32, flags:i32, term_char:i32) -> Result<()> {
	packer.pack_i32(link)?;
	packer.pack_u32(request_size)?;
	packer.pack_u32(timeout)?;
	packer.pack_u32(lock_timeout)?;
	packer.pack_i32(flags)?;
	packer.pack_i32(term_char)
}

pub fn pack_device_generic_parms(packer:&mut Packer, link:i32, flags:i32, lock_timeout:u32, timeout:u32) -> Result<()> {
	packer.pack_i32(link)?;
	packer.pack_i32(flags)?;
	packer.pack_u32(lock_timeout)?;
	packer.pack_u32(timeout)
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::xdr::Unpacker;

	#[test]
	fn write_parms_field_order() {
		let mut p = Packer::new();
		pack_device_write_parms(&mut p, 3, 10000, 10000, 8, b"*IDN?").unwrap();

		let mut u = Unpacker::new();
		u.reset(p.as_bytes());
		assert_eq!(u.unpack_i32().unwrap(), 3);
		assert_eq!(u.unpack_u32().unwrap(), 10000);
		assert_eq!(u.unpack_u32().unwrap(), 10000);
		assert_eq!(u.unpack_i32().unwrap(), 8);
		assert_eq!(u.unpack_variable_len_opaque().unwrap(), b"*IDN?".to_vec());
		assert!(u.all_data_consumed());
	}

	#[test]
	fn non_ascii_device_name_is_rejected() {
		let mut p = Packer::new();
		assert!(matches!(pack_create_link_parms(&mut p, 1, false, 0, "inst\u{e9}"), Err(Error::InvalidParameter(_))));
	}
}

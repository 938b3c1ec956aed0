
pub const PMAP_PROG:u32 = 100000;
pub const PMAP_VERS:u32 = 2;
pub const PMAP_PORT:u16 = 111;

pub const PMAPPROC_GETPORT:u32 = 3;     // (mapping) -> unsigned int

use std::time::Duration;

use crate::error::{Error, Result};

use super::{IPPROTO_TCP, IPPROTO_UDP};
use super::xdr_pack;
use super::tcp_clients::TcpClient;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Protocol {
	TCP,
	UDP,
}

impl Protocol {
	pub fn to_u32(self) -> u32 { match self {
		Protocol::TCP => IPPROTO_TCP,
		Protocol::UDP => IPPROTO_UDP,
	}}
}

#[derive(Debug)]
pub struct Mapping {
	pub program: u32,
	pub version: u32,
	pub protocol: Protocol,
	pub port: u32,
}

pub struct TcpPortMapperClient {
	tcp_client: TcpClient,
}

impl TcpPortMapperClient {

	pub fn new(host:&str, timeout:Duration) -> Result<Self> {
		let tcp_client = TcpClient::connect((host, PMAP_PORT), PMAP_PROG, PMAP_VERS, timeout)?;
		Ok(Self{ tcp_client })
	}

	/// Looks up the port a program is registered on; zero from the server means "not registered".
	pub fn get_port(&mut self, m:&Mapping) -> Result<u16> {
		self.tcp_client.start_call(PMAPPROC_GETPORT)?;
		xdr_pack::pack_mapping(&mut self.tcp_client.packer, m.program, m.version, m.protocol.to_u32(), m.port)?;
		self.tcp_client.do_call()?;

		let ans:u32 = self.tcp_client.unpacker.unpack_u32()?;

		if !self.tcp_client.unpacker.all_data_consumed() {
			return Err(Error::Protocol("data left over in portmapper reply after the port".into()));
		}

		match ans {
			0 => Err(Error::Transport(format!("program {:#x} v{} is not registered with the portmapper", m.program, m.version))),
			p if p > u16::MAX as u32 => Err(Error::Protocol(format!("portmapper returned out-of-range port {}", p))),
			p => Ok(p as u16),
		}
	}

}

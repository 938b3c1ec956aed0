//! The byte-level link to an instrument.
//!
//! [`Transport`] is the seam between SCPI handling and whatever carries the
//! bytes. [`Vxi11Transport`] speaks VXI-11 to a real instrument and
//! [`mock::MockTransport`] replays scripted replies for tests.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Serialize, Deserialize};

use crate::error::{Error, Result};
use crate::vxi11::DEFAULT_DEVICE;

pub mod mock;
mod vxi11;

pub use self::vxi11::Vxi11Transport;

pub const DEFAULT_TIMEOUT_MS:u64 = 10_000;

lazy_static! {
    static ref RESOURCE_RE: Regex = Regex::new(r"(?i)^TCPIP(\d*)::([^:\s]+)(?:::([^:\s]+))?::INSTR$").unwrap();
    static ref HOST_RE: Regex     = Regex::new(r"^[A-Za-z0-9.\-]+$").unwrap();
}

/// A message-based link to one instrument.
///
/// Writes carry one complete message and reads return one complete reply.
/// Implementations block until the instrument answers or the timeout passes.
pub trait Transport {
    fn write(&mut self, data: &[u8]) -> Result<()>;

    fn read(&mut self) -> Result<Vec<u8>>;

    /// Device clear: drops pending input and output on the instrument side.
    fn clear(&mut self) -> Result<()>;

    fn timeout(&self) -> Duration;

    fn set_timeout(&mut self, timeout: Duration) -> Result<()>;
}

/// A parsed VISA-style address such as `TCPIP0::10.44.11.1::inst0::INSTR`.
///
/// A bare host name is accepted and gets the device `inst0`. HiSLIP addresses
/// such as `TCPIP0::host::hislip0::INSTR` are refused; the same instrument
/// answers VXI-11 on `TCPIP0::host::inst0::INSTR`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resource {
    pub host: String,
    pub device: String,
}

impl FromStr for Resource {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();

        if let Some(caps) = RESOURCE_RE.captures(s) {
            let host = caps.get(2).map(|m| m.as_str().to_owned()).unwrap_or_default();
            let device = caps.get(3).map(|m| m.as_str().to_owned()).unwrap_or_else(|| DEFAULT_DEVICE.to_owned());

            if device.to_ascii_lowercase().starts_with("hislip") {
                return Err(Error::InvalidParameter(format!("{}: HiSLIP is not supported, use a VXI-11 device such as inst0", s)));
            }
            return Ok(Resource { host, device });
        }

        if HOST_RE.is_match(s) {
            return Ok(Resource { host: s.to_owned(), device: DEFAULT_DEVICE.to_owned() });
        }

        Err(Error::InvalidParameter(format!("unrecognized instrument resource {:?}", s)))
    }
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TCPIP0::{}::{}::INSTR", self.host, self.device)
    }
}

fn default_timeout_ms() -> u64 { DEFAULT_TIMEOUT_MS }

/// Where the instrument lives and how long to wait for it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransportConfig {
    pub resource: String,
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

impl TransportConfig {
    pub fn new(resource: &str) -> Self {
        TransportConfig { resource: resource.to_owned(), timeout_ms: DEFAULT_TIMEOUT_MS }
    }

    pub fn timeout(&self) -> Duration { Duration::from_millis(self.timeout_ms) }

    pub fn open(&self) -> Result<Vxi11Transport> {
        let resource: Resource = self.resource.parse()?;
        Vxi11Transport::open(&resource, self.timeout())
    }
}

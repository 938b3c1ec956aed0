use std::time::Duration;

use log::debug;

use crate::error::Result;
use crate::vxi11::CoreClient;
use super::{Resource, Transport};

/// A [`Transport`] over one VXI-11 link; the link is destroyed on drop.
pub struct Vxi11Transport {
    core: CoreClient,
    resource: Resource,
}

impl Vxi11Transport {
    pub fn open(resource: &Resource, timeout: Duration) -> Result<Self> {
        let mut core = CoreClient::new(&resource.host, timeout)?;
        core.create_link(&resource.device)?;
        debug!("opened {} (timeout {:?})", resource, timeout);
        Ok(Vxi11Transport { core, resource: resource.clone() })
    }

    pub fn resource(&self) -> &Resource { &self.resource }
}

impl Transport for Vxi11Transport {
    fn write(&mut self, data: &[u8]) -> Result<()> { self.core.write(data) }

    fn read(&mut self) -> Result<Vec<u8>> { self.core.read() }

    fn clear(&mut self) -> Result<()> { self.core.clear() }

    fn timeout(&self) -> Duration { self.core.timeout() }

    fn set_timeout(&mut self, timeout: Duration) -> Result<()> { self.core.set_timeout(timeout) }
}

//! Fleet façade: the simulated library entry point.

use std::sync::Arc;

use crate::device::MockDevice;
use crate::error::{Error, Result};
use crate::spec::{Generation, GpuSpec, GpuTopologyLevel, TopologyPolicy};
use crate::traits::{Device, Nvml};

/// A chassis of identical simulated devices.
#[derive(Debug, Clone)]
pub struct MockServer {
    spec: Arc<GpuSpec>,
    devices: Vec<MockDevice>,
}

impl MockServer {
    /// Build `spec.device_count` devices from one configuration record.
    pub fn new(spec: GpuSpec) -> Self {
        let spec = Arc::new(spec);
        let devices = (0..spec.device_count)
            .map(|index| MockDevice::new(Arc::clone(&spec), index))
            .collect();

        tracing::info!(
            name = %spec.name,
            devices = spec.device_count,
            profiles = spec.catalog.len(),
            "created mock NVML server"
        );
        Self { spec, devices }
    }

    /// DGX preset of a generation.
    pub fn from_generation(generation: Generation) -> Self {
        Self::new(generation.spec())
    }

    pub fn spec(&self) -> &GpuSpec {
        &self.spec
    }

    /// Devices in index order.
    pub fn devices(&self) -> &[MockDevice] {
        &self.devices
    }
}

impl Default for MockServer {
    fn default() -> Self {
        Self::from_generation(Generation::default())
    }
}

impl Nvml for MockServer {
    type Device = MockDevice;

    fn init(&self) -> Result<()> {
        Ok(())
    }

    fn shutdown(&self) -> Result<()> {
        Ok(())
    }

    fn driver_version(&self) -> Result<String> {
        Ok(self.spec.driver_version.clone())
    }

    fn nvml_version(&self) -> Result<String> {
        Ok(self.spec.nvml_version.clone())
    }

    fn cuda_driver_version(&self) -> Result<i32> {
        Ok(self.spec.cuda_driver_version)
    }

    fn device_count(&self) -> Result<u32> {
        Ok(self.devices.len() as u32)
    }

    fn device_by_index(&self, index: i32) -> Result<MockDevice> {
        usize::try_from(index)
            .ok()
            .and_then(|i| self.devices.get(i))
            .cloned()
            .ok_or_else(|| {
                Error::invalid_argument(format!(
                    "device index {index} not in [0, {})",
                    self.devices.len()
                ))
            })
    }

    fn device_by_uuid(&self, uuid: &str) -> Result<MockDevice> {
        for device in &self.devices {
            if device.uuid()? == uuid {
                return Ok(device.clone());
            }
        }
        tracing::trace!(uuid, "no device with UUID");
        Err(Error::invalid_argument(format!("no device with UUID {uuid}")))
    }

    fn device_by_pci_bus_id(&self, bus_id: &str) -> Result<MockDevice> {
        self.devices
            .iter()
            .find(|device| device.bus_id() == bus_id)
            .cloned()
            .ok_or_else(|| {
                tracing::trace!(bus_id, "no device at PCI bus id");
                Error::invalid_argument(format!("no device at PCI bus id {bus_id}"))
            })
    }

    fn topology_nearest_gpus(
        &self,
        device: &MockDevice,
        _level: GpuTopologyLevel,
    ) -> Result<Vec<MockDevice>> {
        match self.spec.topology {
            TopologyPolicy::Unsupported => Err(Error::not_supported(format!(
                "topology queries on {}",
                self.spec.name
            ))),
            TopologyPolicy::AllOthers => Ok(self
                .devices
                .iter()
                .filter(|other| *other != device)
                .cloned()
                .collect()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_server() {
        let server = MockServer::default();
        assert!(server.init().is_ok());
        assert_eq!(server.device_count().unwrap(), 8);
        assert_eq!(server.driver_version().unwrap(), "550.54.15");
        assert_eq!(server.nvml_version().unwrap(), "12.550.54.15");
        assert_eq!(server.cuda_driver_version().unwrap(), 12040);
        assert!(server.shutdown().is_ok());
    }

    #[test]
    fn test_device_by_index_bounds() {
        let server = MockServer::default();
        assert_eq!(server.device_by_index(7).unwrap().index().unwrap(), 7);
        assert!(matches!(server.device_by_index(-1), Err(Error::InvalidArgument(_))));
        assert!(matches!(server.device_by_index(8), Err(Error::InvalidArgument(_))));
    }

    #[test]
    fn test_lookup_by_identity() {
        let server = MockServer::from_generation(Generation::H100);
        let device = server.device_by_index(2).unwrap();
        let uuid = device.uuid().unwrap();
        assert_eq!(server.device_by_uuid(&uuid).unwrap(), device);
        assert_eq!(server.device_by_pci_bus_id("0000:17:02:00.0").unwrap(), device);
        assert!(matches!(server.device_by_uuid("GPU-missing"), Err(Error::InvalidArgument(_))));
        assert!(matches!(
            server.device_by_pci_bus_id("0000:ff:00.0"),
            Err(Error::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_topology_policy() {
        let a100 = MockServer::default();
        let device = a100.device_by_index(0).unwrap();
        assert!(matches!(
            a100.topology_nearest_gpus(&device, GpuTopologyLevel::System),
            Err(Error::NotSupported(_))
        ));

        let h200 = MockServer::from_generation(Generation::H200);
        let device = h200.device_by_index(3).unwrap();
        let nearest = h200
            .topology_nearest_gpus(&device, GpuTopologyLevel::Single)
            .unwrap();
        assert_eq!(nearest.len(), 7);
        assert!(!nearest.contains(&device));
        let indices: Vec<u32> = nearest.iter().map(|d| d.index().unwrap()).collect();
        assert_eq!(indices, vec![0, 1, 2, 4, 5, 6, 7]);
    }

    #[test]
    fn test_uuids_and_bus_ids_are_unique() {
        let server = MockServer::from_generation(Generation::B200);
        let mut uuids: Vec<String> = server.devices().iter().map(|d| d.uuid().unwrap()).collect();
        uuids.sort();
        uuids.dedup();
        assert_eq!(uuids.len(), 8);
        let bus_ids: Vec<&str> = server.devices().iter().map(|d| d.bus_id()).collect();
        assert_eq!(bus_ids[5], "0000:90:05:00.0");
    }
}

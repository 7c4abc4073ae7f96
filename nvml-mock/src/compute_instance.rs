//! Compute instances: shared-engine slices of a GPU instance.

use std::fmt;
use std::sync::Weak;

use crate::device::{DeviceInner, MockDevice};
use crate::error::{Error, Result};
use crate::gpu_instance::MockGpuInstance;
use crate::profile::{ComputeInstanceProfileInfo, Placement};
use crate::traits::{ComputeInstance, GpuInstance};

/// Snapshot of a compute instance.
#[derive(Debug, Clone, PartialEq)]
pub struct ComputeInstanceInfo {
    pub device: MockDevice,
    pub gpu_instance: MockGpuInstance,
    pub id: u32,
    pub profile_id: i32,
    pub placement: Placement,
    pub profile: ComputeInstanceProfileInfo,
}

/// Handle to a compute instance, addressed by device, parent id and own id.
#[derive(Clone)]
pub struct MockComputeInstance {
    device: Weak<DeviceInner>,
    gpu_instance_id: u32,
    id: u32,
}

impl MockComputeInstance {
    pub(crate) fn new(device: Weak<DeviceInner>, gpu_instance_id: u32, id: u32) -> Self {
        Self {
            device,
            gpu_instance_id,
            id,
        }
    }

    /// Id assigned by the parent GPU instance.
    pub fn id(&self) -> u32 {
        self.id
    }

    /// Id of the parent GPU instance.
    pub fn gpu_instance_id(&self) -> u32 {
        self.gpu_instance_id
    }

    pub(crate) fn device(&self) -> &Weak<DeviceInner> {
        &self.device
    }

    fn parent(&self) -> MockGpuInstance {
        MockGpuInstance::new(self.device.clone(), self.gpu_instance_id)
    }
}

impl ComputeInstance for MockComputeInstance {
    type Info = ComputeInstanceInfo;

    fn info(&self) -> Result<ComputeInstanceInfo> {
        let device = self
            .device
            .upgrade()
            .map(MockDevice::from_inner)
            .ok_or_else(|| Error::not_found(format!("device of compute instance {}", self.id)))?;
        let record = device.slot(self.gpu_instance_id)?.compute_instance(self.id)?;

        Ok(ComputeInstanceInfo {
            device,
            gpu_instance: self.parent(),
            id: self.id,
            profile_id: record.profile.id,
            placement: record.placement,
            profile: record.profile,
        })
    }

    fn destroy(&self) -> Result<()> {
        self.parent().destroy_compute_instance(self)
    }
}

impl PartialEq for MockComputeInstance {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
            && self.gpu_instance_id == other.gpu_instance_id
            && Weak::ptr_eq(&self.device, &other.device)
    }
}

impl Eq for MockComputeInstance {}

impl fmt::Debug for MockComputeInstance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MockComputeInstance")
            .field("gpu_instance_id", &self.gpu_instance_id)
            .field("id", &self.id)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::ids::*;
    use crate::spec::Generation;
    use crate::traits::Device;
    use std::sync::Arc;

    #[test]
    fn test_info_and_destroy() {
        let device = MockDevice::new(Arc::new(Generation::B200.spec()), 0);
        let gi = device.create_gpu_instance(GPU_INSTANCE_PROFILE_7_SLICE).unwrap();
        let placement = Placement::new(4, 3);
        let ci = gi
            .create_compute_instance_with_placement(COMPUTE_INSTANCE_PROFILE_3_SLICE, &placement)
            .unwrap();

        let info = ci.info().unwrap();
        assert_eq!(info.device, device);
        assert_eq!(info.gpu_instance, gi);
        assert_eq!(info.id, 0);
        assert_eq!(info.profile_id, COMPUTE_INSTANCE_PROFILE_3_SLICE);
        assert_eq!(info.placement, placement);
        assert_eq!(info.profile.multiprocessor_count, 78);

        ci.destroy().unwrap();
        assert!(matches!(ci.destroy(), Err(Error::NotFound(_))));
        assert!(matches!(ci.info(), Err(Error::NotFound(_))));
    }

    #[test]
    fn test_listing_filters_by_profile() {
        let device = MockDevice::new(Arc::new(Generation::H100.spec()), 0);
        let gi = device.create_gpu_instance(GPU_INSTANCE_PROFILE_7_SLICE).unwrap();
        let one = gi.create_compute_instance(COMPUTE_INSTANCE_PROFILE_1_SLICE).unwrap();
        gi.create_compute_instance(COMPUTE_INSTANCE_PROFILE_3_SLICE).unwrap();

        let listed = gi.compute_instances(COMPUTE_INSTANCE_PROFILE_1_SLICE).unwrap();
        assert_eq!(listed, vec![one.clone()]);
        assert_eq!(gi.compute_instance_by_id(one.id()).unwrap(), one);
    }
}

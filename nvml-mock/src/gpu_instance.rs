//! GPU instances: hardware-isolated slices of a device.

use parking_lot::RwLock;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::{Arc, Weak};

use crate::compute_instance::MockComputeInstance;
use crate::device::{DeviceInner, MockDevice};
use crate::error::{Error, Result};
use crate::profile::ids::COMPUTE_INSTANCE_ENGINE_PROFILE_SHARED;
use crate::profile::{ComputeInstanceProfileInfo, GpuInstanceProfileInfo, Placement};
use crate::traits::{Device, GpuInstance};

/// Per-instance record stored in the device table.
pub(crate) struct GpuInstanceSlot {
    id: u32,
    profile: GpuInstanceProfileInfo,
    placement: Placement,
    state: RwLock<SlotState>,
}

struct SlotState {
    compute_instances: BTreeMap<u32, ComputeInstanceRecord>,
    next_compute_instance_id: u32,
    fabric_partition_id: i32,
    retired: bool,
}

#[derive(Debug, Clone, Copy)]
pub(crate) struct ComputeInstanceRecord {
    pub(crate) profile: ComputeInstanceProfileInfo,
    pub(crate) placement: Placement,
}

impl GpuInstanceSlot {
    pub(crate) fn new(
        id: u32,
        profile: GpuInstanceProfileInfo,
        placement: Placement,
        fabric_partition_id: i32,
    ) -> Self {
        Self {
            id,
            profile,
            placement,
            state: RwLock::new(SlotState {
                compute_instances: BTreeMap::new(),
                next_compute_instance_id: 0,
                fabric_partition_id,
                retired: false,
            }),
        }
    }

    pub(crate) fn id(&self) -> u32 {
        self.id
    }

    pub(crate) fn profile_id(&self) -> i32 {
        self.profile.id
    }

    pub(crate) fn placement(&self) -> Placement {
        self.placement
    }

    /// Mark the slot destroyed and drop its compute instances.
    ///
    /// Returns how many compute instances were released.
    pub(crate) fn retire(&self) -> usize {
        let mut state = self.state.write();
        state.retired = true;
        let released = state.compute_instances.len();
        state.compute_instances.clear();
        released
    }

    pub(crate) fn compute_instance(&self, id: u32) -> Result<ComputeInstanceRecord> {
        let state = self.state.read();
        if state.retired {
            return Err(self.gone());
        }
        state
            .compute_instances
            .get(&id)
            .copied()
            .ok_or_else(|| {
                Error::not_found(format!("compute instance {id} in GPU instance {}", self.id))
            })
    }

    fn gone(&self) -> Error {
        Error::not_found(format!("GPU instance {} has been destroyed", self.id))
    }
}

/// Snapshot of a GPU instance.
#[derive(Debug, Clone, PartialEq)]
pub struct GpuInstanceInfo {
    pub device: MockDevice,
    pub id: u32,
    pub profile_id: i32,
    pub placement: Placement,
}

/// Handle to a GPU instance.
///
/// Holds a weak device reference and the assigned id; every call resolves
/// the instance afresh and fails with `NotFound` once it is destroyed.
#[derive(Clone)]
pub struct MockGpuInstance {
    device: Weak<DeviceInner>,
    id: u32,
}

impl MockGpuInstance {
    pub(crate) fn new(device: Weak<DeviceInner>, id: u32) -> Self {
        Self { device, id }
    }

    /// Id assigned by the parent device.
    pub fn id(&self) -> u32 {
        self.id
    }

    pub(crate) fn device(&self) -> &Weak<DeviceInner> {
        &self.device
    }

    /// Fabric partition this instance belongs to.
    ///
    /// Inherited from the device when the instance was created.
    pub fn fabric_partition_id(&self) -> Result<i32> {
        let (_, slot) = self.resolve()?;
        let state = slot.state.read();
        if state.retired {
            return Err(slot.gone());
        }
        Ok(state.fabric_partition_id)
    }

    pub fn set_fabric_partition_id(&self, partition_id: i32) -> Result<()> {
        let (_, slot) = self.resolve()?;
        let mut state = slot.state.write();
        if state.retired {
            return Err(slot.gone());
        }
        state.fabric_partition_id = partition_id;
        Ok(())
    }

    fn parent(&self) -> Result<MockDevice> {
        self.device
            .upgrade()
            .map(MockDevice::from_inner)
            .ok_or_else(|| Error::not_found(format!("device of GPU instance {}", self.id)))
    }

    fn resolve(&self) -> Result<(MockDevice, Arc<GpuInstanceSlot>)> {
        let device = self.parent()?;
        let slot = device.slot(self.id)?;
        Ok((device, slot))
    }

    fn insert_compute_instance(
        &self,
        profile_id: i32,
        placement: Placement,
    ) -> Result<MockComputeInstance> {
        let (device, slot) = self.resolve()?;
        let profile = device.catalog().compute_instance_profile(
            slot.profile_id(),
            profile_id,
            COMPUTE_INSTANCE_ENGINE_PROFILE_SHARED,
        )?;

        let id = {
            let mut state = slot.state.write();
            if state.retired {
                return Err(slot.gone());
            }
            let id = state.next_compute_instance_id;
            state.next_compute_instance_id += 1;
            state
                .compute_instances
                .insert(id, ComputeInstanceRecord { profile, placement });
            id
        };

        tracing::debug!(
            device = device.index().unwrap_or_default(),
            gpu_instance = self.id,
            compute_instance = id,
            profile = profile_id,
            placement = %placement,
            "created compute instance"
        );
        Ok(MockComputeInstance::new(self.device.clone(), self.id, id))
    }
}

impl GpuInstance for MockGpuInstance {
    type ComputeInstance = MockComputeInstance;
    type Info = GpuInstanceInfo;

    fn info(&self) -> Result<GpuInstanceInfo> {
        let (device, slot) = self.resolve()?;
        Ok(GpuInstanceInfo {
            device,
            id: slot.id(),
            profile_id: slot.profile_id(),
            placement: slot.placement(),
        })
    }

    fn compute_instance_profile_info(
        &self,
        profile_id: i32,
        engine_profile: i32,
    ) -> Result<ComputeInstanceProfileInfo> {
        let (device, slot) = self.resolve()?;
        device
            .catalog()
            .compute_instance_profile(slot.profile_id(), profile_id, engine_profile)
    }

    fn compute_instance_possible_placements(&self, profile_id: i32) -> Result<Vec<Placement>> {
        let (device, slot) = self.resolve()?;
        device
            .catalog()
            .compute_instance_placements(slot.profile_id(), profile_id)
    }

    fn create_compute_instance(&self, profile_id: i32) -> Result<MockComputeInstance> {
        self.insert_compute_instance(profile_id, Placement::default())
    }

    fn create_compute_instance_with_placement(
        &self,
        profile_id: i32,
        placement: &Placement,
    ) -> Result<MockComputeInstance> {
        self.insert_compute_instance(profile_id, *placement)
    }

    fn compute_instances(&self, profile_id: i32) -> Result<Vec<MockComputeInstance>> {
        let (device, slot) = self.resolve()?;
        device.catalog().compute_instance_profile(
            slot.profile_id(),
            profile_id,
            COMPUTE_INSTANCE_ENGINE_PROFILE_SHARED,
        )?;

        let state = slot.state.read();
        if state.retired {
            return Err(slot.gone());
        }
        Ok(state
            .compute_instances
            .iter()
            .filter(|(_, record)| record.profile.id == profile_id)
            .map(|(&id, _)| MockComputeInstance::new(self.device.clone(), self.id, id))
            .collect())
    }

    fn compute_instance_by_id(&self, id: u32) -> Result<MockComputeInstance> {
        let (_, slot) = self.resolve()?;
        slot.compute_instance(id)?;
        Ok(MockComputeInstance::new(self.device.clone(), self.id, id))
    }

    fn destroy_compute_instance(&self, instance: &MockComputeInstance) -> Result<()> {
        let id = instance.id();
        if !Weak::ptr_eq(&self.device, instance.device()) || instance.gpu_instance_id() != self.id {
            return Err(Error::not_found(format!(
                "compute instance {id} does not belong to GPU instance {}",
                self.id
            )));
        }

        let (_, slot) = self.resolve()?;
        {
            let mut state = slot.state.write();
            if state.retired {
                return Err(slot.gone());
            }
            state.compute_instances.remove(&id).ok_or_else(|| {
                Error::not_found(format!("compute instance {id} in GPU instance {}", self.id))
            })?;
        }

        tracing::debug!(
            gpu_instance = self.id,
            compute_instance = id,
            "destroyed compute instance"
        );
        Ok(())
    }

    fn destroy(&self) -> Result<()> {
        self.parent()?.destroy_gpu_instance(self)
    }
}

impl PartialEq for MockGpuInstance {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id && Weak::ptr_eq(&self.device, &other.device)
    }
}

impl Eq for MockGpuInstance {}

impl fmt::Debug for MockGpuInstance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MockGpuInstance")
            .field("id", &self.id)
            .finish_non_exhaustive()
    }
}

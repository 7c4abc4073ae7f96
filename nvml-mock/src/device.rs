//! Simulated physical device.
//!
//! A device owns a table of live GPU instances keyed by assigned id. GPU
//! instance handles hold only a weak device reference plus that id and
//! re-resolve on every call, so a destroyed instance is observed as
//! `NotFound` rather than as a dangling object.

use parking_lot::RwLock;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::{Arc, Weak};

use crate::error::{Error, Result};
use crate::gpu_instance::{GpuInstanceSlot, MockGpuInstance};
use crate::identity;
use crate::profile::{GpuInstanceProfileInfo, Placement, ProfileCatalog};
use crate::spec::{Architecture, Brand, GpuSpec, MigMode};
use crate::traits::{Device, MemoryInfo, PciInfo};

/// Fabric partition id of a device or GPU instance outside any partition.
pub const NO_FABRIC_PARTITION: i32 = -1;

pub(crate) struct DeviceInner {
    spec: Arc<GpuSpec>,
    index: u32,
    uuid: String,
    bus_id: String,
    state: RwLock<DeviceState>,
}

struct DeviceState {
    mig_mode: MigMode,
    gpu_instances: BTreeMap<u32, Arc<GpuInstanceSlot>>,
    next_gpu_instance_id: u32,
    fabric_partition_id: i32,
}

/// Handle to one simulated accelerator.
///
/// Clones refer to the same device; equality is identity.
#[derive(Clone)]
pub struct MockDevice {
    inner: Arc<DeviceInner>,
}

impl MockDevice {
    /// Create the device at `index` of a fleet built from `spec`.
    pub fn new(spec: Arc<GpuSpec>, index: u32) -> Self {
        let uuid = identity::gpu_uuid();
        let bus_id = identity::pci_bus_id(spec.pci_bus_layout, index);
        let mig_mode = spec.mig_mode;
        Self {
            inner: Arc::new(DeviceInner {
                spec,
                index,
                uuid,
                bus_id,
                state: RwLock::new(DeviceState {
                    mig_mode,
                    gpu_instances: BTreeMap::new(),
                    next_gpu_instance_id: 0,
                    fabric_partition_id: NO_FABRIC_PARTITION,
                }),
            }),
        }
    }

    pub(crate) fn from_inner(inner: Arc<DeviceInner>) -> Self {
        Self { inner }
    }

    pub(crate) fn downgrade(&self) -> Weak<DeviceInner> {
        Arc::downgrade(&self.inner)
    }

    pub(crate) fn is(&self, device: &Weak<DeviceInner>) -> bool {
        std::ptr::eq(device.as_ptr(), Arc::as_ptr(&self.inner))
    }

    /// Live slot for a GPU instance id. The device lock is released on return.
    pub(crate) fn slot(&self, id: u32) -> Result<Arc<GpuInstanceSlot>> {
        self.inner
            .state
            .read()
            .gpu_instances
            .get(&id)
            .cloned()
            .ok_or_else(|| {
                Error::not_found(format!(
                    "GPU instance {id} on device {}",
                    self.inner.index
                ))
            })
    }

    /// Static configuration this device was built from.
    pub fn spec(&self) -> &GpuSpec {
        &self.inner.spec
    }

    pub fn catalog(&self) -> &ProfileCatalog {
        &self.inner.spec.catalog
    }

    /// PCI bus address.
    pub fn bus_id(&self) -> &str {
        &self.inner.bus_id
    }

    /// Number of live GPU instances across all profiles.
    pub fn gpu_instance_count(&self) -> usize {
        self.inner.state.read().gpu_instances.len()
    }

    /// Placements held by live GPU instances, in instance id order.
    ///
    /// Instances created without a placement report an empty window.
    pub fn occupied_placements(&self) -> Vec<Placement> {
        self.inner
            .state
            .read()
            .gpu_instances
            .values()
            .map(|slot| slot.placement())
            .collect()
    }

    /// Whether the device takes part in fabric manager partitions.
    pub fn is_fabric_manager_enabled(&self) -> bool {
        self.inner.spec.fabric_manager
    }

    /// Fabric partition the device belongs to, or [`NO_FABRIC_PARTITION`].
    pub fn fabric_partition_id(&self) -> i32 {
        self.inner.state.read().fabric_partition_id
    }

    /// Move the device to another fabric partition.
    ///
    /// GPU instances keep the partition they were created in.
    pub fn set_fabric_partition_id(&self, partition_id: i32) {
        self.inner.state.write().fabric_partition_id = partition_id;
        tracing::debug!(
            device = self.inner.index,
            fabric_partition = partition_id,
            "set fabric partition"
        );
    }

    fn insert_gpu_instance(
        &self,
        profile_id: i32,
        placement: Placement,
    ) -> Result<MockGpuInstance> {
        let profile = self.catalog().gpu_instance_profile(profile_id)?;

        let id = {
            let mut state = self.inner.state.write();
            let id = state.next_gpu_instance_id;
            state.next_gpu_instance_id += 1;
            let slot = GpuInstanceSlot::new(id, profile, placement, state.fabric_partition_id);
            state.gpu_instances.insert(id, Arc::new(slot));
            id
        };

        tracing::debug!(
            device = self.inner.index,
            gpu_instance = id,
            profile = profile_id,
            placement = %placement,
            "created GPU instance"
        );
        Ok(MockGpuInstance::new(self.downgrade(), id))
    }
}

impl Device for MockDevice {
    type GpuInstance = MockGpuInstance;

    fn uuid(&self) -> Result<String> {
        Ok(self.inner.uuid.clone())
    }

    fn name(&self) -> Result<String> {
        Ok(self.inner.spec.name.clone())
    }

    fn brand(&self) -> Result<Brand> {
        Ok(self.inner.spec.brand)
    }

    fn architecture(&self) -> Result<Architecture> {
        Ok(self.inner.spec.architecture)
    }

    fn memory_info(&self) -> Result<MemoryInfo> {
        let total = self.inner.spec.total_memory_bytes();
        Ok(MemoryInfo {
            total,
            free: total,
            used: 0,
        })
    }

    fn pci_info(&self) -> Result<PciInfo> {
        Ok(PciInfo {
            bus_id: self.inner.bus_id.clone(),
            device_id: self.inner.spec.pci_device_id,
        })
    }

    fn index(&self) -> Result<u32> {
        Ok(self.inner.index)
    }

    fn minor_number(&self) -> Result<u32> {
        Ok(self.inner.index)
    }

    fn cuda_compute_capability(&self) -> Result<(i32, i32)> {
        Ok(self.inner.spec.cuda_capability)
    }

    fn set_mig_mode(&self, mode: MigMode) -> Result<(MigMode, MigMode)> {
        self.inner.state.write().mig_mode = mode;
        tracing::debug!(device = self.inner.index, mode = %mode, "set MIG mode");
        Ok((mode, mode))
    }

    fn mig_mode(&self) -> Result<(MigMode, MigMode)> {
        let mode = self.inner.state.read().mig_mode;
        Ok((mode, mode))
    }

    fn gpu_instance_profile_info(&self, profile_id: i32) -> Result<GpuInstanceProfileInfo> {
        self.catalog().gpu_instance_profile(profile_id)
    }

    fn gpu_instance_possible_placements(&self, profile_id: i32) -> Result<Vec<Placement>> {
        self.catalog().gpu_instance_placements(profile_id)
    }

    fn create_gpu_instance(&self, profile_id: i32) -> Result<MockGpuInstance> {
        self.insert_gpu_instance(profile_id, Placement::default())
    }

    fn create_gpu_instance_with_placement(
        &self,
        profile_id: i32,
        placement: &Placement,
    ) -> Result<MockGpuInstance> {
        self.insert_gpu_instance(profile_id, *placement)
    }

    fn gpu_instances(&self, profile_id: i32) -> Result<Vec<MockGpuInstance>> {
        self.catalog().gpu_instance_profile(profile_id)?;
        let state = self.inner.state.read();
        Ok(state
            .gpu_instances
            .values()
            .filter(|slot| slot.profile_id() == profile_id)
            .map(|slot| MockGpuInstance::new(self.downgrade(), slot.id()))
            .collect())
    }

    fn gpu_instance_by_id(&self, id: u32) -> Result<MockGpuInstance> {
        self.slot(id)?;
        Ok(MockGpuInstance::new(self.downgrade(), id))
    }

    fn destroy_gpu_instance(&self, instance: &MockGpuInstance) -> Result<()> {
        let id = instance.id();
        if !self.is(instance.device()) {
            return Err(Error::not_found(format!(
                "GPU instance {id} does not belong to device {}",
                self.inner.index
            )));
        }

        let slot = self
            .inner
            .state
            .write()
            .gpu_instances
            .remove(&id)
            .ok_or_else(|| {
                Error::not_found(format!("GPU instance {id} on device {}", self.inner.index))
            })?;

        // Device lock is already released; compute instances go with their parent.
        let released = slot.retire();
        tracing::debug!(
            device = self.inner.index,
            gpu_instance = id,
            compute_instances = released,
            "destroyed GPU instance"
        );
        Ok(())
    }
}

impl PartialEq for MockDevice {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl Eq for MockDevice {}

impl fmt::Debug for MockDevice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MockDevice")
            .field("index", &self.inner.index)
            .field("uuid", &self.inner.uuid)
            .field("bus_id", &self.inner.bus_id)
            .finish()
    }
}

impl fmt::Display for MockDevice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} [{}] ({})",
            self.inner.spec.name, self.inner.index, self.inner.uuid
        )
    }
}

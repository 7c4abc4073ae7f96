//! Capability traits, one per NVML object role.
//!
//! Code under test is written against these traits; the mock types in
//! this crate implement them for every generation, driven by the
//! generation's [`GpuSpec`](crate::GpuSpec).

use crate::error::Result;
use crate::profile::{ComputeInstanceProfileInfo, GpuInstanceProfileInfo, Placement};
use crate::spec::{Architecture, Brand, GpuTopologyLevel, MigMode};

/// Framebuffer usage in bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MemoryInfo {
    pub total: u64,
    pub free: u64,
    pub used: u64,
}

/// PCI identity of a device.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PciInfo {
    /// Bus address, e.g. `0000:17:03:00.0`.
    pub bus_id: String,
    pub device_id: u32,
}

/// A physical accelerator.
pub trait Device: Clone + Send + Sync {
    type GpuInstance: GpuInstance;

    fn uuid(&self) -> Result<String>;
    fn name(&self) -> Result<String>;
    fn brand(&self) -> Result<Brand>;
    fn architecture(&self) -> Result<Architecture>;
    fn memory_info(&self) -> Result<MemoryInfo>;
    fn pci_info(&self) -> Result<PciInfo>;
    fn index(&self) -> Result<u32>;
    fn minor_number(&self) -> Result<u32>;
    fn cuda_compute_capability(&self) -> Result<(i32, i32)>;

    /// Set MIG mode, returning `(current, pending)`.
    fn set_mig_mode(&self, mode: MigMode) -> Result<(MigMode, MigMode)>;
    /// Current and pending MIG mode.
    fn mig_mode(&self) -> Result<(MigMode, MigMode)>;

    fn gpu_instance_profile_info(&self, profile_id: i32) -> Result<GpuInstanceProfileInfo>;
    fn gpu_instance_possible_placements(&self, profile_id: i32) -> Result<Vec<Placement>>;
    fn create_gpu_instance(&self, profile_id: i32) -> Result<Self::GpuInstance>;
    fn create_gpu_instance_with_placement(
        &self,
        profile_id: i32,
        placement: &Placement,
    ) -> Result<Self::GpuInstance>;
    /// Live GPU instances of one profile.
    fn gpu_instances(&self, profile_id: i32) -> Result<Vec<Self::GpuInstance>>;
    fn gpu_instance_by_id(&self, id: u32) -> Result<Self::GpuInstance>;
    fn destroy_gpu_instance(&self, instance: &Self::GpuInstance) -> Result<()>;
}

/// A hardware-isolated slice of a device.
pub trait GpuInstance: Clone + Send + Sync {
    type ComputeInstance: ComputeInstance;
    type Info;

    fn info(&self) -> Result<Self::Info>;
    fn compute_instance_profile_info(
        &self,
        profile_id: i32,
        engine_profile: i32,
    ) -> Result<ComputeInstanceProfileInfo>;
    fn compute_instance_possible_placements(&self, profile_id: i32) -> Result<Vec<Placement>>;
    fn create_compute_instance(&self, profile_id: i32) -> Result<Self::ComputeInstance>;
    fn create_compute_instance_with_placement(
        &self,
        profile_id: i32,
        placement: &Placement,
    ) -> Result<Self::ComputeInstance>;
    fn compute_instances(&self, profile_id: i32) -> Result<Vec<Self::ComputeInstance>>;
    fn compute_instance_by_id(&self, id: u32) -> Result<Self::ComputeInstance>;
    fn destroy_compute_instance(&self, instance: &Self::ComputeInstance) -> Result<()>;
    /// Remove this instance from its device.
    fn destroy(&self) -> Result<()>;
}

/// A shared-engine slice of a GPU instance.
pub trait ComputeInstance: Clone + Send + Sync {
    type Info;

    fn info(&self) -> Result<Self::Info>;
    fn destroy(&self) -> Result<()>;
}

/// Library entry point: a fleet of devices.
pub trait Nvml: Send + Sync {
    type Device: Device;

    fn init(&self) -> Result<()>;
    fn shutdown(&self) -> Result<()>;
    fn driver_version(&self) -> Result<String>;
    fn nvml_version(&self) -> Result<String>;
    fn cuda_driver_version(&self) -> Result<i32>;
    fn device_count(&self) -> Result<u32>;
    fn device_by_index(&self, index: i32) -> Result<Self::Device>;
    fn device_by_uuid(&self, uuid: &str) -> Result<Self::Device>;
    fn device_by_pci_bus_id(&self, bus_id: &str) -> Result<Self::Device>;
    fn topology_nearest_gpus(
        &self,
        device: &Self::Device,
        level: GpuTopologyLevel,
    ) -> Result<Vec<Self::Device>>;
}

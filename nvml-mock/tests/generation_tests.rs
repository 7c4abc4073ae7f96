//! Integration tests for the per-generation presets.

use nvml_mock::profile::ids::*;
use nvml_mock::{
    Architecture, Brand, Device, Generation, GpuInstance, GpuTopologyLevel, MigMode, MockServer,
    Nvml, NO_FABRIC_PARTITION,
};

/// Per-generation identity, independent of the fleet façade.
fn check_identity<D: Device>(
    device: &D,
    name: &str,
    architecture: Architecture,
    brand: Brand,
    capability: (i32, i32),
    pci_device_id: u32,
) {
    assert_eq!(device.name().unwrap(), name);
    assert_eq!(device.architecture().unwrap(), architecture);
    assert_eq!(device.brand().unwrap(), brand);
    assert_eq!(device.cuda_compute_capability().unwrap(), capability);
    assert_eq!(device.pci_info().unwrap().device_id, pci_device_id);
}

#[test]
fn test_preset_identities() {
    use Architecture::{Ampere, Blackwell, Hopper};

    let cases = [
        (Generation::A100, "NVIDIA A100-SXM4-40GB", Ampere, Brand::Nvidia, (8, 0), 0x20B0),
        (Generation::H100, "NVIDIA H100 80GB HBM3", Hopper, Brand::Nvidia, (9, 0), 0x2330),
        (Generation::H200, "NVIDIA H200 141GB HBM3e", Hopper, Brand::Nvidia, (9, 0), 0x2339),
        (Generation::B200, "NVIDIA B200-SXM6-192GB", Blackwell, Brand::Tesla, (10, 0), 0x2901),
    ];

    for (generation, name, architecture, brand, capability, pci_device_id) in cases {
        let server = MockServer::from_generation(generation);
        assert_eq!(server.device_count().unwrap(), 8);
        for device in server.devices() {
            check_identity(device, name, architecture, brand, capability, pci_device_id);
        }
    }
}

#[test]
fn test_every_catalog_is_closed() {
    for generation in Generation::ALL {
        let spec = generation.spec();
        let catalog = &spec.catalog;
        assert!(catalog.validate().is_ok(), "{generation}");

        for info in catalog.gpu_instance_profiles() {
            let id = info.id;
            let placements = catalog.gpu_instance_placements(id).unwrap();
            assert!(!placements.is_empty(), "{generation} profile {id}");
            assert!(placements.iter().all(|p| p.end() <= catalog.slot_width()));
        }
    }
}

#[test]
fn test_full_instance_multiprocessors() {
    let expected = [
        (Generation::A100, 98),
        (Generation::H100, 112),
        (Generation::H200, 112),
        (Generation::B200, 182),
    ];
    for (generation, sm) in expected {
        let server = MockServer::from_generation(generation);
        let device = server.device_by_index(0).unwrap();
        let info = device.gpu_instance_profile_info(GPU_INSTANCE_PROFILE_7_SLICE).unwrap();
        assert_eq!(info.multiprocessor_count, sm, "{generation}");
        assert_eq!(info.slice_count, 7);
    }
}

#[test]
fn test_hopper_only_shapes() {
    for generation in Generation::ALL {
        let server = MockServer::from_generation(generation);
        let device = server.device_by_index(0).unwrap();
        let has_eight = device.gpu_instance_profile_info(GPU_INSTANCE_PROFILE_8_SLICE).is_ok();
        assert_eq!(
            has_eight,
            matches!(generation, Generation::H100 | Generation::H200),
            "{generation}"
        );
    }
}

#[test]
fn test_memory_reported_in_bytes() {
    let server = MockServer::from_generation(Generation::H100);
    let memory = server.device_by_index(0).unwrap().memory_info().unwrap();
    assert_eq!(memory.total, 81920 * 1024 * 1024);
    assert_eq!(memory.free, memory.total);
    assert_eq!(memory.used, 0);
}

#[test]
fn test_h200_starts_in_mig_mode() {
    let server = MockServer::from_generation(Generation::H200);
    let device = server.device_by_index(0).unwrap();
    assert_eq!(device.mig_mode().unwrap().0, MigMode::Enabled);

    let nearest = server
        .topology_nearest_gpus(&device, GpuTopologyLevel::System)
        .unwrap();
    assert_eq!(nearest.len(), 7);
}

#[test]
fn test_h200_fabric_partitions() {
    let server = MockServer::from_generation(Generation::H200);
    let device = server.device_by_index(2).unwrap();
    assert!(device.is_fabric_manager_enabled());

    device.set_fabric_partition_id(1);
    let gi = device.create_gpu_instance(GPU_INSTANCE_PROFILE_2_SLICE).unwrap();
    device.set_fabric_partition_id(4);

    assert_eq!(gi.fabric_partition_id().unwrap(), 1);
    assert_eq!(device.fabric_partition_id(), 4);
    // Other devices are untouched.
    let other = server.device_by_index(3).unwrap();
    assert_eq!(other.fabric_partition_id(), NO_FABRIC_PARTITION);
    gi.destroy().unwrap();
}

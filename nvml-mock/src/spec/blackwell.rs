//! NVIDIA B200 (Blackwell) preset.
//!
//! B200 publishes seven MIG shapes, all with peer-to-peer access.

use std::sync::Arc;

use super::{
    build_catalog, Architecture, Brand, GpuSpec, Media, MigMode, PciBusLayout, Shape,
    TopologyPolicy, DEFAULT_CUDA_DRIVER_VERSION, DEFAULT_DRIVER_VERSION, DEFAULT_NVML_VERSION,
    DGX_DEVICE_COUNT,
};
use crate::profile::{ids::*, windows, Placement, ProfileCatalog};

pub const B200_NAME: &str = "NVIDIA B200-SXM6-192GB";
pub const B200_PCI_DEVICE_ID: u32 = 0x2901;
pub const B200_TOTAL_MEMORY_MB: u64 = 196608;
const B200_SM_PER_SLICE: u32 = 26;

/// MIG profiles of the B200.
pub fn b200_catalog() -> ProfileCatalog {
    let media = Media::new(1, 0, 1, 0);
    let with_ofa = Media::new(1, 0, 1, 1);

    let shapes = vec![
        // 1g.23gb
        Shape {
            id: GPU_INSTANCE_PROFILE_1_SLICE,
            slices: 1,
            instances: 7,
            memory_mb: 23552,
            media,
            placements: windows(1, 7, 1),
            compute: &[1],
        },
        // 1g.23gb+me
        Shape {
            id: GPU_INSTANCE_PROFILE_1_SLICE_ALL_ME,
            slices: 1,
            instances: 1,
            memory_mb: 23552,
            media: with_ofa,
            placements: vec![Placement::new(0, 1)],
            compute: &[1],
        },
        // 1g.45gb
        Shape {
            id: GPU_INSTANCE_PROFILE_1_SLICE_REV2,
            slices: 1,
            instances: 4,
            memory_mb: 46080,
            media,
            placements: windows(2, 4, 2),
            compute: &[1],
        },
        Shape {
            id: GPU_INSTANCE_PROFILE_2_SLICE,
            slices: 2,
            instances: 3,
            memory_mb: 46080,
            media,
            placements: windows(2, 3, 2),
            compute: &[1, 2],
        },
        Shape {
            id: GPU_INSTANCE_PROFILE_3_SLICE,
            slices: 3,
            instances: 2,
            memory_mb: 92160,
            media,
            placements: windows(4, 2, 4),
            compute: &[1, 3],
        },
        Shape {
            id: GPU_INSTANCE_PROFILE_4_SLICE,
            slices: 4,
            instances: 1,
            memory_mb: 92160,
            media,
            placements: vec![Placement::new(0, 4)],
            compute: &[1, 2, 4],
        },
        Shape {
            id: GPU_INSTANCE_PROFILE_7_SLICE,
            slices: 7,
            instances: 1,
            memory_mb: 184320,
            media: with_ofa,
            placements: vec![Placement::new(0, 8)],
            compute: &[1, 2, 3, 4, 7],
        },
    ];
    build_catalog(shapes, B200_SM_PER_SLICE, true)
}

/// DGX B200: eight B200s behind bus 0x90.
pub fn dgx_b200() -> GpuSpec {
    GpuSpec {
        name: B200_NAME.to_string(),
        architecture: Architecture::Blackwell,
        brand: Brand::Tesla,
        pci_device_id: B200_PCI_DEVICE_ID,
        pci_bus_layout: PciBusLayout::Segmented { bus: 0x90 },
        driver_version: DEFAULT_DRIVER_VERSION.to_string(),
        nvml_version: DEFAULT_NVML_VERSION.to_string(),
        cuda_driver_version: DEFAULT_CUDA_DRIVER_VERSION,
        cuda_capability: (10, 0),
        total_memory_mb: B200_TOTAL_MEMORY_MB,
        device_count: DGX_DEVICE_COUNT,
        mig_mode: MigMode::Disabled,
        topology: TopologyPolicy::Unsupported,
        fabric_manager: false,
        catalog: Arc::new(b200_catalog()),
    }
}

//! NVIDIA A100 (Ampere) preset.

use std::sync::Arc;

use super::{
    build_catalog, standard_compute_sizes, Architecture, Brand, GpuSpec, Media, MigMode,
    PciBusLayout, Shape, TopologyPolicy, DEFAULT_CUDA_DRIVER_VERSION, DEFAULT_DRIVER_VERSION,
    DEFAULT_NVML_VERSION, DGX_DEVICE_COUNT,
};
use crate::profile::{ids::*, windows, Placement, ProfileCatalog};

pub const A100_NAME: &str = "NVIDIA A100-SXM4-40GB";
pub const A100_PCI_DEVICE_ID: u32 = 0x20B0;
pub const A100_TOTAL_MEMORY_MB: u64 = 40960;
const A100_SM_PER_SLICE: u32 = 14;

/// MIG profiles of the 40GB A100.
pub fn a100_catalog() -> ProfileCatalog {
    let shapes = vec![
        Shape {
            id: GPU_INSTANCE_PROFILE_1_SLICE,
            slices: 1,
            instances: 7,
            memory_mb: 4864,
            media: Media::NONE,
            placements: windows(1, 7, 1),
            compute: standard_compute_sizes(1),
        },
        // 1g.5gb+me
        Shape {
            id: GPU_INSTANCE_PROFILE_1_SLICE_REV1,
            slices: 1,
            instances: 1,
            memory_mb: 4864,
            media: Media::new(1, 0, 1, 1),
            placements: windows(1, 7, 1),
            compute: standard_compute_sizes(1),
        },
        // 1g.10gb
        Shape {
            id: GPU_INSTANCE_PROFILE_1_SLICE_REV2,
            slices: 1,
            instances: 4,
            memory_mb: 9856,
            media: Media::new(1, 0, 0, 0),
            placements: windows(2, 4, 2),
            compute: standard_compute_sizes(1),
        },
        Shape {
            id: GPU_INSTANCE_PROFILE_2_SLICE,
            slices: 2,
            instances: 3,
            memory_mb: 9856,
            media: Media::new(1, 0, 0, 0),
            placements: windows(2, 3, 2),
            compute: standard_compute_sizes(2),
        },
        Shape {
            id: GPU_INSTANCE_PROFILE_3_SLICE,
            slices: 3,
            instances: 2,
            memory_mb: 19968,
            media: Media::new(2, 0, 0, 0),
            placements: windows(4, 2, 4),
            compute: standard_compute_sizes(3),
        },
        Shape {
            id: GPU_INSTANCE_PROFILE_4_SLICE,
            slices: 4,
            instances: 1,
            memory_mb: 19968,
            media: Media::new(2, 0, 0, 0),
            placements: vec![Placement::new(0, 4)],
            compute: standard_compute_sizes(4),
        },
        Shape {
            id: GPU_INSTANCE_PROFILE_7_SLICE,
            slices: 7,
            instances: 1,
            memory_mb: 40192,
            media: Media::new(5, 0, 1, 1),
            placements: vec![Placement::new(0, 8)],
            compute: standard_compute_sizes(7),
        },
    ];
    build_catalog(shapes, A100_SM_PER_SLICE, false)
}

/// DGX A100: eight 40GB A100s.
pub fn dgx_a100() -> GpuSpec {
    GpuSpec {
        name: A100_NAME.to_string(),
        architecture: Architecture::Ampere,
        brand: Brand::Nvidia,
        pci_device_id: A100_PCI_DEVICE_ID,
        pci_bus_layout: PciBusLayout::Flat,
        driver_version: DEFAULT_DRIVER_VERSION.to_string(),
        nvml_version: DEFAULT_NVML_VERSION.to_string(),
        cuda_driver_version: DEFAULT_CUDA_DRIVER_VERSION,
        cuda_capability: (8, 0),
        total_memory_mb: A100_TOTAL_MEMORY_MB,
        device_count: DGX_DEVICE_COUNT,
        mig_mode: MigMode::Disabled,
        topology: TopologyPolicy::Unsupported,
        fabric_manager: false,
        catalog: Arc::new(a100_catalog()),
    }
}

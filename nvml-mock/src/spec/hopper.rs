//! NVIDIA H100 and H200 (Hopper) presets.
//!
//! Both parts expose the same seventeen MIG shapes with the same placements
//! and engine counts; only framebuffer shares differ.

use std::sync::Arc;

use super::{
    build_catalog, standard_compute_sizes, Architecture, Brand, GpuSpec, Media, MigMode,
    PciBusLayout, Shape, TopologyPolicy, DEFAULT_CUDA_DRIVER_VERSION, DEFAULT_DRIVER_VERSION,
    DEFAULT_NVML_VERSION, DGX_DEVICE_COUNT,
};
use crate::profile::{ids::*, windows, Placement, ProfileCatalog};

pub const H100_NAME: &str = "NVIDIA H100 80GB HBM3";
pub const H100_PCI_DEVICE_ID: u32 = 0x2330;
pub const H100_TOTAL_MEMORY_MB: u64 = 81920;

pub const H200_NAME: &str = "NVIDIA H200 141GB HBM3e";
pub const H200_PCI_DEVICE_ID: u32 = 0x2339;
pub const H200_TOTAL_MEMORY_MB: u64 = 144384;

const HOPPER_SM_PER_SLICE: u32 = 16;

/// Framebuffer share in MiB of each Hopper shape, indexed by GPU instance
/// profile id.
type MemoryTable = [u64; GPU_INSTANCE_PROFILE_COUNT as usize];

const H100_MEMORY_MB: MemoryTable = [
    9856, 19968, 40448, 40448, 81408, 81408, 61440, // base shapes
    9856, 19968, 19968, // REV1, REV1, REV2
    9856, 19968, 40448, // GFX
    9856, 19968, // NO_ME
    19968, 35840, // ALL_ME
];

const H200_MEMORY_MB: MemoryTable = [
    17920, 35840, 72192, 72192, 144384, 144384, 108544,
    17920, 35840, 35840,
    17920, 35840, 72192,
    17920, 35840,
    35840, 53760,
];

fn hopper_catalog(memory: &MemoryTable) -> ProfileCatalog {
    let one = Media::new(1, 0, 1, 0);
    let two = Media::new(2, 0, 2, 0);
    let full = Media::new(7, 0, 7, 1);
    let row = |id: i32, slices: u32, instances: u32, media: Media, at: Vec<Placement>| Shape {
        id,
        slices,
        instances,
        memory_mb: memory[id as usize],
        media,
        placements: at,
        compute: standard_compute_sizes(slices),
    };

    let shapes = vec![
        row(GPU_INSTANCE_PROFILE_1_SLICE, 1, 7, one, windows(1, 7, 1)),
        row(GPU_INSTANCE_PROFILE_2_SLICE, 2, 3, one, windows(2, 3, 2)),
        row(GPU_INSTANCE_PROFILE_3_SLICE, 3, 2, two, windows(4, 2, 4)),
        row(GPU_INSTANCE_PROFILE_4_SLICE, 4, 1, two, vec![Placement::new(0, 4)]),
        row(GPU_INSTANCE_PROFILE_7_SLICE, 7, 1, full, vec![Placement::new(0, 8)]),
        row(GPU_INSTANCE_PROFILE_8_SLICE, 8, 1, full, vec![Placement::new(0, 8)]),
        row(GPU_INSTANCE_PROFILE_6_SLICE, 6, 1, Media::new(6, 0, 6, 1), vec![Placement::new(0, 8)]),
        row(GPU_INSTANCE_PROFILE_1_SLICE_REV1, 1, 1, Media::new(1, 0, 1, 1), windows(1, 7, 1)),
        row(GPU_INSTANCE_PROFILE_2_SLICE_REV1, 2, 1, Media::new(2, 0, 2, 1), windows(2, 3, 2)),
        row(GPU_INSTANCE_PROFILE_1_SLICE_REV2, 1, 4, one, windows(2, 4, 2)),
        row(GPU_INSTANCE_PROFILE_1_SLICE_GFX, 1, 7, one, windows(1, 7, 1)),
        row(GPU_INSTANCE_PROFILE_2_SLICE_GFX, 2, 3, one, windows(2, 3, 2)),
        row(GPU_INSTANCE_PROFILE_4_SLICE_GFX, 4, 1, two, vec![Placement::new(0, 4)]),
        row(GPU_INSTANCE_PROFILE_1_SLICE_NO_ME, 1, 7, Media::NONE, windows(1, 7, 1)),
        row(GPU_INSTANCE_PROFILE_2_SLICE_NO_ME, 2, 3, Media::NONE, windows(2, 3, 2)),
        row(GPU_INSTANCE_PROFILE_1_SLICE_ALL_ME, 1, 1, full, windows(2, 4, 2)),
        row(GPU_INSTANCE_PROFILE_2_SLICE_ALL_ME, 2, 1, full, windows(4, 2, 4)),
    ];
    build_catalog(shapes, HOPPER_SM_PER_SLICE, false)
}

/// MIG profiles of the 80GB H100.
pub fn h100_catalog() -> ProfileCatalog {
    hopper_catalog(&H100_MEMORY_MB)
}

/// MIG profiles of the 141GB H200.
pub fn h200_catalog() -> ProfileCatalog {
    hopper_catalog(&H200_MEMORY_MB)
}

/// DGX H100: eight H100s behind bus 0x17.
pub fn dgx_h100() -> GpuSpec {
    GpuSpec {
        name: H100_NAME.to_string(),
        architecture: Architecture::Hopper,
        brand: Brand::Nvidia,
        pci_device_id: H100_PCI_DEVICE_ID,
        pci_bus_layout: PciBusLayout::Segmented { bus: 0x17 },
        driver_version: DEFAULT_DRIVER_VERSION.to_string(),
        nvml_version: DEFAULT_NVML_VERSION.to_string(),
        cuda_driver_version: DEFAULT_CUDA_DRIVER_VERSION,
        cuda_capability: (9, 0),
        total_memory_mb: H100_TOTAL_MEMORY_MB,
        device_count: DGX_DEVICE_COUNT,
        mig_mode: MigMode::Disabled,
        topology: TopologyPolicy::Unsupported,
        fabric_manager: false,
        catalog: Arc::new(h100_catalog()),
    }
}

/// DGX H200: eight H200s behind bus 0x4b with MIG enabled.
///
/// All other GPUs count as nearest neighbours, and fabric manager
/// partitions are available.
pub fn dgx_h200() -> GpuSpec {
    GpuSpec {
        name: H200_NAME.to_string(),
        architecture: Architecture::Hopper,
        brand: Brand::Nvidia,
        pci_device_id: H200_PCI_DEVICE_ID,
        pci_bus_layout: PciBusLayout::Segmented { bus: 0x4b },
        driver_version: DEFAULT_DRIVER_VERSION.to_string(),
        nvml_version: DEFAULT_NVML_VERSION.to_string(),
        cuda_driver_version: DEFAULT_CUDA_DRIVER_VERSION,
        cuda_capability: (9, 0),
        total_memory_mb: H200_TOTAL_MEMORY_MB,
        device_count: DGX_DEVICE_COUNT,
        mig_mode: MigMode::Enabled,
        topology: TopologyPolicy::AllOthers,
        fabric_manager: true,
        catalog: Arc::new(h200_catalog()),
    }
}

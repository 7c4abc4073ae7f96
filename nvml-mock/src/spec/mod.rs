//! Static per-generation configuration records.
//!
//! A [`GpuSpec`] is everything a device needs that never changes at run
//! time: product strings, PCI identity, memory, and the profile catalog.
//! The lifecycle engine reads it but never computes any of its fields.

pub mod ampere;
pub mod blackwell;
pub mod hopper;

use serde::Deserialize;
use std::fmt;
use std::sync::Arc;

use crate::profile::{
    compute_placements, ids, CatalogBuilder, ComputeInstanceProfileInfo, GpuInstanceProfileInfo,
    Placement, ProfileCatalog,
};

pub const DEFAULT_DRIVER_VERSION: &str = "550.54.15";
pub const DEFAULT_NVML_VERSION: &str = "12.550.54.15";
pub const DEFAULT_CUDA_DRIVER_VERSION: i32 = 12040;
/// GPUs per DGX chassis.
pub const DGX_DEVICE_COUNT: u32 = 8;

/// Device architecture, numbered as NVML reports it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum Architecture {
    Ampere = 7,
    Hopper = 9,
    Blackwell = 10,
    Unknown = 0xffff_ffff,
}

impl From<u32> for Architecture {
    fn from(value: u32) -> Self {
        match value {
            7 => Architecture::Ampere,
            9 => Architecture::Hopper,
            10 => Architecture::Blackwell,
            _ => Architecture::Unknown,
        }
    }
}

impl fmt::Display for Architecture {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Architecture::Ampere => write!(f, "Ampere"),
            Architecture::Hopper => write!(f, "Hopper"),
            Architecture::Blackwell => write!(f, "Blackwell"),
            Architecture::Unknown => write!(f, "Unknown"),
        }
    }
}

/// Product brand, numbered as NVML reports it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum Brand {
    Unknown = 0,
    Tesla = 2,
    Nvidia = 14,
}

impl From<u32> for Brand {
    fn from(value: u32) -> Self {
        match value {
            2 => Brand::Tesla,
            14 => Brand::Nvidia,
            _ => Brand::Unknown,
        }
    }
}

impl fmt::Display for Brand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Brand::Unknown => write!(f, "Unknown"),
            Brand::Tesla => write!(f, "Tesla"),
            Brand::Nvidia => write!(f, "NVIDIA"),
        }
    }
}

/// MIG mode flag. Current and pending values are always reported equal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
#[repr(i32)]
pub enum MigMode {
    #[default]
    Disabled = 0,
    Enabled = 1,
}

impl From<i32> for MigMode {
    fn from(value: i32) -> Self {
        if value == 0 {
            MigMode::Disabled
        } else {
            MigMode::Enabled
        }
    }
}

impl fmt::Display for MigMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MigMode::Disabled => write!(f, "Disabled"),
            MigMode::Enabled => write!(f, "Enabled"),
        }
    }
}

/// How PCI bus addresses are laid out across a chassis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PciBusLayout {
    /// `0000:<index>:00.0`
    Flat,
    /// `0000:<bus>:<index>:00.0`
    Segmented { bus: u8 },
}

/// Distance class passed to nearest-GPU topology queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum GpuTopologyLevel {
    Internal = 0,
    Single = 10,
    Multiple = 20,
    HostBridge = 30,
    Node = 40,
    System = 50,
}

/// Nearest-GPU behaviour of a generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TopologyPolicy {
    /// Topology queries fail with `NotSupported`.
    #[default]
    Unsupported,
    /// Every other device in the fleet, in index order, at any level.
    AllOthers,
}

/// Supported accelerator generations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Generation {
    #[default]
    A100,
    H100,
    H200,
    B200,
}

impl Generation {
    pub const ALL: [Generation; 4] = [
        Generation::A100,
        Generation::H100,
        Generation::H200,
        Generation::B200,
    ];

    /// DGX chassis preset for this generation.
    pub fn spec(&self) -> GpuSpec {
        match self {
            Generation::A100 => ampere::dgx_a100(),
            Generation::H100 => hopper::dgx_h100(),
            Generation::H200 => hopper::dgx_h200(),
            Generation::B200 => blackwell::dgx_b200(),
        }
    }
}

impl fmt::Display for Generation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Generation::A100 => write!(f, "A100"),
            Generation::H100 => write!(f, "H100"),
            Generation::H200 => write!(f, "H200"),
            Generation::B200 => write!(f, "B200"),
        }
    }
}

/// Static configuration shared by every device of a fleet.
#[derive(Debug, Clone)]
pub struct GpuSpec {
    pub name: String,
    pub architecture: Architecture,
    pub brand: Brand,
    pub pci_device_id: u32,
    pub pci_bus_layout: PciBusLayout,
    pub driver_version: String,
    pub nvml_version: String,
    pub cuda_driver_version: i32,
    /// CUDA compute capability as `(major, minor)`.
    pub cuda_capability: (i32, i32),
    pub total_memory_mb: u64,
    pub device_count: u32,
    /// MIG mode devices start in.
    pub mig_mode: MigMode,
    pub topology: TopologyPolicy,
    /// Devices take part in NVSwitch fabric partitions.
    pub fabric_manager: bool,
    pub catalog: Arc<ProfileCatalog>,
}

impl GpuSpec {
    /// Set the number of devices in the fleet.
    pub fn with_device_count(mut self, count: u32) -> Self {
        self.device_count = count;
        self
    }

    /// Set the driver, NVML and CUDA driver versions.
    pub fn with_versions(
        mut self,
        driver: impl Into<String>,
        nvml: impl Into<String>,
        cuda_driver: i32,
    ) -> Self {
        self.driver_version = driver.into();
        self.nvml_version = nvml.into();
        self.cuda_driver_version = cuda_driver;
        self
    }

    pub fn with_mig_mode(mut self, mode: MigMode) -> Self {
        self.mig_mode = mode;
        self
    }

    pub fn with_topology(mut self, topology: TopologyPolicy) -> Self {
        self.topology = topology;
        self
    }

    pub fn with_fabric_manager(mut self, enabled: bool) -> Self {
        self.fabric_manager = enabled;
        self
    }

    /// Replace the profile catalog.
    pub fn with_catalog(mut self, catalog: ProfileCatalog) -> Self {
        self.catalog = Arc::new(catalog);
        self
    }

    /// Total framebuffer in bytes.
    pub fn total_memory_bytes(&self) -> u64 {
        self.total_memory_mb * 1024 * 1024
    }
}

/// Media engines of one shape.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct Media {
    pub decoder: u32,
    pub encoder: u32,
    pub jpeg: u32,
    pub ofa: u32,
}

impl Media {
    pub const NONE: Media = Media::new(0, 0, 0, 0);

    pub const fn new(decoder: u32, encoder: u32, jpeg: u32, ofa: u32) -> Self {
        Self {
            decoder,
            encoder,
            jpeg,
            ofa,
        }
    }
}

/// One row of a preset GPU instance table.
pub(crate) struct Shape {
    pub id: i32,
    pub slices: u32,
    pub instances: u32,
    pub memory_mb: u64,
    pub media: Media,
    pub placements: Vec<Placement>,
    /// Slice counts of the compute instances this shape can hold.
    pub compute: &'static [u32],
}

/// Compute subdivisions offered by most generations, by parent slice count.
pub(crate) fn standard_compute_sizes(slices: u32) -> &'static [u32] {
    match slices {
        1 => &[1],
        2 => &[1, 2],
        3 => &[1, 2, 3],
        4 => &[1, 2, 4],
        6 => &[1, 2, 3, 6],
        7 => &[1, 2, 3, 4, 7],
        8 => &[1, 2, 4, 8],
        _ => &[],
    }
}

/// Expand preset rows into a catalog.
///
/// Multiprocessors scale with slices up to seven; copy engines likewise.
/// Compute instances share their parent's engines.
pub(crate) fn build_catalog(shapes: Vec<Shape>, sm_per_slice: u32, p2p: bool) -> ProfileCatalog {
    let mut builder = CatalogBuilder::new();

    for shape in shapes {
        let copy_engines = shape.slices.min(7);
        let info = GpuInstanceProfileInfo {
            id: shape.id,
            is_p2p_supported: p2p,
            slice_count: shape.slices,
            instance_count: shape.instances,
            multiprocessor_count: sm_per_slice * copy_engines,
            copy_engine_count: copy_engines,
            decoder_count: shape.media.decoder,
            encoder_count: shape.media.encoder,
            jpeg_count: shape.media.jpeg,
            ofa_count: shape.media.ofa,
            memory_size_mb: shape.memory_mb,
        };
        let span = shape.placements.iter().map(|p| p.size).max().unwrap_or(0);

        for &size in shape.compute {
            let Some(id) = ids::compute_instance_profile_for_slices(size) else {
                continue;
            };
            let placements = compute_placements(shape.slices, span, size);
            let compute = ComputeInstanceProfileInfo {
                id,
                slice_count: size,
                instance_count: placements.len() as u32,
                multiprocessor_count: sm_per_slice * size.min(7),
                shared_copy_engine_count: copy_engines,
                shared_decoder_count: shape.media.decoder,
                shared_encoder_count: shape.media.encoder,
                shared_jpeg_count: shape.media.jpeg,
                shared_ofa_count: shape.media.ofa,
            };
            builder = builder.compute_instance_profile(shape.id, compute, placements);
        }

        builder = builder.gpu_instance_profile(info, shape.placements);
    }

    builder.build()
}

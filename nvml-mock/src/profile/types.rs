//! Profile and placement records.

use serde::Deserialize;
use std::fmt;

/// A `{start, size}` window over a slot grid.
///
/// GPU instance placements index the device's slot grid; compute instance
/// placements index the parent GPU instance's own slots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize)]
pub struct Placement {
    /// First slot covered.
    pub start: u32,
    /// Number of slots covered.
    pub size: u32,
}

impl Placement {
    pub const fn new(start: u32, size: u32) -> Self {
        Self { start, size }
    }

    /// One past the last slot covered.
    pub fn end(&self) -> u32 {
        self.start.saturating_add(self.size)
    }

    /// Check whether two windows share at least one slot.
    pub fn overlaps(&self, other: &Placement) -> bool {
        self.size > 0 && other.size > 0 && self.start < other.end() && other.start < self.end()
    }
}

impl fmt::Display for Placement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}+{}", self.start, self.size)
    }
}

/// Resource shares of a GPU instance profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct GpuInstanceProfileInfo {
    /// Profile id within the GPU instance id space.
    pub id: i32,
    /// Peer-to-peer access supported while partitioned.
    pub is_p2p_supported: bool,
    /// Compute slices owned.
    pub slice_count: u32,
    /// Maximum simultaneous instances of this shape.
    pub instance_count: u32,
    /// Streaming multiprocessors.
    pub multiprocessor_count: u32,
    pub copy_engine_count: u32,
    pub decoder_count: u32,
    pub encoder_count: u32,
    pub jpeg_count: u32,
    pub ofa_count: u32,
    /// Framebuffer share in MiB.
    pub memory_size_mb: u64,
}

impl fmt::Display for GpuInstanceProfileInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}g.{}mb (profile {})",
            self.slice_count, self.memory_size_mb, self.id
        )
    }
}

/// Resource shares of a compute instance profile inside a GPU instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ComputeInstanceProfileInfo {
    /// Profile id within the compute instance id space.
    pub id: i32,
    pub slice_count: u32,
    /// Maximum simultaneous instances of this shape in one parent.
    pub instance_count: u32,
    pub multiprocessor_count: u32,
    pub shared_copy_engine_count: u32,
    pub shared_decoder_count: u32,
    pub shared_encoder_count: u32,
    pub shared_jpeg_count: u32,
    pub shared_ofa_count: u32,
}

impl fmt::Display for ComputeInstanceProfileInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}c (profile {})", self.slice_count, self.id)
    }
}

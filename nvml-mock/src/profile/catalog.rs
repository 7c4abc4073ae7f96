//! Immutable per-generation profile catalog.
//!
//! A catalog maps GPU instance profile ids to their resource shares and
//! legal placements on the device slot grid, and for each of those the
//! compute instance profiles that may subdivide it. One lookup algorithm
//! serves every generation; only the table contents differ.

use std::collections::BTreeMap;

use super::ids;
use super::types::{ComputeInstanceProfileInfo, GpuInstanceProfileInfo, Placement};
use crate::error::{CatalogError, Error, Result};

/// Slot grid width shared by every known generation.
pub const DEFAULT_SLOT_WIDTH: u32 = 8;

#[derive(Debug, Clone, PartialEq)]
struct GpuInstanceEntry {
    info: GpuInstanceProfileInfo,
    placements: Vec<Placement>,
}

#[derive(Debug, Clone, PartialEq)]
struct ComputeInstanceEntry {
    info: ComputeInstanceProfileInfo,
    placements: Vec<Placement>,
}

/// Profile and placement tables for one accelerator generation.
#[derive(Debug, Clone, PartialEq)]
pub struct ProfileCatalog {
    slot_width: u32,
    gpu_instances: BTreeMap<i32, GpuInstanceEntry>,
    compute_instances: BTreeMap<i32, BTreeMap<i32, ComputeInstanceEntry>>,
}

impl ProfileCatalog {
    /// Create a new builder.
    pub fn builder() -> CatalogBuilder {
        CatalogBuilder::new()
    }

    /// Width of the device slot grid.
    pub fn slot_width(&self) -> u32 {
        self.slot_width
    }

    /// Look up a GPU instance profile.
    ///
    /// Ids outside the id space are `InvalidArgument`; ids this generation
    /// does not define are `NotSupported`.
    pub fn gpu_instance_profile(&self, id: i32) -> Result<GpuInstanceProfileInfo> {
        if !ids::is_gpu_instance_profile_id(id) {
            return Err(Error::invalid_argument(format!(
                "GPU instance profile id {id} is out of range"
            )));
        }
        self.gpu_instances
            .get(&id)
            .map(|entry| entry.info)
            .ok_or_else(|| Error::not_supported(format!("GPU instance profile {id}")))
    }

    /// Legal placements for a GPU instance profile, in catalog order.
    ///
    /// An id the generation does not define has no placements.
    pub fn gpu_instance_placements(&self, id: i32) -> Result<Vec<Placement>> {
        if !ids::is_gpu_instance_profile_id(id) {
            return Err(Error::invalid_argument(format!(
                "GPU instance profile id {id} is out of range"
            )));
        }
        Ok(self
            .gpu_instances
            .get(&id)
            .map(|entry| entry.placements.clone())
            .unwrap_or_default())
    }

    /// Look up a compute instance profile inside a GPU instance profile.
    pub fn compute_instance_profile(
        &self,
        parent: i32,
        id: i32,
        engine_profile: i32,
    ) -> Result<ComputeInstanceProfileInfo> {
        if !ids::is_compute_instance_profile_id(id) {
            return Err(Error::invalid_argument(format!(
                "compute instance profile id {id} is out of range"
            )));
        }
        if engine_profile != ids::COMPUTE_INSTANCE_ENGINE_PROFILE_SHARED {
            return Err(Error::not_supported(format!(
                "compute instance engine profile {engine_profile}"
            )));
        }
        self.compute_instances
            .get(&parent)
            .and_then(|children| children.get(&id))
            .map(|entry| entry.info)
            .ok_or_else(|| {
                Error::not_supported(format!(
                    "compute instance profile {id} in GPU instance profile {parent}"
                ))
            })
    }

    /// Legal placements of a compute instance profile within its parent.
    pub fn compute_instance_placements(&self, parent: i32, id: i32) -> Result<Vec<Placement>> {
        if !ids::is_compute_instance_profile_id(id) {
            return Err(Error::invalid_argument(format!(
                "compute instance profile id {id} is out of range"
            )));
        }
        Ok(self
            .compute_instances
            .get(&parent)
            .and_then(|children| children.get(&id))
            .map(|entry| entry.placements.clone())
            .unwrap_or_default())
    }

    /// GPU instance profiles in id order.
    pub fn gpu_instance_profiles(&self) -> impl Iterator<Item = &GpuInstanceProfileInfo> + '_ {
        self.gpu_instances.values().map(|entry| &entry.info)
    }

    /// Compute instance profiles of one parent, in id order.
    pub fn compute_instance_profiles(
        &self,
        parent: i32,
    ) -> impl Iterator<Item = &ComputeInstanceProfileInfo> + '_ {
        self.compute_instances
            .get(&parent)
            .into_iter()
            .flat_map(|children| children.values().map(|entry| &entry.info))
    }

    /// Number of GPU instance profiles defined.
    pub fn len(&self) -> usize {
        self.gpu_instances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.gpu_instances.is_empty()
    }

    /// Widest placement of a GPU instance profile: the slot space its
    /// compute instances are placed in.
    pub fn parent_span(&self, parent: i32) -> Option<u32> {
        self.gpu_instances
            .get(&parent)
            .and_then(|entry| entry.placements.iter().map(|p| p.size).max())
    }

    /// Check the closure rules every catalog must satisfy.
    pub fn validate(&self) -> core::result::Result<(), CatalogError> {
        for (&key, entry) in &self.gpu_instances {
            if !ids::is_gpu_instance_profile_id(key) {
                return Err(CatalogError::GpuInstanceProfileOutOfRange(key));
            }
            if entry.info.id != key {
                return Err(CatalogError::IdMismatch {
                    key,
                    id: entry.info.id,
                });
            }
            if entry.placements.is_empty() {
                return Err(CatalogError::NoPlacements(key));
            }
            if let Some(p) = entry.placements.iter().find(|p| p.end() > self.slot_width) {
                return Err(CatalogError::PlacementOutOfBounds {
                    profile: key,
                    start: p.start,
                    size: p.size,
                    width: self.slot_width,
                });
            }
        }

        for (&parent, children) in &self.compute_instances {
            let span = self
                .parent_span(parent)
                .ok_or(CatalogError::OrphanComputeProfiles(parent))?;
            for (&child, entry) in children {
                if !ids::is_compute_instance_profile_id(child) {
                    return Err(CatalogError::ComputeInstanceProfileOutOfRange { parent, child });
                }
                if entry.info.id != child {
                    return Err(CatalogError::IdMismatch {
                        key: child,
                        id: entry.info.id,
                    });
                }
                if entry.placements.is_empty() {
                    return Err(CatalogError::NoComputePlacements { parent, child });
                }
                if let Some(p) = entry.placements.iter().find(|p| p.end() > span) {
                    return Err(CatalogError::ComputePlacementOutOfBounds {
                        parent,
                        child,
                        start: p.start,
                        size: p.size,
                        span,
                    });
                }
            }
        }
        Ok(())
    }
}

/// Builder for profile catalogs.
#[derive(Debug, Clone)]
pub struct CatalogBuilder {
    catalog: ProfileCatalog,
    duplicate: Option<CatalogError>,
}

impl Default for CatalogBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl CatalogBuilder {
    /// Create a new builder with the default slot width.
    pub fn new() -> Self {
        Self {
            catalog: ProfileCatalog {
                slot_width: DEFAULT_SLOT_WIDTH,
                gpu_instances: BTreeMap::new(),
                compute_instances: BTreeMap::new(),
            },
            duplicate: None,
        }
    }

    /// Set the slot grid width.
    pub fn slot_width(mut self, width: u32) -> Self {
        self.catalog.slot_width = width;
        self
    }

    /// Register a GPU instance profile under its own id.
    ///
    /// A later registration of the same id replaces the earlier one and
    /// makes [`build_checked`](Self::build_checked) fail.
    pub fn gpu_instance_profile(
        mut self,
        info: GpuInstanceProfileInfo,
        placements: Vec<Placement>,
    ) -> Self {
        let id = info.id;
        let previous = self
            .catalog
            .gpu_instances
            .insert(id, GpuInstanceEntry { info, placements });
        if previous.is_some() {
            self.record_duplicate(None, id);
        }
        self
    }

    /// Register a compute instance profile under a GPU instance profile.
    pub fn compute_instance_profile(
        mut self,
        parent: i32,
        info: ComputeInstanceProfileInfo,
        placements: Vec<Placement>,
    ) -> Self {
        let id = info.id;
        let previous = self
            .catalog
            .compute_instances
            .entry(parent)
            .or_default()
            .insert(id, ComputeInstanceEntry { info, placements });
        if previous.is_some() {
            self.record_duplicate(Some(parent), id);
        }
        self
    }

    fn record_duplicate(&mut self, parent: Option<i32>, id: i32) {
        if self.duplicate.is_none() {
            self.duplicate = Some(CatalogError::DuplicateProfile { parent, id });
        }
    }

    /// Build without checking closure rules.
    pub fn build(self) -> ProfileCatalog {
        self.catalog
    }

    /// Build and validate.
    pub fn build_checked(self) -> core::result::Result<ProfileCatalog, CatalogError> {
        if let Some(duplicate) = self.duplicate {
            return Err(duplicate);
        }
        self.catalog.validate()?;
        Ok(self.catalog)
    }
}

/// `count` windows of `size` slots, `stride` apart, starting at slot 0.
pub fn windows(size: u32, count: u32, stride: u32) -> Vec<Placement> {
    (0..count).map(|i| Placement::new(i * stride, size)).collect()
}

/// Compute instance placements of `size` slices inside a parent owning
/// `parent_slices` slices over a `parent_span`-slot window.
///
/// Windows are aligned to the next power of two; shapes of six or more
/// slices take the whole parent window.
pub fn compute_placements(parent_slices: u32, parent_span: u32, size: u32) -> Vec<Placement> {
    if size == 0 || size > parent_slices {
        return Vec::new();
    }
    if size >= 6 {
        return vec![Placement::new(0, parent_span)];
    }
    let stride = size.next_power_of_two();
    (0..parent_slices / size)
        .map(|i| Placement::new(i * stride, size))
        .take_while(|p| p.end() <= parent_span)
        .collect()
}

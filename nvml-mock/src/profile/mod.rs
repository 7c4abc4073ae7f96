//! MIG partition profiles.
//!
//! Profile ids are fixed across generations; what an id means (and whether
//! a generation offers it at all) comes from that generation's
//! [`ProfileCatalog`].

pub mod catalog;
pub mod document;
pub mod ids;
pub mod types;

pub use catalog::{compute_placements, windows, CatalogBuilder, ProfileCatalog, DEFAULT_SLOT_WIDTH};
pub use document::{CatalogDocument, ComputeInstanceProfileDocument, GpuInstanceProfileDocument};
pub use types::{ComputeInstanceProfileInfo, GpuInstanceProfileInfo, Placement};

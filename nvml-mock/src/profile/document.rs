//! Serialized form of a profile catalog.
//!
//! Lets test fixtures describe a custom generation in TOML:
//!
//! ```toml
//! slot_width = 8
//!
//! [[gpu_instance_profiles]]
//! id = 4
//! slice_count = 7
//! memory_size_mb = 40192
//! placements = [{ start = 0, size = 8 }]
//!
//! [[gpu_instance_profiles.compute_instance_profiles]]
//! id = 0
//! slice_count = 1
//! placements = [{ start = 0, size = 1 }, { start = 1, size = 1 }]
//! ```

use serde::Deserialize;

use super::catalog::{CatalogBuilder, ProfileCatalog, DEFAULT_SLOT_WIDTH};
use super::types::{ComputeInstanceProfileInfo, GpuInstanceProfileInfo, Placement};
use crate::error::CatalogError;

/// A whole catalog.
#[derive(Debug, Deserialize, Clone)]
pub struct CatalogDocument {
    #[serde(default = "default_slot_width")]
    pub slot_width: u32,

    #[serde(default)]
    pub gpu_instance_profiles: Vec<GpuInstanceProfileDocument>,
}

/// One GPU instance profile and its compute subdivisions.
///
/// `instance_count` defaults to the number of placements.
#[derive(Debug, Deserialize, Clone)]
pub struct GpuInstanceProfileDocument {
    pub id: i32,
    #[serde(default)]
    pub is_p2p_supported: bool,
    pub slice_count: u32,
    #[serde(default)]
    pub instance_count: Option<u32>,
    #[serde(default)]
    pub multiprocessor_count: u32,
    #[serde(default)]
    pub copy_engine_count: u32,
    #[serde(default)]
    pub decoder_count: u32,
    #[serde(default)]
    pub encoder_count: u32,
    #[serde(default)]
    pub jpeg_count: u32,
    #[serde(default)]
    pub ofa_count: u32,
    #[serde(default)]
    pub memory_size_mb: u64,
    #[serde(default)]
    pub placements: Vec<Placement>,
    #[serde(default)]
    pub compute_instance_profiles: Vec<ComputeInstanceProfileDocument>,
}

/// One compute instance profile.
#[derive(Debug, Deserialize, Clone)]
pub struct ComputeInstanceProfileDocument {
    pub id: i32,
    pub slice_count: u32,
    #[serde(default)]
    pub instance_count: Option<u32>,
    #[serde(default)]
    pub multiprocessor_count: u32,
    #[serde(default)]
    pub shared_copy_engine_count: u32,
    #[serde(default)]
    pub shared_decoder_count: u32,
    #[serde(default)]
    pub shared_encoder_count: u32,
    #[serde(default)]
    pub shared_jpeg_count: u32,
    #[serde(default)]
    pub shared_ofa_count: u32,
    #[serde(default)]
    pub placements: Vec<Placement>,
}

fn default_slot_width() -> u32 {
    DEFAULT_SLOT_WIDTH
}

impl ProfileCatalog {
    /// Convert a parsed document into a validated catalog.
    pub fn from_document(document: &CatalogDocument) -> Result<Self, CatalogError> {
        let mut builder = CatalogBuilder::new().slot_width(document.slot_width);

        for gi in &document.gpu_instance_profiles {
            let info = GpuInstanceProfileInfo {
                id: gi.id,
                is_p2p_supported: gi.is_p2p_supported,
                slice_count: gi.slice_count,
                instance_count: gi.instance_count.unwrap_or(gi.placements.len() as u32),
                multiprocessor_count: gi.multiprocessor_count,
                copy_engine_count: gi.copy_engine_count,
                decoder_count: gi.decoder_count,
                encoder_count: gi.encoder_count,
                jpeg_count: gi.jpeg_count,
                ofa_count: gi.ofa_count,
                memory_size_mb: gi.memory_size_mb,
            };
            builder = builder.gpu_instance_profile(info, gi.placements.clone());

            for ci in &gi.compute_instance_profiles {
                let info = ComputeInstanceProfileInfo {
                    id: ci.id,
                    slice_count: ci.slice_count,
                    instance_count: ci.instance_count.unwrap_or(ci.placements.len() as u32),
                    multiprocessor_count: ci.multiprocessor_count,
                    shared_copy_engine_count: ci.shared_copy_engine_count,
                    shared_decoder_count: ci.shared_decoder_count,
                    shared_encoder_count: ci.shared_encoder_count,
                    shared_jpeg_count: ci.shared_jpeg_count,
                    shared_ofa_count: ci.shared_ofa_count,
                };
                builder = builder.compute_instance_profile(gi.id, info, ci.placements.clone());
            }
        }

        builder.build_checked()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::ids::*;

    const DOC: &str = r#"
        [[gpu_instance_profiles]]
        id = 4
        slice_count = 7
        memory_size_mb = 40192
        placements = [{ start = 0, size = 8 }]

        [[gpu_instance_profiles.compute_instance_profiles]]
        id = 0
        slice_count = 1
        multiprocessor_count = 14
        placements = [{ start = 0, size = 1 }, { start = 1, size = 1 }]
    "#;

    #[test]
    fn test_parse_document() {
        let doc: CatalogDocument = toml::from_str(DOC).unwrap();
        assert_eq!(doc.slot_width, 8);
        assert_eq!(doc.gpu_instance_profiles.len(), 1);
        assert_eq!(doc.gpu_instance_profiles[0].compute_instance_profiles.len(), 1);
    }

    #[test]
    fn test_document_to_catalog() {
        let doc: CatalogDocument = toml::from_str(DOC).unwrap();
        let catalog = ProfileCatalog::from_document(&doc).unwrap();

        let info = catalog.gpu_instance_profile(GPU_INSTANCE_PROFILE_7_SLICE).unwrap();
        assert_eq!(info.memory_size_mb, 40192);
        assert_eq!(info.instance_count, 1);

        let ci = catalog
            .compute_instance_profile(
                GPU_INSTANCE_PROFILE_7_SLICE,
                COMPUTE_INSTANCE_PROFILE_1_SLICE,
                COMPUTE_INSTANCE_ENGINE_PROFILE_SHARED,
            )
            .unwrap();
        assert_eq!(ci.instance_count, 2);
        assert_eq!(ci.multiprocessor_count, 14);
    }

    #[test]
    fn test_document_rejects_repeated_profile_id() {
        let doc: CatalogDocument = toml::from_str(
            r#"
            [[gpu_instance_profiles]]
            id = 0
            slice_count = 1
            memory_size_mb = 1111
            placements = [{ start = 0, size = 1 }]

            [[gpu_instance_profiles]]
            id = 0
            slice_count = 2
            memory_size_mb = 2222
            placements = [{ start = 0, size = 2 }]
            "#,
        )
        .unwrap();
        assert_eq!(
            ProfileCatalog::from_document(&doc),
            Err(CatalogError::DuplicateProfile { parent: None, id: 0 })
        );
    }

    #[test]
    fn test_document_rejects_repeated_compute_profile_id() {
        let doc: CatalogDocument = toml::from_str(
            r#"
            [[gpu_instance_profiles]]
            id = 4
            slice_count = 7
            placements = [{ start = 0, size = 8 }]

            [[gpu_instance_profiles.compute_instance_profiles]]
            id = 0
            slice_count = 1
            placements = [{ start = 0, size = 1 }]

            [[gpu_instance_profiles.compute_instance_profiles]]
            id = 0
            slice_count = 1
            placements = [{ start = 1, size = 1 }]
            "#,
        )
        .unwrap();
        assert_eq!(
            ProfileCatalog::from_document(&doc),
            Err(CatalogError::DuplicateProfile { parent: Some(4), id: 0 })
        );
    }

    #[test]
    fn test_document_rejects_wide_placement() {
        let doc: CatalogDocument = toml::from_str(
            r#"
            slot_width = 4
            [[gpu_instance_profiles]]
            id = 0
            slice_count = 1
            placements = [{ start = 4, size = 1 }]
            "#,
        )
        .unwrap();
        assert!(matches!(
            ProfileCatalog::from_document(&doc),
            Err(CatalogError::PlacementOutOfBounds { width: 4, .. })
        ));
    }
}

//! Generation-independent profile id spaces.
//!
//! The meaning of an id (its resource shares) comes from a generation's
//! catalog; only the numbering is fixed here.

pub const GPU_INSTANCE_PROFILE_1_SLICE: i32 = 0;
pub const GPU_INSTANCE_PROFILE_2_SLICE: i32 = 1;
pub const GPU_INSTANCE_PROFILE_3_SLICE: i32 = 2;
pub const GPU_INSTANCE_PROFILE_4_SLICE: i32 = 3;
pub const GPU_INSTANCE_PROFILE_7_SLICE: i32 = 4;
pub const GPU_INSTANCE_PROFILE_8_SLICE: i32 = 5;
pub const GPU_INSTANCE_PROFILE_6_SLICE: i32 = 6;
pub const GPU_INSTANCE_PROFILE_1_SLICE_REV1: i32 = 7;
pub const GPU_INSTANCE_PROFILE_2_SLICE_REV1: i32 = 8;
pub const GPU_INSTANCE_PROFILE_1_SLICE_REV2: i32 = 9;
pub const GPU_INSTANCE_PROFILE_1_SLICE_GFX: i32 = 10;
pub const GPU_INSTANCE_PROFILE_2_SLICE_GFX: i32 = 11;
pub const GPU_INSTANCE_PROFILE_4_SLICE_GFX: i32 = 12;
pub const GPU_INSTANCE_PROFILE_1_SLICE_NO_ME: i32 = 13;
pub const GPU_INSTANCE_PROFILE_2_SLICE_NO_ME: i32 = 14;
pub const GPU_INSTANCE_PROFILE_1_SLICE_ALL_ME: i32 = 15;
pub const GPU_INSTANCE_PROFILE_2_SLICE_ALL_ME: i32 = 16;
/// Size of the GPU instance profile id space.
pub const GPU_INSTANCE_PROFILE_COUNT: i32 = 17;

pub const COMPUTE_INSTANCE_PROFILE_1_SLICE: i32 = 0;
pub const COMPUTE_INSTANCE_PROFILE_2_SLICE: i32 = 1;
pub const COMPUTE_INSTANCE_PROFILE_3_SLICE: i32 = 2;
pub const COMPUTE_INSTANCE_PROFILE_4_SLICE: i32 = 3;
pub const COMPUTE_INSTANCE_PROFILE_7_SLICE: i32 = 4;
pub const COMPUTE_INSTANCE_PROFILE_8_SLICE: i32 = 5;
pub const COMPUTE_INSTANCE_PROFILE_6_SLICE: i32 = 6;
pub const COMPUTE_INSTANCE_PROFILE_1_SLICE_REV1: i32 = 7;
/// Size of the compute instance profile id space.
pub const COMPUTE_INSTANCE_PROFILE_COUNT: i32 = 8;

/// The only compute engine profile: engines shared within the GPU instance.
pub const COMPUTE_INSTANCE_ENGINE_PROFILE_SHARED: i32 = 0;
/// Size of the engine profile id space.
pub const COMPUTE_INSTANCE_ENGINE_PROFILE_COUNT: i32 = 1;

/// Check a GPU instance profile id against its id space.
pub fn is_gpu_instance_profile_id(id: i32) -> bool {
    (0..GPU_INSTANCE_PROFILE_COUNT).contains(&id)
}

/// Check a compute instance profile id against its id space.
pub fn is_compute_instance_profile_id(id: i32) -> bool {
    (0..COMPUTE_INSTANCE_PROFILE_COUNT).contains(&id)
}

/// Compute instance profile id for a plain slice count.
pub fn compute_instance_profile_for_slices(slices: u32) -> Option<i32> {
    match slices {
        1 => Some(COMPUTE_INSTANCE_PROFILE_1_SLICE),
        2 => Some(COMPUTE_INSTANCE_PROFILE_2_SLICE),
        3 => Some(COMPUTE_INSTANCE_PROFILE_3_SLICE),
        4 => Some(COMPUTE_INSTANCE_PROFILE_4_SLICE),
        6 => Some(COMPUTE_INSTANCE_PROFILE_6_SLICE),
        7 => Some(COMPUTE_INSTANCE_PROFILE_7_SLICE),
        8 => Some(COMPUTE_INSTANCE_PROFILE_8_SLICE),
        _ => None,
    }
}

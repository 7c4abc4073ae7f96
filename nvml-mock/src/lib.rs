//! Simulated NVML for tests
//!
//! Provides an in-memory stand-in for the NVIDIA management library:
//! - Fleets of identical devices built from generation presets (A100, H100, H200, B200)
//! - Per-generation MIG profile catalogs with placements
//! - GPU instance and compute instance lifecycle with cascading destroy
//!
//! # Example
//!
//! ```
//! use nvml_mock::profile::ids::*;
//! use nvml_mock::{Device, Generation, GpuInstance, MockServer, Nvml};
//!
//! let server = MockServer::from_generation(Generation::H100);
//! let device = server.device_by_index(0).unwrap();
//! let gi = device.create_gpu_instance(GPU_INSTANCE_PROFILE_7_SLICE).unwrap();
//! let ci = gi.create_compute_instance(COMPUTE_INSTANCE_PROFILE_1_SLICE).unwrap();
//! assert_eq!(ci.id(), 0);
//! gi.destroy().unwrap();
//! ```

pub mod compute_instance;
pub mod config;
pub mod device;
pub mod error;
pub mod gpu_instance;
pub mod identity;
pub mod profile;
pub mod server;
pub mod spec;
pub mod traits;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

pub use compute_instance::{ComputeInstanceInfo, MockComputeInstance};
pub use config::{Config, FleetConfig, LoggingConfig};
pub use device::{MockDevice, NO_FABRIC_PARTITION};
pub use error::{CatalogError, ConfigError, Error, Result, Return};
pub use gpu_instance::{GpuInstanceInfo, MockGpuInstance};
pub use profile::{
    CatalogBuilder, CatalogDocument, ComputeInstanceProfileInfo, GpuInstanceProfileInfo,
    Placement, ProfileCatalog,
};
pub use server::MockServer;
pub use spec::{
    Architecture, Brand, Generation, GpuSpec, GpuTopologyLevel, MigMode, PciBusLayout,
    TopologyPolicy,
};
pub use traits::{ComputeInstance, Device, GpuInstance, MemoryInfo, Nvml, PciInfo};

/// Initialize tracing/logging with the given filter level
///
/// `RUST_LOG` takes precedence. Calling it again after a subscriber is
/// installed is a no-op.
pub fn init_tracing(filter: &str) {
    let _ = tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .try_init();
}

//! Example: MIG layout of a simulated fleet
//!
//! Loads a fleet from an optional TOML file (first argument), prints each
//! device and its GPU instance profiles, then carves device 0 into
//! single-slice instances.
//!
//! Run with: cargo run -p nvml-mock --example mig_layout -- fleet.toml

use nvml_mock::profile::ids::*;
use nvml_mock::{init_tracing, ComputeInstance, Config, Device, GpuInstance, Nvml};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let path = std::env::args().nth(1).unwrap_or_else(|| "nvml-mock.toml".to_string());
    let config = Config::load(&path)?;
    init_tracing(&config.logging.level);

    let server = config.build_server()?;
    server.init()?;

    println!("=== Simulated Fleet ===\n");
    println!("Driver:       {}", server.driver_version()?);
    println!("NVML:         {}", server.nvml_version()?);
    println!("CUDA driver:  {}", server.cuda_driver_version()?);
    println!("Devices:      {}\n", server.device_count()?);

    for device in server.devices() {
        println!("{}", device);
        println!("  Bus ID:       {}", device.bus_id());
        println!("  Memory:       {} MiB", device.memory_info()?.total / (1024 * 1024));
        println!("  MIG mode:     {}", device.mig_mode()?.0);
    }

    let device = server.device_by_index(0)?;
    println!("\n=== Profiles on device 0 ===\n");
    for info in device.catalog().gpu_instance_profiles() {
        let placements = device.gpu_instance_possible_placements(info.id)?;
        let placements: Vec<String> = placements.iter().map(|p| p.to_string()).collect();
        println!("  {:<28} [{}]", info.to_string(), placements.join(", "));
    }

    println!("\n=== Carving device 0 ===\n");
    let profile = GPU_INSTANCE_PROFILE_1_SLICE;
    let placements = device.gpu_instance_possible_placements(profile)?;
    for placement in &placements {
        let gi = device.create_gpu_instance_with_placement(profile, placement)?;
        let ci = gi.create_compute_instance(COMPUTE_INSTANCE_PROFILE_1_SLICE)?;
        let info = ci.info()?;
        println!(
            "  GPU instance {} at {} -> compute instance {} ({} SMs)",
            gi.id(),
            placement,
            ci.id(),
            info.profile.multiprocessor_count
        );
    }

    for gi in device.gpu_instances(GPU_INSTANCE_PROFILE_1_SLICE)? {
        gi.destroy()?;
    }
    println!("\nRemaining GPU instances: {}", device.gpu_instance_count());

    server.shutdown()?;
    Ok(())
}

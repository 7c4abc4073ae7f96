//! Concurrent access to a shared fleet.

use std::collections::BTreeSet;
use std::sync::Arc;
use std::thread;

use nvml_mock::profile::ids::*;
use nvml_mock::{ComputeInstance, Device, Generation, GpuInstance, MockServer, Nvml};

const ROUNDS: usize = 50;

#[test]
fn test_devices_are_isolated_under_concurrency() {
    let server = Arc::new(MockServer::from_generation(Generation::H100));

    let workers: Vec<_> = (0..4)
        .map(|index| {
            let server = Arc::clone(&server);
            thread::spawn(move || {
                let device = server.device_by_index(index).unwrap();
                for _ in 0..ROUNDS {
                    let gi = device.create_gpu_instance(GPU_INSTANCE_PROFILE_1_SLICE).unwrap();
                    let ci = gi.create_compute_instance(COMPUTE_INSTANCE_PROFILE_1_SLICE).unwrap();
                    ci.destroy().unwrap();
                    gi.destroy().unwrap();
                }
                device.create_gpu_instance(GPU_INSTANCE_PROFILE_1_SLICE).unwrap().id()
            })
        })
        .collect();

    for worker in workers {
        // Every device counted its own ROUNDS instances and nothing else.
        assert_eq!(worker.join().unwrap(), ROUNDS as u32);
    }

    let untouched = server.device_by_index(4).unwrap();
    assert_eq!(untouched.gpu_instance_count(), 0);
    assert_eq!(untouched.create_gpu_instance(GPU_INSTANCE_PROFILE_1_SLICE).unwrap().id(), 0);
}

#[test]
fn test_ids_unique_within_one_device() {
    let server = MockServer::from_generation(Generation::A100);
    let device = server.device_by_index(0).unwrap();

    let workers: Vec<_> = (0..8)
        .map(|_| {
            let device = device.clone();
            thread::spawn(move || {
                (0..ROUNDS)
                    .map(|_| device.create_gpu_instance(GPU_INSTANCE_PROFILE_1_SLICE).unwrap().id())
                    .collect::<Vec<u32>>()
            })
        })
        .collect();

    let ids: BTreeSet<u32> = workers
        .into_iter()
        .flat_map(|worker| worker.join().unwrap())
        .collect();
    assert_eq!(ids.len(), 8 * ROUNDS);
    assert_eq!(ids.iter().next_back(), Some(&(8 * ROUNDS as u32 - 1)));
    assert_eq!(device.gpu_instance_count(), 8 * ROUNDS);
}

#[test]
fn test_compute_ids_unique_within_one_gpu_instance() {
    let server = MockServer::from_generation(Generation::H100);
    let device = server.device_by_index(0).unwrap();
    let gi = device.create_gpu_instance(GPU_INSTANCE_PROFILE_7_SLICE).unwrap();

    let workers: Vec<_> = (0..8)
        .map(|_| {
            let gi = gi.clone();
            thread::spawn(move || {
                let profile = COMPUTE_INSTANCE_PROFILE_1_SLICE;
                (0..ROUNDS)
                    .map(|_| gi.create_compute_instance(profile).unwrap().id())
                    .collect::<Vec<u32>>()
            })
        })
        .collect();

    let ids: BTreeSet<u32> = workers
        .into_iter()
        .flat_map(|worker| worker.join().unwrap())
        .collect();
    assert_eq!(ids.len(), 8 * ROUNDS);
    assert_eq!(ids.iter().next_back(), Some(&(8 * ROUNDS as u32 - 1)));
    let listed = gi.compute_instances(COMPUTE_INSTANCE_PROFILE_1_SLICE).unwrap();
    assert_eq!(listed.len(), 8 * ROUNDS);
}

#[test]
fn test_concurrent_destroy_has_one_winner() {
    let server = MockServer::from_generation(Generation::B200);
    let device = server.device_by_index(0).unwrap();
    let gi = device.create_gpu_instance(GPU_INSTANCE_PROFILE_7_SLICE).unwrap();
    for _ in 0..4 {
        gi.create_compute_instance(COMPUTE_INSTANCE_PROFILE_1_SLICE).unwrap();
    }

    let workers: Vec<_> = (0..8)
        .map(|_| {
            let gi = gi.clone();
            thread::spawn(move || gi.destroy().is_ok())
        })
        .collect();

    let winners = workers
        .into_iter()
        .map(|worker| worker.join().unwrap())
        .filter(|ok| *ok)
        .count();
    assert_eq!(winners, 1);
    assert_eq!(device.gpu_instance_count(), 0);
}

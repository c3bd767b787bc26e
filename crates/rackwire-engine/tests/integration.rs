//! Integration tests for the threaded engine.
//!
//! Runs the built-in modules on the engine thread while other threads
//! mutate the rack, and checks offline stepping against expected latency.

use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use rackwire_core::{InputRef, OutputRef};
use rackwire_engine::{Engine, EngineConfig};
use rackwire_modules::{Constant, SineOsc, Thru};

fn wait_until(mut condition: impl FnMut() -> bool) {
    let deadline = Instant::now() + Duration::from_secs(10);
    while !condition() {
        assert!(Instant::now() < deadline, "condition not reached in time");
        thread::sleep(Duration::from_millis(1));
    }
}

// ============================================================================
// 1. Offline
// ============================================================================

#[test]
fn offline_chain_matches_hop_latency() {
    let engine = Engine::default();
    let c = engine.add_module(Box::new(Constant::new()));
    engine.set_param(c, Constant::VALUE, 2.5).unwrap();
    let mut prev = c;
    for _ in 0..3 {
        let t = engine.add_module(Box::new(Thru::new()));
        engine
            .add_wire(OutputRef::new(prev, 0), InputRef::new(t, Thru::IN))
            .unwrap();
        prev = t;
    }
    let tail = OutputRef::new(prev, Thru::OUT);

    engine.step_frames(3);
    assert_eq!(engine.output_value(tail).unwrap(), 0.0);
    engine.step_frames(1);
    assert_eq!(engine.output_value(tail).unwrap(), 2.5);
    assert_eq!(engine.frame_count(), 4);
}

// ============================================================================
// 2. Threaded
// ============================================================================

#[test]
fn running_engine_delivers_values() {
    let engine = Engine::default();
    let c = engine.add_module(Box::new(Constant::new()));
    let t = engine.add_module(Box::new(Thru::new()));
    engine
        .add_wire(OutputRef::new(c, Constant::OUT), InputRef::new(t, Thru::IN))
        .unwrap();
    engine.start().unwrap();

    engine.set_param(c, Constant::VALUE, 5.0).unwrap();
    wait_until(|| engine.output_value(OutputRef::new(t, Thru::OUT)).unwrap() == 5.0);
    engine.stop();
}

#[test]
fn concurrent_mutators_keep_the_graph_consistent() {
    let engine = Arc::new(
        Engine::new(EngineConfig {
            frames_per_lock: 16,
            ..EngineConfig::default()
        })
        .unwrap(),
    );
    let osc = engine.add_module(Box::new(SineOsc::new()));
    engine.start().unwrap();

    let workers: Vec<_> = (0..4)
        .map(|_| {
            let engine = Arc::clone(&engine);
            thread::spawn(move || {
                for _ in 0..100 {
                    let t = engine.add_module(Box::new(Thru::new()));
                    let w = engine
                        .add_wire(OutputRef::new(osc, SineOsc::SIN), InputRef::new(t, Thru::IN))
                        .unwrap();
                    let v = engine.input_value(InputRef::new(t, Thru::IN)).unwrap();
                    assert!(v.abs() <= 5.0);
                    engine.remove_wire(w).unwrap();
                    engine.remove_module(t).unwrap();
                }
            })
        })
        .collect();
    for worker in workers {
        worker.join().unwrap();
    }

    engine.with_rack(|rack| {
        assert_eq!(rack.module_count(), 1);
        assert_eq!(rack.wire_count(), 0);
    });
    engine.stop();
    assert!(engine.frame_count() > 0);
}

#[test]
fn sample_rate_change_while_running() {
    let engine = Engine::default();
    engine.add_module(Box::new(SineOsc::new()));
    engine.start().unwrap();
    wait_until(|| engine.frame_count() > 10);

    engine.set_sample_rate(96000.0);
    assert_eq!(engine.sample_rate(), 96000.0);
    let at_change = engine.frame_count();
    wait_until(|| engine.frame_count() > at_change + 10);

    // Rejected rates leave the current one in place.
    engine.set_sample_rate(0.0);
    engine.set_sample_rate(f32::NAN);
    assert_eq!(engine.sample_rate(), 96000.0);
    engine.stop();
}

#[test]
fn pause_keeps_modules_registered() {
    let engine = Engine::default();
    let c = engine.add_module(Box::new(Constant::new()));
    engine.start().unwrap();
    engine.pause();
    thread::sleep(Duration::from_millis(5));
    let frozen = engine.frame_count();

    engine.set_param(c, Constant::VALUE, 1.0).unwrap();
    thread::sleep(Duration::from_millis(10));
    assert_eq!(engine.frame_count(), frozen);
    assert_eq!(engine.output_value(OutputRef::new(c, Constant::OUT)).unwrap(), 0.0);
    assert_eq!(engine.with_rack(|rack| rack.module_count()), 1);

    engine.resume();
    wait_until(|| engine.output_value(OutputRef::new(c, Constant::OUT)).unwrap() == 1.0);
    engine.stop();
}

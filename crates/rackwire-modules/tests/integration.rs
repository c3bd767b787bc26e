//! Integration tests for the built-in modules running inside a rack.

use rackwire_core::{InputRef, OutputRef, Rack};
use rackwire_modules::{Attenuverter, Constant, Mixer, SineOsc, StepSequencer, Thru};

// ============================================================================
// 1. Patches
// ============================================================================

#[test]
fn constant_into_thru() {
    let mut rack = Rack::new(48000.0);
    let c = rack.add_module(Box::new(Constant::new()));
    let t = rack.add_module(Box::new(Thru::new()));
    rack.set_param(c, Constant::VALUE, 5.0).unwrap();
    rack.add_wire(OutputRef::new(c, Constant::OUT), InputRef::new(t, Thru::IN))
        .unwrap();

    rack.step();
    assert_eq!(rack.output_value(OutputRef::new(t, Thru::OUT)).unwrap(), 0.0);
    rack.step();
    assert_eq!(rack.output_value(OutputRef::new(t, Thru::OUT)).unwrap(), 5.0);
}

#[test]
fn mixer_sums_two_attenuated_constants() {
    let mut rack = Rack::new(48000.0);
    let a = rack.add_module(Box::new(Constant::new()));
    let b = rack.add_module(Box::new(Constant::new()));
    let inv = rack.add_module(Box::new(Attenuverter::new()));
    let mix = rack.add_module(Box::new(Mixer::new()));
    rack.set_param(a, Constant::VALUE, 3.0).unwrap();
    rack.set_param(b, Constant::VALUE, 2.0).unwrap();
    rack.set_param(inv, Attenuverter::LEVEL, -1.0).unwrap();

    rack.add_wire(OutputRef::new(a, Constant::OUT), InputRef::new(mix, 0))
        .unwrap();
    rack.add_wire(OutputRef::new(b, Constant::OUT), InputRef::new(inv, Attenuverter::IN))
        .unwrap();
    rack.add_wire(OutputRef::new(inv, Attenuverter::OUT), InputRef::new(mix, 1))
        .unwrap();

    // Two hops on the longest path.
    rack.step_frames(3);
    assert_eq!(rack.output_value(OutputRef::new(mix, Mixer::OUT)).unwrap(), 1.0);
}

#[test]
fn bypassed_module_outputs_zero() {
    let mut rack = Rack::new(48000.0);
    let c = rack.add_module(Box::new(Constant::new()));
    rack.set_param(c, Constant::VALUE, 7.0).unwrap();
    rack.step();
    assert_eq!(rack.output_value(OutputRef::new(c, Constant::OUT)).unwrap(), 7.0);

    rack.set_bypass(c, true).unwrap();
    rack.step();
    assert_eq!(rack.output_value(OutputRef::new(c, Constant::OUT)).unwrap(), 0.0);
}

// ============================================================================
// 2. Clocked sequencing
// ============================================================================

#[test]
fn square_wave_clocks_the_sequencer() {
    let sample_rate = 1000.0;
    let mut rack = Rack::new(sample_rate);
    let osc = rack.add_module(Box::new(SineOsc::new()));
    let seq = rack.add_module(Box::new(StepSequencer::new()));

    // Four octaves below C4, about 16.35 Hz.
    rack.set_param(osc, SineOsc::FREQ, -4.0).unwrap();
    for n in 0..rackwire_modules::step_sequencer::STEPS {
        rack.set_param(seq, StepSequencer::step_param(n), n as f32)
            .unwrap();
    }
    rack.add_wire(
        OutputRef::new(osc, SineOsc::SQR),
        InputRef::new(seq, StepSequencer::CLOCK),
    )
    .unwrap();

    let cv = OutputRef::new(seq, StepSequencer::CV);
    let mut previous = rack.output_value(cv).unwrap();
    let mut changes = 0;
    for _ in 0..1000 {
        rack.step();
        let v = rack.output_value(cv).unwrap();
        if v != previous {
            changes += 1;
        }
        previous = v;
    }
    assert!((15..=18).contains(&changes), "got {changes} step changes");
}

#[test]
fn sequencer_state_survives_data_round_trip_in_rack() {
    let mut rack = Rack::new(48000.0);
    let seq = rack.add_module(Box::new(StepSequencer::new()));
    {
        let (module, _) = rack.module_mut(seq).unwrap();
        module.data_from_json(&serde_json::json!({ "gates": [false, true], "step": 2 }));
    }
    let (module, _) = rack.module(seq).unwrap();
    let data = module.data_to_json().unwrap();
    assert_eq!(data["step"], 2);
    assert_eq!(data["gates"][0], false);
    assert_eq!(data["gates"][1], true);
}

#[test]
fn reset_restores_defaults_and_randomize_respects_ranges() {
    let mut rack = Rack::new(48000.0);
    let seq = rack.add_module(Box::new(StepSequencer::new()));
    rack.set_param(seq, StepSequencer::step_param(0), 9.0).unwrap();
    rack.reset_module(seq).unwrap();
    assert_eq!(rack.param(seq, StepSequencer::step_param(0)).unwrap(), 0.0);

    for _ in 0..20 {
        rack.randomize_module(seq).unwrap();
        // Step count is not randomizable.
        assert_eq!(rack.param(seq, StepSequencer::STEP_COUNT).unwrap(), 8.0);
        for n in 0..8 {
            let v = rack.param(seq, StepSequencer::step_param(n)).unwrap();
            assert!((0.0..=10.0).contains(&v));
        }
    }
}

//! Criterion benchmarks for rackwire modules
//!
//! Steps each module in isolation, outside a rack, to measure its own cost.
//!
//! Run with: cargo bench -p rackwire-modules
#![allow(missing_docs)]

use criterion::{Criterion, black_box, criterion_group, criterion_main};
use rackwire_core::{FrameContext, Module, Ports};
use rackwire_modules::{Attenuverter, Constant, Mixer, SineOsc, StepSequencer, Thru};

const SAMPLE_RATE: f32 = 48000.0;
const FRAMES: usize = 1024;

fn bench_module<M: Module>(c: &mut Criterion, name: &str, mut module: M) {
    let mut ports = Ports::new(&module.layout());
    for input in ports.inputs.iter_mut() {
        input.active = true;
        input.value = 1.5;
    }
    let mut frame = FrameContext::new(SAMPLE_RATE);
    c.bench_function(name, |b| {
        b.iter(|| {
            for _ in 0..FRAMES {
                module.step(&mut ports, black_box(&frame));
                frame.frame += 1;
            }
            black_box(ports.outputs.first().map(|o| o.value))
        })
    });
}

fn bench_all(c: &mut Criterion) {
    bench_module(c, "modules/constant", Constant::new());
    bench_module(c, "modules/thru", Thru::new());
    bench_module(c, "modules/attenuverter", Attenuverter::new());
    bench_module(c, "modules/mixer", Mixer::new());
    bench_module(c, "modules/sine_osc", SineOsc::new());
    bench_module(c, "modules/step_sequencer", StepSequencer::new());
}

criterion_group!(benches, bench_all);
criterion_main!(benches);

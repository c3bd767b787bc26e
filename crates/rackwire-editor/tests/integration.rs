//! Integration tests for rackwire-editor.
//!
//! Round-trips patches through files and checks best-effort loading of
//! damaged patches.

use rackwire_config::{ModuleRecord, PatchDocument, WireRecord};
use rackwire_core::{InputRef, OutputRef};
use rackwire_editor::{EditorError, PatchEditor};
use rackwire_engine::Engine;
use rackwire_modules::{Constant, StepSequencer, Thru};
use rackwire_registry::{FUNDAMENTAL, Registry};
use serde_json::json;
use tempfile::TempDir;

fn editor() -> PatchEditor {
    PatchEditor::new(Engine::default(), Registry::new())
}

// ============================================================================
// 1. Round-trip
// ============================================================================

#[test]
fn save_then_load_restores_the_graph() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("patch.json");

    let mut original = editor();
    let c = original.add_module(FUNDAMENTAL, "Constant").unwrap();
    let seq = original.add_module(FUNDAMENTAL, "StepSequencer").unwrap();
    let t = original.add_module(FUNDAMENTAL, "Thru").unwrap();
    original.set_param(c, Constant::VALUE, 5.0).unwrap();
    original
        .set_param(seq, StepSequencer::step_param(2), 6.0)
        .unwrap();
    original.set_bypass(seq, true).unwrap();
    original
        .connect(OutputRef::new(c, Constant::OUT), InputRef::new(t, Thru::IN))
        .unwrap();
    original
        .connect(
            OutputRef::new(t, Thru::OUT),
            InputRef::new(seq, StepSequencer::CLOCK),
        )
        .unwrap();
    original.save(&path).unwrap();

    let mut restored = editor();
    let report = restored.load(&path).unwrap();
    assert!(report.is_clean(), "{report}");
    assert_eq!(report.modules_loaded, 3);
    assert_eq!(report.wires_loaded, 2);
    assert_eq!(restored.to_patch(), original.to_patch());

    // The restored graph runs: the constant reaches the thru after two frames.
    let ids: Vec<_> = restored.module_ids().collect();
    restored.engine().step_frames(2);
    assert_eq!(
        restored
            .engine()
            .output_value(OutputRef::new(ids[2], Thru::OUT))
            .unwrap(),
        5.0
    );
}

#[test]
fn sequencer_data_survives_a_round_trip() {
    let patch = PatchDocument::new().with_module(
        ModuleRecord::new(FUNDAMENTAL, "StepSequencer")
            .with_data(json!({ "gates": [false, false, true], "step": 6 })),
    );
    let mut ed = editor();
    assert!(ed.load_patch(&patch).is_clean());

    let saved = ed.to_patch();
    let data = saved.modules[0].data.as_ref().unwrap();
    assert_eq!(data["step"], 6);
    assert_eq!(data["gates"][0], false);
    assert_eq!(data["gates"][2], true);
    assert_eq!(data["gates"][3], true);
}

// ============================================================================
// 2. Best-effort load
// ============================================================================

#[test]
fn unknown_modules_and_their_wires_are_skipped() {
    let patch = PatchDocument::new()
        .with_module(ModuleRecord::new(FUNDAMENTAL, "Constant"))
        .with_module(ModuleRecord::new("Missing", "Fuzz"))
        .with_module(ModuleRecord::new(FUNDAMENTAL, "Thru"))
        .with_wire(WireRecord::new(0, 0, 1, 0))
        .with_wire(WireRecord::new(1, 0, 2, 0))
        .with_wire(WireRecord::new(0, 0, 2, 0));

    let mut ed = editor();
    let report = ed.load_patch(&patch);
    assert_eq!(report.modules_loaded, 2);
    assert_eq!(report.wires_loaded, 1);
    // One note for the plugin, one per wire touching it.
    assert_eq!(report.notes.len(), 3, "{report}");
    assert!(report.notes[0].contains("Missing"));

    // The surviving wire now addresses the Thru at position 1.
    let saved = ed.to_patch();
    assert_eq!(saved.wires, vec![WireRecord::new(0, 0, 1, 0)]);
}

#[test]
fn bad_ports_duplicates_and_params_leave_notes() {
    let patch = PatchDocument::new()
        .with_module(ModuleRecord::new(FUNDAMENTAL, "Constant").with_param(0, 99.0))
        .with_module(ModuleRecord::new(FUNDAMENTAL, "Constant").with_param(4, 1.0))
        .with_module(ModuleRecord::new(FUNDAMENTAL, "Thru"))
        .with_wire(WireRecord::new(0, 0, 2, 0))
        .with_wire(WireRecord::new(1, 0, 2, 0))
        .with_wire(WireRecord::new(0, 3, 2, 0))
        .with_wire(WireRecord::new(0, 0, 9, 0));

    let mut ed = editor();
    let report = ed.load_patch(&patch);
    assert_eq!(report.modules_loaded, 3);
    assert_eq!(report.wires_loaded, 1);
    assert_eq!(report.notes.len(), 5, "{report}");

    // The out-of-range value was clamped, not dropped.
    let first = ed.module_ids().next().unwrap();
    assert_eq!(ed.engine().param(first, Constant::VALUE).unwrap(), 10.0);
}

#[test]
fn old_version_loads_with_a_note() {
    let mut patch = PatchDocument::new().with_module(ModuleRecord::new(FUNDAMENTAL, "Thru"));
    patch.version = "0.0.1".to_string();
    let mut ed = editor();
    let report = ed.load_patch(&patch);
    assert_eq!(report.modules_loaded, 1);
    assert_eq!(report.notes.len(), 1);
    assert!(report.notes[0].contains("0.0.1"));
    assert!(ed.to_patch().is_current_version());
}

#[test]
fn structural_error_leaves_graph_untouched() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("broken.json");
    std::fs::write(&path, "{ \"modules\": 42 }").unwrap();

    let mut ed = editor();
    let c = ed.add_module(FUNDAMENTAL, "Constant").unwrap();
    assert!(matches!(ed.load(&path), Err(EditorError::Patch(_))));
    assert_eq!(ed.module_ids().collect::<Vec<_>>(), vec![c]);

    assert!(matches!(
        ed.load(dir.path().join("missing.json")),
        Err(EditorError::Patch(_))
    ));
    assert_eq!(ed.module_count(), 1);
}

#[test]
fn loading_replaces_the_previous_graph() {
    let mut ed = editor();
    for _ in 0..4 {
        ed.add_module(FUNDAMENTAL, "SineOsc").unwrap();
    }
    let patch = PatchDocument::new().with_module(ModuleRecord::new(FUNDAMENTAL, "Mixer"));
    ed.load_patch(&patch);
    assert_eq!(ed.module_count(), 1);
    assert_eq!(ed.engine().with_rack(|rack| rack.module_count()), 1);
}

// ============================================================================
// 3. Running engine
// ============================================================================

#[test]
fn edits_while_the_engine_runs() {
    let mut ed = editor();
    ed.engine().start().unwrap();
    let c = ed.add_module(FUNDAMENTAL, "Constant").unwrap();
    let t = ed.add_module(FUNDAMENTAL, "Thru").unwrap();
    ed.set_param(c, Constant::VALUE, -3.0).unwrap();
    ed.connect(OutputRef::new(c, Constant::OUT), InputRef::new(t, Thru::IN))
        .unwrap();

    let deadline = std::time::Instant::now() + std::time::Duration::from_secs(10);
    while ed
        .engine()
        .output_value(OutputRef::new(t, Thru::OUT))
        .unwrap()
        != -3.0
    {
        assert!(std::time::Instant::now() < deadline, "value never arrived");
        std::thread::sleep(std::time::Duration::from_millis(1));
    }

    let copy = ed.clone_module(c).unwrap();
    ed.delete_module(c).unwrap();
    assert_eq!(ed.engine().param(copy, Constant::VALUE).unwrap(), -3.0);
    ed.engine().stop();
}

//! Patch editor: the interaction-side owner of a running rack.
//!
//! [`PatchEditor`] wraps an [`Engine`] and a [`Registry`] and keeps the
//! bookkeeping the rack itself does not have: which plugin and model each
//! module came from, and the order modules were placed in. All graph
//! changes go through it so patch save sees exactly what is running.

use std::collections::HashMap;
use std::path::Path;

use rackwire_config::validation::{self, ValidationIssue, WireChecker};
use rackwire_config::{ModuleRecord, PATCH_VERSION, ParamRecord, PatchDocument, WireRecord};
use rackwire_core::{
    InputRef, Module, ModuleId, OutputRef, PortKind, Rack, RackError, Wire, WireId,
};
use rackwire_engine::Engine;
use rackwire_registry::Registry;

use crate::connection::{ConnectionFsm, ConnectionState, DragEvent, PortOccupancy, WireAction};
use crate::error::{EditorError, LoadReport};

#[derive(Debug, Clone)]
struct ModuleEntry {
    id: ModuleId,
    plugin: String,
    model: String,
}

/// Editing front end for an engine.
///
/// Modules registered directly on the engine, bypassing the editor, are
/// stepped like any other but are not part of saved patches.
///
/// # Example
///
/// ```rust
/// use rackwire_core::{InputRef, OutputRef};
/// use rackwire_editor::PatchEditor;
/// use rackwire_engine::Engine;
/// use rackwire_registry::{Registry, FUNDAMENTAL};
///
/// let mut editor = PatchEditor::new(Engine::default(), Registry::new());
/// let c = editor.add_module(FUNDAMENTAL, "Constant")?;
/// let t = editor.add_module(FUNDAMENTAL, "Thru")?;
/// editor.set_param(c, 0, 5.0)?;
/// editor.connect(OutputRef::new(c, 0), InputRef::new(t, 0))?;
///
/// editor.engine().step_frames(2);
/// assert_eq!(editor.engine().output_value(OutputRef::new(t, 0))?, 5.0);
/// # Ok::<(), rackwire_editor::EditorError>(())
/// ```
pub struct PatchEditor {
    engine: Engine,
    registry: Registry,
    modules: Vec<ModuleEntry>,
    cable: ConnectionFsm,
}

impl PatchEditor {
    /// Creates an editor over an engine, which should hold no modules yet.
    pub fn new(engine: Engine, registry: Registry) -> Self {
        Self {
            engine,
            registry,
            modules: Vec::new(),
            cable: ConnectionFsm::new(),
        }
    }

    /// The engine being edited.
    pub fn engine(&self) -> &Engine {
        &self.engine
    }

    /// The registry modules are created from.
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Placed modules, in placement order.
    pub fn module_ids(&self) -> impl Iterator<Item = ModuleId> + '_ {
        self.modules.iter().map(|e| e.id)
    }

    /// Number of placed modules.
    pub fn module_count(&self) -> usize {
        self.modules.len()
    }

    /// Plugin and model slugs of a placed module.
    pub fn module_slugs(&self, id: ModuleId) -> Option<(&str, &str)> {
        self.modules
            .iter()
            .find(|e| e.id == id)
            .map(|e| (e.plugin.as_str(), e.model.as_str()))
    }

    // --- Module lifecycle ---

    /// Creates a module from the registry and registers it.
    pub fn add_module(&mut self, plugin: &str, model: &str) -> Result<ModuleId, EditorError> {
        let mut module = self.registry.create(plugin, model)?;
        module.on_create();
        let id = self.engine.add_module(module);
        self.modules.push(ModuleEntry {
            id,
            plugin: plugin.to_string(),
            model: model.to_string(),
        });
        tracing::debug!(%id, plugin, model, "module added");
        Ok(id)
    }

    /// Severs every wire of a module, unregisters it and destroys it.
    pub fn delete_module(&mut self, id: ModuleId) -> Result<(), EditorError> {
        let pos = self.position(id)?;
        let mut module = self.engine.with_rack_mut(|rack| -> Result<Box<dyn Module>, RackError> {
            for wire in rack.wires_of(id) {
                rack.remove_wire(wire)?;
            }
            rack.remove_module(id)
        })?;
        self.modules.remove(pos);
        module.on_delete();
        tracing::debug!(%id, "module deleted");
        Ok(())
    }

    /// Places a copy of a module with the same params, bypass and data.
    /// Wires are not copied.
    pub fn clone_module(&mut self, id: ModuleId) -> Result<ModuleId, EditorError> {
        let record = self.module_record(id)?;
        let clone = self.add_module(&record.plugin, &record.model)?;
        self.apply_record(clone, &record)?;
        tracing::debug!(source = %id, %clone, "module cloned");
        Ok(clone)
    }

    /// Restores a module's params to their defaults.
    pub fn reset_module(&self, id: ModuleId) -> Result<(), EditorError> {
        self.position(id)?;
        Ok(self.engine.reset_module(id)?)
    }

    /// Randomizes a module's randomizable params.
    pub fn randomize_module(&self, id: ModuleId) -> Result<(), EditorError> {
        self.position(id)?;
        Ok(self.engine.randomize_module(id)?)
    }

    /// Bypasses or re-enables a module.
    pub fn set_bypass(&self, id: ModuleId, bypassed: bool) -> Result<(), EditorError> {
        Ok(self.engine.set_bypass(id, bypassed)?)
    }

    /// Sets a param immediately.
    pub fn set_param(&self, id: ModuleId, param: usize, value: f32) -> Result<(), EditorError> {
        Ok(self.engine.set_param(id, param, value)?)
    }

    /// Glides a param to `value`.
    pub fn set_param_smooth(&self, id: ModuleId, param: usize, value: f32) -> Result<(), EditorError> {
        Ok(self.engine.set_param_smooth(id, param, value)?)
    }

    /// Removes every wire and module.
    pub fn clear(&mut self) {
        let ids: Vec<ModuleId> = self.module_ids().collect();
        let (wires, removed) = self.engine.with_rack_mut(|rack| {
            let wires = rack.remove_all_wires();
            let removed = ids
                .iter()
                .filter_map(|&id| rack.remove_module(id).ok())
                .collect::<Vec<_>>();
            (wires, removed)
        });
        let modules = removed.len();
        for mut module in removed {
            module.on_delete();
        }
        self.modules.clear();
        self.cable = ConnectionFsm::new();
        tracing::debug!(modules, wires, "patch cleared");
    }

    // --- Wires ---

    /// Connects `output` to `input`, first removing any wire already
    /// feeding `input`.
    ///
    /// Both ports are checked before anything is removed, so a failed
    /// connect leaves the old wire in place.
    pub fn connect(&self, output: OutputRef, input: InputRef) -> Result<WireId, EditorError> {
        let (bumped, wire) = self
            .engine
            .with_rack_mut(|rack| -> Result<(Option<WireId>, WireId), RackError> {
                check_port(rack, output.module, PortKind::Output, output.port)?;
                check_port(rack, input.module, PortKind::Input, input.port)?;
                let bumped = rack.wire_at_input(input);
                if let Some(old) = bumped {
                    rack.remove_wire(old)?;
                }
                Ok((bumped, rack.add_wire(output, input)?))
            })?;
        if let Some(old) = bumped {
            tracing::debug!(%old, %input, "wire bumped");
        }
        Ok(wire)
    }

    /// Removes a wire.
    pub fn disconnect(&self, wire: WireId) -> Result<Wire, EditorError> {
        Ok(self.engine.remove_wire(wire)?)
    }

    /// Removes every wire touching a module and returns how many there were.
    pub fn disconnect_all(&self, id: ModuleId) -> Result<usize, EditorError> {
        self.position(id)?;
        let count = self.engine.with_rack_mut(|rack| -> Result<usize, RackError> {
            let wires = rack.wires_of(id);
            for &wire in &wires {
                rack.remove_wire(wire)?;
            }
            Ok(wires.len())
        })?;
        Ok(count)
    }

    /// Feeds one cable drag event and applies the resulting wire changes.
    pub fn handle_drag(&mut self, event: DragEvent) -> Result<ConnectionState, EditorError> {
        let actions = self.cable.handle(event, &self.engine);
        for action in actions {
            match action {
                WireAction::Detach(wire) => {
                    self.disconnect(wire)?;
                }
                WireAction::Connect { output, input } => {
                    let wire = self.connect(output, input)?;
                    self.cable.connected(wire);
                }
            }
        }
        Ok(self.cable.state())
    }

    /// Current cable drag state.
    pub fn cable_state(&self) -> ConnectionState {
        self.cable.state()
    }

    // --- Patch documents ---

    /// Serializable record of one placed module.
    pub fn module_record(&self, id: ModuleId) -> Result<ModuleRecord, EditorError> {
        let entry = &self.modules[self.position(id)?];
        Ok(self.engine.with_rack(|rack| record_of(rack, entry)))
    }

    /// Captures the placed modules and their wires.
    pub fn to_patch(&self) -> PatchDocument {
        let positions: HashMap<ModuleId, usize> = self
            .modules
            .iter()
            .enumerate()
            .map(|(i, e)| (e.id, i))
            .collect();
        self.engine.with_rack(|rack| {
            let modules = self.modules.iter().map(|e| record_of(rack, e)).collect();
            let wires = rack
                .wires()
                .filter_map(|w| {
                    Some(WireRecord::new(
                        *positions.get(&w.output.module)?,
                        w.output.port,
                        *positions.get(&w.input.module)?,
                        w.input.port,
                    ))
                })
                .collect();
            PatchDocument {
                version: PATCH_VERSION.to_string(),
                modules,
                wires,
            }
        })
    }

    /// Writes the patch to a JSON file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), EditorError> {
        let path = path.as_ref();
        let patch = self.to_patch();
        patch.save(path)?;
        tracing::info!(
            path = %path.display(),
            modules = patch.modules.len(),
            wires = patch.wires.len(),
            "patch saved"
        );
        Ok(())
    }

    /// Replaces the current graph with a patch file.
    ///
    /// A file that cannot be read or parsed fails without touching the
    /// graph. Otherwise the load is best effort; see
    /// [`load_patch`](Self::load_patch).
    pub fn load(&mut self, path: impl AsRef<Path>) -> Result<LoadReport, EditorError> {
        let path = path.as_ref();
        let patch = PatchDocument::load(path)?;
        let report = self.load_patch(&patch);
        tracing::info!(
            path = %path.display(),
            modules = report.modules_loaded,
            wires = report.wires_loaded,
            notes = report.notes.len(),
            "patch loaded"
        );
        Ok(report)
    }

    /// Replaces the current graph with a patch document.
    ///
    /// Modules whose plugin or model cannot be found are skipped, as are
    /// wires touching them or addressing missing ports. Out-of-range param
    /// values are clamped. Every skip or adjustment leaves a note.
    pub fn load_patch(&mut self, patch: &PatchDocument) -> LoadReport {
        self.clear();
        let mut report = LoadReport::default();

        if let Some(issue) = validation::check_version(patch) {
            note(&mut report, &issue);
        }

        let mut ids = Vec::with_capacity(patch.modules.len());
        let mut layouts = Vec::with_capacity(patch.modules.len());
        for (i, record) in patch.modules.iter().enumerate() {
            let layout = match validation::check_module(&self.registry, i, record) {
                Ok(layout) => layout,
                Err(issue) => {
                    note(&mut report, &issue);
                    ids.push(None);
                    layouts.push(None);
                    continue;
                }
            };
            for issue in validation::check_params(i, record, &layout) {
                note(&mut report, &issue);
            }
            let placed = self
                .add_module(&record.plugin, &record.model)
                .and_then(|id| self.apply_record(id, record).map(|()| id));
            match placed {
                Ok(id) => {
                    ids.push(Some(id));
                    layouts.push(Some(layout));
                    report.modules_loaded += 1;
                }
                Err(e) => {
                    tracing::error!(module = i, error = %e, "module rejected after validation");
                    report.notes.push(format!("module {i}: {e}"));
                    ids.push(None);
                    layouts.push(None);
                }
            }
        }

        let mut checker = WireChecker::new();
        for (i, wire) in patch.wires.iter().enumerate() {
            if let Err(issue) = checker.check(i, wire, &layouts) {
                note(&mut report, &issue);
                continue;
            }
            let (Some(Some(from)), Some(Some(to))) =
                (ids.get(wire.output_module_id), ids.get(wire.input_module_id))
            else {
                continue;
            };
            match self.engine.add_wire(
                OutputRef::new(*from, wire.output_id),
                InputRef::new(*to, wire.input_id),
            ) {
                Ok(_) => report.wires_loaded += 1,
                Err(e) => {
                    tracing::error!(wire = i, error = %e, "wire rejected after validation");
                    report.notes.push(format!("wire {i}: {e}"));
                }
            }
        }
        report
    }

    fn apply_record(&self, id: ModuleId, record: &ModuleRecord) -> Result<(), EditorError> {
        self.engine.with_rack_mut(|rack| -> Result<(), RackError> {
            let count = rack.module_layout(id)?.params.len();
            for p in record.params.iter().filter(|p| p.param_id < count) {
                rack.set_param(id, p.param_id, p.value)?;
            }
            rack.set_bypass(id, record.bypass)?;
            if let Some(data) = &record.data
                && let Some((module, _)) = rack.module_mut(id)
            {
                module.data_from_json(data);
            }
            Ok(())
        })?;
        Ok(())
    }

    fn position(&self, id: ModuleId) -> Result<usize, RackError> {
        self.modules
            .iter()
            .position(|e| e.id == id)
            .ok_or(RackError::ModuleNotFound(id))
    }
}

impl PortOccupancy for Engine {
    fn wire_at_input(&self, input: InputRef) -> Option<(WireId, OutputRef)> {
        self.with_rack(|rack| PortOccupancy::wire_at_input(rack, input))
    }
}

impl PortOccupancy for PatchEditor {
    fn wire_at_input(&self, input: InputRef) -> Option<(WireId, OutputRef)> {
        PortOccupancy::wire_at_input(&self.engine, input)
    }
}

impl core::fmt::Debug for PatchEditor {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("PatchEditor")
            .field("engine", &self.engine)
            .field("modules", &self.modules.len())
            .field("cable", &self.cable.state())
            .finish_non_exhaustive()
    }
}

fn note(report: &mut LoadReport, issue: &ValidationIssue) {
    tracing::warn!(%issue, "patch load");
    report.notes.push(issue.to_string());
}

fn check_port(rack: &Rack, module: ModuleId, kind: PortKind, port: usize) -> Result<(), RackError> {
    let layout = rack.module_layout(module)?;
    let count = match kind {
        PortKind::Input => layout.inputs,
        PortKind::Output => layout.outputs,
        PortKind::Light => layout.lights,
    };
    if port >= count {
        return Err(RackError::port_out_of_range(module, kind, port, count));
    }
    Ok(())
}

fn record_of(rack: &Rack, entry: &ModuleEntry) -> ModuleRecord {
    let mut record = ModuleRecord::new(entry.plugin.clone(), entry.model.clone());
    if let Some((module, ports)) = rack.module(entry.id) {
        record.params = ports
            .params
            .iter()
            .enumerate()
            .map(|(param_id, p)| ParamRecord {
                param_id,
                value: p.value,
            })
            .collect();
        record.data = module.data_to_json();
    }
    record.bypass = rack.is_bypassed(entry.id).unwrap_or(false);
    record
}

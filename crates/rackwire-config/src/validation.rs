//! Patch validation.
//!
//! Checks a [`PatchDocument`] against a [`Registry`] without instantiating
//! anything into a rack. Every problem is reported, not just the first, so
//! the same checks serve `rackwire check` and the editor's best-effort load.
//!
//! # Example
//!
//! ```rust
//! use rackwire_config::{ModuleRecord, PatchDocument, WireRecord, validate_patch};
//! use rackwire_registry::{Registry, FUNDAMENTAL};
//!
//! let patch = PatchDocument::new()
//!     .with_module(ModuleRecord::new(FUNDAMENTAL, "Constant"))
//!     .with_module(ModuleRecord::new("Missing", "Thing"))
//!     .with_wire(WireRecord::new(0, 0, 1, 0));
//!
//! let issues = validate_patch(&Registry::new(), &patch);
//! assert_eq!(issues.len(), 2);
//! ```

use std::collections::HashMap;

use rackwire_core::{ModuleLayout, PortKind};
use rackwire_registry::{Registry, RegistryError};
use thiserror::Error;

use crate::error::PatchError;
use crate::patch::{ModuleRecord, PATCH_VERSION, PatchDocument, WireRecord};

/// How a loader treats an issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    /// Loaded anyway, possibly adjusted.
    Warning,
    /// The module or wire is skipped.
    Error,
}

/// One problem found in a patch.
///
/// `module` and `wire` fields are positions in the patch's arrays.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ValidationIssue {
    /// Patch written by another version.
    #[error("patch was written by version {found:?}; saving converts it to version {current}")]
    VersionMismatch {
        /// Version tag found in the patch.
        found: String,
        /// Version of this program.
        current: &'static str,
    },

    /// No plugin with this slug.
    #[error("module {module}: could not find plugin \"{plugin}\"")]
    UnknownPlugin {
        /// Module position.
        module: usize,
        /// Plugin slug.
        plugin: String,
    },

    /// The plugin has no model with this slug.
    #[error("module {module}: could not find model \"{model}\" in plugin \"{plugin}\"")]
    UnknownModel {
        /// Module position.
        module: usize,
        /// Plugin slug.
        plugin: String,
        /// Model slug.
        model: String,
    },

    /// A param index past the module's param count.
    #[error("module {module}: param {param} out of range (module has {count})")]
    ParamIndexOutOfRange {
        /// Module position.
        module: usize,
        /// Param index.
        param: usize,
        /// Number of params.
        count: usize,
    },

    /// A param value outside its range; loaders clamp it.
    #[error("module {module}: param {param} value {value} out of range [{min}, {max}]")]
    ParamValueOutOfRange {
        /// Module position.
        module: usize,
        /// Param index.
        param: usize,
        /// Stored value.
        value: f32,
        /// Minimum allowed value.
        min: f32,
        /// Maximum allowed value.
        max: f32,
    },

    /// A wire endpoint past the end of the modules array.
    #[error("wire {wire}: module {module} does not exist (patch has {count})")]
    ModuleIndexOutOfRange {
        /// Wire position.
        wire: usize,
        /// Module position referenced.
        module: usize,
        /// Number of modules.
        count: usize,
    },

    /// A wire endpoint on a module that could not be resolved.
    #[error("wire {wire}: module {module} was not loaded")]
    ModuleUnavailable {
        /// Wire position.
        wire: usize,
        /// Module position referenced.
        module: usize,
    },

    /// A wire endpoint past the module's port count.
    #[error("wire {wire}: module {module} has no {kind} {index} (has {count})")]
    PortOutOfRange {
        /// Wire position.
        wire: usize,
        /// Module position.
        module: usize,
        /// Input or output.
        kind: PortKind,
        /// Port index.
        index: usize,
        /// Number of ports of that kind.
        count: usize,
    },

    /// A second wire into an input already fed by an earlier wire.
    #[error("wire {wire}: input {input} of module {module} is already fed by wire {first}")]
    DuplicateInput {
        /// Wire position.
        wire: usize,
        /// Module position.
        module: usize,
        /// Input index.
        input: usize,
        /// Position of the earlier wire.
        first: usize,
    },
}

impl ValidationIssue {
    /// How a loader treats this issue.
    pub fn severity(&self) -> Severity {
        match self {
            ValidationIssue::VersionMismatch { .. } | ValidationIssue::ParamValueOutOfRange { .. } => {
                Severity::Warning
            }
            _ => Severity::Error,
        }
    }

    /// True for issues that cause part of the patch to be skipped.
    pub fn is_error(&self) -> bool {
        self.severity() == Severity::Error
    }
}

/// Resolve a module record's layout through the registry.
pub fn check_module(
    registry: &Registry,
    index: usize,
    record: &ModuleRecord,
) -> Result<ModuleLayout, ValidationIssue> {
    registry
        .layout(&record.plugin, &record.model)
        .map_err(|e| match e {
            RegistryError::PluginNotFound(plugin) => ValidationIssue::UnknownPlugin {
                module: index,
                plugin,
            },
            RegistryError::ModelNotFound { plugin, model } => ValidationIssue::UnknownModel {
                module: index,
                plugin,
                model,
            },
        })
}

/// Check a module record's params against its layout.
pub fn check_params(index: usize, record: &ModuleRecord, layout: &ModuleLayout) -> Vec<ValidationIssue> {
    let mut issues = Vec::new();
    for p in &record.params {
        match layout.params.get(p.param_id) {
            None => issues.push(ValidationIssue::ParamIndexOutOfRange {
                module: index,
                param: p.param_id,
                count: layout.params.len(),
            }),
            Some(d) if !d.contains(p.value) => issues.push(ValidationIssue::ParamValueOutOfRange {
                module: index,
                param: p.param_id,
                value: p.value,
                min: d.min,
                max: d.max,
            }),
            Some(_) => {}
        }
    }
    issues
}

/// Tracks which inputs earlier wires already feed.
#[derive(Debug, Default)]
pub struct WireChecker {
    fed: HashMap<(usize, usize), usize>,
}

impl WireChecker {
    /// Create a checker with no inputs fed.
    pub fn new() -> Self {
        Self::default()
    }

    /// Check one wire against the resolved layouts, in patch order.
    ///
    /// `layouts[i]` is `None` when module `i` could not be resolved. A wire
    /// that passes marks its input as fed.
    pub fn check(
        &mut self,
        index: usize,
        wire: &WireRecord,
        layouts: &[Option<ModuleLayout>],
    ) -> Result<(), ValidationIssue> {
        let out_layout = endpoint(index, wire.output_module_id, layouts)?;
        let in_layout = endpoint(index, wire.input_module_id, layouts)?;

        if wire.output_id >= out_layout.outputs {
            return Err(ValidationIssue::PortOutOfRange {
                wire: index,
                module: wire.output_module_id,
                kind: PortKind::Output,
                index: wire.output_id,
                count: out_layout.outputs,
            });
        }
        if wire.input_id >= in_layout.inputs {
            return Err(ValidationIssue::PortOutOfRange {
                wire: index,
                module: wire.input_module_id,
                kind: PortKind::Input,
                index: wire.input_id,
                count: in_layout.inputs,
            });
        }

        let key = (wire.input_module_id, wire.input_id);
        if let Some(&first) = self.fed.get(&key) {
            return Err(ValidationIssue::DuplicateInput {
                wire: index,
                module: wire.input_module_id,
                input: wire.input_id,
                first,
            });
        }
        self.fed.insert(key, index);
        Ok(())
    }
}

fn endpoint<'a>(
    wire: usize,
    module: usize,
    layouts: &'a [Option<ModuleLayout>],
) -> Result<&'a ModuleLayout, ValidationIssue> {
    match layouts.get(module) {
        None => Err(ValidationIssue::ModuleIndexOutOfRange {
            wire,
            module,
            count: layouts.len(),
        }),
        Some(None) => Err(ValidationIssue::ModuleUnavailable { wire, module }),
        Some(Some(layout)) => Ok(layout),
    }
}

/// Check a version tag against this program's.
pub fn check_version(patch: &PatchDocument) -> Option<ValidationIssue> {
    (!patch.is_current_version()).then(|| ValidationIssue::VersionMismatch {
        found: patch.version.clone(),
        current: PATCH_VERSION,
    })
}

/// Check a whole patch and return every issue, in patch order.
pub fn validate_patch(registry: &Registry, patch: &PatchDocument) -> Vec<ValidationIssue> {
    let mut issues: Vec<ValidationIssue> = check_version(patch).into_iter().collect();

    let layouts: Vec<Option<ModuleLayout>> = patch
        .modules
        .iter()
        .enumerate()
        .map(|(i, record)| match check_module(registry, i, record) {
            Ok(layout) => {
                issues.extend(check_params(i, record, &layout));
                Some(layout)
            }
            Err(issue) => {
                issues.push(issue);
                None
            }
        })
        .collect();

    let mut wires = WireChecker::new();
    for (i, wire) in patch.wires.iter().enumerate() {
        if let Err(issue) = wires.check(i, wire, &layouts) {
            issues.push(issue);
        }
    }
    issues
}

/// Check a whole patch, failing if any issue is an error.
///
/// On success the warnings are returned. On failure
/// [`PatchError::Validation`] carries every issue, warnings included.
pub fn validate_patch_strict(
    registry: &Registry,
    patch: &PatchDocument,
) -> Result<Vec<ValidationIssue>, PatchError> {
    let issues = validate_patch(registry, patch);
    if issues.iter().any(ValidationIssue::is_error) {
        return Err(PatchError::Validation(issues));
    }
    Ok(issues)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rackwire_registry::FUNDAMENTAL;

    fn constant() -> ModuleRecord {
        ModuleRecord::new(FUNDAMENTAL, "Constant")
    }

    fn thru() -> ModuleRecord {
        ModuleRecord::new(FUNDAMENTAL, "Thru")
    }

    #[test]
    fn test_valid_patch_has_no_issues() {
        let patch = PatchDocument::new()
            .with_module(constant().with_param(0, 5.0))
            .with_module(thru())
            .with_wire(WireRecord::new(0, 0, 1, 0));
        assert!(validate_patch(&Registry::new(), &patch).is_empty());
    }

    #[test]
    fn test_unknown_plugin_and_model() {
        let patch = PatchDocument::new()
            .with_module(ModuleRecord::new("Nope", "Constant"))
            .with_module(ModuleRecord::new(FUNDAMENTAL, "Nope"));
        let issues = validate_patch(&Registry::new(), &patch);
        assert_eq!(
            issues,
            vec![
                ValidationIssue::UnknownPlugin {
                    module: 0,
                    plugin: "Nope".to_string()
                },
                ValidationIssue::UnknownModel {
                    module: 1,
                    plugin: FUNDAMENTAL.to_string(),
                    model: "Nope".to_string()
                },
            ]
        );
        assert!(issues.iter().all(ValidationIssue::is_error));
    }

    #[test]
    fn test_param_issues() {
        let patch = PatchDocument::new().with_module(constant().with_param(0, 50.0).with_param(3, 0.0));
        let issues = validate_patch(&Registry::new(), &patch);
        assert_eq!(issues.len(), 2);
        assert!(matches!(
            issues[0],
            ValidationIssue::ParamValueOutOfRange { param: 0, max, .. } if max == 10.0
        ));
        assert_eq!(issues[0].severity(), Severity::Warning);
        assert!(matches!(
            issues[1],
            ValidationIssue::ParamIndexOutOfRange { param: 3, count: 1, .. }
        ));
    }

    #[test]
    fn test_wire_issues() {
        let patch = PatchDocument::new()
            .with_module(constant())
            .with_module(thru())
            .with_module(ModuleRecord::new("Gone", "Module"))
            .with_wire(WireRecord::new(0, 0, 1, 0))
            // Second writer on the same input.
            .with_wire(WireRecord::new(0, 0, 1, 0))
            .with_wire(WireRecord::new(0, 4, 1, 0))
            .with_wire(WireRecord::new(1, 0, 0, 0))
            .with_wire(WireRecord::new(0, 0, 7, 0))
            .with_wire(WireRecord::new(0, 0, 2, 0));
        let issues = validate_patch(&Registry::new(), &patch);

        assert!(matches!(issues[0], ValidationIssue::UnknownPlugin { module: 2, .. }));
        assert!(matches!(
            issues[1],
            ValidationIssue::DuplicateInput { wire: 1, first: 0, .. }
        ));
        assert!(matches!(
            issues[2],
            ValidationIssue::PortOutOfRange { wire: 2, kind: PortKind::Output, index: 4, count: 1, .. }
        ));
        // Constant has no inputs.
        assert!(matches!(
            issues[3],
            ValidationIssue::PortOutOfRange { wire: 3, kind: PortKind::Input, count: 0, .. }
        ));
        assert!(matches!(
            issues[4],
            ValidationIssue::ModuleIndexOutOfRange { wire: 4, module: 7, count: 3 }
        ));
        assert!(matches!(
            issues[5],
            ValidationIssue::ModuleUnavailable { wire: 5, module: 2 }
        ));
        assert_eq!(issues.len(), 6);
    }

    #[test]
    fn test_version_mismatch_is_a_warning() {
        let mut patch = PatchDocument::new().with_module(constant());
        patch.version = "0.0.0-old".to_string();
        let issues = validate_patch(&Registry::new(), &patch);
        assert_eq!(issues.len(), 1);
        assert!(!issues[0].is_error());
        assert!(issues[0].to_string().contains("0.0.0-old"));
    }

    #[test]
    fn test_self_loop_is_valid() {
        let patch = PatchDocument::new()
            .with_module(thru())
            .with_wire(WireRecord::new(0, 0, 0, 0));
        assert!(validate_patch(&Registry::new(), &patch).is_empty());
    }

    #[test]
    fn test_strict_validation() {
        let mut patch = PatchDocument::new().with_module(constant()).with_module(thru());
        patch.version = "0.0.0-old".to_string();
        let warnings = validate_patch_strict(&Registry::new(), &patch).unwrap();
        assert_eq!(warnings.len(), 1);

        let patch = patch.with_wire(WireRecord::new(0, 0, 5, 0));
        match validate_patch_strict(&Registry::new(), &patch) {
            Err(PatchError::Validation(issues)) => {
                assert_eq!(issues.len(), 2);
                assert!(!issues[0].is_error());
                assert!(issues[1].is_error());
            }
            other => panic!("expected a validation error, got {other:?}"),
        }
    }
}

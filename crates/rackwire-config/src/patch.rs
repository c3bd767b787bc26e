//! Patch file format and operations.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::Path;

use crate::error::PatchError;

/// Version tag written into every saved patch.
pub const PATCH_VERSION: &str = env!("CARGO_PKG_VERSION");

/// A saved module graph.
///
/// Modules are stored in order; wires address them by position in
/// [`modules`](Self::modules), never by runtime id.
///
/// # JSON Format
///
/// ```json
/// {
///   "version": "0.1.0",
///   "modules": [
///     { "plugin": "Fundamental", "model": "Constant",
///       "params": [ { "paramId": 0, "value": 5.0 } ] },
///     { "plugin": "Fundamental", "model": "Thru", "params": [] }
///   ],
///   "wires": [
///     { "outputModuleId": 0, "outputId": 0, "inputModuleId": 1, "inputId": 0 }
///   ]
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PatchDocument {
    /// Version of the program that wrote the patch.
    #[serde(default)]
    pub version: String,

    /// Modules in registration order.
    #[serde(default)]
    pub modules: Vec<ModuleRecord>,

    /// Wires between modules.
    #[serde(default)]
    pub wires: Vec<WireRecord>,
}

/// One module in a patch.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ModuleRecord {
    /// Plugin slug.
    pub plugin: String,

    /// Model slug within the plugin.
    pub model: String,

    /// Param values by index.
    #[serde(default)]
    pub params: Vec<ParamRecord>,

    /// Whether the module was bypassed.
    #[serde(default, skip_serializing_if = "core::ops::Not::not")]
    pub bypass: bool,

    /// Module-specific state, opaque to the patch format.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

/// One param value.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct ParamRecord {
    /// Param index within the module.
    #[serde(rename = "paramId")]
    pub param_id: usize,

    /// Stored value.
    pub value: f32,
}

/// One wire, addressed by module position and port index.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "camelCase")]
pub struct WireRecord {
    /// Position of the source module in the modules array.
    pub output_module_id: usize,
    /// Output index on the source module.
    pub output_id: usize,
    /// Position of the destination module in the modules array.
    pub input_module_id: usize,
    /// Input index on the destination module.
    pub input_id: usize,
}

impl WireRecord {
    /// Create a wire record.
    pub const fn new(
        output_module_id: usize,
        output_id: usize,
        input_module_id: usize,
        input_id: usize,
    ) -> Self {
        Self {
            output_module_id,
            output_id,
            input_module_id,
            input_id,
        }
    }
}

impl ModuleRecord {
    /// Create a record with no params or data.
    pub fn new(plugin: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            plugin: plugin.into(),
            model: model.into(),
            params: Vec::new(),
            bypass: false,
            data: None,
        }
    }

    /// Set a param value, replacing an earlier one for the same index.
    pub fn with_param(mut self, param_id: usize, value: f32) -> Self {
        match self.params.iter_mut().find(|p| p.param_id == param_id) {
            Some(p) => p.value = value,
            None => self.params.push(ParamRecord { param_id, value }),
        }
        self
    }

    /// Set the bypass flag.
    pub fn with_bypass(mut self, bypass: bool) -> Self {
        self.bypass = bypass;
        self
    }

    /// Attach module data.
    pub fn with_data(mut self, data: Value) -> Self {
        self.data = Some(data);
        self
    }

    /// Stored value for a param, if any.
    pub fn param(&self, param_id: usize) -> Option<f32> {
        self.params
            .iter()
            .find(|p| p.param_id == param_id)
            .map(|p| p.value)
    }
}

impl PatchDocument {
    /// Create an empty patch stamped with the current version.
    pub fn new() -> Self {
        Self {
            version: PATCH_VERSION.to_string(),
            modules: Vec::new(),
            wires: Vec::new(),
        }
    }

    /// Add a module.
    pub fn with_module(mut self, module: ModuleRecord) -> Self {
        self.modules.push(module);
        self
    }

    /// Add a wire.
    pub fn with_wire(mut self, wire: WireRecord) -> Self {
        self.wires.push(wire);
        self
    }

    /// Load a patch from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, PatchError> {
        let path = path.as_ref();
        let content =
            std::fs::read_to_string(path).map_err(|e| PatchError::read_file(path, e))?;
        Self::from_json(&content)
    }

    /// Parse a patch from a JSON string.
    pub fn from_json(json: &str) -> Result<Self, PatchError> {
        serde_json::from_str(json).map_err(PatchError::JsonParse)
    }

    /// Save the patch as pretty-printed JSON, creating parent directories.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), PatchError> {
        let path = path.as_ref();

        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            std::fs::create_dir_all(parent).map_err(|e| PatchError::create_dir(parent, e))?;
        }

        let content = self.to_json()?;
        std::fs::write(path, content).map_err(|e| PatchError::write_file(path, e))?;
        Ok(())
    }

    /// Convert the patch to a pretty-printed JSON string.
    pub fn to_json(&self) -> Result<String, PatchError> {
        serde_json::to_string_pretty(self).map_err(PatchError::JsonSerialize)
    }

    /// True when the patch was written by this version.
    pub fn is_current_version(&self) -> bool {
        self.version == PATCH_VERSION
    }

    /// Number of modules.
    pub fn len(&self) -> usize {
        self.modules.len()
    }

    /// True when the patch has no modules.
    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }
}

impl Default for PatchDocument {
    fn default() -> Self {
        Self::new()
    }
}

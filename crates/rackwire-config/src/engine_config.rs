//! Engine configuration file.

use std::path::Path;

use rackwire_engine::EngineConfig;

use crate::error::PatchError;

/// Load and validate an engine configuration from a TOML file.
///
/// Missing keys take their defaults, so an empty file is valid.
pub fn load_engine_config(path: impl AsRef<Path>) -> Result<EngineConfig, PatchError> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path).map_err(|e| PatchError::read_file(path, e))?;
    engine_config_from_toml(&content)
}

/// Parse and validate an engine configuration from a TOML string.
pub fn engine_config_from_toml(toml_str: &str) -> Result<EngineConfig, PatchError> {
    let config: EngineConfig = toml::from_str(toml_str)?;
    config.validate()?;
    Ok(config)
}

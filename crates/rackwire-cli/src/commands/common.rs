//! Shared CLI helpers used across multiple commands.

use std::path::Path;

use rackwire_config::{Registry, load_engine_config};
use rackwire_editor::{LoadReport, PatchEditor};
use rackwire_engine::{Engine, EngineConfig};

use crate::GlobalArgs;

/// Engine configuration from `--config`, with `--sample-rate` applied on top.
pub fn engine_config(global: &GlobalArgs) -> anyhow::Result<EngineConfig> {
    let mut config = match &global.config {
        Some(path) => load_engine_config(path)?,
        None => EngineConfig::default(),
    };
    if let Some(rate) = global.sample_rate {
        config.sample_rate = rate;
        config.validate()?;
    }
    Ok(config)
}

/// Loads a patch into a fresh editor and echoes the load notes.
pub fn open_patch(path: &Path, config: EngineConfig) -> anyhow::Result<(PatchEditor, LoadReport)> {
    let mut editor = PatchEditor::new(Engine::new(config)?, Registry::new());
    let report = editor.load(path)?;
    if !report.is_clean() {
        eprintln!("{report}");
    }
    Ok((editor, report))
}

/// Parse a `module:output` tap for clap's `value_parser`.
pub fn parse_tap(s: &str) -> Result<(usize, usize), String> {
    let (module, output) = s
        .split_once(':')
        .ok_or_else(|| format!("Invalid tap: '{s}' (expected module:output)"))?;
    let module = module
        .trim()
        .parse()
        .map_err(|_| format!("Invalid module index in tap '{s}'"))?;
    let output = output
        .trim()
        .parse()
        .map_err(|_| format!("Invalid output index in tap '{s}'"))?;
    Ok((module, output))
}

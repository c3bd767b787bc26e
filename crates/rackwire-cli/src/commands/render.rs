//! Offline render command.

use std::path::PathBuf;

use clap::Args;
use rackwire_core::OutputRef;

use super::common::{engine_config, open_patch, parse_tap};
use crate::GlobalArgs;

#[derive(Args)]
pub struct RenderArgs {
    /// Patch file (JSON)
    patch: PathBuf,

    /// Frames to step
    #[arg(short = 'n', long, default_value = "1")]
    frames: usize,

    /// Output to print, as `module:output` by patch position (repeatable).
    /// Without taps every output is printed.
    #[arg(short, long, value_parser = parse_tap)]
    tap: Vec<(usize, usize)>,
}

pub fn run(args: RenderArgs, global: &GlobalArgs) -> anyhow::Result<()> {
    let (editor, _) = open_patch(&args.patch, engine_config(global)?)?;
    let ids: Vec<_> = editor.module_ids().collect();
    let engine = editor.engine();

    let taps: Vec<(usize, usize)> = if args.tap.is_empty() {
        engine.with_rack(|rack| {
            ids.iter()
                .enumerate()
                .flat_map(|(pos, &id)| {
                    let outputs = rack.module_layout(id).map_or(0, |l| l.outputs);
                    (0..outputs).map(move |o| (pos, o))
                })
                .collect()
        })
    } else {
        args.tap.clone()
    };

    let targets = taps
        .iter()
        .map(|&(pos, o)| {
            let id = ids
                .get(pos)
                .ok_or_else(|| anyhow::anyhow!("No module at position {pos}"))?;
            Ok(OutputRef::new(*id, o))
        })
        .collect::<anyhow::Result<Vec<_>>>()?;

    engine.step_frames(args.frames);
    tracing::debug!(frames = args.frames, "render finished");

    for (&(pos, o), target) in taps.iter().zip(&targets) {
        let value = engine.output_value(*target)?;
        let name = editor.module_slugs(target.module).map_or("?", |(_, model)| model);
        println!("{pos}:{o} {name} {value:.6}");
    }
    Ok(())
}

//! Template patch command.

use std::path::PathBuf;

use clap::Args;
use rackwire_config::{ModuleRecord, PatchDocument, WireRecord};
use rackwire_registry::FUNDAMENTAL;

#[derive(Args)]
pub struct NewArgs {
    /// Where to write the patch
    output: PathBuf,

    /// Overwrite an existing file
    #[arg(short, long)]
    force: bool,
}

pub fn run(args: NewArgs) -> anyhow::Result<()> {
    if args.output.exists() && !args.force {
        anyhow::bail!(
            "{} already exists (use --force to overwrite)",
            args.output.display()
        );
    }

    template().save(&args.output)?;
    println!("Wrote {}", args.output.display());
    Ok(())
}

/// A 5 V constant feeding a Thru.
fn template() -> PatchDocument {
    PatchDocument::new()
        .with_module(ModuleRecord::new(FUNDAMENTAL, "Constant").with_param(0, 5.0))
        .with_module(ModuleRecord::new(FUNDAMENTAL, "Thru"))
        .with_wire(WireRecord::new(0, 0, 1, 0))
}

//! Patch validation command.

use std::path::PathBuf;

use clap::Args;
use rackwire_config::{
    PatchDocument, PatchError, Registry, Severity, ValidationIssue, validate_patch_strict,
};

#[derive(Args)]
pub struct CheckArgs {
    /// Patch file (JSON)
    patch: PathBuf,
}

pub fn run(args: CheckArgs) -> anyhow::Result<()> {
    let patch = PatchDocument::load(&args.patch)?;
    println!(
        "{}: {} modules, {} wires",
        args.patch.display(),
        patch.modules.len(),
        patch.wires.len()
    );

    match validate_patch_strict(&Registry::new(), &patch) {
        Ok(warnings) => {
            print_issues(&warnings);
            println!("OK");
            Ok(())
        }
        Err(PatchError::Validation(issues)) => {
            print_issues(&issues);
            let errors = issues.iter().filter(|i| i.is_error()).count();
            anyhow::bail!("{errors} error(s) in {}", args.patch.display())
        }
        Err(e) => Err(e.into()),
    }
}

fn print_issues(issues: &[ValidationIssue]) {
    for issue in issues {
        let label = match issue.severity() {
            Severity::Warning => "warning",
            Severity::Error => "error",
        };
        println!("  {label}: {issue}");
    }
}

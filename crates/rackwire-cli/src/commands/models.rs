//! Model listing command.

#![allow(clippy::print_literal)] // Table headers use literal strings

use clap::Args;
use rackwire_config::Registry;

#[derive(Args)]
pub struct ModelsArgs {
    /// Only list models of this plugin
    #[arg(long)]
    plugin: Option<String>,

    /// Show parameter ranges
    #[arg(short, long)]
    verbose: bool,
}

pub fn run(args: ModelsArgs) -> anyhow::Result<()> {
    let registry = Registry::new();

    println!(
        "{:14}  {:14}  {:>6}  {:>6}  {:>7}  {}",
        "Plugin", "Model", "Params", "Inputs", "Outputs", "Tags"
    );
    println!(
        "{:14}  {:14}  {:>6}  {:>6}  {:>7}  {}",
        "------", "-----", "------", "------", "-------", "----"
    );

    let mut listed = 0;
    for (plugin, model) in registry.models() {
        if args.plugin.as_deref().is_some_and(|p| p != plugin.slug) {
            continue;
        }
        let layout = registry.layout(plugin.slug, model.slug)?;
        let tags: Vec<&str> = model.tags.iter().map(|t| t.name()).collect();
        println!(
            "{:14}  {:14}  {:>6}  {:>6}  {:>7}  {}",
            plugin.slug,
            model.slug,
            layout.params.len(),
            layout.inputs,
            layout.outputs,
            tags.join(", ")
        );
        if args.verbose {
            println!("    {}", model.description);
            for (i, p) in layout.params.iter().enumerate() {
                println!(
                    "    [{i}] {:14} {:>8.2} .. {:<8.2} default {:.2}",
                    p.name, p.min, p.max, p.default
                );
            }
        }
        listed += 1;
    }

    if listed == 0
        && let Some(plugin) = &args.plugin
    {
        anyhow::bail!("Unknown plugin: {plugin}");
    }
    Ok(())
}

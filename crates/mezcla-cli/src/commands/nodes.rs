//! List available node kinds.

use clap::Args;
use mezcla_core::NodeKind;

/// List available node kinds and their parameters.
#[derive(Args)]
pub struct NodesArgs {}

/// Run the nodes command.
pub fn run(_args: NodesArgs) -> anyhow::Result<()> {
    let kinds = [
        NodeKind::Source(Vec::new()),
        NodeKind::Volume,
        NodeKind::Soften,
        NodeKind::Join,
        NodeKind::Crop,
        NodeKind::Fade,
        NodeKind::Speed,
    ];

    println!("Available Nodes");
    println!();
    for kind in &kinds {
        let inputs: Vec<String> = kind
            .input_ports()
            .iter()
            .map(|p| {
                if p.multi_source {
                    format!("{}*", p.name)
                } else {
                    p.name.to_string()
                }
            })
            .collect();
        println!(
            "  {:<8} in: [{}]  out: [{}]",
            kind.tag(),
            inputs.join(", "),
            kind.output_ports().join(", ")
        );
        for d in kind.param_descriptors() {
            println!(
                "    {:<10} {} .. {} (default {})",
                d.name, d.min, d.max, d.default
            );
        }
    }
    println!();
    println!("(* = port accepts multiple connections)");
    Ok(())
}

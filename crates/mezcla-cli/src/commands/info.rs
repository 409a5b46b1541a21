//! Display session file contents.

use std::path::PathBuf;

use clap::Args;
use mezcla_config::GraphSnapshot;

/// Display a session file's nodes and edges.
#[derive(Args)]
pub struct InfoArgs {
    /// Path to the session file
    pub session: PathBuf,
}

/// Run the info command.
pub fn run(args: InfoArgs) -> anyhow::Result<()> {
    let snapshot = GraphSnapshot::load(&args.session)?;

    println!("Session:  {}", args.session.display());
    println!(
        "Contents: {} node(s), {} edge(s)",
        snapshot.nodes.len(),
        snapshot.edges.len()
    );
    println!();

    for node in &snapshot.nodes {
        if node.params.is_empty() {
            println!("  [{}] {}", node.id, node.kind);
        } else {
            let params: Vec<String> = node
                .params
                .iter()
                .map(|(name, value)| format!("{name}={value}"))
                .collect();
            println!("  [{}] {} ({})", node.id, node.kind, params.join(", "));
        }
    }

    if !snapshot.edges.is_empty() {
        println!();
        for edge in &snapshot.edges {
            println!(
                "  {}:{} -> {}:{}",
                edge.from, edge.from_port, edge.to, edge.to_port
            );
        }
    }
    Ok(())
}

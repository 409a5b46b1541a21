//! Render a session to a WAV file.

use std::path::PathBuf;

use clap::Args;
use mezcla_config::GraphSnapshot;
use mezcla_core::{AudioEnvironment, NodeId, NodeKind, Warning};
use mezcla_io::{decode_clip, export_final};

#[derive(Args)]
pub struct RenderArgs {
    /// Session file (TOML)
    #[arg(value_name = "SESSION")]
    session: PathBuf,

    /// Output WAV file
    #[arg(value_name = "OUTPUT")]
    output: PathBuf,

    /// Seed a source node: "<node_id>=<wav_path>" (repeatable)
    #[arg(short, long, value_parser = parse_seed, number_of_values = 1)]
    input: Vec<(u32, PathBuf)>,

    /// Node to render (session node ID); defaults to the single sink
    #[arg(short, long)]
    target: Option<u32>,

    /// Output bit depth (16, 24, or 32)
    #[arg(long, default_value = "16")]
    bit_depth: u16,
}

fn parse_seed(s: &str) -> Result<(u32, PathBuf), String> {
    let (id, path) = s
        .split_once('=')
        .ok_or_else(|| format!("invalid input format: '{s}' (expected node_id=path)"))?;
    let id = id
        .parse::<u32>()
        .map_err(|_| format!("invalid node id: '{id}'"))?;
    Ok((id, PathBuf::from(path)))
}

pub fn run(args: RenderArgs) -> anyhow::Result<()> {
    let snapshot = GraphSnapshot::load(&args.session)?;
    let (mut graph, report) = snapshot.restore(AudioEnvironment::default())?;
    for entry in &report.skipped {
        tracing::warn!(?entry, "session entry skipped");
    }

    for (session_id, path) in &args.input {
        let node = *report
            .id_map
            .get(session_id)
            .ok_or_else(|| anyhow::anyhow!("session has no node {session_id}"))?;
        let clip = decode_clip(&std::fs::read(path)?, path.display().to_string())?;
        println!(
            "Seeding node {session_id} with {} ({} frames, {} Hz)",
            path.display(),
            clip.buffer.len(),
            clip.buffer.sample_rate()
        );
        graph.set_source_clips(node, vec![clip])?;
    }

    let target = resolve_target(&graph, &report.id_map, args.target)?;

    // Warn about sources left unseeded before burning the render.
    for id in graph.nodes().collect::<Vec<_>>() {
        if matches!(graph.kind(id), Some(NodeKind::Source(clips)) if clips.is_empty()) {
            tracing::warn!(node = %id, "source node has no audio");
        }
    }

    println!("Rendering...");
    let bytes = export_final(&mut graph, target, args.bit_depth)?;
    std::fs::write(&args.output, &bytes)?;
    println!("Wrote {} ({} bytes)", args.output.display(), bytes.len());

    // Surface warnings the render produced anywhere in the graph.
    for id in graph.nodes().collect::<Vec<_>>() {
        let warning = graph.warning(id);
        if warning != Warning::None {
            println!("  warning at node {}: {warning:?}", id.index());
        }
    }
    Ok(())
}

/// Picks the render target: an explicit session ID, or the graph's single
/// sink (the one node with no outgoing edges).
fn resolve_target(
    graph: &mezcla_core::AudioGraph,
    id_map: &std::collections::HashMap<u32, NodeId>,
    explicit: Option<u32>,
) -> anyhow::Result<NodeId> {
    if let Some(session_id) = explicit {
        return id_map
            .get(&session_id)
            .copied()
            .ok_or_else(|| anyhow::anyhow!("session has no node {session_id}"));
    }

    let mut sinks = graph
        .nodes()
        .filter(|&id| graph.edges().all(|(_, e)| e.from != id));
    let first = sinks
        .next()
        .ok_or_else(|| anyhow::anyhow!("session has no nodes"))?;
    if let Some(second) = sinks.next() {
        anyhow::bail!(
            "session has multiple sinks (nodes {} and {}); pick one with --target",
            first.index(),
            second.index()
        );
    }
    Ok(first)
}

//! Mezcla Core - dataflow audio editing engine
//!
//! This crate is the engine behind the mezcla editor: a typed dataflow graph
//! of audio transforms with incremental, cancellation-aware evaluation.
//!
//! # Core Abstractions
//!
//! ## Buffers
//!
//! - [`SampleBuffer`] - planar f32 audio, equal-length channels, one rate
//! - [`AudioClip`] - a labeled, shareable (`Arc`) buffer flowing along edges
//! - [`AudioEnvironment`] - processing defaults (sample rate, channel fill)
//!
//! ## Kernels
//!
//! Pure buffer-to-buffer transforms in [`kernels`]: gain with clipping
//! management ([`apply_gain`], [`ClipMode`]), one-pole low-pass [`soften`],
//! [`crop`], [`fade`], playback-rate [`change_speed`], concatenation
//! [`concat`], and linear-interpolation [`resample_to_rate`]. Kernels clamp
//! out-of-range and non-finite parameters instead of failing.
//!
//! ## Graph
//!
//! - [`AudioGraph`] - nodes, edges, parameters; the single mutation path
//! - [`NodeKind`] - the closed set of transforms with fixed port tables
//! - [`Warning`] - per-node non-fatal signals the UI polls
//!
//! ## Evaluation
//!
//! Edits mark the downstream closure [`NodeState::Dirty`] and bump an edit
//! serial. [`AudioGraph::begin_pass`] plus [`AudioGraph::step`] recompute
//! one node at a time, committing only while no newer edit exists;
//! [`AudioGraph::evaluate`] pumps passes to completion, restarting when an
//! edit supersedes one mid-flight.
//!
//! # Example
//!
//! ```rust,ignore
//! use mezcla_core::{AudioEnvironment, AudioGraph, NodeKind};
//!
//! let mut graph = AudioGraph::new(AudioEnvironment::default());
//! let source = graph.add_node(NodeKind::Source(vec![clip]));
//! let volume = graph.add_node(NodeKind::Volume);
//! graph.connect(source, "audio", volume, "audio")?;
//! graph.set_param(volume, "gain", 1.5)?;
//! let clips = graph.evaluate(volume)?;
//! ```

pub mod buffer;
pub mod env;
pub mod graph;
pub mod kernels;

pub use buffer::{AudioClip, BufferError, SampleBuffer};
pub use env::{AudioEnvironment, ChannelFill};
pub use graph::{
    AudioGraph, CommandOutcome, Edge, EdgeId, EvaluationPass, GraphCommand, GraphError,
    InputPortDecl, NodeId, NodeKind, NodeState, ParamDescriptor, ProcessError, StepOutcome,
    Warning,
};
pub use kernels::{
    ClipMode, GainResult, MAX_GAIN, apply_gain, change_speed, concat, crop, fade, resample_to_rate,
    soften,
};

//! The editable audio dataflow graph and its incremental scheduler.
//!
//! - [`node`] - node kinds, port and parameter tables, states, warnings
//! - [`edge`] - directed port-to-port connections
//! - [`process`] - the uniform per-node evaluation contract
//! - [`scheduler`] - [`AudioGraph`]: mutations, dirty tracking, evaluation

pub mod edge;
pub mod node;
pub(crate) mod process;
pub mod scheduler;

pub use edge::{Edge, EdgeId};
pub use node::{InputPortDecl, NodeId, NodeKind, NodeState, ParamDescriptor, Warning};
pub use process::ProcessError;
pub use scheduler::{
    AudioGraph, CommandOutcome, EvaluationPass, GraphCommand, GraphError, StepOutcome,
};

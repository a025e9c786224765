//! Animstate Core (engine-agnostic)
//!
//! A compiled, immutable state graph ([`StateMachineBlob`]) shared across
//! many concurrently-running instances; each instance carries only small
//! mutable playback state. Per-tick evaluation (which transition starts,
//! how two states blend) is deterministic, allocation-free, and safe to run
//! in parallel across instances without synchronization.
//!
//! Pipeline: [`GraphDesc`] → [`compile`] → [`StateMachineBlob`] (read-only,
//! `Arc`-shared) ⇄ per-instance [`evaluate`] + [`advance`] each tick.

pub mod blend;
pub mod blob;
pub mod compile;
pub mod config;
pub mod engine;
pub mod evaluate;
pub mod graph;
pub mod ids;
pub mod instance;
pub mod params;

// Re-exports for consumers (adapters)
pub use blend::{advance, SampleDescriptor};
pub use blob::{
    CompiledState, CompiledTransition, Condition, ParamDef, Predicate, StateKind, StateMachineBlob,
};
pub use compile::{compile, CompileError};
pub use config::{Config, InterruptPolicy};
pub use engine::Engine;
pub use evaluate::{evaluate, TransitionChoice};
pub use graph::{
    parse_graph_json, ConditionDesc, ConditionTestDesc, GraphDesc, GraphJsonError, IntOp,
    ParamDesc, StateDesc, StateKindDesc, TransitionDesc,
};
pub use ids::{IdAllocator, InstId, ParamIx, StateIx};
pub use instance::{ActiveTransition, Instance, Playback};
pub use params::{ParamSet, ParamType, ParamValue};

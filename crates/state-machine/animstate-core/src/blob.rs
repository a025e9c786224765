//! Compiled, immutable state-machine blob.
//!
//! Everything here is addressed by dense index; no names are consulted on
//! the tick path. A blob is built once by [`crate::compile`], shared by
//! reference (`Arc`) across every instance of the same graph, and never
//! mutated afterwards, so unsynchronized concurrent reads are safe.

use serde::{Deserialize, Serialize};

use crate::graph::IntOp;
use crate::params::{ParamType, ParamValue};
use crate::ids::{ParamIx, StateIx};

/// Predicate half of a compiled condition.
#[derive(Copy, Clone, Debug, Serialize, Deserialize, PartialEq)]
pub enum Predicate {
    BoolEq(bool),
    Int(IntOp, i32),
}

/// A compiled condition: one predicate over one resolved parameter.
#[derive(Copy, Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Condition {
    pub param: ParamIx,
    pub pred: Predicate,
}

impl Condition {
    /// True when the predicate holds for the snapshot. Total: the compiler
    /// guarantees the parameter's type matches the predicate, so the
    /// mismatch arms are unreachable for a valid blob.
    #[inline]
    pub fn holds(&self, value: ParamValue) -> bool {
        match (self.pred, value) {
            (Predicate::BoolEq(target), ParamValue::Bool(v)) => v == target,
            (Predicate::Int(op, rhs), ParamValue::Int(v)) => op.compare(v, rhs),
            _ => false,
        }
    }
}

/// A compiled transition. Destination indices are validated at compile time
/// and never re-checked at runtime.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct CompiledTransition {
    pub target: StateIx,
    /// Blend duration in seconds; 0 switches instantly.
    pub duration: f32,
    /// Normalized playback point the source must reach first; `None` = no
    /// gate (authoring `0.0` is normalized to `None` by the compiler).
    pub exit_time: Option<f32>,
    pub conditions: Vec<Condition>,
}

/// What a compiled state plays.
#[derive(Copy, Clone, Debug, Serialize, Deserialize, PartialEq)]
pub enum StateKind {
    SingleClip,
    /// 1D blend over a float parameter. The parameter is resolved here so
    /// the host's sampling stage never does a name lookup.
    LinearBlend { param: ParamIx },
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct CompiledState {
    pub name: String,
    pub kind: StateKind,
    pub speed: f32,
    pub looping: bool,
    /// Clip length in seconds; the compiler guarantees finite and > 0.
    pub length: f32,
    /// Outgoing transitions in declared order.
    pub transitions: Vec<CompiledTransition>,
}

impl CompiledState {
    /// Advance a local time by `dt` under this state's playback rules:
    /// looping states wrap into `[0, length)`, non-looping states clamp to
    /// `[0, length]`.
    #[inline]
    pub fn advance_time(&self, time: f32, dt: f32) -> f32 {
        let t = time + dt * self.speed;
        if self.looping {
            t.rem_euclid(self.length)
        } else {
            t.clamp(0.0, self.length)
        }
    }

    /// Normalized playback position in [0, 1] for exit-time gating.
    #[inline]
    pub fn normalized(&self, time: f32) -> f32 {
        (time / self.length).clamp(0.0, 1.0)
    }
}

/// One entry in a blob's parameter table.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct ParamDef {
    pub name: String,
    pub ty: ParamType,
    pub default: ParamValue,
}

/// The compiled, immutable graph shared by every instance bound to it.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct StateMachineBlob {
    pub name: String,
    pub default_state: StateIx,
    pub states: Vec<CompiledState>,
    /// Evaluated before any per-state transition, in declared order.
    pub any_transitions: Vec<CompiledTransition>,
    pub params: Vec<ParamDef>,
}

impl StateMachineBlob {
    #[inline]
    pub fn state(&self, ix: StateIx) -> &CompiledState {
        &self.states[ix.index()]
    }

    /// Name-based lookups are for hosts wiring parameters up at bind time;
    /// the tick path uses indices only.
    pub fn param_index(&self, name: &str) -> Option<ParamIx> {
        self.params
            .iter()
            .position(|p| p.name == name)
            .map(|i| ParamIx(i as u32))
    }

    pub fn state_index(&self, name: &str) -> Option<StateIx> {
        self.states
            .iter()
            .position(|s| s.name == name)
            .map(|i| StateIx(i as u32))
    }
}

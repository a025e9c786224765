//! Authoring-time graph description.
//!
//! A `GraphDesc` is a plain value: states, per-state transitions, a global
//! any-state transition list, and a parameter table, all referencing each
//! other by name. It is consumed exactly once by [`crate::compile`]; no
//! name-based lookup survives into the runtime representation.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::params::{ParamType, ParamValue};

/// Comparator for integer conditions.
#[derive(Copy, Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum IntOp {
    Equal,
    NotEqual,
    Greater,
    Less,
}

impl IntOp {
    #[inline]
    pub fn compare(self, lhs: i32, rhs: i32) -> bool {
        match self {
            IntOp::Equal => lhs == rhs,
            IntOp::NotEqual => lhs != rhs,
            IntOp::Greater => lhs > rhs,
            IntOp::Less => lhs < rhs,
        }
    }
}

/// One condition on one named parameter.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ConditionDesc {
    pub param: String,
    pub test: ConditionTestDesc,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub enum ConditionTestDesc {
    /// Equality against a target boolean.
    Bool { equals: bool },
    /// Comparison against an integer constant.
    Int { op: IntOp, value: i32 },
}

/// A conditioned, timed path to a named destination state.
///
/// Conditions have AND semantics; an empty list is always eligible once the
/// exit-time gate (if any) passes. `exit_time` is a normalized [0,1] point
/// in the source state's playback; absent or 0 means no gate.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TransitionDesc {
    pub to: String,
    /// Blend duration in seconds, >= 0. Zero switches instantly.
    pub duration: f32,
    #[serde(default)]
    pub exit_time: Option<f32>,
    #[serde(default)]
    pub conditions: Vec<ConditionDesc>,
}

/// What a state plays.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub enum StateKindDesc {
    /// A single animation clip.
    Clip,
    /// A 1D blend over a float parameter (resolved at sampling time by the
    /// host; this layer only resolves and validates the parameter).
    Blend { param: String },
}

impl Default for StateKindDesc {
    fn default() -> Self {
        StateKindDesc::Clip
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct StateDesc {
    pub name: String,
    #[serde(default)]
    pub kind: StateKindDesc,
    #[serde(default = "default_speed")]
    pub speed: f32,
    #[serde(default)]
    pub looping: bool,
    /// Clip length in seconds; must be finite and > 0.
    pub length: f32,
    #[serde(default)]
    pub transitions: Vec<TransitionDesc>,
}

fn default_speed() -> f32 {
    1.0
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ParamDesc {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: ParamType,
    #[serde(default)]
    pub default: Option<ParamValue>,
}

/// The full authoring description consumed by the compiler.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GraphDesc {
    pub name: String,
    pub default_state: String,
    #[serde(default)]
    pub parameters: Vec<ParamDesc>,
    pub states: Vec<StateDesc>,
    /// Global transitions evaluated before any per-state transition.
    #[serde(default)]
    pub any_state: Vec<TransitionDesc>,
}

/// Errors produced while parsing an authoring graph JSON document.
#[derive(Debug, Error)]
pub enum GraphJsonError {
    #[error("graph json parse error: {0}")]
    Parse(String),
}

/// Parse a `GraphDesc` from its JSON representation.
///
/// Parsing is purely structural; semantic validation (name resolution,
/// range checks) happens in [`crate::compile::compile`].
pub fn parse_graph_json(s: &str) -> Result<GraphDesc, GraphJsonError> {
    serde_json::from_str(s).map_err(|e| GraphJsonError::Parse(e.to_string()))
}

//! Graph compiler: validates a [`GraphDesc`] and flattens it into an
//! immutable [`StateMachineBlob`].
//!
//! Compilation is a pure transform run off the hot path. It resolves every
//! name to a dense index and front-loads every check the runtime would
//! otherwise need, so the evaluator and blend executor are total functions
//! over any blob this module produces. Validation aborts on the first error.

use std::sync::Arc;

use hashbrown::HashMap;
use thiserror::Error;

use crate::blob::{
    CompiledState, CompiledTransition, Condition, ParamDef, Predicate, StateKind, StateMachineBlob,
};
use crate::graph::{ConditionDesc, ConditionTestDesc, GraphDesc, StateKindDesc, TransitionDesc};
use crate::ids::{ParamIx, StateIx};
use crate::params::ParamType;

#[derive(Debug, Error, PartialEq)]
pub enum CompileError {
    #[error("graph has no states")]
    EmptyGraph,
    #[error("duplicate state name '{0}'")]
    DuplicateState(String),
    #[error("duplicate parameter name '{0}'")]
    DuplicateParameter(String),
    #[error("default state '{0}' does not exist")]
    UnresolvedDefaultState(String),
    #[error("transition {index} of '{state}' targets unknown state '{target}'")]
    UnresolvedDestination {
        state: String,
        index: usize,
        target: String,
    },
    #[error("{context}: unknown parameter '{name}'")]
    UnresolvedParameter { context: String, name: String },
    #[error("transition {index} of '{state}' is degenerate (zero duration, self target, no gate, no conditions)")]
    DegenerateTransition { state: String, index: usize },
    #[error("state '{state}' has non-positive or non-finite clip length")]
    InvalidClipLength { state: String },
    #[error("transition {index} of '{state}' has a negative or non-finite blend duration")]
    InvalidBlendDuration { state: String, index: usize },
    #[error("transition {index} of '{state}' has an exit time outside [0, 1]")]
    InvalidExitTime { state: String, index: usize },
    #[error("condition on '{param}' expects a {expected:?} parameter")]
    ConditionTypeMismatch { param: String, expected: ParamType },
    #[error("default for '{param}' expects a {expected:?} value")]
    DefaultTypeMismatch { param: String, expected: ParamType },
    #[error("blend state '{state}' drives non-float parameter '{param}'")]
    BlendParameterNotFloat { state: String, param: String },
}

/// Source label used in diagnostics for the any-state transition list.
const ANY_STATE: &str = "<any state>";

/// Compile an authoring graph into a shareable blob.
pub fn compile(graph: &GraphDesc) -> Result<Arc<StateMachineBlob>, CompileError> {
    if graph.states.is_empty() {
        return Err(CompileError::EmptyGraph);
    }

    // Name -> dense index tables; the only place names are ever looked up.
    let mut state_ix: HashMap<&str, StateIx> = HashMap::with_capacity(graph.states.len());
    for (i, s) in graph.states.iter().enumerate() {
        if state_ix.insert(&s.name, StateIx(i as u32)).is_some() {
            return Err(CompileError::DuplicateState(s.name.clone()));
        }
    }
    let mut param_ix: HashMap<&str, ParamIx> = HashMap::with_capacity(graph.parameters.len());
    let mut params: Vec<ParamDef> = Vec::with_capacity(graph.parameters.len());
    for (i, p) in graph.parameters.iter().enumerate() {
        if param_ix.insert(&p.name, ParamIx(i as u32)).is_some() {
            return Err(CompileError::DuplicateParameter(p.name.clone()));
        }
        let default = match p.default {
            Some(v) if v.kind() == p.ty => v,
            Some(_) => {
                return Err(CompileError::DefaultTypeMismatch {
                    param: p.name.clone(),
                    expected: p.ty,
                })
            }
            None => p.ty.zero(),
        };
        params.push(ParamDef {
            name: p.name.clone(),
            ty: p.ty,
            default,
        });
    }

    let default_state = *state_ix
        .get(graph.default_state.as_str())
        .ok_or_else(|| CompileError::UnresolvedDefaultState(graph.default_state.clone()))?;

    let mut states: Vec<CompiledState> = Vec::with_capacity(graph.states.len());
    for (i, s) in graph.states.iter().enumerate() {
        if !s.length.is_finite() || s.length <= 0.0 {
            return Err(CompileError::InvalidClipLength {
                state: s.name.clone(),
            });
        }
        let kind = match &s.kind {
            StateKindDesc::Clip => StateKind::SingleClip,
            StateKindDesc::Blend { param } => {
                let ix = resolve_param(&param_ix, param, &s.name)?;
                if params[ix.index()].ty != ParamType::Float {
                    return Err(CompileError::BlendParameterNotFloat {
                        state: s.name.clone(),
                        param: param.clone(),
                    });
                }
                StateKind::LinearBlend { param: ix }
            }
        };
        let mut transitions = Vec::with_capacity(s.transitions.len());
        for (j, t) in s.transitions.iter().enumerate() {
            let compiled = compile_transition(t, &s.name, j, &state_ix, &param_ix, &params)?;
            // A zero-length unconditional self loop would retrigger every
            // tick with no observable change.
            if compiled.duration == 0.0
                && compiled.target == StateIx(i as u32)
                && compiled.exit_time.is_none()
                && compiled.conditions.is_empty()
            {
                return Err(CompileError::DegenerateTransition {
                    state: s.name.clone(),
                    index: j,
                });
            }
            transitions.push(compiled);
        }
        states.push(CompiledState {
            name: s.name.clone(),
            kind,
            speed: s.speed,
            looping: s.looping,
            length: s.length,
            transitions,
        });
    }

    let mut any_transitions = Vec::with_capacity(graph.any_state.len());
    for (j, t) in graph.any_state.iter().enumerate() {
        let compiled = compile_transition(t, ANY_STATE, j, &state_ix, &param_ix, &params)?;
        // Every state is a potential source here, the destination included,
        // so the unconditional zero-length case is degenerate too.
        if compiled.duration == 0.0 && compiled.exit_time.is_none() && compiled.conditions.is_empty()
        {
            return Err(CompileError::DegenerateTransition {
                state: ANY_STATE.into(),
                index: j,
            });
        }
        any_transitions.push(compiled);
    }

    Ok(Arc::new(StateMachineBlob {
        name: graph.name.clone(),
        default_state,
        states,
        any_transitions,
        params,
    }))
}

fn resolve_param(
    table: &HashMap<&str, ParamIx>,
    name: &str,
    context: &str,
) -> Result<ParamIx, CompileError> {
    table
        .get(name)
        .copied()
        .ok_or_else(|| CompileError::UnresolvedParameter {
            context: context.to_string(),
            name: name.to_string(),
        })
}

fn compile_transition(
    t: &TransitionDesc,
    source: &str,
    index: usize,
    state_ix: &HashMap<&str, StateIx>,
    param_ix: &HashMap<&str, ParamIx>,
    params: &[ParamDef],
) -> Result<CompiledTransition, CompileError> {
    let target =
        *state_ix
            .get(t.to.as_str())
            .ok_or_else(|| CompileError::UnresolvedDestination {
                state: source.to_string(),
                index,
                target: t.to.clone(),
            })?;
    if !t.duration.is_finite() || t.duration < 0.0 {
        return Err(CompileError::InvalidBlendDuration {
            state: source.to_string(),
            index,
        });
    }
    let exit_time = match t.exit_time {
        None => None,
        Some(e) if !e.is_finite() || !(0.0..=1.0).contains(&e) => {
            return Err(CompileError::InvalidExitTime {
                state: source.to_string(),
                index,
            })
        }
        // 0 gates nothing; normalize to a single "ungated" representation.
        Some(e) if e == 0.0 => None,
        Some(e) => Some(e),
    };
    let mut conditions = Vec::with_capacity(t.conditions.len());
    for c in &t.conditions {
        conditions.push(compile_condition(c, source, param_ix, params)?);
    }
    Ok(CompiledTransition {
        target,
        duration: t.duration,
        exit_time,
        conditions,
    })
}

fn compile_condition(
    c: &ConditionDesc,
    context: &str,
    param_ix: &HashMap<&str, ParamIx>,
    params: &[ParamDef],
) -> Result<Condition, CompileError> {
    let ix = resolve_param(param_ix, &c.param, context)?;
    let declared = params[ix.index()].ty;
    let (expected, pred) = match c.test {
        ConditionTestDesc::Bool { equals } => (ParamType::Bool, Predicate::BoolEq(equals)),
        ConditionTestDesc::Int { op, value } => (ParamType::Int, Predicate::Int(op, value)),
    };
    if declared != expected {
        return Err(CompileError::ConditionTypeMismatch {
            param: c.param.clone(),
            expected,
        });
    }
    Ok(Condition { param: ix, pred })
}

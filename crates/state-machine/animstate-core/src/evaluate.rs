//! Transition evaluator: pure decision function, run once per tick per
//! instance.
//!
//! Any-state transitions take precedence over the current state's own
//! transitions; within each list declared order decides, and the first
//! eligible transition wins. Evaluation is total over any compiled blob:
//! every index was resolved and validated by the compiler.

use crate::blob::{CompiledTransition, StateMachineBlob};
use crate::config::InterruptPolicy;
use crate::instance::Playback;
use crate::params::ParamSet;

/// Which transition list a selection came from.
///
/// An explicit tag rather than a signed-index encoding: `AnyState(i)`
/// indexes `blob.any_transitions`, `PerState(i)` the current state's own
/// list.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum TransitionChoice {
    AnyState(usize),
    PerState(usize),
}

/// Resolve a choice back to its transition. Valid for the blob and current
/// state the choice was produced from.
#[inline]
pub fn resolve<'a>(
    blob: &'a StateMachineBlob,
    playback: &Playback,
    choice: TransitionChoice,
) -> &'a CompiledTransition {
    match choice {
        TransitionChoice::AnyState(i) => &blob.any_transitions[i],
        TransitionChoice::PerState(i) => &blob.state(playback.current).transitions[i],
    }
}

/// Decide whether a transition starts this tick, and which one.
///
/// While a blend is in progress the per-state list is never consulted; the
/// any-state list is consulted only under [`InterruptPolicy::AnyState`],
/// and a candidate already heading to the active transition's target is
/// not an interrupt (re-beginning it would restart the blend every tick
/// its condition holds).
pub fn evaluate(
    blob: &StateMachineBlob,
    playback: &Playback,
    params: &ParamSet,
    policy: InterruptPolicy,
) -> Option<TransitionChoice> {
    let source = blob.state(playback.current);
    let normalized = source.normalized(playback.time);

    if playback.active.is_some() && policy == InterruptPolicy::Never {
        return None;
    }
    let active_target = playback.active.map(|a| a.target);

    for (i, t) in blob.any_transitions.iter().enumerate() {
        if active_target == Some(t.target) {
            continue;
        }
        if eligible(t, normalized, params) {
            return Some(TransitionChoice::AnyState(i));
        }
    }

    if playback.active.is_some() {
        // InterruptPolicy::AnyState: only the any-state list stays live
        // during a blend.
        return None;
    }

    for (i, t) in source.transitions.iter().enumerate() {
        if eligible(t, normalized, params) {
            return Some(TransitionChoice::PerState(i));
        }
    }

    None
}

/// Exit-time gate against the source's normalized time, then all
/// conditions (AND; an empty list always holds).
#[inline]
fn eligible(t: &CompiledTransition, normalized: f32, params: &ParamSet) -> bool {
    if let Some(gate) = t.exit_time {
        if normalized < gate {
            return false;
        }
    }
    t.conditions.iter().all(|c| c.holds(params.get(c.param)))
}

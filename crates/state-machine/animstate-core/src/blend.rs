//! Blend executor: applies the evaluator's decision and advances playback.
//!
//! Produces the weighted sample descriptor the host's sampling stage
//! consumes. Like the evaluator this is total, allocation-free, and runs in
//! bounded time.

use serde::{Deserialize, Serialize};

use crate::blob::StateMachineBlob;
use crate::evaluate::{resolve, TransitionChoice};
use crate::ids::StateIx;
use crate::instance::{ActiveTransition, Playback};

/// What the host should sample this tick: a source state, optionally a
/// destination being blended in, and the blend weight toward it.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq)]
pub struct SampleDescriptor {
    pub source: StateIx,
    pub source_time: f32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dest: Option<StateIx>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dest_time: Option<f32>,
    /// 0 = source only, approaching 1 = destination only.
    pub weight: f32,
}

impl SampleDescriptor {
    #[inline]
    fn single(state: StateIx, time: f32) -> Self {
        Self {
            source: state,
            source_time: time,
            dest: None,
            dest_time: None,
            weight: 0.0,
        }
    }
}

/// Advance one instance by `dt`, honoring a transition chosen this tick.
///
/// At most one transition begins per call; a zero-duration choice completes
/// within the same tick.
pub fn advance(
    blob: &StateMachineBlob,
    playback: &mut Playback,
    choice: Option<TransitionChoice>,
    dt: f32,
) -> SampleDescriptor {
    if let Some(c) = choice {
        let t = resolve(blob, playback, c);
        if t.duration == 0.0 {
            // Instant switch: destination restarts from zero and is the
            // only state sampled this tick.
            playback.current = t.target;
            playback.time = 0.0;
            playback.active = None;
            return SampleDescriptor::single(playback.current, 0.0);
        }
        // Begin (or, under the interrupt policy, replace) the blend; the
        // rest of this tick's dt advances it below.
        playback.active = Some(ActiveTransition {
            target: t.target,
            duration: t.duration,
            elapsed: 0.0,
            dest_time: 0.0,
        });
    }

    let source = blob.state(playback.current);
    let Some(mut active) = playback.active else {
        playback.time = source.advance_time(playback.time, dt);
        return SampleDescriptor::single(playback.current, playback.time);
    };

    // Source and destination clocks run independently, each under its own
    // speed/loop/clamp rule.
    active.elapsed += dt;
    playback.time = source.advance_time(playback.time, dt);
    let dest = blob.state(active.target);
    active.dest_time = dest.advance_time(active.dest_time, dt);

    if active.elapsed >= active.duration {
        // Complete: destination becomes current, its elapsed time carries
        // over.
        playback.current = active.target;
        playback.time = active.dest_time;
        playback.active = None;
        return SampleDescriptor::single(playback.current, playback.time);
    }

    let weight = (active.elapsed / active.duration).clamp(0.0, 1.0);
    playback.active = Some(active);
    SampleDescriptor {
        source: playback.current,
        source_time: playback.time,
        dest: Some(active.target),
        dest_time: Some(active.dest_time),
        weight,
    }
}

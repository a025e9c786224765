//! Per-instance mutable playback state.
//!
//! An instance is the only mutable record in the system: current state
//! index, elapsed time, at most one in-progress transition, and the
//! parameter snapshot. It never outlives its blob (the `Arc` guarantees
//! that structurally) and is written only by its owner, so distinct
//! instances step concurrently without coordination.

use std::sync::Arc;

use crate::blend::{advance, SampleDescriptor};
use crate::blob::StateMachineBlob;
use crate::config::Config;
use crate::evaluate::evaluate;
use crate::ids::{ParamIx, StateIx};
use crate::params::{ParamSet, ParamValue};

/// An in-progress blend toward `target`. At most one exists per instance.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct ActiveTransition {
    pub target: StateIx,
    /// Total blend duration in seconds (> 0; zero-duration transitions
    /// never become active).
    pub duration: f32,
    /// Blend time elapsed so far.
    pub elapsed: f32,
    /// Destination state's own elapsed time, advanced under its own
    /// speed/loop rules and carried over on completion.
    pub dest_time: f32,
}

/// The playback-state triple the evaluator and blend executor operate on.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Playback {
    pub current: StateIx,
    /// Elapsed time in the current state, wrapped/clamped per its rules.
    pub time: f32,
    pub active: Option<ActiveTransition>,
}

impl Playback {
    pub fn at_default(blob: &StateMachineBlob) -> Self {
        Self {
            current: blob.default_state,
            time: 0.0,
            active: None,
        }
    }
}

/// One running entity's binding to a blob.
#[derive(Clone, Debug)]
pub struct Instance {
    blob: Arc<StateMachineBlob>,
    cfg: Config,
    playback: Playback,
    params: ParamSet,
}

impl Instance {
    /// Bind a new instance at the blob's default state with default
    /// parameter values.
    pub fn bind(blob: Arc<StateMachineBlob>, cfg: Config) -> Self {
        let playback = Playback::at_default(&blob);
        let params = ParamSet::from_blob(&blob);
        Self {
            blob,
            cfg,
            playback,
            params,
        }
    }

    #[inline]
    pub fn blob(&self) -> &Arc<StateMachineBlob> {
        &self.blob
    }

    #[inline]
    pub fn current_state(&self) -> StateIx {
        self.playback.current
    }

    #[inline]
    pub fn playback(&self) -> &Playback {
        &self.playback
    }

    /// Normalized playback position of the current state, for host
    /// introspection.
    #[inline]
    pub fn normalized_time(&self) -> f32 {
        self.blob
            .state(self.playback.current)
            .normalized(self.playback.time)
    }

    #[inline]
    pub fn params(&self) -> &ParamSet {
        &self.params
    }

    /// Update one parameter; the change is observed on the next tick.
    pub fn set_parameter(&mut self, ix: ParamIx, value: ParamValue) {
        self.params.set(ix, value);
    }

    /// Run the transition evaluator then the blend executor exactly once.
    ///
    /// The hot path: no allocation, no I/O, no fallible operations, bounded
    /// by the blob's fixed transition list lengths.
    pub fn tick(&mut self, dt: f32) -> SampleDescriptor {
        let choice = evaluate(&self.blob, &self.playback, &self.params, self.cfg.interrupt);
        if let Some(c) = choice {
            log::trace!(
                "machine '{}': state '{}' takes {:?}",
                self.blob.name,
                self.blob.state(self.playback.current).name,
                c
            );
        }
        advance(&self.blob, &mut self.playback, choice, dt)
    }
}

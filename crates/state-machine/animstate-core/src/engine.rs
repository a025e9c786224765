//! Engine: instance ownership and the host-facing API.
//!
//! Methods: new, bind, set_parameter, tick, current_state, unbind. The
//! engine is a convenience facade for hosts that want handle-based access;
//! hosts that shard instances across worker threads hold [`Instance`]
//! values directly and tick them without coordination.

use std::sync::Arc;

use crate::blend::SampleDescriptor;
use crate::blob::StateMachineBlob;
use crate::config::Config;
use crate::ids::{IdAllocator, InstId, ParamIx, StateIx};
use crate::instance::Instance;
use crate::params::ParamValue;

#[derive(Default, Debug)]
pub struct Engine {
    cfg: Config,
    ids: IdAllocator,
    instances: Vec<(InstId, Instance)>,
}

impl Engine {
    /// Create a new engine with the given config.
    pub fn new(cfg: Config) -> Self {
        Self {
            cfg,
            ids: IdAllocator::new(),
            instances: Vec::new(),
        }
    }

    /// Bind a new instance at the blob's default state.
    pub fn bind(&mut self, blob: &Arc<StateMachineBlob>) -> InstId {
        let id = self.ids.alloc_inst();
        log::debug!("bind {id:?} to machine '{}'", blob.name);
        self.instances
            .push((id, Instance::bind(Arc::clone(blob), self.cfg)));
        id
    }

    /// Release an instance. The shared blob is unaffected and is freed only
    /// when its last reference drops.
    pub fn unbind(&mut self, inst: InstId) {
        let before = self.instances.len();
        self.instances.retain(|(id, _)| *id != inst);
        assert!(self.instances.len() < before, "unbind of unbound {inst:?}");
        log::debug!("unbind {inst:?}");
    }

    /// Update one parameter; takes effect on the next tick.
    pub fn set_parameter(&mut self, inst: InstId, param: ParamIx, value: ParamValue) {
        self.instance_mut(inst).set_parameter(param, value);
    }

    /// Run the evaluator then the blend executor once for this instance.
    pub fn tick(&mut self, inst: InstId, dt: f32) -> SampleDescriptor {
        self.instance_mut(inst).tick(dt)
    }

    /// Introspection: the instance's current state index. No side effect.
    pub fn current_state(&self, inst: InstId) -> StateIx {
        self.instance(inst).current_state()
    }

    /// Shared access to a bound instance, for host introspection.
    pub fn instance(&self, inst: InstId) -> &Instance {
        self.instances
            .iter()
            .find(|(id, _)| *id == inst)
            .map(|(_, i)| i)
            .unwrap_or_else(|| panic!("no bound instance {inst:?}"))
    }

    fn instance_mut(&mut self, inst: InstId) -> &mut Instance {
        self.instances
            .iter_mut()
            .find(|(id, _)| *id == inst)
            .map(|(_, i)| i)
            .unwrap_or_else(|| panic!("no bound instance {inst:?}"))
    }
}

//! Host-side render pump.
//!
//! Setters never render inline. Instances mounted through a [`Runtime`]
//! push their ID onto a render queue the first time they become dirty, and
//! [`Runtime::tick`] renders every queued instance exactly once.

use crate::component::{ComponentHandle, ComponentInstance, Definition};
use crate::error::{HookError, Result};
use crate::subscriptions::DEFAULT_BUFFER_SIZE;
use crate::types::InstanceId;
use crossbeam_channel::{unbounded, Receiver, Sender};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Weak};

/// Runtime configuration.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeConfig {
    /// Skip literal updates equal to the current value without marking the
    /// instance dirty.
    pub bail_out_on_equal: bool,

    /// Buffer size for subscriptions created with `watch`.
    pub subscription_buffer: usize,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            bail_out_on_equal: true,
            subscription_buffer: DEFAULT_BUFFER_SIZE,
        }
    }
}

/// Sending side of the render queue, held by each instance's state table.
#[derive(Clone, Debug)]
pub(crate) struct RenderQueue {
    sender: Sender<InstanceId>,
}

impl RenderQueue {
    pub(crate) fn new(sender: Sender<InstanceId>) -> Self {
        Self { sender }
    }

    pub(crate) fn request(&self, id: InstanceId) {
        // The runtime owns the receiver; once it is gone nobody pumps renders.
        let _ = self.sender.send(id);
    }
}

/// Type-erased view of an instance for the pump.
trait Pump: Send + Sync {
    /// Render if dirty. Returns whether the definition ran.
    fn render_pending(&self) -> Result<bool>;

    fn is_mounted(&self) -> bool;
}

impl<P, O> Pump for ComponentInstance<P, O>
where
    P: Send + Sync + 'static,
    O: Clone + Send + 'static,
{
    fn render_pending(&self) -> Result<bool> {
        // Off the queue: the next setter call must queue the instance again.
        self.clear_queued();
        let dirty = self.is_dirty();
        self.render().map(|_| dirty)
    }

    fn is_mounted(&self) -> bool {
        self.lifecycle().is_mounted()
    }
}

/// Outcome of one [`Runtime::tick`].
#[derive(Debug, Default)]
pub struct TickSummary {
    /// Instances whose definition ran.
    pub rendered: Vec<InstanceId>,
    /// Instances that were already clean (e.g. rendered by the host).
    pub skipped: Vec<InstanceId>,
    /// Instances unmounted or dropped with a render still pending.
    pub dropped: Vec<InstanceId>,
    /// Renders that failed.
    pub errors: Vec<(InstanceId, HookError)>,
}

impl TickSummary {
    pub fn is_idle(&self) -> bool {
        self.rendered.is_empty() && self.errors.is_empty()
    }
}

/// Owns the render queue and pumps render passes for its instances.
pub struct Runtime {
    config: RuntimeConfig,
    queue: RenderQueue,
    receiver: Receiver<InstanceId>,
    instances: Mutex<HashMap<InstanceId, Weak<dyn Pump>>>,
}

impl Runtime {
    pub fn new(config: RuntimeConfig) -> Self {
        let (sender, receiver) = unbounded();
        Self {
            config,
            queue: RenderQueue::new(sender),
            receiver,
            instances: Mutex::new(HashMap::new()),
        }
    }

    pub fn config(&self) -> &RuntimeConfig {
        &self.config
    }

    /// Mount a definition whose setters schedule renders on this runtime.
    pub fn mount<P, O>(
        &self,
        definition: Definition<P, O>,
        props: P,
    ) -> Result<(ComponentHandle<P, O>, O)>
    where
        P: Send + Sync + 'static,
        O: Clone + Send + 'static,
    {
        let (instance, output) = ComponentInstance::mount_inner(
            definition,
            props,
            &self.config,
            Some(self.queue.clone()),
        )?;

        let pump: Arc<dyn Pump> = instance.clone();
        self.instances
            .lock()
            .insert(instance.id(), Arc::downgrade(&pump));

        Ok((instance, output))
    }

    /// Number of render requests waiting for the next tick.
    pub fn pending(&self) -> usize {
        self.receiver.len()
    }

    /// Number of instances still alive and mounted through this runtime.
    pub fn instance_count(&self) -> usize {
        self.prune();
        self.instances.lock().len()
    }

    /// Forget instances that were dropped or unmounted.
    fn prune(&self) {
        self.instances
            .lock()
            .retain(|_, pump| pump.upgrade().is_some_and(|pump| pump.is_mounted()));
    }

    /// Render every instance that requested a render since the last tick.
    ///
    /// Requests made while this tick renders are left for the next one.
    pub fn tick(&self) -> TickSummary {
        let mut seen = HashSet::new();
        let batch: Vec<InstanceId> = self
            .receiver
            .try_iter()
            .filter(|id| seen.insert(*id))
            .collect();

        let mut summary = TickSummary::default();
        for id in batch {
            let pump = self.instances.lock().get(&id).and_then(Weak::upgrade);
            let Some(pump) = pump else {
                self.instances.lock().remove(&id);
                summary.dropped.push(id);
                continue;
            };

            match pump.render_pending() {
                Ok(true) => summary.rendered.push(id),
                Ok(false) => summary.skipped.push(id),
                Err(HookError::StaleReference { .. }) => {
                    self.instances.lock().remove(&id);
                    summary.dropped.push(id);
                }
                Err(e) => summary.errors.push((id, e)),
            }
        }

        self.prune();

        tracing::debug!(
            rendered = summary.rendered.len(),
            skipped = summary.skipped.len(),
            dropped = summary.dropped.len(),
            errors = summary.errors.len(),
            "tick"
        );
        summary
    }
}

impl Default for Runtime {
    fn default() -> Self {
        Self::new(RuntimeConfig::default())
    }
}

//! Mounted component instances.

use crate::error::{HookError, Result};
use crate::runtime::{RenderQueue, RuntimeConfig};
use crate::state::StateTable;
use crate::subscriptions::{
    SubscriptionConfig, SubscriptionFilter, SubscriptionHandle, SubscriptionId,
    SubscriptionManager,
};
use crate::types::{InstanceId, InstanceStats, Lifecycle};
use parking_lot::Mutex;
use std::sync::Arc;

use super::definition::Definition;
use super::scope::RenderScope;

/// Handle to a mounted instance, shared between the host and the runtime.
pub type ComponentHandle<P, O> = Arc<ComponentInstance<P, O>>;

/// Mount a definition with default configuration.
///
/// Performs the first render and returns the handle along with its output.
pub fn mount<P, O>(definition: Definition<P, O>, props: P) -> Result<(ComponentHandle<P, O>, O)>
where
    P: Send + Sync + 'static,
    O: Clone + Send + 'static,
{
    ComponentInstance::mount(definition, props)
}

struct InstanceInner<P, O> {
    props: Arc<P>,
    last_output: O,
    render_count: u64,
}

/// A live binding of a definition to its props and state cells.
pub struct ComponentInstance<P, O> {
    definition: Definition<P, O>,
    table: Arc<StateTable>,
    inner: Mutex<InstanceInner<P, O>>,
    subscriptions: SubscriptionManager<O>,
    subscription_buffer: usize,
}

impl<P, O> ComponentInstance<P, O>
where
    P: Send + Sync + 'static,
    O: Clone + Send + 'static,
{
    pub fn mount(definition: Definition<P, O>, props: P) -> Result<(ComponentHandle<P, O>, O)> {
        Self::mount_with_config(definition, props, &RuntimeConfig::default())
    }

    pub fn mount_with_config(
        definition: Definition<P, O>,
        props: P,
        config: &RuntimeConfig,
    ) -> Result<(ComponentHandle<P, O>, O)> {
        Self::mount_inner(definition, props, config, None)
    }

    pub(crate) fn mount_inner(
        definition: Definition<P, O>,
        props: P,
        config: &RuntimeConfig,
        queue: Option<RenderQueue>,
    ) -> Result<(ComponentHandle<P, O>, O)> {
        let id = InstanceId::next();
        let table = Arc::new(StateTable::new(
            id,
            definition.name(),
            config.bail_out_on_equal,
            queue,
        ));

        let _span = tracing::debug_span!("mount", instance = %id, component = definition.name())
            .entered();

        let mut scope = RenderScope::first(&table);
        let output = definition.invoke(&props, &mut scope)?;
        scope.finish()?;

        tracing::debug!(cells = table.cell_count(), "mounted");

        let instance = Arc::new(Self {
            definition,
            table,
            inner: Mutex::new(InstanceInner {
                props: Arc::new(props),
                last_output: output.clone(),
                render_count: 1,
            }),
            subscriptions: SubscriptionManager::new(),
            subscription_buffer: config.subscription_buffer,
        });

        Ok((instance, output))
    }

    pub fn id(&self) -> InstanceId {
        self.table.id()
    }

    pub fn name(&self) -> &str {
        self.definition.name()
    }

    pub fn lifecycle(&self) -> Lifecycle {
        self.table.lifecycle()
    }

    pub fn is_dirty(&self) -> bool {
        self.lifecycle().is_dirty()
    }

    /// Bring the output up to date.
    ///
    /// Runs the definition only when a setter changed state since the last
    /// render; a clean instance returns its cached output untouched.
    pub fn render(&self) -> Result<O> {
        match self.table.lifecycle() {
            Lifecycle::Unmounted => Err(HookError::StaleReference { id: self.id() }),
            Lifecycle::MountedClean => Ok(self.inner.lock().last_output.clone()),
            Lifecycle::MountedDirty => {
                let props = Arc::clone(&self.inner.lock().props);
                self.run_definition(props)
            }
        }
    }

    /// Replace the props and render unconditionally.
    ///
    /// If the render fails the previous props stay in place.
    pub fn update_props(&self, props: P) -> Result<O> {
        self.table.ensure_mounted()?;
        tracing::debug!(instance = %self.id(), "props updated");
        self.run_definition(Arc::new(props))
    }

    /// Destroy all state cells. Every later operation on this instance or
    /// its setters fails with [`HookError::StaleReference`].
    pub fn unmount(&self) -> Result<()> {
        self.table.unmount()?;
        tracing::debug!(instance = %self.id(), component = self.name(), "unmounted");
        self.subscriptions.broadcast_unmounted(self.id());
        Ok(())
    }

    /// Output of the most recent successful render.
    pub fn last_output(&self) -> Result<O> {
        self.table.ensure_mounted()?;
        Ok(self.inner.lock().last_output.clone())
    }

    pub fn props(&self) -> Result<Arc<P>> {
        self.table.ensure_mounted()?;
        Ok(Arc::clone(&self.inner.lock().props))
    }

    pub fn stats(&self) -> InstanceStats {
        InstanceStats {
            id: self.id(),
            name: self.name().to_string(),
            lifecycle: self.lifecycle(),
            cell_count: self.table.cell_count(),
            render_count: self.inner.lock().render_count,
        }
    }

    pub fn subscribe(&self, config: SubscriptionConfig) -> Result<SubscriptionHandle<O>> {
        self.table.ensure_mounted()?;
        Ok(self.subscriptions.subscribe(config))
    }

    /// Subscribe to every event with the configured buffer size.
    pub fn watch(&self) -> Result<SubscriptionHandle<O>> {
        self.subscribe(SubscriptionConfig {
            buffer_size: self.subscription_buffer,
            filter: SubscriptionFilter::all(),
        })
    }

    pub fn unsubscribe(&self, id: SubscriptionId) {
        self.subscriptions.unsubscribe(id);
    }

    pub(crate) fn clear_queued(&self) {
        self.table.clear_queued();
    }

    /// Run the definition with `props`. On success the props, output and
    /// render count are committed; on failure none of them change and the
    /// lifecycle returns to what it was before the attempt.
    fn run_definition(&self, props: Arc<P>) -> Result<O> {
        let (previous, expected) = self.table.begin_render()?;

        let _span = tracing::debug_span!("render", instance = %self.id(), component = self.name())
            .entered();

        let mut scope = RenderScope::rerender(&self.table, expected);
        let result = self
            .definition
            .invoke(&props, &mut scope)
            .and_then(|output| scope.finish().map(|()| output));

        let output = match result {
            Ok(output) => output,
            Err(e) => {
                self.table.abort_render(previous);
                return Err(e);
            }
        };

        // The definition may have unmounted its own instance.
        self.table.ensure_mounted()?;

        let render_count = {
            let mut inner = self.inner.lock();
            inner.props = props;
            inner.last_output = output.clone();
            inner.render_count += 1;
            inner.render_count
        };
        tracing::debug!(render_count, "rendered");

        self.subscriptions
            .broadcast_rendered(self.id(), &output, render_count);
        Ok(output)
    }
}

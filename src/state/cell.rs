//! Per-instance table of type-erased state cells.

use crate::error::{HookError, Result};
use crate::runtime::RenderQueue;
use crate::types::{InstanceId, Lifecycle, Version};
use parking_lot::Mutex;
use std::any::{type_name, Any};

use super::setter::Update;

/// One unit of persisted state.
pub(crate) struct CellSlot {
    value: Box<dyn Any + Send>,
    version: Version,
    /// Type the cell was created with (for order violation messages).
    type_name: &'static str,
}

impl CellSlot {
    fn new<T: Send + 'static>(value: T) -> Self {
        Self {
            value: Box::new(value),
            version: Version::default(),
            type_name: type_name::<T>(),
        }
    }

    fn downcast_ref<T: 'static>(&self) -> Option<&T> {
        self.value.downcast_ref::<T>()
    }

    fn downcast_mut<T: 'static>(&mut self) -> Option<&mut T> {
        self.value.downcast_mut::<T>()
    }
}

struct TableInner {
    lifecycle: Lifecycle,
    cells: Vec<CellSlot>,
    /// Set while the instance's ID sits in the render queue.
    queued: bool,
}

/// State shared between an instance, its render scope and its setters.
///
/// The lock is only held for short critical sections and never while a
/// component definition runs, so definitions may call setters mid-render.
pub(crate) struct StateTable {
    id: InstanceId,
    name: String,
    bail_out_on_equal: bool,
    queue: Option<RenderQueue>,
    inner: Mutex<TableInner>,
}

impl StateTable {
    pub(crate) fn new(
        id: InstanceId,
        name: impl Into<String>,
        bail_out_on_equal: bool,
        queue: Option<RenderQueue>,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            bail_out_on_equal,
            queue,
            inner: Mutex::new(TableInner {
                lifecycle: Lifecycle::MountedClean,
                cells: Vec::new(),
                queued: false,
            }),
        }
    }

    pub(crate) fn id(&self) -> InstanceId {
        self.id
    }

    fn stale(&self) -> HookError {
        HookError::StaleReference { id: self.id }
    }

    fn order_violation(&self, detail: String) -> HookError {
        tracing::warn!(instance = %self.id, component = %self.name, %detail, "hook order violation");
        HookError::OrderViolation {
            id: self.id,
            detail,
        }
    }

    pub(crate) fn lifecycle(&self) -> Lifecycle {
        self.inner.lock().lifecycle
    }

    pub(crate) fn cell_count(&self) -> usize {
        self.inner.lock().cells.len()
    }

    pub(crate) fn ensure_mounted(&self) -> Result<()> {
        if self.inner.lock().lifecycle.is_mounted() {
            Ok(())
        } else {
            Err(self.stale())
        }
    }

    /// Read the cell at `index`, creating it on the first render.
    pub(crate) fn read_or_init<T, F>(&self, index: usize, first_render: bool, init: F) -> Result<T>
    where
        T: Clone + Send + 'static,
        F: FnOnce() -> T,
    {
        {
            let inner = self.inner.lock();
            if !inner.lifecycle.is_mounted() {
                return Err(self.stale());
            }

            if let Some(slot) = inner.cells.get(index) {
                return match slot.downcast_ref::<T>() {
                    Some(value) => Ok(value.clone()),
                    None => Err(self.order_violation(format!(
                        "cell {} was created as {}, requested as {}",
                        index,
                        slot.type_name,
                        type_name::<T>()
                    ))),
                };
            }

            if !first_render {
                let expected = inner.cells.len();
                drop(inner);
                return Err(self.order_violation(format!(
                    "requested cell {} but previous render created {} cell(s)",
                    index, expected
                )));
            }
        }

        // Run the initializer unlocked; it may be arbitrary user code.
        let value = init();

        let mut inner = self.inner.lock();
        if !inner.lifecycle.is_mounted() {
            return Err(self.stale());
        }
        debug_assert_eq!(inner.cells.len(), index);
        inner.cells.push(CellSlot::new(value.clone()));
        Ok(value)
    }

    /// Read the current value of a cell outside of a render.
    pub(crate) fn read<T: Clone + 'static>(&self, index: usize) -> Result<(T, Version)> {
        let inner = self.inner.lock();
        if !inner.lifecycle.is_mounted() {
            return Err(self.stale());
        }
        let slot = inner.cells.get(index).ok_or_else(|| self.stale())?;
        let value = slot
            .downcast_ref::<T>()
            .cloned()
            .ok_or_else(|| self.stale())?;
        Ok((value, slot.version))
    }

    /// Apply an update to a cell. Returns `false` when the update was
    /// skipped by the equal-value bail-out.
    ///
    /// Updaters run with the table unlocked, against a copy of the latest
    /// value, so they may read other cells of the same instance. A write to
    /// the same cell made from inside the updater is replaced by its result.
    pub(crate) fn apply<T>(&self, index: usize, update: Update<T>) -> Result<bool>
    where
        T: Clone + PartialEq + Send + 'static,
    {
        let (value, literal) = match update {
            Update::Value(value) => (value, true),
            Update::Updater(f) => {
                let (current, _) = self.read::<T>(index)?;
                (f(&current), false)
            }
        };

        let schedule = {
            let mut inner = self.inner.lock();
            if !inner.lifecycle.is_mounted() {
                return Err(self.stale());
            }

            let bail_out = literal && self.bail_out_on_equal;
            let slot = inner.cells.get_mut(index).ok_or_else(|| self.stale())?;
            let version = slot.version;
            let current = slot.downcast_mut::<T>().ok_or_else(|| self.stale())?;

            if bail_out && *current == value {
                tracing::trace!(instance = %self.id, cell = index, "equal value, skipping update");
                return Ok(false);
            }
            *current = value;
            slot.version = version.next();
            tracing::trace!(instance = %self.id, cell = index, version = ?slot.version, "state updated");

            inner.lifecycle = Lifecycle::MountedDirty;
            let schedule = self.queue.is_some() && !inner.queued;
            if schedule {
                inner.queued = true;
            }
            schedule
        };

        if schedule {
            if let Some(queue) = &self.queue {
                queue.request(self.id);
            }
        }

        Ok(true)
    }

    /// The runtime took this instance's ID off the render queue.
    pub(crate) fn clear_queued(&self) {
        self.inner.lock().queued = false;
    }

    /// Start a render pass. Clears the dirty flag and returns the lifecycle
    /// before the pass along with the number of cells the previous render
    /// created.
    pub(crate) fn begin_render(&self) -> Result<(Lifecycle, usize)> {
        let mut inner = self.inner.lock();
        if !inner.lifecycle.is_mounted() {
            return Err(self.stale());
        }
        let previous = inner.lifecycle;
        inner.lifecycle = Lifecycle::MountedClean;
        Ok((previous, inner.cells.len()))
    }

    /// Undo `begin_render` after a failed render. A setter that ran during
    /// the failed render keeps the instance dirty.
    pub(crate) fn abort_render(&self, previous: Lifecycle) {
        let mut inner = self.inner.lock();
        if inner.lifecycle == Lifecycle::MountedClean {
            inner.lifecycle = previous;
        }
    }

    /// Check the number of cells a finished render requested.
    pub(crate) fn check_cell_count(&self, requested: usize, expected: usize) -> Result<()> {
        if requested == expected {
            Ok(())
        } else {
            Err(self.order_violation(format!(
                "render requested {} cell(s), previous render created {}",
                requested, expected
            )))
        }
    }

    /// Destroy all cells and make the table terminal.
    pub(crate) fn unmount(&self) -> Result<()> {
        let mut inner = self.inner.lock();
        if !inner.lifecycle.is_mounted() {
            return Err(self.stale());
        }
        inner.lifecycle = Lifecycle::Unmounted;
        inner.cells.clear();
        Ok(())
    }
}

//! State setters handed out by `RenderScope::use_state`.

use crate::error::{HookError, Result};
use crate::types::{InstanceId, Version};
use std::fmt;
use std::marker::PhantomData;
use std::sync::{Arc, Weak};

use super::cell::StateTable;

/// A pending change to a state cell.
pub enum Update<T> {
    /// Replace the value outright. Among several literal updates in one
    /// tick, the last one wins.
    Value(T),
    /// Compute the new value from the latest one. Several updaters issued
    /// in one tick compose in call order.
    ///
    /// The updater runs without holding any runtime lock, so it may read
    /// other cells. Writing to its own cell from inside it is pointless:
    /// the updater's result replaces that write.
    Updater(Box<dyn FnOnce(&T) -> T + Send>),
}

impl<T> Update<T> {
    pub fn value(value: T) -> Self {
        Update::Value(value)
    }

    pub fn updater(f: impl FnOnce(&T) -> T + Send + 'static) -> Self {
        Update::Updater(Box::new(f))
    }
}

impl<T: fmt::Debug> fmt::Debug for Update<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Update::Value(value) => f.debug_tuple("Value").field(value).finish(),
            Update::Updater(_) => f.write_str("Updater(..)"),
        }
    }
}

/// Setter bound to one state cell of one instance.
///
/// Setters never re-render. They record the new value, mark the owning
/// instance dirty, and leave the render to the host. A setter only holds a
/// weak reference, so it fails with [`HookError::StaleReference`] once the
/// instance is unmounted or dropped.
pub struct Setter<T> {
    table: Weak<StateTable>,
    id: InstanceId,
    index: usize,
    _marker: PhantomData<fn() -> T>,
}

impl<T> Setter<T>
where
    T: Clone + PartialEq + Send + 'static,
{
    pub(crate) fn new(table: &Arc<StateTable>, index: usize) -> Self {
        Self {
            table: Arc::downgrade(table),
            id: table.id(),
            index,
            _marker: PhantomData,
        }
    }

    fn table(&self) -> Result<Arc<StateTable>> {
        self.table
            .upgrade()
            .ok_or(HookError::StaleReference { id: self.id })
    }

    /// Instance that owns the cell.
    pub fn instance_id(&self) -> InstanceId {
        self.id
    }

    /// Position of the cell in the instance's call order.
    pub fn index(&self) -> usize {
        self.index
    }

    /// Replace the value.
    ///
    /// Returns `false` when the value equals the current one and the
    /// equal-value bail-out is enabled; the instance is then left clean.
    pub fn set(&self, value: T) -> Result<bool> {
        self.apply(Update::Value(value))
    }

    /// Derive the new value from the latest one.
    ///
    /// `f` sees a copy of the current value and runs unlocked; see
    /// [`Update::Updater`].
    pub fn update(&self, f: impl FnOnce(&T) -> T + Send + 'static) -> Result<bool> {
        self.apply(Update::updater(f))
    }

    pub fn apply(&self, update: Update<T>) -> Result<bool> {
        self.table()?.apply(self.index, update)
    }

    /// Latest value, including updates not yet rendered.
    pub fn get(&self) -> Result<T> {
        Ok(self.table()?.read::<T>(self.index)?.0)
    }

    pub fn version(&self) -> Result<Version> {
        Ok(self.table()?.read::<T>(self.index)?.1)
    }
}

impl<T> Clone for Setter<T> {
    fn clone(&self) -> Self {
        Self {
            table: Weak::clone(&self.table),
            id: self.id,
            index: self.index,
            _marker: PhantomData,
        }
    }
}

impl<T> fmt::Debug for Setter<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Setter")
            .field("instance", &self.id)
            .field("index", &self.index)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_setter_roundtrip() {
        let table = Arc::new(StateTable::new(InstanceId::next(), "test", true, None));
        table.read_or_init(0, true, || 1u32).unwrap();
        let setter = Setter::<u32>::new(&table, 0);

        setter.update(|v| v + 1).unwrap();
        setter.update(|v| v * 10).unwrap();
        assert_eq!(setter.get().unwrap(), 20);
        assert_eq!(setter.version().unwrap(), Version(2));
    }

    #[test]
    fn test_updater_reading_own_cell_does_not_block() {
        let table = Arc::new(StateTable::new(InstanceId::next(), "test", true, None));
        table.read_or_init(0, true, || 1u32).unwrap();
        let setter = Setter::<u32>::new(&table, 0);

        let reader = setter.clone();
        setter
            .update(move |v| v + reader.get().unwrap())
            .unwrap();
        assert_eq!(setter.get().unwrap(), 2);
    }

    #[test]
    fn test_setter_after_drop_is_stale() {
        let table = Arc::new(StateTable::new(InstanceId::next(), "test", true, None));
        table.read_or_init(0, true, || 1u32).unwrap();
        let setter = Setter::<u32>::new(&table, 0);

        drop(table);
        assert!(matches!(
            setter.set(2),
            Err(HookError::StaleReference { .. })
        ));
    }

    #[test]
    fn test_update_debug() {
        assert_eq!(format!("{:?}", Update::Value(3)), "Value(3)");
        assert_eq!(
            format!("{:?}", Update::<i32>::updater(|v| v + 1)),
            "Updater(..)"
        );
    }
}

//! Render scope handed to a definition while it runs.

use crate::error::Result;
use crate::state::{Setter, StateTable};
use crate::types::InstanceId;
use std::sync::Arc;

/// Gives a running definition access to its instance's state cells.
///
/// Cells are matched to calls by position: the n-th `use_state` call of a
/// render gets the n-th cell.
pub struct RenderScope<'a> {
    table: &'a Arc<StateTable>,
    cursor: usize,
    first_render: bool,
    expected: usize,
}

impl<'a> RenderScope<'a> {
    pub(crate) fn first(table: &'a Arc<StateTable>) -> Self {
        Self {
            table,
            cursor: 0,
            first_render: true,
            expected: 0,
        }
    }

    pub(crate) fn rerender(table: &'a Arc<StateTable>, expected: usize) -> Self {
        Self {
            table,
            cursor: 0,
            first_render: false,
            expected,
        }
    }

    /// Request the next state cell, returning its current value and setter.
    ///
    /// `initial` is only used on the instance's first render.
    pub fn use_state<T>(&mut self, initial: T) -> Result<(T, Setter<T>)>
    where
        T: Clone + PartialEq + Send + 'static,
    {
        self.use_state_with(move || initial)
    }

    /// Like [`use_state`](Self::use_state), but the initial value is only
    /// computed on the first render.
    pub fn use_state_with<T, F>(&mut self, init: F) -> Result<(T, Setter<T>)>
    where
        T: Clone + PartialEq + Send + 'static,
        F: FnOnce() -> T,
    {
        let index = self.cursor;
        self.cursor += 1;
        let value = self.table.read_or_init(index, self.first_render, init)?;
        Ok((value, Setter::new(self.table, index)))
    }

    pub fn instance_id(&self) -> InstanceId {
        self.table.id()
    }

    pub fn is_first_render(&self) -> bool {
        self.first_render
    }

    /// Verify the render requested as many cells as the previous one.
    pub(crate) fn finish(self) -> Result<()> {
        if self.first_render {
            return Ok(());
        }
        self.table.check_cell_count(self.cursor, self.expected)
    }
}

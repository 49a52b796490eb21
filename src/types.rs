//! Core types for the component runtime.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// Counter for generating instance IDs.
static NEXT_INSTANCE_ID: AtomicU64 = AtomicU64::new(1);

/// Unique identifier for a mounted component instance.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct InstanceId(pub u64);

impl InstanceId {
    /// Allocate the next process-unique ID.
    pub(crate) fn next() -> Self {
        InstanceId(NEXT_INSTANCE_ID.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Debug for InstanceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "InstanceId({})", self.0)
    }
}

impl fmt::Display for InstanceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Version of a single state cell. Starts at zero and grows by one on every
/// accepted update.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default)]
pub struct Version(pub u64);

impl fmt::Debug for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "v{}", self.0)
    }
}

impl Version {
    /// The following version.
    ///
    /// # Panics
    ///
    /// Panics instead of wrapping once a cell has taken `u64::MAX` updates.
    pub fn next(self) -> Self {
        Version(self.0.checked_add(1).expect("state cell version overflowed"))
    }
}

/// Lifecycle of a component instance.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Lifecycle {
    /// Output reflects current props and state.
    MountedClean,
    /// A setter changed state since the last render.
    MountedDirty,
    /// Terminal. Every operation fails with a stale reference error.
    Unmounted,
}

impl Lifecycle {
    pub fn is_mounted(self) -> bool {
        !matches!(self, Lifecycle::Unmounted)
    }

    pub fn is_dirty(self) -> bool {
        matches!(self, Lifecycle::MountedDirty)
    }
}

/// Snapshot of an instance's bookkeeping.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstanceStats {
    pub id: InstanceId,
    pub name: String,
    pub lifecycle: Lifecycle,
    /// Number of state cells owned by the instance.
    pub cell_count: usize,
    /// Number of times the definition ran to completion.
    pub render_count: u64,
}

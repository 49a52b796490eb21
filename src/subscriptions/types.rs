//! Subscription types for instance output notifications.

use crate::types::InstanceId;
use serde::{Deserialize, Serialize};

/// Default number of buffered events per subscription.
pub const DEFAULT_BUFFER_SIZE: usize = 64;

/// Configuration for a subscription.
#[derive(Clone, Debug)]
pub struct SubscriptionConfig {
    /// Max buffered events before dropping subscriber.
    pub buffer_size: usize,

    /// Filter criteria.
    pub filter: SubscriptionFilter,
}

impl Default for SubscriptionConfig {
    fn default() -> Self {
        Self {
            buffer_size: DEFAULT_BUFFER_SIZE,
            filter: SubscriptionFilter::all(),
        }
    }
}

/// Filter criteria for subscriptions.
#[derive(Clone, Debug, Default)]
pub struct SubscriptionFilter {
    /// Include output events.
    pub include_renders: bool,

    /// Include unmount events.
    pub include_lifecycle: bool,
}

impl SubscriptionFilter {
    /// Only new outputs.
    pub fn renders() -> Self {
        Self {
            include_renders: true,
            ..Default::default()
        }
    }

    /// Only lifecycle changes.
    pub fn lifecycle() -> Self {
        Self {
            include_lifecycle: true,
            ..Default::default()
        }
    }

    pub fn all() -> Self {
        Self {
            include_renders: true,
            include_lifecycle: true,
        }
    }
}

/// Events emitted to subscribers of an instance.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum InstanceEvent<O> {
    /// The definition ran and produced new output.
    Rendered {
        id: InstanceId,
        output: O,
        render_count: u64,
    },

    /// The instance was unmounted. No further events follow.
    Unmounted { id: InstanceId },

    /// Subscription was dropped.
    Dropped { reason: DropReason },
}

/// Why a subscription was dropped.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DropReason {
    /// Send buffer overflowed (slow consumer).
    BufferOverflow,
    /// Explicitly unsubscribed.
    Unsubscribed,
    /// The instance was unmounted.
    InstanceUnmounted,
}

/// Unique identifier for a subscription.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SubscriptionId(pub u64);

/// Handle to manage a subscription.
pub struct SubscriptionHandle<O> {
    pub id: SubscriptionId,
    /// Channel to receive events.
    pub receiver: crossbeam_channel::Receiver<InstanceEvent<O>>,
}

impl<O> SubscriptionHandle<O> {
    /// Receive the next event (blocking).
    pub fn recv(&self) -> Result<InstanceEvent<O>, crossbeam_channel::RecvError> {
        self.receiver.recv()
    }

    /// Try to receive an event (non-blocking).
    pub fn try_recv(&self) -> Result<InstanceEvent<O>, crossbeam_channel::TryRecvError> {
        self.receiver.try_recv()
    }

    /// Receive with timeout.
    pub fn recv_timeout(
        &self,
        timeout: std::time::Duration,
    ) -> Result<InstanceEvent<O>, crossbeam_channel::RecvTimeoutError> {
        self.receiver.recv_timeout(timeout)
    }

    /// Collect every event buffered right now.
    pub fn drain(&self) -> Vec<InstanceEvent<O>> {
        self.receiver.try_iter().collect()
    }
}

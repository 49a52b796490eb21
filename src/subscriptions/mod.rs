//! Subscription system for instance output changes.
//!
//! Hosts subscribe to an instance to learn when it produced new output or
//! was unmounted. Subscriptions use bounded buffers; a subscriber that
//! falls behind is dropped rather than stalling the render path.
//!
//! # Example
//!
//! ```ignore
//! let handle = instance.subscribe(SubscriptionConfig::default());
//!
//! setter.update(|v| v + 1)?;
//! instance.render()?;
//!
//! match handle.recv()? {
//!     InstanceEvent::Rendered { output, .. } => println!("{}", output),
//!     InstanceEvent::Unmounted { .. } => {}
//!     InstanceEvent::Dropped { reason } => eprintln!("dropped: {:?}", reason),
//! }
//! ```

mod manager;
mod types;

pub use manager::SubscriptionManager;
pub use types::{
    DropReason, InstanceEvent, SubscriptionConfig, SubscriptionFilter, SubscriptionHandle,
    SubscriptionId, DEFAULT_BUFFER_SIZE,
};

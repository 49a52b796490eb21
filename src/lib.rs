//! # tinyhooks
//!
//! A minimal reactive component runtime: a component is a function of props
//! and internal state, and calling a state setter schedules a re-render that
//! recomputes the output deterministically.
//!
//! ## Core Concepts
//!
//! - **Definitions**: Named pure render functions `(props, state) -> output`
//! - **State cells**: Versioned values owned by one instance, matched to
//!   `use_state` calls by position
//! - **Instances**: A definition bound to props and its cells, with a
//!   clean/dirty/unmounted lifecycle
//! - **Runtime**: Optional pump that renders dirty instances once per tick
//!
//! ## Example
//!
//! ```ignore
//! use tinyhooks::{Definition, Props, Runtime, RuntimeConfig};
//!
//! let counter = Definition::new("Counter", |props: &Props, scope| {
//!     let start = props.get_i64("initialValue").unwrap_or(0);
//!     let (count, _set_count) = scope.use_state(start)?;
//!     Ok(format!("<button>{}</button>", count))
//! });
//!
//! let runtime = Runtime::new(RuntimeConfig::default());
//! let (instance, html) = runtime.mount(counter, Props::new().with("initialValue", 0))?;
//!
//! // Setters only mark the instance dirty; the host pumps the render.
//! runtime.tick();
//! ```

pub mod component;
pub mod error;
pub mod props;
pub mod runtime;
pub mod state;
pub mod subscriptions;
pub mod types;

// Re-exports
pub use component::{mount, ComponentHandle, ComponentInstance, Definition, RenderFn, RenderScope};
pub use error::{HookError, Result};
pub use props::Props;
pub use runtime::{Runtime, RuntimeConfig, TickSummary};
pub use state::{Setter, Update};
pub use subscriptions::{
    DropReason, InstanceEvent, SubscriptionConfig, SubscriptionFilter, SubscriptionHandle,
    SubscriptionId, SubscriptionManager,
};
pub use types::*;

//! Components: definitions, render scopes and mounted instances.
//!
//! A component is data, not a type hierarchy: a [`Definition`] names a pure
//! render function, and a [`ComponentInstance`] binds it to props and the
//! state cells it requests while rendering.

mod definition;
mod instance;
mod scope;

pub use definition::{Definition, RenderFn};
pub use instance::{mount, ComponentHandle, ComponentInstance};
pub use scope::RenderScope;

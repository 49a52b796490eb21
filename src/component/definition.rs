//! Component definitions.

use crate::error::Result;
use std::fmt;
use std::sync::Arc;

use super::scope::RenderScope;

/// Signature of a render function.
pub type RenderFn<P, O> = dyn Fn(&P, &mut RenderScope<'_>) -> Result<O> + Send + Sync;

/// A named render function from props and state to output.
///
/// The function must be pure with respect to its props and the values its
/// state cells return, and must request the same cells in the same order on
/// every call.
pub struct Definition<P, O> {
    name: Arc<str>,
    render: Arc<RenderFn<P, O>>,
}

impl<P, O> Definition<P, O> {
    pub fn new<F>(name: impl AsRef<str>, render: F) -> Self
    where
        F: Fn(&P, &mut RenderScope<'_>) -> Result<O> + Send + Sync + 'static,
    {
        Self {
            name: Arc::from(name.as_ref()),
            render: Arc::new(render),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub(crate) fn invoke(&self, props: &P, scope: &mut RenderScope<'_>) -> Result<O> {
        (self.render)(props, scope)
    }
}

impl<P, O> Clone for Definition<P, O> {
    fn clone(&self) -> Self {
        Self {
            name: Arc::clone(&self.name),
            render: Arc::clone(&self.render),
        }
    }
}

impl<P, O> fmt::Debug for Definition<P, O> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Definition").field("name", &self.name).finish()
    }
}

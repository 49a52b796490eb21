//! State cells owned by component instances.
//!
//! Each instance owns an ordered table of cells. Cells are created in
//! request order on the first render and reused by position afterwards,
//! which is why every render must request the same cells in the same order.

mod cell;
mod setter;

pub(crate) use cell::StateTable;
pub use setter::{Setter, Update};

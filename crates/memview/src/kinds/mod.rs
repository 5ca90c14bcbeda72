//! Reference structural kinds.
//!
//! The kind set is open: these two cover the scalar and composite halves
//! of the contract, and anything else registers alongside them through
//! [`KindRegistry`](crate::KindRegistry).

pub mod primitive;
pub mod structure;

pub use primitive::{PrimitiveInstance, PrimitiveKind};
pub use structure::{StructInstance, StructKind};

//! Object-instantiation core for memory introspection.
//!
//! This crate turns a byte range inside a named memory layer into a typed,
//! navigable view without copying the underlying bytes. It provides:
//!
//! - [`TypeTemplate`] — a curried factory bound to a structure name and
//!   parameters, invoked at (layer, offset) sites to produce views
//! - [`StructuralKind`] / [`StructuralInstance`] — the pluggable contract
//!   every structural kind satisfies, with all layout facts (size,
//!   children, member offsets, member substitution) computable at the
//!   type level, before any instance exists
//! - [`KindRegistry`] — structure-kind identifier to implementation, so
//!   new kinds plug in without touching the core
//! - [`Context`] / [`MemoryLayer`] — the capability surface consumed from
//!   the surrounding framework (symbol space and layer access)
//!
//! # Example
//!
//! ```rust,ignore
//! use memview::{TemplateParams, TypeTemplate};
//!
//! let template = context.resolve_structure("uint32")?;
//! let pid = template.invoke(&context, "process_mem", 0x1000, None)?;
//! let flags = pid.cast("uint16")?;
//! let y_offset = context.resolve_structure("point")?.relative_child_offset("y")?;
//! ```

pub mod context;
pub mod describe;
pub mod error;
pub mod kinds;
pub mod layer;
pub mod object;
pub mod params;
pub mod registry;
pub mod template;
pub mod validity;

#[cfg(test)]
mod testutil;

// Re-export key types at crate root.
pub use context::Context;
pub use describe::{InstanceDescriptor, TypeDescriptor};
pub use error::{ObjectError, ObjectResult};
pub use kinds::{PrimitiveInstance, PrimitiveKind, StructInstance, StructKind};
pub use layer::{BufferLayer, LayerError, LayerResult, MemoryLayer};
pub use object::{ChildDecl, ObjectMeta, StructuralInstance, StructuralKind};
pub use params::{ParamValue, TemplateParams};
pub use registry::KindRegistry;
pub use template::TypeTemplate;

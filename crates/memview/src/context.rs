//! The context capability consumed by the object core.
//!
//! A context owns the symbol space (structure name → template) and the set
//! of named memory layers. Both live outside this crate; the core only
//! consumes this surface. Tests supply small in-memory implementations.

use crate::error::ObjectResult;
use crate::layer::MemoryLayer;
use crate::template::TypeTemplate;
use std::sync::Arc;

/// Capability supplying symbol-space resolution and layer access.
pub trait Context: Send + Sync {
    /// Resolve a structure name to its template.
    ///
    /// Fails with [`ObjectError::UnresolvedStructure`] for unknown names.
    ///
    /// [`ObjectError::UnresolvedStructure`]: crate::ObjectError::UnresolvedStructure
    fn resolve_structure(&self, name: &str) -> ObjectResult<TypeTemplate>;

    /// Look up a memory layer by name.
    ///
    /// Fails with [`LayerError::UnknownLayer`] for unknown names.
    ///
    /// [`LayerError::UnknownLayer`]: crate::LayerError::UnknownLayer
    fn layer(&self, name: &str) -> ObjectResult<Arc<dyn MemoryLayer>>;
}

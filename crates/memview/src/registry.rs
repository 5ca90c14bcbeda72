//! Registry of pluggable structural kinds.
//!
//! A symbol space mints templates by pairing a discovered structure name
//! with a registered kind; new kinds register here without the core
//! changing.

use crate::error::{ObjectError, ObjectResult};
use crate::object::StructuralKind;
use crate::params::TemplateParams;
use crate::template::TypeTemplate;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

/// Maps structure-kind identifiers to their implementations.
#[derive(Default)]
pub struct KindRegistry {
    kinds: RwLock<HashMap<String, Arc<dyn StructuralKind>>>,
}

impl KindRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a kind under its own identifier, replacing any previous
    /// registration of the same identifier.
    pub fn register(&self, kind: Arc<dyn StructuralKind>) {
        let name = kind.kind_name().to_string();
        debug!(kind = %name, "registering structural kind");
        self.kinds.write().insert(name, kind);
    }

    /// Look up a kind by identifier.
    pub fn get(&self, kind_name: &str) -> ObjectResult<Arc<dyn StructuralKind>> {
        self.kinds
            .read()
            .get(kind_name)
            .cloned()
            .ok_or_else(|| ObjectError::unresolved(kind_name))
    }

    /// Mint a named template from a registered kind.
    pub fn template(
        &self,
        kind_name: &str,
        structure_name: &str,
        params: TemplateParams,
    ) -> ObjectResult<TypeTemplate> {
        Ok(TypeTemplate::new(structure_name, self.get(kind_name)?, params))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kinds::{PrimitiveKind, StructKind};

    #[test]
    fn test_register_and_mint() {
        let registry = KindRegistry::new();
        registry.register(Arc::new(PrimitiveKind));
        registry.register(Arc::new(StructKind));

        let template = registry
            .template(
                "primitive",
                "uint32",
                TemplateParams::new().with("size", 4u64),
            )
            .unwrap();
        assert_eq!(template.structure_name(), Some("uint32"));
        assert_eq!(template.size().unwrap(), 4);
    }

    #[test]
    fn test_unregistered_kind_is_unresolved() {
        let registry = KindRegistry::new();
        let err = registry.get("pointer").unwrap_err();
        assert!(matches!(err, ObjectError::UnresolvedStructure(_)));
    }

    #[test]
    fn test_reregistration_replaces() {
        let registry = KindRegistry::new();
        registry.register(Arc::new(PrimitiveKind));
        registry.register(Arc::new(PrimitiveKind));
        assert!(registry.get("primitive").is_ok());
    }
}

//! Shared test fixtures: an in-memory context and template builders.

use crate::context::Context;
use crate::error::{ObjectError, ObjectResult};
use crate::kinds::{PrimitiveKind, StructKind};
use crate::layer::{BufferLayer, LayerError, MemoryLayer};
use crate::params::TemplateParams;
use crate::template::TypeTemplate;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;

/// Minimal context: one symbol table, a set of named buffer layers.
pub struct TestContext {
    symbols: RwLock<HashMap<String, TypeTemplate>>,
    layers: RwLock<HashMap<String, Arc<dyn MemoryLayer>>>,
}

impl TestContext {
    pub fn build(layer_name: &str, data: Vec<u8>, writable: bool) -> TestContext {
        let mut layers: HashMap<String, Arc<dyn MemoryLayer>> = HashMap::new();
        layers.insert(
            layer_name.to_string(),
            Arc::new(BufferLayer::new(layer_name, data, writable)),
        );
        TestContext {
            symbols: RwLock::new(HashMap::new()),
            layers: RwLock::new(layers),
        }
    }

    /// Build and immediately erase to the capability type most tests want.
    pub fn with_layer(layer_name: &str, data: Vec<u8>, writable: bool) -> Arc<dyn Context> {
        Arc::new(Self::build(layer_name, data, writable))
    }

    pub fn add_structure(&self, name: &str, template: TypeTemplate) {
        self.symbols.write().insert(name.to_string(), template);
    }
}

impl Context for TestContext {
    fn resolve_structure(&self, name: &str) -> ObjectResult<TypeTemplate> {
        self.symbols
            .read()
            .get(name)
            .cloned()
            .ok_or_else(|| ObjectError::unresolved(name))
    }

    fn layer(&self, name: &str) -> ObjectResult<Arc<dyn MemoryLayer>> {
        self.layers
            .read()
            .get(name)
            .cloned()
            .ok_or_else(|| LayerError::UnknownLayer(name.to_string()).into())
    }
}

/// An unsigned little-endian integer template of the given byte size.
pub fn uint_template(name: &str, size: u64) -> TypeTemplate {
    TypeTemplate::new(
        name,
        Arc::new(PrimitiveKind),
        TemplateParams::new().with("size", size),
    )
}

/// The two-field `point` structure: `x` and `y`, both `uint32`.
pub fn point_template() -> TypeTemplate {
    let fields = vec![
        StructKind::field("x", 0, uint_template("uint32", 4)),
        StructKind::field("y", 4, uint_template("uint32", 4)),
    ];
    TypeTemplate::new(
        "point",
        Arc::new(StructKind),
        TemplateParams::new().with("size", 8u64).with("fields", fields),
    )
}

//! End-to-end exercise of the public surface: a symbol space minting
//! templates from the kind registry, object instantiation over a buffer
//! layer, member navigation, casting and write-back.

use memview::{
    BufferLayer, Context, KindRegistry, LayerError, MemoryLayer, ObjectError, ObjectResult,
    ParamValue, PrimitiveInstance, PrimitiveKind, StructInstance, StructKind, TemplateParams,
    TypeTemplate,
};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;

/// A minimal context: a symbol table over the kind registry plus a set of
/// named layers.
struct InMemoryContext {
    symbols: RwLock<HashMap<String, TypeTemplate>>,
    layers: HashMap<String, Arc<dyn MemoryLayer>>,
}

impl InMemoryContext {
    fn new(layer: BufferLayer) -> Self {
        let mut layers: HashMap<String, Arc<dyn MemoryLayer>> = HashMap::new();
        layers.insert(layer.name().to_string(), Arc::new(layer));
        InMemoryContext {
            symbols: RwLock::new(HashMap::new()),
            layers,
        }
    }

    fn add_structure(&self, name: &str, template: TypeTemplate) {
        self.symbols.write().insert(name.to_string(), template);
    }
}

impl Context for InMemoryContext {
    fn resolve_structure(&self, name: &str) -> ObjectResult<TypeTemplate> {
        self.symbols
            .read()
            .get(name)
            .cloned()
            .ok_or_else(|| ObjectError::unresolved(name))
    }

    fn layer(&self, name: &str) -> ObjectResult<Arc<dyn MemoryLayer>> {
        self.layers
            .get(name)
            .cloned()
            .ok_or_else(|| LayerError::UnknownLayer(name.to_string()).into())
    }
}

/// Registry with both reference kinds registered.
fn registry() -> KindRegistry {
    let registry = KindRegistry::new();
    registry.register(Arc::new(PrimitiveKind));
    registry.register(Arc::new(StructKind));
    registry
}

fn uint_params(size: u64) -> TemplateParams {
    TemplateParams::new().with("size", size)
}

/// Populate a context with `uint16`, `uint32` and a two-field `point`.
fn test_context(data: Vec<u8>, writable: bool) -> Arc<InMemoryContext> {
    let registry = registry();
    let uint16 = registry.template("primitive", "uint16", uint_params(2)).unwrap();
    let uint32 = registry.template("primitive", "uint32", uint_params(4)).unwrap();
    let point = registry
        .template(
            "struct",
            "point",
            TemplateParams::new().with("size", 8u64).with(
                "fields",
                vec![
                    StructKind::field("x", 0, uint32.clone()),
                    StructKind::field("y", 4, uint32.clone()),
                ],
            ),
        )
        .unwrap();

    let ctx = Arc::new(InMemoryContext::new(BufferLayer::new(
        "process_mem",
        data,
        writable,
    )));
    ctx.add_structure("uint16", uint16);
    ctx.add_structure("uint32", uint32);
    ctx.add_structure("point", point);
    ctx
}

#[test]
fn test_resolve_invoke_navigate_and_write_back() {
    let mut data = vec![0u8; 0x2000];
    data[0x1000..0x1004].copy_from_slice(&11u32.to_le_bytes());
    data[0x1004..0x1008].copy_from_slice(&22u32.to_le_bytes());
    let ctx = test_context(data, true);
    let capability: Arc<dyn Context> = ctx.clone();

    // Resolve and invoke through the symbol space.
    let template = ctx.resolve_structure("point").unwrap();
    let obj = template.invoke(&capability, "process_mem", 0x1000, None).unwrap();
    assert_eq!(obj.layer_name(), "process_mem");
    assert_eq!(obj.byte_offset(), 0x1000);
    assert_eq!(obj.size(), 8);

    // Navigate to a member and read its value.
    let point: Arc<StructInstance> = obj.into_any().downcast().map_err(|_| "not a struct").unwrap();
    let y = point.member("y").unwrap();
    assert_eq!(y.byte_offset(), 0x1004);
    let value = y
        .as_any()
        .downcast_ref::<PrimitiveInstance>()
        .unwrap()
        .read_value()
        .unwrap();
    assert_eq!(value, ParamValue::Uint(22));

    // Write back through the member view and observe the layer change.
    y.write(&ParamValue::Uint(0xBEEF)).unwrap();
    let layer = ctx.layer("process_mem").unwrap();
    assert_eq!(layer.read(0x1004, 4).unwrap(), 0xBEEFu32.to_le_bytes());

    // The member's identity never moved.
    assert_eq!(y.byte_offset(), 0x1004);
    assert_eq!(y.structure_name(), Some("uint32"));
}

#[test]
fn test_cast_member_to_narrower_view() {
    let mut data = vec![0u8; 0x2000];
    data[0x1000..0x1004].copy_from_slice(&0x12345678u32.to_le_bytes());
    let ctx = test_context(data, false);
    let capability: Arc<dyn Context> = ctx.clone();

    let obj = ctx
        .resolve_structure("uint32")
        .unwrap()
        .invoke(&capability, "process_mem", 0x1000, None)
        .unwrap();
    let half = obj.cast("uint16").unwrap();

    assert_eq!(half.byte_offset(), 0x1000);
    assert_eq!(half.size(), 2);
    let value = half
        .as_any()
        .downcast_ref::<PrimitiveInstance>()
        .unwrap()
        .read_value()
        .unwrap();
    assert_eq!(value, ParamValue::Uint(0x5678));
}

#[test]
fn test_patched_template_changes_later_invocations_only() {
    let ctx = test_context(vec![0u8; 0x2000], false);
    let capability: Arc<dyn Context> = ctx.clone();

    let point = ctx.resolve_structure("point").unwrap();
    let before = point.invoke(&capability, "process_mem", 0x1000, None).unwrap();

    // Patch the `y` member to uint16 and re-publish the structure.
    let uint16 = ctx.resolve_structure("uint16").unwrap();
    let patched = point.replace_child("y", &uint16).unwrap();
    ctx.add_structure("point", patched);

    let after = ctx
        .resolve_structure("point")
        .unwrap()
        .invoke(&capability, "process_mem", 0x1000, None)
        .unwrap();
    let after: Arc<StructInstance> =
        after.into_any().downcast().map_err(|_| "not a struct").unwrap();

    assert_eq!(after.member("y").unwrap().size(), 2);
    // The instance produced before the patch is untouched.
    assert_eq!(before.size(), 8);
}

#[test]
fn test_write_refused_on_readonly_layer() {
    let ctx = test_context(vec![0u8; 0x2000], false);
    let capability: Arc<dyn Context> = ctx.clone();

    let obj = ctx
        .resolve_structure("uint32")
        .unwrap()
        .invoke(&capability, "process_mem", 0x1000, None)
        .unwrap();

    let err = obj.write(&ParamValue::Uint(1)).unwrap_err();
    assert!(matches!(err, ObjectError::NotWritable { .. }));
}

#[test]
fn test_descriptor_chain_serializes() {
    let ctx = test_context(vec![0u8; 0x2000], false);
    let capability: Arc<dyn Context> = ctx.clone();

    let obj = ctx
        .resolve_structure("point")
        .unwrap()
        .invoke(&capability, "process_mem", 0x1000, None)
        .unwrap();
    let point: Arc<StructInstance> = obj.into_any().downcast().map_err(|_| "not a struct").unwrap();
    let x = point.member("x").unwrap();

    let json = serde_json::to_value(x.describe()).unwrap();
    assert_eq!(json["layer_name"], "process_mem");
    assert_eq!(json["byte_offset"], 0x1000);
    assert_eq!(json["member_name"], "x");
    assert_eq!(json["parent"]["byte_offset"], 0x1000);
}

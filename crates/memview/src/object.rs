//! The structural contract: type-level kinds and instance-level views.
//!
//! [`StructuralKind`] is the pluggable half — every structural fact (size,
//! children, member offsets, member substitution) is computable from bound
//! parameters alone, with no instance in sight. [`StructuralInstance`] is
//! the instantiated half — a typed view anchored at a byte offset inside a
//! named layer, able to write itself back and to be cast to another
//! structure at the same address.

use crate::context::Context;
use crate::describe::InstanceDescriptor;
use crate::error::ObjectResult;
use crate::params::{ParamValue, TemplateParams};
use crate::template::TypeTemplate;
use crate::validity;
use std::any::Any;
use std::sync::{Arc, Weak};
use tracing::trace;

/// A named child structural description, in layout order.
#[derive(Debug, Clone, PartialEq)]
pub struct ChildDecl {
    pub name: String,
    pub template: TypeTemplate,
}

impl ChildDecl {
    pub fn new(name: impl Into<String>, template: TypeTemplate) -> Self {
        ChildDecl {
            name: name.into(),
            template,
        }
    }
}

/// The type-level half of the structural contract.
///
/// A kind is registered once and shared; it holds no per-instance state.
/// All queries take the bound parameters explicitly so external tooling
/// can compute layout facts without instantiating anything.
pub trait StructuralKind: Send + Sync {
    /// The structure-kind identifier this implementation registers under.
    fn kind_name(&self) -> &'static str;

    /// The byte length the kind occupies under these parameters.
    fn size(&self, params: &TemplateParams) -> ObjectResult<u64>;

    /// The ordered, named child descriptions composing this kind.
    /// Empty for scalar kinds.
    fn children(&self, params: &TemplateParams) -> ObjectResult<Vec<ChildDecl>>;

    /// Byte offset of `child` relative to the start of the structure.
    /// Every child returned by [`children`](Self::children) must resolve.
    fn relative_child_offset(&self, params: &TemplateParams, child: &str) -> ObjectResult<u64>;

    /// Parameters for the same kind with `child`'s description replaced by
    /// `new_template`. Never mutates `params`; idempotent for fixed
    /// arguments.
    fn replace_child(
        &self,
        child: &str,
        new_template: &TypeTemplate,
        params: &TemplateParams,
    ) -> ObjectResult<TemplateParams>;

    /// Construct an instance of this kind over already-validated identity
    /// state. The single seam where layout metadata becomes a concrete
    /// view.
    fn instantiate(
        &self,
        meta: ObjectMeta,
        params: &TemplateParams,
    ) -> ObjectResult<Arc<dyn StructuralInstance>>;
}

impl std::fmt::Debug for dyn StructuralKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StructuralKind")
            .field("kind_name", &self.kind_name())
            .finish_non_exhaustive()
    }
}

/// Immutable identity state shared by every instance.
///
/// Construction is the one fallible boundary; afterwards the identity
/// (layer, offset, structure name) never changes — only the value observed
/// through the layer may.
pub struct ObjectMeta {
    context: Arc<dyn Context>,
    layer_name: String,
    byte_offset: u64,
    structure_name: Option<String>,
    size: u64,
    member_name: Option<String>,
    /// Non-owning back-reference: children never keep parents alive.
    parent: Option<Weak<dyn StructuralInstance>>,
}

impl ObjectMeta {
    /// Validate and assemble instance identity.
    ///
    /// Only the extent is checked here; a wrong layer or structure name is
    /// accepted and fails at first use.
    pub fn new(
        context: Arc<dyn Context>,
        layer_name: impl Into<String>,
        byte_offset: u64,
        structure_name: Option<String>,
        size: u64,
        parent: Option<&Arc<dyn StructuralInstance>>,
    ) -> ObjectResult<Self> {
        validity::check_extent(byte_offset, size)?;
        Ok(ObjectMeta {
            context,
            layer_name: layer_name.into(),
            byte_offset,
            structure_name,
            size,
            member_name: None,
            parent: parent.map(Arc::downgrade),
        })
    }

    /// Mark this identity as a named member of its parent.
    pub fn as_member(mut self, name: impl Into<String>) -> Self {
        self.member_name = Some(name.into());
        self
    }

    pub fn context(&self) -> &Arc<dyn Context> {
        &self.context
    }

    pub fn layer_name(&self) -> &str {
        &self.layer_name
    }

    pub fn byte_offset(&self) -> u64 {
        self.byte_offset
    }

    pub fn structure_name(&self) -> Option<&str> {
        self.structure_name.as_deref()
    }

    pub fn size(&self) -> u64 {
        self.size
    }

    pub fn member_name(&self) -> Option<&str> {
        self.member_name.as_deref()
    }

    /// The parent view, if one was given and is still alive.
    pub fn parent(&self) -> Option<Arc<dyn StructuralInstance>> {
        self.parent.as_ref().and_then(Weak::upgrade)
    }

    /// Read this view's bytes from its layer.
    pub fn read(&self) -> ObjectResult<Vec<u8>> {
        let layer = self.context.layer(&self.layer_name)?;
        Ok(layer.read(self.byte_offset, self.size as usize)?)
    }

    /// Write raw bytes back through this view's layer.
    pub fn write_bytes(&self, data: &[u8]) -> ObjectResult<()> {
        let layer = self.context.layer(&self.layer_name)?;
        Ok(layer.write(self.byte_offset, data)?)
    }

    /// Build the diagnostic descriptor for this identity, following the
    /// parent chain as far as it is still alive.
    pub fn describe(&self) -> InstanceDescriptor {
        InstanceDescriptor {
            layer_name: self.layer_name.clone(),
            byte_offset: self.byte_offset,
            member_name: self.member_name.clone(),
            parent: self
                .parent()
                .map(|p| Box::new(p.meta().describe())),
        }
    }
}

/// The instance-level half of the structural contract.
///
/// Implementations supply their identity state and their own value
/// encoding; everything else is provided.
pub trait StructuralInstance: Send + Sync {
    /// The immutable identity state of this view.
    fn meta(&self) -> &ObjectMeta;

    /// Re-encode `value` per this kind's encoding and write it into the
    /// layer at this view's offset. There is no default encoding.
    fn write(&self, value: &ParamValue) -> ObjectResult<()>;

    /// Downcast support for kind-specific surfaces (value reads, member
    /// navigation).
    fn as_any(&self) -> &dyn Any;

    /// Owning variant of [`as_any`](Self::as_any), for recovering a
    /// concrete `Arc` from a shared view.
    fn into_any(self: Arc<Self>) -> Arc<dyn Any + Send + Sync>;

    fn layer_name(&self) -> &str {
        self.meta().layer_name()
    }

    fn byte_offset(&self) -> u64 {
        self.meta().byte_offset()
    }

    fn structure_name(&self) -> Option<&str> {
        self.meta().structure_name()
    }

    fn size(&self) -> u64 {
        self.meta().size()
    }

    /// The parent view, if one was given and is still alive.
    fn parent(&self) -> Option<Arc<dyn StructuralInstance>> {
        self.meta().parent()
    }

    fn describe(&self) -> InstanceDescriptor {
        self.meta().describe()
    }

    /// Re-interpret the same address under another structure name.
    ///
    /// Resolves the name through the context's symbol space and invokes
    /// the result at this view's layer and offset, with no parent: a cast
    /// yields a sibling view, not a child. The new view's size is whatever
    /// the new template defines.
    fn cast(&self, new_structure_name: &str) -> ObjectResult<Arc<dyn StructuralInstance>> {
        let meta = self.meta();
        trace!(
            structure = new_structure_name,
            layer = meta.layer_name(),
            offset = meta.byte_offset(),
            "casting object"
        );
        let template = meta.context().resolve_structure(new_structure_name)?;
        template.invoke(meta.context(), meta.layer_name(), meta.byte_offset(), None)
    }
}

impl std::fmt::Debug for dyn StructuralInstance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StructuralInstance")
            .field("layer_name", &self.layer_name())
            .field("byte_offset", &self.byte_offset())
            .field("structure_name", &self.structure_name())
            .finish_non_exhaustive()
    }
}

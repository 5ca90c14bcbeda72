//! Type templates: curried object factories.
//!
//! A template binds a structure name and construction parameters once and
//! is then invoked at arbitrarily many (layer, offset) sites. Templates
//! are plain values — a symbol space can store them, compare them, hand
//! them out, and rebind a parameter discovered late (say, an array length
//! read from a sibling field) without touching instances already produced.

use crate::context::Context;
use crate::describe::TypeDescriptor;
use crate::error::ObjectResult;
use crate::object::{ChildDecl, ObjectMeta, StructuralInstance, StructuralKind};
use crate::params::TemplateParams;
use std::fmt;
use std::sync::Arc;
use tracing::trace;

/// A factory bound to a structure name, a structural kind and a snapshot
/// of construction parameters.
#[derive(Clone)]
pub struct TypeTemplate {
    structure_name: Option<String>,
    kind: Arc<dyn StructuralKind>,
    params: TemplateParams,
}

impl TypeTemplate {
    /// A template bound to a structure name.
    pub fn new(
        structure_name: impl Into<String>,
        kind: Arc<dyn StructuralKind>,
        params: TemplateParams,
    ) -> Self {
        TypeTemplate {
            structure_name: Some(structure_name.into()),
            kind,
            params,
        }
    }

    /// An anonymous template (no structure name bound).
    pub fn anonymous(kind: Arc<dyn StructuralKind>, params: TemplateParams) -> Self {
        TypeTemplate {
            structure_name: None,
            kind,
            params,
        }
    }

    /// The bound structure name, if any.
    pub fn structure_name(&self) -> Option<&str> {
        self.structure_name.as_deref()
    }

    /// The structural kind this template constructs.
    pub fn kind(&self) -> &Arc<dyn StructuralKind> {
        &self.kind
    }

    /// An independent snapshot of the bound parameters. Mutating the
    /// returned value never affects this template.
    pub fn parameters(&self) -> TemplateParams {
        self.params.clone()
    }

    /// Merge `new_params` into the bound parameters, overwriting
    /// same-named keys. Instances already produced and snapshots already
    /// taken are unaffected.
    pub fn update(&mut self, new_params: TemplateParams) {
        self.params.merge(new_params);
    }

    /// The byte length this template's instances occupy.
    pub fn size(&self) -> ObjectResult<u64> {
        self.kind.size(&self.params)
    }

    /// The ordered, named child descriptions of this template.
    pub fn children(&self) -> ObjectResult<Vec<ChildDecl>> {
        self.kind.children(&self.params)
    }

    /// Byte offset of `child` relative to the start of the structure.
    ///
    /// Lets a caller compute a descendant's absolute address
    /// (`byte_offset + relative offset`) without materializing it.
    pub fn relative_child_offset(&self, child: &str) -> ObjectResult<u64> {
        self.kind.relative_child_offset(&self.params, child)
    }

    /// A template for the same structure with `child`'s description
    /// replaced by `new_template`. This template's bound state is
    /// untouched.
    pub fn replace_child(&self, child: &str, new_template: &TypeTemplate) -> ObjectResult<Self> {
        let params = self.kind.replace_child(child, new_template, &self.params)?;
        Ok(TypeTemplate {
            structure_name: self.structure_name.clone(),
            kind: Arc::clone(&self.kind),
            params,
        })
    }

    /// The diagnostic type descriptor for this template.
    pub fn describe(&self) -> ObjectResult<TypeDescriptor> {
        let name = self.structure_name.as_deref().unwrap_or("<anonymous>");
        Ok(TypeDescriptor::new(name, self.size()?).with_fact("kind", self.kind.kind_name()))
    }

    /// Construct an instance of the bound structure kind at `byte_offset`
    /// in the layer named `layer_name`, with an optional non-owning parent
    /// back-reference.
    pub fn invoke(
        &self,
        context: &Arc<dyn Context>,
        layer_name: &str,
        byte_offset: u64,
        parent: Option<&Arc<dyn StructuralInstance>>,
    ) -> ObjectResult<Arc<dyn StructuralInstance>> {
        let meta = self.meta_for(context, layer_name, byte_offset, parent)?;
        self.kind.instantiate(meta, &self.params)
    }

    /// Like [`invoke`](Self::invoke), for a view materialized as a named
    /// member of `parent`.
    pub fn invoke_member(
        &self,
        context: &Arc<dyn Context>,
        layer_name: &str,
        byte_offset: u64,
        parent: &Arc<dyn StructuralInstance>,
        member_name: &str,
    ) -> ObjectResult<Arc<dyn StructuralInstance>> {
        let meta = self
            .meta_for(context, layer_name, byte_offset, Some(parent))?
            .as_member(member_name);
        self.kind.instantiate(meta, &self.params)
    }

    fn meta_for(
        &self,
        context: &Arc<dyn Context>,
        layer_name: &str,
        byte_offset: u64,
        parent: Option<&Arc<dyn StructuralInstance>>,
    ) -> ObjectResult<ObjectMeta> {
        let size = self.kind.size(&self.params)?;
        trace!(
            structure = self.structure_name.as_deref().unwrap_or("<anonymous>"),
            kind = self.kind.kind_name(),
            layer = layer_name,
            offset = byte_offset,
            size,
            "instantiating object"
        );
        ObjectMeta::new(
            Arc::clone(context),
            layer_name,
            byte_offset,
            self.structure_name.clone(),
            size,
            parent,
        )
    }
}

impl fmt::Debug for TypeTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeTemplate")
            .field("structure_name", &self.structure_name)
            .field("kind", &self.kind.kind_name())
            .field("params", &self.params)
            .finish()
    }
}

/// Templates compare by structure name, kind identifier and bound
/// parameters; the kind implementation itself carries no state.
impl PartialEq for TypeTemplate {
    fn eq(&self, other: &Self) -> bool {
        self.structure_name == other.structure_name
            && self.kind.kind_name() == other.kind.kind_name()
            && self.params == other.params
    }
}

//! Composite (struct) kind.
//!
//! Parameters: `fields` — an ordered list of `{name, offset, template}`
//! maps describing the members as laid out — and optionally `size` to pin
//! the overall byte length (otherwise it is derived from the furthest
//! member end).

use crate::error::{ObjectError, ObjectResult};
use crate::object::{ChildDecl, ObjectMeta, StructuralInstance, StructuralKind};
use crate::params::{ParamValue, TemplateParams};
use crate::template::TypeTemplate;
use crate::validity;
use std::any::Any;
use std::collections::BTreeMap;
use std::sync::Arc;

/// One parsed member description.
#[derive(Debug, Clone)]
struct FieldDecl {
    name: String,
    offset: u64,
    template: TypeTemplate,
}

impl FieldDecl {
    fn parse(entry: &ParamValue) -> ObjectResult<Self> {
        let map = match entry {
            ParamValue::Map(m) => m,
            other => {
                return Err(ObjectError::type_mismatch(
                    "map entry in 'fields'",
                    other.kind(),
                ))
            }
        };
        let name = match map.get("name") {
            Some(ParamValue::Str(s)) => s.clone(),
            Some(other) => {
                return Err(ObjectError::type_mismatch("str field 'name'", other.kind()))
            }
            None => return Err(ObjectError::type_mismatch("str field 'name'", "missing")),
        };
        let offset = match map.get("offset") {
            Some(ParamValue::Uint(v)) => *v,
            Some(ParamValue::Int(v)) => validity::check_offset(*v)?,
            Some(other) => {
                return Err(ObjectError::type_mismatch(
                    "uint field 'offset'",
                    other.kind(),
                ))
            }
            None => return Err(ObjectError::type_mismatch("uint field 'offset'", "missing")),
        };
        let template = match map.get("template") {
            Some(ParamValue::Template(t)) => t.clone(),
            Some(other) => {
                return Err(ObjectError::type_mismatch(
                    "template field 'template'",
                    other.kind(),
                ))
            }
            None => {
                return Err(ObjectError::type_mismatch(
                    "template field 'template'",
                    "missing",
                ))
            }
        };
        Ok(FieldDecl {
            name,
            offset,
            template,
        })
    }

    fn to_param(&self) -> ParamValue {
        StructKind::field(&self.name, self.offset, self.template.clone())
    }
}

fn parse_fields(params: &TemplateParams) -> ObjectResult<Vec<FieldDecl>> {
    params.get_list("fields")?.iter().map(FieldDecl::parse).collect()
}

/// The composite structural kind.
pub struct StructKind;

impl StructKind {
    /// Build one `fields` entry.
    pub fn field(name: impl Into<String>, offset: u64, template: TypeTemplate) -> ParamValue {
        let mut map = BTreeMap::new();
        map.insert("name".to_string(), ParamValue::Str(name.into()));
        map.insert("offset".to_string(), ParamValue::Uint(offset));
        map.insert("template".to_string(), ParamValue::Template(template));
        ParamValue::Map(map)
    }
}

impl StructuralKind for StructKind {
    fn kind_name(&self) -> &'static str {
        "struct"
    }

    fn size(&self, params: &TemplateParams) -> ObjectResult<u64> {
        if params.contains("size") {
            return params.get_u64("size");
        }
        // Derived size: the furthest member end.
        let mut end = 0u64;
        for field in parse_fields(params)? {
            let field_size = field.template.size()?;
            validity::check_extent(field.offset, field_size)?;
            end = end.max(field.offset + field_size);
        }
        Ok(end)
    }

    fn children(&self, params: &TemplateParams) -> ObjectResult<Vec<ChildDecl>> {
        Ok(parse_fields(params)?
            .into_iter()
            .map(|f| ChildDecl::new(f.name, f.template))
            .collect())
    }

    fn relative_child_offset(&self, params: &TemplateParams, child: &str) -> ObjectResult<u64> {
        parse_fields(params)?
            .iter()
            .find(|f| f.name == child)
            .map(|f| f.offset)
            .ok_or_else(|| ObjectError::unknown_child(self.kind_name(), child))
    }

    fn replace_child(
        &self,
        child: &str,
        new_template: &TypeTemplate,
        params: &TemplateParams,
    ) -> ObjectResult<TemplateParams> {
        let mut fields = parse_fields(params)?;
        let slot = fields
            .iter_mut()
            .find(|f| f.name == child)
            .ok_or_else(|| ObjectError::unknown_child(self.kind_name(), child))?;
        slot.template = new_template.clone();

        let mut updated = params.clone();
        updated.insert(
            "fields",
            ParamValue::List(fields.iter().map(FieldDecl::to_param).collect()),
        );
        Ok(updated)
    }

    fn instantiate(
        &self,
        meta: ObjectMeta,
        params: &TemplateParams,
    ) -> ObjectResult<Arc<dyn StructuralInstance>> {
        let fields = parse_fields(params)?;
        Ok(Arc::new(StructInstance { meta, fields }))
    }
}

/// A composite view over the layer.
///
/// The instance holds its member layout but never owns member instances;
/// [`member`](Self::member) materializes one on demand with this view as
/// the non-owning parent.
pub struct StructInstance {
    meta: ObjectMeta,
    fields: Vec<FieldDecl>,
}

impl StructInstance {
    fn structure_label(&self) -> &str {
        self.meta.structure_name().unwrap_or("struct")
    }

    /// Materialize the named member as a child view.
    pub fn member(self: &Arc<Self>, name: &str) -> ObjectResult<Arc<dyn StructuralInstance>> {
        let field = self
            .fields
            .iter()
            .find(|f| f.name == name)
            .ok_or_else(|| ObjectError::unknown_child(self.structure_label(), name))?;
        validity::check_extent(self.meta.byte_offset(), field.offset)?;
        let parent: Arc<dyn StructuralInstance> = Arc::clone(self) as _;
        field.template.invoke_member(
            self.meta.context(),
            self.meta.layer_name(),
            self.meta.byte_offset() + field.offset,
            &parent,
            name,
        )
    }
}

impl StructuralInstance for StructInstance {
    fn meta(&self) -> &ObjectMeta {
        &self.meta
    }

    fn write(&self, _value: &ParamValue) -> ObjectResult<()> {
        Err(ObjectError::unencodable(
            self.structure_label(),
            "structured kinds have no scalar encoding",
        ))
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn into_any(self: Arc<Self>) -> Arc<dyn Any + Send + Sync> {
        self
    }
}

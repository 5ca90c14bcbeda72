//! Bound construction parameters for type templates.
//!
//! A [`TemplateParams`] mapping is kind-specific and opaque to the core:
//! an array kind keeps its element template and count here, a struct kind
//! its field layout. The core only guarantees snapshot isolation — every
//! copy handed out is independent of the template's bound state.

use crate::error::{ObjectError, ObjectResult};
use crate::template::TypeTemplate;
use crate::validity;
use std::collections::BTreeMap;

/// A single named construction parameter.
///
/// Rich enough to describe any structural layout, but carries no meaning
/// of its own; each structural kind defines the vocabulary it reads.
#[derive(Debug, Clone, PartialEq)]
pub enum ParamValue {
    Uint(u64),
    Int(i64),
    Bool(bool),
    Str(String),
    Bytes(Vec<u8>),
    Template(TypeTemplate),
    List(Vec<ParamValue>),
    Map(BTreeMap<String, ParamValue>),
}

impl ParamValue {
    /// A short name for the variant, used in error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            ParamValue::Uint(_) => "uint",
            ParamValue::Int(_) => "int",
            ParamValue::Bool(_) => "bool",
            ParamValue::Str(_) => "str",
            ParamValue::Bytes(_) => "bytes",
            ParamValue::Template(_) => "template",
            ParamValue::List(_) => "list",
            ParamValue::Map(_) => "map",
        }
    }
}

impl From<u64> for ParamValue {
    fn from(v: u64) -> Self {
        ParamValue::Uint(v)
    }
}

impl From<i64> for ParamValue {
    fn from(v: i64) -> Self {
        ParamValue::Int(v)
    }
}

impl From<bool> for ParamValue {
    fn from(v: bool) -> Self {
        ParamValue::Bool(v)
    }
}

impl From<&str> for ParamValue {
    fn from(v: &str) -> Self {
        ParamValue::Str(v.to_string())
    }
}

impl From<String> for ParamValue {
    fn from(v: String) -> Self {
        ParamValue::Str(v)
    }
}

impl From<TypeTemplate> for ParamValue {
    fn from(v: TypeTemplate) -> Self {
        ParamValue::Template(v)
    }
}

impl From<Vec<ParamValue>> for ParamValue {
    fn from(v: Vec<ParamValue>) -> Self {
        ParamValue::List(v)
    }
}

/// The named construction parameters bound into a template.
///
/// Cloning is a deep copy: every contained value is owned, so a clone
/// shares no state with the original.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TemplateParams(BTreeMap<String, ParamValue>);

impl TemplateParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Bind a parameter, replacing any previous binding of the same name.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<ParamValue>) {
        self.0.insert(name.into(), value.into());
    }

    /// Builder-style [`insert`](Self::insert).
    pub fn with(mut self, name: impl Into<String>, value: impl Into<ParamValue>) -> Self {
        self.insert(name, value);
        self
    }

    /// Merge `other` into this mapping, overwriting same-named keys and
    /// leaving all others untouched.
    pub fn merge(&mut self, other: TemplateParams) {
        self.0.extend(other.0);
    }

    pub fn get(&self, name: &str) -> Option<&ParamValue> {
        self.0.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ParamValue)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    fn require(&self, name: &str, expected: &str) -> ObjectResult<&ParamValue> {
        self.0.get(name).ok_or_else(|| {
            ObjectError::type_mismatch(format!("{expected} parameter '{name}'"), "missing")
        })
    }

    /// Read an unsigned integer parameter. A non-negative `Int` is
    /// admitted; a negative one fails with `TypeMismatch`.
    pub fn get_u64(&self, name: &str) -> ObjectResult<u64> {
        match self.require(name, "uint")? {
            ParamValue::Uint(v) => Ok(*v),
            ParamValue::Int(v) => validity::check_offset(*v),
            other => Err(ObjectError::type_mismatch(
                format!("uint parameter '{name}'"),
                other.kind(),
            )),
        }
    }

    /// Read a signed integer parameter.
    pub fn get_i64(&self, name: &str) -> ObjectResult<i64> {
        match self.require(name, "int")? {
            ParamValue::Int(v) => Ok(*v),
            ParamValue::Uint(v) => i64::try_from(*v).map_err(|_| {
                ObjectError::type_mismatch(format!("int parameter '{name}'"), format!("{v}"))
            }),
            other => Err(ObjectError::type_mismatch(
                format!("int parameter '{name}'"),
                other.kind(),
            )),
        }
    }

    /// Read a boolean parameter, defaulting to `false` when unbound.
    pub fn get_bool(&self, name: &str) -> ObjectResult<bool> {
        match self.0.get(name) {
            None => Ok(false),
            Some(ParamValue::Bool(v)) => Ok(*v),
            Some(other) => Err(ObjectError::type_mismatch(
                format!("bool parameter '{name}'"),
                other.kind(),
            )),
        }
    }

    /// Read a string parameter.
    pub fn get_str(&self, name: &str) -> ObjectResult<&str> {
        match self.require(name, "str")? {
            ParamValue::Str(v) => Ok(v),
            other => Err(ObjectError::type_mismatch(
                format!("str parameter '{name}'"),
                other.kind(),
            )),
        }
    }

    /// Read a nested template parameter.
    pub fn get_template(&self, name: &str) -> ObjectResult<&TypeTemplate> {
        match self.require(name, "template")? {
            ParamValue::Template(v) => Ok(v),
            other => Err(ObjectError::type_mismatch(
                format!("template parameter '{name}'"),
                other.kind(),
            )),
        }
    }

    /// Read a list parameter.
    pub fn get_list(&self, name: &str) -> ObjectResult<&[ParamValue]> {
        match self.require(name, "list")? {
            ParamValue::List(v) => Ok(v),
            other => Err(ObjectError::type_mismatch(
                format!("list parameter '{name}'"),
                other.kind(),
            )),
        }
    }

    /// Read a map parameter.
    pub fn get_map(&self, name: &str) -> ObjectResult<&BTreeMap<String, ParamValue>> {
        match self.require(name, "map")? {
            ParamValue::Map(v) => Ok(v),
            other => Err(ObjectError::type_mismatch(
                format!("map parameter '{name}'"),
                other.kind(),
            )),
        }
    }
}

impl FromIterator<(String, ParamValue)> for TemplateParams {
    fn from_iter<I: IntoIterator<Item = (String, ParamValue)>>(iter: I) -> Self {
        TemplateParams(iter.into_iter().collect())
    }
}

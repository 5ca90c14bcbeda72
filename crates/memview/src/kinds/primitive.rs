//! Integer scalar kind.
//!
//! Parameters: `size` (bytes, 1–8), `signed` (bool, default false),
//! `endian` (`"little"` or `"big"`, default little) — the same vocabulary
//! symbol files use for base types.

use crate::error::{ObjectError, ObjectResult};
use crate::object::{ChildDecl, ObjectMeta, StructuralInstance, StructuralKind};
use crate::params::{ParamValue, TemplateParams};
use crate::template::TypeTemplate;
use std::any::Any;
use std::sync::Arc;
use tracing::trace;

/// Decoded encoding parameters for an integer scalar.
#[derive(Debug, Clone, Copy)]
struct PrimitiveLayout {
    size: usize,
    signed: bool,
    big_endian: bool,
}

impl PrimitiveLayout {
    fn from_params(params: &TemplateParams) -> ObjectResult<Self> {
        let size = params.get_u64("size")?;
        if !(1..=8).contains(&size) {
            return Err(ObjectError::type_mismatch(
                "integer size between 1 and 8",
                format!("{size}"),
            ));
        }
        let signed = params.get_bool("signed")?;
        let big_endian = match params.get("endian") {
            None => false,
            Some(ParamValue::Str(s)) => match s.as_str() {
                "little" => false,
                "big" => true,
                other => {
                    return Err(ObjectError::type_mismatch(
                        "endian parameter 'little' or 'big'",
                        other,
                    ))
                }
            },
            Some(other) => {
                return Err(ObjectError::type_mismatch(
                    "str parameter 'endian'",
                    other.kind(),
                ))
            }
        };
        Ok(PrimitiveLayout {
            size: size as usize,
            signed,
            big_endian,
        })
    }

    fn decode(&self, bytes: &[u8]) -> ParamValue {
        let mut buf = [0u8; 8];
        let raw = if self.big_endian {
            buf[8 - self.size..].copy_from_slice(bytes);
            u64::from_be_bytes(buf)
        } else {
            buf[..self.size].copy_from_slice(bytes);
            u64::from_le_bytes(buf)
        };
        if self.signed {
            let shift = 64 - self.size as u32 * 8;
            ParamValue::Int(((raw << shift) as i64) >> shift)
        } else {
            ParamValue::Uint(raw)
        }
    }

    fn encode(&self, raw: u64) -> Vec<u8> {
        if self.big_endian {
            raw.to_be_bytes()[8 - self.size..].to_vec()
        } else {
            raw.to_le_bytes()[..self.size].to_vec()
        }
    }

    fn fits_unsigned(&self, v: u64) -> bool {
        self.size >= 8 || v >> (self.size * 8) == 0
    }

    fn fits_signed(&self, v: i64) -> bool {
        if self.size >= 8 {
            return true;
        }
        let bits = self.size as u32 * 8;
        let max = (1i64 << (bits - 1)) - 1;
        let min = -(1i64 << (bits - 1));
        (min..=max).contains(&v)
    }
}

/// The integer scalar structural kind.
pub struct PrimitiveKind;

impl StructuralKind for PrimitiveKind {
    fn kind_name(&self) -> &'static str {
        "primitive"
    }

    fn size(&self, params: &TemplateParams) -> ObjectResult<u64> {
        Ok(PrimitiveLayout::from_params(params)?.size as u64)
    }

    fn children(&self, _params: &TemplateParams) -> ObjectResult<Vec<ChildDecl>> {
        Ok(Vec::new())
    }

    fn relative_child_offset(&self, _params: &TemplateParams, _child: &str) -> ObjectResult<u64> {
        Err(ObjectError::unsupported(
            self.kind_name(),
            "relative_child_offset",
        ))
    }

    fn replace_child(
        &self,
        _child: &str,
        _new_template: &TypeTemplate,
        _params: &TemplateParams,
    ) -> ObjectResult<TemplateParams> {
        Err(ObjectError::unsupported(self.kind_name(), "replace_child"))
    }

    fn instantiate(
        &self,
        meta: ObjectMeta,
        params: &TemplateParams,
    ) -> ObjectResult<Arc<dyn StructuralInstance>> {
        let layout = PrimitiveLayout::from_params(params)?;
        Ok(Arc::new(PrimitiveInstance { meta, layout }))
    }
}

/// An integer scalar view over the layer.
pub struct PrimitiveInstance {
    meta: ObjectMeta,
    layout: PrimitiveLayout,
}

impl PrimitiveInstance {
    /// Decode the current value from the layer.
    pub fn read_value(&self) -> ObjectResult<ParamValue> {
        let bytes = self.meta.read()?;
        Ok(self.layout.decode(&bytes))
    }

    fn structure_label(&self) -> &str {
        self.meta.structure_name().unwrap_or("primitive")
    }
}

impl StructuralInstance for PrimitiveInstance {
    fn meta(&self) -> &ObjectMeta {
        &self.meta
    }

    fn write(&self, value: &ParamValue) -> ObjectResult<()> {
        let raw = match value {
            ParamValue::Uint(v) => {
                let in_range = if self.layout.signed {
                    i64::try_from(*v).map_or(false, |v| self.layout.fits_signed(v))
                } else {
                    self.layout.fits_unsigned(*v)
                };
                if !in_range {
                    return Err(ObjectError::unencodable(
                        self.structure_label(),
                        format!("{v} does not fit in {} bytes", self.layout.size),
                    ));
                }
                *v
            }
            ParamValue::Int(v) => {
                let in_range = if self.layout.signed {
                    self.layout.fits_signed(*v)
                } else {
                    *v >= 0 && self.layout.fits_unsigned(*v as u64)
                };
                if !in_range {
                    return Err(ObjectError::unencodable(
                        self.structure_label(),
                        format!("{v} does not fit in {} bytes", self.layout.size),
                    ));
                }
                *v as u64
            }
            other => {
                return Err(ObjectError::unencodable(
                    self.structure_label(),
                    format!("expected an integer value, found {}", other.kind()),
                ))
            }
        };
        trace!(
            structure = self.structure_label(),
            layer = self.meta.layer_name(),
            offset = self.meta.byte_offset(),
            size = self.layout.size,
            "writing object value"
        );
        self.meta.write_bytes(&self.layout.encode(raw))
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn into_any(self: Arc<Self>) -> Arc<dyn Any + Send + Sync> {
        self
    }
}

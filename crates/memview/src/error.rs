//! Error types for the object core.

use crate::layer::LayerError;
use thiserror::Error;

/// Errors raised when building or using typed views.
#[derive(Debug, Error)]
pub enum ObjectError {
    /// A construction precondition or parameter shape is violated.
    #[error("Type mismatch: expected {expected}, found {found}")]
    TypeMismatch { expected: String, found: String },

    /// Symbol-space lookup failed for a structure name.
    #[error("Unresolved structure: {0}")]
    UnresolvedStructure(String),

    /// The layer refused a write at the given address.
    #[error("Layer '{layer_name}' refused a write at {offset:#x}")]
    NotWritable { layer_name: String, offset: u64 },

    /// A structural kind cannot represent the value passed to write.
    #[error("Structure '{structure}' cannot encode value: {reason}")]
    UnencodableValue { structure: String, reason: String },

    /// A structural kind does not support one of the type-level queries.
    #[error("Kind '{kind}' does not support {operation}")]
    UnsupportedOperation {
        kind: String,
        operation: &'static str,
    },

    /// A child identifier was not produced by this structure's children.
    #[error("Structure '{structure}' has no child named '{child}'")]
    UnknownChild { structure: String, child: String },

    /// An error from the external layer, passed through untranslated.
    #[error(transparent)]
    Layer(LayerError),
}

impl ObjectError {
    /// Create a TypeMismatch error.
    pub fn type_mismatch(expected: impl Into<String>, found: impl Into<String>) -> Self {
        ObjectError::TypeMismatch {
            expected: expected.into(),
            found: found.into(),
        }
    }

    /// Create an UnresolvedStructure error.
    pub fn unresolved(name: impl Into<String>) -> Self {
        ObjectError::UnresolvedStructure(name.into())
    }

    /// Create an UnencodableValue error.
    pub fn unencodable(structure: impl Into<String>, reason: impl Into<String>) -> Self {
        ObjectError::UnencodableValue {
            structure: structure.into(),
            reason: reason.into(),
        }
    }

    /// Create an UnsupportedOperation error.
    pub fn unsupported(kind: impl Into<String>, operation: &'static str) -> Self {
        ObjectError::UnsupportedOperation {
            kind: kind.into(),
            operation,
        }
    }

    /// Create an UnknownChild error.
    pub fn unknown_child(structure: impl Into<String>, child: impl Into<String>) -> Self {
        ObjectError::UnknownChild {
            structure: structure.into(),
            child: child.into(),
        }
    }
}

// Write refusal is its own error kind so a permission failure stays
// distinguishable from a cast typo or an encoding failure. Every other
// layer error passes through unchanged.
impl From<LayerError> for ObjectError {
    fn from(err: LayerError) -> Self {
        match err {
            LayerError::NotWritable { layer_name, offset } => {
                ObjectError::NotWritable { layer_name, offset }
            }
            other => ObjectError::Layer(other),
        }
    }
}

/// Result type for object-core operations.
pub type ObjectResult<T> = Result<T, ObjectError>;

//! Construction-boundary validity checks.
//!
//! Objects are instantiated often and on hot paths, so only the checks that
//! cannot be discharged by the type system run here: offset admission from
//! untyped parameter data and extent arithmetic. Fields that are accepted
//! unchecked (layer names, structure names) are expected to fail at first
//! use instead.

use crate::error::{ObjectError, ObjectResult};

/// Admit a signed offset from untyped data as an unsigned address.
pub fn check_offset(raw: i64) -> ObjectResult<u64> {
    u64::try_from(raw)
        .map_err(|_| ObjectError::type_mismatch("non-negative offset", format!("{raw}")))
}

/// Check that `[offset, offset + size)` stays within the address space.
pub fn check_extent(offset: u64, size: u64) -> ObjectResult<()> {
    offset.checked_add(size).map(|_| ()).ok_or_else(|| {
        ObjectError::type_mismatch(
            "extent within the address space",
            format!("offset {offset:#x} + size {size:#x}"),
        )
    })
}

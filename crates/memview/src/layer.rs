//! The memory layer capability consumed by the object core.
//!
//! A layer is a named, addressable byte range (a physical dump, a
//! translated virtual view, a network stream). The [`MemoryLayer`] trait
//! is the full surface this crate needs from one; address translation,
//! paging and caching all live behind it and are not this crate's concern.
//!
//! [`BufferLayer`] is the in-memory reference implementation, mainly
//! useful for tests and for carving views over already-read byte ranges.

use parking_lot::RwLock;
use std::sync::Arc;
use thiserror::Error;

/// Errors raised by a memory layer.
#[derive(Debug, Error)]
pub enum LayerError {
    /// An address range is not valid in the layer.
    #[error("Invalid address {offset:#x} in layer '{layer_name}': {message}")]
    InvalidAddress {
        layer_name: String,
        offset: u64,
        message: String,
    },

    /// The layer refused a write at the given address.
    #[error("Layer '{layer_name}' is not writable at {offset:#x}")]
    NotWritable { layer_name: String, offset: u64 },

    /// No layer with this name is known to the context.
    #[error("Unknown layer '{0}'")]
    UnknownLayer(String),

    /// The layer has been destroyed and cannot be used.
    #[error("Layer '{0}' has been destroyed")]
    Destroyed(String),

    /// I/O error from the layer's backing store.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl LayerError {
    /// Create an InvalidAddress error.
    pub fn invalid_address(
        layer_name: impl Into<String>,
        offset: u64,
        message: impl Into<String>,
    ) -> Self {
        LayerError::InvalidAddress {
            layer_name: layer_name.into(),
            offset,
            message: message.into(),
        }
    }

    /// Create a NotWritable error.
    pub fn not_writable(layer_name: impl Into<String>, offset: u64) -> Self {
        LayerError::NotWritable {
            layer_name: layer_name.into(),
            offset,
        }
    }
}

/// Result type for layer operations.
pub type LayerResult<T> = Result<T, LayerError>;

/// Trait for reading and writing a memory layer.
///
/// This abstracts away the source of memory data, so typed views can sit
/// on top of anything byte-addressable.
pub trait MemoryLayer: Send + Sync {
    /// Read `length` bytes starting at `offset`.
    fn read(&self, offset: u64, length: usize) -> LayerResult<Vec<u8>>;

    /// Write `data` starting at `offset`.
    fn write(&self, offset: u64, data: &[u8]) -> LayerResult<()>;

    /// Check if the address range `[offset, offset+length)` is valid.
    fn is_valid(&self, offset: u64, length: u64) -> bool;

    /// The name of this layer.
    fn name(&self) -> &str;

    /// Maximum valid address in this layer.
    fn maximum_address(&self) -> u64;
}

/// An in-memory byte-buffer layer.
///
/// # Thread Safety
///
/// Contents are wrapped in `parking_lot::RwLock` for concurrent read
/// access with exclusive write access.
pub struct BufferLayer {
    /// Layer name.
    name: String,
    /// Whether the layer accepts writes.
    writable: bool,
    /// The backing buffer. None if the layer has been destroyed.
    state: Option<Arc<RwLock<Vec<u8>>>>,
}

impl BufferLayer {
    /// Create a layer over the given bytes.
    pub fn new(name: impl Into<String>, data: Vec<u8>, writable: bool) -> Self {
        BufferLayer {
            name: name.into(),
            writable,
            state: Some(Arc::new(RwLock::new(data))),
        }
    }

    /// Create a zero-filled layer of `size` bytes.
    pub fn zeroed(name: impl Into<String>, size: usize, writable: bool) -> Self {
        Self::new(name, vec![0u8; size], writable)
    }

    /// Get the buffer, returning an error if destroyed.
    fn get_state(&self) -> LayerResult<&Arc<RwLock<Vec<u8>>>> {
        self.state
            .as_ref()
            .ok_or_else(|| LayerError::Destroyed(self.name.clone()))
    }

    /// Destroy the layer, releasing its buffer.
    pub fn destroy(&mut self) {
        self.state = None;
    }
}

impl MemoryLayer for BufferLayer {
    fn read(&self, offset: u64, length: usize) -> LayerResult<Vec<u8>> {
        let state = self.get_state()?;
        let data = state.read();
        let size = data.len() as u64;

        if offset > size || (offset == size && length > 0) {
            return Err(LayerError::invalid_address(
                &self.name,
                offset,
                "Offset outside of the buffer boundaries",
            ));
        }

        let start = offset as usize;
        let available = (size - offset) as usize;
        if length > available {
            return Err(LayerError::invalid_address(
                &self.name,
                offset + available as u64,
                "Could not read sufficient bytes from the buffer",
            ));
        }
        Ok(data[start..start + length].to_vec())
    }

    fn write(&self, offset: u64, bytes: &[u8]) -> LayerResult<()> {
        if !self.writable {
            return Err(LayerError::not_writable(&self.name, offset));
        }

        let state = self.get_state()?;
        let mut data = state.write();
        let end = offset
            .checked_add(bytes.len() as u64)
            .filter(|&end| end <= data.len() as u64)
            .ok_or_else(|| {
                LayerError::invalid_address(
                    &self.name,
                    offset,
                    "Write extends beyond the buffer boundaries",
                )
            })?;

        data[offset as usize..end as usize].copy_from_slice(bytes);
        Ok(())
    }

    fn is_valid(&self, offset: u64, length: u64) -> bool {
        if length == 0 {
            return false;
        }
        let state = match self.get_state() {
            Ok(s) => s,
            Err(_) => return false,
        };
        let size = state.read().len() as u64;
        let max_addr = if size > 0 {
            size - 1
        } else {
            return false;
        };
        let end_offset = offset.saturating_add(length).saturating_sub(1);

        offset <= max_addr && end_offset <= max_addr
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn maximum_address(&self) -> u64 {
        match self.get_state() {
            Ok(s) => (s.read().len() as u64).saturating_sub(1),
            Err(_) => 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_in_bounds() {
        let layer = BufferLayer::new("test", b"Hello, World!".to_vec(), false);
        let data = layer.read(0, 5).unwrap();
        assert_eq!(&data, b"Hello");

        let data = layer.read(7, 5).unwrap();
        assert_eq!(&data, b"World");
    }

    #[test]
    fn test_read_out_of_bounds() {
        let layer = BufferLayer::new("test", b"Hello".to_vec(), false);
        assert!(layer.read(100, 3).is_err());
        assert!(layer.read(3, 5).is_err());
    }

    #[test]
    fn test_write_readonly_refused() {
        let layer = BufferLayer::new("test", vec![0u8; 8], false);
        let err = layer.write(0, &[1, 2, 3]).unwrap_err();
        assert!(matches!(err, LayerError::NotWritable { .. }));
    }

    #[test]
    fn test_write_and_read_back() {
        let layer = BufferLayer::new("test", vec![0u8; 8], true);
        layer.write(2, &[0xAA, 0xBB]).unwrap();
        assert_eq!(layer.read(2, 2).unwrap(), vec![0xAA, 0xBB]);
    }

    #[test]
    fn test_write_out_of_bounds() {
        let layer = BufferLayer::new("test", vec![0u8; 4], true);
        assert!(layer.write(3, &[1, 2]).is_err());
    }

    #[test]
    fn test_is_valid() {
        let layer = BufferLayer::new("test", b"0123456789".to_vec(), false);
        assert!(layer.is_valid(0, 1));
        assert!(layer.is_valid(0, 10));
        assert!(layer.is_valid(9, 1));
        assert!(!layer.is_valid(10, 1));
        assert!(!layer.is_valid(0, 11));
        assert!(!layer.is_valid(0, 0));
    }

    #[test]
    fn test_destroy() {
        let mut layer = BufferLayer::new("test", vec![0u8; 4], true);
        assert!(layer.read(0, 4).is_ok());
        layer.destroy();
        let err = layer.read(0, 4).unwrap_err();
        assert!(matches!(err, LayerError::Destroyed(_)));
        assert!(!layer.is_valid(0, 1));
    }

    #[test]
    fn test_maximum_address() {
        let layer = BufferLayer::new("test", vec![0u8; 13], false);
        assert_eq!(layer.maximum_address(), 12);
    }
}

use std::sync::Arc;

/// A contiguous block of bytes loaded from a file or embedded in the document.
///
/// The bytes are immutable once loaded so they can be handed to other threads (eg. for upload)
/// without copying.
#[derive(Debug, Clone, PartialEq)]
pub struct Buffer {
    /// The document key of this buffer
    pub name: String,
    data: Arc<[u8]>,
}

impl Buffer {
    /// Create a new buffer from some bytes
    pub fn new(name: impl Into<String>, data: impl Into<Arc<[u8]>>) -> Self {
        Self {
            name: name.into(),
            data: data.into(),
        }
    }

    /// The raw bytes
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// A shared handle to the raw bytes
    pub fn bytes(&self) -> Arc<[u8]> {
        self.data.clone()
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

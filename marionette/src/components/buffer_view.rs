use std::rc::Rc;

use super::Buffer;
use crate::{ContentError, ContentResult};

/// A window of bytes into a [`Buffer`].
///
/// The window is checked against the buffer once, in [`BufferView::new`], and can't be changed
/// afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct BufferView {
    /// The document key of this view
    pub name: String,
    buffer: Rc<Buffer>,
    byte_offset: usize,
    byte_length: usize,
    /// Hint for how the view will be bound (eg. 34962 for vertex data)
    pub target: Option<u32>,
}

impl BufferView {
    /// Create a new view, checking that the window lies inside `buffer`
    pub fn new(
        name: impl Into<String>,
        buffer: Rc<Buffer>,
        byte_offset: usize,
        byte_length: usize,
        target: Option<u32>,
    ) -> ContentResult<Self> {
        let end = byte_offset.checked_add(byte_length).unwrap_or(usize::MAX);
        if end > buffer.len() {
            return Err(ContentError::ByteRangeError {
                start: byte_offset,
                end,
                len: buffer.len(),
            });
        }

        Ok(Self {
            name: name.into(),
            buffer,
            byte_offset,
            byte_length,
            target,
        })
    }

    /// The buffer this view looks into
    pub fn buffer(&self) -> &Rc<Buffer> {
        &self.buffer
    }

    /// Offset of the window from the start of the buffer
    pub fn byte_offset(&self) -> usize {
        self.byte_offset
    }

    /// Length of the window
    pub fn byte_length(&self) -> usize {
        self.byte_length
    }

    /// The bytes inside this view's window
    pub fn data(&self) -> &[u8] {
        &self.buffer.data()[self.byte_offset..self.byte_offset + self.byte_length]
    }
}

use std::{mem::size_of, rc::Rc};

use bytemuck::Pod;
use glam::{Mat4, Quat, Vec3};

use super::BufferView;
use crate::{util::matrix_from_document, ContentError, ContentResult};

/// The shape of a single accessor element
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AttributeType {
    Scalar,
    Vec2,
    Vec3,
    Vec4,
    Mat2,
    Mat3,
    Mat4,
}

impl AttributeType {
    /// Parse the `type` string used by the document
    pub fn from_document(value: &str) -> Option<Self> {
        Some(match value {
            "SCALAR" => AttributeType::Scalar,
            "VEC2" => AttributeType::Vec2,
            "VEC3" => AttributeType::Vec3,
            "VEC4" => AttributeType::Vec4,
            "MAT2" => AttributeType::Mat2,
            "MAT3" => AttributeType::Mat3,
            "MAT4" => AttributeType::Mat4,
            _ => return None,
        })
    }

    /// Number of components in one element
    pub const fn multiplicity(self) -> usize {
        match self {
            AttributeType::Scalar => 1,
            AttributeType::Vec2 => 2,
            AttributeType::Vec3 => 3,
            AttributeType::Vec4 => 4,
            AttributeType::Mat2 => 4,
            AttributeType::Mat3 => 9,
            AttributeType::Mat4 => 16,
        }
    }
}

/// The type of each component of an accessor element. The discriminants are the GL enum values
/// used in the document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum ComponentType {
    Byte = 5120,
    UnsignedByte = 5121,
    Short = 5122,
    UnsignedShort = 5123,
    UnsignedInt = 5125,
    Float = 5126,
}

impl ComponentType {
    pub fn from_document(value: u32) -> Option<Self> {
        Some(match value {
            5120 => ComponentType::Byte,
            5121 => ComponentType::UnsignedByte,
            5122 => ComponentType::Short,
            5123 => ComponentType::UnsignedShort,
            5125 => ComponentType::UnsignedInt,
            5126 => ComponentType::Float,
            _ => return None,
        })
    }

    /// Size of one component in bytes
    pub const fn byte_width(self) -> usize {
        match self {
            ComponentType::Byte | ComponentType::UnsignedByte => 1,
            ComponentType::Short | ComponentType::UnsignedShort => 2,
            ComponentType::UnsignedInt | ComponentType::Float => 4,
        }
    }
}

/// Size in bytes of a single element with the given shape and component type.
pub const fn element_size(attribute_type: AttributeType, component_type: ComponentType) -> usize {
    attribute_type.multiplicity() * component_type.byte_width()
}

/// A typed, strided view over a [`BufferView`]. Maps closely to the glTF accessor.
#[derive(Debug, Clone, PartialEq)]
pub struct Accessor {
    /// The document key of this accessor
    pub name: String,
    /// The view this accessor reads from
    pub buffer_view: Rc<BufferView>,
    pub attribute_type: AttributeType,
    pub component_type: ComponentType,
    /// Offset of the first element relative to the start of the view
    pub byte_offset: usize,
    /// Distance between the starts of two elements. Zero means tightly packed.
    pub byte_stride: usize,
    /// Number of elements
    pub count: usize,
    pub min: Vec<f32>,
    pub max: Vec<f32>,
}

impl Accessor {
    /// Create an accessor, checking that every element fits inside the view
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        name: impl Into<String>,
        buffer_view: Rc<BufferView>,
        attribute_type: AttributeType,
        component_type: ComponentType,
        byte_offset: usize,
        byte_stride: usize,
        count: usize,
    ) -> ContentResult<Self> {
        let name = name.into();
        let element_size = element_size(attribute_type, component_type);
        if byte_stride != 0 && byte_stride < element_size {
            return Err(ContentError::format(format!(
                "accessor {name} has a stride of {byte_stride} but its elements are {element_size} bytes"
            )));
        }

        let accessor = Self {
            name,
            buffer_view,
            attribute_type,
            component_type,
            byte_offset,
            byte_stride,
            count,
            min: Vec::new(),
            max: Vec::new(),
        };

        // The last element must end inside the view.
        if count > 0 {
            let len = accessor.buffer_view.byte_length();
            let end = accessor
                .element_start(count - 1)
                .and_then(|start| start.checked_add(element_size))
                .unwrap_or(usize::MAX);
            if end > len {
                return Err(ContentError::ByteRangeError {
                    start: byte_offset,
                    end,
                    len,
                });
            }
        }

        Ok(accessor)
    }

    /// Size of one element in bytes
    pub fn element_size(&self) -> usize {
        element_size(self.attribute_type, self.component_type)
    }

    /// The stride actually used to step between elements
    pub fn effective_stride(&self) -> usize {
        if self.byte_stride != 0 {
            self.byte_stride
        } else {
            self.element_size()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Copy out element `index` as a `T`.
    ///
    /// Exactly `size_of::<T>()` bytes are copied from the element's start, so `T` should usually
    /// be the same size as [`Accessor::element_size`].
    pub fn get_element<T: Pod>(&self, index: usize) -> ContentResult<T> {
        if index >= self.count {
            return Err(ContentError::RangeError {
                index,
                count: self.count,
            });
        }

        let start = self.element_start(index).unwrap_or(usize::MAX);
        let bytes = self.window(start, size_of::<T>())?;
        Ok(bytemuck::pod_read_unaligned(bytes))
    }

    /// Borrow the raw bytes covering elements `offset..offset + count` without copying.
    ///
    /// With a non-zero stride the slice includes the padding between elements.
    pub fn get_data(&self, offset: usize, count: usize) -> ContentResult<&[u8]> {
        if count == 0 {
            return Ok(&[]);
        }
        let last = offset.saturating_add(count - 1);
        if last >= self.count {
            return Err(ContentError::RangeError {
                index: last,
                count: self.count,
            });
        }

        let start = self.element_start(offset).unwrap_or(usize::MAX);
        let len = (count - 1)
            .checked_mul(self.effective_stride())
            .and_then(|l| l.checked_add(self.element_size()))
            .unwrap_or(usize::MAX);
        self.window(start, len)
    }

    /// Copy out every element
    pub fn read_all<T: Pod>(&self) -> ContentResult<Vec<T>> {
        (0..self.count).map(|i| self.get_element(i)).collect()
    }

    /// Read a `SCALAR` / `FLOAT` accessor
    pub fn read_f32s(&self) -> ContentResult<Vec<f32>> {
        self.expect_layout(AttributeType::Scalar, ComponentType::Float)?;
        self.read_all()
    }

    /// Read a `VEC3` / `FLOAT` accessor
    pub fn read_vec3s(&self) -> ContentResult<Vec<Vec3>> {
        self.expect_layout(AttributeType::Vec3, ComponentType::Float)?;
        Ok(self
            .read_all::<[f32; 3]>()?
            .into_iter()
            .map(Vec3::from)
            .collect())
    }

    /// Read a `VEC4` / `FLOAT` accessor as `[x, y, z, w]` quaternions
    pub fn read_quats(&self) -> ContentResult<Vec<Quat>> {
        self.expect_layout(AttributeType::Vec4, ComponentType::Float)?;
        Ok(self
            .read_all::<[f32; 4]>()?
            .into_iter()
            .map(|[x, y, z, w]| Quat::from_xyzw(x, y, z, w).normalize())
            .collect())
    }

    /// Read a `MAT4` / `FLOAT` accessor, converting each matrix into row-vector form
    pub fn read_matrices(&self) -> ContentResult<Vec<Mat4>> {
        self.expect_layout(AttributeType::Mat4, ComponentType::Float)?;
        Ok(self
            .read_all::<[f32; 16]>()?
            .iter()
            .map(matrix_from_document)
            .collect())
    }

    fn expect_layout(
        &self,
        attribute_type: AttributeType,
        component_type: ComponentType,
    ) -> ContentResult<()> {
        if self.attribute_type != attribute_type || self.component_type != component_type {
            return Err(ContentError::format(format!(
                "accessor {} is {:?}/{:?}, expected {:?}/{:?}",
                self.name, self.attribute_type, self.component_type, attribute_type, component_type
            )));
        }
        Ok(())
    }

    /// Byte offset of element `index` within the view, or `None` if it overflows
    fn element_start(&self, index: usize) -> Option<usize> {
        index
            .checked_mul(self.effective_stride())?
            .checked_add(self.byte_offset)
    }

    fn window(&self, start: usize, len: usize) -> ContentResult<&[u8]> {
        let data = self.buffer_view.data();
        let end = start.saturating_add(len);
        data.get(start..end).ok_or(ContentError::ByteRangeError {
            start,
            end,
            len: data.len(),
        })
    }
}

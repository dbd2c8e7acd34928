use std::{cell::RefCell, collections::BTreeMap, rc::Rc};

use super::{Accessor, Material, SkeletonRef};

/// How the vertices of a primitive are assembled. The discriminants match the document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(u32)]
pub enum PrimitiveMode {
    Points = 0,
    Lines = 1,
    LineLoop = 2,
    LineStrip = 3,
    #[default]
    Triangles = 4,
    TriangleStrip = 5,
    TriangleFan = 6,
}

impl PrimitiveMode {
    pub fn from_document(value: u32) -> Option<Self> {
        Some(match value {
            0 => PrimitiveMode::Points,
            1 => PrimitiveMode::Lines,
            2 => PrimitiveMode::LineLoop,
            3 => PrimitiveMode::LineStrip,
            4 => PrimitiveMode::Triangles,
            5 => PrimitiveMode::TriangleStrip,
            6 => PrimitiveMode::TriangleFan,
            _ => return None,
        })
    }
}

/// A piece of geometry drawn with a single material
#[derive(Debug, Clone)]
pub struct Primitive {
    /// Vertex attributes keyed by semantic, eg. `POSITION`, `JOINT`, `WEIGHT`
    pub attributes: BTreeMap<String, Rc<Accessor>>,
    pub indices: Option<Rc<Accessor>>,
    pub material: Option<Rc<Material>>,
    pub mode: PrimitiveMode,
}

impl Primitive {
    /// Number of vertices, taken from the `POSITION` attribute
    pub fn vertex_count(&self) -> usize {
        self.attributes
            .get("POSITION")
            .map(|a| a.count)
            .unwrap_or_default()
    }

    /// Skinned primitives carry per-vertex joint indices and weights
    pub fn is_skinned(&self) -> bool {
        self.attributes.contains_key("JOINT") && self.attributes.contains_key("WEIGHT")
    }
}

/// Wrapper that encapsulates geometry. Maps closely to the glTF mesh.
#[derive(Debug)]
pub struct Mesh {
    pub name: String,
    /// The primitives in this mesh (eg. actual geometry)
    pub primitives: Vec<Primitive>,
    skeleton: RefCell<Option<SkeletonRef>>,
}

impl Mesh {
    pub fn new(name: impl Into<String>, primitives: Vec<Primitive>) -> Self {
        Self {
            name: name.into(),
            primitives,
            skeleton: Default::default(),
        }
    }

    /// The skeleton whose skin palette deforms this mesh, if any
    pub fn skeleton(&self) -> Option<SkeletonRef> {
        self.skeleton.borrow().clone()
    }

    /// Set the skeleton deforming this mesh, returning the one it replaced
    pub(crate) fn bind_skeleton(&self, skeleton: SkeletonRef) -> Option<SkeletonRef> {
        self.skeleton.replace(Some(skeleton))
    }
}

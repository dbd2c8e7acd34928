use std::{fmt, rc::Rc};

use serde_json::Value;

use super::{readers, ContentReader};
use crate::{
    components::{
        Accessor, Animation, Buffer, BufferView, Image, Material, Mesh, Node, NodeRef, Program,
        Shader, Skeleton, SkeletonRef, Technique, Texture,
    },
    ContentError, ContentResult,
};

/// Every kind of object the content reader knows how to resolve
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ContentType {
    Buffer,
    BufferView,
    Accessor,
    Node,
    Skeleton,
    Animation,
    Mesh,
    Material,
    Technique,
    Program,
    Shader,
    Texture,
    Image,
}

impl ContentType {
    /// The document section entries of this type live in
    pub const fn section(self) -> &'static str {
        match self {
            ContentType::Buffer => "buffers",
            ContentType::BufferView => "bufferViews",
            ContentType::Accessor => "accessors",
            ContentType::Node => "nodes",
            ContentType::Skeleton => "skins",
            ContentType::Animation => "animations",
            ContentType::Mesh => "meshes",
            ContentType::Material => "materials",
            ContentType::Technique => "techniques",
            ContentType::Program => "programs",
            ContentType::Shader => "shaders",
            ContentType::Texture => "textures",
            ContentType::Image => "images",
        }
    }

    /// The logical name the type's reader is registered under
    pub const fn type_name(self) -> &'static str {
        match self {
            ContentType::Buffer => "Buffer",
            ContentType::BufferView => "BufferView",
            ContentType::Accessor => "Accessor",
            ContentType::Node => "Node",
            ContentType::Skeleton => "Skeleton",
            ContentType::Animation => "Animation",
            ContentType::Mesh => "Mesh",
            ContentType::Material => "Material",
            ContentType::Technique => "Technique",
            ContentType::Program => "Program",
            ContentType::Shader => "Shader",
            ContentType::Texture => "Texture",
            ContentType::Image => "Image",
        }
    }

    pub fn from_type_name(type_name: &str) -> Option<Self> {
        READERS
            .iter()
            .find(|r| r.content_type.type_name() == type_name)
            .map(|r| r.content_type)
    }
}

/// A resolved object of any type
#[derive(Debug, Clone)]
pub enum Content {
    Buffer(Rc<Buffer>),
    BufferView(Rc<BufferView>),
    Accessor(Rc<Accessor>),
    Node(NodeRef),
    Skeleton(SkeletonRef),
    Animation(Rc<Animation>),
    Mesh(Rc<Mesh>),
    Material(Rc<Material>),
    Technique(Rc<Technique>),
    Program(Rc<Program>),
    Shader(Rc<Shader>),
    Texture(Rc<Texture>),
    Image(Rc<Image>),
}

impl Content {
    pub fn content_type(&self) -> ContentType {
        match self {
            Content::Buffer(_) => ContentType::Buffer,
            Content::BufferView(_) => ContentType::BufferView,
            Content::Accessor(_) => ContentType::Accessor,
            Content::Node(_) => ContentType::Node,
            Content::Skeleton(_) => ContentType::Skeleton,
            Content::Animation(_) => ContentType::Animation,
            Content::Mesh(_) => ContentType::Mesh,
            Content::Material(_) => ContentType::Material,
            Content::Technique(_) => ContentType::Technique,
            Content::Program(_) => ContentType::Program,
            Content::Shader(_) => ContentType::Shader,
            Content::Texture(_) => ContentType::Texture,
            Content::Image(_) => ContentType::Image,
        }
    }

    /// Do both values refer to the same underlying object?
    pub fn ptr_eq(&self, other: &Content) -> bool {
        match (self, other) {
            (Content::Buffer(a), Content::Buffer(b)) => Rc::ptr_eq(a, b),
            (Content::BufferView(a), Content::BufferView(b)) => Rc::ptr_eq(a, b),
            (Content::Accessor(a), Content::Accessor(b)) => Rc::ptr_eq(a, b),
            (Content::Node(a), Content::Node(b)) => Rc::ptr_eq(a, b),
            (Content::Skeleton(a), Content::Skeleton(b)) => Rc::ptr_eq(a, b),
            (Content::Animation(a), Content::Animation(b)) => Rc::ptr_eq(a, b),
            (Content::Mesh(a), Content::Mesh(b)) => Rc::ptr_eq(a, b),
            (Content::Material(a), Content::Material(b)) => Rc::ptr_eq(a, b),
            (Content::Technique(a), Content::Technique(b)) => Rc::ptr_eq(a, b),
            (Content::Program(a), Content::Program(b)) => Rc::ptr_eq(a, b),
            (Content::Shader(a), Content::Shader(b)) => Rc::ptr_eq(a, b),
            (Content::Texture(a), Content::Texture(b)) => Rc::ptr_eq(a, b),
            (Content::Image(a), Content::Image(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }
}

/// Reads one document entry into one object.
///
/// Called with the reader (so the entry's references can be resolved), the entry's key and the
/// entry itself.
pub type ReadFn = fn(&mut ContentReader, &str, &Value) -> ContentResult<Content>;

/// A registered reader
#[derive(Clone, Copy)]
pub struct TypeReader {
    pub content_type: ContentType,
    pub read: ReadFn,
}

impl fmt::Debug for TypeReader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeReader")
            .field("content_type", &self.content_type)
            .finish_non_exhaustive()
    }
}

/// Exactly one reader per content type.
pub static READERS: [TypeReader; 13] = [
    TypeReader {
        content_type: ContentType::Buffer,
        read: readers::buffer::read_buffer,
    },
    TypeReader {
        content_type: ContentType::BufferView,
        read: readers::buffer::read_buffer_view,
    },
    TypeReader {
        content_type: ContentType::Accessor,
        read: readers::buffer::read_accessor,
    },
    TypeReader {
        content_type: ContentType::Node,
        read: readers::node::read_node,
    },
    TypeReader {
        content_type: ContentType::Skeleton,
        read: readers::skin::read_skin,
    },
    TypeReader {
        content_type: ContentType::Animation,
        read: readers::animation::read_animation,
    },
    TypeReader {
        content_type: ContentType::Mesh,
        read: readers::mesh::read_mesh,
    },
    TypeReader {
        content_type: ContentType::Material,
        read: readers::material::read_material,
    },
    TypeReader {
        content_type: ContentType::Technique,
        read: readers::material::read_technique,
    },
    TypeReader {
        content_type: ContentType::Program,
        read: readers::material::read_program,
    },
    TypeReader {
        content_type: ContentType::Shader,
        read: readers::material::read_shader,
    },
    TypeReader {
        content_type: ContentType::Texture,
        read: readers::texture::read_texture,
    },
    TypeReader {
        content_type: ContentType::Image,
        read: readers::texture::read_image,
    },
];

/// Look up the reader registered under `type_name`
pub fn reader_for(type_name: &str) -> ContentResult<TypeReader> {
    READERS
        .iter()
        .find(|r| r.content_type.type_name() == type_name)
        .copied()
        .ok_or_else(|| ContentError::format(format!("no reader is registered for {type_name}")))
}

/// Types that can be resolved with [`ContentReader::read_object`].
pub trait Resolvable {
    /// What callers get back, eg. `Rc<Accessor>`
    type Handle: Clone;
    const CONTENT_TYPE: ContentType;

    fn into_handle(content: Content) -> Option<Self::Handle>;
    fn into_content(handle: Self::Handle) -> Content;
}

macro_rules! resolvable {
    ($ty:ident, $handle:ty) => {
        impl Resolvable for $ty {
            type Handle = $handle;
            const CONTENT_TYPE: ContentType = ContentType::$ty;

            fn into_handle(content: Content) -> Option<Self::Handle> {
                match content {
                    Content::$ty(handle) => Some(handle),
                    _ => None,
                }
            }

            fn into_content(handle: Self::Handle) -> Content {
                Content::$ty(handle)
            }
        }
    };
}

resolvable!(Buffer, Rc<Buffer>);
resolvable!(BufferView, Rc<BufferView>);
resolvable!(Accessor, Rc<Accessor>);
resolvable!(Node, NodeRef);
resolvable!(Skeleton, SkeletonRef);
resolvable!(Animation, Rc<Animation>);
resolvable!(Mesh, Rc<Mesh>);
resolvable!(Material, Rc<Material>);
resolvable!(Technique, Rc<Technique>);
resolvable!(Program, Rc<Program>);
resolvable!(Shader, Rc<Shader>);
resolvable!(Texture, Rc<Texture>);
resolvable!(Image, Rc<Image>);

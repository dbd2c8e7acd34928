//! One reader function per content type. Each takes the entry's key and raw JSON, resolves any
//! references through the [`super::ContentReader`], and returns the finished object.

pub mod animation;
pub mod buffer;
pub mod material;
pub mod mesh;
pub mod node;
pub mod skin;
pub mod texture;

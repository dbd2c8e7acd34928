//! G'day, and welcome to Marionette! 👋
//!
//! Marionette loads skinned scene documents (the JSON flavour of glTF 1.0, with external or
//! embedded binary buffers) into a graph of shared objects, then plays their animations back on
//! a skeleton, producing a skin palette ready to hand to a vertex shader.
//!
//! # Getting started
//! ```no_run
//! use marionette::ContentManager;
//!
//! let mut content = ContentManager::builder().root_directory("assets").build();
//! let model = content.load("arm").unwrap();
//! model.update(1.0 / 72.0);
//! let skeleton = model.skeletons[0].borrow();
//! let palette = &skeleton.skin_transforms;
//! ```
//!
//! Matrices use the row-vector convention throughout: a point is transformed as `p * M`, and a
//! bone's world transform is `local * parent_world`.

/// Little-endian reading of files and byte slices
pub mod binary_reader;
/// Components are the objects a document is loaded into
pub mod components;
/// Reading documents: the content reader, its type registry and the content manager
pub mod content;
mod content_error;
mod model;
/// Systems are functions called each frame to update a skeleton
pub mod systems;
/// Kitchen sink utility functions
pub mod util;

pub use content::{ContentConfig, ContentManager, ContentReader};
pub use content_error::ContentError;
pub use model::Model;

/// Marionette result type
pub type ContentResult<T> = std::result::Result<T, ContentError>;

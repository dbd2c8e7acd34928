use std::{cell::RefCell, rc::Rc};

use glam::Mat4;
use log::debug;
use serde::Deserialize;
use serde_json::Value;

use crate::{
    components::{Accessor, Skeleton},
    content::{document::from_entry, Content, ContentReader},
    util::matrix_from_document,
    ContentError, ContentResult,
};

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SkinEntry {
    name: Option<String>,
    bind_shape_matrix: Option<[f32; 16]>,
    inverse_bind_matrices: Option<String>,
    #[serde(default)]
    joint_names: Vec<String>,
}

/// Build a [`Skeleton`] from the joints a skin names. Every joint must already have been read.
pub fn read_skin(reader: &mut ContentReader, key: &str, entry: &Value) -> ContentResult<Content> {
    let entry: SkinEntry = from_entry(key, entry)?;

    let bind_shape_matrix = entry
        .bind_shape_matrix
        .as_ref()
        .map(matrix_from_document)
        .unwrap_or(Mat4::IDENTITY);

    let inverse_bind_matrices = match &entry.inverse_bind_matrices {
        Some(accessor) => reader.read_object::<Accessor>(accessor)?.read_matrices()?,
        None => vec![Mat4::IDENTITY; entry.joint_names.len()],
    };

    let bones = entry
        .joint_names
        .iter()
        .map(|joint_name| {
            reader.find_joint(joint_name).ok_or_else(|| {
                ContentError::format(format!(
                    "skin {key} uses joint {joint_name}, but no node has that joint name"
                ))
            })
        })
        .collect::<ContentResult<Vec<_>>>()?;

    let skeleton = Skeleton::new(
        entry.name.unwrap_or_else(|| key.to_string()),
        bind_shape_matrix,
        inverse_bind_matrices,
        bones,
    )?;
    debug!(
        "[MARIONETTE_CONTENT] Skin {key} has {} bones",
        skeleton.len()
    );

    Ok(Content::Skeleton(Rc::new(RefCell::new(skeleton))))
}

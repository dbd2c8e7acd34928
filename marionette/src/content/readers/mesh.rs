use std::{collections::BTreeMap, rc::Rc};

use serde::Deserialize;
use serde_json::Value;

use crate::{
    components::{Accessor, Material, Mesh, Primitive, PrimitiveMode},
    content::{document::from_entry, Content, ContentReader},
    ContentError, ContentResult,
};

#[derive(Deserialize)]
struct MeshEntry {
    name: Option<String>,
    #[serde(default)]
    primitives: Vec<PrimitiveEntry>,
}

#[derive(Deserialize)]
struct PrimitiveEntry {
    #[serde(default)]
    attributes: BTreeMap<String, String>,
    indices: Option<String>,
    material: Option<String>,
    mode: Option<u32>,
}

pub fn read_mesh(reader: &mut ContentReader, key: &str, entry: &Value) -> ContentResult<Content> {
    let entry: MeshEntry = from_entry(key, entry)?;
    let primitives = entry
        .primitives
        .iter()
        .map(|p| read_primitive(reader, key, p))
        .collect::<ContentResult<Vec<_>>>()?;

    let name = entry.name.unwrap_or_else(|| key.to_string());
    Ok(Content::Mesh(Rc::new(Mesh::new(name, primitives))))
}

fn read_primitive(
    reader: &mut ContentReader,
    key: &str,
    entry: &PrimitiveEntry,
) -> ContentResult<Primitive> {
    let mode = match entry.mode {
        Some(mode) => PrimitiveMode::from_document(mode).ok_or_else(|| {
            ContentError::format(format!("mesh {key} has a primitive with unknown mode {mode}"))
        })?,
        None => PrimitiveMode::default(),
    };

    let attributes = entry
        .attributes
        .iter()
        .map(|(semantic, accessor)| {
            reader
                .read_object::<Accessor>(accessor)
                .map(|a| (semantic.clone(), a))
        })
        .collect::<ContentResult<BTreeMap<_, _>>>()?;

    let indices = entry
        .indices
        .as_deref()
        .map(|i| reader.read_object::<Accessor>(i))
        .transpose()?;
    let material = entry
        .material
        .as_deref()
        .map(|m| reader.read_object::<Material>(m))
        .transpose()?;

    Ok(Primitive {
        attributes,
        indices,
        material,
        mode,
    })
}

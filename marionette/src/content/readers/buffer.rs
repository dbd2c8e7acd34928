use std::rc::Rc;

use log::debug;
use serde::Deserialize;
use serde_json::Value;

use crate::{
    components::{Accessor, AttributeType, Buffer, BufferView, ComponentType},
    content::{document::from_entry, Content, ContentReader},
    ContentError, ContentResult,
};

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct BufferEntry {
    uri: String,
    byte_length: Option<usize>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct BufferViewEntry {
    buffer: String,
    #[serde(default)]
    byte_offset: usize,
    byte_length: Option<usize>,
    target: Option<u32>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct AccessorEntry {
    buffer_view: String,
    #[serde(default)]
    byte_offset: usize,
    #[serde(default)]
    byte_stride: usize,
    component_type: u32,
    count: usize,
    #[serde(rename = "type")]
    attribute_type: String,
    #[serde(default)]
    min: Vec<f32>,
    #[serde(default)]
    max: Vec<f32>,
}

pub fn read_buffer(reader: &mut ContentReader, key: &str, entry: &Value) -> ContentResult<Content> {
    let entry: BufferEntry = from_entry(key, entry)?;
    let mut data = reader.read_external_reference(&entry.uri)?;

    if let Some(byte_length) = entry.byte_length {
        if byte_length > data.len() {
            return Err(ContentError::format(format!(
                "buffer {key} declares {byte_length} bytes but {} only has {}",
                entry.uri,
                data.len()
            )));
        }
        data.truncate(byte_length);
    }

    debug!("[MARIONETTE_CONTENT] Buffer {key} is {} bytes", data.len());
    Ok(Content::Buffer(Rc::new(Buffer::new(key, data))))
}

pub fn read_buffer_view(
    reader: &mut ContentReader,
    key: &str,
    entry: &Value,
) -> ContentResult<Content> {
    let entry: BufferViewEntry = from_entry(key, entry)?;
    let buffer = reader.read_object::<Buffer>(&entry.buffer)?;
    let byte_length = entry
        .byte_length
        .unwrap_or_else(|| buffer.len().saturating_sub(entry.byte_offset));

    let view = BufferView::new(key, buffer, entry.byte_offset, byte_length, entry.target)?;
    Ok(Content::BufferView(Rc::new(view)))
}

pub fn read_accessor(
    reader: &mut ContentReader,
    key: &str,
    entry: &Value,
) -> ContentResult<Content> {
    let entry: AccessorEntry = from_entry(key, entry)?;
    let attribute_type = AttributeType::from_document(&entry.attribute_type).ok_or_else(|| {
        ContentError::format(format!(
            "accessor {key} has unknown type {}",
            entry.attribute_type
        ))
    })?;
    let component_type = ComponentType::from_document(entry.component_type).ok_or_else(|| {
        ContentError::format(format!(
            "accessor {key} has unknown component type {}",
            entry.component_type
        ))
    })?;

    let buffer_view = reader.read_object::<BufferView>(&entry.buffer_view)?;
    let mut accessor = Accessor::new(
        key,
        buffer_view,
        attribute_type,
        component_type,
        entry.byte_offset,
        entry.byte_stride,
        entry.count,
    )?;
    accessor.min = entry.min;
    accessor.max = entry.max;

    Ok(Content::Accessor(Rc::new(accessor)))
}

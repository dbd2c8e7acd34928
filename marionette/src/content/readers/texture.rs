use std::rc::Rc;

use log::debug;
use serde::Deserialize;
use serde_json::Value;

use crate::{
    components::{Image, Sampler, Texture},
    content::{document::from_entry, Content, ContentReader},
    ContentError, ContentResult,
};

#[derive(Deserialize)]
struct ImageEntry {
    name: Option<String>,
    uri: String,
}

#[derive(Deserialize)]
struct TextureEntry {
    name: Option<String>,
    source: String,
    sampler: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SamplerEntry {
    mag_filter: Option<u32>,
    min_filter: Option<u32>,
    wrap_s: Option<u32>,
    wrap_t: Option<u32>,
}

impl From<SamplerEntry> for Sampler {
    fn from(entry: SamplerEntry) -> Self {
        let default = Sampler::default();
        Sampler {
            mag_filter: entry.mag_filter.unwrap_or(default.mag_filter),
            min_filter: entry.min_filter.unwrap_or(default.min_filter),
            wrap_s: entry.wrap_s.unwrap_or(default.wrap_s),
            wrap_t: entry.wrap_t.unwrap_or(default.wrap_t),
        }
    }
}

pub fn read_image(reader: &mut ContentReader, key: &str, entry: &Value) -> ContentResult<Content> {
    let entry: ImageEntry = from_entry(key, entry)?;
    let data = reader.read_external_reference(&entry.uri)?;

    Ok(Content::Image(Rc::new(Image {
        name: entry.name.unwrap_or_else(|| key.to_string()),
        uri: entry.uri,
        data,
    })))
}

/// Decode a texture's image into RGBA8 pixels.
pub fn read_texture(
    reader: &mut ContentReader,
    key: &str,
    entry: &Value,
) -> ContentResult<Content> {
    let entry: TextureEntry = from_entry(key, entry)?;

    // Samplers aren't cached. They're read straight from their section.
    let sampler: Sampler = match &entry.sampler {
        Some(sampler) => {
            let sampler_entry = reader
                .document()
                .section("samplers")
                .get(sampler)
                .ok_or_else(|| {
                    ContentError::format(format!("texture {key} uses missing sampler {sampler}"))
                })?;
            from_entry::<SamplerEntry>(sampler, sampler_entry)?.into()
        }
        None => Sampler::default(),
    };

    let image = reader.read_object::<Image>(&entry.source)?;
    let decoded = image::load_from_memory(&image.data)
        .map_err(|e| ContentError::format(format!("image {} can't be decoded: {e}", image.uri)))?
        .to_rgba8();
    let (width, height) = decoded.dimensions();
    debug!("[MARIONETTE_CONTENT] Texture {key} is {width}x{height}");

    Ok(Content::Texture(Rc::new(Texture {
        name: entry.name.unwrap_or_else(|| key.to_string()),
        image,
        sampler,
        width,
        height,
        pixels: decoded.into_raw(),
    })))
}

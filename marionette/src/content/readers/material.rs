use std::{collections::BTreeMap, rc::Rc};

use log::debug;
use serde::Deserialize;
use serde_json::Value;

use crate::{
    components::{
        Material, MaterialValue, Program, Shader, ShaderStage, Technique, TechniqueParameter,
        Texture,
    },
    content::{document::from_entry, Content, ContentReader},
    ContentError, ContentResult,
};

#[derive(Deserialize)]
struct MaterialEntry {
    name: Option<String>,
    technique: Option<String>,
    #[serde(default)]
    values: BTreeMap<String, Value>,
}

#[derive(Deserialize)]
struct TechniqueEntry {
    name: Option<String>,
    program: String,
    #[serde(default)]
    parameters: BTreeMap<String, ParameterEntry>,
    #[serde(default)]
    attributes: BTreeMap<String, String>,
    #[serde(default)]
    uniforms: BTreeMap<String, String>,
}

#[derive(Deserialize)]
struct ParameterEntry {
    #[serde(rename = "type")]
    kind: u32,
    semantic: Option<String>,
    node: Option<String>,
    count: Option<usize>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ProgramEntry {
    name: Option<String>,
    vertex_shader: String,
    fragment_shader: String,
    #[serde(default)]
    attributes: Vec<String>,
}

#[derive(Deserialize)]
struct ShaderEntry {
    name: Option<String>,
    uri: String,
    #[serde(rename = "type")]
    stage: u32,
}

pub fn read_material(
    reader: &mut ContentReader,
    key: &str,
    entry: &Value,
) -> ContentResult<Content> {
    let entry: MaterialEntry = from_entry(key, entry)?;
    let technique = entry
        .technique
        .as_deref()
        .map(|t| reader.read_object::<Technique>(t))
        .transpose()?;

    let values = entry
        .values
        .iter()
        .map(|(name, value)| {
            material_value(reader, key, name, value).map(|v| (name.clone(), v))
        })
        .collect::<ContentResult<BTreeMap<_, _>>>()?;

    Ok(Content::Material(Rc::new(Material {
        name: entry.name.unwrap_or_else(|| key.to_string()),
        technique,
        values,
    })))
}

/// Strings name textures; everything else is stored as is.
fn material_value(
    reader: &mut ContentReader,
    key: &str,
    name: &str,
    value: &Value,
) -> ContentResult<MaterialValue> {
    let invalid = || ContentError::format(format!("material {key} has an invalid value for {name}"));
    match value {
        Value::Number(n) => n.as_f64().map(|n| MaterialValue::Number(n as f32)).ok_or_else(invalid),
        Value::Bool(b) => Ok(MaterialValue::Bool(*b)),
        Value::String(texture) => Ok(MaterialValue::Texture(
            reader.read_object::<Texture>(texture)?,
        )),
        Value::Array(values) => values
            .iter()
            .map(|v| v.as_f64().map(|v| v as f32).ok_or_else(invalid))
            .collect::<ContentResult<Vec<_>>>()
            .map(MaterialValue::Vector),
        Value::Null | Value::Object(_) => Err(invalid()),
    }
}

pub fn read_technique(
    reader: &mut ContentReader,
    key: &str,
    entry: &Value,
) -> ContentResult<Content> {
    let entry: TechniqueEntry = from_entry(key, entry)?;

    for (variable, parameter) in entry.attributes.iter().chain(entry.uniforms.iter()) {
        if !entry.parameters.contains_key(parameter) {
            return Err(ContentError::format(format!(
                "technique {key} binds {variable} to missing parameter {parameter}"
            )));
        }
    }

    let program = reader.read_object::<Program>(&entry.program)?;
    let parameters = entry
        .parameters
        .into_iter()
        .map(|(name, p)| {
            (
                name,
                TechniqueParameter {
                    kind: p.kind,
                    semantic: p.semantic,
                    node: p.node,
                    count: p.count,
                },
            )
        })
        .collect();

    Ok(Content::Technique(Rc::new(Technique {
        name: entry.name.unwrap_or_else(|| key.to_string()),
        program,
        parameters,
        attributes: entry.attributes,
        uniforms: entry.uniforms,
    })))
}

pub fn read_program(
    reader: &mut ContentReader,
    key: &str,
    entry: &Value,
) -> ContentResult<Content> {
    let entry: ProgramEntry = from_entry(key, entry)?;
    let vertex_shader = reader.read_object::<Shader>(&entry.vertex_shader)?;
    let fragment_shader = reader.read_object::<Shader>(&entry.fragment_shader)?;

    if vertex_shader.stage != ShaderStage::Vertex || fragment_shader.stage != ShaderStage::Fragment
    {
        return Err(ContentError::format(format!(
            "program {key} has its shader stages mixed up"
        )));
    }

    Ok(Content::Program(Rc::new(Program {
        name: entry.name.unwrap_or_else(|| key.to_string()),
        vertex_shader,
        fragment_shader,
        attributes: entry.attributes,
    })))
}

pub fn read_shader(reader: &mut ContentReader, key: &str, entry: &Value) -> ContentResult<Content> {
    let entry: ShaderEntry = from_entry(key, entry)?;
    let stage = ShaderStage::from_document(entry.stage).ok_or_else(|| {
        ContentError::format(format!("shader {key} has unknown type {}", entry.stage))
    })?;

    let bytes = reader.read_external_reference(&entry.uri)?;
    let source = String::from_utf8(bytes)
        .map_err(|_| ContentError::format(format!("shader {} is not valid UTF-8", entry.uri)))?;
    debug!("[MARIONETTE_CONTENT] Read {stage:?} shader {key}");

    Ok(Content::Shader(Rc::new(Shader {
        name: entry.name.unwrap_or_else(|| key.to_string()),
        stage,
        source,
    })))
}

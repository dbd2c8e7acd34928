use std::{collections::BTreeMap, rc::Rc};

use serde::Deserialize;
use serde_json::Value;

use crate::{
    components::{
        Accessor, Animation, AnimationChannel, AnimationPath, ChannelValues, Interpolation,
    },
    content::{document::from_entry, Content, ContentReader, ContentType},
    ContentError, ContentResult,
};

#[derive(Deserialize)]
struct AnimationEntry {
    name: Option<String>,
    #[serde(default)]
    channels: Vec<ChannelEntry>,
    /// Parameter name -> accessor key
    #[serde(default)]
    parameters: BTreeMap<String, String>,
    #[serde(default)]
    samplers: BTreeMap<String, SamplerEntry>,
}

#[derive(Deserialize)]
struct ChannelEntry {
    sampler: String,
    target: TargetEntry,
}

#[derive(Deserialize)]
struct TargetEntry {
    id: String,
    path: String,
}

#[derive(Deserialize)]
struct SamplerEntry {
    input: String,
    output: String,
    interpolation: Option<String>,
}

pub fn read_animation(
    reader: &mut ContentReader,
    key: &str,
    entry: &Value,
) -> ContentResult<Content> {
    let entry: AnimationEntry = from_entry(key, entry)?;
    let channels = entry
        .channels
        .iter()
        .map(|channel| read_channel(reader, key, &entry, channel))
        .collect::<ContentResult<Vec<_>>>()?;

    Ok(Content::Animation(Rc::new(Animation {
        name: entry.name.clone().unwrap_or_else(|| key.to_string()),
        channels,
    })))
}

fn read_channel(
    reader: &mut ContentReader,
    key: &str,
    animation: &AnimationEntry,
    channel: &ChannelEntry,
) -> ContentResult<AnimationChannel> {
    let target = &channel.target;
    reader.document().entry(ContentType::Node, &target.id)?;

    let path = AnimationPath::from_document(&target.path).ok_or_else(|| {
        ContentError::format(format!(
            "animation {key} targets unknown path {}",
            target.path
        ))
    })?;

    let sampler = animation.samplers.get(&channel.sampler).ok_or_else(|| {
        ContentError::format(format!(
            "animation {key} has no sampler {}",
            channel.sampler
        ))
    })?;
    let interpolation = match sampler.interpolation.as_deref() {
        None | Some("LINEAR") => Interpolation::Linear,
        Some("STEP") => Interpolation::Step,
        Some(other) => {
            return Err(ContentError::format(format!(
                "animation {key} uses unsupported interpolation {other}"
            )))
        }
    };

    let input = parameter_accessor(reader, key, animation, &sampler.input)?;
    let output = parameter_accessor(reader, key, animation, &sampler.output)?;

    let times = input.read_f32s()?;
    let values = match path {
        AnimationPath::Translation => ChannelValues::Translations(output.read_vec3s()?),
        AnimationPath::Rotation => ChannelValues::Rotations(output.read_quats()?),
        AnimationPath::Scale => ChannelValues::Scales(output.read_vec3s()?),
    };

    if times.is_empty() || times.len() != values.len() {
        return Err(ContentError::format(format!(
            "animation {key} has {} times but {} values for {}",
            times.len(),
            values.len(),
            target.id
        )));
    }
    if times.windows(2).any(|w| w[1] < w[0]) {
        return Err(ContentError::format(format!(
            "animation {key} has times that go backwards for {}",
            target.id
        )));
    }

    Ok(AnimationChannel {
        target_node: target.id.clone(),
        interpolation,
        times,
        values,
    })
}

fn parameter_accessor(
    reader: &mut ContentReader,
    key: &str,
    animation: &AnimationEntry,
    parameter: &str,
) -> ContentResult<Rc<Accessor>> {
    let accessor = animation.parameters.get(parameter).ok_or_else(|| {
        ContentError::format(format!("animation {key} has no parameter {parameter}"))
    })?;
    reader.read_object::<Accessor>(accessor)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::{fixtures::skinned_arm, Document};
    use serde_json::json;

    fn read(value: Value) -> ContentResult<Rc<Animation>> {
        let mut reader = ContentReader::new("arm", Document::from_value(value).unwrap(), ".", ".");
        reader.read_object::<Animation>("bend")
    }

    #[test]
    pub fn test_read_animation() {
        let animation = read(skinned_arm()).unwrap();
        assert_eq!(animation.channels.len(), 1);

        let channel = &animation.channels[0];
        assert_eq!(channel.target_node, "knee");
        assert_eq!(channel.path(), AnimationPath::Rotation);
        assert_eq!(channel.times, vec![0.0, 0.5, 1.0]);
        assert_eq!(animation.duration(), 1.0);
    }

    #[test]
    pub fn test_bad_channels() {
        let mut value = skinned_arm();
        value["animations"]["bend"]["channels"][0]["target"]["path"] = json!("weights");
        assert!(read(value).unwrap_err().is_format_error());

        let mut value = skinned_arm();
        value["animations"]["bend"]["channels"][0]["target"]["id"] = json!("elbow");
        assert!(read(value).unwrap_err().is_format_error());

        let mut value = skinned_arm();
        value["animations"]["bend"]["samplers"]["bend_sampler"]["interpolation"] =
            json!("CUBICSPLINE");
        assert!(read(value).unwrap_err().is_format_error());

        let mut value = skinned_arm();
        value["animations"]["bend"]["parameters"]
            .as_object_mut()
            .unwrap()
            .remove("TIME");
        assert!(read(value).unwrap_err().is_format_error());
    }

    #[test]
    pub fn test_mismatched_counts() {
        let mut value = skinned_arm();
        value["accessors"]["bend_times"]["count"] = json!(2);
        assert!(read(value).unwrap_err().is_format_error());
    }

    #[test]
    pub fn test_wrong_output_layout() {
        let mut value = skinned_arm();
        value["animations"]["bend"]["channels"][0]["target"]["path"] = json!("translation");
        assert!(read(value).unwrap_err().is_format_error());
    }
}

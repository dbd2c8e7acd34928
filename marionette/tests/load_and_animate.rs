use std::{fs, path::Path, rc::Rc};

use approx::assert_relative_eq;
use glam::{Mat4, Vec3};
use image::{Rgba, RgbaImage};
use marionette::{
    components::{MaterialValue, SkeletonState},
    ContentManager,
};
use serde_json::{json, Value};

/// Appends f32 data to the binary file, returning `(offset, length)`
fn push_f32s(bin: &mut Vec<u8>, values: &[f32]) -> (usize, usize) {
    while bin.len() % 4 != 0 {
        bin.push(0);
    }
    let offset = bin.len();
    for v in values {
        bin.extend_from_slice(&v.to_le_bytes());
    }
    (offset, bin.len() - offset)
}

fn push_u16s(bin: &mut Vec<u8>, values: &[u16]) -> (usize, usize) {
    while bin.len() % 4 != 0 {
        bin.push(0);
    }
    let offset = bin.len();
    for v in values {
        bin.extend_from_slice(&v.to_le_bytes());
    }
    (offset, bin.len() - offset)
}

/// Writes the binary data, shaders and texture to `root` and returns the document.
fn write_arm(root: &Path, joint_names: &[&str]) -> Value {
    let mut bin = Vec::new();
    let mut views = serde_json::Map::new();
    let mut accessors = serde_json::Map::new();
    let mut add = |key: &str, (offset, length): (usize, usize), ty: &str, component: u32, count: usize| {
        views.insert(
            format!("{key}_view"),
            json!({ "buffer": "arm_bin", "byteOffset": offset, "byteLength": length }),
        );
        accessors.insert(
            key.to_string(),
            json!({ "bufferView": format!("{key}_view"), "componentType": component, "count": count, "type": ty }),
        );
    };

    let positions = push_f32s(&mut bin, &[0.0, 0.0, 0.0, 0.0, 1.5, 0.0, 0.0, 2.5, 0.0]);
    add("positions", positions, "VEC3", 5126, 3);
    let joints = push_f32s(&mut bin, &[0., 0., 0., 0., 1., 0., 0., 0., 1., 0., 0., 0.]);
    add("joints", joints, "VEC4", 5126, 3);
    let weights = push_f32s(&mut bin, &[1., 0., 0., 0., 1., 0., 0., 0., 1., 0., 0., 0.]);
    add("weights", weights, "VEC4", 5126, 3);
    let indices = push_u16s(&mut bin, &[0, 1, 2]);
    add("indices", indices, "SCALAR", 5123, 3);

    let ibms: Vec<f32> = [
        Mat4::from_translation(Vec3::new(0.0, -1.0, 0.0)),
        Mat4::from_translation(Vec3::new(0.0, -1.5, 0.0)),
    ]
    .iter()
    .flat_map(|m| m.to_cols_array())
    .collect();
    let ibms = push_f32s(&mut bin, &ibms);
    add("ibms", ibms, "MAT4", 5126, 2);

    let times = push_f32s(&mut bin, &[0.0, 0.5, 1.0]);
    add("times", times, "SCALAR", 5126, 3);
    let half = std::f32::consts::FRAC_1_SQRT_2;
    let rotations = push_f32s(
        &mut bin,
        &[0., 0., 0., 1., half, 0., 0., half, 0., 0., 0., 1.],
    );
    add("rotations", rotations, "VEC4", 5126, 3);

    fs::write(root.join("arm.bin"), &bin).unwrap();
    fs::create_dir_all(root.join("shaders")).unwrap();
    fs::write(
        root.join("shaders/skin.vert"),
        "uniform mat4 u_jointMat[2];\nvoid main() {}\n",
    )
    .unwrap();
    fs::write(root.join("shaders/skin.frag"), "void main() {}\n").unwrap();

    let mut png = RgbaImage::new(4, 4);
    png.put_pixel(3, 3, Rgba([10, 20, 30, 255]));
    png.save(root.join("skin.png")).unwrap();

    json!({
        "scene": "main",
        "scenes": { "main": { "nodes": ["root"] } },
        "buffers": { "arm_bin": { "uri": "arm.bin", "byteLength": bin.len() } },
        "bufferViews": views,
        "accessors": accessors,
        "shaders": {
            "skin_vs": { "uri": "shaders/skin.vert", "type": 35633 },
            "skin_fs": { "uri": "shaders/skin.frag", "type": 35632 },
        },
        "programs": {
            "skin_program": { "vertexShader": "skin_vs", "fragmentShader": "skin_fs", "attributes": ["a_position"] }
        },
        "techniques": {
            "skin_technique": {
                "program": "skin_program",
                "parameters": {
                    "jointMat": { "type": 35676, "semantic": "JOINTMATRIX", "count": 2 },
                    "diffuse": { "type": 35678 },
                },
                "uniforms": { "u_jointMat": "jointMat", "u_diffuse": "diffuse" },
            }
        },
        "images": { "skin_image": { "uri": "skin.png" } },
        "textures": { "skin_texture": { "source": "skin_image" } },
        "materials": {
            "skin_material": { "technique": "skin_technique", "values": { "diffuse": "skin_texture" } }
        },
        "meshes": {
            "arm": {
                "primitives": [{
                    "attributes": { "POSITION": "positions", "JOINT": "joints", "WEIGHT": "weights" },
                    "indices": "indices",
                    "material": "skin_material",
                }]
            }
        },
        "nodes": {
            "root": { "children": ["arm_node", "hip"] },
            "arm_node": { "meshes": ["arm"], "skin": "arm_skin", "skeletons": ["hip"] },
            "hip": { "jointName": "Hip", "translation": [0.0, 1.0, 0.0], "children": ["knee"] },
            "knee": { "jointName": "Knee", "translation": [0.0, 0.5, 0.0] },
        },
        "skins": {
            "arm_skin": { "inverseBindMatrices": "ibms", "jointNames": joint_names }
        },
        "animations": {
            "bend": {
                "channels": [{ "sampler": "s", "target": { "id": "knee", "path": "rotation" } }],
                "parameters": { "TIME": "times", "rotation": "rotations" },
                "samplers": { "s": { "input": "TIME", "output": "rotation", "interpolation": "STEP" } },
            }
        },
    })
}

fn write_document(root: &Path, document: &Value) {
    fs::write(
        root.join("arm.gltf"),
        serde_json::to_vec_pretty(document).unwrap(),
    )
    .unwrap();
}

/// Where the knee palette entry sends a point one unit above the knee
fn tip(palette: &[Mat4]) -> Vec3 {
    palette[1]
        .transpose()
        .transform_point3(Vec3::new(0.0, 2.5, 0.0))
}

#[test]
pub fn test_failed_load_then_retry() {
    let root = tempfile::tempdir().unwrap();
    let mut content = ContentManager::builder()
        .root_directory(root.path())
        .build();

    write_document(root.path(), &write_arm(root.path(), &["Hip", "Elbow"]));
    let err = content.load("arm").unwrap_err();
    assert!(err.is_format_error(), "{err:?}");
    assert!(!content.is_loaded("arm"));

    write_document(root.path(), &write_arm(root.path(), &["Hip", "Knee"]));
    let model = content.load("arm").unwrap();
    assert!(content.is_loaded("arm"));

    assert_eq!(model.roots.len(), 1);
    assert_eq!(model.textures.len(), 1);
    assert_eq!((model.textures[0].width, model.textures[0].height), (4, 4));

    let material = &model.materials[0];
    let technique = material.technique.as_ref().unwrap();
    assert!(technique.program.vertex_shader.source.contains("u_jointMat"));
    assert!(matches!(
        material.values["diffuse"],
        MaterialValue::Texture(ref t) if Rc::ptr_eq(t, &model.textures[0])
    ));

    let skeleton = model.skeleton("arm_skin").unwrap();
    assert_eq!(skeleton.borrow().state, SkeletonState::Playing);
    assert!(Rc::ptr_eq(&model.meshes[0].skeleton().unwrap(), &skeleton));
}

#[test]
pub fn test_animate() {
    let root = tempfile::tempdir().unwrap();
    write_document(root.path(), &write_arm(root.path(), &["Hip", "Knee"]));
    let mut content = ContentManager::builder()
        .root_directory(root.path())
        .cache_models(false)
        .build();

    let model = content.load("arm").unwrap();
    let skeleton = model.skeletons[0].clone();

    // Bind pose: the palette leaves the mesh where it is.
    assert_relative_eq!(
        tip(&skeleton.borrow().skin_transforms),
        Vec3::new(0.0, 2.5, 0.0),
        epsilon = 1e-5
    );

    // Past the second keyframe the knee is bent forwards.
    model.update(0.6);
    let bent = skeleton.borrow().skin_transforms.clone();
    assert_relative_eq!(tip(&bent), Vec3::new(0.0, 1.5, 1.0), epsilon = 1e-5);
    assert_relative_eq!(bent[0], Mat4::IDENTITY, epsilon = 1e-5);

    // One full loop later the pose is the same.
    model.update(1.0);
    assert_relative_eq!(
        tip(&skeleton.borrow().skin_transforms),
        tip(&bent),
        epsilon = 1e-5
    );

    // Stepping backwards before the bend straightens the knee again.
    model.update(-0.3);
    assert_relative_eq!(
        tip(&skeleton.borrow().skin_transforms),
        Vec3::new(0.0, 2.5, 0.0),
        epsilon = 1e-5
    );

    // A fresh load played straight to the same time agrees.
    let fresh = content.load("arm").unwrap();
    fresh.update(0.3);
    assert_relative_eq!(
        fresh.skeletons[0].borrow().skin_transforms[1],
        skeleton.borrow().skin_transforms[1],
        epsilon = 1e-5
    );
}

//! Reading scene documents into linked objects.
//!
//! A [`ContentReader`] resolves the entries of a single [`Document`], caching every object it
//! builds so that two references to the same entry always produce the same object. The
//! [`ContentManager`] sits on top, finding documents under a content root and keeping loaded
//! models around.

mod document;
mod manager;
mod reader;
pub mod readers;
mod registry;

pub use document::{Document, REQUIRED_SECTIONS};
pub use manager::{ContentConfig, ContentManager, ContentManagerBuilder};
pub use reader::ContentReader;
pub use registry::{reader_for, Content, ContentType, ReadFn, Resolvable, TypeReader, READERS};

#[cfg(test)]
pub(crate) mod fixtures {
    use base64::{engine::general_purpose::STANDARD, Engine as _};
    use glam::{Mat4, Vec3};
    use serde_json::{json, Map, Value};

    use crate::components::{AttributeType, ComponentType};

    /// Packs accessor data into a single embedded buffer.
    pub struct Fixture {
        buffer: String,
        bytes: Vec<u8>,
        views: Map<String, Value>,
        accessors: Map<String, Value>,
    }

    impl Default for Fixture {
        fn default() -> Self {
            Self::new("fixture_data")
        }
    }

    impl Fixture {
        pub fn new(buffer: &str) -> Self {
            Self {
                buffer: buffer.to_string(),
                bytes: Vec::new(),
                views: Map::new(),
                accessors: Map::new(),
            }
        }

        pub fn accessor(
            &mut self,
            key: &str,
            bytes: &[u8],
            attribute_type: &str,
            component_type: ComponentType,
            count: usize,
        ) -> String {
            while self.bytes.len() % 4 != 0 {
                self.bytes.push(0);
            }
            let offset = self.bytes.len();
            self.bytes.extend_from_slice(bytes);

            let view = format!("{key}_view");
            self.views.insert(
                view.clone(),
                json!({ "buffer": self.buffer, "byteOffset": offset, "byteLength": bytes.len() }),
            );
            self.accessors.insert(
                key.to_string(),
                json!({
                    "bufferView": view,
                    "byteOffset": 0,
                    "componentType": component_type as u32,
                    "count": count,
                    "type": attribute_type,
                }),
            );
            key.to_string()
        }

        pub fn f32s(&mut self, key: &str, values: &[f32], attribute_type: &str) -> String {
            let multiplicity = AttributeType::from_document(attribute_type)
                .unwrap()
                .multiplicity();
            self.accessor(
                key,
                bytemuck::cast_slice(values),
                attribute_type,
                ComponentType::Float,
                values.len() / multiplicity,
            )
        }

        pub fn u16s(&mut self, key: &str, values: &[u16]) -> String {
            self.accessor(
                key,
                bytemuck::cast_slice(values),
                "SCALAR",
                ComponentType::UnsignedShort,
                values.len(),
            )
        }

        /// Matrices are written column-major, as the document stores them.
        pub fn matrices(&mut self, matrices: &[Mat4]) -> String {
            let key = format!("{}_matrices_{}", self.buffer, self.accessors.len());
            let values: Vec<f32> = matrices.iter().flat_map(|m| m.to_cols_array()).collect();
            self.f32s(&key, &values, "MAT4")
        }

        /// Add the buffer, views and accessors to `document`
        pub fn install(&self, document: &mut Value) {
            document["buffers"][&self.buffer] = json!({
                "uri": format!("data:application/octet-stream;base64,{}", STANDARD.encode(&self.bytes)),
                "byteLength": self.bytes.len(),
            });
            for (key, view) in &self.views {
                document["bufferViews"][key] = view.clone();
            }
            for (key, accessor) in &self.accessors {
                document["accessors"][key] = accessor.clone();
            }
        }
    }

    /// A two bone arm: `root` holds the skinned mesh node and the `hip` joint, and `knee` hangs
    /// half a unit above the hip. One animation bends the knee.
    pub fn skinned_arm() -> Value {
        let mut fixture = Fixture::new("arm_data");
        let positions = fixture.f32s(
            "positions",
            &[0.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 1.5, 0.0],
            "VEC3",
        );
        let joints = fixture.f32s(
            "joints",
            &[0.0, 0.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0],
            "VEC4",
        );
        let weights = fixture.f32s(
            "weights",
            &[1.0, 0.0, 0.0, 0.0, 0.5, 0.5, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0],
            "VEC4",
        );
        let indices = fixture.u16s("indices", &[0, 1, 2]);
        let inverse_bind_matrices = fixture.matrices(&[
            Mat4::from_translation(Vec3::new(0.0, -1.0, 0.0)),
            Mat4::from_translation(Vec3::new(0.0, -1.5, 0.0)),
        ]);
        let times = fixture.f32s("bend_times", &[0.0, 0.5, 1.0], "SCALAR");
        let rotations = fixture.f32s(
            "bend_rotations",
            &[
                0.0,
                0.0,
                0.0,
                1.0,
                std::f32::consts::FRAC_1_SQRT_2,
                0.0,
                0.0,
                std::f32::consts::FRAC_1_SQRT_2,
                0.0,
                0.0,
                0.0,
                1.0,
            ],
            "VEC4",
        );

        let mut document = json!({
            "meshes": {
                "arm": {
                    "primitives": [{
                        "attributes": { "POSITION": positions, "JOINT": joints, "WEIGHT": weights },
                        "indices": indices,
                        "material": "skin_material",
                    }]
                }
            },
            "materials": {
                "skin_material": {
                    "values": { "diffuse": [1.0, 0.5, 0.25, 1.0], "shininess": 8 }
                }
            },
            "nodes": {
                "root": { "children": ["hip", "arm_node"] },
                "arm_node": { "meshes": ["arm"], "skin": "arm_skin", "skeletons": ["hip"] },
                "hip": { "jointName": "Hip", "translation": [0.0, 1.0, 0.0], "children": ["knee"] },
                "knee": { "jointName": "Knee", "translation": [0.0, 0.5, 0.0] },
            },
            "skins": {
                "arm_skin": {
                    "inverseBindMatrices": inverse_bind_matrices,
                    "jointNames": ["Hip", "Knee"],
                }
            },
            "animations": {
                "bend": {
                    "channels": [{ "sampler": "bend_sampler", "target": { "id": "knee", "path": "rotation" } }],
                    "parameters": { "TIME": times, "rotation": rotations },
                    "samplers": { "bend_sampler": { "input": "TIME", "output": "rotation" } },
                }
            },
            "accessors": {},
            "bufferViews": {},
            "buffers": {},
        });
        fixture.install(&mut document);
        document
    }
}

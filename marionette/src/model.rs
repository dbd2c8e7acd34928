use std::rc::Rc;

use glam::Mat4;

use crate::components::{Animation, Material, Mesh, NodeRef, SkeletonRef, Texture};

/// Everything loaded from one document.
#[derive(Debug)]
pub struct Model {
    /// The asset name the model was loaded as
    pub name: String,
    pub meshes: Vec<Rc<Mesh>>,
    /// Every node, in document key order
    pub nodes: Vec<NodeRef>,
    /// The nodes of the default scene, or every parentless node if there is no scene
    pub roots: Vec<NodeRef>,
    pub skeletons: Vec<SkeletonRef>,
    pub animations: Vec<Rc<Animation>>,
    pub materials: Vec<Rc<Material>>,
    pub textures: Vec<Rc<Texture>>,
}

impl Model {
    /// Find a node by its document key
    pub fn node(&self, key: &str) -> Option<NodeRef> {
        self.nodes.iter().find(|n| n.borrow().key == key).cloned()
    }

    /// Find a skeleton by name
    pub fn skeleton(&self, name: &str) -> Option<SkeletonRef> {
        self.skeletons
            .iter()
            .find(|s| s.borrow().name == name)
            .cloned()
    }

    /// Advance every skeleton by `delta_time` seconds.
    pub fn update(&self, delta_time: f32) {
        for skeleton in &self.skeletons {
            skeleton.borrow_mut().update(delta_time, Mat4::IDENTITY);
        }
    }
}

use std::{
    cell::RefCell,
    rc::{Rc, Weak},
};

use glam::{Mat4, Quat, Vec3};

use super::{BoneRef, Mesh, SkeletonRef};
use crate::util::{compose_trs, decompose_trs};

/// Shared handle to a [`Node`]
pub type NodeRef = Rc<RefCell<Node>>;

/// The local transform of a node, as authored in the document.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum NodeTransform {
    /// A full matrix, already converted to row-vector form
    Matrix(Mat4),
    /// A translation / rotation / scale decomposition
    Trs {
        translation: Vec3,
        rotation: Quat,
        scale: Vec3,
    },
}

impl Default for NodeTransform {
    fn default() -> Self {
        NodeTransform::Matrix(Mat4::IDENTITY)
    }
}

impl NodeTransform {
    /// The transform as a row-vector matrix
    pub fn matrix(&self) -> Mat4 {
        match *self {
            NodeTransform::Matrix(m) => m,
            NodeTransform::Trs {
                translation,
                rotation,
                scale,
            } => compose_trs(translation, rotation, scale),
        }
    }

    /// The transform as `(translation, rotation, scale)`
    pub fn decomposed(&self) -> (Vec3, Quat, Vec3) {
        match *self {
            NodeTransform::Matrix(m) => decompose_trs(&m),
            NodeTransform::Trs {
                translation,
                rotation,
                scale,
            } => (translation, rotation, scale),
        }
    }
}

/// A node in the scene tree. Children are shared, the parent link is weak.
#[derive(Debug, Default)]
pub struct Node {
    /// The key this node was stored under in the document
    pub key: String,
    /// A helpful name; falls back to the key
    pub name: String,
    pub transform: NodeTransform,
    pub children: Vec<NodeRef>,
    pub parent: Weak<RefCell<Node>>,
    pub meshes: Vec<Rc<Mesh>>,
    /// Set for nodes that are part of a skeleton
    pub joint_name: Option<String>,
    /// The bone created for this node, if it is a joint
    pub bone: Option<BoneRef>,
    /// The skeleton that deforms this node's meshes, if it is skinned
    pub skeleton: Option<SkeletonRef>,
    /// Keys of the nodes the document names as this node's skeleton roots
    pub skeleton_roots: Vec<String>,
}

impl Node {
    pub fn is_joint(&self) -> bool {
        self.joint_name.is_some()
    }

    /// Depth first search of this node and its descendants
    pub fn find(&self, key: &str) -> Option<NodeRef> {
        for child in &self.children {
            if child.borrow().key == key {
                return Some(child.clone());
            }
            if let Some(found) = child.borrow().find(key) {
                return Some(found);
            }
        }
        None
    }

    /// The node's transform relative to the root of its tree
    pub fn world_matrix(&self) -> Mat4 {
        let mut world = self.transform.matrix();
        let mut parent = self.parent.upgrade();
        while let Some(p) = parent {
            let p = p.borrow();
            world *= p.transform.matrix();
            parent = p.parent.upgrade();
        }
        world
    }
}

use std::{
    cell::RefCell,
    rc::{Rc, Weak},
};

use glam::Mat4;

use super::BoneAnimation;

/// Shared handle to a [`Bone`]
pub type BoneRef = Rc<RefCell<Bone>>;

/// A joint of a skeleton.
///
/// Bones are created once per joint name while the joint nodes are read, and only receive their
/// `index` when a skin claims them. A bone listed by several skins keeps the index from the first
/// one; [`Skeleton::index_of`](super::Skeleton::index_of) gives its position in any skeleton.
#[derive(Debug, Default)]
pub struct Bone {
    pub joint_name: String,
    /// Key of the node this bone was created for
    pub node_key: String,
    /// Position of this bone in the arrays of the first skeleton to claim it
    pub index: Option<usize>,
    pub parent: Weak<RefCell<Bone>>,
    pub children: Vec<BoneRef>,
    /// The node's local transform at bind time
    pub bind_transform: Mat4,
    /// Keyframes driving this bone, if any animation targets it
    pub animation: Option<BoneAnimation>,
}

impl Bone {
    pub fn new(
        joint_name: impl Into<String>,
        node_key: impl Into<String>,
        bind_transform: Mat4,
    ) -> BoneRef {
        Rc::new(RefCell::new(Bone {
            joint_name: joint_name.into(),
            node_key: node_key.into(),
            bind_transform,
            ..Default::default()
        }))
    }

    /// Link `child` under `parent`. Does nothing if the link already exists.
    pub fn attach_child(parent: &BoneRef, child: &BoneRef) {
        if Rc::ptr_eq(parent, child) {
            return;
        }
        if !parent.borrow().children.iter().any(|c| Rc::ptr_eq(c, child)) {
            parent.borrow_mut().children.push(child.clone());
        }
        child.borrow_mut().parent = Rc::downgrade(parent);
    }

    pub fn is_animated(&self) -> bool {
        self.animation.is_some()
    }
}

use std::{
    cell::RefCell,
    rc::{Rc, Weak},
};

use glam::{Quat, Vec3};
use log::{debug, warn};
use serde::Deserialize;
use serde_json::Value;

use crate::{
    components::{Bone, Mesh, Node, NodeRef, NodeTransform},
    content::{document::from_entry, Content, ContentReader, ContentType},
    util::matrix_from_document,
    ContentError, ContentResult,
};

#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
struct NodeEntry {
    name: Option<String>,
    children: Vec<String>,
    matrix: Option<[f32; 16]>,
    translation: Option<[f32; 3]>,
    rotation: Option<[f32; 4]>,
    scale: Option<[f32; 3]>,
    meshes: Vec<String>,
    joint_name: Option<String>,
    skin: Option<String>,
    skeletons: Vec<String>,
}

impl NodeEntry {
    fn transform(&self, key: &str) -> NodeTransform {
        let has_trs = self.translation.is_some() || self.rotation.is_some() || self.scale.is_some();
        match &self.matrix {
            Some(matrix) => {
                if has_trs {
                    warn!("[MARIONETTE_CONTENT] Node {key} has both a matrix and a TRS. Using the matrix");
                }
                NodeTransform::Matrix(matrix_from_document(matrix))
            }
            None if has_trs => NodeTransform::Trs {
                translation: self.translation.map(Vec3::from).unwrap_or(Vec3::ZERO),
                rotation: self
                    .rotation
                    .map(|[x, y, z, w]| Quat::from_xyzw(x, y, z, w).normalize())
                    .unwrap_or(Quat::IDENTITY),
                scale: self.scale.map(Vec3::from).unwrap_or(Vec3::ONE),
            },
            None => NodeTransform::default(),
        }
    }
}

/// Read a node, its meshes and (recursively) its children.
///
/// The node is cached before its children are read so that children can find it. Joint nodes
/// also create and register their [`Bone`].
pub fn read_node(reader: &mut ContentReader, key: &str, entry: &Value) -> ContentResult<Content> {
    let entry: NodeEntry = from_entry(key, entry)?;
    let transform = entry.transform(key);

    let meshes = entry
        .meshes
        .iter()
        .map(|m| reader.read_object::<Mesh>(m))
        .collect::<ContentResult<Vec<_>>>()?;

    for root in &entry.skeletons {
        reader.document().entry(ContentType::Node, root)?;
    }

    let bone = match &entry.joint_name {
        Some(joint_name) => {
            let bone = Bone::new(joint_name.as_str(), key, transform.matrix());
            reader.register_joint(bone.clone())?;
            Some(bone)
        }
        None => None,
    };

    let node = Rc::new(RefCell::new(Node {
        key: key.to_string(),
        name: entry.name.clone().unwrap_or_else(|| key.to_string()),
        transform,
        children: Vec::with_capacity(entry.children.len()),
        parent: Weak::new(),
        meshes,
        joint_name: entry.joint_name.clone(),
        bone,
        skeleton: None,
        skeleton_roots: entry.skeletons.clone(),
    }));
    reader.cache_content(key, Content::Node(node.clone()));

    for child_key in &entry.children {
        let child = reader.read_object::<Node>(child_key)?;
        attach_child(&node, &child)?;
    }

    if let Some(skin) = entry.skin {
        debug!("[MARIONETTE_CONTENT] Node {key} is skinned by {skin}");
        reader.request_skin(node.clone(), skin)?;
    }

    Ok(Content::Node(node))
}

/// Link `child` under `parent`, mirroring the link on their bones if both are joints.
fn attach_child(parent: &NodeRef, child: &NodeRef) -> ContentResult<()> {
    let parent_key = parent.borrow().key.clone();
    let child_key = child.borrow().key.clone();

    if Rc::ptr_eq(parent, child) {
        return Err(ContentError::format(format!(
            "node {parent_key} lists itself as a child"
        )));
    }

    let mut ancestor = parent.borrow().parent.upgrade();
    while let Some(a) = ancestor {
        if Rc::ptr_eq(&a, child) {
            return Err(ContentError::format(format!(
                "nodes {parent_key} and {child_key} form a cycle"
            )));
        }
        ancestor = a.borrow().parent.upgrade();
    }

    let previous = child.borrow().parent.upgrade();
    if let Some(previous) = previous {
        if Rc::ptr_eq(&previous, parent) {
            return Ok(());
        }
        warn!(
            "[MARIONETTE_CONTENT] Node {child_key} is listed as a child of both {} and {parent_key}. Keeping {parent_key}",
            previous.borrow().key
        );
        previous
            .borrow_mut()
            .children
            .retain(|c| !Rc::ptr_eq(c, child));
    }

    child.borrow_mut().parent = Rc::downgrade(parent);
    parent.borrow_mut().children.push(child.clone());

    let parent_bone = parent.borrow().bone.clone();
    let child_bone = child.borrow().bone.clone();
    if let (Some(parent_bone), Some(child_bone)) = (parent_bone, child_bone) {
        Bone::attach_child(&parent_bone, &child_bone);
    }

    Ok(())
}

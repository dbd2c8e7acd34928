use std::{
    collections::{BTreeMap, HashMap},
    path::{Path, PathBuf},
    rc::Rc,
};

use base64::{engine::general_purpose::STANDARD, Engine as _};
use itertools::Itertools;
use log::{debug, info, warn};
use serde_json::Value;

use super::{reader_for, Content, ContentType, Document, Resolvable};
use crate::{
    binary_reader::BinaryReader,
    components::{
        build_keyframes, Animation, AnimationChannel, BoneAnimation, BoneRef, Material, Mesh,
        Node, NodeRef, Skeleton, Texture,
    },
    model::Model,
    ContentError, ContentResult,
};

/// Where a load is up to. Nodes only resolve skins once every joint exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub(crate) enum Phase {
    Meshes,
    Joints,
    Nodes,
    Animations,
}

/// Resolves the entries of one document into linked, shared objects.
///
/// A reader is good for exactly one load. If [`ContentReader::read_asset`] fails the reader (and
/// everything it cached) is dropped.
pub struct ContentReader {
    asset_name: String,
    asset_directory: PathBuf,
    content_root: PathBuf,
    document: Rc<Document>,
    cache: HashMap<(ContentType, String), Content>,
    joints: HashMap<String, BoneRef>,
    phase: Phase,
    pending_skins: Vec<(NodeRef, String)>,
}

impl ContentReader {
    /// Create a reader for an already parsed document.
    ///
    /// External references are looked up relative to `asset_directory` first, then
    /// `content_root`.
    pub fn new(
        asset_name: impl Into<String>,
        document: Document,
        asset_directory: impl Into<PathBuf>,
        content_root: impl Into<PathBuf>,
    ) -> Self {
        Self {
            asset_name: asset_name.into(),
            asset_directory: asset_directory.into(),
            content_root: content_root.into(),
            document: Rc::new(document),
            cache: Default::default(),
            joints: Default::default(),
            phase: Phase::Nodes,
            pending_skins: Default::default(),
        }
    }

    /// Parse a document from memory
    pub fn from_slice(
        asset_name: impl Into<String>,
        bytes: &[u8],
        asset_directory: impl Into<PathBuf>,
        content_root: impl Into<PathBuf>,
    ) -> ContentResult<Self> {
        let document = Document::from_slice(bytes)?;
        Ok(Self::new(asset_name, document, asset_directory, content_root))
    }

    /// Open the document at `path`
    pub fn open(path: &Path, content_root: impl Into<PathBuf>) -> ContentResult<Self> {
        if !path.is_file() {
            return Err(ContentError::AssetNotFoundError(path.to_path_buf()));
        }
        let bytes = BinaryReader::open(path)?.read_to_end()?;
        let asset_name = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        let asset_directory = path.parent().map(Path::to_path_buf).unwrap_or_default();
        Self::from_slice(asset_name, &bytes, asset_directory, content_root)
    }

    pub fn asset_name(&self) -> &str {
        &self.asset_name
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    /// Resolve the object stored under `name` in `T`'s section.
    ///
    /// Repeated calls with the same name return the same object.
    pub fn read_object<T: Resolvable>(&mut self, name: &str) -> ContentResult<T::Handle> {
        if let Some(handle) = self.cached::<T>(name)? {
            return Ok(handle);
        }

        let document = self.document.clone();
        let entry = document.entry(T::CONTENT_TYPE, name)?;
        self.read_object_instance::<T>(name, entry)
    }

    /// Resolve `entry` as a `T` stored under `name`, skipping the section lookup.
    pub fn read_object_instance<T: Resolvable>(
        &mut self,
        name: &str,
        entry: &Value,
    ) -> ContentResult<T::Handle> {
        if let Some(handle) = self.cached::<T>(name)? {
            return Ok(handle);
        }

        let content = self.dispatch(T::CONTENT_TYPE.type_name(), name, entry)?;
        T::into_handle(content).ok_or_else(|| {
            ContentError::format(format!(
                "the {} reader produced the wrong type for {name}",
                T::CONTENT_TYPE.type_name()
            ))
        })
    }

    /// Resolve an object by the logical name of its type, eg. `"Accessor"`.
    pub fn read_by_type_name(&mut self, type_name: &str, name: &str) -> ContentResult<Content> {
        let reader = reader_for(type_name)?;
        let key = (reader.content_type, name.to_string());
        if let Some(content) = self.cache.get(&key) {
            return Ok(content.clone());
        }

        let document = self.document.clone();
        let entry = document.entry(reader.content_type, name)?;
        self.dispatch(type_name, name, entry)
    }

    fn dispatch(&mut self, type_name: &str, name: &str, entry: &Value) -> ContentResult<Content> {
        let reader = reader_for(type_name)?;
        let content = (reader.read)(self, name, entry)?;
        if content.content_type() != reader.content_type {
            return Err(ContentError::format(format!(
                "the {type_name} reader produced a {:?} for {name}",
                content.content_type()
            )));
        }

        debug!("[MARIONETTE_CONTENT] Read {type_name} {name}");
        self.cache_content(name, content.clone());
        Ok(content)
    }

    fn cached<T: Resolvable>(&self, name: &str) -> ContentResult<Option<T::Handle>> {
        match self.cache.get(&(T::CONTENT_TYPE, name.to_string())) {
            Some(content) => T::into_handle(content.clone()).map(Some).ok_or_else(|| {
                ContentError::format(format!("cache entry {name} has the wrong type"))
            }),
            None => Ok(None),
        }
    }

    /// Store an object before it is fully built, so references back to it resolve to the same
    /// instance.
    pub(crate) fn cache_content(&mut self, name: &str, content: Content) {
        self.cache
            .insert((content.content_type(), name.to_string()), content);
    }

    /// Load the bytes an entry refers to by URI.
    ///
    /// `data:` URIs are decoded in place. Anything else is a path, tried relative to the asset's
    /// directory and then to the content root.
    pub fn read_external_reference(&self, uri: &str) -> ContentResult<Vec<u8>> {
        if let Some(data) = uri.strip_prefix("data:") {
            return decode_data_uri(data);
        }

        let candidates = [self.asset_directory.join(uri), self.content_root.join(uri)];
        let path = candidates
            .iter()
            .find(|p| p.is_file())
            .ok_or_else(|| ContentError::AssetNotFoundError(candidates[0].clone()))?;

        debug!("[MARIONETTE_CONTENT] Reading external file {path:?}");
        BinaryReader::open(path)?.read_to_end()
    }

    pub(crate) fn register_joint(&mut self, bone: BoneRef) -> ContentResult<()> {
        let joint_name = bone.borrow().joint_name.clone();
        if self.joints.contains_key(&joint_name) {
            return Err(ContentError::format(format!(
                "joint name {joint_name} is used by more than one node"
            )));
        }
        self.joints.insert(joint_name, bone);
        Ok(())
    }

    /// Find a resolved joint by joint name, falling back to the key of its node
    pub(crate) fn find_joint(&self, name: &str) -> Option<BoneRef> {
        self.joints.get(name).cloned().or_else(|| {
            self.joints
                .values()
                .find(|b| b.borrow().node_key == name)
                .cloned()
        })
    }

    /// Attach the skin `skin_key` to `node`, or queue it if the joints aren't all resolved yet.
    pub(crate) fn request_skin(&mut self, node: NodeRef, skin_key: String) -> ContentResult<()> {
        if self.phase < Phase::Nodes {
            self.pending_skins.push((node, skin_key));
            return Ok(());
        }
        self.bind_skin(&node, &skin_key)
    }

    fn bind_skin(&mut self, node: &NodeRef, skin_key: &str) -> ContentResult<()> {
        let skeleton = self.read_object::<Skeleton>(skin_key)?;
        let mut node = node.borrow_mut();
        for mesh in &node.meshes {
            if let Some(previous) = mesh.bind_skeleton(skeleton.clone()) {
                if !Rc::ptr_eq(&previous, &skeleton) {
                    warn!(
                        "[MARIONETTE_CONTENT] Mesh {} moves from skin {} to {skin_key}",
                        mesh.name,
                        previous.borrow().name
                    );
                }
            }
        }
        node.skeleton = Some(skeleton);
        Ok(())
    }

    fn resolve_pending_skins(&mut self) -> ContentResult<()> {
        for (node, skin_key) in std::mem::take(&mut self.pending_skins) {
            self.bind_skin(&node, &skin_key)?;
        }
        Ok(())
    }

    /// Read the whole document into a [`Model`].
    ///
    /// Meshes are read first, then every joint node (building the bones), then the remaining
    /// nodes (resolving skins), and finally the animations.
    pub fn read_asset(mut self) -> ContentResult<Model> {
        info!("[MARIONETTE_CONTENT] Loading {}..", self.asset_name);
        let document = self.document.clone();

        self.phase = Phase::Meshes;
        let meshes = document
            .entries(ContentType::Mesh)
            .map(|(key, _)| self.read_object::<Mesh>(key))
            .collect::<ContentResult<Vec<_>>>()?;

        self.phase = Phase::Joints;
        for (key, entry) in document.entries(ContentType::Node) {
            if is_joint_entry(entry) {
                self.read_object::<Node>(key)?;
            }
        }

        self.phase = Phase::Nodes;
        self.resolve_pending_skins()?;
        for (key, entry) in document.entries(ContentType::Node) {
            if !is_joint_entry(entry) {
                self.read_object::<Node>(key)?;
            }
        }
        for (key, _) in document.entries(ContentType::Skeleton) {
            self.read_object::<Skeleton>(key)?;
        }

        self.phase = Phase::Animations;
        let animations = document
            .entries(ContentType::Animation)
            .map(|(key, _)| self.read_object::<Animation>(key))
            .collect::<ContentResult<Vec<_>>>()?;
        self.attach_animations(&animations)?;

        let nodes = document
            .entries(ContentType::Node)
            .map(|(key, _)| self.read_object::<Node>(key))
            .collect::<ContentResult<Vec<_>>>()?;
        let roots = self.scene_roots(&nodes)?;
        let skeletons = self.cached_all::<Skeleton>(&document);
        let materials = self.cached_all::<Material>(&document);
        let textures = self.cached_all::<Texture>(&document);

        info!(
            "[MARIONETTE_CONTENT] ..loaded {}: {} meshes, {} nodes, {} skeletons, {} animations",
            self.asset_name,
            meshes.len(),
            nodes.len(),
            skeletons.len(),
            animations.len()
        );

        Ok(Model {
            name: self.asset_name,
            meshes,
            nodes,
            roots,
            skeletons,
            animations,
            materials,
            textures,
        })
    }

    /// Turn every animation channel into keyframes on the bone it targets.
    ///
    /// All channels loaded for the asset share one clip length, so bones stay in step when the
    /// clip loops.
    fn attach_animations(&mut self, animations: &[Rc<Animation>]) -> ContentResult<()> {
        let duration = animations
            .iter()
            .map(|a| a.duration())
            .fold(0.0, f32::max);

        let by_target: BTreeMap<&str, Vec<&AnimationChannel>> = animations
            .iter()
            .flat_map(|a| a.channels.iter())
            .map(|c| (c.target_node.as_str(), c))
            .into_group_map()
            .into_iter()
            .collect();

        for (target, channels) in by_target {
            let node = self.read_object::<Node>(target)?;
            let node = node.borrow();
            let Some(bone) = node.bone.clone() else {
                warn!("[MARIONETTE_CONTENT] Node {target} is animated but is not a joint. Ignoring");
                continue;
            };

            let keyframes = build_keyframes(&channels, node.transform.decomposed());
            debug!(
                "[MARIONETTE_CONTENT] Attaching {} keyframes to joint {}",
                keyframes.len(),
                bone.borrow().joint_name
            );
            bone.borrow_mut().animation = Some(BoneAnimation::new(keyframes, duration));
        }

        for skeleton in self.cached_all::<Skeleton>(&self.document.clone()) {
            skeleton.borrow_mut().refresh_state();
        }

        Ok(())
    }

    fn scene_roots(&mut self, nodes: &[NodeRef]) -> ContentResult<Vec<NodeRef>> {
        let document = self.document.clone();
        let scene = document
            .get("scene")
            .and_then(Value::as_str)
            .and_then(|key| document.section("scenes").get(key))
            .or_else(|| document.section("scenes").values().next());

        let Some(scene) = scene else {
            return Ok(nodes
                .iter()
                .filter(|n| n.borrow().parent.upgrade().is_none())
                .cloned()
                .collect());
        };

        let keys = scene
            .get("nodes")
            .and_then(Value::as_array)
            .ok_or_else(|| ContentError::format("scene has no nodes"))?;
        keys.iter()
            .map(|key| {
                let key = key
                    .as_str()
                    .ok_or_else(|| ContentError::format("scene node keys must be strings"))?;
                self.read_object::<Node>(key)
            })
            .collect()
    }

    /// Everything of type `T` that was resolved during the load, in document order
    fn cached_all<T: Resolvable>(&self, document: &Document) -> Vec<T::Handle> {
        document
            .entries(T::CONTENT_TYPE)
            .filter_map(|(key, _)| self.cached::<T>(key).ok().flatten())
            .collect()
    }
}

fn is_joint_entry(entry: &Value) -> bool {
    entry.get("jointName").map_or(false, Value::is_string)
}

fn decode_data_uri(data: &str) -> ContentResult<Vec<u8>> {
    let (header, payload) = data
        .split_once(',')
        .ok_or_else(|| ContentError::format("data URI has no payload"))?;
    if header.ends_with(";base64") {
        STANDARD
            .decode(payload)
            .map_err(|e| ContentError::format(format!("data URI is not valid base64: {e}")))
    } else {
        Ok(payload.as_bytes().to_vec())
    }
}

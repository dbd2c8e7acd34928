pub mod accessor;
pub mod animation;
pub mod bone;
pub mod buffer;
pub mod buffer_view;
pub mod material;
pub mod mesh;
pub mod node;
pub mod shader;
pub mod skeleton;
pub mod technique;
pub mod texture;

pub use accessor::{element_size, Accessor, AttributeType, ComponentType};
pub use animation::{
    build_keyframes, Animation, AnimationChannel, AnimationPath, BoneAnimation, ChannelValues,
    Interpolation, Keyframe, Playback,
};
pub use bone::{Bone, BoneRef};
pub use buffer::Buffer;
pub use buffer_view::BufferView;
pub use material::{Material, MaterialValue};
pub use mesh::{Mesh, Primitive, PrimitiveMode};
pub use node::{Node, NodeRef, NodeTransform};
pub use shader::{Shader, ShaderStage};
pub use skeleton::{Skeleton, SkeletonRef, SkeletonState};
pub use technique::{Program, Technique, TechniqueParameter};
pub use texture::{Image, Sampler, Texture};

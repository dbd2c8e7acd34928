pub mod animation;
pub mod skinning;

pub use animation::animation_system;
pub use skinning::skinning_system;

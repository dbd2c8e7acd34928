/// The pipeline stage a shader runs in. The discriminants are the GL enum values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum ShaderStage {
    Fragment = 35632,
    Vertex = 35633,
}

impl ShaderStage {
    pub fn from_document(value: u32) -> Option<Self> {
        match value {
            35632 => Some(ShaderStage::Fragment),
            35633 => Some(ShaderStage::Vertex),
            _ => None,
        }
    }
}

/// Shader source loaded from an external file. Compilation is left to the renderer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Shader {
    pub name: String,
    pub stage: ShaderStage,
    pub source: String,
}

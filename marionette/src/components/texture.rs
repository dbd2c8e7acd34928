use std::rc::Rc;

/// Encoded image bytes, eg. the contents of a PNG file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Image {
    pub name: String,
    pub uri: String,
    pub data: Vec<u8>,
}

/// How a texture is filtered and wrapped. Values are GL enums.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sampler {
    pub mag_filter: u32,
    pub min_filter: u32,
    pub wrap_s: u32,
    pub wrap_t: u32,
}

impl Default for Sampler {
    fn default() -> Self {
        Self {
            mag_filter: 9729,  // LINEAR
            min_filter: 9986,  // NEAREST_MIPMAP_LINEAR
            wrap_s: 10497,     // REPEAT
            wrap_t: 10497,
        }
    }
}

/// A decoded texture, ready to be uploaded by the renderer
#[derive(Debug, Clone, PartialEq)]
pub struct Texture {
    pub name: String,
    pub image: Rc<Image>,
    pub sampler: Sampler,
    pub width: u32,
    pub height: u32,
    /// RGBA8 pixels, row by row
    pub pixels: Vec<u8>,
}

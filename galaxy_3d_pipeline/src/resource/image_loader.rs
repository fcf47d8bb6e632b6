/// Image decoding collaborator
///
/// The pool never touches the file system itself. Applications plug in a
/// loader that turns a path into pixels.

use std::path::Path;
use crate::error::Result;
use crate::graphics_device::TextureFormat;

/// Decoded image, mip 0 only
#[derive(Debug, Clone)]
pub struct ImageData {
    pub width: u32,
    pub height: u32,
    pub format: TextureFormat,
    /// Tightly packed rows
    pub pixels: Vec<u8>,
}

impl ImageData {
    pub fn row_pitch(&self) -> u32 {
        self.width * self.format.bytes_per_pixel()
    }
}

/// Decodes image files for texture-from-file, HDR and cube map creation
pub trait ImageLoader: Send + Sync {
    /// Decode an LDR image (png, jpg, tga, ...)
    fn load(&self, path: &Path) -> Result<ImageData>;

    /// Decode a high dynamic range image as RGBA32F
    fn load_hdr(&self, path: &Path) -> Result<ImageData> {
        self.load(path)
    }
}

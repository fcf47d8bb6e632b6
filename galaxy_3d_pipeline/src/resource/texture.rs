/// Pool-side texture entry

use std::sync::Arc;
use crate::graphics_device::{DeviceTexture, DeviceView, TextureFormat, TextureUsage};

/// A texture registered in the resource pool
///
/// Owns the backing image plus its shader-resource and read-write views.
/// Array and cube textures also keep one view per slice; slice 0 is the
/// same view as `srv` / `uav`. Cloning shares the device objects.
#[derive(Clone)]
pub struct Texture {
    /// File-derived or user name; empty for anonymous textures
    pub name: String,
    pub width: u32,
    pub height: u32,
    /// Allocated array slices (6 per cube)
    pub depth: u32,
    pub mip_count: u32,
    pub format: TextureFormat,
    pub usage: TextureUsage,
    pub is_cube_map: bool,
    pub(crate) backing: Arc<dyn DeviceTexture>,
    pub(crate) srv: Option<Arc<dyn DeviceView>>,
    pub(crate) uav: Option<Arc<dyn DeviceView>>,
    pub(crate) srv_slices: Vec<Arc<dyn DeviceView>>,
    pub(crate) uav_slices: Vec<Arc<dyn DeviceView>>,
}

impl Texture {
    pub fn backing(&self) -> &Arc<dyn DeviceTexture> {
        &self.backing
    }

    /// Shader-resource view of the whole texture
    pub fn srv(&self) -> Option<&Arc<dyn DeviceView>> {
        self.srv.as_ref()
    }

    pub fn uav(&self) -> Option<&Arc<dyn DeviceView>> {
        self.uav.as_ref()
    }

    /// Shader-resource view starting at `slice`; falls back to the main view
    /// for non-array textures
    pub fn srv_slice(&self, slice: u32) -> Option<&Arc<dyn DeviceView>> {
        if self.srv_slices.is_empty() {
            return if slice == 0 { self.srv.as_ref() } else { None };
        }
        self.srv_slices.get(slice as usize)
    }

    pub fn uav_slice(&self, slice: u32) -> Option<&Arc<dyn DeviceView>> {
        if self.uav_slices.is_empty() {
            return if slice == 0 { self.uav.as_ref() } else { None };
        }
        self.uav_slices.get(slice as usize)
    }

    pub fn is_array(&self) -> bool {
        !self.srv_slices.is_empty()
    }

    /// Drop views first, then the backing resource
    pub(crate) fn release(mut self) {
        self.srv_slices.clear();
        self.uav_slices.clear();
        self.srv = None;
        self.uav = None;
        drop(self.backing);
    }
}

impl std::fmt::Debug for Texture {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Texture")
            .field("name", &self.name)
            .field("width", &self.width)
            .field("height", &self.height)
            .field("depth", &self.depth)
            .field("mip_count", &self.mip_count)
            .field("format", &self.format)
            .field("is_cube_map", &self.is_cube_map)
            .finish()
    }
}

/// Number of mips generated for a `width` x `height` image
///
/// `min(floor(log2 w), floor(log2 h))`, never less than one.
pub fn mip_count_for(width: u32, height: u32) -> u32 {
    let log2 = |value: u32| if value == 0 { 0 } else { value.ilog2() };
    log2(width).min(log2(height)).max(1)
}

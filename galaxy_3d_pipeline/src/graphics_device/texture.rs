/// Device texture trait, texture descriptor, and view types

use bitflags::bitflags;

/// API-independent pixel format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[allow(non_camel_case_types)]
pub enum TextureFormat {
    // Color formats
    R8G8B8A8_UNORM,
    R8G8B8A8_UNORM_SRGB,
    B8G8R8A8_UNORM,
    R10G10B10A2_UNORM,
    R11G11B10_FLOAT,
    R16G16B16A16_FLOAT,
    R32G32B32A32_FLOAT,
    R32G32_FLOAT,
    R16_FLOAT,
    R32_FLOAT,
    R8_UNORM,

    // Depth-capable typeless formats (views pick the interpretation)
    R24G8_TYPELESS,
    R24_UNORM_X8_TYPELESS,
    R32_TYPELESS,

    // Depth-stencil view formats
    D24_UNORM_S8_UINT,
    D32_FLOAT,
}

impl TextureFormat {
    /// Format used for a shader-resource view over a texture of this format
    ///
    /// Depth textures are allocated typeless; sampling them needs a concrete
    /// color interpretation of the depth bits.
    pub fn shader_resource_format(self) -> TextureFormat {
        match self {
            TextureFormat::R24G8_TYPELESS => TextureFormat::R24_UNORM_X8_TYPELESS,
            TextureFormat::R32_TYPELESS => TextureFormat::R32_FLOAT,
            other => other,
        }
    }

    /// Size of one texel in bytes
    pub fn bytes_per_pixel(self) -> u32 {
        match self {
            TextureFormat::R8_UNORM => 1,
            TextureFormat::R16_FLOAT => 2,
            TextureFormat::R8G8B8A8_UNORM
            | TextureFormat::R8G8B8A8_UNORM_SRGB
            | TextureFormat::B8G8R8A8_UNORM
            | TextureFormat::R10G10B10A2_UNORM
            | TextureFormat::R11G11B10_FLOAT
            | TextureFormat::R32_FLOAT
            | TextureFormat::R24G8_TYPELESS
            | TextureFormat::R24_UNORM_X8_TYPELESS
            | TextureFormat::R32_TYPELESS
            | TextureFormat::D24_UNORM_S8_UINT
            | TextureFormat::D32_FLOAT => 4,
            TextureFormat::R16G16B16A16_FLOAT | TextureFormat::R32G32_FLOAT => 8,
            TextureFormat::R32G32B32A32_FLOAT => 16,
        }
    }

    /// True for formats only usable through a depth-stencil view
    pub fn is_depth(self) -> bool {
        matches!(self, TextureFormat::D24_UNORM_S8_UINT | TextureFormat::D32_FLOAT)
    }
}

bitflags! {
    /// How a texture may be bound to the pipeline
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct TextureUsage: u32 {
        /// Sampled / read in shaders
        const SHADER_RESOURCE = 1 << 0;
        /// Color output of a draw
        const RENDER_TARGET = 1 << 1;
        /// Depth-stencil output of a draw
        const DEPTH_STENCIL = 1 << 2;
        /// Read-write access from shaders
        const UNORDERED_ACCESS = 1 << 3;

        /// Render target that is also sampled later
        const RENDER_TARGET_RW = Self::RENDER_TARGET.bits() | Self::SHADER_RESOURCE.bits();
        /// Compute output that is also sampled later
        const COMPUTE_RW = Self::UNORDERED_ACCESS.bits() | Self::SHADER_RESOURCE.bits();
    }
}

// ===== TEXTURE DATA =====

/// Initial pixel data uploaded at creation time
#[derive(Debug, Clone)]
pub enum TextureData {
    /// Tightly packed data for mip 0 of slice 0
    Single(Vec<u8>),
    /// One tightly packed mip-0 image per array slice, in slice order
    Slices(Vec<Vec<u8>>),
}

// ===== TEXTURE DESC =====

/// Descriptor for creating a texture
#[derive(Debug, Clone)]
pub struct TextureDesc {
    /// Debug name; textures created from files use the file name
    pub name: String,
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
    /// Pixel format
    pub format: TextureFormat,
    /// Usage flags
    pub usage: TextureUsage,
    /// Array slices (cube maps: number of cubes)
    pub array_size: u32,
    /// Mip levels
    pub mip_count: u32,
    /// Interpret slices as cube faces
    pub is_cube_map: bool,
    /// Allow `DeviceContext::generate_mips` on this texture
    pub generate_mips: bool,
    /// Optional initial data
    pub data: Option<TextureData>,
}

impl TextureDesc {
    /// Single-slice, single-mip shader resource with no initial data
    pub fn new_2d(width: u32, height: u32, format: TextureFormat) -> Self {
        Self {
            name: String::new(),
            width,
            height,
            format,
            usage: TextureUsage::SHADER_RESOURCE,
            array_size: 1,
            mip_count: 1,
            is_cube_map: false,
            generate_mips: false,
            data: None,
        }
    }

    /// Number of array slices actually allocated (cube maps carry 6 per cube)
    pub fn slice_count(&self) -> u32 {
        let array_size = self.array_size.max(1);
        if self.is_cube_map { 6 * array_size } else { array_size }
    }
}

// ===== TEXTURE INFO =====

/// Read-only properties of a created texture
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextureInfo {
    pub width: u32,
    pub height: u32,
    pub format: TextureFormat,
    pub usage: TextureUsage,
    /// Slices allocated (already multiplied by 6 for cube maps)
    pub slice_count: u32,
    pub mip_count: u32,
    pub is_cube_map: bool,
}

impl TextureInfo {
    /// Properties a device would report for a texture created from `desc`
    pub fn from_desc(desc: &TextureDesc) -> Self {
        Self {
            width: desc.width.max(1),
            height: desc.height.max(1),
            format: desc.format,
            usage: desc.usage,
            slice_count: desc.slice_count(),
            mip_count: desc.mip_count.max(1),
            is_cube_map: desc.is_cube_map,
        }
    }
}

// ===== TEXTURE TRAIT =====

/// Backing image resource
///
/// Implemented by backend-specific texture types. The resource is destroyed
/// when the last reference is dropped.
pub trait DeviceTexture: Send + Sync {
    /// Get the read-only properties of this texture
    fn info(&self) -> &TextureInfo;
}

// ===== VIEWS =====

/// What a view exposes its texture as
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ViewKind {
    ShaderResource,
    UnorderedAccess,
    RenderTarget,
    DepthStencil,
}

/// Shape of the subresource range a view covers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewDimension {
    Texture2D,
    Texture2DArray,
    TextureCube,
    TextureCubeArray,
}

/// Descriptor for creating a view over a texture
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewDesc {
    pub format: TextureFormat,
    pub dimension: ViewDimension,
    /// First array slice covered
    pub first_slice: u32,
    /// Number of slices covered
    pub array_size: u32,
    /// Most detailed mip (shader resource views) or target mip (others)
    pub first_mip: u32,
    /// Mip levels covered (shader resource views only)
    pub mip_count: u32,
}

impl ViewDesc {
    /// Whole-resource 2D view of mip 0
    pub fn texture_2d(format: TextureFormat) -> Self {
        Self {
            format,
            dimension: ViewDimension::Texture2D,
            first_slice: 0,
            array_size: 1,
            first_mip: 0,
            mip_count: 1,
        }
    }
}

/// View of a texture bound to one pipeline stage kind
pub trait DeviceView: Send + Sync {
    fn kind(&self) -> ViewKind;
    fn desc(&self) -> &ViewDesc;
}

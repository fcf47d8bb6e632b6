/// Sampler descriptor and sampler trait

use crate::graphics_device::CompareOp;

/// Texture filtering mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Filter {
    /// Nearest texel for min, mag and mip
    Point,
    /// Linear min, mag and mip
    Linear,
    /// Anisotropic filtering (`max_anisotropy` applies)
    Anisotropic,
}

/// Behavior for texture coordinates outside [0, 1]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddressMode {
    Wrap,
    Mirror,
    Clamp,
    Border,
}

/// Descriptor for creating a sampler
#[derive(Debug, Clone, PartialEq)]
pub struct SamplerDesc {
    pub filter: Filter,
    pub address_u: AddressMode,
    pub address_v: AddressMode,
    pub address_w: AddressMode,
    pub max_anisotropy: u32,
    pub mip_lod_bias: f32,
    pub min_lod: f32,
    pub max_lod: f32,
    /// Comparison sampler (shadow maps)
    pub compare: Option<CompareOp>,
}

impl SamplerDesc {
    /// Same address mode on every axis
    pub fn new(filter: Filter, address: AddressMode) -> Self {
        Self {
            filter,
            address_u: address,
            address_v: address,
            address_w: address,
            max_anisotropy: 1,
            mip_lod_bias: 0.0,
            min_lod: 0.0,
            max_lod: f32::MAX,
            compare: None,
        }
    }

    /// Anisotropic sampler with the given level
    pub fn anisotropic(level: u32, address: AddressMode) -> Self {
        Self {
            max_anisotropy: level,
            ..Self::new(Filter::Anisotropic, address)
        }
    }
}

impl Default for SamplerDesc {
    fn default() -> Self {
        Self::new(Filter::Linear, AddressMode::Wrap)
    }
}

/// Sampler object trait
pub trait DeviceSampler: Send + Sync {
    fn desc(&self) -> &SamplerDesc;
}

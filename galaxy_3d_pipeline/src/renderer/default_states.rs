/// Fixed-function states every renderer creates at start-up
///
/// Each enumeration indexes the handle list built by
/// `DefaultStates::create`, in declaration order.

use crate::error::{Error, Result};
use crate::graphics_device::{
    AddressMode, BlendDesc, CullMode, DepthStencilDesc, FillMode, Filter, FrontFace, RasterizerDesc, SamplerDesc,
};
use crate::handle::{BlendStateId, DepthStencilStateId, RasterizerStateId, SamplerId};
use crate::resource::ResourcePool;
use crate::engine_error;

const SOURCE: &str = "galaxy3d::DefaultStates";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DefaultRasterizerState {
    CullBack,
    CullFront,
    CullNone,
    Wireframe,
}

impl DefaultRasterizerState {
    pub const ALL: [DefaultRasterizerState; 4] = [
        DefaultRasterizerState::CullBack,
        DefaultRasterizerState::CullFront,
        DefaultRasterizerState::CullNone,
        DefaultRasterizerState::Wireframe,
    ];

    pub fn desc(self) -> RasterizerDesc {
        let (cull_mode, fill_mode) = match self {
            DefaultRasterizerState::CullBack => (CullMode::Back, FillMode::Solid),
            DefaultRasterizerState::CullFront => (CullMode::Front, FillMode::Solid),
            DefaultRasterizerState::CullNone => (CullMode::None, FillMode::Solid),
            DefaultRasterizerState::Wireframe => (CullMode::None, FillMode::Wireframe),
        };
        RasterizerDesc {
            front_face: FrontFace::Clockwise,
            depth_clip: true,
            ..RasterizerDesc::new(cull_mode, fill_mode)
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DefaultBlendState {
    AdditiveColor,
    AlphaBlend,
    Disabled,
}

impl DefaultBlendState {
    pub const ALL: [DefaultBlendState; 3] = [
        DefaultBlendState::AdditiveColor,
        DefaultBlendState::AlphaBlend,
        DefaultBlendState::Disabled,
    ];

    pub fn desc(self) -> BlendDesc {
        match self {
            DefaultBlendState::AdditiveColor => BlendDesc::additive(),
            DefaultBlendState::AlphaBlend => BlendDesc::alpha_blend(),
            DefaultBlendState::Disabled => BlendDesc::disabled(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DefaultSamplerState {
    /// Linear, wrapped, top mip only
    Wrap,
    /// Point, clamped, top mip only
    Point,
    LinearWrapUvw,
    /// Linear, clamped
    Linear,
    Anisotropic1Clamp,
    Anisotropic2Clamp,
    Anisotropic4Clamp,
    Anisotropic16Clamp,
    Anisotropic1Wrap,
    Anisotropic2Wrap,
    Anisotropic4Wrap,
    Anisotropic16Wrap,
}

impl DefaultSamplerState {
    pub const ALL: [DefaultSamplerState; 12] = [
        DefaultSamplerState::Wrap,
        DefaultSamplerState::Point,
        DefaultSamplerState::LinearWrapUvw,
        DefaultSamplerState::Linear,
        DefaultSamplerState::Anisotropic1Clamp,
        DefaultSamplerState::Anisotropic2Clamp,
        DefaultSamplerState::Anisotropic4Clamp,
        DefaultSamplerState::Anisotropic16Clamp,
        DefaultSamplerState::Anisotropic1Wrap,
        DefaultSamplerState::Anisotropic2Wrap,
        DefaultSamplerState::Anisotropic4Wrap,
        DefaultSamplerState::Anisotropic16Wrap,
    ];

    /// Sampler descriptor, with anisotropy clamped to `max_anisotropy`
    pub fn desc(self, max_anisotropy: u32) -> SamplerDesc {
        let anisotropic = |level: u32, address| SamplerDesc::anisotropic(level.min(max_anisotropy).max(1), address);
        match self {
            DefaultSamplerState::Wrap => SamplerDesc { max_lod: 0.0, ..SamplerDesc::new(Filter::Linear, AddressMode::Wrap) },
            DefaultSamplerState::Point => SamplerDesc { max_lod: 0.0, ..SamplerDesc::new(Filter::Point, AddressMode::Clamp) },
            DefaultSamplerState::LinearWrapUvw => SamplerDesc::new(Filter::Linear, AddressMode::Wrap),
            DefaultSamplerState::Linear => SamplerDesc::new(Filter::Linear, AddressMode::Clamp),
            DefaultSamplerState::Anisotropic1Clamp => anisotropic(1, AddressMode::Clamp),
            DefaultSamplerState::Anisotropic2Clamp => anisotropic(2, AddressMode::Clamp),
            DefaultSamplerState::Anisotropic4Clamp => anisotropic(4, AddressMode::Clamp),
            DefaultSamplerState::Anisotropic16Clamp => anisotropic(16, AddressMode::Clamp),
            DefaultSamplerState::Anisotropic1Wrap => anisotropic(1, AddressMode::Wrap),
            DefaultSamplerState::Anisotropic2Wrap => anisotropic(2, AddressMode::Wrap),
            DefaultSamplerState::Anisotropic4Wrap => anisotropic(4, AddressMode::Wrap),
            DefaultSamplerState::Anisotropic16Wrap => anisotropic(16, AddressMode::Wrap),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DefaultDepthStencilState {
    DepthStencilWrite,
    DepthStencilDisabled,
    DepthWrite,
    StencilWrite,
    /// Depth test against the existing buffer without writing it
    DepthTestOnly,
}

impl DefaultDepthStencilState {
    pub const ALL: [DefaultDepthStencilState; 5] = [
        DefaultDepthStencilState::DepthStencilWrite,
        DefaultDepthStencilState::DepthStencilDisabled,
        DefaultDepthStencilState::DepthWrite,
        DefaultDepthStencilState::StencilWrite,
        DefaultDepthStencilState::DepthTestOnly,
    ];

    pub fn desc(self) -> DepthStencilDesc {
        match self {
            DefaultDepthStencilState::DepthStencilWrite => DepthStencilDesc::new(true, true),
            DefaultDepthStencilState::DepthStencilDisabled => DepthStencilDesc::new(false, false),
            DefaultDepthStencilState::DepthWrite => DepthStencilDesc::new(true, false),
            DefaultDepthStencilState::StencilWrite => DepthStencilDesc::new(false, true),
            DefaultDepthStencilState::DepthTestOnly => DepthStencilDesc {
                depth_write_enable: false,
                ..DepthStencilDesc::new(true, true)
            },
        }
    }
}

/// Handles of the default states, indexed by the enumerations above
#[derive(Debug, Clone, Default)]
pub struct DefaultStates {
    rasterizer: Vec<RasterizerStateId>,
    blend: Vec<BlendStateId>,
    samplers: Vec<SamplerId>,
    depth_stencil: Vec<DepthStencilStateId>,
}

impl DefaultStates {
    /// Create every default state in `pool`
    ///
    /// Rasterizer, blend and sampler failures are logged and leave an
    /// `INVALID` entry. A depth-stencil failure aborts initialization.
    pub fn create(pool: &mut ResourcePool, max_anisotropy: u32) -> Result<Self> {
        let rasterizer = DefaultRasterizerState::ALL
            .iter()
            .map(|state| pool.create_rasterizer_state(&state.desc()))
            .collect();
        let blend = DefaultBlendState::ALL.iter().map(|state| pool.create_blend_state(&state.desc())).collect();
        let samplers = DefaultSamplerState::ALL
            .iter()
            .map(|state| pool.create_sampler(&state.desc(max_anisotropy)))
            .collect();

        let mut depth_stencil = Vec::with_capacity(DefaultDepthStencilState::ALL.len());
        for state in DefaultDepthStencilState::ALL {
            let id = pool.create_depth_stencil_state(&state.desc());
            if !id.is_valid() {
                let message = format!("Unable to create default depth-stencil state {:?}", state);
                engine_error!(SOURCE, "{}", message);
                return Err(Error::InitializationFailed(message));
            }
            depth_stencil.push(id);
        }

        Ok(Self { rasterizer, blend, samplers, depth_stencil })
    }

    pub fn rasterizer(&self, state: DefaultRasterizerState) -> RasterizerStateId {
        self.rasterizer.get(state as usize).copied().unwrap_or_else(|| missing(state))
    }

    pub fn blend(&self, state: DefaultBlendState) -> BlendStateId {
        self.blend.get(state as usize).copied().unwrap_or_else(|| missing(state))
    }

    pub fn sampler(&self, state: DefaultSamplerState) -> SamplerId {
        self.samplers.get(state as usize).copied().unwrap_or_else(|| missing(state))
    }

    pub fn depth_stencil(&self, state: DefaultDepthStencilState) -> DepthStencilStateId {
        self.depth_stencil.get(state as usize).copied().unwrap_or_else(|| missing(state))
    }
}

fn missing<S: std::fmt::Debug, H: Default>(state: S) -> H {
    engine_error!(SOURCE, "Default state {:?} was never created", state);
    H::default()
}

/// Fixed-function state descriptors and state object traits

// ===== RASTERIZATION ENUMS =====

/// Face culling mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CullMode {
    /// No culling
    None,
    /// Cull front faces
    Front,
    /// Cull back faces
    Back,
}

/// Front face winding order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrontFace {
    CounterClockwise,
    Clockwise,
}

/// Polygon fill mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FillMode {
    /// Fill polygons
    Solid,
    /// Draw edges only
    Wireframe,
}

// ===== DEPTH/STENCIL ENUMS =====

/// Comparison operator for depth, stencil and sampler comparison tests
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    Never,
    Less,
    Equal,
    LessOrEqual,
    Greater,
    NotEqual,
    GreaterOrEqual,
    Always,
}

/// Stencil operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StencilOp {
    Keep,
    Zero,
    Replace,
    IncrementAndClamp,
    DecrementAndClamp,
    Invert,
    IncrementAndWrap,
    DecrementAndWrap,
}

// ===== COLOR BLEND ENUMS =====

/// Blend factor for color blending equations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlendFactor {
    Zero,
    One,
    SrcColor,
    OneMinusSrcColor,
    DstColor,
    OneMinusDstColor,
    SrcAlpha,
    OneMinusSrcAlpha,
    DstAlpha,
    OneMinusDstAlpha,
}

/// Blend operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlendOp {
    /// result = src * srcFactor + dst * dstFactor
    Add,
    /// result = src * srcFactor - dst * dstFactor
    Subtract,
    /// result = dst * dstFactor - src * srcFactor
    ReverseSubtract,
    /// result = min(src, dst)
    Min,
    /// result = max(src, dst)
    Max,
}

// ===== RASTERIZER STATE =====

/// Rasterizer fixed-function state
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RasterizerDesc {
    pub cull_mode: CullMode,
    pub fill_mode: FillMode,
    pub front_face: FrontFace,
    /// Clip geometry against the near/far planes
    pub depth_clip: bool,
    /// Discard pixels outside the scissor rectangle
    pub scissor: bool,
}

impl RasterizerDesc {
    pub fn new(cull_mode: CullMode, fill_mode: FillMode) -> Self {
        Self { cull_mode, fill_mode, ..Self::default() }
    }
}

impl Default for RasterizerDesc {
    fn default() -> Self {
        Self {
            cull_mode: CullMode::Back,
            fill_mode: FillMode::Solid,
            front_face: FrontFace::Clockwise,
            depth_clip: true,
            scissor: false,
        }
    }
}

// ===== DEPTH/STENCIL STATE =====

/// Stencil operation state (per-face)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StencilOpState {
    /// Action on stencil test fail
    pub fail_op: StencilOp,
    /// Action on stencil pass + depth pass
    pub pass_op: StencilOp,
    /// Action on stencil pass + depth fail
    pub depth_fail_op: StencilOp,
    /// Comparison operator
    pub compare_op: CompareOp,
}

impl Default for StencilOpState {
    fn default() -> Self {
        Self {
            fail_op: StencilOp::Keep,
            pass_op: StencilOp::Keep,
            depth_fail_op: StencilOp::Keep,
            compare_op: CompareOp::Always,
        }
    }
}

/// Depth and stencil testing state
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DepthStencilDesc {
    pub depth_test_enable: bool,
    pub depth_write_enable: bool,
    pub depth_compare_op: CompareOp,
    pub stencil_test_enable: bool,
    pub stencil_read_mask: u8,
    pub stencil_write_mask: u8,
    pub front: StencilOpState,
    pub back: StencilOpState,
}

impl DepthStencilDesc {
    /// Depth and stencil toggles with the engine's stock operations:
    /// less-or-equal depth test, stencil incremented on front-face depth
    /// fail and decremented on back-face depth fail.
    pub fn new(depth: bool, stencil: bool) -> Self {
        Self {
            depth_test_enable: depth,
            depth_write_enable: true,
            depth_compare_op: CompareOp::LessOrEqual,
            stencil_test_enable: stencil,
            stencil_read_mask: 0xFF,
            stencil_write_mask: 0xFF,
            front: StencilOpState {
                depth_fail_op: StencilOp::IncrementAndWrap,
                ..StencilOpState::default()
            },
            back: StencilOpState {
                depth_fail_op: StencilOp::DecrementAndWrap,
                ..StencilOpState::default()
            },
        }
    }
}

impl Default for DepthStencilDesc {
    fn default() -> Self {
        Self::new(true, false)
    }
}

// ===== BLEND STATE =====

/// Color blending state for render target 0
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BlendDesc {
    pub blend_enable: bool,
    pub src_color_factor: BlendFactor,
    pub dst_color_factor: BlendFactor,
    pub color_blend_op: BlendOp,
    pub src_alpha_factor: BlendFactor,
    pub dst_alpha_factor: BlendFactor,
    pub alpha_blend_op: BlendOp,
    /// RGBA write mask, bit 0 = red
    pub write_mask: u8,
}

impl BlendDesc {
    /// Blending disabled, all channels written
    pub fn disabled() -> Self {
        Self {
            blend_enable: false,
            src_color_factor: BlendFactor::One,
            dst_color_factor: BlendFactor::Zero,
            color_blend_op: BlendOp::Add,
            src_alpha_factor: BlendFactor::One,
            dst_alpha_factor: BlendFactor::Zero,
            alpha_blend_op: BlendOp::Add,
            write_mask: 0xF,
        }
    }

    /// dst += src for color; alpha keeps the minimum
    pub fn additive() -> Self {
        Self {
            blend_enable: true,
            src_color_factor: BlendFactor::One,
            dst_color_factor: BlendFactor::One,
            src_alpha_factor: BlendFactor::SrcAlpha,
            dst_alpha_factor: BlendFactor::DstAlpha,
            alpha_blend_op: BlendOp::Min,
            ..Self::disabled()
        }
    }

    /// Classic `src * a + dst * (1 - a)`
    pub fn alpha_blend() -> Self {
        Self {
            blend_enable: true,
            src_color_factor: BlendFactor::SrcAlpha,
            dst_color_factor: BlendFactor::OneMinusSrcAlpha,
            ..Self::disabled()
        }
    }
}

impl Default for BlendDesc {
    fn default() -> Self {
        Self::disabled()
    }
}

// ===== STATE OBJECT TRAITS =====

/// Immutable rasterizer state object
pub trait DeviceRasterizerState: Send + Sync {
    fn desc(&self) -> &RasterizerDesc;
}

/// Immutable blend state object
pub trait DeviceBlendState: Send + Sync {
    fn desc(&self) -> &BlendDesc;
}

/// Immutable depth-stencil state object
pub trait DeviceDepthStencilState: Send + Sync {
    fn desc(&self) -> &DepthStencilDesc;
}

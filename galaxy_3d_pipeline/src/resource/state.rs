/// Pool-side sampler and fixed-function state entries
///
/// These are immutable once created and only released at shutdown.

use std::sync::Arc;
use crate::graphics_device::{
    DeviceSampler, DeviceRasterizerState, DeviceBlendState, DeviceDepthStencilState,
    SamplerDesc, RasterizerDesc, BlendDesc, DepthStencilDesc,
};

#[derive(Clone)]
pub struct Sampler {
    pub desc: SamplerDesc,
    pub(crate) backing: Arc<dyn DeviceSampler>,
}

impl Sampler {
    pub fn backing(&self) -> &Arc<dyn DeviceSampler> {
        &self.backing
    }
}

#[derive(Clone)]
pub struct RasterizerState {
    pub desc: RasterizerDesc,
    pub(crate) backing: Arc<dyn DeviceRasterizerState>,
}

impl RasterizerState {
    pub fn backing(&self) -> &Arc<dyn DeviceRasterizerState> {
        &self.backing
    }
}

#[derive(Clone)]
pub struct BlendState {
    pub desc: BlendDesc,
    pub(crate) backing: Arc<dyn DeviceBlendState>,
}

impl BlendState {
    pub fn backing(&self) -> &Arc<dyn DeviceBlendState> {
        &self.backing
    }
}

#[derive(Clone)]
pub struct DepthStencilState {
    pub desc: DepthStencilDesc,
    pub(crate) backing: Arc<dyn DeviceDepthStencilState>,
}

impl DepthStencilState {
    pub fn backing(&self) -> &Arc<dyn DeviceDepthStencilState> {
        &self.backing
    }
}

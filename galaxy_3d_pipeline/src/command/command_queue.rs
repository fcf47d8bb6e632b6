/// Deferred texture and sampler bindings
///
/// Binding calls between two draws only record intent. Names are resolved
/// against the selected shader when the command is queued; resource handles
/// are resolved to device views when the queue is flushed right before the
/// draw. Commands reach the device in insertion order and the queue is empty
/// afterwards.

use std::sync::Arc;

use crate::error::Result;
use crate::graphics_device::{DeviceView, DeviceSampler, ShaderStage};
use crate::handle::{TextureId, SamplerId};
use crate::resource::ResourcePool;
use crate::shader::{Shader, ShaderBinding};
use crate::utils::lock;
use crate::{engine_error, engine_warn};

const SOURCE: &str = "galaxy3d::CommandQueue";

/// Maximum number of textures bound through one texture array command
pub const TEXTURE_ARRAY_SIZE: usize = 32;

// ============================================================================
// Commands
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BindCommand {
    /// Shader-resource view of a texture, or of one of its array slices
    Texture {
        binding: ShaderBinding,
        texture: TextureId,
        slice: Option<u32>,
    },
    /// Consecutive shader-resource views starting at the binding's slot
    TextureArray {
        binding: ShaderBinding,
        textures: Vec<TextureId>,
    },
    /// Read-write view of a texture
    RwTexture {
        binding: ShaderBinding,
        texture: TextureId,
    },
    Sampler {
        binding: ShaderBinding,
        sampler: SamplerId,
    },
}

impl BindCommand {
    pub fn binding(&self) -> ShaderBinding {
        match self {
            BindCommand::Texture { binding, .. }
            | BindCommand::TextureArray { binding, .. }
            | BindCommand::RwTexture { binding, .. }
            | BindCommand::Sampler { binding, .. } => *binding,
        }
    }
}

/// A command with its device objects looked up
enum ResolvedBind {
    ShaderResources(ShaderStage, u32, Vec<Arc<dyn DeviceView>>),
    UnorderedAccess(ShaderStage, u32, Arc<dyn DeviceView>),
    Sampler(ShaderStage, u32, Arc<dyn DeviceSampler>),
}

// ============================================================================
// Queue
// ============================================================================

#[derive(Debug, Default)]
pub struct CommandQueue {
    commands: Vec<BindCommand>,
}

impl CommandQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn commands(&self) -> &[BindCommand] {
        &self.commands
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    pub fn clear(&mut self) {
        self.commands.clear();
    }

    // ===== RECORDING =====

    /// Queue `texture` for every stage declaring a texture called `name`
    pub fn set_texture(&mut self, shader: &Shader, name: &str, texture: TextureId) -> bool {
        self.push_texture(shader, name, texture, None)
    }

    /// Queue the view of `texture` starting at array slice `slice`
    pub fn set_texture_slice(&mut self, shader: &Shader, name: &str, texture: TextureId, slice: u32) -> bool {
        self.push_texture(shader, name, texture, Some(slice))
    }

    fn push_texture(&mut self, shader: &Shader, name: &str, texture: TextureId, slice: Option<u32>) -> bool {
        let Some(bindings) = shader.texture_binding(name) else {
            engine_error!(SOURCE, "Texture not found: \"{}\" in shader '{}'", name, shader.name());
            return false;
        };
        self.commands.extend(
            bindings.iter().map(|&binding| BindCommand::Texture { binding, texture, slice }),
        );
        true
    }

    /// Queue the first `count` textures as an array binding
    pub fn set_texture_array(&mut self, shader: &Shader, name: &str, textures: &[TextureId], count: usize) -> bool {
        let Some(bindings) = shader.texture_binding(name) else {
            engine_error!(SOURCE, "Texture array not found: \"{}\" in shader '{}'", name, shader.name());
            return false;
        };
        let mut count = count.min(textures.len());
        if count > TEXTURE_ARRAY_SIZE {
            engine_warn!(
                SOURCE,
                "Texture array \"{}\" truncated from {} to {} entries",
                name, count, TEXTURE_ARRAY_SIZE
            );
            count = TEXTURE_ARRAY_SIZE;
        }
        let textures = textures[..count].to_vec();
        self.commands.extend(bindings.iter().map(|&binding| BindCommand::TextureArray {
            binding,
            textures: textures.clone(),
        }));
        true
    }

    pub fn set_rw_texture(&mut self, shader: &Shader, name: &str, texture: TextureId) -> bool {
        let Some(bindings) = shader.rw_texture_binding(name) else {
            engine_error!(SOURCE, "RW texture not found: \"{}\" in shader '{}'", name, shader.name());
            return false;
        };
        self.commands.extend(bindings.iter().map(|&binding| BindCommand::RwTexture { binding, texture }));
        true
    }

    pub fn set_sampler_state(&mut self, shader: &Shader, name: &str, sampler: SamplerId) -> bool {
        let Some(bindings) = shader.sampler_binding(name) else {
            engine_error!(SOURCE, "Sampler not found: \"{}\" in shader '{}'", name, shader.name());
            return false;
        };
        self.commands.extend(bindings.iter().map(|&binding| BindCommand::Sampler { binding, sampler }));
        true
    }

    // ===== FLUSH =====

    /// Resolve and submit every queued command, in order, then clear
    ///
    /// Texture views are looked up before the device lock is taken.
    /// Commands naming a released or view-less resource are logged and
    /// skipped. Returns the number of commands submitted.
    pub fn flush(&mut self, pool: &ResourcePool) -> Result<usize> {
        let commands = std::mem::take(&mut self.commands);
        let resolved: Vec<ResolvedBind> = commands.iter().filter_map(|command| resolve(pool, command)).collect();

        let mut device = lock(pool.device());
        let context = device.context();
        for bind in &resolved {
            match bind {
                ResolvedBind::ShaderResources(stage, slot, views) => context.set_shader_resources(*stage, *slot, views)?,
                ResolvedBind::UnorderedAccess(stage, slot, view) => context.set_unordered_access(*stage, *slot, view)?,
                ResolvedBind::Sampler(stage, slot, sampler) => context.set_sampler(*stage, *slot, sampler)?,
            }
        }
        Ok(resolved.len())
    }
}

fn shader_view(pool: &ResourcePool, texture: TextureId, slice: Option<u32>) -> Option<Arc<dyn DeviceView>> {
    let view = pool.with_texture(texture, |entry| match slice {
        Some(slice) => entry.srv_slice(slice).cloned(),
        None => entry.srv().cloned(),
    });
    match view {
        Some(Some(view)) => Some(view),
        Some(None) => {
            engine_error!(SOURCE, "Texture {} has no shader resource view (slice {:?})", texture, slice);
            None
        }
        None => {
            engine_error!(SOURCE, "Binding a texture that is not live: {}", texture);
            None
        }
    }
}

fn resolve(pool: &ResourcePool, command: &BindCommand) -> Option<ResolvedBind> {
    match command {
        BindCommand::Texture { binding, texture, slice } => {
            let view = shader_view(pool, *texture, *slice)?;
            Some(ResolvedBind::ShaderResources(binding.stage, binding.slot, vec![view]))
        }
        BindCommand::TextureArray { binding, textures } => {
            let views = textures
                .iter()
                .map(|&texture| shader_view(pool, texture, None))
                .collect::<Option<Vec<_>>>()?;
            Some(ResolvedBind::ShaderResources(binding.stage, binding.slot, views))
        }
        BindCommand::RwTexture { binding, texture } => {
            match pool.with_texture(*texture, |entry| entry.uav().cloned()) {
                Some(Some(view)) => Some(ResolvedBind::UnorderedAccess(binding.stage, binding.slot, view)),
                Some(None) => {
                    engine_error!(SOURCE, "Texture {} has no unordered access view", texture);
                    None
                }
                None => {
                    engine_error!(SOURCE, "Binding a texture that is not live: {}", texture);
                    None
                }
            }
        }
        BindCommand::Sampler { binding, sampler } => match pool.try_sampler(*sampler) {
            Some(entry) => Some(ResolvedBind::Sampler(binding.stage, binding.slot, entry.backing().clone())),
            None => {
                engine_error!(SOURCE, "Binding a sampler that is not live: {}", sampler);
                None
            }
        },
    }
}

#[cfg(test)]
#[path = "command_queue_tests.rs"]
mod tests;

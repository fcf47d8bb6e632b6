/// Shader program plus its constant and binding tables
///
/// Built from the reflection data the device reports for a compiled
/// program:
/// - one device constant buffer per reflected constant buffer, with a dirty
///   flag
/// - one CPU shadow per distinct `(name, size)` constant
/// - a `(buffer slot, constant id, offset)` mapping list sorted by constant
///   name, so a name shared by several buffers resolves to every buffer
/// - name to `(stage, slot)` tables for textures, read-write textures and
///   samplers

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::SystemTime;
use rustc_hash::FxHashMap;

use crate::error::Result;
use crate::graphics_device::{
    GraphicsDevice, DeviceShader, DeviceBuffer, BufferDesc, ShaderDesc, ShaderStage,
    ShaderReflection, ReflectedBinding,
};
use crate::{engine_debug, engine_error, engine_warn};

const SOURCE: &str = "galaxy3d::Shader";

// ============================================================================
// Tables
// ============================================================================

/// Where one constant lives inside one device constant buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConstantMapping {
    /// Index into the shader's constant buffer list
    pub buffer_slot: usize,
    /// Index into the shader's CPU shadow list
    pub constant_id: usize,
    /// Byte offset inside the constant buffer
    pub offset: u32,
    /// Bytes this buffer reserves for the constant
    pub size: u32,
}

/// CPU-side copy of a constant's value
#[derive(Debug, Clone)]
pub struct CpuConstant {
    pub name: String,
    pub size: u32,
    pub data: Vec<u8>,
}

/// A device constant buffer and the stage slot it binds to
pub struct ConstantBuffer {
    pub name: String,
    pub stage: ShaderStage,
    pub slot: u32,
    pub size: u32,
    pub(crate) backing: Arc<dyn DeviceBuffer>,
    pub(crate) dirty: bool,
}

impl ConstantBuffer {
    pub fn backing(&self) -> &Arc<dyn DeviceBuffer> {
        &self.backing
    }

    /// True when a constant changed since the last upload
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }
}

/// Stage and register a named resource binds to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShaderBinding {
    pub stage: ShaderStage,
    pub slot: u32,
}

type BindingTable = FxHashMap<String, Vec<ShaderBinding>>;

fn binding_table(bindings: &[ReflectedBinding]) -> BindingTable {
    let mut table = BindingTable::default();
    for binding in bindings {
        table
            .entry(binding.name.clone())
            .or_default()
            .push(ShaderBinding { stage: binding.stage, slot: binding.slot });
    }
    table
}

fn modified_time(path: &Path) -> Option<SystemTime> {
    std::fs::metadata(path).and_then(|metadata| metadata.modified()).ok()
}

// ============================================================================
// Shader
// ============================================================================

pub struct Shader {
    desc: ShaderDesc,
    program: Arc<dyn DeviceShader>,
    pub(crate) constant_buffers: Vec<ConstantBuffer>,
    pub(crate) cpu_constants: Vec<CpuConstant>,
    pub(crate) mappings: Vec<ConstantMapping>,
    textures: BindingTable,
    rw_textures: BindingTable,
    samplers: BindingTable,
    source_times: Vec<(PathBuf, Option<SystemTime>)>,
}

impl Shader {
    /// Compile `desc` on `device` and build the constant and binding tables
    pub fn new(device: &mut dyn GraphicsDevice, desc: &ShaderDesc) -> Result<Self> {
        let program = device.compile_shader(desc)?;
        let reflection = program.reflection().clone();

        let mut constant_buffers = Vec::with_capacity(reflection.constant_buffers.len());
        let mut cpu_constants: Vec<CpuConstant> = Vec::new();
        let mut mappings = Vec::new();

        for (buffer_slot, buffer) in reflection.constant_buffers.iter().enumerate() {
            let backing = device.create_buffer(&BufferDesc::constant(buffer.size))?;
            constant_buffers.push(ConstantBuffer {
                name: buffer.name.clone(),
                stage: buffer.stage,
                slot: buffer.slot,
                size: buffer.size,
                backing,
                dirty: false,
            });

            for member in &buffer.members {
                let constant_id = match cpu_constants.iter().position(|constant| constant.name == member.name) {
                    Some(id) => {
                        let constant = &mut cpu_constants[id];
                        if constant.size != member.size {
                            engine_warn!(
                                SOURCE,
                                "Constant \"{}\" declared with {} and {} bytes in shader '{}'",
                                member.name, constant.size, member.size, desc.name
                            );
                            constant.size = constant.size.max(member.size);
                            constant.data.resize(constant.size as usize, 0);
                        }
                        id
                    }
                    None => {
                        cpu_constants.push(CpuConstant {
                            name: member.name.clone(),
                            size: member.size,
                            data: vec![0; member.size as usize],
                        });
                        cpu_constants.len() - 1
                    }
                };
                mappings.push(ConstantMapping { buffer_slot, constant_id, offset: member.offset, size: member.size });
            }
        }
        mappings.sort_by(|a, b| cpu_constants[a.constant_id].name.cmp(&cpu_constants[b.constant_id].name));

        let source_times = desc
            .stages
            .iter()
            .map(|stage| (stage.path.clone(), modified_time(&stage.path)))
            .collect();

        engine_debug!(
            SOURCE,
            "Shader '{}': {} constant buffers, {} constants, {} textures, {} samplers",
            desc.name, constant_buffers.len(), cpu_constants.len(),
            reflection.textures.len(), reflection.samplers.len()
        );

        Ok(Self {
            desc: desc.clone(),
            program,
            constant_buffers,
            cpu_constants,
            mappings,
            textures: binding_table(&reflection.textures),
            rw_textures: binding_table(&reflection.rw_textures),
            samplers: binding_table(&reflection.samplers),
            source_times,
        })
    }

    pub fn name(&self) -> &str {
        &self.desc.name
    }

    pub fn desc(&self) -> &ShaderDesc {
        &self.desc
    }

    pub fn program(&self) -> &Arc<dyn DeviceShader> {
        &self.program
    }

    pub fn reflection(&self) -> &ShaderReflection {
        self.program.reflection()
    }

    pub fn stages(&self) -> Vec<ShaderStage> {
        self.program.stages()
    }

    // ===== CONSTANTS =====

    pub fn constant_buffers(&self) -> &[ConstantBuffer] {
        &self.constant_buffers
    }

    /// CPU shadows, in first-declaration order
    pub fn cpu_constants(&self) -> &[CpuConstant] {
        &self.cpu_constants
    }

    /// Mapping list, sorted by constant name
    pub fn constant_mappings(&self) -> &[ConstantMapping] {
        &self.mappings
    }

    /// Current shadow value of the first constant called `name`
    pub fn constant_data(&self, name: &str) -> Option<&[u8]> {
        self.cpu_constants
            .iter()
            .find(|constant| constant.name == name)
            .map(|constant| constant.data.as_slice())
    }

    pub fn constant_name(&self, mapping: &ConstantMapping) -> &str {
        &self.cpu_constants[mapping.constant_id].name
    }

    // ===== BINDINGS =====

    pub fn has_texture_binding(&self, name: &str) -> bool {
        self.textures.contains_key(name)
    }

    pub fn texture_binding(&self, name: &str) -> Option<&[ShaderBinding]> {
        self.textures.get(name).map(Vec::as_slice)
    }

    pub fn has_rw_texture_binding(&self, name: &str) -> bool {
        self.rw_textures.contains_key(name)
    }

    pub fn rw_texture_binding(&self, name: &str) -> Option<&[ShaderBinding]> {
        self.rw_textures.get(name).map(Vec::as_slice)
    }

    pub fn has_sampler_binding(&self, name: &str) -> bool {
        self.samplers.contains_key(name)
    }

    pub fn sampler_binding(&self, name: &str) -> Option<&[ShaderBinding]> {
        self.samplers.get(name).map(Vec::as_slice)
    }

    // ===== HOT RELOAD =====

    /// True when any stage source file is newer than when it was compiled
    ///
    /// Stage files that cannot be read are ignored.
    pub fn has_source_file_been_updated(&self) -> bool {
        self.source_times.iter().any(|(path, compiled)| match (modified_time(path), compiled) {
            (Some(now), Some(then)) => now > *then,
            (Some(_), None) => true,
            (None, _) => false,
        })
    }

    /// Recompile from the same descriptor
    ///
    /// On failure the current program and tables stay in place and false is
    /// returned.
    pub fn reload(&mut self, device: &mut dyn GraphicsDevice) -> bool {
        let desc = self.desc.clone();
        self.reload_from(device, &desc)
    }

    /// Recompile from a new descriptor
    pub fn reload_from(&mut self, device: &mut dyn GraphicsDevice, desc: &ShaderDesc) -> bool {
        match Shader::new(device, desc) {
            Ok(shader) => {
                *self = shader;
                true
            }
            Err(e) => {
                engine_error!(SOURCE, "Cannot reload shader '{}': {}", desc.name, e);
                false
            }
        }
    }
}

impl std::fmt::Debug for Shader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Shader")
            .field("name", &self.desc.name)
            .field("constant_buffers", &self.constant_buffers.len())
            .field("constants", &self.cpu_constants.len())
            .finish()
    }
}

#[cfg(test)]
#[path = "shader_tests.rs"]
mod tests;

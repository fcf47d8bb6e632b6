/// Shader stage, shader descriptor and reflection data

use std::path::PathBuf;

/// Shader stage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ShaderStage {
    Vertex,
    Hull,
    Domain,
    Geometry,
    Pixel,
    Compute,
}

impl ShaderStage {
    /// Every stage, in pipeline order
    pub const ALL: [ShaderStage; 6] = [
        ShaderStage::Vertex,
        ShaderStage::Hull,
        ShaderStage::Domain,
        ShaderStage::Geometry,
        ShaderStage::Pixel,
        ShaderStage::Compute,
    ];
}

/// One stage of a shader program and the source file it is compiled from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShaderStageDesc {
    pub stage: ShaderStage,
    /// Source path, already resolved against the shader root
    pub path: PathBuf,
}

/// Descriptor for creating a shader program
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShaderDesc {
    /// Program name; devices use it for reflection lookups and debug names
    pub name: String,
    pub stages: Vec<ShaderStageDesc>,
}

impl ShaderDesc {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into(), stages: Vec::new() }
    }

    /// Builder-style stage addition
    pub fn with_stage(mut self, stage: ShaderStage, path: impl Into<PathBuf>) -> Self {
        self.stages.push(ShaderStageDesc { stage, path: path.into() });
        self
    }
}

// ===== REFLECTION =====

/// A named variable inside a constant buffer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReflectedConstant {
    pub name: String,
    /// Byte offset inside the buffer
    pub offset: u32,
    /// Size in bytes
    pub size: u32,
}

/// A constant buffer declared by one stage
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReflectedConstantBuffer {
    pub name: String,
    pub stage: ShaderStage,
    /// Register slot
    pub slot: u32,
    /// Total size in bytes
    pub size: u32,
    pub members: Vec<ReflectedConstant>,
}

/// A texture, read-write texture or sampler binding declared by one stage
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReflectedBinding {
    pub name: String,
    pub stage: ShaderStage,
    pub slot: u32,
}

/// Everything the renderer needs to know about a compiled program's
/// resource interface
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ShaderReflection {
    pub constant_buffers: Vec<ReflectedConstantBuffer>,
    pub textures: Vec<ReflectedBinding>,
    pub rw_textures: Vec<ReflectedBinding>,
    pub samplers: Vec<ReflectedBinding>,
}

impl ShaderReflection {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Builder-style constant buffer declaration.
    ///
    /// `members` are `(name, size)` pairs laid out back to back; the buffer
    /// size is rounded up to 16 bytes.
    pub fn with_constant_buffer(
        mut self,
        stage: ShaderStage,
        slot: u32,
        members: &[(&str, u32)],
    ) -> Self {
        let mut offset = 0;
        let members: Vec<ReflectedConstant> = members
            .iter()
            .map(|&(name, size)| {
                let constant = ReflectedConstant { name: name.to_string(), offset, size };
                offset += size;
                constant
            })
            .collect();
        let size = offset.div_ceil(16).max(1) * 16;
        self.constant_buffers.push(ReflectedConstantBuffer {
            name: format!("cb{}", self.constant_buffers.len()),
            stage,
            slot,
            size,
            members,
        });
        self
    }

    pub fn with_texture(mut self, stage: ShaderStage, slot: u32, name: &str) -> Self {
        self.textures.push(ReflectedBinding { name: name.to_string(), stage, slot });
        self
    }

    pub fn with_rw_texture(mut self, stage: ShaderStage, slot: u32, name: &str) -> Self {
        self.rw_textures.push(ReflectedBinding { name: name.to_string(), stage, slot });
        self
    }

    pub fn with_sampler(mut self, stage: ShaderStage, slot: u32, name: &str) -> Self {
        self.samplers.push(ReflectedBinding { name: name.to_string(), stage, slot });
        self
    }
}

/// Compiled shader program
///
/// Implemented by backend-specific shader types. Destroyed when dropped.
pub trait DeviceShader: Send + Sync {
    /// Stages the program was compiled with
    fn stages(&self) -> Vec<ShaderStage>;

    /// Resource interface of the program
    fn reflection(&self) -> &ShaderReflection;
}

/// Pool-side buffer entry

use std::sync::Arc;
use crate::graphics_device::{BufferUsage, DeviceBuffer};

/// Which of the three buffer registries a handle belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BufferKind {
    Vertex,
    Index,
    ReadWriteCompute,
}

impl BufferKind {
    pub fn usage(self) -> BufferUsage {
        match self {
            BufferKind::Vertex => BufferUsage::Vertex,
            BufferKind::Index => BufferUsage::Index,
            BufferKind::ReadWriteCompute => BufferUsage::ReadWriteCompute,
        }
    }

    /// Registry a buffer of `usage` is stored in; constant buffers belong to
    /// shaders, not to the pool
    pub fn from_usage(usage: BufferUsage) -> Option<Self> {
        match usage {
            BufferUsage::Vertex => Some(BufferKind::Vertex),
            BufferUsage::Index => Some(BufferKind::Index),
            BufferUsage::ReadWriteCompute => Some(BufferKind::ReadWriteCompute),
            BufferUsage::Constant => None,
        }
    }
}

/// A vertex, index or read-write buffer registered in the resource pool
#[derive(Clone)]
pub struct Buffer {
    pub kind: BufferKind,
    pub element_count: u32,
    pub stride: u32,
    pub cpu_writable: bool,
    pub(crate) backing: Arc<dyn DeviceBuffer>,
}

impl Buffer {
    pub fn backing(&self) -> &Arc<dyn DeviceBuffer> {
        &self.backing
    }

    pub fn size(&self) -> u64 {
        self.element_count as u64 * self.stride as u64
    }
}

impl std::fmt::Debug for Buffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Buffer")
            .field("kind", &self.kind)
            .field("element_count", &self.element_count)
            .field("stride", &self.stride)
            .finish()
    }
}

/// Buffer trait and buffer descriptor

use crate::error::Result;

/// Buffer usage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BufferUsage {
    /// Vertex buffer
    Vertex,
    /// Index buffer
    Index,
    /// Structured buffer with read-write compute access
    ReadWriteCompute,
    /// Shader constant buffer (CPU writable)
    Constant,
}

/// Descriptor for creating a buffer
#[derive(Debug, Clone)]
pub struct BufferDesc {
    /// Buffer usage
    pub usage: BufferUsage,
    /// Number of elements
    pub element_count: u32,
    /// Size of one element in bytes
    pub stride: u32,
    /// Allow CPU writes after creation (`DeviceBuffer::update`)
    pub cpu_writable: bool,
    /// Optional initial contents
    pub data: Option<Vec<u8>>,
}

impl BufferDesc {
    /// GPU-only buffer of `element_count` elements, no initial data
    pub fn new(usage: BufferUsage, element_count: u32, stride: u32) -> Self {
        Self { usage, element_count, stride, cpu_writable: false, data: None }
    }

    /// Total size in bytes
    pub fn size(&self) -> u64 {
        self.element_count as u64 * self.stride as u64
    }

    /// A constant buffer of `size` bytes
    pub fn constant(size: u32) -> Self {
        Self {
            usage: BufferUsage::Constant,
            element_count: 1,
            stride: size,
            cpu_writable: true,
            data: None,
        }
    }
}

/// Buffer resource trait
///
/// Implemented by backend-specific buffer types. The buffer is destroyed
/// when the last reference is dropped.
pub trait DeviceBuffer: Send + Sync {
    /// Update buffer data
    ///
    /// # Arguments
    ///
    /// * `offset` - Offset into the buffer in bytes
    /// * `data` - Data to write
    fn update(&self, offset: u64, data: &[u8]) -> Result<()>;

    /// Size in bytes
    fn size(&self) -> u64;
}

/// Named constant writes resolved to constant buffer storage
///
/// A write copies bytes into the constant's CPU shadow and marks every
/// constant buffer that holds the constant dirty. Dirty buffers are packed
/// from the shadows and uploaded in one `update` call each by
/// `upload_dirty`, which the renderer runs from `apply()`.

use crate::config::ConstantLookup;
use crate::error::Result;
use crate::shader::Shader;
use crate::{engine_error, engine_warn};

const SOURCE: &str = "galaxy3d::ConstantResolver";

#[derive(Debug, Clone, Copy, Default)]
pub struct ConstantResolver {
    lookup: ConstantLookup,
}

impl ConstantResolver {
    pub fn new(lookup: ConstantLookup) -> Self {
        Self { lookup }
    }

    pub fn lookup(&self) -> ConstantLookup {
        self.lookup
    }

    /// Indices into `shader.constant_mappings()` whose constant is `name`,
    /// in mapping order
    pub fn resolve(&self, shader: &Shader, name: &str) -> Vec<usize> {
        match self.lookup {
            ConstantLookup::Linear => shader
                .mappings
                .iter()
                .enumerate()
                .filter(|(_, mapping)| shader.constant_name(mapping) == name)
                .map(|(index, _)| index)
                .collect(),
            ConstantLookup::BinarySearch => {
                let mappings = &shader.mappings;
                let first = mappings.partition_point(|mapping| shader.constant_name(mapping) < name);
                let count = mappings[first..]
                    .iter()
                    .take_while(|mapping| shader.constant_name(mapping) == name)
                    .count();
                (first..first + count).collect()
            }
        }
    }

    /// Copy `data` into the shadow of `name` and dirty its buffers
    ///
    /// Copies at most the constant's size. Shorter data only overwrites its
    /// own length and logs a warning. Unknown names log an error and leave
    /// every shadow untouched.
    pub fn set_constant(&self, shader: &mut Shader, name: &str, data: &[u8]) -> bool {
        let matches = self.resolve(shader, name);
        if matches.is_empty() {
            engine_error!(SOURCE, "Constant not found: \"{}\" in shader '{}'", name, shader.name());
            return false;
        }

        for index in matches {
            let mapping = shader.mappings[index];
            let constant = &mut shader.cpu_constants[mapping.constant_id];
            let size = constant.size as usize;
            if data.len() < size {
                engine_warn!(
                    SOURCE,
                    "Constant \"{}\" expects {} bytes, got {}",
                    name, size, data.len()
                );
            }
            let count = size.min(data.len());
            constant.data[..count].copy_from_slice(&data[..count]);
            shader.constant_buffers[mapping.buffer_slot].dirty = true;
        }
        true
    }

    /// Pack and upload every dirty constant buffer of `shader`
    ///
    /// Returns the number of buffers uploaded.
    pub fn upload_dirty(&self, shader: &mut Shader) -> Result<usize> {
        let mut uploaded = 0;
        for buffer_slot in 0..shader.constant_buffers.len() {
            if !shader.constant_buffers[buffer_slot].dirty {
                continue;
            }
            let mut bytes = vec![0u8; shader.constant_buffers[buffer_slot].size as usize];
            for mapping in shader.mappings.iter().filter(|mapping| mapping.buffer_slot == buffer_slot) {
                let constant = &shader.cpu_constants[mapping.constant_id];
                let offset = (mapping.offset as usize).min(bytes.len());
                let length = (mapping.size as usize).min(constant.data.len());
                let end = (offset + length).min(bytes.len());
                bytes[offset..end].copy_from_slice(&constant.data[..end - offset]);
            }

            let buffer = &mut shader.constant_buffers[buffer_slot];
            buffer.backing.update(0, &bytes)?;
            buffer.dirty = false;
            uploaded += 1;
        }
        Ok(uploaded)
    }
}

#[cfg(test)]
#[path = "constant_resolver_tests.rs"]
mod tests;

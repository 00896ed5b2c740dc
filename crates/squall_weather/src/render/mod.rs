//! Mesh emission: triangles into capacity-limited polygon buffers.

mod poly;
mod shaders;

pub use poly::{
    unit_to_byte, PolyBuffer, PolyBuffers, PolySink, PolyVert, MAX_PB_BUFFERS, MAX_PB_VERTS,
};
pub use shaders::{ShaderHandle, ShaderRegistry, ShaderTable};

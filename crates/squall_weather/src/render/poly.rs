//! Polygon buffers shared by every particle emitter.
//!
//! Buffers are allocated once. A triangle that finds no room is dropped and
//! the caller is told so; nothing ever grows.

use bytemuck::{Pod, Zeroable};
use squall_shared::Vec3;

use super::ShaderHandle;

/// Number of polygon buffers.
pub const MAX_PB_BUFFERS: usize = 128;
/// Vertices per polygon buffer.
pub const MAX_PB_VERTS: usize = 1025;

/// One vertex: position, texture coordinates, RGBA modulation.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Pod, Zeroable)]
pub struct PolyVert {
    /// World position.
    pub xyz: [f32; 3],
    /// Texture coordinates.
    pub st: [f32; 2],
    /// Vertex color.
    pub modulate: [u8; 4],
}

impl PolyVert {
    /// Creates a vertex.
    #[must_use]
    pub fn new(xyz: Vec3, st: [f32; 2], modulate: [u8; 4]) -> Self {
        Self {
            xyz: xyz.to_array(),
            st,
            modulate,
        }
    }

    /// Position as a vector.
    #[must_use]
    pub fn position(&self) -> Vec3 {
        Vec3::from_array(self.xyz)
    }
}

/// Converts a `[0, 1]` channel to a byte, clamping out-of-range input.
#[inline]
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn unit_to_byte(value: f32) -> u8 {
    (value.clamp(0.0, 1.0) * 255.0) as u8
}

/// Destination for emitted triangles.
pub trait PolySink {
    /// Appends one triangle for `shader`.
    ///
    /// Returns false when the geometry was silently dropped because there
    /// was no room.
    fn add_triangle(&mut self, shader: ShaderHandle, verts: &[PolyVert; 3]) -> bool;
}

/// Indexed geometry bound to one material.
#[derive(Debug)]
pub struct PolyBuffer {
    shader: Option<ShaderHandle>,
    verts: Vec<PolyVert>,
    indices: Vec<u32>,
    max_verts: usize,
    max_indices: usize,
}

impl PolyBuffer {
    fn new(max_verts: usize) -> Self {
        Self {
            shader: None,
            verts: Vec::with_capacity(max_verts),
            indices: Vec::with_capacity(max_verts * 6),
            max_verts,
            max_indices: max_verts * 6,
        }
    }

    fn has_room(&self, verts: usize, indices: usize) -> bool {
        self.verts.len() + verts <= self.max_verts
            && self.indices.len() + indices <= self.max_indices
    }

    /// The material this buffer is bound to, if any.
    #[must_use]
    pub fn shader(&self) -> Option<ShaderHandle> {
        self.shader
    }

    /// Vertices written this frame.
    #[must_use]
    pub fn verts(&self) -> &[PolyVert] {
        &self.verts
    }

    /// Indices written this frame.
    #[must_use]
    pub fn indices(&self) -> &[u32] {
        &self.indices
    }

    /// Vertex storage for upload.
    #[must_use]
    pub fn vertex_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.verts)
    }
}

/// The shared pool of polygon buffers.
#[derive(Debug)]
pub struct PolyBuffers {
    buffers: Vec<PolyBuffer>,
}

impl PolyBuffers {
    /// Creates the default pool: [`MAX_PB_BUFFERS`] × [`MAX_PB_VERTS`].
    #[must_use]
    pub fn new() -> Self {
        Self::with_limits(MAX_PB_BUFFERS, MAX_PB_VERTS)
    }

    /// Creates a pool with custom limits.
    #[must_use]
    pub fn with_limits(buffers: usize, verts_per_buffer: usize) -> Self {
        Self {
            buffers: (0..buffers).map(|_| PolyBuffer::new(verts_per_buffer)).collect(),
        }
    }

    /// Unbinds and empties every buffer. Capacity is kept.
    pub fn clear(&mut self) {
        for buffer in &mut self.buffers {
            buffer.shader = None;
            buffer.verts.clear();
            buffer.indices.clear();
        }
    }

    /// Buffers holding geometry.
    pub fn used(&self) -> impl Iterator<Item = &PolyBuffer> {
        self.buffers.iter().filter(|b| b.shader.is_some())
    }

    /// Total triangles held across all buffers.
    #[must_use]
    pub fn triangle_count(&self) -> usize {
        self.buffers.iter().map(|b| b.indices.len() / 3).sum()
    }

    /// Triangles held for one material.
    #[must_use]
    pub fn triangle_count_for(&self, shader: ShaderHandle) -> usize {
        self.used()
            .filter(|b| b.shader == Some(shader))
            .map(|b| b.indices.len() / 3)
            .sum()
    }

    /// Finds a buffer bound to `shader` with room, otherwise binds the first
    /// unused buffer.
    fn find_free(
        &mut self,
        shader: ShaderHandle,
        verts: usize,
        indices: usize,
    ) -> Option<&mut PolyBuffer> {
        let bound = self
            .buffers
            .iter()
            .position(|b| b.shader == Some(shader) && b.has_room(verts, indices));
        let index = bound.or_else(|| self.buffers.iter().position(|b| b.shader.is_none()))?;

        let buffer = &mut self.buffers[index];
        if !buffer.has_room(verts, indices) {
            return None;
        }
        buffer.shader = Some(shader);
        Some(buffer)
    }
}

impl Default for PolyBuffers {
    fn default() -> Self {
        Self::new()
    }
}

impl PolySink for PolyBuffers {
    fn add_triangle(&mut self, shader: ShaderHandle, verts: &[PolyVert; 3]) -> bool {
        let Some(buffer) = self.find_free(shader, 3, 3) else {
            return false;
        };

        let first = buffer.verts.len();
        buffer.verts.extend_from_slice(verts);
        for i in 0..3 {
            // first + i < max_verts, which fits u32 for any sane limit.
            buffer.indices.push(u32::try_from(first + i).unwrap_or(u32::MAX));
        }
        true
    }
}

//! Batched drawing input and its canonical vertex layout.
//!
//! Backends consume batches in exactly one shape: a flat buffer of
//! `Vertex` records, four per sprite (top-left, top-right, bottom-right,
//! bottom-left) or one per triangle vertex. The `normalize` functions turn
//! every other accepted input encoding into that shape.

pub mod normalize;

pub use self::normalize::{
    is_partial_passthrough, normalize_sprites, normalize_sprites_separate, normalize_triangles,
    ImageExtent, Policy,
};

bitflags::bitflags! {
    /// Describes how the fields of a batch buffer are encoded.
    ///
    /// A passthrough field already holds one value per vertex in final units.
    /// A `USE_DEFAULT_*` field is absent from the buffer and replaced by a
    /// constant. Any other field is condensed: one value per sprite, in source
    /// units.
    pub struct BlitFlags: u32 {
        const PASSTHROUGH_VERTICES = 0x1;
        const PASSTHROUGH_TEXCOORDS = 0x2;
        const PASSTHROUGH_COLORS = 0x4;
        const USE_DEFAULT_POSITIONS = 0x8;
        const USE_DEFAULT_SRC_RECTS = 0x10;
        const USE_DEFAULT_COLORS = 0x20;

        const PASSTHROUGH_ALL = Self::PASSTHROUGH_VERTICES.bits
            | Self::PASSTHROUGH_TEXCOORDS.bits
            | Self::PASSTHROUGH_COLORS.bits;
    }
}

impl Default for BlitFlags {
    fn default() -> Self {
        BlitFlags::empty()
    }
}

/// The canonical vertex record: position, texture coordinates and a color
/// with components in [0, 1].
#[repr(C)]
#[derive(Debug, Default, Clone, Copy, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Vertex {
    pub position: [f32; 2],
    pub texcoord: [f32; 2],
    pub color: [f32; 4],
}

pub const FLOATS_PER_VERTEX: usize = 8;
pub const VERTICES_PER_SPRITE: usize = 4;
pub const FLOATS_PER_SPRITE: usize = FLOATS_PER_VERTEX * VERTICES_PER_SPRITE;

impl Vertex {
    #[inline]
    pub fn new(position: [f32; 2], texcoord: [f32; 2], color: [f32; 4]) -> Self {
        Vertex {
            position,
            texcoord,
            color,
        }
    }
}

/// Views a vertex buffer as the flat float buffer backends consume.
#[inline]
pub fn as_floats(vertices: &[Vertex]) -> &[f32] {
    bytemuck::cast_slice(vertices)
}

/// Reads a flat float buffer as vertices. Trailing floats that do not form a
/// whole vertex are ignored.
pub fn from_floats(values: &[f32]) -> Vec<Vertex> {
    let len = values.len() / FLOATS_PER_VERTEX * FLOATS_PER_VERTEX;
    bytemuck::cast_slice::<f32, Vertex>(&values[..len]).to_vec()
}

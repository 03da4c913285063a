//! Repacks batch input into canonical `Vertex` buffers.
//!
//! Every field (positions, texture coordinates, colors) is handled by one of
//! three strategies, picked once per call from the blit flags: a constant
//! default, expansion of a condensed per-sprite value, or a per-vertex
//! passthrough copy.

use super::{BlitFlags, Vertex, VERTICES_PER_SPRITE};
use crate::errors::*;

const DEFAULT_TEXCOORDS: [[f32; 2]; 4] = [[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0]];
const DEFAULT_COLOR: [f32; 4] = [1.0, 1.0, 1.0, 1.0];

/// How a single field of a batch is encoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Policy {
    /// Absent from the input. A constant is emitted instead.
    Default,
    /// One value per sprite in source units.
    Condensed,
    /// One value per vertex in final units.
    Passthrough,
}

impl Policy {
    fn select(flags: BlitFlags, use_default: BlitFlags, passthrough: BlitFlags) -> Policy {
        if flags.contains(use_default) {
            Policy::Default
        } else if flags.contains(passthrough) {
            Policy::Passthrough
        } else {
            Policy::Condensed
        }
    }
}

/// The logical and texel dimensions of the image a batch samples from.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ImageExtent {
    pub w: f32,
    pub h: f32,
    pub base_w: f32,
    pub base_h: f32,
}

impl ImageExtent {
    pub fn new(w: u16, h: u16, base_w: u16, base_h: u16) -> Self {
        ImageExtent {
            w: f32::from(w),
            h: f32::from(h),
            base_w: f32::from(base_w),
            base_h: f32::from(base_h),
        }
    }
}

/// Returns true if some, but not all, fields are flagged as passthrough.
#[inline]
pub fn is_partial_passthrough(flags: BlitFlags) -> bool {
    flags.intersects(BlitFlags::PASSTHROUGH_ALL) && !flags.contains(BlitFlags::PASSTHROUGH_ALL)
}

/// A strided view over the source values of one field.
#[derive(Debug, Clone, Copy)]
struct FieldSource<'a> {
    data: &'a [f32],
    offset: usize,
    stride: usize,
    width: usize,
}

impl<'a> FieldSource<'a> {
    fn empty() -> Self {
        FieldSource {
            data: &[],
            offset: 0,
            stride: 0,
            width: 0,
        }
    }

    #[inline]
    fn row(&self, n: usize) -> &'a [f32] {
        if self.width == 0 {
            return &[];
        }

        let start = self.offset + n * self.stride;
        &self.data[start..start + self.width]
    }

    fn validate(&self, field: &str, count: usize) -> Result<()> {
        if self.width == 0 || count == 0 {
            return Ok(());
        }

        let required = self.offset + (count - 1) * self.stride + self.width;
        if self.data.len() < required {
            return Err(Error::data(format!(
                "Not enough {} data: expected at least {} floats, got {}.",
                field,
                required,
                self.data.len()
            )));
        }

        Ok(())
    }
}

type SpriteTexcoords = fn(&[f32], &ImageExtent) -> [[f32; 2]; 4];
type SpritePositions = fn(&[f32], [f32; 2]) -> [[f32; 2]; 4];
type SpriteColors = fn(&[f32]) -> [[f32; 4]; 4];

fn sprite_texcoords_default(_: &[f32], _: &ImageExtent) -> [[f32; 2]; 4] {
    DEFAULT_TEXCOORDS
}

fn sprite_texcoords_condensed(rect: &[f32], extent: &ImageExtent) -> [[f32; 2]; 4] {
    let s1 = rect[0] / extent.base_w;
    let t1 = rect[1] / extent.base_h;
    let s3 = s1 + rect[2] / extent.base_w;
    let t3 = t1 + rect[3] / extent.base_h;
    [[s1, t1], [s3, t1], [s3, t3], [s1, t3]]
}

fn sprite_texcoords_passthrough(v: &[f32], _: &ImageExtent) -> [[f32; 2]; 4] {
    [[v[0], v[1]], [v[2], v[3]], [v[4], v[5]], [v[6], v[7]]]
}

fn sprite_positions_default(_: &[f32], _: [f32; 2]) -> [[f32; 2]; 4] {
    [[0.0, 0.0]; 4]
}

fn sprite_positions_condensed(v: &[f32], half: [f32; 2]) -> [[f32; 2]; 4] {
    let (x, y) = (v[0], v[1]);
    let (w2, h2) = (half[0], half[1]);
    [
        [x - w2, y - h2],
        [x + w2, y - h2],
        [x + w2, y + h2],
        [x - w2, y + h2],
    ]
}

fn sprite_positions_passthrough(v: &[f32], _: [f32; 2]) -> [[f32; 2]; 4] {
    [[v[0], v[1]], [v[2], v[3]], [v[4], v[5]], [v[6], v[7]]]
}

fn sprite_colors_default(_: &[f32]) -> [[f32; 4]; 4] {
    [DEFAULT_COLOR; 4]
}

fn sprite_colors_condensed(v: &[f32]) -> [[f32; 4]; 4] {
    [condense_color(v); 4]
}

fn sprite_colors_passthrough(v: &[f32]) -> [[f32; 4]; 4] {
    [
        [v[0], v[1], v[2], v[3]],
        [v[4], v[5], v[6], v[7]],
        [v[8], v[9], v[10], v[11]],
        [v[12], v[13], v[14], v[15]],
    ]
}

#[inline]
fn condense_color(v: &[f32]) -> [f32; 4] {
    [v[0] / 255.0, v[1] / 255.0, v[2] / 255.0, v[3] / 255.0]
}

/// Number of source floats one sprite contributes to a field.
fn sprite_width(policy: Policy, condensed: usize, passthrough: usize) -> usize {
    match policy {
        Policy::Default => 0,
        Policy::Condensed => condensed,
        Policy::Passthrough => passthrough,
    }
}

struct SpriteBatch<'a> {
    extent: ImageExtent,
    positions: (Policy, FieldSource<'a>),
    texcoords: (Policy, FieldSource<'a>),
    colors: (Policy, FieldSource<'a>),
}

impl<'a> SpriteBatch<'a> {
    fn build(&self, num_sprites: usize) -> Result<Vec<Vertex>> {
        self.positions.1.validate("position", num_sprites)?;
        self.texcoords.1.validate("source rect", num_sprites)?;
        self.colors.1.validate("color", num_sprites)?;

        let texcoords: SpriteTexcoords = match self.texcoords.0 {
            Policy::Default => sprite_texcoords_default,
            Policy::Condensed => sprite_texcoords_condensed,
            Policy::Passthrough => sprite_texcoords_passthrough,
        };

        let positions: SpritePositions = match self.positions.0 {
            Policy::Default => sprite_positions_default,
            Policy::Condensed => sprite_positions_condensed,
            Policy::Passthrough => sprite_positions_passthrough,
        };

        let colors: SpriteColors = match self.colors.0 {
            Policy::Default => sprite_colors_default,
            Policy::Condensed => sprite_colors_condensed,
            Policy::Passthrough => sprite_colors_passthrough,
        };

        // Half extents follow the sampled area whenever texture coordinates
        // come from the input, unless the quad corners are given explicitly.
        let derive_half = self.texcoords.0 != Policy::Default && self.positions.0 != Policy::Passthrough;
        let image_half = [0.5 * self.extent.w, 0.5 * self.extent.h];

        let mut vertices = Vec::with_capacity(num_sprites * VERTICES_PER_SPRITE);
        for n in 0..num_sprites {
            let st = texcoords(self.texcoords.1.row(n), &self.extent);

            let half = if derive_half {
                [
                    0.5 * (st[2][0] - st[0][0]) * self.extent.w,
                    0.5 * (st[2][1] - st[0][1]) * self.extent.h,
                ]
            } else {
                image_half
            };

            let xy = positions(self.positions.1.row(n), half);
            let rgba = colors(self.colors.1.row(n));

            for i in 0..VERTICES_PER_SPRITE {
                vertices.push(Vertex::new(xy[i], st[i], rgba[i]));
            }
        }

        Ok(vertices)
    }
}

/// Repacks an interleaved sprite buffer.
///
/// Each sprite contributes, in order, its position, source rect and color,
/// minus the fields flagged `USE_DEFAULT_*`. Partially passthrough buffers
/// are ambiguous and rejected with a user error.
pub fn normalize_sprites(
    extent: &ImageExtent,
    num_sprites: usize,
    values: &[f32],
    flags: BlitFlags,
) -> Result<Vec<Vertex>> {
    if is_partial_passthrough(flags) {
        return Err(Error::user(
            "Cannot interpret interleaved data using partial passthrough",
        ));
    }

    let positions = Policy::select(
        flags,
        BlitFlags::USE_DEFAULT_POSITIONS,
        BlitFlags::PASSTHROUGH_VERTICES,
    );
    let texcoords = Policy::select(
        flags,
        BlitFlags::USE_DEFAULT_SRC_RECTS,
        BlitFlags::PASSTHROUGH_TEXCOORDS,
    );
    let colors = Policy::select(
        flags,
        BlitFlags::USE_DEFAULT_COLORS,
        BlitFlags::PASSTHROUGH_COLORS,
    );

    let pos_w = sprite_width(positions, 2, 8);
    let rect_w = sprite_width(texcoords, 4, 8);
    let color_w = sprite_width(colors, 4, 16);
    let stride = pos_w + rect_w + color_w;

    let field = |offset, width| FieldSource {
        data: values,
        offset,
        stride,
        width,
    };

    let batch = SpriteBatch {
        extent: *extent,
        positions: (positions, field(0, pos_w)),
        texcoords: (texcoords, field(pos_w, rect_w)),
        colors: (colors, field(pos_w + rect_w, color_w)),
    };

    batch.build(num_sprites)
}

/// Repacks separate position, source rect and color arrays.
///
/// A missing array, or one flagged `USE_DEFAULT_*`, takes the default for
/// its field. Passthrough is decided per array, so mixed encodings are fine.
pub fn normalize_sprites_separate(
    extent: &ImageExtent,
    num_sprites: usize,
    positions: Option<&[f32]>,
    rects: Option<&[f32]>,
    colors: Option<&[f32]>,
    flags: BlitFlags,
) -> Result<Vec<Vertex>> {
    let batch = SpriteBatch {
        extent: *extent,
        positions: separate_field(
            positions,
            flags,
            BlitFlags::USE_DEFAULT_POSITIONS,
            BlitFlags::PASSTHROUGH_VERTICES,
            2,
            8,
        ),
        texcoords: separate_field(
            rects,
            flags,
            BlitFlags::USE_DEFAULT_SRC_RECTS,
            BlitFlags::PASSTHROUGH_TEXCOORDS,
            4,
            8,
        ),
        colors: separate_field(
            colors,
            flags,
            BlitFlags::USE_DEFAULT_COLORS,
            BlitFlags::PASSTHROUGH_COLORS,
            4,
            16,
        ),
    };

    batch.build(num_sprites)
}

fn separate_field<'a>(
    data: Option<&'a [f32]>,
    flags: BlitFlags,
    use_default: BlitFlags,
    passthrough: BlitFlags,
    condensed_w: usize,
    passthrough_w: usize,
) -> (Policy, FieldSource<'a>) {
    match data {
        None => (Policy::Default, FieldSource::empty()),
        Some(data) => {
            let policy = Policy::select(flags, use_default, passthrough);
            let width = sprite_width(policy, condensed_w, passthrough_w);
            let source = FieldSource {
                data,
                offset: 0,
                stride: width,
                width,
            };

            (policy, source)
        }
    }
}

type VertexTexcoord = fn(&[f32], &ImageExtent) -> [f32; 2];
type VertexColor = fn(&[f32]) -> [f32; 4];

fn vertex_texcoord_default(_: &[f32], _: &ImageExtent) -> [f32; 2] {
    [0.0, 0.0]
}

fn vertex_texcoord_condensed(v: &[f32], extent: &ImageExtent) -> [f32; 2] {
    [v[0] / extent.base_w, v[1] / extent.base_h]
}

fn vertex_texcoord_passthrough(v: &[f32], _: &ImageExtent) -> [f32; 2] {
    [v[0], v[1]]
}

fn vertex_color_default(_: &[f32]) -> [f32; 4] {
    DEFAULT_COLOR
}

fn vertex_color_passthrough(v: &[f32]) -> [f32; 4] {
    [v[0], v[1], v[2], v[3]]
}

/// Repacks an interleaved triangle vertex buffer.
///
/// Each vertex contributes its position, texture coordinates and color,
/// minus the fields flagged `USE_DEFAULT_*`. Positions are always taken as
/// given. Untextured batches (`extent` is `None`) carry no texture
/// coordinates at all.
pub fn normalize_triangles(
    extent: Option<&ImageExtent>,
    num_vertices: usize,
    values: &[f32],
    flags: BlitFlags,
) -> Result<Vec<Vertex>> {
    let positions = if flags.contains(BlitFlags::USE_DEFAULT_POSITIONS) {
        Policy::Default
    } else {
        Policy::Passthrough
    };

    let texcoords = if extent.is_none() {
        Policy::Default
    } else {
        Policy::select(
            flags,
            BlitFlags::USE_DEFAULT_SRC_RECTS,
            BlitFlags::PASSTHROUGH_TEXCOORDS,
        )
    };

    let colors = Policy::select(
        flags,
        BlitFlags::USE_DEFAULT_COLORS,
        BlitFlags::PASSTHROUGH_COLORS,
    );

    let pos_w = sprite_width(positions, 2, 2);
    let tex_w = sprite_width(texcoords, 2, 2);
    let color_w = sprite_width(colors, 4, 4);
    let stride = pos_w + tex_w + color_w;

    let field = |offset, width| FieldSource {
        data: values,
        offset,
        stride,
        width,
    };

    let pos_src = field(0, pos_w);
    let tex_src = field(pos_w, tex_w);
    let color_src = field(pos_w + tex_w, color_w);

    pos_src.validate("position", num_vertices)?;
    tex_src.validate("texcoord", num_vertices)?;
    color_src.validate("color", num_vertices)?;

    let texcoord: VertexTexcoord = match texcoords {
        Policy::Default => vertex_texcoord_default,
        Policy::Condensed => vertex_texcoord_condensed,
        Policy::Passthrough => vertex_texcoord_passthrough,
    };

    let color: VertexColor = match colors {
        Policy::Default => vertex_color_default,
        Policy::Condensed => condense_color,
        Policy::Passthrough => vertex_color_passthrough,
    };

    let extent = extent.cloned().unwrap_or(ImageExtent {
        w: 0.0,
        h: 0.0,
        base_w: 0.0,
        base_h: 0.0,
    });

    let mut vertices = Vec::with_capacity(num_vertices);
    for n in 0..num_vertices {
        let position = match positions {
            Policy::Default => [0.0, 0.0],
            _ => {
                let v = pos_src.row(n);
                [v[0], v[1]]
            }
        };

        vertices.push(Vertex::new(
            position,
            texcoord(tex_src.row(n), &extent),
            color(color_src.row(n)),
        ));
    }

    Ok(vertices)
}

#[cfg(test)]
mod test {
    use super::*;

    fn extent64() -> ImageExtent {
        ImageExtent::new(64, 64, 64, 64)
    }

    #[test]
    fn condensed_sprite() {
        let values = [100.0, 100.0, 0.0, 0.0, 64.0, 64.0, 255.0, 128.0, 0.0, 255.0];
        let vs = normalize_sprites(&extent64(), 1, &values, BlitFlags::empty()).unwrap();

        assert_eq!(vs.len(), 4);
        assert_eq!(vs[0].position, [68.0, 68.0]);
        assert_eq!(vs[1].position, [132.0, 68.0]);
        assert_eq!(vs[2].position, [132.0, 132.0]);
        assert_eq!(vs[3].position, [68.0, 132.0]);

        assert_eq!(vs[0].texcoord, [0.0, 0.0]);
        assert_eq!(vs[2].texcoord, [1.0, 1.0]);

        for v in &vs {
            assert_eq!(v.color[0], 1.0);
            assert!((v.color[1] - 128.0 / 255.0).abs() < 1e-6);
            assert_eq!(v.color[2], 0.0);
            assert_eq!(v.color[3], 1.0);
        }
    }

    #[test]
    fn half_extents_follow_rect() {
        // A 16x8 rect on a 64x32 image with 128x64 texels.
        let extent = ImageExtent::new(64, 32, 128, 64);
        let values = [10.0, 20.0, 0.0, 0.0, 16.0, 8.0];
        let flags = BlitFlags::USE_DEFAULT_COLORS;
        let vs = normalize_sprites(&extent, 1, &values, flags).unwrap();

        // s3 - s1 = 16 / 128, scaled by the logical width 64 -> 8, halved -> 4.
        assert_eq!(vs[0].position, [6.0, 18.0]);
        assert_eq!(vs[2].position, [14.0, 22.0]);
        assert_eq!(vs[2].texcoord, [0.125, 0.125]);
    }

    #[test]
    fn defaults() {
        let flags = BlitFlags::USE_DEFAULT_SRC_RECTS | BlitFlags::USE_DEFAULT_COLORS;
        let vs = normalize_sprites(&extent64(), 2, &[1.0, 2.0, 3.0, 4.0], flags).unwrap();

        assert_eq!(vs.len(), 8);
        assert_eq!(vs[4].position, [3.0 - 32.0, 4.0 - 32.0]);
        assert_eq!(vs[5].texcoord, [1.0, 0.0]);
        assert_eq!(vs[7].texcoord, [0.0, 1.0]);
        assert_eq!(vs[6].color, DEFAULT_COLOR);

        let flags = flags | BlitFlags::USE_DEFAULT_POSITIONS;
        let vs = normalize_sprites(&extent64(), 3, &[], flags).unwrap();
        assert_eq!(vs.len(), 12);
        assert!(vs.iter().all(|v| v.position == [0.0, 0.0]));
    }

    #[test]
    fn partial_passthrough() {
        let flags = BlitFlags::PASSTHROUGH_VERTICES;
        let err = normalize_sprites(&extent64(), 1, &[0.0; 32], flags).unwrap_err();
        assert_eq!(err.code, ErrorCode::User);

        assert!(is_partial_passthrough(BlitFlags::PASSTHROUGH_COLORS));
        assert!(!is_partial_passthrough(BlitFlags::PASSTHROUGH_ALL));
        assert!(!is_partial_passthrough(BlitFlags::USE_DEFAULT_COLORS));
    }

    #[test]
    fn short_buffer() {
        let err = normalize_sprites(&extent64(), 2, &[0.0; 10], BlitFlags::empty()).unwrap_err();
        assert_eq!(err.code, ErrorCode::Data);
    }

    #[test]
    fn separate_mixed() {
        let positions = [0.0, 0.0, 10.0, 0.0, 10.0, 10.0, 0.0, 10.0];
        let rects = [32.0, 0.0, 32.0, 32.0];
        let flags = BlitFlags::PASSTHROUGH_VERTICES;

        let vs = normalize_sprites_separate(&extent64(), 1, Some(&positions), Some(&rects), None, flags)
            .unwrap();

        assert_eq!(vs[1].position, [10.0, 0.0]);
        assert_eq!(vs[3].position, [0.0, 10.0]);
        assert_eq!(vs[0].texcoord, [0.5, 0.0]);
        assert_eq!(vs[2].texcoord, [1.0, 0.5]);
        assert_eq!(vs[0].color, DEFAULT_COLOR);
    }

    #[test]
    fn separate_use_default_flag() {
        let positions = [5.0, 5.0];
        let colors = [0.0, 0.0, 0.0, 0.0];
        let flags = BlitFlags::USE_DEFAULT_COLORS;

        let vs = normalize_sprites_separate(&extent64(), 1, Some(&positions), None, Some(&colors), flags)
            .unwrap();

        assert_eq!(vs[0].position, [5.0 - 32.0, 5.0 - 32.0]);
        assert_eq!(vs[0].color, DEFAULT_COLOR);
    }

    #[test]
    fn triangles() {
        let values = [
            0.0, 0.0, 0.0, 0.0, 255.0, 0.0, 0.0, 255.0, //
            10.0, 0.0, 32.0, 0.0, 0.0, 255.0, 0.0, 255.0, //
            0.0, 10.0, 0.0, 64.0, 0.0, 0.0, 255.0, 255.0,
        ];

        let vs = normalize_triangles(Some(&extent64()), 3, &values, BlitFlags::empty()).unwrap();
        assert_eq!(vs[1].position, [10.0, 0.0]);
        assert_eq!(vs[1].texcoord, [0.5, 0.0]);
        assert_eq!(vs[2].texcoord, [0.0, 1.0]);
        assert_eq!(vs[2].color, [0.0, 0.0, 1.0, 1.0]);
    }

    #[test]
    fn untextured_triangles() {
        let values = [0.0, 0.0, 1.0, 1.0, 1.0, 1.0, 5.0, 5.0, 1.0, 1.0, 1.0, 1.0];
        let vs = normalize_triangles(None, 2, &values, BlitFlags::PASSTHROUGH_COLORS).unwrap();

        assert_eq!(vs[1].position, [5.0, 5.0]);
        assert_eq!(vs[1].texcoord, [0.0, 0.0]);
        assert_eq!(vs[1].color, [1.0, 1.0, 1.0, 1.0]);
    }

    #[test]
    fn triangle_passthrough_texcoords_advance() {
        let values = [0.0, 0.0, 0.1, 0.2, 1.0, 1.0, 0.3, 0.4];
        let flags = BlitFlags::PASSTHROUGH_TEXCOORDS | BlitFlags::USE_DEFAULT_COLORS;
        let vs = normalize_triangles(Some(&extent64()), 2, &values, flags).unwrap();

        assert_eq!(vs[0].texcoord, [0.1, 0.2]);
        assert_eq!(vs[1].texcoord, [0.3, 0.4]);
    }
}

use super::{image_extent, non_nil, GpuSystem};

use crate::assets::prelude::*;
use crate::batch::{self, BlitFlags, FLOATS_PER_SPRITE};
use crate::errors::*;
use crate::math::{Matrix3, Rect};
use crate::utils::Color;

impl GpuSystem {
    /// Draws `src_rect` of `image` (the whole image with `None`) centered
    /// at (`x`, `y`).
    pub fn blit(&mut self, image: ImageHandle, src_rect: Option<Rect>, target: TargetHandle, x: f32, y: f32) {
        self.dispatch("blit", |b| {
            non_nil(image, "image")?;
            non_nil(target, "target")?;
            b.blit(image, src_rect, target, x, y)
        });
    }

    pub fn blit_rotate(
        &mut self,
        image: ImageHandle,
        src_rect: Option<Rect>,
        target: TargetHandle,
        x: f32,
        y: f32,
        degrees: f32,
    ) {
        self.dispatch("blit_rotate", |b| {
            non_nil(image, "image")?;
            non_nil(target, "target")?;
            b.blit_rotate(image, src_rect, target, x, y, degrees)
        });
    }

    pub fn blit_scale(
        &mut self,
        image: ImageHandle,
        src_rect: Option<Rect>,
        target: TargetHandle,
        x: f32,
        y: f32,
        scale_x: f32,
        scale_y: f32,
    ) {
        self.dispatch("blit_scale", |b| {
            non_nil(image, "image")?;
            non_nil(target, "target")?;
            b.blit_scale(image, src_rect, target, x, y, scale_x, scale_y)
        });
    }

    pub fn blit_transform(
        &mut self,
        image: ImageHandle,
        src_rect: Option<Rect>,
        target: TargetHandle,
        x: f32,
        y: f32,
        degrees: f32,
        scale_x: f32,
        scale_y: f32,
    ) {
        self.dispatch("blit_transform", |b| {
            non_nil(image, "image")?;
            non_nil(target, "target")?;
            b.blit_transform(image, src_rect, target, x, y, degrees, scale_x, scale_y)
        });
    }

    /// Rotates and scales around (`pivot_x`, `pivot_y`), relative to the
    /// top-left corner of the drawn rect.
    pub fn blit_transform_x(
        &mut self,
        image: ImageHandle,
        src_rect: Option<Rect>,
        target: TargetHandle,
        x: f32,
        y: f32,
        pivot_x: f32,
        pivot_y: f32,
        degrees: f32,
        scale_x: f32,
        scale_y: f32,
    ) {
        self.dispatch("blit_transform_x", |b| {
            non_nil(image, "image")?;
            non_nil(target, "target")?;
            b.blit_transform_x(
                image, src_rect, target, x, y, pivot_x, pivot_y, degrees, scale_x, scale_y,
            )
        });
    }

    pub fn blit_transform_matrix(
        &mut self,
        image: ImageHandle,
        src_rect: Option<Rect>,
        target: TargetHandle,
        x: f32,
        y: f32,
        matrix: &Matrix3<f32>,
    ) {
        self.dispatch("blit_transform_matrix", |b| {
            non_nil(image, "image")?;
            non_nil(target, "target")?;
            b.blit_transform_matrix(image, src_rect, target, x, y, matrix)
        });
    }

    /// Draws `num_sprites` sprites of `image` from one interleaved buffer.
    ///
    /// Unless `flags` says otherwise, every sprite is given as its center
    /// position (2 floats), its source rect in pixels (4 floats) and its
    /// color in bytes (4 floats). A buffer that is fully passthrough already
    /// holds 4 canonical vertices per sprite and is handed over as is.
    pub fn blit_batch(
        &mut self,
        image: ImageHandle,
        target: TargetHandle,
        num_sprites: usize,
        values: Option<&[f32]>,
        flags: BlitFlags,
    ) {
        self.dispatch("blit_batch", |b| {
            non_nil(image, "image")?;
            non_nil(target, "target")?;

            if num_sprites == 0 {
                return Ok(());
            }

            let values = match values {
                Some(v) if !flags.contains(BlitFlags::PASSTHROUGH_ALL) => v,
                Some(v) => {
                    let len = num_sprites * FLOATS_PER_SPRITE;
                    if v.len() < len {
                        return Err(Error::data(format!(
                            "Not enough vertex data: expected at least {} floats, got {}.",
                            len,
                            v.len()
                        )));
                    }

                    return b.blit_batch(image, target, num_sprites, Some(v), flags);
                }
                None => return b.blit_batch(image, target, num_sprites, None, flags),
            };

            let extent = image_extent(b, image)?;
            let vertices = batch::normalize_sprites(&extent, num_sprites, values, flags)?;
            b.blit_batch(
                image,
                target,
                num_sprites,
                Some(batch::as_floats(&vertices)),
                flags | BlitFlags::PASSTHROUGH_ALL,
            )
        });
    }

    /// Draws `num_sprites` sprites of `image` from separate arrays. A missing
    /// array takes the default of its field.
    pub fn blit_batch_separate(
        &mut self,
        image: ImageHandle,
        target: TargetHandle,
        num_sprites: usize,
        positions: Option<&[f32]>,
        src_rects: Option<&[f32]>,
        colors: Option<&[f32]>,
        flags: BlitFlags,
    ) {
        self.dispatch("blit_batch_separate", |b| {
            non_nil(image, "image")?;
            non_nil(target, "target")?;

            if num_sprites == 0 {
                return Ok(());
            }

            if positions.is_none() && src_rects.is_none() && colors.is_none() {
                return b.blit_batch(image, target, num_sprites, None, flags);
            }

            let extent = image_extent(b, image)?;
            let vertices = batch::normalize_sprites_separate(
                &extent,
                num_sprites,
                positions,
                src_rects,
                colors,
                flags,
            )?;

            b.blit_batch(
                image,
                target,
                num_sprites,
                Some(batch::as_floats(&vertices)),
                flags | BlitFlags::PASSTHROUGH_ALL,
            )
        });
    }

    /// Draws triangles from an interleaved vertex buffer, optionally indexed.
    ///
    /// Unless `flags` says otherwise, every vertex is given as its position
    /// (2 floats), its texture coordinates in pixels (2 floats) and its color
    /// in bytes (4 floats). Without `image`, vertices carry no texture
    /// coordinates.
    pub fn triangle_batch(
        &mut self,
        image: Option<ImageHandle>,
        target: TargetHandle,
        num_vertices: usize,
        values: Option<&[f32]>,
        indices: Option<&[u16]>,
        flags: BlitFlags,
    ) {
        self.dispatch("triangle_batch", |b| {
            if let Some(image) = image {
                non_nil(image, "image")?;
            }

            non_nil(target, "target")?;

            if num_vertices == 0 {
                return Ok(());
            }

            let values = match values {
                Some(v) if !flags.contains(BlitFlags::PASSTHROUGH_ALL) => v,
                _ => {
                    return b.triangle_batch(image, target, num_vertices, values, indices, flags);
                }
            };

            let extent = match image {
                Some(image) => Some(image_extent(b, image)?),
                None => None,
            };

            let vertices = batch::normalize_triangles(extent.as_ref(), num_vertices, values, flags)?;
            b.triangle_batch(
                image,
                target,
                num_vertices,
                Some(batch::as_floats(&vertices)),
                indices,
                flags | BlitFlags::PASSTHROUGH_ALL,
            )
        });
    }

    /// Clears `target` to transparent black.
    pub fn clear(&mut self, target: TargetHandle) {
        self.clear_with("clear", target, Color::TRANSPARENT);
    }

    pub fn clear_color(&mut self, target: TargetHandle, color: Color) {
        self.clear_with("clear_color", target, color);
    }

    pub fn clear_rgb(&mut self, target: TargetHandle, r: u8, g: u8, b: u8) {
        self.clear_with("clear_rgb", target, Color::rgb(r, g, b));
    }

    pub fn clear_rgba(&mut self, target: TargetHandle, r: u8, g: u8, b: u8, a: u8) {
        self.clear_with("clear_rgba", target, Color::rgba(r, g, b, a));
    }

    fn clear_with(&mut self, function: &str, target: TargetHandle, color: Color) {
        self.dispatch(function, |b| {
            non_nil(target, "target")?;
            b.clear_rgba(target, color)
        });
    }

    /// Submits the pending blits of the current renderer.
    pub fn flush_blit_buffer(&mut self) {
        self.dispatch("flush_blit_buffer", |b| b.flush_blit_buffer());
    }

    /// Presents the window of `target`.
    pub fn flip(&mut self, target: TargetHandle) {
        self.dispatch("flip", |b| {
            non_nil(target, "target")?;
            b.flip(target)
        });
    }

    /// Reads back one pixel of `target`. Coordinates outside of the target
    /// read as transparent black.
    pub fn get_pixel(&mut self, target: TargetHandle, x: i16, y: i16) -> Option<Color> {
        self.dispatch("get_pixel", |b| {
            non_nil(target, "target")?;
            b.get_pixel(target, x, y)
        })
    }
}

use super::{context_mut, image_mut, image_ref, non_nil, target_mut, GpuSystem};

use crate::assets::prelude::*;
use crate::math::Rect;
use crate::utils::Color;

impl GpuSystem {
    /// Restricts drawing on `target` to `rect`. Returns the resulting clip
    /// rectangle.
    pub fn set_clip_rect(&mut self, target: TargetHandle, rect: Rect) -> Option<Rect> {
        self.dispatch("set_clip_rect", |b| {
            non_nil(target, "target")?;
            b.set_clip(target, rect.x as i16, rect.y as i16, rect.w as u16, rect.h as u16)
        })
    }

    pub fn set_clip(&mut self, target: TargetHandle, x: i16, y: i16, w: u16, h: u16) -> Option<Rect> {
        self.dispatch("set_clip", |b| {
            non_nil(target, "target")?;
            b.set_clip(target, x, y, w, h)
        })
    }

    pub fn unset_clip(&mut self, target: TargetHandle) {
        self.dispatch("unset_clip", |b| {
            non_nil(target, "target")?;
            b.unset_clip(target)
        });
    }
}

impl GpuSystem {
    /// Sets the modulation color of `image`.
    pub fn set_color(&mut self, image: ImageHandle, color: Color) {
        self.image_color("set_color", image, color);
    }

    pub fn set_rgb(&mut self, image: ImageHandle, r: u8, g: u8, b: u8) {
        self.image_color("set_rgb", image, Color::rgb(r, g, b));
    }

    pub fn set_rgba(&mut self, image: ImageHandle, r: u8, g: u8, b: u8, a: u8) {
        self.image_color("set_rgba", image, Color::rgba(r, g, b, a));
    }

    /// Resets the modulation color of `image` to white.
    pub fn unset_color(&mut self, image: ImageHandle) {
        self.image_color("unset_color", image, Color::WHITE);
    }

    fn image_color(&mut self, function: &str, image: ImageHandle, color: Color) {
        self.dispatch(function, |b| {
            non_nil(image, "image")?;
            image_mut(b, image)?.color = color;
            Ok(())
        });
    }

    /// Sets the modulation color of everything drawn onto `target`.
    pub fn set_target_color(&mut self, target: TargetHandle, color: Color) {
        self.target_color("set_target_color", target, color);
    }

    pub fn set_target_rgb(&mut self, target: TargetHandle, r: u8, g: u8, b: u8) {
        self.target_color("set_target_rgb", target, Color::rgb(r, g, b));
    }

    pub fn set_target_rgba(&mut self, target: TargetHandle, r: u8, g: u8, b: u8, a: u8) {
        self.target_color("set_target_rgba", target, Color::rgba(r, g, b, a));
    }

    pub fn unset_target_color(&mut self, target: TargetHandle) {
        self.target_color("unset_target_color", target, Color::WHITE);
    }

    fn target_color(&mut self, function: &str, target: TargetHandle, color: Color) {
        self.dispatch(function, |b| {
            non_nil(target, "target")?;
            let target = target_mut(b, target)?;
            // White modulation is the identity.
            target.use_color = color != Color::WHITE;
            target.color = color;
            Ok(())
        });
    }
}

impl GpuSystem {
    pub fn blending(&mut self, image: ImageHandle) -> Option<bool> {
        self.dispatch("blending", |b| {
            non_nil(image, "image")?;
            Ok(image_ref(b, image)?.use_blending)
        })
    }

    pub fn set_blending(&mut self, image: ImageHandle, enable: bool) {
        self.dispatch("set_blending", |b| {
            non_nil(image, "image")?;
            image_mut(b, image)?.use_blending = enable;
            Ok(())
        });
    }

    /// Enables blending of shapes drawn in the current context.
    pub fn set_shape_blending(&mut self, enable: bool) {
        self.dispatch("set_shape_blending", |b| {
            context_mut(b)?.shapes_use_blending = enable;
            Ok(())
        });
    }

    pub fn set_blend_function(
        &mut self,
        image: ImageHandle,
        source_color: BlendFunc,
        dest_color: BlendFunc,
        source_alpha: BlendFunc,
        dest_alpha: BlendFunc,
    ) {
        self.dispatch("set_blend_function", |b| {
            non_nil(image, "image")?;
            let mode = &mut image_mut(b, image)?.blend_mode;
            mode.source_color = source_color;
            mode.dest_color = dest_color;
            mode.source_alpha = source_alpha;
            mode.dest_alpha = dest_alpha;
            Ok(())
        });
    }

    pub fn set_blend_equation(&mut self, image: ImageHandle, color_equation: BlendEq, alpha_equation: BlendEq) {
        self.dispatch("set_blend_equation", |b| {
            non_nil(image, "image")?;
            let mode = &mut image_mut(b, image)?.blend_mode;
            mode.color_equation = color_equation;
            mode.alpha_equation = alpha_equation;
            Ok(())
        });
    }

    pub fn set_blend_mode(&mut self, image: ImageHandle, preset: BlendPreset) {
        self.dispatch("set_blend_mode", |b| {
            non_nil(image, "image")?;
            image_mut(b, image)?.blend_mode = BlendMode::from_preset(preset);
            Ok(())
        });
    }

    pub fn set_shape_blend_function(
        &mut self,
        source_color: BlendFunc,
        dest_color: BlendFunc,
        source_alpha: BlendFunc,
        dest_alpha: BlendFunc,
    ) {
        self.dispatch("set_shape_blend_function", |b| {
            let mode = &mut context_mut(b)?.shapes_blend_mode;
            mode.source_color = source_color;
            mode.dest_color = dest_color;
            mode.source_alpha = source_alpha;
            mode.dest_alpha = dest_alpha;
            Ok(())
        });
    }

    pub fn set_shape_blend_equation(&mut self, color_equation: BlendEq, alpha_equation: BlendEq) {
        self.dispatch("set_shape_blend_equation", |b| {
            let mode = &mut context_mut(b)?.shapes_blend_mode;
            mode.color_equation = color_equation;
            mode.alpha_equation = alpha_equation;
            Ok(())
        });
    }

    pub fn set_shape_blend_mode(&mut self, preset: BlendPreset) {
        self.dispatch("set_shape_blend_mode", |b| {
            context_mut(b)?.shapes_blend_mode = BlendMode::from_preset(preset);
            Ok(())
        });
    }
}

impl GpuSystem {
    pub fn set_image_filter(&mut self, image: ImageHandle, filter: FilterMode) {
        self.dispatch("set_image_filter", |b| {
            non_nil(image, "image")?;
            b.set_image_filter(image, filter)
        });
    }

    pub fn snap_mode(&mut self, image: ImageHandle) -> Option<SnapMode> {
        self.dispatch("snap_mode", |b| {
            non_nil(image, "image")?;
            Ok(image_ref(b, image)?.snap_mode)
        })
    }

    pub fn set_snap_mode(&mut self, image: ImageHandle, mode: SnapMode) {
        self.dispatch("set_snap_mode", |b| {
            non_nil(image, "image")?;
            image_mut(b, image)?.snap_mode = mode;
            Ok(())
        });
    }

    pub fn set_wrap_mode(&mut self, image: ImageHandle, wrap_x: WrapMode, wrap_y: WrapMode) {
        self.dispatch("set_wrap_mode", |b| {
            non_nil(image, "image")?;
            b.set_wrap_mode(image, wrap_x, wrap_y)
        });
    }
}

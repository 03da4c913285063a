//! Render targets. A target either renders into an image or owns a window
//! context.

use crate::assets::blend::BlendMode;
use crate::assets::image::ImageHandle;
use crate::math::{Camera, Rect};
use crate::renderer::RendererId;
use crate::utils::Color;

impl_handle!(TargetHandle);

/// The per-window rendering state owned by a context target.
#[derive(Debug, Clone, PartialEq)]
pub struct Context {
    pub window_id: u32,
    /// Actual window dimensions.
    pub window_w: u32,
    pub window_h: u32,
    /// Window dimensions to restore when leaving fullscreen.
    pub stored_window_w: u32,
    pub stored_window_h: u32,
    pub current_shader_program: u32,
    pub default_textured_shader_program: u32,
    pub default_untextured_shader_program: u32,
    pub shapes_use_blending: bool,
    pub shapes_blend_mode: BlendMode,
    pub line_thickness: f32,
}

impl Context {
    pub fn new(window_id: u32, w: u32, h: u32) -> Self {
        Context {
            window_id,
            window_w: w,
            window_h: h,
            stored_window_w: w,
            stored_window_h: h,
            current_shader_program: 0,
            default_textured_shader_program: 0,
            default_untextured_shader_program: 0,
            shapes_use_blending: true,
            shapes_blend_mode: BlendMode::default(),
            line_thickness: 1.0,
        }
    }
}

/// The state of a live render target.
#[derive(Debug, Clone, PartialEq)]
pub struct Target {
    pub renderer: RendererId,
    /// The image this target renders into, if any.
    pub image: Option<ImageHandle>,
    /// Virtual dimensions.
    pub w: u16,
    pub h: u16,
    /// Dimensions of the backing surface.
    pub base_w: u16,
    pub base_h: u16,
    pub using_virtual_resolution: bool,
    pub viewport: Rect,
    pub camera: Camera,
    pub use_clip_rect: bool,
    pub clip_rect: Rect,
    pub use_color: bool,
    pub color: Color,
    /// True if this target shares its backing surface with another target.
    pub is_alias: bool,
    pub context: Option<Context>,
}

impl Target {
    pub fn new(renderer: RendererId, w: u16, h: u16) -> Self {
        Target {
            renderer,
            image: None,
            w,
            h,
            base_w: w,
            base_h: h,
            using_virtual_resolution: false,
            viewport: Rect::new(0.0, 0.0, f32::from(w), f32::from(h)),
            camera: Camera::default(),
            use_clip_rect: false,
            clip_rect: Rect::new(0.0, 0.0, f32::from(w), f32::from(h)),
            use_color: false,
            color: Color::WHITE,
            is_alias: false,
            context: None,
        }
    }
}

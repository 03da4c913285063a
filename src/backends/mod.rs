//! The backend of renderer, which should be responsible for only one thing:
//! executing the operations of the front-end against one graphics API.
//!
//! Every `GpuSystem` entry point validates its input and forwards to exactly
//! one method of `Backend`. Backends never see nil handles, but they must
//! reject handles that do not belong to them.

#[cfg(feature = "headless")]
pub mod headless;

use crate::assets::prelude::*;
use crate::batch::BlitFlags;
use crate::codec::{self, Surface};
use crate::errors::*;
use crate::math::{Camera, Matrix3, Rect};
use crate::renderer::{RendererId, RendererRegistry};
use crate::utils::Color;

/// Everything a backend needs to bring up its first context.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InitParams {
    pub w: u16,
    pub h: u16,
    pub window_flags: WindowFlags,
    pub init_flags: InitFlags,
    pub required_features: Features,
    /// An existing window to render into, or `0` to create one.
    pub window_id: u32,
}

pub trait Backend {
    /// The identity of this instance. `index` is its slot in the active
    /// renderer table once it has been added there.
    fn id(&self) -> RendererId;

    fn set_index(&mut self, index: i32);

    /// The identity the instance was requested with.
    fn requested_id(&self) -> RendererId;

    fn enabled_features(&self) -> Features;

    /// The target owning the current context, if any.
    fn context_target(&self) -> Option<TargetHandle>;

    fn image(&self, image: ImageHandle) -> Option<&Image>;

    fn image_mut(&mut self, image: ImageHandle) -> Option<&mut Image>;

    fn target(&self, target: TargetHandle) -> Option<&Target>;

    fn target_mut(&mut self, target: TargetHandle) -> Option<&mut Target>;

    /// Creates the first window and context. Returns the context target.
    fn init(&mut self, params: &InitParams) -> Result<TargetHandle>;

    /// Called whenever this instance becomes the current renderer.
    fn set_as_current(&mut self) -> Result<()>;

    /// Re-applies cached state after client code touched the graphics API
    /// directly.
    fn reset_renderer_state(&mut self) -> Result<()>;

    /// Releases every object and context of this instance.
    fn quit(&mut self) -> Result<()>;

    fn create_target_from_window(&mut self, window_id: u32) -> Result<TargetHandle>;

    fn create_alias_target(&mut self, target: TargetHandle) -> Result<TargetHandle>;

    /// Makes the context of `target` current and binds it to `window_id`.
    fn make_current(&mut self, target: TargetHandle, window_id: u32) -> Result<()>;

    /// Returns the resulting fullscreen state.
    fn set_fullscreen(&mut self, enable: bool, use_desktop_resolution: bool) -> Result<bool>;

    fn fullscreen(&self) -> Result<bool>;

    fn set_window_resolution(&mut self, w: u16, h: u16) -> Result<()>;

    fn set_virtual_resolution(&mut self, target: TargetHandle, w: u16, h: u16) -> Result<()>;

    fn unset_virtual_resolution(&mut self, target: TargetHandle) -> Result<()>;

    /// Returns the previous camera.
    fn set_camera(&mut self, target: TargetHandle, camera: Camera) -> Result<Camera>;

    fn create_image(&mut self, w: u16, h: u16, format: ImageFormat) -> Result<ImageHandle>;

    fn create_image_using_texture(&mut self, texture: u32, take_ownership: bool) -> Result<ImageHandle>;

    fn create_alias_image(&mut self, image: ImageHandle) -> Result<ImageHandle>;

    fn copy_image(&mut self, image: ImageHandle) -> Result<ImageHandle>;

    /// Copies `surface_rect` of `surface` into `image_rect` of `image`. `None`
    /// stands for the whole surface or image.
    fn update_image(
        &mut self,
        image: ImageHandle,
        image_rect: Option<Rect>,
        surface: &Surface,
        surface_rect: Option<Rect>,
    ) -> Result<()>;

    fn update_image_bytes(
        &mut self,
        image: ImageHandle,
        image_rect: Option<Rect>,
        bytes: &[u8],
        bytes_per_row: usize,
    ) -> Result<()>;

    fn copy_image_from_surface(&mut self, surface: &Surface) -> Result<ImageHandle>;

    fn copy_image_from_target(&mut self, target: TargetHandle) -> Result<ImageHandle>;

    fn copy_surface_from_target(&mut self, target: TargetHandle) -> Result<Surface>;

    fn copy_surface_from_image(&mut self, image: ImageHandle) -> Result<Surface>;

    fn free_image(&mut self, image: ImageHandle) -> Result<()>;

    /// Returns the render target of `image`, creating it on first use.
    fn load_target(&mut self, image: ImageHandle) -> Result<TargetHandle>;

    fn free_target(&mut self, target: TargetHandle) -> Result<()>;

    fn generate_mipmaps(&mut self, image: ImageHandle) -> Result<()>;

    /// Decodes an image file and uploads it.
    fn load_image(&mut self, path: &str) -> Result<ImageHandle> {
        let surface = codec::load_surface(path)?;
        self.copy_image_from_surface(&surface)
    }

    /// Downloads an image and encodes it into a file.
    fn save_image(&mut self, image: ImageHandle, path: &str, format: FileFormat) -> Result<()> {
        let surface = self.copy_surface_from_image(image)?;
        codec::save_surface(&surface, path, format)
    }

    fn blit(
        &mut self,
        image: ImageHandle,
        src_rect: Option<Rect>,
        target: TargetHandle,
        x: f32,
        y: f32,
    ) -> Result<()>;

    fn blit_rotate(
        &mut self,
        image: ImageHandle,
        src_rect: Option<Rect>,
        target: TargetHandle,
        x: f32,
        y: f32,
        degrees: f32,
    ) -> Result<()>;

    fn blit_scale(
        &mut self,
        image: ImageHandle,
        src_rect: Option<Rect>,
        target: TargetHandle,
        x: f32,
        y: f32,
        scale_x: f32,
        scale_y: f32,
    ) -> Result<()>;

    fn blit_transform(
        &mut self,
        image: ImageHandle,
        src_rect: Option<Rect>,
        target: TargetHandle,
        x: f32,
        y: f32,
        degrees: f32,
        scale_x: f32,
        scale_y: f32,
    ) -> Result<()>;

    fn blit_transform_x(
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
    ) -> Result<()>;

    fn blit_transform_matrix(
        &mut self,
        image: ImageHandle,
        src_rect: Option<Rect>,
        target: TargetHandle,
        x: f32,
        y: f32,
        matrix: &Matrix3<f32>,
    ) -> Result<()>;

    /// Draws `num_sprites` quads. Unless `values` is `None`, it holds
    /// `num_sprites * 4` canonical vertices and `flags` contains
    /// `BlitFlags::PASSTHROUGH_ALL`.
    fn blit_batch(
        &mut self,
        image: ImageHandle,
        target: TargetHandle,
        num_sprites: usize,
        values: Option<&[f32]>,
        flags: BlitFlags,
    ) -> Result<()>;

    /// Draws indexed triangles from canonical vertices.
    fn triangle_batch(
        &mut self,
        image: Option<ImageHandle>,
        target: TargetHandle,
        num_vertices: usize,
        values: Option<&[f32]>,
        indices: Option<&[u16]>,
        flags: BlitFlags,
    ) -> Result<()>;

    /// Returns the resulting clip rectangle.
    fn set_clip(&mut self, target: TargetHandle, x: i16, y: i16, w: u16, h: u16) -> Result<Rect>;

    fn unset_clip(&mut self, target: TargetHandle) -> Result<()>;

    fn get_pixel(&mut self, target: TargetHandle, x: i16, y: i16) -> Result<Color>;

    fn set_image_filter(&mut self, image: ImageHandle, filter: FilterMode) -> Result<()>;

    fn set_wrap_mode(&mut self, image: ImageHandle, wrap_x: WrapMode, wrap_y: WrapMode) -> Result<()>;

    fn clear_rgba(&mut self, target: TargetHandle, color: Color) -> Result<()>;

    fn flush_blit_buffer(&mut self) -> Result<()>;

    fn flip(&mut self, target: TargetHandle) -> Result<()>;

    fn compile_shader(&mut self, _: ShaderType, _: &str) -> Result<u32> {
        Err(Error::unsupported("Shaders are not supported by this renderer."))
    }

    fn create_shader_program(&mut self) -> Result<u32> {
        Err(Error::unsupported("Shaders are not supported by this renderer."))
    }

    fn link_shader_program(&mut self, _: u32) -> Result<()> {
        Err(Error::unsupported("Shaders are not supported by this renderer."))
    }

    fn free_shader(&mut self, _: u32) -> Result<()> {
        Err(Error::unsupported("Shaders are not supported by this renderer."))
    }

    fn free_shader_program(&mut self, _: u32) -> Result<()> {
        Err(Error::unsupported("Shaders are not supported by this renderer."))
    }

    fn attach_shader(&mut self, _: u32, _: u32) -> Result<()> {
        Err(Error::unsupported("Shaders are not supported by this renderer."))
    }

    fn detach_shader(&mut self, _: u32, _: u32) -> Result<()> {
        Err(Error::unsupported("Shaders are not supported by this renderer."))
    }

    /// Activates `program`, or the default program when it is `0`.
    fn activate_shader_program(&mut self, _: u32, _: Option<&ShaderBlock>) -> Result<()> {
        Err(Error::unsupported("Shaders are not supported by this renderer."))
    }

    fn deactivate_shader_program(&mut self) -> Result<()> {
        Err(Error::unsupported("Shaders are not supported by this renderer."))
    }

    /// The log of the last failed compilation or link.
    fn shader_message(&self) -> String {
        String::new()
    }

    fn attribute_location(&self, _: u32, _: &str) -> Result<i32> {
        Err(Error::unsupported("Shaders are not supported by this renderer."))
    }

    fn uniform_location(&self, _: u32, _: &str) -> Result<i32> {
        Err(Error::unsupported("Shaders are not supported by this renderer."))
    }

    fn load_shader_block(&mut self, _: u32, _: &ShaderBlockNames) -> Result<ShaderBlock> {
        Err(Error::unsupported("Shaders are not supported by this renderer."))
    }

    fn set_shader_block(&mut self, _: ShaderBlock) -> Result<()> {
        Err(Error::unsupported("Shaders are not supported by this renderer."))
    }

    fn set_shader_image(&mut self, _: ImageHandle, _: i32, _: u32) -> Result<()> {
        Err(Error::unsupported("Shaders are not supported by this renderer."))
    }

    fn uniformiv(&self, _: u32, _: i32) -> Result<Vec<i32>> {
        Err(Error::unsupported("Shaders are not supported by this renderer."))
    }

    fn set_uniformi(&mut self, _: i32, _: i32) -> Result<()> {
        Err(Error::unsupported("Shaders are not supported by this renderer."))
    }

    fn set_uniformiv(&mut self, _: i32, _: u32, _: &[i32]) -> Result<()> {
        Err(Error::unsupported("Shaders are not supported by this renderer."))
    }

    fn uniformuiv(&self, _: u32, _: i32) -> Result<Vec<u32>> {
        Err(Error::unsupported("Shaders are not supported by this renderer."))
    }

    fn set_uniformui(&mut self, _: i32, _: u32) -> Result<()> {
        Err(Error::unsupported("Shaders are not supported by this renderer."))
    }

    fn set_uniformuiv(&mut self, _: i32, _: u32, _: &[u32]) -> Result<()> {
        Err(Error::unsupported("Shaders are not supported by this renderer."))
    }

    fn uniformfv(&self, _: u32, _: i32) -> Result<Vec<f32>> {
        Err(Error::unsupported("Shaders are not supported by this renderer."))
    }

    fn set_uniformf(&mut self, _: i32, _: f32) -> Result<()> {
        Err(Error::unsupported("Shaders are not supported by this renderer."))
    }

    fn set_uniformfv(&mut self, _: i32, _: u32, _: &[f32]) -> Result<()> {
        Err(Error::unsupported("Shaders are not supported by this renderer."))
    }

    /// Sets `num_matrices` matrices of `num_rows` by `num_columns`.
    fn set_uniform_matrixfv(&mut self, _: i32, _: u32, _: u32, _: u32, _: bool, _: &[f32]) -> Result<()> {
        Err(Error::unsupported("Shaders are not supported by this renderer."))
    }

    fn set_attributef(&mut self, _: i32, _: f32) -> Result<()> {
        Err(Error::unsupported("Shaders are not supported by this renderer."))
    }

    fn set_attributei(&mut self, _: i32, _: i32) -> Result<()> {
        Err(Error::unsupported("Shaders are not supported by this renderer."))
    }

    fn set_attributeui(&mut self, _: i32, _: u32) -> Result<()> {
        Err(Error::unsupported("Shaders are not supported by this renderer."))
    }

    fn set_attributefv(&mut self, _: i32, _: &[f32]) -> Result<()> {
        Err(Error::unsupported("Shaders are not supported by this renderer."))
    }

    fn set_attributeiv(&mut self, _: i32, _: &[i32]) -> Result<()> {
        Err(Error::unsupported("Shaders are not supported by this renderer."))
    }

    fn set_attributeuiv(&mut self, _: i32, _: &[u32]) -> Result<()> {
        Err(Error::unsupported("Shaders are not supported by this renderer."))
    }

    /// Feeds a per-vertex attribute from `source` for the next `num_values`
    /// vertices.
    fn set_attribute_source(&mut self, _: usize, _: Attribute) -> Result<()> {
        Err(Error::unsupported("Shaders are not supported by this renderer."))
    }
}

/// Registers every backend compiled into this build.
pub fn register_builtin(registry: &mut RendererRegistry) {
    #[cfg(feature = "headless")]
    {
        registry.register(Box::new(self::headless::HeadlessFactory::new()));
    }

    #[cfg(not(feature = "headless"))]
    {
        let _ = registry;
    }
}

//! An in-memory renderer without any graphics API behind it.
//!
//! Objects, windows, shaders and uniforms behave like they would on a real
//! renderer, but nothing is rasterized: draw calls are recorded into a
//! `Journal` instead, and pixel reads return what the last clear or upload
//! left behind.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use super::{Backend, InitParams};
use crate::assets::prelude::*;
use crate::batch::BlitFlags;
use crate::codec::Surface;
use crate::errors::*;
use crate::math::{Camera, Matrix3, Rect};
use crate::renderer::{BackendFactory, RendererFamily, RendererId};
use crate::utils::{Color, ObjectPool};

const DEFAULT_WINDOW_SIZE: (u32, u32) = (640, 480);

/// A call received by a headless renderer or its factory.
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Create(RendererId),
    Destroy(RendererId),
    Init(RendererId),
    Quit(RendererId),
    Blit {
        op: &'static str,
        image: ImageHandle,
        target: TargetHandle,
        x: f32,
        y: f32,
    },
    BlitBatch {
        image: ImageHandle,
        target: TargetHandle,
        num_sprites: usize,
        values: Option<Vec<f32>>,
        /// Address of the first value, to tell forwarded buffers from copies.
        address: Option<usize>,
        flags: BlitFlags,
    },
    TriangleBatch {
        image: Option<ImageHandle>,
        target: TargetHandle,
        num_vertices: usize,
        values: Option<Vec<f32>>,
        address: Option<usize>,
        indices: Option<Vec<u16>>,
        flags: BlitFlags,
    },
    Clear {
        target: TargetHandle,
        color: Color,
    },
    Flip(TargetHandle),
    Op(&'static str),
}

/// A shared, append-only log of `Call`s.
#[derive(Debug, Clone, Default)]
pub struct Journal(Rc<RefCell<Vec<Call>>>);

impl Journal {
    pub fn new() -> Self {
        Journal::default()
    }

    #[inline]
    pub fn record(&self, call: Call) {
        self.0.borrow_mut().push(call);
    }

    pub fn calls(&self) -> Vec<Call> {
        self.0.borrow().clone()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.0.borrow().len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0.borrow().is_empty()
    }

    /// Counts the calls matching `predicate`.
    pub fn count<P: Fn(&Call) -> bool>(&self, predicate: P) -> usize {
        self.0.borrow().iter().filter(|v| predicate(v)).count()
    }

    #[inline]
    pub fn clear(&self) {
        self.0.borrow_mut().clear();
    }
}

/// Creates `HeadlessBackend`s. Besides its own family, the factory can stand
/// in for any other family and be told to fail, which makes it the building
/// block for exercising renderer selection.
#[derive(Debug, Clone)]
pub struct HeadlessFactory {
    id: RendererId,
    features: Option<Features>,
    fail_create: bool,
    fail_init: bool,
    fail_quit: bool,
    journal: Journal,
}

impl Default for HeadlessFactory {
    fn default() -> Self {
        HeadlessFactory::new()
    }
}

impl HeadlessFactory {
    pub fn new() -> Self {
        HeadlessFactory::impersonate(RendererId::new(RendererFamily::Headless, 1, 0))
    }

    /// A factory registering itself under `id`.
    pub fn impersonate(id: RendererId) -> Self {
        HeadlessFactory {
            id: id.with_index(-1),
            features: None,
            fail_create: false,
            fail_init: false,
            fail_quit: false,
            journal: Journal::new(),
        }
    }

    /// Instances fail to create their first context.
    pub fn failing(mut self) -> Self {
        self.fail_init = true;
        self
    }

    /// Instances report an error when they shut down.
    pub fn failing_quit(mut self) -> Self {
        self.fail_quit = true;
        self
    }

    /// The factory fails to create instances at all.
    pub fn refusing(mut self) -> Self {
        self.fail_create = true;
        self
    }

    /// Overrides the features instances report.
    pub fn with_features(mut self, features: Features) -> Self {
        self.features = Some(features);
        self
    }

    /// Records into `journal` instead of a private one.
    pub fn with_journal(mut self, journal: Journal) -> Self {
        self.journal = journal;
        self
    }

    #[inline]
    pub fn journal(&self) -> Journal {
        self.journal.clone()
    }
}

impl BackendFactory for HeadlessFactory {
    fn id(&self) -> RendererId {
        self.id
    }

    fn create(&self, request: RendererId) -> Result<Box<dyn Backend>> {
        if self.fail_create {
            return Err(Error::backend(format!("{} refused to create an instance.", request)));
        }

        let id = RendererId::new(request.family, request.major_version, request.minor_version);
        let features = self.features.unwrap_or_else(|| family_features(id.family));

        self.journal.record(Call::Create(id));
        let mut backend = HeadlessBackend::new(id, features, self.journal.clone());
        backend.fail_init = self.fail_init;
        backend.fail_quit = self.fail_quit;
        Ok(Box::new(backend))
    }

    fn destroy(&self, backend: Box<dyn Backend>) {
        self.journal.record(Call::Destroy(backend.id()));
        drop(backend);
    }
}

fn family_features(family: RendererFamily) -> Features {
    let base = Features::NON_POWER_OF_TWO
        | Features::RENDER_TARGETS
        | Features::BLEND_EQUATIONS
        | Features::BLEND_FUNC_SEPARATE
        | Features::BLEND_EQUATIONS_SEPARATE
        | Features::WRAP_REPEAT_MIRRORED;

    match family {
        RendererFamily::OpenGL1Base => Features::NON_POWER_OF_TWO | Features::RENDER_TARGETS,
        RendererFamily::OpenGL1 | RendererFamily::GLES1 => base,
        RendererFamily::OpenGL2 | RendererFamily::GLES2 | RendererFamily::GLES3 => {
            base | Features::BASIC_SHADERS
        }
        _ => base | Features::ALL_SHADERS | Features::GL_BGR | Features::GL_BGRA,
    }
}

#[derive(Debug, Clone, Copy)]
struct Window {
    w: u32,
    h: u32,
    fullscreen: bool,
}

#[derive(Debug, Clone)]
struct Texture {
    pixels: Vec<u8>,
    w: u32,
    h: u32,
    channels: u32,
    refs: u32,
}

#[derive(Debug, Clone)]
struct Shader {
    kind: ShaderType,
    source: String,
}

#[derive(Debug, Clone, Default)]
struct Program {
    shaders: Vec<u32>,
    linked: bool,
    locations: HashMap<String, i32>,
}

#[derive(Debug, Clone, PartialEq)]
enum Value {
    Int(Vec<i32>),
    UInt(Vec<u32>),
    Float(Vec<f32>),
}

pub struct HeadlessBackend {
    id: RendererId,
    features: Features,
    journal: Journal,
    fail_init: bool,
    fail_quit: bool,

    context: Option<TargetHandle>,
    windows: HashMap<u32, Window>,
    next_window: u32,

    images: ObjectPool<ImageHandle, Image>,
    image_textures: HashMap<ImageHandle, u32>,
    textures: HashMap<u32, Texture>,
    targets: ObjectPool<TargetHandle, Target>,
    clear_colors: HashMap<TargetHandle, Color>,

    shaders: HashMap<u32, Shader>,
    programs: HashMap<u32, Program>,
    next_object: u32,
    shader_message: String,
    block: ShaderBlock,
    uniforms: HashMap<(u32, i32), Value>,
    attributes: HashMap<i32, Value>,
    attribute_sources: HashMap<i32, (usize, Attribute)>,
    shader_images: HashMap<i32, (ImageHandle, u32)>,
}

impl HeadlessBackend {
    pub fn new(id: RendererId, features: Features, journal: Journal) -> Self {
        HeadlessBackend {
            id,
            features,
            journal,
            fail_init: false,
            fail_quit: false,
            context: None,
            windows: HashMap::new(),
            next_window: 1,
            images: ObjectPool::new(),
            image_textures: HashMap::new(),
            textures: HashMap::new(),
            targets: ObjectPool::new(),
            clear_colors: HashMap::new(),
            shaders: HashMap::new(),
            programs: HashMap::new(),
            next_object: 1,
            shader_message: String::new(),
            block: ShaderBlock::default(),
            uniforms: HashMap::new(),
            attributes: HashMap::new(),
            attribute_sources: HashMap::new(),
            shader_images: HashMap::new(),
        }
    }

    #[inline]
    pub fn journal(&self) -> Journal {
        self.journal.clone()
    }

    fn next_object(&mut self) -> u32 {
        let v = self.next_object;
        self.next_object += 1;
        v
    }

    fn open_window(&mut self, window_id: u32, w: u32, h: u32) -> u32 {
        let id = if window_id == 0 {
            while self.windows.contains_key(&self.next_window) {
                self.next_window += 1;
            }

            self.next_window
        } else {
            window_id
        };

        self.windows.entry(id).or_insert(Window {
            w,
            h,
            fullscreen: false,
        });

        id
    }

    fn image_ref(&self, image: ImageHandle) -> Result<&Image> {
        self.images
            .get(image)
            .ok_or_else(|| Error::data(format!("{} is invalid.", image)))
    }

    fn image_ref_mut(&mut self, image: ImageHandle) -> Result<&mut Image> {
        self.images
            .get_mut(image)
            .ok_or_else(|| Error::data(format!("{} is invalid.", image)))
    }

    fn target_ref(&self, target: TargetHandle) -> Result<&Target> {
        self.targets
            .get(target)
            .ok_or_else(|| Error::data(format!("{} is invalid.", target)))
    }

    fn target_ref_mut(&mut self, target: TargetHandle) -> Result<&mut Target> {
        self.targets
            .get_mut(target)
            .ok_or_else(|| Error::data(format!("{} is invalid.", target)))
    }

    fn texture(&self, image: ImageHandle) -> Result<&Texture> {
        self.image_textures
            .get(&image)
            .and_then(|v| self.textures.get(v))
            .ok_or_else(|| Error::data(format!("{} has no texture.", image)))
    }

    fn texture_mut(&mut self, image: ImageHandle) -> Result<&mut Texture> {
        let id = *self
            .image_textures
            .get(&image)
            .ok_or_else(|| Error::data(format!("{} has no texture.", image)))?;

        self.textures
            .get_mut(&id)
            .ok_or_else(|| Error::data(format!("{} has no texture.", image)))
    }

    fn create_image_with_texture(&mut self, mut image: Image, texture: u32) -> ImageHandle {
        if let Some(v) = self.textures.get_mut(&texture) {
            v.refs += 1;
        }

        image.renderer = self.id;
        let handle = self.images.create(image);
        self.image_textures.insert(handle, texture);
        handle
    }

    fn require_feature(&self, feature: Features, what: &str) -> Result<()> {
        if self.features.contains(feature) {
            Ok(())
        } else {
            Err(Error::unsupported(format!("{} is not supported by {}.", what, self.id)))
        }
    }

    fn require_shaders(&self) -> Result<()> {
        self.require_feature(Features::BASIC_SHADERS, "Shaders")
    }

    fn context_mut(&mut self) -> Result<&mut Context> {
        let target = self
            .context
            .ok_or_else(|| Error::user("No current context."))?;

        self.target_ref_mut(target)?
            .context
            .as_mut()
            .ok_or_else(|| Error::user("No current context."))
    }

    fn current_program(&self) -> u32 {
        self.context
            .and_then(|v| self.targets.get(v))
            .and_then(|v| v.context.as_ref())
            .map(|v| v.current_shader_program)
            .unwrap_or(0)
    }

    fn create_context_target(&mut self, window_id: u32) -> Result<TargetHandle> {
        let window = *self
            .windows
            .get(&window_id)
            .ok_or_else(|| Error::backend(format!("Window {} does not exist.", window_id)))?;

        let (w, h) = (clamp_u16(window.w), clamp_u16(window.h));
        let mut target = Target::new(self.id, w, h);
        target.context = Some(Context::new(window_id, window.w, window.h));

        let handle = self.targets.create(target);
        if self.features.contains(Features::BASIC_SHADERS) {
            let textured = self.build_default_program()?;
            let untextured = self.build_default_program()?;

            if let Some(ctx) = self.targets.get_mut(handle).and_then(|v| v.context.as_mut()) {
                ctx.default_textured_shader_program = textured;
                ctx.default_untextured_shader_program = untextured;
                ctx.current_shader_program = textured;
            }
        }

        Ok(handle)
    }

    fn build_default_program(&mut self) -> Result<u32> {
        let vs = self.compile_shader(
            ShaderType::Vertex,
            "attribute vec2 gpu_Vertex; attribute vec2 gpu_TexCoord; attribute vec4 gpu_Color; \
             uniform mat4 gpu_ModelViewProjectionMatrix;",
        )?;
        let fs = self.compile_shader(ShaderType::Fragment, "uniform sampler2D tex;")?;
        let program = self.create_shader_program()?;
        self.attach_shader(program, vs)?;
        self.attach_shader(program, fs)?;
        self.link_shader_program(program)?;
        Ok(program)
    }

    fn record_blit(&self, op: &'static str, image: ImageHandle, target: TargetHandle, x: f32, y: f32) -> Result<()> {
        self.image_ref(image)?;
        self.target_ref(target)?;
        self.journal.record(Call::Blit {
            op,
            image,
            target,
            x,
            y,
        });

        Ok(())
    }

    fn set_uniform(&mut self, location: i32, value: Value) -> Result<()> {
        self.require_shaders()?;
        if location < 0 {
            return Ok(());
        }

        let program = self.current_program();
        self.uniforms.insert((program, location), value);
        Ok(())
    }

    fn uniform(&self, program: u32, location: i32) -> Result<&Value> {
        self.require_shaders()?;
        self.uniforms.get(&(program, location)).ok_or_else(|| {
            Error::data(format!(
                "Uniform {} of program {} has no value.",
                location, program
            ))
        })
    }

    fn set_attribute(&mut self, location: i32, value: Value) -> Result<()> {
        self.require_shaders()?;
        if location >= 0 {
            self.attribute_sources.remove(&location);
            self.attributes.insert(location, value);
        }

        Ok(())
    }

    fn location(&self, program: u32, name: &str) -> Result<i32> {
        self.require_shaders()?;
        let program = self
            .programs
            .get(&program)
            .ok_or_else(|| Error::data(format!("Shader program {} does not exist.", program)))?;

        Ok(program.locations.get(name).cloned().unwrap_or(-1))
    }
}

impl Backend for HeadlessBackend {
    fn id(&self) -> RendererId {
        self.id
    }

    fn set_index(&mut self, index: i32) {
        self.id.index = index;
    }

    fn requested_id(&self) -> RendererId {
        self.id.with_index(-1)
    }

    fn enabled_features(&self) -> Features {
        self.features
    }

    fn context_target(&self) -> Option<TargetHandle> {
        self.context
    }

    fn image(&self, image: ImageHandle) -> Option<&Image> {
        self.images.get(image)
    }

    fn image_mut(&mut self, image: ImageHandle) -> Option<&mut Image> {
        self.images.get_mut(image)
    }

    fn target(&self, target: TargetHandle) -> Option<&Target> {
        self.targets.get(target)
    }

    fn target_mut(&mut self, target: TargetHandle) -> Option<&mut Target> {
        self.targets.get_mut(target)
    }

    fn init(&mut self, params: &InitParams) -> Result<TargetHandle> {
        if self.fail_init {
            return Err(Error::backend(format!(
                "{} failed to create a window.",
                self.id
            )));
        }

        if !self.features.contains(params.required_features) {
            return Err(Error::backend(format!(
                "{} does not support the required features ({:?}).",
                self.id,
                params.required_features - self.features
            )));
        }

        if params.w == 0 || params.h == 0 {
            return Err(Error::user(format!(
                "Invalid window size {}x{}.",
                params.w, params.h
            )));
        }

        let window_id = self.open_window(params.window_id, u32::from(params.w), u32::from(params.h));
        if let Some(window) = self.windows.get_mut(&window_id) {
            window.fullscreen = params.window_flags.contains(WindowFlags::FULLSCREEN);
        }

        let target = self.create_context_target(window_id)?;
        self.context = Some(target);
        self.journal.record(Call::Init(self.id));
        Ok(target)
    }

    fn set_as_current(&mut self) -> Result<()> {
        self.journal.record(Call::Op("set_as_current"));
        Ok(())
    }

    fn reset_renderer_state(&mut self) -> Result<()> {
        self.journal.record(Call::Op("reset_renderer_state"));
        Ok(())
    }

    fn quit(&mut self) -> Result<()> {
        self.images.drain();
        self.image_textures.clear();
        self.textures.clear();
        self.targets.drain();
        self.clear_colors.clear();
        self.shaders.clear();
        self.programs.clear();
        self.uniforms.clear();
        self.attributes.clear();
        self.attribute_sources.clear();
        self.shader_images.clear();
        self.windows.clear();
        self.context = None;

        self.journal.record(Call::Quit(self.id));

        if self.fail_quit {
            return Err(Error::backend(format!("{} failed to release its window.", self.id)));
        }

        Ok(())
    }

    fn create_target_from_window(&mut self, window_id: u32) -> Result<TargetHandle> {
        let (w, h) = DEFAULT_WINDOW_SIZE;
        let window_id = self.open_window(window_id, w, h);
        let target = self.create_context_target(window_id)?;

        if self.context.is_none() {
            self.context = Some(target);
        }

        Ok(target)
    }

    fn create_alias_target(&mut self, target: TargetHandle) -> Result<TargetHandle> {
        let mut alias = self.target_ref(target)?.clone();
        alias.is_alias = true;
        Ok(self.targets.create(alias))
    }

    fn make_current(&mut self, target: TargetHandle, window_id: u32) -> Result<()> {
        let (w, h) = DEFAULT_WINDOW_SIZE;
        if window_id != 0 {
            self.open_window(window_id, w, h);
        }

        let ctx = self
            .target_ref_mut(target)?
            .context
            .as_mut()
            .ok_or_else(|| Error::user(format!("{} has no context.", target)))?;

        if window_id != 0 {
            ctx.window_id = window_id;
        }

        self.context = Some(target);
        Ok(())
    }

    fn set_fullscreen(&mut self, enable: bool, _: bool) -> Result<bool> {
        let window_id = self.context_mut()?.window_id;
        let window = self
            .windows
            .get_mut(&window_id)
            .ok_or_else(|| Error::backend(format!("Window {} does not exist.", window_id)))?;

        window.fullscreen = enable;
        Ok(enable)
    }

    fn fullscreen(&self) -> Result<bool> {
        let window_id = self
            .context
            .and_then(|v| self.targets.get(v))
            .and_then(|v| v.context.as_ref())
            .map(|v| v.window_id)
            .ok_or_else(|| Error::user("No current context."))?;

        Ok(self.windows.get(&window_id).map(|v| v.fullscreen).unwrap_or(false))
    }

    fn set_window_resolution(&mut self, w: u16, h: u16) -> Result<()> {
        if w == 0 || h == 0 {
            return Err(Error::user(format!("Invalid window size {}x{}.", w, h)));
        }

        let handle = self
            .context
            .ok_or_else(|| Error::user("No current context."))?;

        let target = self.target_ref_mut(handle)?;
        let window_id = match target.context.as_mut() {
            Some(ctx) => {
                ctx.window_w = u32::from(w);
                ctx.window_h = u32::from(h);
                ctx.stored_window_w = u32::from(w);
                ctx.stored_window_h = u32::from(h);
                ctx.window_id
            }
            None => return Err(Error::user("No current context.")),
        };

        target.base_w = w;
        target.base_h = h;
        if !target.using_virtual_resolution {
            target.w = w;
            target.h = h;
            target.viewport = Rect::new(0.0, 0.0, f32::from(w), f32::from(h));
        }

        if let Some(window) = self.windows.get_mut(&window_id) {
            window.w = u32::from(w);
            window.h = u32::from(h);
        }

        Ok(())
    }

    fn set_virtual_resolution(&mut self, target: TargetHandle, w: u16, h: u16) -> Result<()> {
        if w == 0 || h == 0 {
            return Err(Error::user(format!("Invalid virtual resolution {}x{}.", w, h)));
        }

        let target = self.target_ref_mut(target)?;
        target.w = w;
        target.h = h;
        target.using_virtual_resolution = true;
        Ok(())
    }

    fn unset_virtual_resolution(&mut self, target: TargetHandle) -> Result<()> {
        let target = self.target_ref_mut(target)?;
        target.w = target.base_w;
        target.h = target.base_h;
        target.using_virtual_resolution = false;
        Ok(())
    }

    fn set_camera(&mut self, target: TargetHandle, camera: Camera) -> Result<Camera> {
        let target = self.target_ref_mut(target)?;
        Ok(::std::mem::replace(&mut target.camera, camera))
    }

    fn create_image(&mut self, w: u16, h: u16, format: ImageFormat) -> Result<ImageHandle> {
        if w == 0 || h == 0 {
            return Err(Error::data(format!("Invalid image size {}x{}.", w, h)));
        }

        let channels = format.bytes_per_pixel();
        let texture = self.next_object();
        self.textures.insert(
            texture,
            Texture {
                pixels: vec![0; w as usize * h as usize * channels as usize],
                w: u32::from(w),
                h: u32::from(h),
                channels,
                refs: 0,
            },
        );

        Ok(self.create_image_with_texture(Image::new(self.id, w, h, format), texture))
    }

    fn create_image_using_texture(&mut self, texture: u32, _: bool) -> Result<ImageHandle> {
        let (w, h, channels) = match self.textures.get(&texture) {
            Some(v) => (v.w, v.h, v.channels),
            None => {
                return Err(Error::data(format!("Texture {} does not exist.", texture)));
            }
        };

        let format = ImageFormat::from_channels(channels).unwrap_or(ImageFormat::RGBA);
        let image = Image::new(self.id, clamp_u16(w), clamp_u16(h), format);
        Ok(self.create_image_with_texture(image, texture))
    }

    fn create_alias_image(&mut self, image: ImageHandle) -> Result<ImageHandle> {
        let mut alias = self.image_ref(image)?.clone();
        alias.is_alias = true;
        alias.target = None;

        let texture = *self
            .image_textures
            .get(&image)
            .ok_or_else(|| Error::data(format!("{} has no texture.", image)))?;

        Ok(self.create_image_with_texture(alias, texture))
    }

    fn copy_image(&mut self, image: ImageHandle) -> Result<ImageHandle> {
        let mut copy = self.image_ref(image)?.clone();
        let mut texture = self.texture(image)?.clone();

        copy.is_alias = false;
        copy.target = None;
        texture.refs = 0;

        let id = self.next_object();
        self.textures.insert(id, texture);
        Ok(self.create_image_with_texture(copy, id))
    }

    fn update_image(
        &mut self,
        image: ImageHandle,
        image_rect: Option<Rect>,
        surface: &Surface,
        surface_rect: Option<Rect>,
    ) -> Result<()> {
        let src = surface_rect.unwrap_or_else(|| Rect::new(0.0, 0.0, surface.w as f32, surface.h as f32));
        let texture = self.texture_mut(image)?;
        let dst = image_rect.unwrap_or_else(|| Rect::new(0.0, 0.0, texture.w as f32, texture.h as f32));

        if surface.channels != texture.channels {
            return Err(Error::data(format!(
                "Surface has {} channels, but the image expects {}.",
                surface.channels, texture.channels
            )));
        }

        let w = src.w.min(dst.w).max(0.0) as u32;
        let h = src.h.min(dst.h).max(0.0) as u32;
        let c = texture.channels as usize;

        for row in 0..h {
            for col in 0..w {
                let (sx, sy) = (src.x as u32 + col, src.y as u32 + row);
                let (dx, dy) = (dst.x as u32 + col, dst.y as u32 + row);
                if dx >= texture.w || dy >= texture.h {
                    continue;
                }

                if let Some(pixel) = surface.pixel(sx, sy) {
                    let i = (dy as usize * texture.w as usize + dx as usize) * c;
                    texture.pixels[i..i + c].copy_from_slice(pixel);
                }
            }
        }

        Ok(())
    }

    fn update_image_bytes(
        &mut self,
        image: ImageHandle,
        image_rect: Option<Rect>,
        bytes: &[u8],
        bytes_per_row: usize,
    ) -> Result<()> {
        let texture = self.texture_mut(image)?;
        let dst = image_rect.unwrap_or_else(|| Rect::new(0.0, 0.0, texture.w as f32, texture.h as f32));
        let c = texture.channels as usize;

        let x = dst.x.max(0.0) as usize;
        let y = dst.y.max(0.0) as usize;
        let w = (dst.w.max(0.0) as usize).min((texture.w as usize).saturating_sub(x));
        let h = (dst.h.max(0.0) as usize).min((texture.h as usize).saturating_sub(y));

        if bytes_per_row < w * c || bytes.len() < bytes_per_row * h.saturating_sub(1) + w * c {
            return Err(Error::data(format!(
                "Not enough bytes to update a {}x{} area.",
                w, h
            )));
        }

        for row in 0..h {
            let src = &bytes[row * bytes_per_row..row * bytes_per_row + w * c];
            let i = ((y + row) * texture.w as usize + x) * c;
            texture.pixels[i..i + w * c].copy_from_slice(src);
        }

        Ok(())
    }

    fn copy_image_from_surface(&mut self, surface: &Surface) -> Result<ImageHandle> {
        let format = ImageFormat::from_channels(surface.channels)
            .ok_or_else(|| Error::data(format!("Unsupported number of channels ({}).", surface.channels)))?;

        let image = self.create_image(clamp_u16(surface.w), clamp_u16(surface.h), format)?;
        self.texture_mut(image)?.pixels = surface.pixels.clone();
        Ok(image)
    }

    fn copy_image_from_target(&mut self, target: TargetHandle) -> Result<ImageHandle> {
        let surface = self.copy_surface_from_target(target)?;
        self.copy_image_from_surface(&surface)
    }

    fn copy_surface_from_target(&mut self, target: TargetHandle) -> Result<Surface> {
        let t = self.target_ref(target)?;
        if let Some(image) = t.image {
            return self.copy_surface_from_image(image);
        }

        let color = self.clear_colors.get(&target).cloned().unwrap_or(Color::TRANSPARENT);
        let pixel: [u8; 4] = color.into();
        Surface::filled(u32::from(t.base_w), u32::from(t.base_h), &pixel)
    }

    fn copy_surface_from_image(&mut self, image: ImageHandle) -> Result<Surface> {
        let texture = self.texture(image)?;
        Surface::new(texture.pixels.clone(), texture.w, texture.h, texture.channels)
    }

    fn free_image(&mut self, image: ImageHandle) -> Result<()> {
        let record = self
            .images
            .free(image)
            .ok_or_else(|| Error::data(format!("{} is invalid.", image)))?;

        if let Some(target) = record.target {
            if let Some(t) = self.targets.free(target) {
                if t.context.is_some() && self.context == Some(target) {
                    self.context = None;
                }
            }

            self.clear_colors.remove(&target);
        }

        if let Some(texture) = self.image_textures.remove(&image) {
            let release = match self.textures.get_mut(&texture) {
                Some(v) => {
                    v.refs = v.refs.saturating_sub(1);
                    v.refs == 0
                }
                None => false,
            };

            if release {
                self.textures.remove(&texture);
            }
        }

        Ok(())
    }

    fn load_target(&mut self, image: ImageHandle) -> Result<TargetHandle> {
        self.require_feature(Features::RENDER_TARGETS, "Render targets")?;

        let record = self.image_ref(image)?;
        if let Some(target) = record.target {
            return Ok(target);
        }

        let mut target = Target::new(self.id, record.w, record.h);
        target.base_w = record.base_w;
        target.base_h = record.base_h;
        target.image = Some(image);

        let handle = self.targets.create(target);
        self.image_ref_mut(image)?.target = Some(handle);
        Ok(handle)
    }

    fn free_target(&mut self, target: TargetHandle) -> Result<()> {
        let record = self
            .targets
            .free(target)
            .ok_or_else(|| Error::data(format!("{} is invalid.", target)))?;

        if let Some(image) = record.image {
            if let Some(v) = self.images.get_mut(image) {
                if v.target == Some(target) {
                    v.target = None;
                }
            }
        }

        if self.context == Some(target) {
            self.context = None;
        }

        self.clear_colors.remove(&target);
        Ok(())
    }

    fn generate_mipmaps(&mut self, image: ImageHandle) -> Result<()> {
        self.image_ref_mut(image)?.has_mipmaps = true;
        Ok(())
    }

    fn blit(&mut self, image: ImageHandle, _: Option<Rect>, target: TargetHandle, x: f32, y: f32) -> Result<()> {
        self.record_blit("blit", image, target, x, y)
    }

    fn blit_rotate(
        &mut self,
        image: ImageHandle,
        _: Option<Rect>,
        target: TargetHandle,
        x: f32,
        y: f32,
        _: f32,
    ) -> Result<()> {
        self.record_blit("blit_rotate", image, target, x, y)
    }

    fn blit_scale(
        &mut self,
        image: ImageHandle,
        _: Option<Rect>,
        target: TargetHandle,
        x: f32,
        y: f32,
        _: f32,
        _: f32,
    ) -> Result<()> {
        self.record_blit("blit_scale", image, target, x, y)
    }

    fn blit_transform(
        &mut self,
        image: ImageHandle,
        _: Option<Rect>,
        target: TargetHandle,
        x: f32,
        y: f32,
        _: f32,
        _: f32,
        _: f32,
    ) -> Result<()> {
        self.record_blit("blit_transform", image, target, x, y)
    }

    fn blit_transform_x(
        &mut self,
        image: ImageHandle,
        _: Option<Rect>,
        target: TargetHandle,
        x: f32,
        y: f32,
        _: f32,
        _: f32,
        _: f32,
        _: f32,
        _: f32,
    ) -> Result<()> {
        self.record_blit("blit_transform_x", image, target, x, y)
    }

    fn blit_transform_matrix(
        &mut self,
        image: ImageHandle,
        _: Option<Rect>,
        target: TargetHandle,
        x: f32,
        y: f32,
        _: &Matrix3<f32>,
    ) -> Result<()> {
        self.record_blit("blit_transform_matrix", image, target, x, y)
    }

    fn blit_batch(
        &mut self,
        image: ImageHandle,
        target: TargetHandle,
        num_sprites: usize,
        values: Option<&[f32]>,
        flags: BlitFlags,
    ) -> Result<()> {
        self.image_ref(image)?;
        self.target_ref(target)?;

        self.journal.record(Call::BlitBatch {
            image,
            target,
            num_sprites,
            values: values.map(|v| v.to_vec()),
            address: values.map(|v| v.as_ptr() as usize),
            flags,
        });

        Ok(())
    }

    fn triangle_batch(
        &mut self,
        image: Option<ImageHandle>,
        target: TargetHandle,
        num_vertices: usize,
        values: Option<&[f32]>,
        indices: Option<&[u16]>,
        flags: BlitFlags,
    ) -> Result<()> {
        if let Some(image) = image {
            self.image_ref(image)?;
        }

        self.target_ref(target)?;

        if let Some(indices) = indices {
            if let Some(v) = indices.iter().find(|&&v| v as usize >= num_vertices) {
                return Err(Error::data(format!(
                    "Index {} is out of range of {} vertices.",
                    v, num_vertices
                )));
            }
        }

        self.journal.record(Call::TriangleBatch {
            image,
            target,
            num_vertices,
            values: values.map(|v| v.to_vec()),
            address: values.map(|v| v.as_ptr() as usize),
            indices: indices.map(|v| v.to_vec()),
            flags,
        });

        Ok(())
    }

    fn set_clip(&mut self, target: TargetHandle, x: i16, y: i16, w: u16, h: u16) -> Result<Rect> {
        let target = self.target_ref_mut(target)?;
        target.use_clip_rect = true;
        target.clip_rect = Rect::new(f32::from(x), f32::from(y), f32::from(w), f32::from(h));
        Ok(target.clip_rect)
    }

    fn unset_clip(&mut self, target: TargetHandle) -> Result<()> {
        let target = self.target_ref_mut(target)?;
        target.use_clip_rect = false;
        target.clip_rect = Rect::new(0.0, 0.0, f32::from(target.w), f32::from(target.h));
        Ok(())
    }

    fn get_pixel(&mut self, target: TargetHandle, x: i16, y: i16) -> Result<Color> {
        let t = self.target_ref(target)?;
        if x < 0 || y < 0 || x as u16 >= t.base_w || y as u16 >= t.base_h {
            return Ok(Color::TRANSPARENT);
        }

        if let Some(image) = t.image {
            let texture = self.texture(image)?;
            let c = texture.channels as usize;
            let i = (y as usize * texture.w as usize + x as usize) * c;
            let p = &texture.pixels[i..i + c];

            return Ok(match c {
                1 => Color::rgba(255, 255, 255, p[0]),
                2 => Color::rgba(p[0], p[0], p[0], p[1]),
                3 => Color::rgb(p[0], p[1], p[2]),
                _ => Color::rgba(p[0], p[1], p[2], p[3]),
            });
        }

        Ok(self.clear_colors.get(&target).cloned().unwrap_or(Color::TRANSPARENT))
    }

    fn set_image_filter(&mut self, image: ImageHandle, filter: FilterMode) -> Result<()> {
        self.image_ref_mut(image)?.filter_mode = filter;
        Ok(())
    }

    fn set_wrap_mode(&mut self, image: ImageHandle, wrap_x: WrapMode, wrap_y: WrapMode) -> Result<()> {
        if wrap_x == WrapMode::Mirrored || wrap_y == WrapMode::Mirrored {
            self.require_feature(Features::WRAP_REPEAT_MIRRORED, "Mirrored wrapping")?;
        }

        let image = self.image_ref_mut(image)?;
        image.wrap_mode_x = wrap_x;
        image.wrap_mode_y = wrap_y;
        Ok(())
    }

    fn clear_rgba(&mut self, target: TargetHandle, color: Color) -> Result<()> {
        let image = self.target_ref(target)?.image;
        if let Some(image) = image {
            let texture = self.texture_mut(image)?;
            let rgba: [u8; 4] = color.into();
            let pixel = match texture.channels {
                1 => vec![rgba[3]],
                2 => vec![rgba[0], rgba[3]],
                3 => rgba[..3].to_vec(),
                _ => rgba.to_vec(),
            };

            for chunk in texture.pixels.chunks_mut(pixel.len()) {
                chunk.copy_from_slice(&pixel);
            }
        }

        self.clear_colors.insert(target, color);
        self.journal.record(Call::Clear { target, color });
        Ok(())
    }

    fn flush_blit_buffer(&mut self) -> Result<()> {
        self.journal.record(Call::Op("flush_blit_buffer"));
        Ok(())
    }

    fn flip(&mut self, target: TargetHandle) -> Result<()> {
        self.target_ref(target)?;
        self.journal.record(Call::Flip(target));
        Ok(())
    }

    fn compile_shader(&mut self, kind: ShaderType, source: &str) -> Result<u32> {
        self.require_shaders()?;
        if kind == ShaderType::Geometry {
            self.require_feature(Features::GEOMETRY_SHADER, "Geometry shaders")?;
        }

        if source.trim().is_empty() {
            self.shader_message = format!("Failed to compile {:?} shader: empty source.", kind);
            return Err(Error::backend(self.shader_message.clone()));
        }

        let id = self.next_object();
        self.shaders.insert(
            id,
            Shader {
                kind,
                source: source.to_owned(),
            },
        );

        Ok(id)
    }

    fn create_shader_program(&mut self) -> Result<u32> {
        self.require_shaders()?;
        let id = self.next_object();
        self.programs.insert(id, Program::default());
        Ok(id)
    }

    fn link_shader_program(&mut self, program: u32) -> Result<()> {
        self.require_shaders()?;

        let shaders: Vec<Shader> = match self.programs.get(&program) {
            Some(v) => v
                .shaders
                .iter()
                .filter_map(|v| self.shaders.get(v))
                .cloned()
                .collect(),
            None => {
                return Err(Error::data(format!(
                    "Shader program {} does not exist.",
                    program
                )));
            }
        };

        let has = |kind| shaders.iter().any(|v| v.kind == kind);
        if !has(ShaderType::Vertex) || !has(ShaderType::Fragment) {
            self.shader_message = format!(
                "Failed to link shader program {}: a vertex and a fragment shader are required.",
                program
            );

            return Err(Error::backend(self.shader_message.clone()));
        }

        // Every identifier declared as attribute or uniform gets a location.
        let mut locations = HashMap::new();
        for shader in &shaders {
            let mut words = shader
                .source
                .split(|c: char| c.is_whitespace() || c == ';')
                .filter(|v| !v.is_empty());

            while let Some(word) = words.next() {
                if word == "attribute" || word == "uniform" || word == "in" {
                    if let (Some(_), Some(name)) = (words.next(), words.next()) {
                        let next = locations.len() as i32;
                        locations.entry(name.to_owned()).or_insert(next);
                    }
                }
            }
        }

        if let Some(v) = self.programs.get_mut(&program) {
            v.linked = true;
            v.locations = locations;
        }

        Ok(())
    }

    fn free_shader(&mut self, shader: u32) -> Result<()> {
        self.require_shaders()?;
        self.shaders
            .remove(&shader)
            .map(|_| ())
            .ok_or_else(|| Error::data(format!("Shader {} does not exist.", shader)))
    }

    fn free_shader_program(&mut self, program: u32) -> Result<()> {
        self.require_shaders()?;
        self.programs
            .remove(&program)
            .ok_or_else(|| Error::data(format!("Shader program {} does not exist.", program)))?;

        self.uniforms.retain(|k, _| k.0 != program);
        Ok(())
    }

    fn attach_shader(&mut self, program: u32, shader: u32) -> Result<()> {
        self.require_shaders()?;
        if !self.shaders.contains_key(&shader) {
            return Err(Error::data(format!("Shader {} does not exist.", shader)));
        }

        let program = self
            .programs
            .get_mut(&program)
            .ok_or_else(|| Error::data(format!("Shader program {} does not exist.", program)))?;

        if !program.shaders.contains(&shader) {
            program.shaders.push(shader);
        }

        Ok(())
    }

    fn detach_shader(&mut self, program: u32, shader: u32) -> Result<()> {
        self.require_shaders()?;
        let program = self
            .programs
            .get_mut(&program)
            .ok_or_else(|| Error::data(format!("Shader program {} does not exist.", program)))?;

        program.shaders.retain(|&v| v != shader);
        Ok(())
    }

    fn activate_shader_program(&mut self, program: u32, block: Option<&ShaderBlock>) -> Result<()> {
        self.require_shaders()?;

        let program = if program == 0 {
            self.context_mut()?.default_textured_shader_program
        } else {
            program
        };

        match self.programs.get(&program) {
            Some(v) if v.linked => {}
            Some(_) => {
                return Err(Error::user(format!(
                    "Shader program {} is not linked.",
                    program
                )));
            }
            None => {
                return Err(Error::data(format!(
                    "Shader program {} does not exist.",
                    program
                )));
            }
        }

        self.context_mut()?.current_shader_program = program;
        self.block = match block {
            Some(v) => *v,
            None => self.load_shader_block(program, &ShaderBlockNames::default())?,
        };

        Ok(())
    }

    fn deactivate_shader_program(&mut self) -> Result<()> {
        self.activate_shader_program(0, None)
    }

    fn shader_message(&self) -> String {
        self.shader_message.clone()
    }

    fn attribute_location(&self, program: u32, name: &str) -> Result<i32> {
        self.location(program, name)
    }

    fn uniform_location(&self, program: u32, name: &str) -> Result<i32> {
        self.location(program, name)
    }

    fn load_shader_block(&mut self, program: u32, names: &ShaderBlockNames) -> Result<ShaderBlock> {
        let mut find = |name: Option<&str>| match name {
            Some(v) => self.location(program, v),
            None => Ok(-1),
        };

        Ok(ShaderBlock {
            position_loc: find(names.position)?,
            texcoord_loc: find(names.texcoord)?,
            color_loc: find(names.color)?,
            model_view_projection_loc: find(names.model_view_matrix)?,
        })
    }

    fn set_shader_block(&mut self, block: ShaderBlock) -> Result<()> {
        self.require_shaders()?;
        self.block = block;
        Ok(())
    }

    fn set_shader_image(&mut self, image: ImageHandle, location: i32, image_unit: u32) -> Result<()> {
        self.require_shaders()?;
        self.image_ref(image)?;

        if image_unit == 0 {
            return Err(Error::user("Image unit 0 is reserved for the blitted image."));
        }

        if location >= 0 {
            self.shader_images.insert(location, (image, image_unit));
        }

        Ok(())
    }

    fn uniformiv(&self, program: u32, location: i32) -> Result<Vec<i32>> {
        match self.uniform(program, location)? {
            Value::Int(v) => Ok(v.clone()),
            _ => Err(Error::data(format!("Uniform {} is not an int.", location))),
        }
    }

    fn set_uniformi(&mut self, location: i32, value: i32) -> Result<()> {
        self.set_uniform(location, Value::Int(vec![value]))
    }

    fn set_uniformiv(&mut self, location: i32, _: u32, values: &[i32]) -> Result<()> {
        self.set_uniform(location, Value::Int(values.to_vec()))
    }

    fn uniformuiv(&self, program: u32, location: i32) -> Result<Vec<u32>> {
        match self.uniform(program, location)? {
            Value::UInt(v) => Ok(v.clone()),
            _ => Err(Error::data(format!("Uniform {} is not an unsigned int.", location))),
        }
    }

    fn set_uniformui(&mut self, location: i32, value: u32) -> Result<()> {
        self.set_uniform(location, Value::UInt(vec![value]))
    }

    fn set_uniformuiv(&mut self, location: i32, _: u32, values: &[u32]) -> Result<()> {
        self.set_uniform(location, Value::UInt(values.to_vec()))
    }

    fn uniformfv(&self, program: u32, location: i32) -> Result<Vec<f32>> {
        match self.uniform(program, location)? {
            Value::Float(v) => Ok(v.clone()),
            _ => Err(Error::data(format!("Uniform {} is not a float.", location))),
        }
    }

    fn set_uniformf(&mut self, location: i32, value: f32) -> Result<()> {
        self.set_uniform(location, Value::Float(vec![value]))
    }

    fn set_uniformfv(&mut self, location: i32, _: u32, values: &[f32]) -> Result<()> {
        self.set_uniform(location, Value::Float(values.to_vec()))
    }

    fn set_uniform_matrixfv(
        &mut self,
        location: i32,
        num_matrices: u32,
        num_rows: u32,
        num_columns: u32,
        _: bool,
        values: &[f32],
    ) -> Result<()> {
        if num_rows < 2 || num_rows > 4 || num_columns < 2 || num_columns > 4 {
            return Err(Error::data(format!(
                "Invalid matrix dimensions {}x{}.",
                num_rows, num_columns
            )));
        }

        let len = (num_matrices * num_rows * num_columns) as usize;
        if values.len() < len {
            return Err(Error::data(format!(
                "Expected {} matrix values, got {}.",
                len,
                values.len()
            )));
        }

        self.set_uniform(location, Value::Float(values[..len].to_vec()))
    }

    fn set_attributef(&mut self, location: i32, value: f32) -> Result<()> {
        self.set_attribute(location, Value::Float(vec![value]))
    }

    fn set_attributei(&mut self, location: i32, value: i32) -> Result<()> {
        self.set_attribute(location, Value::Int(vec![value]))
    }

    fn set_attributeui(&mut self, location: i32, value: u32) -> Result<()> {
        self.set_attribute(location, Value::UInt(vec![value]))
    }

    fn set_attributefv(&mut self, location: i32, values: &[f32]) -> Result<()> {
        self.set_attribute(location, Value::Float(values.to_vec()))
    }

    fn set_attributeiv(&mut self, location: i32, values: &[i32]) -> Result<()> {
        self.set_attribute(location, Value::Int(values.to_vec()))
    }

    fn set_attributeuiv(&mut self, location: i32, values: &[u32]) -> Result<()> {
        self.set_attribute(location, Value::UInt(values.to_vec()))
    }

    fn set_attribute_source(&mut self, num_values: usize, source: Attribute) -> Result<()> {
        self.require_shaders()?;
        if source.location < 0 {
            return Ok(());
        }

        if source.num_values() < num_values {
            return Err(Error::data(format!(
                "Attribute source holds {} values, {} requested.",
                source.num_values(),
                num_values
            )));
        }

        self.attributes.remove(&source.location);
        self.attribute_sources.insert(source.location, (num_values, source));
        Ok(())
    }
}

#[inline]
fn clamp_u16(v: u32) -> u16 {
    v.min(u32::from(u16::max_value())) as u16
}

#[cfg(test)]
mod test {
    use super::*;

    fn backend() -> HeadlessBackend {
        let id = RendererId::new(RendererFamily::Headless, 1, 0);
        let mut backend = HeadlessBackend::new(id, family_features(id.family), Journal::new());
        let params = InitParams {
            w: 320,
            h: 240,
            window_flags: WindowFlags::empty(),
            init_flags: InitFlags::empty(),
            required_features: Features::empty(),
            window_id: 0,
        };

        backend.init(&params).unwrap();
        backend
    }

    #[test]
    fn images() {
        let mut backend = backend();
        let image = backend.create_image(4, 2, ImageFormat::RGBA).unwrap();
        assert_eq!(backend.image(image).unwrap().w, 4);

        let bytes: Vec<u8> = (0..32).collect();
        backend.update_image_bytes(image, None, &bytes, 16).unwrap();

        let surface = backend.copy_surface_from_image(image).unwrap();
        assert_eq!(surface.pixels, bytes);

        let copy = backend.copy_image(image).unwrap();
        backend.free_image(image).unwrap();
        assert!(backend.image(image).is_none());
        assert_eq!(backend.copy_surface_from_image(copy).unwrap().pixels, bytes);
    }

    #[test]
    fn render_target_pixels() {
        let mut backend = backend();
        let image = backend.create_image(8, 8, ImageFormat::RGBA).unwrap();
        let target = backend.load_target(image).unwrap();
        assert_eq!(backend.load_target(image).unwrap(), target);

        backend.clear_rgba(target, Color::rgba(10, 20, 30, 40)).unwrap();
        assert_eq!(backend.get_pixel(target, 3, 3).unwrap(), Color::rgba(10, 20, 30, 40));
        assert_eq!(backend.get_pixel(target, 8, 0).unwrap(), Color::TRANSPARENT);

        backend.free_image(image).unwrap();
        assert!(backend.target(target).is_none());
    }

    #[test]
    fn shaders() {
        let mut backend = backend();
        let vs = backend
            .compile_shader(ShaderType::Vertex, "attribute vec2 position; uniform float t;")
            .unwrap();
        let fs = backend.compile_shader(ShaderType::Fragment, "uniform vec4 tint;").unwrap();
        let program = backend.create_shader_program().unwrap();

        backend.attach_shader(program, vs).unwrap();
        assert!(backend.link_shader_program(program).is_err());
        assert!(!backend.shader_message().is_empty());

        backend.attach_shader(program, fs).unwrap();
        backend.link_shader_program(program).unwrap();

        let t = backend.uniform_location(program, "t").unwrap();
        assert!(t >= 0);
        assert_eq!(backend.uniform_location(program, "missing").unwrap(), -1);

        backend.activate_shader_program(program, None).unwrap();
        backend.set_uniformf(t, 0.5).unwrap();
        assert_eq!(backend.uniformfv(program, t).unwrap(), vec![0.5]);
        assert!(backend.uniformiv(program, t).is_err());
    }

    #[test]
    fn no_shaders_without_feature() {
        let id = RendererId::new(RendererFamily::OpenGL1, 1, 1);
        let mut backend = HeadlessBackend::new(id, family_features(id.family), Journal::new());

        let err = backend.compile_shader(ShaderType::Vertex, "void main() {}").unwrap_err();
        assert_eq!(err.code, ErrorCode::UnsupportedFunction);
    }
}

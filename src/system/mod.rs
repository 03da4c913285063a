//! The front-end of the renderer.
//!
//! A `GpuSystem` owns everything that would otherwise be process-wide state:
//! the backend registry, the live backend instances, the current renderer,
//! the selection order, the error stack and the window mappings. Several
//! systems may coexist, each with its own set of renderers.
//!
//! Entry points never return `Result`. A failure is pushed onto the error
//! stack under the name of the entry point, and the zero value of the entry
//! point is returned (`None`, `false` or nothing at all).

mod blit;
mod image;
mod lifecycle;
mod shader;
mod state;
mod window;

use crate::assets::prelude::*;
use crate::backends::Backend;
use crate::batch::ImageExtent;
use crate::errors::*;
use crate::logging::DebugLevel;
use crate::renderer::prelude::*;
use crate::settings::{Settings, WindowParams};
use crate::utils::Handle;
use crate::window::WindowMappings;

pub struct GpuSystem {
    registry: RendererRegistry,
    active: ActiveRenderers,
    current: Option<usize>,
    order: RendererOrder,
    errors: ErrorStack,
    debug_level: DebugLevel,
    windows: WindowMappings,
    window: WindowParams,
    init_window: u32,
    preinit_flags: InitFlags,
    required_features: Features,
}

impl Default for GpuSystem {
    fn default() -> Self {
        GpuSystem::new()
    }
}

impl Drop for GpuSystem {
    fn drop(&mut self) {
        self.quit();
    }
}

impl GpuSystem {
    /// Creates a system with every backend compiled into this build.
    pub fn new() -> Self {
        GpuSystem::with_registry(RendererRegistry::builtin())
    }

    /// Creates a system selecting from the factories of `registry`.
    pub fn with_registry(registry: RendererRegistry) -> Self {
        GpuSystem {
            registry,
            active: ActiveRenderers::new(),
            current: None,
            order: RendererOrder::default(),
            errors: ErrorStack::new(),
            debug_level: DebugLevel::default(),
            windows: WindowMappings::new(),
            window: WindowParams::default(),
            init_window: 0,
            preinit_flags: InitFlags::empty(),
            required_features: Features::empty(),
        }
    }

    /// Creates a system with the built-in backends, configured by `settings`.
    pub fn from_settings(settings: Settings) -> Self {
        let mut system = GpuSystem::new();
        system.apply_settings(settings);
        system
    }

    fn apply_settings(&mut self, settings: Settings) {
        self.debug_level = settings.debug_level;
        self.preinit_flags = settings.preinit_flags;
        self.required_features = settings.required_features;
        self.init_window = settings.init_window;
        self.window = settings.window;

        if let Some(order) = settings.renderer_order {
            self.set_renderer_order(&order);
        }
    }
}

impl GpuSystem {
    /// Identities of the registered backends, in registration order.
    pub fn registered_renderers(&self) -> Vec<RendererId> {
        self.registry.list()
    }

    #[inline]
    pub fn num_registered_renderers(&self) -> usize {
        self.registry.len()
    }

    /// Identities of the live renderers, in slot order.
    pub fn active_renderers(&self) -> Vec<RendererId> {
        self.active.ids()
    }

    #[inline]
    pub fn num_active_renderers(&self) -> usize {
        self.active.len()
    }

    /// The registered identity of `family`.
    pub fn renderer_id(&self, family: RendererFamily) -> Option<RendererId> {
        self.registry.id(family)
    }

    /// Makes the live renderer matching `id` current. An unknown `id` leaves
    /// no renderer current.
    pub fn set_current_renderer(&mut self, id: RendererId) {
        self.current = self.active.find(&id);

        if let Some(slot) = self.current {
            let result = match self.active.get_mut(slot) {
                Some(backend) => backend.set_as_current(),
                None => Ok(()),
            };

            self.check("set_current_renderer", result);
        }
    }

    pub fn current_renderer(&self) -> Option<RendererId> {
        self.current.and_then(|v| self.active.get(v)).map(|v| v.id())
    }

    /// Re-applies the cached state of the current renderer.
    pub fn reset_renderer_state(&mut self) {
        self.dispatch("reset_renderer_state", |b| b.reset_renderer_state());
    }

    /// The active program of the current context, or `0`.
    pub fn current_shader_program(&self) -> u32 {
        self.current_context()
            .map(|v| v.current_shader_program)
            .unwrap_or(0)
    }

    /// Returns true if the current renderer supports all of `features`.
    pub fn is_feature_enabled(&self, features: Features) -> bool {
        self.current_backend()
            .map(|v| v.enabled_features().contains(features))
            .unwrap_or(false)
    }
}

impl GpuSystem {
    /// Records an error under `function`.
    pub fn push_error<T: AsRef<str>>(&mut self, function: &str, code: ErrorCode, details: T) {
        self.errors.push(self.debug_level, function, code, details);
    }

    /// Pops the most recent error, or a record with `ErrorCode::None` if
    /// there is none.
    pub fn pop_error(&mut self) -> ErrorRecord {
        self.errors.pop()
    }

    #[inline]
    pub fn num_errors(&self) -> usize {
        self.errors.len()
    }

    #[inline]
    pub fn set_debug_level(&mut self, level: DebugLevel) {
        self.debug_level = level;
    }

    #[inline]
    pub fn debug_level(&self) -> DebugLevel {
        self.debug_level
    }
}

impl GpuSystem {
    fn current_backend(&self) -> Option<&dyn Backend> {
        self.current.and_then(move |v| self.active.get(v))
    }

    fn current_context(&self) -> Option<&Context> {
        let backend = self.current_backend()?;
        let target = backend.context_target()?;
        backend.target(target)?.context.as_ref()
    }

    /// Returns the current renderer, pushing an error under `function` if
    /// there is none or if it has no context.
    fn backend(&mut self, function: &str) -> Option<&mut (dyn Backend + 'static)> {
        let context = match self.current.and_then(|v| self.active.get(v)) {
            Some(backend) => backend.context_target(),
            None => {
                self.push_error(function, ErrorCode::User, "NULL renderer");
                return None;
            }
        };

        if context.is_none() {
            self.push_error(function, ErrorCode::User, "NULL context");
            return None;
        }

        let slot = self.current?;
        self.active.get_mut(slot)
    }

    /// Runs `func` against the current renderer, which must own a context.
    fn dispatch<T, F>(&mut self, function: &str, func: F) -> Option<T>
    where
        F: FnOnce(&mut (dyn Backend + 'static)) -> Result<T>,
    {
        let result = func(self.backend(function)?);
        self.check(function, result)
    }

    fn check<T>(&mut self, function: &str, result: Result<T>) -> Option<T> {
        match result {
            Ok(v) => Some(v),
            Err(err) => {
                self.errors.push_error(self.debug_level, function, &err);
                None
            }
        }
    }
}

fn non_nil<H: Into<Handle>>(handle: H, name: &str) -> Result<()> {
    let handle: Handle = handle.into();
    if handle.is_valid() {
        Ok(())
    } else {
        Err(Error::null_argument(name))
    }
}

fn image_ref<B: Backend + ?Sized>(backend: &B, image: ImageHandle) -> Result<&Image> {
    backend
        .image(image)
        .ok_or_else(|| Error::data(format!("{} is invalid.", image)))
}

fn image_mut<B: Backend + ?Sized>(backend: &mut B, image: ImageHandle) -> Result<&mut Image> {
    backend
        .image_mut(image)
        .ok_or_else(|| Error::data(format!("{} is invalid.", image)))
}

fn target_ref<B: Backend + ?Sized>(backend: &B, target: TargetHandle) -> Result<&Target> {
    backend
        .target(target)
        .ok_or_else(|| Error::data(format!("{} is invalid.", target)))
}

fn target_mut<B: Backend + ?Sized>(backend: &mut B, target: TargetHandle) -> Result<&mut Target> {
    backend
        .target_mut(target)
        .ok_or_else(|| Error::data(format!("{} is invalid.", target)))
}

/// The context of the current context target of `backend`.
fn context_mut<B: Backend + ?Sized>(backend: &mut B) -> Result<&mut Context> {
    let target = backend
        .context_target()
        .ok_or_else(|| Error::user("NULL context"))?;

    target_mut(backend, target)?
        .context
        .as_mut()
        .ok_or_else(|| Error::user("NULL context"))
}

fn image_extent<B: Backend + ?Sized>(backend: &B, image: ImageHandle) -> Result<ImageExtent> {
    let v = image_ref(backend, image)?;
    Ok(ImageExtent::new(v.w, v.h, v.base_w, v.base_h))
}

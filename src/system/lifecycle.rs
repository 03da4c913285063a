use super::GpuSystem;

use crate::assets::prelude::*;
use crate::backends::InitParams;
use crate::errors::*;
use crate::logging::{self, DebugLevel};
use crate::renderer::prelude::*;
use crate::window::SlotTarget;

impl GpuSystem {
    /// The renderers `init` tries, most preferred first.
    #[inline]
    pub fn renderer_order(&self) -> &[RendererId] {
        self.order.ids()
    }

    /// Replaces the renderer order. Fails once `init` has been called.
    pub fn set_renderer_order(&mut self, order: &[RendererId]) {
        let result = self.order.set(order);
        self.check("set_renderer_order", result);
    }

    /// The platform preference used unless `set_renderer_order` is called.
    #[inline]
    pub fn default_renderer_order() -> Vec<RendererId> {
        RendererOrder::default_order()
    }

    /// Sets the window the next renderer initialization renders into, instead
    /// of creating one.
    #[inline]
    pub fn set_init_window(&mut self, window_id: u32) {
        self.init_window = window_id;
    }

    #[inline]
    pub fn init_window(&self) -> u32 {
        self.init_window
    }

    #[inline]
    pub fn set_preinit_flags(&mut self, flags: InitFlags) {
        self.preinit_flags = flags;
    }

    #[inline]
    pub fn preinit_flags(&self) -> InitFlags {
        self.preinit_flags
    }

    /// Features a renderer must support to be picked by `init`.
    #[inline]
    pub fn set_required_features(&mut self, features: Features) {
        self.required_features = features;
    }

    #[inline]
    pub fn required_features(&self) -> Features {
        self.required_features
    }

    /// Tries every renderer of the renderer order until one initializes, and
    /// returns its context target.
    ///
    /// Failures of single candidates are only logged. If no candidate
    /// succeeds, one error listing all of them is pushed.
    pub fn init(&mut self, w: u16, h: u16, flags: WindowFlags) -> Option<TargetHandle> {
        self.order.freeze();

        let candidates = self.order.ids().to_vec();
        let mut failures = Vec::with_capacity(candidates.len());

        for request in candidates.iter().cloned() {
            match self.try_init_renderer("init", request, w, h, flags) {
                Ok(target) => return Some(target),
                Err(err) => {
                    logging::log_warning(
                        self.debug_level,
                        format_args!("Renderer {} failed to initialize: {}", request, err),
                    );

                    failures.push(format!("{} ({})", request, err.details));
                }
            }
        }

        self.push_error(
            "init",
            ErrorCode::Backend,
            format!(
                "No renderer out of {} was able to initialize properly: {}.",
                candidates.len(),
                failures.join(", ")
            ),
        );

        None
    }

    /// Initializes the registered renderer of `family`.
    pub fn init_renderer(
        &mut self,
        family: RendererFamily,
        w: u16,
        h: u16,
        flags: WindowFlags,
    ) -> Option<TargetHandle> {
        match self.registry.id(family) {
            Some(id) => self.init_renderer_by_id(id, w, h, flags),
            None => {
                self.push_error(
                    "init_renderer",
                    ErrorCode::Backend,
                    format!(
                        "Could not create renderer: \"{}\" was not found in the renderer registry.",
                        family
                    ),
                );

                None
            }
        }
    }

    /// Creates, activates and initializes a renderer of `request`.
    pub fn init_renderer_by_id(
        &mut self,
        request: RendererId,
        w: u16,
        h: u16,
        flags: WindowFlags,
    ) -> Option<TargetHandle> {
        let result = self.try_init_renderer("init_renderer_by_id", request, w, h, flags);
        self.check("init_renderer_by_id", result)
    }

    /// Initializes a renderer with the window parameters of the settings this
    /// system was created from.
    pub fn init_with_settings(&mut self) -> Option<TargetHandle> {
        let window = self.window;
        self.init(window.width, window.height, window.flags)
    }

    fn try_init_renderer(
        &mut self,
        function: &str,
        request: RendererId,
        w: u16,
        h: u16,
        flags: WindowFlags,
    ) -> Result<TargetHandle> {
        let backend = self.registry.create_instance(request)?;
        let slot = match self.active.add(backend) {
            Ok(slot) => slot,
            Err(backend) => {
                self.registry.destroy(backend);
                return Err(Error::backend(format!(
                    "Could not create renderer: \"{}\" does not fit into the {} active renderer slots.",
                    request,
                    self.active.capacity()
                )));
            }
        };

        self.current = Some(slot);

        let params = InitParams {
            w,
            h,
            window_flags: flags,
            init_flags: self.preinit_flags,
            required_features: self.required_features,
            window_id: self.init_window,
        };

        let result = match self.active.get_mut(slot) {
            Some(backend) => backend
                .set_as_current()
                .and_then(|_| backend.init(&params))
                .map(|target| {
                    let window_id = backend
                        .target(target)
                        .and_then(|v| v.context.as_ref())
                        .map(|v| v.window_id)
                        .unwrap_or(0);

                    (target, window_id)
                }),
            None => Err(Error::backend(format!("Renderer slot {} is empty.", slot))),
        };

        match result {
            Ok((target, window_id)) => {
                let mapped = self.windows.add(window_id, SlotTarget::new(slot, target));
                self.check(function, mapped);
                self.init_window = 0;

                logging::log_info(
                    self.debug_level,
                    format_args!("Initialized renderer {} in slot {}.", request, slot),
                );

                Ok(target)
            }
            Err(err) => {
                self.close_renderer(slot);
                Err(err)
            }
        }
    }

    /// Quits and destroys the current renderer.
    pub fn close_current_renderer(&mut self) {
        if let Some(slot) = self.current {
            self.close_renderer(slot);
        }
    }

    /// Quits the renderer in `slot`, unmapping the windows of its targets.
    fn close_renderer(&mut self, slot: usize) {
        self.windows.remove_by_slot(slot);

        let id = match self.active.get_mut(slot) {
            Some(backend) => {
                if let Err(err) = backend.quit() {
                    self.errors.push_error(self.debug_level, "quit", &err);
                }

                backend.id()
            }
            None => return,
        };

        self.active.remove(&id, &self.registry);

        if self.current == Some(slot) {
            self.current = None;
        }
    }

    /// Shuts down every renderer of this system. Errors that were never
    /// popped are reported as a count and discarded.
    pub fn quit(&mut self) {
        if !self.errors.is_empty() && self.debug_level >= DebugLevel::Level1 {
            logging::log_error(
                self.debug_level,
                format_args!("{} uncleared errors.", self.errors.len()),
            );
        }

        for slot in self.active.slots() {
            self.close_renderer(slot);
        }

        self.errors.clear();
        self.current = None;
    }
}

use super::{non_nil, target_mut, target_ref, GpuSystem};

use crate::assets::prelude::*;
use crate::math::{Camera, Rect};
use crate::window::SlotTarget;

impl GpuSystem {
    /// Creates a context target for an existing window, or for a new one if
    /// `window_id` is `0`, and maps the window to it.
    pub fn create_target_from_window(&mut self, window_id: u32) -> Option<TargetHandle> {
        let (target, window_id) = self.dispatch("create_target_from_window", |b| {
            let target = b.create_target_from_window(window_id)?;
            let window_id = target_ref(b, target)?
                .context
                .as_ref()
                .map(|v| v.window_id)
                .unwrap_or(window_id);

            Ok((target, window_id))
        })?;

        if let Some(slot) = self.current {
            let mapped = self.windows.add(window_id, SlotTarget::new(slot, target));
            self.check("create_target_from_window", mapped);
        }

        Some(target)
    }

    /// Creates a target sharing the backing surface of `target`.
    pub fn create_alias_target(&mut self, target: TargetHandle) -> Option<TargetHandle> {
        self.dispatch("create_alias_target", |b| {
            non_nil(target, "target")?;
            b.create_alias_target(target)
        })
    }

    /// Makes the context of `target` current and rebinds it to `window_id`.
    ///
    /// Rebinding to a window mapped to another target fails and leaves both
    /// the context and the mappings untouched.
    pub fn make_current(&mut self, target: TargetHandle, window_id: u32) {
        let slot = self.current;
        let vacant = match slot {
            Some(slot) => self.windows.check(window_id, SlotTarget::new(slot, target)),
            None => Ok(()),
        };

        let done = self.dispatch("make_current", move |b| {
            non_nil(target, "target")?;
            vacant?;
            b.make_current(target, window_id)
        });

        if done.is_none() || window_id == 0 {
            return;
        }

        if let Some(slot) = slot {
            let target = SlotTarget::new(slot, target);
            self.windows.remove_by_target(target);
            let mapped = self.windows.add(window_id, target);
            self.check("make_current", mapped);
        }
    }

    /// Returns the resulting fullscreen state.
    pub fn set_fullscreen(&mut self, enable: bool, use_desktop_resolution: bool) -> Option<bool> {
        self.dispatch("set_fullscreen", |b| {
            b.set_fullscreen(enable, use_desktop_resolution)
        })
    }

    pub fn fullscreen(&mut self) -> Option<bool> {
        self.dispatch("fullscreen", |b| b.fullscreen())
    }

    /// Resizes the window of the current context.
    pub fn set_window_resolution(&mut self, w: u16, h: u16) {
        self.dispatch("set_window_resolution", |b| b.set_window_resolution(w, h));
    }

    /// Decouples the logical size of `target` from its backing surface.
    pub fn set_virtual_resolution(&mut self, target: TargetHandle, w: u16, h: u16) {
        self.dispatch("set_virtual_resolution", |b| {
            non_nil(target, "target")?;
            b.set_virtual_resolution(target, w, h)
        });
    }

    pub fn unset_virtual_resolution(&mut self, target: TargetHandle) {
        self.dispatch("unset_virtual_resolution", |b| {
            non_nil(target, "target")?;
            b.unset_virtual_resolution(target)
        });
    }

    /// The context target of the current renderer.
    pub fn context_target(&self) -> Option<TargetHandle> {
        self.current_backend().and_then(|v| v.context_target())
    }

    /// Maps the window of the context of `target` to `target`.
    pub fn add_window_mapping(&mut self, target: TargetHandle) {
        let window_id = self.dispatch("add_window_mapping", |b| {
            non_nil(target, "target")?;
            Ok(target_ref(b, target)?.context.as_ref().map(|v| v.window_id))
        });

        if let (Some(Some(window_id)), Some(slot)) = (window_id, self.current) {
            let mapped = self.windows.add(window_id, SlotTarget::new(slot, target));
            self.check("add_window_mapping", mapped);
        }
    }

    /// Unmaps `window_id`, detaching the window from the context it was
    /// mapped to.
    pub fn remove_window_mapping(&mut self, window_id: u32) {
        if let Some(target) = self.windows.remove(window_id) {
            self.detach_window(target);
        }
    }

    /// Unmaps every window mapped to `target` of the current renderer.
    pub fn remove_window_mapping_by_target(&mut self, target: TargetHandle) {
        if let Some(slot) = self.current {
            let target = SlotTarget::new(slot, target);
            if !self.windows.remove_by_target(target).is_empty() {
                self.detach_window(target);
            }
        }
    }

    fn detach_window(&mut self, target: SlotTarget) {
        let context = self
            .active
            .get_mut(target.slot)
            .and_then(|v| v.target_mut(target.target))
            .and_then(|v| v.context.as_mut());

        if let Some(context) = context {
            context.window_id = 0;
        }
    }

    /// The target `window_id` is mapped to, which may belong to any of the
    /// live renderers.
    #[inline]
    pub fn window_target(&self, window_id: u32) -> Option<TargetHandle> {
        self.windows.get(window_id).map(|v| v.target)
    }

    /// Converts window coordinates into the virtual coordinates of `target`.
    pub fn virtual_coords(&mut self, target: TargetHandle, x: f32, y: f32) -> Option<(f32, f32)> {
        self.dispatch("virtual_coords", |b| {
            non_nil(target, "target")?;
            let t = target_ref(b, target)?;
            let (w, h) = (f32::from(t.w), f32::from(t.h));

            if let Some(ctx) = t.context.as_ref() {
                return Ok((
                    x * w / ctx.window_w as f32,
                    y * h / ctx.window_h as f32,
                ));
            }

            if let Some(image) = t.image.and_then(|v| b.image(v)) {
                return Ok((x * w / f32::from(image.w), y * h / f32::from(image.h)));
            }

            Ok((x, y))
        })
    }

    pub fn set_viewport(&mut self, target: TargetHandle, viewport: Rect) {
        self.dispatch("set_viewport", |b| {
            non_nil(target, "target")?;
            target_mut(b, target)?.viewport = viewport;
            Ok(())
        });
    }

    pub fn camera(&mut self, target: TargetHandle) -> Option<Camera> {
        self.dispatch("camera", |b| {
            non_nil(target, "target")?;
            Ok(target_ref(b, target)?.camera)
        })
    }

    /// Sets the camera of `target`, or resets it with `None`. Returns the
    /// previous camera.
    pub fn set_camera(&mut self, target: TargetHandle, camera: Option<Camera>) -> Option<Camera> {
        self.dispatch("set_camera", |b| {
            non_nil(target, "target")?;
            b.set_camera(target, camera.unwrap_or_default())
        })
    }

    /// The camera of new targets: at the origin, unrotated and unzoomed.
    #[inline]
    pub fn default_camera() -> Camera {
        Camera::default()
    }
}

use super::{image_ref, non_nil, target_ref, GpuSystem};

use crate::assets::prelude::*;
use crate::codec::{self, Surface};
use crate::math::Rect;
use crate::window::SlotTarget;

impl GpuSystem {
    /// Creates a blank image.
    pub fn create_image(&mut self, w: u16, h: u16, format: ImageFormat) -> Option<ImageHandle> {
        self.dispatch("create_image", |b| b.create_image(w, h, format))
    }

    /// Wraps an existing backend texture. With `take_ownership`, the texture
    /// is released together with the image.
    pub fn create_image_using_texture(&mut self, texture: u32, take_ownership: bool) -> Option<ImageHandle> {
        self.dispatch("create_image_using_texture", |b| {
            b.create_image_using_texture(texture, take_ownership)
        })
    }

    /// Loads an image file (png, bmp or tga).
    pub fn load_image(&mut self, path: &str) -> Option<ImageHandle> {
        self.dispatch("load_image", |b| b.load_image(path))
    }

    /// Creates an image sharing the texture of `image`, with its own state.
    pub fn create_alias_image(&mut self, image: ImageHandle) -> Option<ImageHandle> {
        self.dispatch("create_alias_image", |b| {
            non_nil(image, "image")?;
            b.create_alias_image(image)
        })
    }

    /// Saves the pixels of `image` into a file.
    pub fn save_image(&mut self, image: ImageHandle, path: &str, format: FileFormat) -> bool {
        self.dispatch("save_image", |b| {
            non_nil(image, "image")?;
            b.save_image(image, path, format)
        })
        .is_some()
    }

    pub fn copy_image(&mut self, image: ImageHandle) -> Option<ImageHandle> {
        self.dispatch("copy_image", |b| {
            non_nil(image, "image")?;
            b.copy_image(image)
        })
    }

    /// Replaces the pixels of `image` with those of `surface`.
    pub fn update_image(&mut self, image: ImageHandle, surface: &Surface) {
        self.dispatch("update_image", |b| {
            non_nil(image, "image")?;
            b.update_image(image, None, surface, None)
        });
    }

    /// Copies `surface_rect` of `surface` into `image_rect` of `image`. `None`
    /// covers the whole image or surface.
    pub fn update_sub_image(
        &mut self,
        image: ImageHandle,
        image_rect: Option<Rect>,
        surface: &Surface,
        surface_rect: Option<Rect>,
    ) {
        self.dispatch("update_sub_image", |b| {
            non_nil(image, "image")?;
            b.update_image(image, image_rect, surface, surface_rect)
        });
    }

    /// Copies raw rows of pixels into `image_rect` of `image`.
    pub fn update_image_bytes(
        &mut self,
        image: ImageHandle,
        image_rect: Option<Rect>,
        bytes: &[u8],
        bytes_per_row: usize,
    ) {
        self.dispatch("update_image_bytes", |b| {
            non_nil(image, "image")?;
            b.update_image_bytes(image, image_rect, bytes, bytes_per_row)
        });
    }

    pub fn copy_image_from_surface(&mut self, surface: &Surface) -> Option<ImageHandle> {
        self.dispatch("copy_image_from_surface", |b| b.copy_image_from_surface(surface))
    }

    pub fn copy_image_from_target(&mut self, target: TargetHandle) -> Option<ImageHandle> {
        self.dispatch("copy_image_from_target", |b| {
            non_nil(target, "target")?;
            b.copy_image_from_target(target)
        })
    }

    pub fn copy_surface_from_target(&mut self, target: TargetHandle) -> Option<Surface> {
        self.dispatch("copy_surface_from_target", |b| {
            non_nil(target, "target")?;
            b.copy_surface_from_target(target)
        })
    }

    pub fn copy_surface_from_image(&mut self, image: ImageHandle) -> Option<Surface> {
        self.dispatch("copy_surface_from_image", |b| {
            non_nil(image, "image")?;
            b.copy_surface_from_image(image)
        })
    }

    /// Frees `image`, together with its render target.
    pub fn free_image(&mut self, image: ImageHandle) {
        self.dispatch("free_image", |b| {
            non_nil(image, "image")?;
            b.free_image(image)
        });
    }

    /// Returns the render target of `image`, creating it on first use.
    pub fn load_target(&mut self, image: ImageHandle) -> Option<TargetHandle> {
        self.dispatch("load_target", |b| {
            non_nil(image, "image")?;
            b.load_target(image)
        })
    }

    /// Frees `target` and unmaps the windows mapped to it.
    pub fn free_target(&mut self, target: TargetHandle) {
        let done = self.dispatch("free_target", |b| {
            non_nil(target, "target")?;
            b.free_target(target)
        });

        if let (Some(_), Some(slot)) = (done, self.current) {
            self.windows.remove_by_target(SlotTarget::new(slot, target));
        }
    }

    pub fn generate_mipmaps(&mut self, image: ImageHandle) {
        self.dispatch("generate_mipmaps", |b| {
            non_nil(image, "image")?;
            b.generate_mipmaps(image)
        });
    }

    /// A snapshot of the state of `image`.
    pub fn image_info(&mut self, image: ImageHandle) -> Option<Image> {
        self.dispatch("image_info", |b| {
            non_nil(image, "image")?;
            image_ref(b, image).map(|v| v.clone())
        })
    }

    /// A snapshot of the state of `target`.
    pub fn target_info(&mut self, target: TargetHandle) -> Option<Target> {
        self.dispatch("target_info", |b| {
            non_nil(target, "target")?;
            target_ref(b, target).map(|v| v.clone())
        })
    }
}

impl GpuSystem {
    /// Loads and decodes an image file. No renderer is needed.
    pub fn load_surface(&mut self, path: &str) -> Option<Surface> {
        let result = codec::load_surface(path);
        self.check("load_surface", result)
    }

    /// Encodes `surface` into a file. No renderer is needed.
    pub fn save_surface(&mut self, surface: &Surface, path: &str, format: FileFormat) -> bool {
        let result = codec::save_surface(surface, path, format);
        self.check("save_surface", result).is_some()
    }
}

//! This module contains the math utils that mainly comes from `cgmath`.

pub use cgmath::*;

pub mod rect;
pub use self::rect::Rect;

pub mod camera;
pub use self::camera::Camera;

pub mod prelude {
    pub use super::camera::Camera;
    pub use super::rect::Rect;
    pub use cgmath::prelude::*;
    pub use cgmath::{Matrix3, Vector2};
}

//! A hardware-accelerated 2D renderer front-end.
//!
//! Client code draws images, batches of sprites and triangles through a
//! `GpuSystem` without depending on any particular graphics API. Backends are
//! provided by `BackendFactory`s collected in a `RendererRegistry`. At
//! initialization the system walks its renderer order until one backend comes
//! up, and routes every later call to that current renderer.
//!
//! ```rust,no_run
//! extern crate gpu2d;
//! use gpu2d::prelude::*;
//!
//! let mut gpu = GpuSystem::new();
//! let screen = gpu.init(640, 480, WindowFlags::empty()).unwrap();
//! let image = gpu.load_image("sprite.png").unwrap();
//!
//! gpu.clear(screen);
//! gpu.blit(image, None, screen, 320.0, 240.0);
//! gpu.flip(screen);
//! ```

#[macro_use]
extern crate failure;
#[macro_use]
extern crate log;
#[macro_use]
extern crate serde;

#[macro_use]
pub mod utils;

pub mod assets;
pub mod backends;
pub mod batch;
pub mod codec;
pub mod errors;
pub mod logging;
pub mod math;
pub mod renderer;
pub mod settings;
pub mod system;
pub mod window;

pub use self::system::GpuSystem;

pub mod prelude {
    pub use crate::assets::prelude::*;
    pub use crate::backends::{Backend, InitParams};
    pub use crate::batch::{BlitFlags, Vertex};
    pub use crate::codec::Surface;
    pub use crate::errors::{Error, ErrorCode, ErrorRecord, Result};
    pub use crate::logging::DebugLevel;
    pub use crate::math::prelude::*;
    pub use crate::renderer::prelude::*;
    pub use crate::settings::{Settings, WindowParams};
    pub use crate::utils::{Color, Handle};
    pub use crate::GpuSystem;
}

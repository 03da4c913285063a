//! Commonly used utilities like handles, pools and colors.

#[macro_use]
pub mod handle;
pub mod object_pool;

mod color;

pub use self::color::Color;
pub use self::handle::{Handle, HandleIndex};
pub use self::object_pool::ObjectPool;

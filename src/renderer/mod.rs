//! Renderer identities and the tables that track backend factories and live
//! backend instances.

pub mod active;
pub mod id;
pub mod order;
pub mod registry;

pub use self::active::{ActiveRenderers, MAX_ACTIVE_RENDERERS};
pub use self::id::{RendererFamily, RendererId};
pub use self::order::{RendererOrder, RENDERER_ORDER_MAX};
pub use self::registry::{BackendFactory, RendererRegistry, MAX_REGISTERED_RENDERERS};

pub mod prelude {
    pub use super::{
        ActiveRenderers, BackendFactory, RendererFamily, RendererId, RendererOrder,
        RendererRegistry,
    };
}

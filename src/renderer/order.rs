use smallvec::SmallVec;

use super::id::{RendererFamily, RendererId};
use crate::errors::*;

/// Maximum number of candidates in a renderer order.
pub const RENDERER_ORDER_MAX: usize = 10;

/// The renderers tried at initialization, most preferred first.
#[derive(Debug, Clone)]
pub struct RendererOrder {
    ids: SmallVec<[RendererId; RENDERER_ORDER_MAX]>,
    frozen: bool,
}

impl Default for RendererOrder {
    fn default() -> Self {
        RendererOrder {
            ids: RendererOrder::default_order().into_iter().collect(),
            frozen: false,
        }
    }
}

impl RendererOrder {
    /// The platform preference: the ES family on mobile targets and the
    /// desktop GL family elsewhere, newest first, followed by the headless
    /// renderer when it is compiled in.
    pub fn default_order() -> Vec<RendererId> {
        let mut ids = Vec::with_capacity(4);

        if cfg!(any(target_os = "android", target_os = "ios")) {
            ids.push(RendererId::new(RendererFamily::GLES3, 3, 0));
            ids.push(RendererId::new(RendererFamily::GLES2, 2, 0));
            ids.push(RendererId::new(RendererFamily::GLES1, 1, 1));
        } else {
            ids.push(RendererId::new(RendererFamily::OpenGL3, 3, 0));
            ids.push(RendererId::new(RendererFamily::OpenGL2, 2, 0));
            ids.push(RendererId::new(RendererFamily::OpenGL1, 1, 1));
        }

        if cfg!(feature = "headless") {
            ids.push(RendererId::new(RendererFamily::Headless, 1, 0));
        }

        ids
    }

    #[inline]
    pub fn ids(&self) -> &[RendererId] {
        &self.ids
    }

    /// Replaces the order. Entries past `RENDERER_ORDER_MAX` are dropped.
    pub fn set(&mut self, ids: &[RendererId]) -> Result<()> {
        if self.frozen {
            return Err(Error::user(
                "The renderer order can not be changed after initialization.",
            ));
        }

        self.ids = ids
            .iter()
            .take(RENDERER_ORDER_MAX)
            .map(|v| v.with_index(-1))
            .collect();

        Ok(())
    }

    /// Prevents any further change.
    #[inline]
    pub fn freeze(&mut self) {
        self.frozen = true;
    }

    #[inline]
    pub fn is_frozen(&self) -> bool {
        self.frozen
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn default_order() {
        let order = RendererOrder::default();
        assert_eq!(order.ids(), &RendererOrder::default_order()[..]);
        assert!(order.ids().iter().all(|v| !v.is_bound()));

        if cfg!(feature = "headless") {
            assert_eq!(order.ids().last().unwrap().family, RendererFamily::Headless);
        }
    }

    #[test]
    fn frozen() {
        let mut order = RendererOrder::default();
        let ids: Vec<_> = (0..12)
            .map(|i| RendererId::new(RendererFamily::Custom(i), 1, 0))
            .collect();

        order.set(&ids).unwrap();
        assert_eq!(order.ids().len(), RENDERER_ORDER_MAX);

        order.freeze();
        let err = order.set(&ids[..1]).unwrap_err();
        assert_eq!(err.code, ErrorCode::User);
        assert_eq!(order.ids().len(), RENDERER_ORDER_MAX);
    }
}

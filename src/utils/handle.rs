//! Generational handles naming the objects a backend owns.

use std::fmt;

pub type HandleIndex = u32;

/// A slot `index` of some object pool, plus the `version` the slot had when
/// the object was created.
///
/// Pools reuse the slots of freed objects and bump their version, so a stale
/// handle stops resolving instead of naming the newcomer. Live versions start
/// at `1`, which leaves `(0, 0)` to mean "no object".
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Handle {
    index: HandleIndex,
    version: HandleIndex,
}

impl Handle {
    #[inline]
    pub fn new(index: HandleIndex, version: HandleIndex) -> Self {
        Handle { index, version }
    }

    #[inline]
    pub fn nil() -> Self {
        Handle::default()
    }

    /// Returns false for the nil handle. A stale handle is still valid.
    #[inline]
    pub fn is_valid(self) -> bool {
        self != Handle::nil()
    }

    #[inline]
    pub fn index(self) -> HandleIndex {
        self.index
    }

    #[inline]
    pub fn version(self) -> HandleIndex {
        self.version
    }
}

impl fmt::Display for Handle {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "({}, {})", self.index, self.version)
    }
}

/// Declares a handle type for one kind of backend object, such as
/// `ImageHandle`. It converts to and from `Handle`, and prints as
/// `ImageHandle (index, version)` in error details.
#[macro_export]
macro_rules! impl_handle {
    ($name:ident) => {
        #[derive(Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
        pub struct $name($crate::utils::handle::Handle);

        impl $name {
            /// A handle that never names a live object.
            #[inline]
            pub fn nil() -> Self {
                $name::default()
            }
        }

        impl From<$name> for $crate::utils::handle::Handle {
            fn from(handle: $name) -> Self {
                handle.0
            }
        }

        impl From<$crate::utils::handle::Handle> for $name {
            fn from(handle: $crate::utils::handle::Handle) -> Self {
                $name(handle)
            }
        }

        impl ::std::fmt::Display for $name {
            fn fmt(&self, f: &mut ::std::fmt::Formatter) -> ::std::fmt::Result {
                write!(f, "{} {}", stringify!($name), self.0)
            }
        }
    };
}

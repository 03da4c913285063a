//! Value types shared by the renderer front-end and its backends.

pub mod blend;
pub mod flags;
pub mod image;
pub mod shader;
pub mod target;

pub mod prelude {
    pub use super::blend::{BlendEq, BlendFunc, BlendMode, BlendPreset};
    pub use super::flags::{Features, InitFlags, WindowFlags};
    pub use super::image::{
        FileFormat, FilterMode, Image, ImageFormat, ImageHandle, SnapMode, WrapMode,
    };
    pub use super::shader::{
        Attribute, AttributeFormat, ShaderBlock, ShaderBlockNames, ShaderType, TypeEnum,
    };
    pub use super::target::{Context, Target, TargetHandle};
}

//! Images are textures living on a renderer. An image may additionally be
//! bound to a render target.

use crate::assets::blend::BlendMode;
use crate::assets::target::TargetHandle;
use crate::renderer::RendererId;
use crate::utils::Color;

impl_handle!(ImageHandle);

/// Pixel layout of an image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ImageFormat {
    Luminance,
    LuminanceAlpha,
    RGB,
    RGBA,
    Alpha,
    RG,
    YCbCr422,
    YCbCr420P,
}

impl ImageFormat {
    /// Bytes per pixel for the formats that have a fixed pixel size.
    pub fn bytes_per_pixel(self) -> u32 {
        match self {
            ImageFormat::Luminance | ImageFormat::Alpha => 1,
            ImageFormat::LuminanceAlpha | ImageFormat::RG => 2,
            ImageFormat::RGB => 3,
            ImageFormat::RGBA => 4,
            ImageFormat::YCbCr422 => 2,
            ImageFormat::YCbCr420P => 1,
        }
    }

    /// The format matching a surface with `channels` interleaved channels.
    pub fn from_channels(channels: u32) -> Option<ImageFormat> {
        match channels {
            1 => Some(ImageFormat::Alpha),
            2 => Some(ImageFormat::LuminanceAlpha),
            3 => Some(ImageFormat::RGB),
            4 => Some(ImageFormat::RGBA),
            _ => None,
        }
    }
}

/// Texture sampling filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FilterMode {
    Nearest,
    Linear,
    LinearMipmap,
}

/// How blit positions are snapped to the pixel grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SnapMode {
    None,
    Position,
    Dimensions,
    PositionAndDimensions,
}

/// Texture addressing outside of [0, 1].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WrapMode {
    None,
    Repeat,
    Mirrored,
}

/// The container format of an image file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FileFormat {
    /// Detect the format from the file extension.
    Auto,
    Png,
    Bmp,
    Tga,
}

/// The state of a live image.
#[derive(Debug, Clone, PartialEq)]
pub struct Image {
    /// The renderer this image belongs to.
    pub renderer: RendererId,
    /// The render target bound to this image, if any.
    pub target: Option<TargetHandle>,
    /// Logical dimensions.
    pub w: u16,
    pub h: u16,
    /// Texel dimensions of the backing texture.
    pub base_w: u16,
    pub base_h: u16,
    pub format: ImageFormat,
    pub num_layers: u32,
    pub bytes_per_pixel: u32,
    pub has_mipmaps: bool,
    pub color: Color,
    pub use_blending: bool,
    pub blend_mode: BlendMode,
    pub filter_mode: FilterMode,
    pub snap_mode: SnapMode,
    pub wrap_mode_x: WrapMode,
    pub wrap_mode_y: WrapMode,
    /// True if this image shares its texture with another image.
    pub is_alias: bool,
}

impl Image {
    pub fn new(renderer: RendererId, w: u16, h: u16, format: ImageFormat) -> Self {
        Image {
            renderer,
            target: None,
            w,
            h,
            base_w: w,
            base_h: h,
            format,
            num_layers: 1,
            bytes_per_pixel: format.bytes_per_pixel(),
            has_mipmaps: false,
            color: Color::WHITE,
            use_blending: true,
            blend_mode: BlendMode::default(),
            filter_mode: FilterMode::Linear,
            snap_mode: SnapMode::PositionAndDimensions,
            wrap_mode_x: WrapMode::None,
            wrap_mode_y: WrapMode::None,
            is_alias: false,
        }
    }
}

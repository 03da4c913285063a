//! Image file decoding and encoding, delegated to the `image` crate.

use std::fs;
use std::io::Cursor;
use std::path::Path;

use image::{ColorType, DynamicImage, ImageFormat as CodecFormat};

use crate::assets::image::FileFormat;
use crate::errors::*;

/// Interleaved 8-bit pixels in CPU memory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Surface {
    pub pixels: Vec<u8>,
    pub w: u32,
    pub h: u32,
    /// Number of interleaved channels per pixel, from 1 to 4.
    pub channels: u32,
}

impl Surface {
    pub fn new(pixels: Vec<u8>, w: u32, h: u32, channels: u32) -> Result<Self> {
        if channels < 1 || channels > 4 {
            return Err(Error::data(format!(
                "Unsupported number of channels ({}), expected 1 to 4.",
                channels
            )));
        }

        let len = w as usize * h as usize * channels as usize;
        if pixels.len() != len {
            return Err(Error::data(format!(
                "Surface of {}x{} with {} channels needs {} bytes, got {}.",
                w,
                h,
                channels,
                len,
                pixels.len()
            )));
        }

        Ok(Surface {
            pixels,
            w,
            h,
            channels,
        })
    }

    /// Creates a surface filled with a single pixel value.
    pub fn filled(w: u32, h: u32, pixel: &[u8]) -> Result<Self> {
        let mut pixels = Vec::with_capacity(w as usize * h as usize * pixel.len());
        for _ in 0..(w as usize * h as usize) {
            pixels.extend_from_slice(pixel);
        }

        Surface::new(pixels, w, h, pixel.len() as u32)
    }

    #[inline]
    pub fn pitch(&self) -> usize {
        self.w as usize * self.channels as usize
    }

    /// Returns the bytes of pixel (`x`, `y`).
    pub fn pixel(&self, x: u32, y: u32) -> Option<&[u8]> {
        if x >= self.w || y >= self.h {
            return None;
        }

        let c = self.channels as usize;
        let i = y as usize * self.pitch() + x as usize * c;
        Some(&self.pixels[i..i + c])
    }

    fn color_type(&self) -> ColorType {
        match self.channels {
            1 => ColorType::L8,
            2 => ColorType::La8,
            3 => ColorType::Rgb8,
            _ => ColorType::Rgba8,
        }
    }
}

/// Decodes an image file held in memory.
pub fn decode(bytes: &[u8]) -> Result<Surface> {
    let image = image::load_from_memory(bytes).map_err(|err| Error::data(format!("{}", err)))?;
    let (w, h) = (image.width(), image.height());

    let (pixels, channels) = match image {
        DynamicImage::ImageLuma8(v) => (v.into_raw(), 1),
        DynamicImage::ImageLumaA8(v) => (v.into_raw(), 2),
        DynamicImage::ImageRgb8(v) => (v.into_raw(), 3),
        DynamicImage::ImageRgba8(v) => (v.into_raw(), 4),
        other => (other.to_rgba8().into_raw(), 4),
    };

    Surface::new(pixels, w, h, channels)
}

/// Encodes a surface into an image file held in memory. `format` must not be
/// `FileFormat::Auto`.
pub fn encode(surface: &Surface, format: FileFormat) -> Result<Vec<u8>> {
    let format = match format {
        FileFormat::Png => CodecFormat::Png,
        FileFormat::Bmp => CodecFormat::Bmp,
        FileFormat::Tga => CodecFormat::Tga,
        FileFormat::Auto => {
            return Err(Error::data("Cannot encode without an explicit file format"));
        }
    };

    let mut bytes = Cursor::new(Vec::new());
    image::write_buffer_with_format(
        &mut bytes,
        &surface.pixels,
        surface.w,
        surface.h,
        surface.color_type(),
        format,
    )
    .map_err(|err| Error::data(format!("{}", err)))?;

    Ok(bytes.into_inner())
}

/// Detects the file format from the extension of `path`, ignoring case.
pub fn detect_format<P: AsRef<Path>>(path: P) -> Result<FileFormat> {
    let ext = path
        .as_ref()
        .extension()
        .and_then(|v| v.to_str())
        .map(|v| v.to_ascii_lowercase());

    match ext.as_ref().map(|v| v.as_str()) {
        Some("png") => Ok(FileFormat::Png),
        Some("bmp") => Ok(FileFormat::Bmp),
        Some("tga") => Ok(FileFormat::Tga),
        _ => Err(Error::data(
            "Could not detect output file format from file name",
        )),
    }
}

/// Loads and decodes an image file.
pub fn load_surface<P: AsRef<Path>>(path: P) -> Result<Surface> {
    let path = path.as_ref();
    let bytes = fs::read(path).map_err(|err| match Error::from(err) {
        Error {
            code: ErrorCode::FileNotFound,
            ..
        } => Error::file_not_found(format!("{}", path.display())),
        other => other,
    })?;

    decode(&bytes).map_err(|err| {
        Error::data(format!(
            "Failed to load \"{}\": {}",
            path.display(),
            err.details
        ))
    })
}

/// Encodes a surface and writes it to `path`. `FileFormat::Auto` picks the
/// format from the file extension.
pub fn save_surface<P: AsRef<Path>>(surface: &Surface, path: P, format: FileFormat) -> Result<()> {
    let path = path.as_ref();
    let format = match format {
        FileFormat::Auto => detect_format(path)?,
        other => other,
    };

    let bytes = encode(surface, format)?;
    fs::write(path, bytes)?;
    Ok(())
}

#[cfg(test)]
mod test {
    use super::*;

    fn checker() -> Surface {
        let pixels = vec![
            255, 0, 0, 255, 0, 255, 0, 255, //
            0, 0, 255, 255, 255, 255, 255, 128,
        ];

        Surface::new(pixels, 2, 2, 4).unwrap()
    }

    #[test]
    fn channels() {
        assert_eq!(Surface::new(vec![], 0, 0, 0).unwrap_err().code, ErrorCode::Data);
        assert_eq!(Surface::new(vec![], 0, 0, 5).unwrap_err().code, ErrorCode::Data);
        assert!(Surface::new(vec![0; 6], 2, 1, 3).is_ok());
        assert!(Surface::new(vec![0; 5], 2, 1, 3).is_err());
    }

    #[test]
    fn png() {
        let surface = checker();
        let bytes = encode(&surface, FileFormat::Png).unwrap();
        assert_eq!(decode(&bytes).unwrap(), surface);
    }

    #[test]
    fn detect() {
        assert_eq!(detect_format("a/b.PNG").unwrap(), FileFormat::Png);
        assert_eq!(detect_format("b.Bmp").unwrap(), FileFormat::Bmp);
        assert_eq!(detect_format("c.tga").unwrap(), FileFormat::Tga);

        let err = detect_format("d.jpeg").unwrap_err();
        assert_eq!(err.code, ErrorCode::Data);
        assert_eq!(err.details, "Could not detect output file format from file name");
        assert!(detect_format("noext").is_err());
    }

    #[test]
    fn missing_file() {
        let err = load_surface("this/does/not/exist.png").unwrap_err();
        assert_eq!(err.code, ErrorCode::FileNotFound);
    }
}

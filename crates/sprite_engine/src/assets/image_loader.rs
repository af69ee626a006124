//! Decoded texture data

use std::path::Path;

use super::AssetError;

/// RGBA8 pixels ready for GPU upload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextureImage {
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
    /// Row-major RGBA bytes
    pub pixels: Vec<u8>,
}

impl TextureImage {
    /// Decode an image file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, AssetError> {
        let path = path.as_ref();
        log::debug!("Loading image from: {}", path.display());

        let image = image::open(path).map_err(|err| match err {
            image::ImageError::IoError(source) => AssetError::Io {
                path: path.to_path_buf(),
                source,
            },
            other => AssetError::Decode {
                path: path.to_path_buf(),
                reason: other.to_string(),
            },
        })?;

        let rgba = image.to_rgba8();
        let (width, height) = rgba.dimensions();
        log::info!("Loaded image {width}x{height} from {}", path.display());

        Ok(Self {
            width,
            height,
            pixels: rgba.into_raw(),
        })
    }

    /// Single-color image
    pub fn solid_color(width: u32, height: u32, color: [u8; 4]) -> Self {
        let pixel_count = width as usize * height as usize;
        Self {
            width,
            height,
            pixels: color.repeat(pixel_count),
        }
    }

    /// Size of the pixel buffer in bytes
    pub fn size_bytes(&self) -> usize {
        self.pixels.len()
    }
}

//! Asset I/O collaborator

use std::path::Path;

use crate::render::ShaderSource;

use super::{AssetError, AtlasDescriptor, TextureImage};

/// Reads and decodes asset files
///
/// [`AssetCache`](super::AssetCache) calls each method at most once per alias.
pub trait AssetLoader {
    /// Decode an image into RGBA8
    fn load_image(&mut self, path: &Path) -> Result<TextureImage, AssetError>;

    /// Parse an atlas descriptor
    fn load_atlas(&mut self, path: &Path) -> Result<AtlasDescriptor, AssetError>;

    /// Read both stages of a shader
    fn load_shader(&mut self, vertex: &Path, fragment: &Path) -> Result<ShaderSource, AssetError>;
}

/// Loader backed by the local file system
#[derive(Debug, Clone, Copy, Default)]
pub struct FileSystemLoader;

impl FileSystemLoader {
    fn read_text(path: &Path) -> Result<String, AssetError> {
        log::debug!("Reading {}", path.display());
        std::fs::read_to_string(path).map_err(|source| AssetError::Io {
            path: path.to_path_buf(),
            source,
        })
    }
}

impl AssetLoader for FileSystemLoader {
    fn load_image(&mut self, path: &Path) -> Result<TextureImage, AssetError> {
        TextureImage::from_file(path)
    }

    fn load_atlas(&mut self, path: &Path) -> Result<AtlasDescriptor, AssetError> {
        let xml = Self::read_text(path)?;
        AtlasDescriptor::from_xml(path, &xml)
    }

    fn load_shader(&mut self, vertex: &Path, fragment: &Path) -> Result<ShaderSource, AssetError> {
        Ok(ShaderSource {
            vertex: Self::read_text(vertex)?,
            fragment: Self::read_text(fragment)?,
        })
    }
}

//! Asset cache
//!
//! Shaders, textures and atlases are loaded lazily by alias and never loaded
//! twice. Aliases are paths relative to the cache root:
//!
//! - shader `"shaders/sprite"` reads `shaders/sprite.vert` and `shaders/sprite.frag`
//! - texture `"textures/sheet.png"` reads that file
//! - atlas `"textures/sheet"` reads `textures/sheet.xml`, then loads the sheet
//!   image named by its `imagePath` from the same directory
//!
//! Load failures come back as [`AssetError`]; the cache itself never panics.

pub mod atlas;
pub mod image_loader;
pub mod loader;

pub use atlas::{AtlasDescriptor, SubTexture};
pub use image_loader::TextureImage;
pub use loader::{AssetLoader, FileSystemLoader};

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::foundation::collections::{ShaderId, SlotMap, TextureId};
use crate::foundation::math::Vec4;
use crate::render::ShaderProgram;

/// Asset loading errors
#[derive(Debug, Error)]
pub enum AssetError {
    /// File could not be read
    #[error("I/O error reading {path}: {source}")]
    Io {
        /// File that failed
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// File was read but could not be decoded
    #[error("Failed to decode {path}: {reason}")]
    Decode {
        /// File that failed
        path: PathBuf,
        /// Decoder message
        reason: String,
    },

    /// Atlas XML is invalid or describes rectangles off the sheet
    #[error("Malformed atlas {path}: {reason}")]
    MalformedAtlas {
        /// Atlas file
        path: PathBuf,
        /// What is wrong
        reason: String,
    },

    /// Atlas is loaded but has no such sub-texture
    #[error("Unknown sub-texture '{name}' in atlas '{atlas}'")]
    UnknownSubTexture {
        /// Atlas alias
        atlas: String,
        /// Requested name
        name: String,
    },

    /// Atlas alias has not been loaded
    #[error("Atlas '{0}' has not been loaded")]
    UnknownAtlas(String),
}

/// A loaded atlas and the texture holding its sheet
#[derive(Debug, Clone)]
pub struct Atlas {
    /// Sheet texture
    pub texture: TextureId,
    /// Parsed descriptor
    pub descriptor: AtlasDescriptor,
}

/// Deduplicating lazy registry of shaders, textures and atlases
pub struct AssetCache {
    root: PathBuf,
    loader: Box<dyn AssetLoader>,
    shaders: SlotMap<ShaderId, ShaderProgram>,
    shader_aliases: HashMap<String, ShaderId>,
    textures: SlotMap<TextureId, TextureImage>,
    texture_aliases: HashMap<String, TextureId>,
    atlases: HashMap<String, Atlas>,
    // "<atlas alias>/<sub-texture name>" -> UV rect
    sub_rects: HashMap<String, Vec4>,
}

impl std::fmt::Debug for AssetCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AssetCache")
            .field("root", &self.root)
            .field("shaders", &self.shader_aliases.keys().collect::<Vec<_>>())
            .field("textures", &self.texture_aliases.keys().collect::<Vec<_>>())
            .field("atlases", &self.atlases.keys().collect::<Vec<_>>())
            .finish_non_exhaustive()
    }
}

impl AssetCache {
    /// Cache resolving aliases against `root` through `loader`
    pub fn new(root: impl Into<PathBuf>, loader: Box<dyn AssetLoader>) -> Self {
        Self {
            root: root.into(),
            loader,
            shaders: SlotMap::with_key(),
            shader_aliases: HashMap::new(),
            textures: SlotMap::with_key(),
            texture_aliases: HashMap::new(),
            atlases: HashMap::new(),
            sub_rects: HashMap::new(),
        }
    }

    /// Cache reading from the file system under `root`
    pub fn with_filesystem(root: impl Into<PathBuf>) -> Self {
        Self::new(root, Box::new(FileSystemLoader))
    }

    /// Directory aliases are resolved against
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Shader program for `alias`, loading it on first use
    pub fn shader(&mut self, alias: &str) -> Result<ShaderId, AssetError> {
        if let Some(&id) = self.shader_aliases.get(alias) {
            log::trace!("Shader cache hit: {alias}");
            return Ok(id);
        }

        let vertex = self.root.join(format!("{alias}.vert"));
        let fragment = self.root.join(format!("{alias}.frag"));
        let source = self.loader.load_shader(&vertex, &fragment)?;

        let id = self.shaders.insert(ShaderProgram::parse(alias, source));
        self.shader_aliases.insert(alias.to_owned(), id);
        log::info!("Loaded shader '{alias}'");
        Ok(id)
    }

    /// Texture for `alias`, loading it on first use
    pub fn texture(&mut self, alias: &str) -> Result<TextureId, AssetError> {
        if let Some(&id) = self.texture_aliases.get(alias) {
            log::trace!("Texture cache hit: {alias}");
            return Ok(id);
        }

        let image = self.loader.load_image(&self.root.join(alias))?;
        log::info!("Loaded texture '{alias}' ({}x{})", image.width, image.height);

        let id = self.textures.insert(image);
        self.texture_aliases.insert(alias.to_owned(), id);
        Ok(id)
    }

    /// Atlas for `alias`, loading the descriptor and its sheet on first use
    ///
    /// Every sub-texture's UV rectangle is computed here, once.
    pub fn atlas(&mut self, alias: &str) -> Result<&Atlas, AssetError> {
        if self.atlases.contains_key(alias) {
            log::trace!("Atlas cache hit: {alias}");
            return self.loaded_atlas(alias);
        }

        let path = self.root.join(format!("{alias}.xml"));
        let descriptor = self.loader.load_atlas(&path)?;

        let sheet_alias = match alias.rsplit_once('/') {
            Some((dir, _)) => format!("{dir}/{}", descriptor.image_path),
            None => descriptor.image_path.clone(),
        };
        let texture = self.texture(&sheet_alias)?;
        let (width, height) = self
            .textures
            .get(texture)
            .map(|image| (image.width, image.height))
            .unwrap_or_default();

        let mut rects = Vec::with_capacity(descriptor.sub_textures.len());
        for sub in &descriptor.sub_textures {
            if !sub.fits(width, height) {
                return Err(AssetError::MalformedAtlas {
                    path,
                    reason: format!(
                        "sub-texture '{}' ({}, {}, {}x{}) does not fit the {width}x{height} sheet",
                        sub.name, sub.x, sub.y, sub.width, sub.height
                    ),
                });
            }
            rects.push((format!("{alias}/{}", sub.name), sub.uv_rect(width, height)));
        }
        self.sub_rects.extend(rects);

        log::info!(
            "Loaded atlas '{alias}' with {} sub-textures",
            descriptor.sub_textures.len()
        );
        Ok(self
            .atlases
            .entry(alias.to_owned())
            .or_insert(Atlas { texture, descriptor }))
    }

    /// Atlas loaded earlier under `alias`
    pub fn loaded_atlas(&self, alias: &str) -> Result<&Atlas, AssetError> {
        self.atlases
            .get(alias)
            .ok_or_else(|| AssetError::UnknownAtlas(alias.to_owned()))
    }

    /// UV rectangle `[u0, v0, u1, v1]` of `name` inside atlas `atlas`
    pub fn sub_rect(&self, atlas: &str, name: &str) -> Result<Vec4, AssetError> {
        self.loaded_atlas(atlas)?;
        self.sub_rects
            .get(&format!("{atlas}/{name}"))
            .copied()
            .ok_or_else(|| AssetError::UnknownSubTexture {
                atlas: atlas.to_owned(),
                name: name.to_owned(),
            })
    }

    /// Width over height of a sub-texture's UV rectangle
    pub fn aspect_ratio(&self, atlas: &str, name: &str) -> Result<f32, AssetError> {
        let rect = self.sub_rect(atlas, name)?;
        Ok((rect.z - rect.x) / (rect.w - rect.y))
    }

    /// Loaded shader program
    pub fn shader_program(&self, id: ShaderId) -> Option<&ShaderProgram> {
        self.shaders.get(id)
    }

    /// Loaded texture pixels
    pub fn texture_image(&self, id: TextureId) -> Option<&TextureImage> {
        self.textures.get(id)
    }

    /// Number of distinct shaders loaded
    pub fn shader_count(&self) -> usize {
        self.shaders.len()
    }

    /// Number of distinct textures loaded
    pub fn texture_count(&self) -> usize {
        self.textures.len()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::render::ShaderSource;
    use approx::assert_relative_eq;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    pub const SPRITE_VERT: &str = "layout(location = 0) in vec2 iVert;
uniform mat3 uTransformation;
uniform vec4 uniSubTexPos;";
    pub const SPRITE_FRAG: &str = "uniform vec4 uniColor;
uniform float uniColorMix;
uniform sampler2D uTexture;";

    /// How many times each loader method ran
    #[derive(Debug, Default, Clone)]
    pub struct LoadCounts {
        pub images: Arc<AtomicUsize>,
        pub atlases: Arc<AtomicUsize>,
        pub shaders: Arc<AtomicUsize>,
    }

    /// In-memory loader keyed by path, counting every call
    #[derive(Debug, Default)]
    pub struct CountingLoader {
        pub files: HashMap<PathBuf, String>,
        pub images: HashMap<PathBuf, TextureImage>,
        pub counts: LoadCounts,
    }

    impl CountingLoader {
        pub fn with_sprite_shader(root: &Path) -> Self {
            let mut loader = Self::default();
            loader.files.insert(root.join("shaders/sprite.vert"), SPRITE_VERT.to_owned());
            loader.files.insert(root.join("shaders/sprite.frag"), SPRITE_FRAG.to_owned());
            loader
        }

        fn text(&self, path: &Path) -> Result<String, AssetError> {
            self.files.get(path).cloned().ok_or_else(|| AssetError::Io {
                path: path.to_path_buf(),
                source: std::io::ErrorKind::NotFound.into(),
            })
        }
    }

    impl AssetLoader for CountingLoader {
        fn load_image(&mut self, path: &Path) -> Result<TextureImage, AssetError> {
            self.counts.images.fetch_add(1, Ordering::SeqCst);
            self.images.get(path).cloned().ok_or_else(|| AssetError::Io {
                path: path.to_path_buf(),
                source: std::io::ErrorKind::NotFound.into(),
            })
        }

        fn load_atlas(&mut self, path: &Path) -> Result<AtlasDescriptor, AssetError> {
            self.counts.atlases.fetch_add(1, Ordering::SeqCst);
            AtlasDescriptor::from_xml(path, &self.text(path)?)
        }

        fn load_shader(&mut self, vertex: &Path, fragment: &Path) -> Result<ShaderSource, AssetError> {
            self.counts.shaders.fetch_add(1, Ordering::SeqCst);
            Ok(ShaderSource {
                vertex: self.text(vertex)?,
                fragment: self.text(fragment)?,
            })
        }
    }

    fn atlas_loader(root: &Path) -> CountingLoader {
        let mut loader = CountingLoader::with_sprite_shader(root);
        loader.files.insert(
            root.join("textures/sheet.xml"),
            r#"<TextureAtlas imagePath="sheet.png">
                <SubTexture name="enemyRed1.png" x="0" y="0" width="64" height="32"/>
                <SubTexture name="laserBlue01.png" x="64" y="32" width="16" height="32"/>
            </TextureAtlas>"#
                .to_owned(),
        );
        loader
            .images
            .insert(root.join("textures/sheet.png"), TextureImage::solid_color(128, 64, [0; 4]));
        loader
    }

    #[test]
    fn test_shader_loaded_once_per_alias() {
        let loader = CountingLoader::with_sprite_shader(Path::new("assets"));
        let counts = loader.counts.clone();
        let mut cache = AssetCache::new("assets", Box::new(loader));

        let ids: Vec<_> = (0..3).map(|_| cache.shader("shaders/sprite").unwrap()).collect();

        assert_eq!(counts.shaders.load(Ordering::SeqCst), 1);
        assert!(ids.iter().all(|id| *id == ids[0]));
        assert_eq!(cache.shader_count(), 1);
        assert!(cache.shader_program(ids[0]).is_some_and(|p| p.has_attribute("iVert")));
    }

    #[test]
    fn test_failed_load_is_reported_and_not_cached() {
        let loader = CountingLoader::default();
        let counts = loader.counts.clone();
        let mut cache = AssetCache::new("assets", Box::new(loader));

        assert!(matches!(cache.shader("shaders/missing"), Err(AssetError::Io { .. })));
        assert!(cache.shader("shaders/missing").is_err());
        assert_eq!(counts.shaders.load(Ordering::SeqCst), 2);
        assert_eq!(cache.shader_count(), 0);
    }

    #[test]
    fn test_atlas_computes_uv_table() {
        let loader = atlas_loader(Path::new("assets"));
        let counts = loader.counts.clone();
        let mut cache = AssetCache::new("assets", Box::new(loader));

        let texture = cache.atlas("textures/sheet").unwrap().texture;
        cache.atlas("textures/sheet").unwrap();
        assert_eq!(counts.atlases.load(Ordering::SeqCst), 1);
        assert_eq!(counts.images.load(Ordering::SeqCst), 1);

        // the sheet is shared with plain texture lookups
        assert_eq!(cache.texture("textures/sheet.png").unwrap(), texture);

        let uv = cache.sub_rect("textures/sheet", "laserBlue01.png").unwrap();
        assert_relative_eq!(uv, Vec4::new(0.5, 0.5, 0.625, 1.0));
        assert_relative_eq!(cache.aspect_ratio("textures/sheet", "enemyRed1.png").unwrap(), 1.0);
    }

    #[test]
    fn test_unknown_lookups_are_typed_errors() {
        let mut cache = AssetCache::new("assets", Box::new(atlas_loader(Path::new("assets"))));
        assert!(matches!(
            cache.sub_rect("textures/sheet", "enemyRed1.png"),
            Err(AssetError::UnknownAtlas(_))
        ));

        cache.atlas("textures/sheet").unwrap();
        assert!(matches!(
            cache.sub_rect("textures/sheet", "ufo.png"),
            Err(AssetError::UnknownSubTexture { .. })
        ));
    }

    #[test]
    fn test_rect_off_the_sheet_is_malformed() {
        let root = Path::new("assets");
        let mut loader = atlas_loader(root);
        loader
            .images
            .insert(root.join("textures/sheet.png"), TextureImage::solid_color(32, 32, [0; 4]));
        let mut cache = AssetCache::new(root, Box::new(loader));

        assert!(matches!(
            cache.atlas("textures/sheet"),
            Err(AssetError::MalformedAtlas { .. })
        ));
        assert!(cache.loaded_atlas("textures/sheet").is_err());
    }

    #[test]
    fn test_filesystem_cache_end_to_end() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("textures")).unwrap();
        std::fs::write(
            dir.path().join("textures/sheet.xml"),
            r#"<TextureAtlas imagePath="sheet.png"><SubTexture name="dot" x="2" y="0" width="2" height="2"/></TextureAtlas>"#,
        )
        .unwrap();
        image::RgbaImage::new(4, 2).save(dir.path().join("textures/sheet.png")).unwrap();

        let mut cache = AssetCache::with_filesystem(dir.path());
        cache.atlas("textures/sheet").unwrap();
        assert_relative_eq!(
            cache.sub_rect("textures/sheet", "dot").unwrap(),
            Vec4::new(0.5, 0.0, 1.0, 1.0)
        );
    }
}

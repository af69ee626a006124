//! Texture atlas descriptors
//!
//! An atlas is a single sprite sheet plus an XML table of named pixel
//! rectangles:
//!
//! ```xml
//! <TextureAtlas imagePath="sheet.png">
//!     <SubTexture name="playerShip1_blue.png" x="211" y="941" width="99" height="75"/>
//! </TextureAtlas>
//! ```

use std::path::Path;

use serde::Deserialize;

use crate::foundation::math::Vec4;

use super::AssetError;

/// One named rectangle on the sheet, in pixels
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SubTexture {
    /// Name used for lookups
    #[serde(rename = "@name")]
    pub name: String,
    /// Left edge
    #[serde(rename = "@x")]
    pub x: u32,
    /// Top edge
    #[serde(rename = "@y")]
    pub y: u32,
    /// Width
    #[serde(rename = "@width")]
    pub width: u32,
    /// Height
    #[serde(rename = "@height")]
    pub height: u32,
}

impl SubTexture {
    /// Normalized `[x/W, y/H, (x+w)/W, (y+h)/H]` on a `W` x `H` sheet
    #[allow(clippy::cast_precision_loss)]
    pub fn uv_rect(&self, sheet_width: u32, sheet_height: u32) -> Vec4 {
        let (w, h) = (sheet_width as f32, sheet_height as f32);
        Vec4::new(
            self.x as f32 / w,
            self.y as f32 / h,
            (self.x + self.width) as f32 / w,
            (self.y + self.height) as f32 / h,
        )
    }

    /// Whether the rectangle is non-empty and lies on the sheet
    pub fn fits(&self, sheet_width: u32, sheet_height: u32) -> bool {
        self.width > 0
            && self.height > 0
            && self.x.checked_add(self.width).is_some_and(|right| right <= sheet_width)
            && self.y.checked_add(self.height).is_some_and(|bottom| bottom <= sheet_height)
    }
}

/// Parsed atlas XML
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AtlasDescriptor {
    /// Sheet image, relative to the atlas file's directory
    #[serde(rename = "@imagePath")]
    pub image_path: String,
    /// Named rectangles in document order
    #[serde(rename = "SubTexture", default)]
    pub sub_textures: Vec<SubTexture>,
}

impl AtlasDescriptor {
    /// Parse atlas XML; `path` is only used for error context
    pub fn from_xml(path: &Path, xml: &str) -> Result<Self, AssetError> {
        quick_xml::de::from_str(xml).map_err(|err| AssetError::MalformedAtlas {
            path: path.to_path_buf(),
            reason: err.to_string(),
        })
    }

    /// Sub-texture by name
    pub fn find(&self, name: &str) -> Option<&SubTexture> {
        self.sub_textures.iter().find(|sub| sub.name == name)
    }

    /// Names starting with `prefix`, in document order
    pub fn names_with_prefix<'a>(&'a self, prefix: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.sub_textures
            .iter()
            .map(|sub| sub.name.as_str())
            .filter(move |name| name.starts_with(prefix))
    }
}

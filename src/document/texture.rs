//! Texture assets with content hashing

use std::io::Cursor;

use image::{ImageFormat, RgbaImage};

use crate::core::error::Error;
use crate::core::types::Result;

const FNV_OFFSET: u64 = 0xcbf29ce484222325;
const FNV_PRIME: u64 = 0x100000001b3;

fn fnv1a(bytes: &[u8]) -> u64 {
    let mut hash = FNV_OFFSET;
    for &b in bytes {
        hash ^= b as u64;
        hash = hash.wrapping_mul(FNV_PRIME);
    }
    hash
}

/// A texture asset owned by the document.
///
/// Only identity and equality matter to the engine; the pixel payload is
/// opaque. The content hash is derived from the PNG encoding so externally
/// re-imported duplicates hash alike, and is cached after the first request.
#[derive(Clone, Debug)]
pub struct TextureAsset {
    image: RgbaImage,
    hash: Option<String>,
}

impl PartialEq for TextureAsset {
    fn eq(&self, other: &Self) -> bool {
        // the hash is a cache, not content
        self.image == other.image
    }
}

impl TextureAsset {
    /// Wrap an image whose dimensions match the required edge length.
    pub fn new(image: RgbaImage, required_size: u32) -> Result<Self> {
        if image.width() != required_size || image.height() != required_size {
            return Err(Error::Texture(format!(
                "expected {required_size}x{required_size} texture, got {}x{}",
                image.width(),
                image.height()
            )));
        }
        Ok(Self { image, hash: None })
    }

    /// The pixel payload.
    pub fn image(&self) -> &RgbaImage {
        &self.image
    }

    /// Content hash as lowercase hex, computed lazily and cached.
    ///
    /// An encode failure is logged and degrades to an empty hash; it is
    /// never fatal to the document.
    pub fn content_hash(&mut self) -> &str {
        if self.hash.is_none() {
            self.hash = Some(match encode_png(&self.image) {
                Ok(bytes) => format!("{:016x}", fnv1a(&bytes)),
                Err(err) => {
                    log::warn!("texture hash unavailable, png encode failed: {err}");
                    String::new()
                }
            });
        }
        self.hash.as_deref().unwrap_or_default()
    }
}

fn encode_png(image: &RgbaImage) -> Result<Vec<u8>> {
    let mut bytes = Vec::new();
    image.write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)?;
    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn checker(size: u32, seed: u8) -> RgbaImage {
        RgbaImage::from_fn(size, size, |x, y| {
            let v = if (x + y) % 2 == 0 { 255 } else { seed };
            image::Rgba([v, seed, v, 255])
        })
    }

    #[test]
    fn test_dimension_validation() {
        assert!(TextureAsset::new(checker(32, 0), 32).is_ok());
        assert!(TextureAsset::new(checker(16, 0), 32).is_err());
    }

    #[test]
    fn test_hash_is_stable_and_cached() {
        let mut asset = TextureAsset::new(checker(32, 10), 32).unwrap();
        let first = asset.content_hash().to_string();
        assert_eq!(asset.content_hash(), first);
        assert_eq!(first.len(), 16);
    }

    #[test]
    fn test_equal_content_hashes_alike() {
        let mut a = TextureAsset::new(checker(32, 10), 32).unwrap();
        let mut b = TextureAsset::new(checker(32, 10), 32).unwrap();
        let mut c = TextureAsset::new(checker(32, 11), 32).unwrap();
        assert_eq!(a.content_hash(), b.content_hash());
        assert_ne!(b.content_hash(), c.content_hash());
    }

    #[test]
    fn test_fnv1a_known_values() {
        // empty input hashes to the offset basis
        assert_eq!(fnv1a(&[]), FNV_OFFSET);
        assert_ne!(fnv1a(b"a"), fnv1a(b"b"));
    }
}

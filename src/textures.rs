//! Image data for photo mounts and the particle sprite.
//!
//! Photos are referenced by an opaque string: either a path on disk or a
//! `data:<mime>;base64,<payload>` URL, which is how photos are persisted so
//! the keepsake file is self-contained.
//!
//! # Supported Formats
//!
//! - PNG (recommended)
//! - JPEG

use crate::error::TextureError;
use base64::{engine::general_purpose::STANDARD as BASE64_STANDARD, Engine as _};
use std::path::Path;

/// Photos larger than this on either side are downscaled on decode.
pub const MAX_PHOTO_SIDE: u32 = 2048;

/// Decoded RGBA8 pixels.
#[derive(Clone, PartialEq, Eq)]
pub struct PhotoImage {
    /// Raw RGBA pixel data (width * height * 4 bytes).
    pub rgba: Vec<u8>,
    pub width: u32,
    pub height: u32,
}

impl std::fmt::Debug for PhotoImage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PhotoImage")
            .field("width", &self.width)
            .field("height", &self.height)
            .finish_non_exhaustive()
    }
}

impl PhotoImage {
    /// Wrap raw RGBA data.
    ///
    /// # Panics
    ///
    /// Panics if `rgba.len() != width * height * 4`.
    pub fn from_rgba(rgba: Vec<u8>, width: u32, height: u32) -> Self {
        assert_eq!(
            rgba.len(),
            (width * height * 4) as usize,
            "RGBA data size mismatch"
        );
        Self {
            rgba,
            width,
            height,
        }
    }

    /// Decode encoded image bytes (PNG, JPEG).
    ///
    /// Images bigger than [`MAX_PHOTO_SIDE`] are shrunk, keeping the aspect.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, TextureError> {
        let mut img = image::load_from_memory(bytes)?;
        if img.width() > MAX_PHOTO_SIDE || img.height() > MAX_PHOTO_SIDE {
            img = img.thumbnail(MAX_PHOTO_SIDE, MAX_PHOTO_SIDE);
        }
        let img = img.into_rgba8();
        let (width, height) = img.dimensions();
        Ok(Self {
            rgba: img.into_raw(),
            width,
            height,
        })
    }

    /// Load an image file from disk.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, TextureError> {
        let bytes = std::fs::read(path)?;
        Self::from_bytes(&bytes)
    }

    /// Resolve a photo reference: a base64 data URL or a file path.
    pub fn load(reference: &str) -> Result<Self, TextureError> {
        if reference.starts_with("data:") {
            Self::from_bytes(&decode_data_url(reference)?)
        } else {
            Self::from_file(reference)
        }
    }

    /// Solid single-pixel image, used as the placeholder texture.
    pub fn solid(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self::from_rgba(vec![r, g, b, a], 1, 1)
    }

    /// Soft round particle sprite: white at the center fading to transparent.
    pub fn sprite(size: u32) -> Self {
        let size = size.max(1);
        let radius = size as f32 / 2.0;
        let mut rgba = Vec::with_capacity((size * size * 4) as usize);
        for y in 0..size {
            for x in 0..size {
                let dx = x as f32 + 0.5 - radius;
                let dy = y as f32 + 0.5 - radius;
                let t = ((dx * dx + dy * dy).sqrt() / radius).min(1.0);
                let v = ((1.0 - t) * 255.0).round() as u8;
                rgba.extend_from_slice(&[v, v, v, v]);
            }
        }
        Self::from_rgba(rgba, size, size)
    }
}

/// Extract the payload of a `data:...;base64,...` URL.
pub fn decode_data_url(url: &str) -> Result<Vec<u8>, TextureError> {
    let (header, payload) = url
        .strip_prefix("data:")
        .and_then(|rest| rest.split_once(','))
        .ok_or(TextureError::MalformedDataUrl)?;
    if !header.ends_with(";base64") {
        return Err(TextureError::MalformedDataUrl);
    }
    Ok(BASE64_STANDARD.decode(payload.trim())?)
}

/// Encode image bytes as a data URL; the MIME type comes from `path`'s extension.
pub fn encode_data_url(bytes: &[u8], path: impl AsRef<Path>) -> String {
    let mime = match path
        .as_ref()
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .as_deref()
    {
        Some("png") => "image/png",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        _ => "application/octet-stream",
    };
    format!("data:{mime};base64,{}", BASE64_STANDARD.encode(bytes))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tiny_png() -> Vec<u8> {
        let img = image::RgbaImage::from_pixel(2, 3, image::Rgba([10, 20, 30, 255]));
        let mut bytes = std::io::Cursor::new(Vec::new());
        img.write_to(&mut bytes, image::ImageFormat::Png).unwrap();
        bytes.into_inner()
    }

    #[test]
    fn test_decode_png_bytes() {
        let photo = PhotoImage::from_bytes(&tiny_png()).unwrap();
        assert_eq!((photo.width, photo.height), (2, 3));
        assert_eq!(&photo.rgba[..4], &[10, 20, 30, 255]);
    }

    #[test]
    fn test_large_photo_is_downscaled() {
        let img = image::RgbaImage::new(MAX_PHOTO_SIDE * 2, 16);
        let mut bytes = std::io::Cursor::new(Vec::new());
        img.write_to(&mut bytes, image::ImageFormat::Png).unwrap();
        let photo = PhotoImage::from_bytes(&bytes.into_inner()).unwrap();
        assert_eq!(photo.width, MAX_PHOTO_SIDE);
        assert!(photo.height <= 16);
    }

    #[test]
    fn test_data_url_load() {
        let url = encode_data_url(&tiny_png(), "me.PNG");
        assert!(url.starts_with("data:image/png;base64,"));
        let photo = PhotoImage::load(&url).unwrap();
        assert_eq!(photo.width, 2);
    }

    #[test]
    fn test_malformed_data_url() {
        assert!(matches!(
            decode_data_url("data:image/png,abc"),
            Err(TextureError::MalformedDataUrl)
        ));
        assert!(matches!(
            decode_data_url("data:image/png;base64,@@@"),
            Err(TextureError::Base64(_))
        ));
    }

    #[test]
    fn test_missing_file() {
        assert!(matches!(
            PhotoImage::load("/definitely/not/here.png"),
            Err(TextureError::Io(_))
        ));
    }

    #[test]
    fn test_garbage_bytes() {
        assert!(matches!(
            PhotoImage::from_bytes(b"not an image"),
            Err(TextureError::ImageLoad(_))
        ));
    }

    #[test]
    fn test_sprite_falloff() {
        let sprite = PhotoImage::sprite(64);
        assert_eq!(sprite.rgba.len(), 64 * 64 * 4);
        let center = ((32 * 64 + 32) * 4) as usize;
        let corner = 0;
        assert!(sprite.rgba[center + 3] > 240);
        assert_eq!(sprite.rgba[corner + 3], 0);
    }
}

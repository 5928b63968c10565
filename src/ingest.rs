//! Local image input.
//!
//! The pipeline operates on a single still image read from a local path.
//! The ingest layer is responsible for:
//! - Decoding the file in-memory (JPEG/PNG via the `image` crate)
//! - Normalizing pixel data to packed RGB8
//! - Recording the source dimensions used later for coordinate normalization
//!
//! It MUST NOT fetch remote URLs or write decoded pixels back to disk.

use std::path::Path;

use anyhow::{anyhow, Context, Result};

/// A decoded frame: packed RGB8 pixels plus source dimensions.
#[derive(Clone, Debug)]
pub struct ImageFrame {
    pixels: Vec<u8>,
    pub width: u32,
    pub height: u32,
}

impl ImageFrame {
    /// Wrap an already-decoded RGB8 buffer. Length must be `width * height * 3`.
    pub fn from_rgb8(pixels: Vec<u8>, width: u32, height: u32) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(anyhow!("image dimensions must be non-zero"));
        }
        let expected = (width as usize)
            .checked_mul(height as usize)
            .and_then(|v| v.checked_mul(3))
            .ok_or_else(|| anyhow!("image dimensions overflow"))?;
        if pixels.len() != expected {
            return Err(anyhow!(
                "RGB frame length mismatch: expected {}, got {}",
                expected,
                pixels.len()
            ));
        }
        Ok(Self {
            pixels,
            width,
            height,
        })
    }

    /// Read-only view of the packed RGB8 pixel data.
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }
}

/// Decode a local image file into an [`ImageFrame`].
pub fn load_image<P: AsRef<Path>>(path: P) -> Result<ImageFrame> {
    let path = path.as_ref();
    if !path.is_file() {
        return Err(anyhow!("input image {} is not a file", path.display()));
    }
    let decoded = image::open(path)
        .with_context(|| format!("failed to decode image {}", path.display()))?;
    let rgb = decoded.to_rgb8();
    let (width, height) = rgb.dimensions();
    ImageFrame::from_rgb8(rgb.into_raw(), width, height)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageBuffer, Rgb};

    #[test]
    fn from_rgb8_validates_length() {
        let frame = ImageFrame::from_rgb8(vec![0u8; 12], 2, 2).unwrap();
        assert_eq!(frame.width, 2);
        assert_eq!(frame.height, 2);
        assert_eq!(frame.pixels().len(), 12);

        assert!(ImageFrame::from_rgb8(vec![0u8; 11], 2, 2).is_err());
        assert!(ImageFrame::from_rgb8(vec![], 0, 2).is_err());
    }

    #[test]
    fn load_image_decodes_png() -> Result<()> {
        let img: ImageBuffer<Rgb<u8>, Vec<u8>> =
            ImageBuffer::from_fn(4, 3, |x, _| Rgb([x as u8 * 10, 0, 255]));
        let file = tempfile::Builder::new().suffix(".png").tempfile()?;
        img.save(file.path())?;

        let frame = load_image(file.path())?;
        assert_eq!((frame.width, frame.height), (4, 3));
        assert_eq!(&frame.pixels()[..3], &[0, 0, 255]);
        Ok(())
    }

    #[test]
    fn load_image_rejects_missing_file() {
        let err = load_image("does_not_exist.jpg").unwrap_err();
        assert!(err.to_string().contains("not a file"));
    }
}

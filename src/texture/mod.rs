//! PNG decode and exact pixel sampling
//!
//! The compressed byte stream is decoded into a row-major RGB/RGBA
//! pixel buffer that stays resident for the image's lifetime, so the
//! CPU can look up exact pixel values (procedural composition,
//! validation tooling) while the GPU gets the same bytes uploaded once.
//!
//! Row convention: row 0 is the image's visual BOTTOM edge. Rows are
//! inverted from the file's top-down order at decode time so texture
//! coordinates with a bottom-left origin sample correctly without a
//! per-draw flip. `get_pixel` follows the same convention.

use image::DynamicImage;

use crate::core::error::Error;

/// A decoded image held as raw 8-bit pixels, immutable after decode.
pub struct DecodedImage {
    width: u32,
    height: u32,
    /// Channels per pixel: 3 (RGB) or 4 (RGBA).
    channels: u8,
    /// Always 8 after decode; 16-bit sources are downsampled.
    bits_per_channel: u8,
    /// Row-major pixel bytes, rows stored bottom-to-top.
    data: Vec<u8>,
}

impl DecodedImage {
    /// Decode a PNG byte stream.
    ///
    /// Supported color models: RGB, RGBA, and palette (expanded to RGB
    /// or RGBA by the decoder, palette transparency becoming a full
    /// alpha channel). 16-bit channels are downsampled to 8 bits.
    /// Anything else — grayscale in particular — is a hard
    /// [`Error::ImageFormat`] failure, not a best-effort fallback.
    pub fn decode(bytes: &[u8]) -> Result<Self, Error> {
        let decoded =
            image::load_from_memory(bytes).map_err(|e| Error::ImageFormat(e.to_string()))?;

        let width = decoded.width();
        let height = decoded.height();

        let (channels, pixels) = match decoded {
            DynamicImage::ImageRgb8(img) => (3u8, img.into_raw()),
            DynamicImage::ImageRgba8(img) => (4, img.into_raw()),
            DynamicImage::ImageRgb16(img) => {
                (3, DynamicImage::ImageRgb16(img).into_rgb8().into_raw())
            }
            DynamicImage::ImageRgba16(img) => {
                (4, DynamicImage::ImageRgba16(img).into_rgba8().into_raw())
            }
            other => {
                return Err(Error::ImageFormat(format!(
                    "unsupported color type {:?} (only RGB, RGBA and palette are supported)",
                    other.color()
                )));
            }
        };

        // Invert row order: file rows run top-down, ours bottom-up.
        let stride = width as usize * channels as usize;
        let mut data = Vec::with_capacity(pixels.len());
        for row in (0..height as usize).rev() {
            data.extend_from_slice(&pixels[row * stride..(row + 1) * stride]);
        }

        log::debug!("decoded {width}x{height} image with {channels} channels");

        Ok(Self {
            width,
            height,
            channels,
            bits_per_channel: 8,
            data,
        })
    }

    /// Read a PNG file from disk and decode it.
    pub fn from_file(path: &std::path::Path) -> Result<Self, Error> {
        let bytes = std::fs::read(path)?;
        Self::decode(&bytes)
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Channels per pixel: 3 for RGB, 4 for RGBA.
    pub fn channels(&self) -> u8 {
        self.channels
    }

    pub fn bits_per_channel(&self) -> u8 {
        self.bits_per_channel
    }

    /// Exact pixel lookup at (`col`, `row`), row 0 at the visual bottom.
    ///
    /// Returns `[r, g, b, a]`, with `a = 255` when the source had no
    /// alpha channel. Fails with [`Error::OutOfBounds`] past the decoded
    /// dimensions (no partial read) and [`Error::Unsampleable`] if the
    /// image cannot report RGB.
    pub fn get_pixel(&self, col: u32, row: u32) -> Result<[u8; 4], Error> {
        if col >= self.width || row >= self.height {
            return Err(Error::OutOfBounds {
                col,
                row,
                width: self.width,
                height: self.height,
            });
        }
        if self.channels < 3 {
            return Err(Error::Unsampleable(format!(
                "{} channels per pixel, need at least 3",
                self.channels
            )));
        }

        let bytes_per_pixel = self.channels as usize;
        let offset = (row as usize * self.width as usize + col as usize) * bytes_per_pixel;
        let px = &self.data[offset..offset + bytes_per_pixel];
        let a = if bytes_per_pixel > 3 { px[3] } else { 255 };
        Ok([px[0], px[1], px[2], a])
    }

    /// Raw pixel bytes, rows bottom-to-top.
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    /// Pixel bytes expanded to RGBA for GPU upload.
    ///
    /// wgpu has no 3-channel 8-bit format, so RGB sources gain an opaque
    /// alpha channel here. RGBA sources are returned as stored.
    pub fn to_rgba_bytes(&self) -> Vec<u8> {
        if self.channels == 4 {
            return self.data.clone();
        }
        let mut out = Vec::with_capacity(self.width as usize * self.height as usize * 4);
        for px in self.data.chunks_exact(3) {
            out.extend_from_slice(px);
            out.push(255);
        }
        out
    }
}

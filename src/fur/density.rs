//! Fur density texture generation
//!
//! Each texel encodes the deepest shell layer at which a hair strand is
//! still visible. Channel 0 holds the quantized layer threshold and the
//! alpha channel marks strand presence: alpha 0 means no strand at any
//! layer, alpha 255 means a strand for every layer fraction up to the
//! threshold and none above it. The fragment stage point-samples this
//! map and discards fragments whose interpolated layer exceeds the
//! threshold.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::core::error::Error;

/// Exponent biasing strand visibility toward shallow layers.
///
/// A power below 1 makes most strands reach deep into the stack and
/// only a few survive to the tip, approximating real fur falloff. This
/// is a perceptual tuning, not an arbitrary constant.
const FALLOFF_EXPONENT: f32 = 0.7;

/// CPU-side fur density texel grid, RGBA8, immutable after generation.
pub struct FurDensityMap {
    width: u32,
    height: u32,
    layer_count: u32,
    texels: Vec<[u8; 4]>,
}

impl FurDensityMap {
    /// Generate a `width` x `height` density map for `layer_count` shells.
    ///
    /// `density` is the areal fraction of texels carrying a strand, in
    /// [0, 1]. Strand positions are drawn with replacement from a seeded
    /// RNG, so a later strand may overwrite an earlier one at the same
    /// texel; that collision is accepted behavior. Strands are assigned
    /// to layer buckets by integer division, which absorbs the remainder
    /// into the highest reachable bucket — a rounding artifact of the
    /// fill loop, kept as-is.
    pub fn generate(
        width: u32,
        height: u32,
        layer_count: u32,
        density: f32,
        seed: u64,
    ) -> Result<Self, Error> {
        if !(0.0..=1.0).contains(&density) {
            return Err(Error::InvalidParameter(format!(
                "density must be in [0, 1], got {density}"
            )));
        }
        if layer_count == 0 {
            return Err(Error::InvalidParameter(
                "layer count must be at least 1".into(),
            ));
        }
        if width == 0 || height == 0 {
            return Err(Error::InvalidParameter(format!(
                "texture dimensions must be non-zero, got {width}x{height}"
            )));
        }

        let total_texels = (width as usize) * (height as usize);
        // All texels start empty: alpha 0, never a strand.
        let mut texels = vec![[0u8; 4]; total_texels];

        let total_strands = (density * total_texels as f32) as usize;
        let strands_per_layer = total_strands / layer_count as usize;

        let mut rng = StdRng::seed_from_u64(seed);
        for i in 0..total_strands {
            let x = rng.random_range(0..width);
            let y = rng.random_range(0..height);

            let bucket = if strands_per_layer == 0 {
                0
            } else {
                i / strands_per_layer
            };
            // Compute the threshold in float before quantizing; clamp so
            // remainder strands cannot push past the outermost shell.
            let max_layer = (bucket as f32 / layer_count as f32)
                .min(1.0)
                .powf(FALLOFF_EXPONENT);

            let idx = (y * width + x) as usize;
            texels[idx] = [(max_layer * 255.0).round() as u8, 0, 0, 255];
        }

        log::info!(
            "generated {}x{} fur density map: {} strands over {} layers",
            width,
            height,
            total_strands,
            layer_count
        );

        Ok(Self {
            width,
            height,
            layer_count,
            texels,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn layer_count(&self) -> u32 {
        self.layer_count
    }

    /// Texel at (x, y), as stored (RGBA8).
    pub fn texel(&self, x: u32, y: u32) -> [u8; 4] {
        self.texels[(y * self.width + x) as usize]
    }

    /// Decoded layer threshold of the texel at (x, y), or `None` if the
    /// texel never shows a strand (alpha 0).
    pub fn max_visible_layer(&self, x: u32, y: u32) -> Option<f32> {
        let t = self.texel(x, y);
        (t[3] > 0).then(|| t[0] as f32 / 255.0)
    }

    /// Raw texel bytes in row-major order, for GPU upload.
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.texels)
    }
}

//! Shell geometry expansion — replicates a base surface into offset layers
//!
//! Shell texturing draws fur as a stack of concentric copies of the base
//! mesh, each pushed out along the vertex normals. The expansion happens
//! once at setup: every layer copies the base vertices verbatim except
//! for the offset position and a normalized layer tag the fragment stage
//! compares against the fur density texture.

use bytemuck::{Pod, Zeroable};
use glam::{Vec2, Vec3};

use crate::core::error::Error;

/// A vertex of the base surface, supplied by the driver.
///
/// Immutable once defined; triangles are implied by vertex order
/// (three consecutive vertices per triangle).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SurfaceVertex {
    /// Position in model space
    pub position: Vec3,
    /// Surface normal (expansion direction; expected normalized)
    pub normal: Vec3,
    /// Texture coordinate
    pub uv: Vec2,
}

/// One vertex of the expanded shell stack (GPU vertex buffer layout)
///
/// 36 bytes, tightly packed. `layer` is the normalized layer fraction in
/// [0, 1]; layer 0 is the base surface, layer 1 the outermost shell.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub struct ShellVertex {
    /// Offset position: base position + base normal * layer height
    pub position: [f32; 3],
    /// Base surface normal, copied unchanged
    pub normal: [f32; 3],
    /// Base texture coordinate, copied unchanged
    pub uv: [f32; 2],
    /// Normalized layer fraction in [0, 1]
    pub layer: f32,
}

/// Expand a base surface into `layer_count` concentric shells.
///
/// The output is grouped by layer (all of layer 0 first, then layer 1,
/// ...), each layer preserving the base surface's vertex order and
/// winding. Layer 0 carries no offset; the outermost layer sits exactly
/// `max_shell_height` along the normal.
///
/// A single layer is a degenerate case: its fraction is defined as 0,
/// so the output is the base surface itself.
pub fn expand_shells(
    base: &[SurfaceVertex],
    layer_count: u32,
    max_shell_height: f32,
) -> Result<Vec<ShellVertex>, Error> {
    if layer_count == 0 {
        return Err(Error::InvalidParameter(
            "layer count must be at least 1".into(),
        ));
    }
    if !max_shell_height.is_finite() || max_shell_height < 0.0 {
        return Err(Error::InvalidParameter(format!(
            "max shell height must be finite and non-negative, got {max_shell_height}"
        )));
    }

    let mut shells = Vec::with_capacity(base.len() * layer_count as usize);
    for layer_index in 0..layer_count {
        let layer_fraction = if layer_count == 1 {
            0.0
        } else {
            layer_index as f32 / (layer_count - 1) as f32
        };
        let offset = layer_fraction * max_shell_height;

        for v in base {
            let position = v.position + v.normal * offset;
            shells.push(ShellVertex {
                position: position.to_array(),
                normal: v.normal.to_array(),
                uv: v.uv.to_array(),
                layer: layer_fraction,
            });
        }
    }

    log::debug!(
        "expanded {} base vertices into {} shell vertices ({} layers)",
        base.len(),
        shells.len(),
        layer_count
    );
    Ok(shells)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quad() -> Vec<SurfaceVertex> {
        // Two triangles of a unit quad in the XZ plane, normals up
        let corners = [
            ([0.0, 0.0, 0.0], [0.0, 0.0]),
            ([1.0, 0.0, 0.0], [1.0, 0.0]),
            ([1.0, 0.0, 1.0], [1.0, 1.0]),
            ([0.0, 0.0, 0.0], [0.0, 0.0]),
            ([1.0, 0.0, 1.0], [1.0, 1.0]),
            ([0.0, 0.0, 1.0], [0.0, 1.0]),
        ];
        corners
            .iter()
            .map(|&(p, uv)| SurfaceVertex {
                position: Vec3::from_array(p),
                normal: Vec3::Y,
                uv: Vec2::from_array(uv),
            })
            .collect()
    }

    #[test]
    fn test_layer_zero_is_base_surface() {
        let base = quad();
        let shells = expand_shells(&base, 8, 0.5).unwrap();
        for (v, s) in base.iter().zip(&shells) {
            assert_eq!(s.position, v.position.to_array());
            assert_eq!(s.normal, v.normal.to_array());
            assert_eq!(s.uv, v.uv.to_array());
            assert_eq!(s.layer, 0.0);
        }
    }

    #[test]
    fn test_outermost_layer_offset() {
        let base = quad();
        let height = 0.25;
        let shells = expand_shells(&base, 8, height).unwrap();
        let outer = &shells[base.len() * 7..];
        for (v, s) in base.iter().zip(outer) {
            let expected = v.position + v.normal * height;
            assert_eq!(s.position, expected.to_array());
            assert_eq!(s.layer, 1.0);
        }
    }

    #[test]
    fn test_vertex_count_and_winding() {
        let base = quad();
        let shells = expand_shells(&base, 5, 0.1).unwrap();
        assert_eq!(shells.len(), base.len() * 5);
        // Winding within each layer matches the base surface: the UV
        // sequence repeats per layer in the original order.
        for layer in 0..5 {
            let start = layer * base.len();
            for (v, s) in base.iter().zip(&shells[start..]) {
                assert_eq!(s.uv, v.uv.to_array());
            }
        }
    }

    #[test]
    fn test_single_layer_has_zero_fraction() {
        let base = quad();
        let shells = expand_shells(&base, 1, 10.0).unwrap();
        assert_eq!(shells.len(), base.len());
        for s in &shells {
            assert_eq!(s.layer, 0.0);
        }
    }

    #[test]
    fn test_layer_fractions_are_evenly_spaced() {
        let base = quad();
        let shells = expand_shells(&base, 4, 1.0).unwrap();
        let fractions: Vec<f32> = shells
            .chunks(base.len())
            .map(|layer| layer[0].layer)
            .collect();
        assert_eq!(fractions, vec![0.0, 1.0 / 3.0, 2.0 / 3.0, 1.0]);
    }

    #[test]
    fn test_zero_layers_rejected() {
        let base = quad();
        assert!(matches!(
            expand_shells(&base, 0, 0.5),
            Err(Error::InvalidParameter(_))
        ));
    }

    #[test]
    fn test_negative_height_rejected() {
        let base = quad();
        assert!(matches!(
            expand_shells(&base, 4, -1.0),
            Err(Error::InvalidParameter(_))
        ));
    }

    #[test]
    fn test_empty_base_surface() {
        let shells = expand_shells(&[], 4, 0.5).unwrap();
        assert!(shells.is_empty());
    }

    #[test]
    fn test_shell_vertex_is_tightly_packed() {
        assert_eq!(std::mem::size_of::<ShellVertex>(), 36);
    }
}

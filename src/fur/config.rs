//! Fur setup configuration

use serde::{Deserialize, Serialize};

use crate::core::error::Error;

/// Parameters for fur texture generation and shell expansion.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct FurConfig {
    /// Density texture width in texels.
    pub texture_width: u32,
    /// Density texture height in texels.
    pub texture_height: u32,
    /// Number of concentric shell layers.
    pub layer_count: u32,
    /// Areal fraction of texels carrying a hair strand, in [0, 1].
    pub density: f32,
    /// Distance of the outermost shell from the base surface.
    pub max_shell_height: f32,
    /// Seed for strand placement.
    pub seed: u64,
}

impl Default for FurConfig {
    fn default() -> Self {
        Self {
            texture_width: 256,
            texture_height: 256,
            layer_count: 30,
            density: 0.7,
            max_shell_height: 0.1,
            seed: 12345,
        }
    }
}

impl FurConfig {
    /// Check all parameters before any texture or geometry is built.
    pub fn validate(&self) -> Result<(), Error> {
        if self.texture_width == 0 || self.texture_height == 0 {
            return Err(Error::InvalidParameter(format!(
                "texture dimensions must be non-zero, got {}x{}",
                self.texture_width, self.texture_height
            )));
        }
        if self.layer_count == 0 {
            return Err(Error::InvalidParameter(
                "layer count must be at least 1".into(),
            ));
        }
        if !(0.0..=1.0).contains(&self.density) {
            return Err(Error::InvalidParameter(format!(
                "density must be in [0, 1], got {}",
                self.density
            )));
        }
        if !self.max_shell_height.is_finite() || self.max_shell_height < 0.0 {
            return Err(Error::InvalidParameter(format!(
                "max shell height must be finite and non-negative, got {}",
                self.max_shell_height
            )));
        }
        Ok(())
    }

    /// Load a configuration from a JSON file.
    pub fn from_json_file(path: &std::path::Path) -> Result<Self, Error> {
        let text = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&text)
            .map_err(|e| Error::InvalidParameter(format!("bad fur config: {e}")))?;
        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config_is_valid() {
        assert!(FurConfig::default().validate().is_ok());
    }

    #[test]
    fn test_bad_density_rejected() {
        let config = FurConfig {
            density: 2.0,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(Error::InvalidParameter(_))
        ));
    }

    #[test]
    fn test_json_round_trip_via_file() {
        let config = FurConfig {
            layer_count: 12,
            density: 0.4,
            ..Default::default()
        };
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(serde_json::to_string(&config).unwrap().as_bytes())
            .unwrap();

        let loaded = FurConfig::from_json_file(file.path()).unwrap();
        assert_eq!(loaded.layer_count, 12);
        assert_eq!(loaded.density, 0.4);
    }

    #[test]
    fn test_invalid_json_config_rejected() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"{\"layer_count\": 0").unwrap();
        assert!(FurConfig::from_json_file(file.path()).is_err());
    }
}

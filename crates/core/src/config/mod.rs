use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::{Result, StepGifError};

/// Largest width or height a GIF frame can describe.
pub const MAX_DIMENSION: u32 = u16::MAX as u32;

/// Top-level configuration structure for the animation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnimationConfig {
    pub width: u32,
    pub height: u32,
    /// Nominal interval between frames, in milliseconds.
    pub frame_delay_ms: u64,
    pub style: StyleConfig,
    pub output: OutputConfig,
}

impl Default for AnimationConfig {
    fn default() -> Self {
        Self {
            width: 500,
            height: 500,
            frame_delay_ms: 50,
            style: StyleConfig::default(),
            output: OutputConfig::default(),
        }
    }
}

impl AnimationConfig {
    /// Reads a JSON configuration file. Missing fields fall back to defaults.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let raw = std::fs::read_to_string(path.as_ref())?;
        let config: Self = serde_json::from_str(&raw)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.width == 0 || self.height == 0 {
            return Err(StepGifError::invalid_config(format!(
                "canvas must be non-empty, got {}x{}",
                self.width, self.height
            )));
        }
        if self.width > MAX_DIMENSION || self.height > MAX_DIMENSION {
            return Err(StepGifError::invalid_config(format!(
                "canvas {}x{} exceeds the GIF limit of {MAX_DIMENSION} pixels per side",
                self.width, self.height
            )));
        }
        if self.frame_delay_ms == 0 {
            return Err(StepGifError::invalid_config(
                "frame_delay_ms must be non-zero",
            ));
        }
        if u32::try_from(self.frame_delay_ms).is_err() {
            return Err(StepGifError::invalid_config(
                "frame_delay_ms does not fit a GIF frame delay",
            ));
        }
        if let Some(width) = self.style.line_width {
            if !(width.is_finite() && width > 0.0) {
                return Err(StepGifError::invalid_config(
                    "line_width must be a positive number",
                ));
            }
        }
        if !(1..=30).contains(&self.output.speed) {
            return Err(StepGifError::invalid_config(format!(
                "gif speed must be within 1..=30, got {}",
                self.output.speed
            )));
        }
        Ok(())
    }

    /// Stroke width in pixels, derived from the canvas when not set explicitly.
    pub fn line_width(&self) -> f64 {
        self.style
            .line_width
            .unwrap_or_else(|| f64::from(self.width.min(self.height)) / 60.0)
    }
}

/// Colours and stroke settings, RGBA with straight alpha.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StyleConfig {
    pub background: [u8; 4],
    pub stroke: [u8; 4],
    pub line_width: Option<f64>,
}

impl Default for StyleConfig {
    fn default() -> Self {
        Self {
            background: [0xBD, 0xBD, 0xBD, 0xFF],
            stroke: [0x19, 0x76, 0xD2, 0xFF],
            line_width: None,
        }
    }
}

/// Settings for the exported animation file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub path: PathBuf,
    /// Loop the GIF forever instead of playing it once.
    pub repeat: bool,
    /// Quantizer speed passed to the GIF encoder, 1 (best) to 30 (fastest).
    pub speed: i32,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("linked-percentile-step.gif"),
            repeat: true,
            speed: 10,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = AnimationConfig::default();
        assert!(config.validate().is_ok());
        assert!((config.line_width() - 500.0 / 60.0).abs() < 1e-9);
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let config: AnimationConfig =
            serde_json::from_str(r#"{ "width": 300, "style": { "line_width": 4.0 } }"#).unwrap();

        assert_eq!(config.width, 300);
        assert_eq!(config.height, 500);
        assert_eq!(config.frame_delay_ms, 50);
        assert_eq!(config.line_width(), 4.0);
        assert_eq!(config.style.stroke, StyleConfig::default().stroke);
    }

    #[test]
    fn rejects_empty_canvas() {
        let config = AnimationConfig {
            height: 0,
            ..Default::default()
        };
        let err = config.validate().unwrap_err();
        assert!(matches!(err, StepGifError::InvalidConfig(_)));
    }

    #[test]
    fn rejects_oversized_canvas() {
        let config = AnimationConfig {
            width: u32::MAX,
            height: u32::MAX,
            ..Default::default()
        };
        let err = config.validate().unwrap_err();
        assert!(matches!(err, StepGifError::InvalidConfig(_)));

        let widest = AnimationConfig {
            width: MAX_DIMENSION,
            height: 2,
            ..Default::default()
        };
        assert!(widest.validate().is_ok());
        let too_wide = AnimationConfig {
            width: MAX_DIMENSION + 1,
            ..widest
        };
        assert!(too_wide.validate().is_err());
    }

    #[test]
    fn rejects_out_of_range_speed() {
        let mut config = AnimationConfig::default();
        config.output.speed = 31;
        assert!(config.validate().is_err());
    }

    #[test]
    fn load_reports_parse_errors() {
        let path = std::env::temp_dir().join(format!(
            "linked-step-config-{}.json",
            std::process::id()
        ));
        std::fs::write(&path, "{ not json").unwrap();

        let err = AnimationConfig::load(&path).unwrap_err();
        let _ = std::fs::remove_file(&path);
        assert!(matches!(err, StepGifError::Config(_)));
    }
}

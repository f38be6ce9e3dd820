use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{Result, SpriteSheetError};

/// Pixel layout of the output canvas. Frames are converted into this mode before they are written.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum ColorMode {
    /// 8-bit luminance.
    L8,
    /// 8-bit luminance + alpha.
    La8,
    Rgb8,
    #[default]
    Rgba8,
    L16,
    La16,
    Rgb16,
    Rgba16,
    Rgb32F,
    Rgba32F,
}

impl ColorMode {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::L8 => "l8",
            Self::La8 => "la8",
            Self::Rgb8 => "rgb8",
            Self::Rgba8 => "rgba8",
            Self::L16 => "l16",
            Self::La16 => "la16",
            Self::Rgb16 => "rgb16",
            Self::Rgba16 => "rgba16",
            Self::Rgb32F => "rgb32f",
            Self::Rgba32F => "rgba32f",
        }
    }
}

impl fmt::Display for ColorMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ColorMode {
    type Err = ();
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        // bare names follow the usual imaging-library spelling (L, LA, RGB, RGBA)
        match s.to_ascii_lowercase().as_str() {
            "l" | "l8" | "luma8" => Ok(Self::L8),
            "la" | "la8" | "lumaa8" => Ok(Self::La8),
            "rgb" | "rgb8" => Ok(Self::Rgb8),
            "rgba" | "rgba8" => Ok(Self::Rgba8),
            "l16" | "luma16" => Ok(Self::L16),
            "la16" | "lumaa16" => Ok(Self::La16),
            "rgb16" => Ok(Self::Rgb16),
            "rgba16" => Ok(Self::Rgba16),
            "rgb32f" => Ok(Self::Rgb32F),
            "rgba32f" => Ok(Self::Rgba32F),
            _ => Err(()),
        }
    }
}

/// Which of the input paths end up on the sheet for a given `step`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum FrameSelection {
    /// First path, then `paths[step], paths[2*step], ...`.
    ///
    /// With `step > 1` this drops the frames between the first one and `paths[step]`;
    /// kept as the default so existing sheets keep their frame lists.
    #[default]
    Compat,
    /// `paths[0], paths[step], paths[2*step], ...`.
    Stride,
}

impl FromStr for FrameSelection {
    type Err = ();
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "compat" | "legacy" => Ok(Self::Compat),
            "stride" => Ok(Self::Stride),
            _ => Err(()),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PackerConfig {
    /// Number of columns before the grid wraps to a new row.
    #[serde(default = "default_max_columns")]
    pub max_columns: u32,
    /// Frame selection stride (see [`FrameSelection`]).
    #[serde(default = "default_step")]
    pub step: usize,
    /// Output canvas color mode.
    #[serde(default)]
    pub color_mode: ColorMode,
    #[serde(default)]
    pub selection: FrameSelection,
    /// Decode frames on the rayon pool when feature "parallel" is on.
    #[serde(default = "default_parallel")]
    pub parallel: bool,
}

impl Default for PackerConfig {
    fn default() -> Self {
        Self {
            max_columns: default_max_columns(),
            step: default_step(),
            color_mode: ColorMode::default(),
            selection: FrameSelection::default(),
            parallel: default_parallel(),
        }
    }
}

impl PackerConfig {
    /// Validates the configuration parameters.
    ///
    /// Returns an error if `step` or `max_columns` is zero.
    pub fn validate(&self) -> Result<()> {
        if self.step == 0 {
            return Err(SpriteSheetError::InvalidInput("invalid step".into()));
        }
        if self.max_columns == 0 {
            return Err(SpriteSheetError::InvalidInput(
                "max_columns must be at least 1".into(),
            ));
        }
        Ok(())
    }

    /// Create a fluent builder for `PackerConfig`.
    pub fn builder() -> PackerConfigBuilder {
        PackerConfigBuilder::new()
    }
}

fn default_max_columns() -> u32 {
    10
}
fn default_step() -> usize {
    1
}
fn default_parallel() -> bool {
    false
}

/// Builder for `PackerConfig` for ergonomic construction.
#[derive(Debug, Default, Clone)]
pub struct PackerConfigBuilder {
    cfg: PackerConfig,
}

impl PackerConfigBuilder {
    pub fn new() -> Self {
        Self {
            cfg: PackerConfig::default(),
        }
    }
    pub fn max_columns(mut self, v: u32) -> Self {
        self.cfg.max_columns = v;
        self
    }
    pub fn step(mut self, v: usize) -> Self {
        self.cfg.step = v;
        self
    }
    pub fn color_mode(mut self, v: ColorMode) -> Self {
        self.cfg.color_mode = v;
        self
    }
    pub fn selection(mut self, v: FrameSelection) -> Self {
        self.cfg.selection = v;
        self
    }
    pub fn parallel(mut self, v: bool) -> Self {
        self.cfg.parallel = v;
        self
    }
    pub fn build(self) -> PackerConfig {
        self.cfg
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn color_mode_accepts_short_names() {
        assert_eq!("RGBA".parse::<ColorMode>(), Ok(ColorMode::Rgba8));
        assert_eq!("rgb".parse::<ColorMode>(), Ok(ColorMode::Rgb8));
        assert_eq!("L".parse::<ColorMode>(), Ok(ColorMode::L8));
        assert_eq!("la16".parse::<ColorMode>(), Ok(ColorMode::La16));
        assert_eq!("cmyk".parse::<ColorMode>(), Err(()));
    }

    #[test]
    fn serde_defaults_fill_missing_fields() {
        let cfg: PackerConfig = serde_json::from_str(r#"{"max_columns": 4}"#).expect("parse");
        assert_eq!(cfg.max_columns, 4);
        assert_eq!(cfg.step, 1);
        assert_eq!(cfg.color_mode, ColorMode::Rgba8);
        assert_eq!(cfg.selection, FrameSelection::Compat);
    }

    #[test]
    fn validate_rejects_zero_step_and_columns() {
        assert!(PackerConfig::builder().step(0).build().validate().is_err());
        assert!(PackerConfig::builder().max_columns(0).build().validate().is_err());
        assert!(PackerConfig::default().validate().is_ok());
    }
}

//! Configuration types for PDF black-and-white / grayscale conversion.
//!
//! All conversion behaviour is controlled through [`ConversionConfig`], built
//! via its [`ConversionConfigBuilder`]. Keeping every knob in one struct makes
//! it trivial to share a config across all jobs of a batch, serialise it for
//! logging, and diff two runs to understand why their outputs differ.
//!
//! # Design choice: builder over constructor
//! A ten-field constructor is unreadable and breaks on every new field. The
//! builder lets callers set only what they care about and rely on documented
//! defaults for the rest; `build()` enforces the invariants once, so the
//! pipeline can treat the config as pre-validated.

use crate::error::PdfMonoError;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Output colour treatment for each rendered page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ColorMode {
    /// Pure bi-level output: every pixel strictly black or white, no
    /// dithering. Stored as a lossless 1-bit stream. (default)
    #[default]
    BlackWhite,
    /// 8-bit grayscale, JPEG-compressed at [`ConversionConfig::jpeg_quality`].
    Grayscale,
}

/// What to do when the resolved output path already exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum OverwritePolicy {
    /// Defer to the caller's
    /// [`confirm_overwrite`](crate::progress::BatchProgressCallback::confirm_overwrite)
    /// callback. The default implementation declines, so `Ask` behaves like
    /// `Skip` unless a callback is supplied. (default)
    #[default]
    Ask,
    /// Replace the existing file.
    Overwrite,
    /// Skip the job entirely; it ends as `Skipped` without rendering.
    Skip,
}

/// Configuration shared by every job in a batch.
///
/// Built via [`ConversionConfig::builder()`] or [`ConversionConfig::default()`].
///
/// # Example
/// ```rust
/// use pdfmono::{ColorMode, ConversionConfig};
///
/// let config = ConversionConfig::builder()
///     .mode(ColorMode::Grayscale)
///     .jpeg_quality(85)
///     .dpi(200)
///     .page_range("1-5,8")
///     .build()
///     .unwrap();
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversionConfig {
    /// Colour treatment. Default: [`ColorMode::BlackWhite`].
    pub mode: ColorMode,

    /// Global intensity threshold for black-and-white mode. Default: 180.
    ///
    /// Pixels with luma below the threshold become black, the rest white.
    /// Lower values produce lighter output (less ink); 180 keeps typical
    /// scanned text solid without filling in paper texture. Ignored in
    /// grayscale mode.
    pub threshold: u8,

    /// JPEG quality for grayscale mode, 1–100. Default: 95.
    ///
    /// Higher is larger and more faithful. Ignored in black-and-white mode,
    /// where the output is lossless.
    pub jpeg_quality: u8,

    /// Rendering DPI used when rasterising each page. Default: 300.
    ///
    /// The scale factor relative to the page's native point size is
    /// `dpi / 72`. 300 DPI keeps small print legible in bi-level output;
    /// drop to 150 when file size matters more than crispness.
    pub dpi: u32,

    /// Page-range expression, e.g. `"1-5,8,10-12"`. Default: `""` (all pages).
    ///
    /// `""` and `"all"` select every page. Parsed once per job against the
    /// document's actual page count; see [`crate::pipeline::range`].
    pub page_range: String,

    /// Suffix appended to the input file stem. Default: `"_SW"`.
    pub output_suffix: String,

    /// Append a `_YYYYMMDD_HHMMSS` timestamp after the suffix. Default: false.
    pub add_timestamp: bool,

    /// Directory for output files. `None` writes next to each input.
    pub output_dir: Option<PathBuf>,

    /// Behaviour when the output path already exists. Default: Ask.
    pub overwrite: OverwritePolicy,
}

impl Default for ConversionConfig {
    fn default() -> Self {
        Self {
            mode: ColorMode::BlackWhite,
            threshold: 180,
            jpeg_quality: 95,
            dpi: 300,
            page_range: String::new(),
            output_suffix: "_SW".to_string(),
            add_timestamp: false,
            output_dir: None,
            overwrite: OverwritePolicy::Ask,
        }
    }
}

impl ConversionConfig {
    /// Create a new builder for `ConversionConfig`.
    pub fn builder() -> ConversionConfigBuilder {
        ConversionConfigBuilder {
            config: Self::default(),
        }
    }

    /// Re-check the invariants `build()` enforces.
    ///
    /// The batch controller calls this pre-flight so a hand-constructed or
    /// deserialised config is rejected before any job starts.
    pub fn validate(&self) -> Result<(), PdfMonoError> {
        if self.dpi == 0 {
            return Err(PdfMonoError::InvalidConfig("DPI must be > 0".into()));
        }
        if self.jpeg_quality < 1 || self.jpeg_quality > 100 {
            return Err(PdfMonoError::InvalidConfig(format!(
                "JPEG quality must be 1–100, got {}",
                self.jpeg_quality
            )));
        }
        Ok(())
    }
}

/// Builder for [`ConversionConfig`].
#[derive(Debug)]
pub struct ConversionConfigBuilder {
    config: ConversionConfig,
}

impl ConversionConfigBuilder {
    pub fn mode(mut self, mode: ColorMode) -> Self {
        self.config.mode = mode;
        self
    }

    pub fn threshold(mut self, threshold: u8) -> Self {
        self.config.threshold = threshold;
        self
    }

    pub fn jpeg_quality(mut self, quality: u8) -> Self {
        self.config.jpeg_quality = quality.clamp(1, 100);
        self
    }

    pub fn dpi(mut self, dpi: u32) -> Self {
        self.config.dpi = dpi.max(1);
        self
    }

    pub fn page_range(mut self, expr: impl Into<String>) -> Self {
        self.config.page_range = expr.into();
        self
    }

    pub fn output_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.config.output_suffix = suffix.into();
        self
    }

    pub fn add_timestamp(mut self, v: bool) -> Self {
        self.config.add_timestamp = v;
        self
    }

    pub fn output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.output_dir = Some(dir.into());
        self
    }

    pub fn overwrite(mut self, policy: OverwritePolicy) -> Self {
        self.config.overwrite = policy;
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<ConversionConfig, PdfMonoError> {
        self.config.validate()?;
        Ok(self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert!(ConversionConfig::default().validate().is_ok());
    }

    #[test]
    fn builder_clamps_quality_and_dpi() {
        let config = ConversionConfig::builder()
            .jpeg_quality(0)
            .dpi(0)
            .build()
            .unwrap();
        assert_eq!(config.jpeg_quality, 1);
        assert_eq!(config.dpi, 1);
    }

    #[test]
    fn validate_rejects_zero_dpi() {
        let config = ConversionConfig {
            dpi: 0,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(PdfMonoError::InvalidConfig(_))
        ));
    }

    #[test]
    fn validate_rejects_out_of_range_quality() {
        let config = ConversionConfig {
            jpeg_quality: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn config_round_trips_through_json() {
        let config = ConversionConfig::builder()
            .mode(ColorMode::Grayscale)
            .threshold(128)
            .output_suffix("_gray")
            .build()
            .unwrap();
        let json = serde_json::to_string(&config).unwrap();
        let back: ConversionConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back.mode, ColorMode::Grayscale);
        assert_eq!(back.threshold, 128);
        assert_eq!(back.output_suffix, "_gray");
    }
}

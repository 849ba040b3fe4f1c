//! Processing options and the optional style file.
//!
//! Two layers of configuration feed the pipeline:
//!
//! - [`ProcessingConfig`]: the per-run choices made on the command line
//!   (size preset, screenshot type, padding, DPI, border, output format).
//! - [`StyleConfig`]: colours and encoder settings, loaded from an optional
//!   `standardizer.toml` and merged over stock defaults.
//!
//! ## Style File
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! [colors]
//! background = "#ffffff"      # Padding fill for default screenshots
//! viz_background = "#ffffff"  # Padding fill and frame mat for viz screenshots
//! border = "#e0e0e0"          # Border rule colour
//!
//! [border]
//! width = 2                   # Border rule width in pixels (1-64)
//!
//! [encoding]
//! jpeg_quality = 95           # 1-100
//! png_compression = "fast"    # fast | default | best
//! ```
//!
//! Style files are sparse: only the keys you want to change are needed.
//! Unknown keys are rejected to catch typos early.

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::Path;
use thiserror::Error;

/// File name looked up in the working directory when `--config` is not given.
pub const CONFIG_FILE_NAME: &str = "standardizer.toml";

/// Highest DPI representable in every stamped format (JFIF density is a u16).
pub const MAX_DPI: u32 = u16::MAX as u32;

pub const DEFAULT_DPI: u32 = 144;

/// Largest padding accepted per side, in pixels.
pub const MAX_PADDING: u32 = 2048;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

// ============================================================================
// Command-line value types
// ============================================================================

/// One of the three fixed target widths.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum SizePreset {
    /// 1024px wide
    #[value(alias = "1024")]
    Small,
    /// 1440px wide
    #[default]
    #[value(alias = "1440")]
    Medium,
    /// 1920px wide
    #[value(alias = "1920")]
    Large,
}

impl SizePreset {
    pub const ALL: [SizePreset; 3] = [SizePreset::Small, SizePreset::Medium, SizePreset::Large];

    pub fn width(self) -> u32 {
        match self {
            SizePreset::Small => 1024,
            SizePreset::Medium => 1440,
            SizePreset::Large => 1920,
        }
    }

    /// Name used in output file names (`login_medium.png`).
    pub fn name(self) -> &'static str {
        match self {
            SizePreset::Small => "small",
            SizePreset::Medium => "medium",
            SizePreset::Large => "large",
        }
    }
}

impl fmt::Display for SizePreset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}px width)", self.name(), self.width())
    }
}

/// How a screenshot is treated by the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum ScreenshotType {
    /// Plain UI screenshot: standard resampling, single border rule
    #[default]
    #[value(name = "default")]
    Standard,
    /// Data visualization: high-quality resampling, contrast/sharpening, framed border
    Viz,
}

/// Encoded output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Png,
    #[value(name = "jpg", alias = "jpeg")]
    Jpeg,
    Webp,
}

impl OutputFormat {
    /// File extension written for this format.
    pub fn extension(self) -> &'static str {
        match self {
            OutputFormat::Png => "png",
            OutputFormat::Jpeg => "jpg",
            OutputFormat::Webp => "webp",
        }
    }

    pub fn supports_alpha(self) -> bool {
        !matches!(self, OutputFormat::Jpeg)
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

// ============================================================================
// ProcessingConfig
// ============================================================================

/// Resolved per-run processing options. Immutable once validated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessingConfig {
    pub size: SizePreset,
    pub kind: ScreenshotType,
    /// Padding added on every side, in pixels.
    pub padding: u32,
    pub dpi: u32,
    pub border: bool,
    pub format: OutputFormat,
}

impl Default for ProcessingConfig {
    fn default() -> Self {
        Self {
            size: SizePreset::default(),
            kind: ScreenshotType::default(),
            padding: 0,
            dpi: DEFAULT_DPI,
            border: true,
            format: OutputFormat::default(),
        }
    }
}

impl ProcessingConfig {
    pub fn target_width(&self) -> u32 {
        self.size.width()
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.dpi == 0 || self.dpi > MAX_DPI {
            return Err(ConfigError::Validation(format!(
                "dpi must be between 1 and {MAX_DPI}, got {}",
                self.dpi
            )));
        }
        if self.padding > MAX_PADDING {
            return Err(ConfigError::Validation(format!(
                "padding must be at most {MAX_PADDING} pixels, got {}",
                self.padding
            )));
        }
        Ok(())
    }
}

// ============================================================================
// StyleConfig
// ============================================================================

/// Colours and encoder settings loaded from `standardizer.toml`.
///
/// All fields have defaults matching the stock look; user files override
/// only what they name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default, deny_unknown_fields)]
pub struct StyleConfig {
    pub colors: ColorConfig,
    pub border: BorderConfig,
    pub encoding: EncodingConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ColorConfig {
    /// Padding fill for default screenshots.
    pub background: String,
    /// Padding fill and frame mat for viz screenshots.
    pub viz_background: String,
    pub border: String,
}

impl Default for ColorConfig {
    fn default() -> Self {
        Self {
            background: "#ffffff".to_string(),
            viz_background: "#ffffff".to_string(),
            border: "#e0e0e0".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BorderConfig {
    /// Width of the border rule in pixels.
    pub width: u32,
}

impl Default for BorderConfig {
    fn default() -> Self {
        Self { width: 2 }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EncodingConfig {
    pub jpeg_quality: u32,
    pub png_compression: PngCompression,
}

impl Default for EncodingConfig {
    fn default() -> Self {
        Self {
            jpeg_quality: 95,
            png_compression: PngCompression::default(),
        }
    }
}

/// Deflate effort for PNG output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PngCompression {
    #[default]
    Fast,
    Default,
    Best,
}

/// Colours of a style file, parsed to RGB.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    pub background: [u8; 3],
    pub viz_background: [u8; 3],
    pub border: [u8; 3],
}

impl StyleConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.palette()?;
        if !(1..=64).contains(&self.border.width) {
            return Err(ConfigError::Validation(
                "border.width must be 1-64".into(),
            ));
        }
        if !(1..=100).contains(&self.encoding.jpeg_quality) {
            return Err(ConfigError::Validation(
                "encoding.jpeg_quality must be 1-100".into(),
            ));
        }
        Ok(())
    }

    pub fn palette(&self) -> Result<Palette, ConfigError> {
        Ok(Palette {
            background: parse_hex_color("colors.background", &self.colors.background)?,
            viz_background: parse_hex_color(
                "colors.viz_background",
                &self.colors.viz_background,
            )?,
            border: parse_hex_color("colors.border", &self.colors.border)?,
        })
    }
}

/// Parse `#rrggbb` or `#rgb`.
fn parse_hex_color(key: &str, value: &str) -> Result<[u8; 3], ConfigError> {
    let invalid =
        || ConfigError::Validation(format!("{key} must be a #rrggbb or #rgb colour, got '{value}'"));
    let hex = value.strip_prefix('#').ok_or_else(invalid)?;
    if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(invalid());
    }
    let channel = |s: &str| u8::from_str_radix(s, 16).map_err(|_| invalid());
    match hex.len() {
        6 => Ok([
            channel(&hex[0..2])?,
            channel(&hex[2..4])?,
            channel(&hex[4..6])?,
        ]),
        3 => {
            let mut rgb = [0u8; 3];
            for (i, c) in hex.chars().enumerate() {
                let v = channel(&c.to_string())?;
                rgb[i] = v * 17;
            }
            Ok(rgb)
        }
        _ => Err(invalid()),
    }
}

// ============================================================================
// Loading
// ============================================================================

/// Returns the stock style as a `toml::Value::Table`.
pub fn stock_defaults_value() -> toml::Value {
    toml::Value::try_from(StyleConfig::default()).expect("default style must serialize")
}

/// Deep-merge two TOML values. Tables merge key by key; anything else in
/// `overlay` replaces `base`.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Read a style file as a raw TOML value.
pub fn load_raw_config(path: &Path) -> Result<toml::Value, ConfigError> {
    let content = fs::read_to_string(path)?;
    Ok(toml::from_str(&content)?)
}

/// Merge an optional overlay over `base`, deserialize and validate.
pub fn resolve_config(
    base: toml::Value,
    overlay: Option<toml::Value>,
) -> Result<StyleConfig, ConfigError> {
    let merged = match overlay {
        Some(overlay) => merge_toml(base, overlay),
        None => base,
    };
    let config: StyleConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load the style for a run.
///
/// An explicit path must exist. Without one, `standardizer.toml` in
/// `search_dir` is used when present, and stock defaults otherwise.
pub fn load_style(explicit: Option<&Path>, search_dir: &Path) -> Result<StyleConfig, ConfigError> {
    let overlay = match explicit {
        Some(path) => Some(load_raw_config(path)?),
        None => {
            let candidate = search_dir.join(CONFIG_FILE_NAME);
            if candidate.is_file() {
                Some(load_raw_config(&candidate)?)
            } else {
                None
            }
        }
    };
    resolve_config(stock_defaults_value(), overlay)
}

//! Generation options (`options.json`).
//!
//! Every key is optional; missing keys take the defaults below and unknown
//! keys are ignored. Values outside their range are rejected by
//! [`GenerationOptions::validate`].
//!
//! ```json
//! {
//!   "outputs": 2,              // images per prompt, >= 1
//!   "steps": 50,               // inference steps, >= 1
//!   "guidance": 7.5,           // guidance scale, >= 1.0
//!   "width": 512,              // 64..=1024
//!   "height": 512,             // 64..=1024
//!   "mode": "gpu",             // "cpu" | "gpu"
//!   "turbo": true,
//!   "fullPrecision": false,
//!   "upscale": "RealESRGAN_x4plus", // false | "RealESRGAN_x4plus" | "RealESRGAN_x4plus_anime_6B"
//!   "faceCorrection": false,   // false | "GFPGANv1.3"
//!   "seed": 42,
//!   "timeout": 120000,         // per-request timeout in ms, >= 1000
//!   "promptStrength": 0.8,     // 0..=1, used with an initial image
//!   "initialImagePath": null
//! }
//! ```
//!
//! For `upscale` and `faceCorrection`, `true` selects the default model.

use serde::{Deserialize, Deserializer};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum OptionsError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Options validation error: {0}")]
    Validation(String),
}

/// Where the backend should run inference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    Cpu,
    #[default]
    Gpu,
}

/// Upscaling model applied by the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
pub enum Upscaler {
    #[default]
    #[serde(rename = "RealESRGAN_x4plus")]
    RealEsrganX4Plus,
    #[serde(rename = "RealESRGAN_x4plus_anime_6B")]
    RealEsrganX4PlusAnime6B,
}

impl Upscaler {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::RealEsrganX4Plus => "RealESRGAN_x4plus",
            Self::RealEsrganX4PlusAnime6B => "RealESRGAN_x4plus_anime_6B",
        }
    }
}

/// Face correction model applied by the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
pub enum FaceCorrector {
    #[default]
    #[serde(rename = "GFPGANv1.3")]
    Gfpgan13,
}

impl FaceCorrector {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Gfpgan13 => "GFPGANv1.3",
        }
    }
}

/// Validated options for a single generation request.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GenerationOptions {
    /// Number of images to generate per prompt.
    pub outputs: u32,
    /// Inference steps.
    pub steps: u32,
    /// Guidance scale of the prompt.
    pub guidance: f64,
    pub width: u32,
    pub height: u32,
    pub turbo: bool,
    pub mode: Mode,
    /// Required by some GPU models (GTX 1650/1660).
    pub full_precision: bool,
    #[serde(deserialize_with = "false_or")]
    pub upscale: Option<Upscaler>,
    #[serde(deserialize_with = "false_or")]
    pub face_correction: Option<FaceCorrector>,
    pub seed: u64,
    /// Per-request timeout for the backend, in milliseconds.
    #[serde(rename = "timeout")]
    pub timeout_ms: u64,
    /// Image used as the starting point of the generation.
    pub initial_image_path: Option<PathBuf>,
    /// Weight of the prompt against the initial image (0..=1).
    pub prompt_strength: f64,
}

impl Default for GenerationOptions {
    fn default() -> Self {
        Self {
            outputs: 2,
            steps: 50,
            guidance: 7.5,
            width: 512,
            height: 512,
            turbo: true,
            mode: Mode::Gpu,
            full_precision: false,
            upscale: Some(Upscaler::RealEsrganX4Plus),
            face_correction: None,
            seed: 42,
            timeout_ms: 120_000,
            initial_image_path: None,
            prompt_strength: 0.8,
        }
    }
}

impl GenerationOptions {
    /// Check every value against its allowed range.
    pub fn validate(&self) -> Result<(), OptionsError> {
        if self.outputs < 1 {
            return Err(OptionsError::Validation("outputs must be at least 1".into()));
        }
        if self.steps < 1 {
            return Err(OptionsError::Validation("steps must be at least 1".into()));
        }
        if self.guidance.is_nan() || self.guidance < 1.0 {
            return Err(OptionsError::Validation(
                "guidance must be at least 1.0".into(),
            ));
        }
        for (name, value) in [("width", self.width), ("height", self.height)] {
            if !(64..=1024).contains(&value) {
                return Err(OptionsError::Validation(format!(
                    "{name} must be 64-1024, got {value}"
                )));
            }
        }
        if self.timeout_ms < 1000 {
            return Err(OptionsError::Validation(
                "timeout must be at least 1000 ms".into(),
            ));
        }
        if !(0.0..=1.0).contains(&self.prompt_strength) {
            return Err(OptionsError::Validation(
                "promptStrength must be 0-1".into(),
            ));
        }
        Ok(())
    }

    /// Copy of these options that starts from `path` as initial image.
    pub fn with_initial_image(&self, path: impl Into<PathBuf>) -> Self {
        Self {
            initial_image_path: Some(path.into()),
            ..self.clone()
        }
    }
}

/// Parse and validate options from a JSON string.
pub fn parse_options(json: &str) -> Result<GenerationOptions, OptionsError> {
    let options: GenerationOptions = serde_json::from_str(json)?;
    options.validate()?;
    Ok(options)
}

/// Load and validate `options.json`.
pub fn load_options(path: &Path) -> Result<GenerationOptions, OptionsError> {
    let content = fs::read_to_string(path)?;
    parse_options(&content)
}

/// Accepts `false` (off), `true` (default model) or a model name.
fn false_or<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum FalseOr<T> {
        Flag(bool),
        Value(T),
    }

    Ok(match Option::<FalseOr<T>>::deserialize(deserializer)? {
        None | Some(FalseOr::Flag(false)) => None,
        Some(FalseOr::Flag(true)) => Some(T::default()),
        Some(FalseOr::Value(v)) => Some(v),
    })
}

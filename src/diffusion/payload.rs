//! Request and response bodies of the Stable Diffusion UI server.
//!
//! ```text
//! POST /image
//! { "prompt": "Cat, red", "num_outputs": 2, "num_inference_steps": 50,
//!   "guidance_scale": 7.5, "width": 512, "height": 512, "turbo": true,
//!   "use_cpu": false, "use_full_precision": false,
//!   "show_only_filtered_image": false, "seed": 42,
//!   "use_upscale": "RealESRGAN_x4plus",
//!   "init_image": "data:image/png;base64,...", "prompt_strength": 0.8 }
//!
//! 200 OK
//! { "status": "succeeded",
//!   "output": [ { "data": "data:image/png;base64,...", "seed": 42 } ] }
//! ```
//!
//! Images travel as base64 data URLs in both directions.

use super::backend::{BackendError, ImageBytes};
use crate::options::{GenerationOptions, Mode};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::{Deserialize, Serialize};
use std::path::Path;

const PNG_DATA_URL_PREFIX: &str = "data:image/png;base64,";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImageRequest {
    pub prompt: String,
    pub num_outputs: u32,
    pub num_inference_steps: u32,
    pub guidance_scale: f64,
    pub width: u32,
    pub height: u32,
    pub turbo: bool,
    pub use_cpu: bool,
    pub use_full_precision: bool,
    pub show_only_filtered_image: bool,
    pub seed: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub use_face_correction: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub use_upscale: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub init_image: Option<String>,
    pub prompt_strength: f64,
}

impl ImageRequest {
    /// Build the request body, loading the initial image from disk if set.
    pub fn build(prompt: &str, options: &GenerationOptions) -> Result<Self, BackendError> {
        let init_image = match &options.initial_image_path {
            Some(path) => Some(load_data_url(path)?),
            None => None,
        };
        Ok(Self {
            prompt: prompt.to_string(),
            num_outputs: options.outputs.max(1),
            num_inference_steps: options.steps.max(1),
            guidance_scale: options.guidance.max(1.0),
            width: options.width,
            height: options.height,
            turbo: options.turbo,
            use_cpu: options.mode == Mode::Cpu,
            use_full_precision: options.full_precision,
            show_only_filtered_image: options.face_correction.is_some(),
            seed: options.seed,
            use_face_correction: options.face_correction.map(|f| f.as_str()),
            use_upscale: options.upscale.map(|u| u.as_str()),
            init_image,
            prompt_strength: options.prompt_strength,
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct ImageResponse {
    #[serde(default)]
    pub status: Option<String>,
    pub output: Vec<ImageOutput>,
}

#[derive(Debug, Deserialize)]
pub struct ImageOutput {
    pub data: String,
    #[serde(default)]
    pub seed: Option<u64>,
}

impl ImageResponse {
    /// Decode every returned image, in order.
    pub fn into_images(self) -> Result<Vec<ImageBytes>, BackendError> {
        self.output
            .iter()
            .map(|out| decode_data_url(&out.data))
            .collect()
    }
}

/// Encode raw PNG bytes as a data URL.
fn encode_data_url(bytes: &[u8]) -> String {
    format!("{}{}", PNG_DATA_URL_PREFIX, STANDARD.encode(bytes))
}

/// Decode a `data:image/png;base64,` URL; any other media type is rejected.
fn decode_data_url(data: &str) -> Result<ImageBytes, BackendError> {
    let encoded = data
        .strip_prefix(PNG_DATA_URL_PREFIX)
        .ok_or(BackendError::UnsupportedImageData)?;
    Ok(STANDARD.decode(encoded)?)
}

fn load_data_url(path: &Path) -> Result<String, BackendError> {
    let bytes = std::fs::read(path)?;
    Ok(encode_data_url(&bytes))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::{FaceCorrector, Upscaler};
    use tempfile::TempDir;

    #[test]
    fn defaults_map_to_payload_fields() {
        let request = ImageRequest::build("Cat, red", &GenerationOptions::default()).unwrap();
        assert_eq!(request.prompt, "Cat, red");
        assert_eq!(request.num_outputs, 2);
        assert_eq!(request.num_inference_steps, 50);
        assert_eq!(request.guidance_scale, 7.5);
        assert!(!request.use_cpu);
        assert!(!request.show_only_filtered_image);
        assert_eq!(request.use_upscale, Some("RealESRGAN_x4plus"));
        assert_eq!(request.use_face_correction, None);
        assert_eq!(request.init_image, None);
        assert_eq!(request.prompt_strength, 0.8);
    }

    #[test]
    fn cpu_mode_and_face_correction() {
        let options = GenerationOptions {
            mode: Mode::Cpu,
            face_correction: Some(FaceCorrector::Gfpgan13),
            upscale: None,
            ..Default::default()
        };
        let request = ImageRequest::build("p", &options).unwrap();
        assert!(request.use_cpu);
        assert!(request.show_only_filtered_image);
        assert_eq!(request.use_face_correction, Some("GFPGANv1.3"));
        assert_eq!(request.use_upscale, None);
    }

    #[test]
    fn counts_are_clamped_to_one() {
        let options = GenerationOptions {
            outputs: 0,
            steps: 0,
            ..Default::default()
        };
        let request = ImageRequest::build("p", &options).unwrap();
        assert_eq!(request.num_outputs, 1);
        assert_eq!(request.num_inference_steps, 1);
    }

    #[test]
    fn initial_image_is_inlined() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("Cat.png");
        std::fs::write(&path, b"abc").unwrap();
        let options = GenerationOptions {
            upscale: Some(Upscaler::RealEsrganX4PlusAnime6B),
            ..Default::default()
        }
        .with_initial_image(&path);

        let request = ImageRequest::build("p", &options).unwrap();
        assert_eq!(request.init_image.as_deref(), Some("data:image/png;base64,YWJj"));
        assert_eq!(request.use_upscale, Some("RealESRGAN_x4plus_anime_6B"));
    }

    #[test]
    fn missing_initial_image_is_io_error() {
        let options = GenerationOptions::default().with_initial_image("/nonexistent/x.png");
        let result = ImageRequest::build("p", &options);
        assert!(matches!(result, Err(BackendError::Io(_))));
    }

    #[test]
    fn optional_fields_are_omitted_from_json() {
        let options = GenerationOptions {
            upscale: None,
            ..Default::default()
        };
        let json = serde_json::to_value(ImageRequest::build("p", &options).unwrap()).unwrap();
        let obj = json.as_object().unwrap();
        assert!(!obj.contains_key("use_upscale"));
        assert!(!obj.contains_key("init_image"));
        assert!(!obj.contains_key("use_face_correction"));
        assert_eq!(obj["seed"], 42);
    }

    #[test]
    fn decode_png_data_url() {
        assert_eq!(
            decode_data_url("data:image/png;base64,YWJj").unwrap(),
            b"abc".to_vec()
        );
    }

    #[test]
    fn decode_rejects_other_media_types() {
        let result = decode_data_url("data:image/jpeg;base64,YWJj");
        assert!(matches!(result, Err(BackendError::UnsupportedImageData)));
    }

    #[test]
    fn decode_rejects_bad_base64() {
        let result = decode_data_url("data:image/png;base64,!!!");
        assert!(matches!(result, Err(BackendError::Base64(_))));
    }

    #[test]
    fn response_decodes_all_outputs_in_order() {
        let response: ImageResponse = serde_json::from_str(
            r#"{"status": "succeeded", "output": [
                {"data": "data:image/png;base64,YQ==", "seed": 42},
                {"data": "data:image/png;base64,Yg==", "seed": 43}
            ]}"#,
        )
        .unwrap();
        let images = response.into_images().unwrap();
        assert_eq!(images, vec![b"a".to_vec(), b"b".to_vec()]);
    }
}

//! Smart `image_config` resolution
//!
//! For allow-listed models each field is resolved independently:
//! prompt hint, then the caller's value, then the fixed default.

use std::fmt;

use serde::Serialize;
use tracing::debug;

use crate::transform::prompt::{infer_from_messages, PromptHints};
use crate::transform::tables::ModelTables;
use crate::types::{ChatRequest, ImageConfig, Lenient};

/// Output resolution tier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ImageSize {
    #[serde(rename = "1K")]
    OneK,
    #[serde(rename = "2K")]
    TwoK,
    #[serde(rename = "4K")]
    FourK,
}

impl ImageSize {
    pub fn as_str(self) -> &'static str {
        match self {
            ImageSize::OneK => "1K",
            ImageSize::TwoK => "2K",
            ImageSize::FourK => "4K",
        }
    }
}

impl fmt::Display for ImageSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum AspectRatio {
    #[serde(rename = "16:9")]
    Landscape16x9,
    #[serde(rename = "9:16")]
    Portrait9x16,
    #[serde(rename = "1:1")]
    Square,
    #[serde(rename = "4:3")]
    Landscape4x3,
    #[serde(rename = "3:4")]
    Portrait3x4,
    #[serde(rename = "3:2")]
    Landscape3x2,
    #[serde(rename = "2:3")]
    Portrait2x3,
}

impl AspectRatio {
    pub fn as_str(self) -> &'static str {
        match self {
            AspectRatio::Landscape16x9 => "16:9",
            AspectRatio::Portrait9x16 => "9:16",
            AspectRatio::Square => "1:1",
            AspectRatio::Landscape4x3 => "4:3",
            AspectRatio::Portrait3x4 => "3:4",
            AspectRatio::Landscape3x2 => "3:2",
            AspectRatio::Portrait2x3 => "2:3",
        }
    }
}

impl fmt::Display for AspectRatio {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Defaults injected when neither the prompt nor the caller chose a value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ImageDefaults {
    pub image_size: ImageSize,
    pub aspect_ratio: AspectRatio,
}

impl Default for ImageDefaults {
    fn default() -> Self {
        Self {
            image_size: ImageSize::FourK,
            aspect_ratio: AspectRatio::Square,
        }
    }
}

/// Merge prompt hints, caller config and defaults into one config.
///
/// The result carries exactly `image_size` and `aspect_ratio`; any other
/// caller-supplied key is dropped.
pub fn merge_image_config(
    hints: PromptHints,
    caller: Option<&ImageConfig>,
    defaults: ImageDefaults,
) -> ImageConfig {
    let caller_size = caller.and_then(|c| c.image_size.as_deref()).filter(|s| !s.is_empty());
    let caller_ratio = caller.and_then(|c| c.aspect_ratio.as_deref()).filter(|s| !s.is_empty());

    let image_size = hints
        .image_size
        .map(ImageSize::as_str)
        .or(caller_size)
        .unwrap_or(defaults.image_size.as_str());
    let aspect_ratio = hints
        .aspect_ratio
        .map(AspectRatio::as_str)
        .or(caller_ratio)
        .unwrap_or(defaults.aspect_ratio.as_str());

    ImageConfig {
        image_size: Some(image_size.to_string()),
        aspect_ratio: Some(aspect_ratio.to_string()),
        ..ImageConfig::default()
    }
}

/// Replace `image_config` on requests targeting an allow-listed model.
///
/// Other models are returned untouched, caller config included.
pub fn apply_smart_image_config(mut request: ChatRequest, tables: &ModelTables) -> ChatRequest {
    let Some(model) = request.model() else {
        return request;
    };
    if !tables.is_smart_config_model(model) {
        return request;
    }

    // A malformed caller image_config counts as absent
    let hints = infer_from_messages(request.messages());
    let merged = merge_image_config(hints, request.image_config(), tables.image_defaults);

    debug!(
        model = %model,
        image_size = ?merged.image_size,
        aspect_ratio = ?merged.aspect_ratio,
        "Applied smart image_config"
    );

    request.image_config = Some(Lenient::Typed(merged));
    request
}

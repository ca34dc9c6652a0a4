//! Process-wide model routing tables
//!
//! Built once at startup and shared read-only across requests.

use std::collections::BTreeMap;

use crate::transform::image_config::ImageDefaults;

/// Virtual thinking models routed to a real model with reasoning enabled
const THINKING_MODEL_MAPPINGS: &[(&str, &str)] = &[
    ("deepseek/deepseek-v3.2-thinking", "deepseek/deepseek-v3.2"),
    (
        "deepseek/deepseek-chat-v3.1-thinking",
        "deepseek/deepseek-chat-v3.1:free",
    ),
];

/// Models known to produce images
const KNOWN_IMAGE_MODELS: &[&str] = &[
    "google/gemini-3-pro-image-preview",
    "google/gemini-2.5-flash-image",
    "google/gemini-2.5-flash-image-preview",
    "bytedance-seed/seedream-4.5",
    "openai/gpt-5-image",
    "openai/gpt-5-image-mini",
    "black-forest-labs/flux.2-max",
    "black-forest-labs/flux.2-flex",
    "black-forest-labs/flux.2-pro",
    "sourceful/riverflow-v2-max-preview",
    "sourceful/riverflow-v2-standard-preview",
    "sourceful/riverflow-v2-fast-preview",
];

/// Substrings that mark an id as image-capable (matched on the lowercase id)
const IMAGE_MODEL_MARKERS: &[&str] = &["-image", "image-", "seedream", "flux", "riverflow"];

/// Models that receive smart `image_config` defaults
const SMART_IMAGE_CONFIG_MODELS: &[&str] = &[
    "google/gemini-3-pro-image-preview",
    "bytedance-seed/seedream-4.5",
];

/// Immutable routing and image-capability configuration
#[derive(Debug, Clone)]
pub struct ModelTables {
    pub thinking_aliases: BTreeMap<String, String>,
    pub known_image_models: Vec<String>,
    pub smart_config_models: Vec<String>,
    pub image_defaults: ImageDefaults,
}

impl ModelTables {
    /// Built-in tables
    pub fn builtin() -> Self {
        Self {
            thinking_aliases: THINKING_MODEL_MAPPINGS
                .iter()
                .map(|(alias, target)| (alias.to_string(), target.to_string()))
                .collect(),
            known_image_models: KNOWN_IMAGE_MODELS.iter().map(|m| m.to_string()).collect(),
            smart_config_models: SMART_IMAGE_CONFIG_MODELS
                .iter()
                .map(|m| m.to_string())
                .collect(),
            image_defaults: ImageDefaults::default(),
        }
    }

    /// Built-in tables with extra thinking aliases layered on top
    pub fn with_thinking_aliases<I>(aliases: I) -> Self
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let mut tables = Self::builtin();
        tables.thinking_aliases.extend(aliases);
        tables
    }

    /// Exact, case-sensitive alias lookup
    pub fn thinking_target(&self, model: &str) -> Option<&str> {
        self.thinking_aliases.get(model).map(String::as_str)
    }

    /// Known image model (case-insensitive) or an id containing an image marker.
    ///
    /// The marker heuristic is broad on purpose; any id containing "flux"
    /// counts, for instance.
    pub fn is_image_model(&self, model: &str) -> bool {
        if self
            .known_image_models
            .iter()
            .any(|known| known.eq_ignore_ascii_case(model))
        {
            return true;
        }

        let lower = model.to_lowercase();
        IMAGE_MODEL_MARKERS.iter().any(|marker| lower.contains(marker))
    }

    pub fn is_smart_config_model(&self, model: &str) -> bool {
        self.smart_config_models
            .iter()
            .any(|m| m.eq_ignore_ascii_case(model))
    }
}

impl Default for ModelTables {
    fn default() -> Self {
        Self::builtin()
    }
}

//! Request normalization before forwarding
//!
//! Applied in order:
//! 1. Thinking-model routing (`xxx-thinking` -> `xxx` + `reasoning.enabled`)
//! 2. Image capability augmentation (`modalities` + smart `image_config`)

use serde_json::{json, Value};
use tracing::debug;

use crate::transform::image_config::apply_smart_image_config;
use crate::transform::tables::ModelTables;
use crate::types::{ChatRequest, Lenient, Reasoning};

const THINKING_SUFFIX: &str = "-thinking";

/// Normalize a parsed request body. Performs no I/O.
pub fn normalize_request(request: ChatRequest, tables: &ModelTables) -> ChatRequest {
    let request = route_thinking_model(request, tables);
    augment_image_request(request, tables)
}

/// Re-route virtual thinking models.
///
/// An exact alias-table hit takes priority; otherwise a case-insensitive
/// `-thinking` suffix is stripped, keeping the prefix as written.
pub fn route_thinking_model(mut request: ChatRequest, tables: &ModelTables) -> ChatRequest {
    let Some(model) = request.model() else {
        return request;
    };

    let target = match tables.thinking_target(model) {
        Some(target) => target.to_string(),
        None => match strip_thinking_suffix(model) {
            Some(stripped) => stripped.to_string(),
            None => return request,
        },
    };

    debug!(from = %model, to = %target, "Routing thinking model");
    request.set_model(target);
    request.reasoning = Some(Lenient::Typed(enable_reasoning(request.reasoning.take())));
    request
}

fn strip_thinking_suffix(model: &str) -> Option<&str> {
    let split = model.len().checked_sub(THINKING_SUFFIX.len())?;
    if !model.is_char_boundary(split) {
        return None;
    }
    let (prefix, suffix) = model.split_at(split);
    suffix.eq_ignore_ascii_case(THINKING_SUFFIX).then_some(prefix)
}

/// Set `enabled`, keeping the other fields of a well-formed reasoning object
fn enable_reasoning(existing: Option<Lenient<Reasoning>>) -> Reasoning {
    Reasoning {
        enabled: Some(true),
        ..existing.and_then(Lenient::into_typed).unwrap_or_default()
    }
}

/// Add `modalities` and smart `image_config` for image-capable models.
///
/// A caller-supplied `modalities` array is never replaced.
pub fn augment_image_request(mut request: ChatRequest, tables: &ModelTables) -> ChatRequest {
    let is_image_model = request
        .model()
        .is_some_and(|model| tables.is_image_model(model));
    if !is_image_model {
        return request;
    }

    if !request.modalities.as_ref().is_some_and(Value::is_array) {
        request.modalities = Some(json!(["image", "text"]));
    }

    apply_smart_image_config(request, tables)
}

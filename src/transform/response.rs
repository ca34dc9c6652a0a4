//! Image response reshaping
//!
//! Generated images arrive in a non-standard `message.images` array. Clients
//! only render `content`, so the first image is embedded there as Markdown and
//! the array is dropped. Only buffered JSON responses go through here; event
//! streams are relayed untouched.

use serde_json::Value;

use crate::types::{ChatCompletion, GeneratedImage, Lenient, ResponseMessage};

/// Embed the first generated image of every choice into its `content`
pub fn transform_image_response(mut completion: ChatCompletion) -> ChatCompletion {
    let Some(choices) = completion.choices.as_mut().and_then(Lenient::typed_mut) else {
        return completion;
    };

    let messages = choices
        .iter_mut()
        .filter_map(Lenient::typed_mut)
        .filter_map(|choice| choice.message.as_mut().and_then(Lenient::typed_mut));
    for message in messages {
        embed_first_image(message);
    }

    completion
}

fn embed_first_image(message: &mut ResponseMessage) {
    // Only the first image is embedded; an entry of any other shape has no URL.
    let url = match message.images.as_ref().and_then(Lenient::typed) {
        Some(images) if !images.is_empty() => images[0]
            .typed()
            .and_then(GeneratedImage::url)
            .map(str::to_string),
        _ => return,
    };

    let mut content = String::new();

    if let Some(text) = message.content.as_ref().and_then(Value::as_str) {
        let text = text.trim();
        if !text.is_empty() {
            content.push_str(text);
            content.push_str("\n\n");
        }
    }

    if let Some(url) = url {
        content.push_str(&format!("![Generated Image]({})", url));
    }

    message.content = Some(Value::String(content.trim().to_string()));
    message.images = None;
}

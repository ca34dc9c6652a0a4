//! Typed payloads exchanged with clients and upstreams
//!
//! Every structure keeps unknown keys in a flattened `extra` map so that
//! fields the proxy does not care about survive a parse/serialize cycle.
//! Fields the proxy inspects are wrapped in [`Lenient`]: a value of the wrong
//! shape is kept verbatim and reads as a typed absence instead of failing the
//! whole body.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// Passthrough fields not modelled explicitly
pub type Extra = Map<String, Value>;

/// A value read as `T` when it has the expected shape, kept raw otherwise
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Lenient<T> {
    Typed(T),
    Raw(Value),
}

impl<T> Lenient<T> {
    pub fn typed(&self) -> Option<&T> {
        match self {
            Lenient::Typed(value) => Some(value),
            Lenient::Raw(_) => None,
        }
    }

    pub fn typed_mut(&mut self) -> Option<&mut T> {
        match self {
            Lenient::Typed(value) => Some(value),
            Lenient::Raw(_) => None,
        }
    }

    pub fn into_typed(self) -> Option<T> {
        match self {
            Lenient::Typed(value) => Some(value),
            Lenient::Raw(_) => None,
        }
    }
}

impl<T> From<T> for Lenient<T> {
    fn from(value: T) -> Self {
        Lenient::Typed(value)
    }
}

/// Deserialize a present key as `Some`, explicit `null` included, so it is
/// written back exactly as received. Absent keys fall back to `default`.
fn present<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    T::deserialize(deserializer).map(Some)
}

// =============================================================================
// Chat completion request
// =============================================================================

/// Chat completion request body as sent by OpenAI-compatible clients
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChatRequest {
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub model: Option<Lenient<String>>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub messages: Option<Lenient<Vec<Lenient<Message>>>>,
    /// Kept loosely typed: a caller-supplied array of any content is preserved,
    /// anything else is replaced for image-capable models.
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub modalities: Option<Value>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub image_config: Option<Lenient<ImageConfig>>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub reasoning: Option<Lenient<Reasoning>>,
    #[serde(flatten)]
    pub extra: Extra,
}

impl ChatRequest {
    /// Model id, when it is a string
    pub fn model(&self) -> Option<&str> {
        self.model.as_ref()?.typed().map(String::as_str)
    }

    pub fn set_model(&mut self, model: impl Into<String>) {
        self.model = Some(Lenient::Typed(model.into()));
    }

    /// Well-formed messages in order; malformed entries are skipped
    pub fn messages(&self) -> impl DoubleEndedIterator<Item = &Message> {
        self.messages
            .iter()
            .filter_map(Lenient::typed)
            .flatten()
            .filter_map(Lenient::typed)
    }

    pub fn image_config(&self) -> Option<&ImageConfig> {
        self.image_config.as_ref()?.typed()
    }

    pub fn reasoning(&self) -> Option<&Reasoning> {
        self.reasoning.as_ref()?.typed()
    }
}

/// Chat message
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Message {
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub role: Option<Lenient<String>>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub content: Option<Lenient<MessageContent>>,
    #[serde(flatten)]
    pub extra: Extra,
}

/// Message content: a plain string or a list of typed parts
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MessageContent {
    Text(String),
    Parts(Vec<Lenient<ContentPart>>),
}

/// One part of a multi-part message (`text`, `image_url`, ...)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ContentPart {
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(flatten)]
    pub extra: Extra,
}

impl Message {
    pub fn new(role: impl Into<String>, content: MessageContent) -> Self {
        Self {
            role: Some(Lenient::Typed(role.into())),
            content: Some(Lenient::Typed(content)),
            ..Self::default()
        }
    }

    pub fn role(&self) -> Option<&str> {
        self.role.as_ref()?.typed().map(String::as_str)
    }

    /// Text carried by this message: the string content, or the first
    /// `text` part. Empty when neither exists.
    pub fn text(&self) -> &str {
        match self.content.as_ref().and_then(Lenient::typed) {
            Some(MessageContent::Text(text)) => text,
            Some(MessageContent::Parts(parts)) => parts
                .iter()
                .filter_map(Lenient::typed)
                .find(|part| part.kind.as_deref() == Some("text"))
                .and_then(|part| part.text.as_deref())
                .unwrap_or(""),
            None => "",
        }
    }
}

/// Image generation parameters understood by the upstream router
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ImageConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_size: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aspect_ratio: Option<String>,
    #[serde(flatten)]
    pub extra: Extra,
}

/// Extended reasoning switch
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Reasoning {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
    #[serde(flatten)]
    pub extra: Extra,
}

// =============================================================================
// Chat completion response
// =============================================================================

/// Buffered (non-streaming) chat completion response
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChatCompletion {
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub choices: Option<Lenient<Vec<Lenient<Choice>>>>,
    #[serde(flatten)]
    pub extra: Extra,
}

/// Chat completion choice
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Choice {
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub message: Option<Lenient<ResponseMessage>>,
    #[serde(flatten)]
    pub extra: Extra,
}

/// Assistant message, possibly carrying generated images
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResponseMessage {
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub content: Option<Value>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub images: Option<Lenient<Vec<Lenient<GeneratedImage>>>>,
    #[serde(flatten)]
    pub extra: Extra,
}

/// Entry of the non-standard `images` array
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GeneratedImage {
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub image_url: Option<ImageUrl>,
    #[serde(flatten)]
    pub extra: Extra,
}

/// `image_url` is either `{ "url": ... }` or the URL string itself
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ImageUrl {
    Nested { url: String },
    Plain(String),
    Other(Value),
}

impl GeneratedImage {
    pub fn url(&self) -> Option<&str> {
        let url = match self.image_url.as_ref()? {
            ImageUrl::Nested { url } | ImageUrl::Plain(url) => url.as_str(),
            ImageUrl::Other(_) => return None,
        };
        (!url.is_empty()).then_some(url)
    }
}

// =============================================================================
// Model catalogs
// =============================================================================

/// Model listing in the general catalog shape
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelList {
    #[serde(default = "list_object")]
    pub object: String,
    #[serde(default)]
    pub data: Vec<ModelDescriptor>,
}

fn list_object() -> String {
    "list".to_string()
}

/// General catalog entry, identified by `id`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ModelDescriptor {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context_length: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub architecture: Option<Architecture>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pricing: Option<Pricing>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub top_provider: Option<TopProvider>,
    #[serde(flatten)]
    pub extra: Extra,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Architecture {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub modality: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input_modalities: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_modalities: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tokenizer: Option<String>,
    #[serde(flatten)]
    pub extra: Extra,
}

impl Architecture {
    pub fn outputs_image(&self) -> bool {
        self.output_modalities
            .as_ref()
            .is_some_and(|outputs| outputs.iter().any(|m| m == "image"))
    }
}

/// Per-unit prices, quoted as decimal strings
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Pricing {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prompt: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completion: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(flatten)]
    pub extra: Extra,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TopProvider {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context_length: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_moderated: Option<bool>,
    #[serde(flatten)]
    pub extra: Extra,
}

/// Envelope of the image-output-only catalog: `{ "data": { "models": [...] } }`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ImageCatalogResponse {
    #[serde(default)]
    pub data: Option<ImageCatalogData>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ImageCatalogData {
    #[serde(default)]
    pub models: Vec<ImageCatalogEntry>,
}

/// Image catalog entry, identified by `slug`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ImageCatalogEntry {
    #[serde(default)]
    pub slug: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub context_length: Option<u64>,
    #[serde(default)]
    pub input_modalities: Option<Vec<String>>,
    #[serde(default)]
    pub output_modalities: Option<Vec<String>>,
}

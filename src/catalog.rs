//! Model catalog aggregation
//!
//! The general catalog lacks many image-generation models. Entries from the
//! image-output catalog are merged in: unknown ids are synthesized in the
//! general shape, known ids are backfilled with image output modalities.

use std::collections::HashMap;

use tracing::{debug, warn};

use crate::{
    error::AppResult,
    proxy::OpenRouterClient,
    routes::metrics::record_image_catalog_fallback,
    types::{Architecture, ImageCatalogEntry, ModelDescriptor, ModelList, Pricing, TopProvider},
};

const DEFAULT_CONTEXT_LENGTH: u64 = 4096;

/// Fetch both catalogs concurrently and merge them.
///
/// The general catalog is required; a failed image catalog only means the
/// listing is returned unaugmented.
pub async fn aggregate_models(client: &OpenRouterClient) -> AppResult<ModelList> {
    let (general, images) = tokio::join!(client.fetch_models(), client.fetch_image_models());

    let general = general?;
    let images = match images {
        Ok(images) => images,
        Err(e) => {
            warn!(error = %e, "Image model catalog unavailable, serving general catalog only");
            record_image_catalog_fallback();
            Vec::new()
        }
    };

    Ok(ModelList {
        object: "list".to_string(),
        data: merge_catalogs(general.data, images),
    })
}

/// Merge image catalog entries into the general catalog, deduplicated by id
pub fn merge_catalogs(
    general: Vec<ModelDescriptor>,
    images: Vec<ImageCatalogEntry>,
) -> Vec<ModelDescriptor> {
    let mut models: Vec<ModelDescriptor> = Vec::with_capacity(general.len() + images.len());
    let mut index: HashMap<String, usize> = HashMap::new();

    for model in general {
        if !index.contains_key(&model.id) {
            index.insert(model.id.clone(), models.len());
            models.push(model);
        }
    }

    let mut added = 0usize;
    for entry in images {
        let Some(id) = entry.slug.clone().filter(|slug| !slug.is_empty()) else {
            continue;
        };

        match index.get(&id) {
            Some(&position) => backfill_image_output(&mut models[position], &entry),
            None => {
                index.insert(id.clone(), models.len());
                models.push(synthesize_descriptor(id, entry));
                added += 1;
            }
        }
    }

    debug!(total = models.len(), added, "Merged model catalogs");
    models
}

/// Image catalog output modalities, always including "image"
fn image_outputs(entry: &ImageCatalogEntry) -> Vec<String> {
    let mut outputs = entry
        .output_modalities
        .clone()
        .unwrap_or_else(|| vec!["image".to_string()]);
    if !outputs.iter().any(|m| m == "image") {
        outputs.push("image".to_string());
    }
    outputs
}

/// Add the image catalog's outputs to a descriptor not yet advertising image
/// output. Existing modalities are kept.
fn backfill_image_output(model: &mut ModelDescriptor, entry: &ImageCatalogEntry) {
    let architecture = model.architecture.get_or_insert_with(Architecture::default);
    if architecture.outputs_image() {
        return;
    }

    let outputs = architecture.output_modalities.get_or_insert_with(Vec::new);
    for modality in image_outputs(entry) {
        if !outputs.contains(&modality) {
            outputs.push(modality);
        }
    }
}

fn synthesize_descriptor(id: String, entry: ImageCatalogEntry) -> ModelDescriptor {
    let context_length = entry
        .context_length
        .filter(|&length| length > 0)
        .unwrap_or(DEFAULT_CONTEXT_LENGTH);
    let output_modalities = image_outputs(&entry);

    ModelDescriptor {
        name: Some(entry.name.unwrap_or_else(|| id.clone())),
        description: Some(entry.description.unwrap_or_default()),
        context_length: Some(context_length),
        architecture: Some(Architecture {
            modality: Some("text+image->text+image".to_string()),
            input_modalities: Some(
                entry
                    .input_modalities
                    .unwrap_or_else(|| vec!["text".to_string(), "image".to_string()]),
            ),
            output_modalities: Some(output_modalities),
            tokenizer: Some("Unknown".to_string()),
            ..Architecture::default()
        }),
        pricing: Some(Pricing {
            prompt: Some("0".to_string()),
            completion: Some("0".to_string()),
            image: Some("0.04".to_string()),
            ..Pricing::default()
        }),
        top_provider: Some(TopProvider {
            context_length: Some(context_length),
            is_moderated: Some(false),
            ..TopProvider::default()
        }),
        id,
        ..ModelDescriptor::default()
    }
}

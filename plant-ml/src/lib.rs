mod loading;
mod result;

pub mod labels;
pub mod plant_cnn;
pub mod prediction;

use std::path::Path;

pub use labels::{CLASS_NAMES, class_name};
pub use plant_cnn::PlantClassifier;
pub use prediction::{ClassifyOutput, Prediction};
pub use result::{ClassifyError, Result};

/// Loads the model at `model_path` and classifies the image at `image_path`.
///
/// Every failure along the way (weights, decoding, forward pass) surfaces as a
/// single [`ClassifyError`]; nothing is retried and no partial result is kept.
pub fn classify_image(
    image_path: impl AsRef<Path>,
    model_path: impl AsRef<Path>,
) -> Result<Prediction> {
    let classifier = PlantClassifier::load(model_path)?;
    let image = plant_cnn::open_image(image_path.as_ref())?;
    Ok(classifier.inference(&image)?)
}

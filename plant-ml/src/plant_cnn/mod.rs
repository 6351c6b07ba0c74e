use std::path::Path;

use anyhow::{Context, Result};
use candle_core::{DType, Device, IndexOp, Tensor};
use candle_nn::ops::softmax;
use image::{
    DynamicImage, ImageReader,
    imageops::{self, FilterType},
};
use tracing::instrument;

use crate::{CLASS_NAMES, ClassifyError, loading::load_var_builder, prediction::Prediction};

mod model;
pub use model::PlantCnn;

pub const INPUT_SIZE: usize = 224;
/// ImageNet channel statistics (RGB).
pub const IMAGENET_MEAN: [f32; 3] = [0.485, 0.456, 0.406];
pub const IMAGENET_STD: [f32; 3] = [0.229, 0.224, 0.225];

pub struct PlantClassifier {
    model: PlantCnn,
    num_classes: usize,
    device: Device,
}

impl PlantClassifier {
    /// Loads a checkpoint on the CPU and sizes the output from a dummy pass.
    #[instrument(level = "debug", skip_all, fields(path = %model_path.as_ref().display()))]
    pub fn load(model_path: impl AsRef<Path>) -> Result<Self> {
        let device = Device::Cpu;
        let model_path = model_path.as_ref();
        let vb = load_var_builder(model_path, &device)?;
        let model = PlantCnn::load(vb).with_context(|| {
            format!(
                "{} does not hold a plant CNN state dict, re-export it with \
                 `torch.save(model.state_dict(), path)`",
                model_path.display()
            )
        })?;

        let num_classes = model.probe_num_classes(&device)?;
        if num_classes > CLASS_NAMES.len() {
            return Err(ClassifyError::TooManyClasses {
                model: num_classes,
                labels: CLASS_NAMES.len(),
            }
            .into());
        }
        tracing::debug!(num_classes, "model loaded");

        Ok(Self {
            model,
            num_classes,
            device,
        })
    }

    pub fn num_classes(&self) -> usize {
        self.num_classes
    }

    #[instrument(level = "debug", skip_all)]
    pub fn inference(&self, image: &DynamicImage) -> Result<Prediction> {
        let input = preprocess_image(image, &self.device)?;
        let logits = self.model.forward(&input, false)?;
        let probabilities: Vec<f32> = softmax(&logits.i(0)?, 0)?.to_vec1()?;

        let prediction = Prediction::from_probabilities(&probabilities)?;
        tracing::debug!(
            prediction = %prediction.prediction,
            confidence = prediction.confidence,
            "classified"
        );
        Ok(prediction)
    }
}

/// Decodes an image, sniffing the format from its content.
pub fn open_image(path: &Path) -> Result<DynamicImage> {
    ImageReader::open(path)
        .with_context(|| format!("failed to open image {}", path.display()))?
        .with_guessed_format()
        .with_context(|| format!("failed to read image {}", path.display()))?
        .decode()
        .with_context(|| format!("failed to decode image {}", path.display()))
}

/// RGB, 224x224, scaled to [0, 1], ImageNet-normalized, shaped (1, 3, H, W).
#[instrument(level = "debug", skip_all)]
pub fn preprocess_image(image: &DynamicImage, device: &Device) -> Result<Tensor> {
    let size = INPUT_SIZE as u32;
    let resized = imageops::resize(&image.to_rgb8(), size, size, FilterType::Triangle);
    let data = resized.into_raw();
    let tensor = (Tensor::from_vec(data, (INPUT_SIZE, INPUT_SIZE, 3), &Device::Cpu)?
        .to_dtype(DType::F32)?
        .permute((2, 0, 1))? // (3, H, W)
        * (1.0 / 255.0))?;

    let mean = Tensor::new(&IMAGENET_MEAN, &Device::Cpu)?.reshape((3, 1, 1))?;
    let std = Tensor::new(&IMAGENET_STD, &Device::Cpu)?.reshape((3, 1, 1))?;
    let tensor = tensor
        .broadcast_sub(&mean)?
        .broadcast_div(&std)?
        .unsqueeze(0)?;
    Ok(tensor.to_device(device)?)
}

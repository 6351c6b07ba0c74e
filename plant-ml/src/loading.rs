use std::path::Path;

use anyhow::{Context, Result};
use candle_core::{DType, Device};
use candle_nn::VarBuilder;

use crate::ClassifyError;

/// Opens a checkpoint as a `VarBuilder`, picking the reader from the extension.
///
/// `.pt`/`.pth`/`.bin` files must hold a state dict; the network layout itself
/// lives in [`crate::plant_cnn`].
pub fn load_var_builder(path: &Path, device: &Device) -> Result<VarBuilder<'static>> {
    std::fs::metadata(path)
        .with_context(|| format!("failed to read model file {}", path.display()))?;

    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .unwrap_or_default()
        .to_ascii_lowercase();
    let vb = match extension.as_str() {
        "safetensors" => unsafe {
            VarBuilder::from_mmaped_safetensors(&[path], DType::F32, device)
        },
        "pt" | "pth" | "bin" => VarBuilder::from_pth(path, DType::F32, device),
        _ => return Err(ClassifyError::UnsupportedFormat(extension).into()),
    };
    vb.with_context(|| format!("failed to load model weights from {}", path.display()))
}

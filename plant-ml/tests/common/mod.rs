#![allow(dead_code)]

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use anyhow::Result;
use candle_core::{DType, Device, Tensor};
use image::{Rgb, RgbImage};

/// Writes a checkpoint for the plant CNN with `num_classes` outputs.
///
/// The last layer is zeroed so the logits equal its bias, which peaks at
/// `winner`. Feature weights are small constants so the image still flows
/// through every layer.
pub fn write_checkpoint(dir: &Path, num_classes: usize, winner: usize) -> Result<PathBuf> {
    let device = Device::Cpu;
    let mut tensors = HashMap::new();
    for (conv, in_channels, out_channels) in [(0, 3, 32), (5, 32, 64), (10, 64, 128)] {
        let bn = conv + 1;
        tensors.insert(
            format!("features.{conv}.weight"),
            Tensor::full(0.01f32, (out_channels, in_channels, 3, 3), &device)?,
        );
        tensors.insert(
            format!("features.{conv}.bias"),
            Tensor::zeros(out_channels, DType::F32, &device)?,
        );
        for (name, value) in [
            ("weight", 1.0f32),
            ("bias", 0.0),
            ("running_mean", 0.0),
            ("running_var", 1.0),
        ] {
            tensors.insert(
                format!("features.{bn}.{name}"),
                Tensor::full(value, out_channels, &device)?,
            );
        }
    }
    tensors.insert(
        "classifier.2.weight".to_string(),
        Tensor::full(0.01f32, (256, 128), &device)?,
    );
    tensors.insert(
        "classifier.2.bias".to_string(),
        Tensor::zeros(256, DType::F32, &device)?,
    );
    tensors.insert(
        "classifier.5.weight".to_string(),
        Tensor::zeros((num_classes, 256), DType::F32, &device)?,
    );
    let mut bias = vec![0.0f32; num_classes];
    bias[winner] = 4.0;
    tensors.insert(
        "classifier.5.bias".to_string(),
        Tensor::new(bias.as_slice(), &device)?,
    );

    let path = dir.join("plant_cnn.safetensors");
    candle_core::safetensors::save(&tensors, &path)?;
    Ok(path)
}

pub fn write_leaf_image(dir: &Path) -> Result<PathBuf> {
    let image = RgbImage::from_fn(300, 200, |x, y| {
        Rgb([(x % 256) as u8, 120 + (y % 100) as u8, 40])
    });
    let path = dir.join("leaf.png");
    image.save(&path)?;
    Ok(path)
}

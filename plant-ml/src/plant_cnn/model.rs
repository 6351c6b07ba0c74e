use anyhow::Result;
use candle_core::{D, DType, Device, Module, ModuleT, Tensor};
use candle_nn::{BatchNorm, Conv2d, Conv2dConfig, Dropout, Linear, VarBuilder};

use super::INPUT_SIZE;

/// (in channels, out channels, dropout) for each feature stage.
const FEATURE_STAGES: [(usize, usize, f32); 3] = [(3, 32, 0.1), (32, 64, 0.2), (64, 128, 0.3)];
/// Each stage is conv, bn, relu, pool, dropout in the `features` sequential.
const STAGE_LEN: usize = 5;
const HIDDEN_DIM: usize = 256;
const HEAD_DROPOUT: f32 = 0.5;

pub struct PlantCnn {
    features: Vec<ConvBlock>,
    classifier: ClassifierHead,
}

impl PlantCnn {
    pub fn load(vb: VarBuilder) -> Result<Self> {
        let features = FEATURE_STAGES
            .iter()
            .enumerate()
            .map(|(stage, &(in_channels, out_channels, dropout))| {
                ConvBlock::load(
                    &vb.pp("features"),
                    stage * STAGE_LEN,
                    in_channels,
                    out_channels,
                    dropout,
                )
            })
            .collect::<Result<Vec<_>>>()?;
        let (_, feature_channels, _) = FEATURE_STAGES[FEATURE_STAGES.len() - 1];
        let classifier = ClassifierHead::load(&vb.pp("classifier"), feature_channels)?;

        Ok(Self {
            features,
            classifier,
        })
    }

    /// Width of the logits, read off a forward pass over an all-zero image.
    pub fn probe_num_classes(&self, device: &Device) -> Result<usize> {
        let dummy = Tensor::zeros((1, 3, INPUT_SIZE, INPUT_SIZE), DType::F32, device)?;
        let (_, num_classes) = self.forward(&dummy, false)?.dims2()?;
        Ok(num_classes)
    }

    pub fn forward(&self, xs: &Tensor, train: bool) -> candle_core::Result<Tensor> {
        let mut x = xs.clone();
        for block in &self.features {
            x = block.forward(&x, train)?;
        }
        self.classifier.forward(&x, train)
    }
}

struct ConvBlock {
    conv: Conv2d,
    bn: BatchNorm,
    dropout: Dropout,
}

impl ConvBlock {
    fn load(
        vb: &VarBuilder,
        index: usize,
        in_channels: usize,
        out_channels: usize,
        dropout: f32,
    ) -> Result<Self> {
        let conv_vb = vb.pp(index.to_string());
        let conv = Conv2d::new(
            conv_vb.get((out_channels, in_channels, 3, 3), "weight")?,
            Some(conv_vb.get(out_channels, "bias")?),
            Conv2dConfig {
                padding: 1,
                ..Default::default()
            },
        );
        let bn = load_batch_norm(&vb.pp((index + 1).to_string()), out_channels)?;

        Ok(Self {
            conv,
            bn,
            dropout: Dropout::new(dropout),
        })
    }

    fn forward(&self, xs: &Tensor, train: bool) -> candle_core::Result<Tensor> {
        let mut x = self.conv.forward(xs)?;
        x = self.bn.forward_t(&x, train)?;
        x = x.relu()?;
        x = x.max_pool2d_with_stride(2, 2)?;
        self.dropout.forward_t(&x, train)
    }
}

struct ClassifierHead {
    fc1: Linear,
    dropout: Dropout,
    fc2: Linear,
}

impl ClassifierHead {
    fn load(vb: &VarBuilder, in_features: usize) -> Result<Self> {
        let fc1 = Linear::new(
            vb.pp("2").get((HIDDEN_DIM, in_features), "weight")?,
            Some(vb.pp("2").get(HIDDEN_DIM, "bias")?),
        );
        // The class count is whatever the checkpoint was trained with.
        let fc2_weight = vb.pp("5").get_unchecked("weight")?;
        let (num_classes, hidden) = fc2_weight.dims2()?;
        if hidden != HIDDEN_DIM {
            anyhow::bail!(
                "classifier.5.weight has {hidden} input features, expected {HIDDEN_DIM}"
            );
        }
        let fc2 = Linear::new(fc2_weight, Some(vb.pp("5").get(num_classes, "bias")?));

        Ok(Self {
            fc1,
            dropout: Dropout::new(HEAD_DROPOUT),
            fc2,
        })
    }

    fn forward(&self, xs: &Tensor, train: bool) -> candle_core::Result<Tensor> {
        // Global average pool down to (batch, channels).
        let mut x = xs.mean_keepdim(D::Minus1)?.mean_keepdim(D::Minus2)?;
        x = x.flatten_from(1)?;
        x = self.fc1.forward(&x)?;
        x = x.relu()?;
        x = self.dropout.forward_t(&x, train)?;
        self.fc2.forward(&x)
    }
}

fn load_batch_norm(vb: &VarBuilder, channels: usize) -> Result<BatchNorm> {
    Ok(BatchNorm::new(
        channels,
        vb.get(channels, "running_mean")?,
        vb.get(channels, "running_var")?,
        vb.get(channels, "weight")?,
        vb.get(channels, "bias")?,
        1e-5,
    )?)
}

use indexmap::IndexMap;
use serde::Serialize;

use crate::{CLASS_NAMES, ClassifyError, Result};

/// Top class plus the full distribution, all in percent.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Prediction {
    pub prediction: String,
    pub confidence: f64,
    pub all_predictions: IndexMap<String, f64>,
}

impl Prediction {
    /// Builds a prediction from softmax probabilities, one per class in label order.
    ///
    /// The winner is the first index holding the maximum, and `confidence` is the
    /// very same percentage stored for it in `all_predictions`.
    pub fn from_probabilities(probabilities: &[f32]) -> Result<Self> {
        if probabilities.is_empty() {
            return Err(ClassifyError::EmptyOutput);
        }
        if probabilities.len() > CLASS_NAMES.len() {
            return Err(ClassifyError::TooManyClasses {
                model: probabilities.len(),
                labels: CLASS_NAMES.len(),
            });
        }

        let mut best = 0;
        for (index, probability) in probabilities.iter().enumerate() {
            if *probability > probabilities[best] {
                best = index;
            }
        }

        let percentages: Vec<f64> = probabilities
            .iter()
            .map(|probability| f64::from(probability * 100.0))
            .collect();
        let all_predictions = CLASS_NAMES
            .iter()
            .zip(&percentages)
            .map(|(name, percent)| (name.to_string(), *percent))
            .collect();

        Ok(Self {
            prediction: CLASS_NAMES[best].to_string(),
            confidence: percentages[best],
            all_predictions,
        })
    }
}

/// The single JSON document written to stdout.
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum ClassifyOutput {
    Prediction(Prediction),
    Error { error: ClassifyError },
}

impl From<Result<Prediction>> for ClassifyOutput {
    fn from(result: Result<Prediction>) -> Self {
        match result {
            Ok(prediction) => ClassifyOutput::Prediction(prediction),
            Err(error) => ClassifyOutput::Error { error },
        }
    }
}

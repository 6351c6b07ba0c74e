#[derive(Debug, thiserror::Error)]
pub enum ClassifyError {
    #[error("Usage: python classify_image.py <image_path> <model_path>")]
    Usage,

    #[error("unsupported model format `{0}`, expected .safetensors, .pt, .pth or .bin")]
    UnsupportedFormat(String),

    #[error("model produces {model} classes but only {labels} class names are known")]
    TooManyClasses { model: usize, labels: usize },

    #[error("model produced no class scores")]
    EmptyOutput,

    #[error(transparent)]
    Anyhow(#[from] anyhow::Error),
}

impl serde::Serialize for ClassifyError {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&format!("{self:#}"))
    }
}

pub type Result<T> = std::result::Result<T, ClassifyError>;

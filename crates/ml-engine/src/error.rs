use thiserror::Error;

#[derive(Error, Debug)]
pub enum MLError {
    #[error("Invalid data: {0}")]
    InvalidData(String),

    #[error("Model not trained")]
    NotTrained,

    #[error("Invalid model artifact: {0}")]
    InvalidArtifact(String),

    #[error("Training failed: {0}")]
    TrainingFailed(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type MLResult<T> = Result<T, MLError>;

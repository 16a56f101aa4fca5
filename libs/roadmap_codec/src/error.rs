use thiserror::Error;

#[derive(Error, Debug)]
pub enum CodecError {
    #[error("archive i/o failed: {0}")]
    IOError(#[from] std::io::Error),

    #[error("archive could not be (de)serialized: {0}")]
    Format(#[from] serde_json::Error),

    #[error("archive is inconsistent: {0}")]
    Inconsistent(String),
}

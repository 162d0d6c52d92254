use thiserror::Error;

pub type Result<T> = std::result::Result<T, CorpusError>;

#[derive(Error, Debug)]
pub enum CorpusError {
    #[error("corpus file unavailable: {0}")]
    Unavailable(#[from] std::io::Error),

    #[error("corpus is not a valid QA record array: {0}")]
    Parse(#[from] serde_json::Error),
}

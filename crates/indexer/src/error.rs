use thiserror::Error;

pub type Result<T> = std::result::Result<T, IndexerError>;

#[derive(Error, Debug)]
pub enum IndexerError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("corpus error: {0}")]
    Corpus(#[from] qa_corpus::CorpusError),

    #[error("vector store error: {0}")]
    VectorStore(#[from] qa_vector_store::StoreError),
}

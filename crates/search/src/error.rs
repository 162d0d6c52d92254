use thiserror::Error;

pub type Result<T> = std::result::Result<T, SearchError>;

#[derive(Error, Debug)]
pub enum SearchError {
    #[error("corpus error: {0}")]
    Corpus(#[from] qa_corpus::CorpusError),

    #[error("embedding error: {0}")]
    Embed(#[from] qa_embedder::EmbedError),

    #[error("indexer error: {0}")]
    Indexer(#[from] qa_indexer::IndexerError),

    #[error("chunker error: {0}")]
    Chunker(#[from] qa_chunker::ChunkerError),
}

use menucat_core::SourceType;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum IngestError {
    #[error("failed to decode {source_type} feed payload: {source}")]
    Decode {
        source_type: SourceType,
        #[source]
        source: serde_json::Error,
    },

    #[error("batch of {len} records exceeds the configured maximum of {max}")]
    BatchTooLarge { len: usize, max: usize },
}

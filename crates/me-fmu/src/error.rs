use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum MetadataError {
    #[error("model metadata has an empty GUID")]
    EmptyGuid,

    #[error("model metadata has an empty model identifier")]
    EmptyIdentifier,

    #[error("variable name {0:?} is declared twice")]
    DuplicateName(String),
}

pub type MetadataResult<T> = Result<T, MetadataError>;

use thiserror::Error;

const ERROR_PARSE: &str = "slicer_parse_failed";
const ERROR_EMPTY: &str = "slicer_empty_document";

/// A parse error on the input surfaces as a client error at the gateway
/// (spec.md §4.2 "Failure semantics").
#[derive(Debug, Error)]
pub enum Error {
    #[error("failed to parse {filename} as a word-processing document: {source}")]
    Parse {
        filename: String,
        #[source]
        source: docx_rs::ReaderError,
    },

    #[error("document {filename} is empty")]
    Empty { filename: String },
}

impl Error {
    pub fn to_error_tag(&self) -> &'static str {
        match self {
            Error::Parse { .. } => ERROR_PARSE,
            Error::Empty { .. } => ERROR_EMPTY,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

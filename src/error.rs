//! Error Types
//!
//! Every error raised while replaying a buffer is fatal for that decode:
//! the engine reports it to the registered error handler and returns it.
//! There is no best-effort mode.

use thiserror::Error as ThisError;

/// Error produced by a consumer callback.
pub type HandlerError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Result alias used throughout the crate
pub type Result<T> = std::result::Result<T, Error>;

/// Where in the tree walk a malformed tag word was met
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodeContext {
    /// First tag word of the buffer
    Entry,
    /// Children of the document, before and including the root element
    Document,
    /// Children of the document after the root element
    Epilogue,
    /// Children of an element
    Element,
    /// Attribute / namespace attribute run
    AttributeRun,
}

impl std::fmt::Display for DecodeContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            DecodeContext::Entry => "buffer entry",
            DecodeContext::Document => "child of document",
            DecodeContext::Epilogue => "document epilogue",
            DecodeContext::Element => "child of element",
            DecodeContext::AttributeRun => "attribute run",
        };
        f.write_str(name)
    }
}

/// Errors raised by the replay engine and the buffer creator
#[derive(Debug, ThisError)]
#[non_exhaustive]
pub enum Error {
    /// Tag word that is unknown or not allowed where it appeared
    #[error("illegal state for {context}: tag word {tag:#04x}")]
    MalformedStructure { context: DecodeContext, tag: u32 },

    /// A tag declared a name component but the string stream was exhausted
    #[error("structure string stream exhausted")]
    MissingStructureString,

    /// A tag referenced content that is not present in the content streams
    #[error("content missing for tag word {tag:#04x}")]
    MissingContent { tag: u32 },

    /// A raw character run did not hold valid UTF-8
    #[error("character run is not valid UTF-8: {0}")]
    InvalidUtf8(#[from] std::str::Utf8Error),

    /// Buffer holds an element fragment rather than a document
    #[error("document fragments are not supported")]
    UnsupportedFragment,

    /// The consumer raised an error while receiving an event
    #[error("consumer failed: {0}")]
    ConsumerFailure(#[source] HandlerError),

    /// Element nesting exceeded the configured limit
    #[error("element nesting exceeds limit of {limit}")]
    DepthLimitExceeded { limit: usize },

    /// Buffer creator was driven out of order
    #[error("buffer creator misuse: {0}")]
    CreatorState(&'static str),
}

impl Error {
    /// True for errors that indicate a malformed encoding
    pub fn is_format_error(&self) -> bool {
        matches!(
            self,
            Error::MalformedStructure { .. }
                | Error::MissingStructureString
                | Error::MissingContent { .. }
                | Error::InvalidUtf8(_)
        )
    }
}

/// Errors from the feature table of the processor configuration
#[derive(Debug, Clone, PartialEq, Eq, ThisError)]
pub enum FeatureError {
    /// Feature URI is unknown
    #[error("feature not recognized: {0}")]
    NotRecognized(String),

    /// Feature is known but the requested value cannot be honoured
    #[error("feature value not supported: {0}")]
    NotSupported(String),
}

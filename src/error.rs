use thiserror::Error;

/// Raised by the date normalizer; callers turn it into a missing date.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DateParseError {
    #[error("no date found in {0:?}")]
    NoMatch(String),
    #[error("two-digit year in {0:?} is ambiguous")]
    TwoDigitYear(String),
    #[error("{0:?} is not a calendar date")]
    Invalid(String),
}

/// The only failure the pipeline surfaces to its caller.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("markup for {url} is not text: {reason}")]
    MalformedInput { url: String, reason: String },
}

#[derive(Debug, Error)]
pub enum OntologyError {
    #[error("invalid ontology file: {0}")]
    Json(#[from] serde_json::Error),
    #[error("keyword {0:?} does not compile to a pattern: {1}")]
    Pattern(String, regex::Error),
    #[error("empty keyword or tag in category {0}")]
    EmptyRule(&'static str),
}

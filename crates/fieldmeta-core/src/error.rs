use thiserror::Error;

/// A metadata payload does not have the shape of a field schema
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SchemaError {
    #[error("field '{field}' is missing the '{attribute}' attribute")]
    MissingAttribute {
        field: String,
        attribute: &'static str,
    },

    #[error("field '{field}' has an invalid '{attribute}' attribute: expected {expected}")]
    InvalidAttribute {
        field: String,
        attribute: &'static str,
        expected: &'static str,
    },

    #[error("field '{field}' is not an object")]
    NotAnObject { field: String },

    #[error("malformed metadata payload: {0}")]
    Payload(String),
}

/// A candidate field set does not fit an issue type's schema.
///
/// Both lists are sorted and free of duplicates.
#[derive(Error, Debug, Clone, Default, PartialEq, Eq)]
#[error("{}", summarize(.missing_required, .unknown))]
pub struct ValidationError {
    /// Required fields absent from the candidate set
    pub missing_required: Vec<String>,
    /// Candidate fields the schema does not offer
    pub unknown: Vec<String>,
}

impl ValidationError {
    pub fn is_empty(&self) -> bool {
        self.missing_required.is_empty() && self.unknown.is_empty()
    }
}

fn summarize(missing_required: &[String], unknown: &[String]) -> String {
    let mut parts = Vec::new();
    if !missing_required.is_empty() {
        parts.push(format!("required: {}", missing_required.join(", ")));
    }
    if !unknown.is_empty() {
        parts.push(format!("unknown: {}", unknown.join(", ")));
    }
    parts.join("; ")
}

/// Failure while fetching and decoding metadata through a [`crate::MetaSource`]
#[derive(Error, Debug)]
pub enum FetchError<E> {
    /// Passed through from the transport untouched
    #[error(transparent)]
    Transport(E),

    #[error(transparent)]
    Schema(#[from] SchemaError),
}

pub type Result<T> = std::result::Result<T, SchemaError>;

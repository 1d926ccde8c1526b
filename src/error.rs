use crate::state::FieldPath;
use thiserror::Error;

/// Errors that can occur while loading a schema into the component tree model.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SchemaError {
    #[error("Failed to parse schema JSON: {0}")]
    JsonParseError(String),

    #[error("Component '{node_id}' of kind '{kind}' is malformed: {message}")]
    InvalidComponent {
        node_id: String,
        kind: String,
        message: String,
    },

    #[error("Component '{node_id}' of kind '{kind}' is a leaf and cannot have children")]
    ChildrenOnLeaf { node_id: String, kind: String },

    #[error("Component id '{id}' appears more than once under '{parent}'")]
    DuplicateSiblingId { id: String, parent: String },
}

/// Errors raised by path-addressed reads and writes on the answer store.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PathError {
    #[error("Cannot address the store with an empty path")]
    EmptyPath,

    #[error("Path '{path}' conflicts with the {found} stored at segment '{segment}'")]
    MalformedPath {
        path: FieldPath,
        segment: String,
        found: &'static str,
    },
}

/// Errors that can occur when a user edit is bound to the answer store.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EditError {
    #[error("No component is addressed by path '{0}'")]
    UnknownPath(FieldPath),

    #[error("Component '{id}' of kind '{kind}' does not accept edits")]
    NotEditable { id: String, kind: String },

    #[error("Value rejected by component '{id}': {reason}")]
    Rejected { id: String, reason: String },

    #[error("The conversation is not accepting input in state {0}")]
    NotAcceptingInput(String),

    #[error(transparent)]
    Path(#[from] PathError),
}

/// Errors surfaced by the transport collaborator during a submission round-trip.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TransportError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Server responded with status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Could not decode server reply: {0}")]
    Decode(String),

    #[error("Request timed out after {0} ms")]
    Timeout(u64),
}

/// Errors that can occur while loading controller configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Could not read config file '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Reasons a submit request is refused before any transport call.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SubmitRejection {
    #[error("No schema has been presented yet")]
    NoSchema,

    #[error("The conversation has ended")]
    Terminal,

    #[error("A submission is already in flight")]
    InFlight,

    #[error("{} field(s) failed validation", errors.len().max(missing.len()))]
    Invalid {
        errors: crate::validation::ErrorMap,
        missing: Vec<FieldPath>,
    },
}

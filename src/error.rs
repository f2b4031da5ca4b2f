use thiserror::Error;

/// Setup defects between a host and the engine. Validation failures are
/// never reported through this type; they live in `FieldErrors`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WizardError {
    #[error("field path '{path}' refers to unknown group '{group}'")]
    UnknownGroup { path: String, group: String },

    #[error("field path '{path}' treats '{group}' as a group, but it holds a value")]
    NotAGroup { path: String, group: String },

    #[error("field path '{path}' names a group, not a field")]
    NotAField { path: String },

    #[error(transparent)]
    InvalidPath(#[from] FieldPathError),

    #[error("field '{field}' expects a {expected} value")]
    TypeMismatch {
        field: String,
        expected: &'static str,
    },

    #[error("flow has no steps")]
    EmptyFlow,

    #[error("field '{field}' is declared by more than one step")]
    DuplicateField { field: String },

    #[error("step index {index} is out of range for a flow of {total} steps")]
    UnknownStep { index: usize, total: usize },

    #[error("wizard state tracks {state} steps but the flow declares {flow}")]
    FlowMismatch { state: usize, flow: usize },

    #[error("wizard has already been submitted")]
    Submitted,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid field path '{path}': {reason}")]
pub struct FieldPathError {
    pub path: String,
    pub reason: String,
}

impl FieldPathError {
    pub(crate) fn new(path: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            reason: reason.into(),
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to parse flow config: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("invalid pattern for field '{field}': {source}")]
    Pattern {
        field: String,
        #[source]
        source: regex::Error,
    },

    #[error("step '{step}' declares no fields")]
    EmptyStep { step: String },

    #[error(transparent)]
    Wizard(#[from] WizardError),
}

#[derive(Debug, Error)]
pub enum BlobError {
    #[error("sorry, uploads are disabled")]
    UploadsDisabled,

    #[error("failed to encode blob '{key}': {source}")]
    Encode {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to decode blob '{key}': {source}")]
    Decode {
        key: String,
        #[source]
        source: serde_json::Error,
    },
}

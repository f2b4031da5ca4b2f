pub mod config;
pub mod core;
pub mod domain;
pub mod error;
pub mod registration;
pub mod runtime;
pub mod state;
pub mod validators;

pub use crate::core::{FieldPath, FieldValue, FormData, FormModel, Value};
pub use crate::domain::{Command, Effect, Reducer, Reduction, Rejection, Transition};
pub use crate::error::{BlobError, ConfigError, FieldPathError, WizardError};
pub use crate::runtime::{Outcome, Wizard};
pub use crate::state::{
    BlobStore, FieldErrors, FieldSpec, Flow, MemoryBlobStore, Phase, StepBuilder,
    StepDefinition, StepStatus, WizardState,
};
pub use crate::validators::Rule;

pub mod flow;
pub mod step;
pub mod store;
pub mod validation;
pub mod wizard_state;

pub use flow::{Flow, StepStatus};
pub use step::{FieldSpec, StepBuilder, StepDefinition};
pub use store::{BlobStore, MemoryBlobStore};
pub use validation::FieldErrors;
pub use wizard_state::{Phase, WizardState};

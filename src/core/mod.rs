pub mod form_data;
pub mod value;
pub mod value_path;

use crate::error::WizardError;
use std::fmt;
use std::hash::Hash;

pub use form_data::FormData;
pub use value::{FieldValue, Value};
pub use value_path::FieldPath;

/// The form a wizard collects. Implemented by strongly-typed records, where
/// `Field` is an enum and every address is checked at compile time, and by
/// `FormData`, where `Field` is a parsed `FieldPath`.
pub trait FormModel: Clone + fmt::Debug {
    /// `Display` renders the field's dotted path, used as the error key.
    type Field: Clone + Eq + Hash + fmt::Debug + fmt::Display;

    fn field(&self, field: &Self::Field) -> FieldValue<'_>;

    /// Writes a single field. Errors signal an integration defect such as an
    /// unknown group or a value of the wrong kind.
    fn set_field(&mut self, field: &Self::Field, value: Value) -> Result<(), WizardError>;
}

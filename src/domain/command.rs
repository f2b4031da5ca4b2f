use crate::core::{FormModel, Value};

pub enum Command<M: FormModel> {
    UpdateField { field: M::Field, value: Value },
    UpdateFields(Vec<(M::Field, Value)>),
    Validate,
    Advance,
    Retreat,
    Submit,
}

impl<M: FormModel> Command<M> {
    pub fn update(field: M::Field, value: impl Into<Value>) -> Self {
        Self::UpdateField {
            field,
            value: value.into(),
        }
    }
}
